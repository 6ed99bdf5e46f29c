use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use url::Url;

use crate::error::ApiError;
use crate::model::{Coordinates, Post, VoteOutcome, VoteType};

pub const PAGE_SIZE: u32 = 10;

pub const LATITUDE_HEADER: &str = "x-location-latitude";
pub const LONGITUDE_HEADER: &str = "x-location-longitude";

const POSTS_QUERY: &str = r#"query Posts($skip: Int!, $take: Int!, $channelId: ID) {
  posts(skip: $skip, take: $take, channelId: $channelId) {
    id
    body
    photoURL
    anonymous
    distance
    createdAt
    commentsCount
    rate
    profilePostVote {
      type
    }
    owner {
      uid
      username
      photoURL
    }
    channel {
      id
      name
    }
  }
}"#;

const VOTE_MUTATION: &str = r#"mutation VotePost($postId: ID!, $type: PostVoteType!) {
  vote(postId: $postId, type: $type) {
    type
    post {
      id
      rate
    }
    profile {
      uid
      photoURL
    }
  }
}"#;

#[derive(Debug, Clone, PartialEq)]
pub struct PostsQuery {
    pub channel_id: Option<String>,
    pub location: Option<Coordinates>,
}

/// The two backend operations the feed depends on.
#[async_trait]
pub trait FeedApi: Send + Sync {
    async fn fetch_posts(&self, query: &PostsQuery) -> Result<Vec<Post>, ApiError>;

    async fn vote(&self, post_id: &str, direction: VoteType) -> Result<VoteOutcome, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub user_agent: String,
    pub token: Option<String>,
    pub timeout: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            user_agent: "habla-feed/0.1".to_string(),
            token: None,
            timeout: None,
        }
    }
}

#[derive(Clone)]
pub struct GraphqlClient {
    client: reqwest::Client,
    endpoint: Url,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlMessage>,
}

#[derive(Deserialize)]
struct GraphqlMessage {
    message: String,
}

#[derive(Deserialize)]
struct PostsData {
    posts: Vec<Post>,
}

#[derive(Deserialize)]
struct VoteData {
    vote: VoteOutcome,
}

impl GraphqlClient {
    pub fn new(endpoint: Url, options: &ClientOptions) -> anyhow::Result<Self> {
        use anyhow::Context as _;

        let mut headers = HeaderMap::new();
        if let Some(token) = &options.token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .context("token is not a valid header value")?;
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(&options.user_agent)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(10));
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("build reqwest client")?;
        Ok(Self { client, endpoint })
    }

    async fn post_bytes(
        &self,
        body: Value,
        location: Option<Coordinates>,
    ) -> Result<Bytes, ApiError> {
        let endpoint = self.endpoint.to_string();
        let mut request = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string());
        if let Some(at) = location {
            request = request
                .header(LATITUDE_HEADER, at.latitude.to_string())
                .header(LONGITUDE_HEADER, at.longitude.to_string());
        }

        let resp = request.send().await.map_err(|source| ApiError::Transport {
            endpoint: endpoint.clone(),
            source,
        })?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(%status, %endpoint, "graphql endpoint rejected request");
            return Err(ApiError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        resp.bytes()
            .await
            .map_err(|source| ApiError::Transport { endpoint, source })
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        body: Value,
        location: Option<Coordinates>,
    ) -> Result<T, ApiError> {
        let bytes = self.post_bytes(body, location).await?;
        decode_envelope(&bytes)
    }
}

fn decode_envelope<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    let value: Value = serde_json::from_slice(bytes).map_err(ApiError::Unparseable)?;
    let envelope: Envelope<T> = serde_json::from_value(value)?;
    if !envelope.errors.is_empty() {
        return Err(ApiError::Graphql(
            envelope.errors.into_iter().map(|e| e.message).collect(),
        ));
    }
    envelope
        .data
        .ok_or_else(|| ApiError::Graphql(vec!["response carried no data".to_string()]))
}

#[async_trait]
impl FeedApi for GraphqlClient {
    async fn fetch_posts(&self, query: &PostsQuery) -> Result<Vec<Post>, ApiError> {
        let body = json!({
            "query": POSTS_QUERY,
            "variables": {
                "skip": 0,
                "take": PAGE_SIZE,
                "channelId": query.channel_id,
            },
        });
        let data: PostsData = self.execute(body, query.location).await?;
        tracing::debug!(count = data.posts.len(), channel = ?query.channel_id, "fetched posts");
        Ok(data.posts)
    }

    async fn vote(&self, post_id: &str, direction: VoteType) -> Result<VoteOutcome, ApiError> {
        let body = json!({
            "query": VOTE_MUTATION,
            "variables": {
                "postId": post_id,
                "type": direction.as_tag(),
            },
        });
        let data: VoteData = self.execute(body, None).await?;
        Ok(data.vote)
    }
}

#[async_trait]
impl<T: FeedApi + ?Sized> FeedApi for std::sync::Arc<T> {
    async fn fetch_posts(&self, query: &PostsQuery) -> Result<Vec<Post>, ApiError> {
        (**self).fetch_posts(query).await
    }

    async fn vote(&self, post_id: &str, direction: VoteType) -> Result<VoteOutcome, ApiError> {
        (**self).vote(post_id, direction).await
    }
}
