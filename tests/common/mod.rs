#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use habla_feed::cache::{FeedCache, MemoryStore, Staleness};
use habla_feed::client::{FeedApi, PostsQuery};
use habla_feed::error::ApiError;
use habla_feed::feed::{FeedController, FeedScope};
use habla_feed::location::FixedLocation;
use habla_feed::model::{Channel, Coordinates, Post, VoteOutcome, VoteType};
use habla_feed::nav::RecordingNavigator;
use serde_json::json;
use tokio::sync::oneshot;

pub const HERE: Coordinates = Coordinates {
    latitude: -23.55,
    longitude: -46.63,
};

pub fn post(id: &str) -> Post {
    serde_json::from_value(json!({
        "id": id,
        "body": format!("post {id}"),
        "createdAt": "2026-01-30T00:00:00Z",
        "commentsCount": 0,
        "rate": 1,
        "owner": { "uid": "u1", "username": "alice" },
    }))
    .unwrap()
}

pub fn posts(ids: &[&str]) -> Vec<Post> {
    ids.iter().map(|id| post(id)).collect()
}

pub fn channel(id: &str, name: &str) -> Channel {
    Channel {
        id: id.to_string(),
        name: name.to_string(),
    }
}

pub fn outcome(post_id: &str, kind: VoteType, rate: i64) -> VoteOutcome {
    serde_json::from_value(json!({
        "type": kind,
        "post": { "id": post_id, "rate": rate },
        "profile": { "uid": "u1", "photoURL": null },
    }))
    .unwrap()
}

/// Status failures classify as connectivity problems.
pub fn network_error() -> ApiError {
    ApiError::Status {
        endpoint: "http://test/graphql".to_string(),
        status: 502,
    }
}

pub fn server_error() -> ApiError {
    ApiError::Graphql(vec!["boom".to_string()])
}

#[derive(Default)]
pub struct ScriptedApi {
    fetches: Mutex<VecDeque<Result<Vec<Post>, ApiError>>>,
    votes: Mutex<VecDeque<Result<VoteOutcome, ApiError>>>,
    pub fetch_calls: Mutex<Vec<PostsQuery>>,
    pub vote_calls: Mutex<Vec<(String, VoteType)>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_fetch(&self, result: Result<Vec<Post>, ApiError>) -> &Self {
        self.fetches.lock().unwrap().push_back(result);
        self
    }

    pub fn push_vote(&self, result: Result<VoteOutcome, ApiError>) -> &Self {
        self.votes.lock().unwrap().push_back(result);
        self
    }

    pub fn fetch_calls(&self) -> Vec<PostsQuery> {
        self.fetch_calls.lock().unwrap().clone()
    }

    pub fn vote_calls(&self) -> Vec<(String, VoteType)> {
        self.vote_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedApi for ScriptedApi {
    async fn fetch_posts(&self, query: &PostsQuery) -> Result<Vec<Post>, ApiError> {
        self.fetch_calls.lock().unwrap().push(query.clone());
        self.fetches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(server_error()))
    }

    async fn vote(&self, post_id: &str, direction: VoteType) -> Result<VoteOutcome, ApiError> {
        self.vote_calls
            .lock()
            .unwrap()
            .push((post_id.to_string(), direction));
        self.votes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(server_error()))
    }
}

/// Each fetch waits until the test releases its result.
pub struct GatedApi {
    gates: Mutex<VecDeque<oneshot::Receiver<Result<Vec<Post>, ApiError>>>>,
}

impl GatedApi {
    pub fn new(gates: Vec<oneshot::Receiver<Result<Vec<Post>, ApiError>>>) -> Self {
        Self {
            gates: Mutex::new(gates.into()),
        }
    }
}

#[async_trait]
impl FeedApi for GatedApi {
    async fn fetch_posts(&self, _query: &PostsQuery) -> Result<Vec<Post>, ApiError> {
        let gate = self.gates.lock().unwrap().pop_front();
        match gate {
            Some(rx) => rx.await.unwrap_or_else(|_| Err(server_error())),
            None => Err(server_error()),
        }
    }

    async fn vote(&self, _post_id: &str, _direction: VoteType) -> Result<VoteOutcome, ApiError> {
        Err(server_error())
    }
}

pub type TestFeed<A> =
    FeedController<Arc<A>, FixedLocation, Arc<MemoryStore>, Arc<RecordingNavigator>>;

pub struct Harness<A> {
    pub api: Arc<A>,
    pub store: Arc<MemoryStore>,
    pub navigator: Arc<RecordingNavigator>,
    pub feed: TestFeed<A>,
}

pub fn harness<A: FeedApi>(api: A, scope: FeedScope) -> Harness<A> {
    harness_with_store(api, scope, Arc::new(MemoryStore::new()))
}

pub fn harness_with_store<A: FeedApi>(
    api: A,
    scope: FeedScope,
    store: Arc<MemoryStore>,
) -> Harness<A> {
    let api = Arc::new(api);
    let navigator = Arc::new(RecordingNavigator::new());
    let feed = FeedController::new(
        api.clone(),
        FixedLocation(HERE),
        FeedCache::new(store.clone(), Staleness::Unbounded),
        navigator.clone(),
        scope,
    );
    Harness {
        api,
        store,
        navigator,
        feed,
    }
}
