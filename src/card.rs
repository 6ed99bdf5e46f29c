use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::client::FeedApi;
use crate::error::VoteError;
use crate::i18n::Locale;
use crate::model::{Channel, Post, Profile, VoteOutcome, VoteType};
use crate::nav::CardDelegate;

static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#((?-u:\w)+)").expect("hashtag regex"));

#[derive(Debug, Clone, PartialEq)]
pub enum BodySegment {
    Text(String),
    /// `tag` is the name without the leading `#`.
    Hashtag {
        tag: String,
        channel: Option<Channel>,
    },
}

/// Everything a renderer needs for one card.
#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub post_id: String,
    pub author: String,
    pub author_photo: Option<String>,
    pub can_open_author: bool,
    pub distance: Option<String>,
    pub segments: Vec<BodySegment>,
    pub photo_url: Option<String>,
    pub rate: i64,
    pub vote: Option<VoteType>,
    pub can_vote_up: bool,
    pub can_vote_down: bool,
    pub vote_pending: bool,
    pub vote_error: Option<String>,
    pub age: String,
    pub channel: Option<Channel>,
    pub comments_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteAttempt {
    /// Not a vote direction; nothing was sent.
    Ignored,
    Confirmed,
    Failed { retryable: bool },
}

#[derive(Debug, Default)]
struct Overlay {
    pending: Option<VoteType>,
    confirmed: Option<VoteOutcome>,
    error: Option<VoteError>,
}

/// One post as displayed: the post the list handed over plus local vote state.
#[derive(Debug)]
pub struct PostCard {
    post: Post,
    overlay: Overlay,
}

impl PostCard {
    pub fn new(post: Post) -> Self {
        Self {
            post,
            overlay: Overlay::default(),
        }
    }

    pub fn post(&self) -> &Post {
        &self.post
    }

    /// Installs the list's current copy of the post, dropping local vote state.
    pub fn replace_post(&mut self, post: Post) {
        self.post = post;
        self.overlay = Overlay::default();
    }

    pub fn rate(&self) -> i64 {
        match &self.overlay.confirmed {
            Some(outcome) => outcome.post.rate.unwrap_or(0),
            None => self.post.displayed_rate(),
        }
    }

    pub fn active_vote(&self) -> Option<VoteType> {
        match &self.overlay.confirmed {
            Some(outcome) => Some(outcome.kind),
            None => self.post.active_vote(),
        }
    }

    pub fn last_error(&self) -> Option<&VoteError> {
        self.overlay.error.as_ref()
    }

    /// Same as [`PostCard::vote`] for a raw direction tag; unknown tags are ignored.
    pub async fn vote_tag<A: FeedApi + ?Sized>(&mut self, api: &A, tag: &str) -> VoteAttempt {
        match tag.parse::<VoteType>() {
            Ok(direction) => self.vote(api, direction).await,
            Err(e) => {
                tracing::debug!(post_id = %self.post.id, error = %e, "ignoring vote");
                VoteAttempt::Ignored
            }
        }
    }

    pub async fn vote<A: FeedApi + ?Sized>(&mut self, api: &A, direction: VoteType) -> VoteAttempt {
        self.overlay.pending = Some(direction);
        self.overlay.error = None;

        let result = api.vote(&self.post.id, direction).await;
        self.overlay.pending = None;

        match result {
            Ok(outcome) => {
                tracing::debug!(
                    post_id = %self.post.id,
                    %direction,
                    rate = ?outcome.post.rate,
                    "vote confirmed"
                );
                self.overlay.confirmed = Some(outcome);
                VoteAttempt::Confirmed
            }
            Err(source) => {
                let err = VoteError {
                    post_id: self.post.id.clone(),
                    direction,
                    source,
                };
                tracing::warn!(error = %err, "vote failed");
                let retryable = err.is_retryable();
                self.overlay.error = Some(err);
                VoteAttempt::Failed { retryable }
            }
        }
    }

    /// Looks `name` up among the channels already attached to the post.
    pub fn resolve_hashtag(&self, name: &str) -> Option<&Channel> {
        let name = name.strip_prefix('#').unwrap_or(name);
        self.post
            .channels
            .iter()
            .chain(self.post.channel.iter())
            .find(|c| c.name == name)
    }

    pub fn press_hashtag<D: CardDelegate + ?Sized>(&self, name: &str, delegate: &D) -> bool {
        match self.resolve_hashtag(name) {
            Some(channel) => {
                delegate.open_channel(channel);
                true
            }
            None => false,
        }
    }

    pub fn press_owner<D: CardDelegate + ?Sized>(&self, delegate: &D) -> bool {
        match self.owner() {
            Some(owner) => {
                delegate.open_profile(owner);
                true
            }
            None => false,
        }
    }

    pub fn press_channel<D: CardDelegate + ?Sized>(&self, delegate: &D) -> bool {
        match &self.post.channel {
            Some(channel) => {
                delegate.open_channel(channel);
                true
            }
            None => false,
        }
    }

    pub fn segments(&self) -> Vec<BodySegment> {
        let body = self.post.body.as_str();
        let mut out = Vec::new();
        let mut last = 0usize;
        for caps in HASHTAG_RE.captures_iter(body) {
            let (Some(m), Some(tag)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if m.start() > last {
                out.push(BodySegment::Text(body[last..m.start()].to_string()));
            }
            out.push(BodySegment::Hashtag {
                tag: tag.as_str().to_string(),
                channel: self.resolve_hashtag(tag.as_str()).cloned(),
            });
            last = m.end();
        }
        if last < body.len() {
            out.push(BodySegment::Text(body[last..].to_string()));
        }
        out
    }

    pub fn view(&self, locale: Locale, now: DateTime<Utc>) -> CardView {
        let owner = self.owner();
        let author = match owner {
            Some(p) if !self.post.anonymous => p.username.clone(),
            _ => locale.anonymous_label().to_string(),
        };
        let vote = self.active_vote();

        CardView {
            post_id: self.post.id.clone(),
            author,
            author_photo: owner.and_then(|p| p.photo_url.clone()),
            can_open_author: owner.is_some(),
            distance: self
                .post
                .distance
                .map(|d| locale.distance(d).to_string())
                .filter(|s| !s.is_empty()),
            segments: self.segments(),
            photo_url: self.post.photo_url.clone(),
            rate: self.rate(),
            vote,
            can_vote_up: vote != Some(VoteType::Up),
            can_vote_down: vote != Some(VoteType::Down),
            vote_pending: self.overlay.pending.is_some(),
            vote_error: self.overlay.error.as_ref().map(|e| e.to_string()),
            age: locale.relative_time(self.post.created_at, now),
            channel: self.post.channel.clone(),
            comments_count: self.post.comments_count,
        }
    }

    fn owner(&self) -> Option<&Profile> {
        self.post.owner.as_ref()
    }
}
