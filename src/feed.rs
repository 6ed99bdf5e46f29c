use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;

use crate::cache::{FeedCache, KeyValueStore};
use crate::card::PostCard;
use crate::client::{FeedApi, PostsQuery};
use crate::error::FeedError;
use crate::i18n::Locale;
use crate::location::{self, LocationProvider};
use crate::model::{Channel, Post, Profile};
use crate::nav::{CardDelegate, Navigator, Route};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum FeedScope {
    #[default]
    Root,
    Channel(Channel),
}

impl FeedScope {
    pub fn is_root(&self) -> bool {
        matches!(self, FeedScope::Root)
    }

    pub fn channel(&self) -> Option<&Channel> {
        match self {
            FeedScope::Root => None,
            FeedScope::Channel(c) => Some(c),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeedState {
    pub posts: Vec<Post>,
    pub refreshing: bool,
    pub error: Option<FeedError>,
    pub show_new_post_modal: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The list was replaced with this many posts.
    Updated(usize),
    /// The list was kept; the error is now displayed.
    Failed(FeedError),
    /// A newer fetch was issued while this one was in flight; its result was dropped.
    Superseded,
}

#[derive(Default)]
struct Inner {
    state: FeedState,
    latest_generation: u64,
}

pub struct FeedController<A, L, S, N> {
    api: A,
    location: L,
    cache: FeedCache<S>,
    navigator: N,
    scope: FeedScope,
    locale: Locale,
    inner: Mutex<Inner>,
}

impl<A, L, S, N> FeedController<A, L, S, N>
where
    A: FeedApi,
    L: LocationProvider,
    S: KeyValueStore,
    N: Navigator,
{
    pub fn new(api: A, location: L, cache: FeedCache<S>, navigator: N, scope: FeedScope) -> Self {
        Self {
            api,
            location,
            cache,
            navigator,
            scope,
            locale: Locale::default(),
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn state(&self) -> FeedState {
        self.lock().state.clone()
    }

    pub fn posts(&self) -> Vec<Post> {
        self.lock().state.posts.clone()
    }

    pub fn cards(&self) -> Vec<PostCard> {
        self.lock()
            .state
            .posts
            .iter()
            .cloned()
            .map(PostCard::new)
            .collect()
    }

    pub fn error_message(&self) -> Option<&'static str> {
        self.lock().state.error.map(|e| self.locale.feed_error(e))
    }

    pub fn title(&self) -> String {
        match &self.scope {
            FeedScope::Root => self.locale.timeline_title().to_string(),
            FeedScope::Channel(c) => format!("#{}", c.name),
        }
    }

    /// Cache hydration then a first refresh.
    pub async fn mount(&self) -> FetchOutcome {
        self.load_cached().await;
        self.refresh().await
    }

    /// Shows the last saved root feed. Channel views never read the cache.
    pub async fn load_cached(&self) -> usize {
        if !self.scope.is_root() {
            return 0;
        }

        match self.cache.load(Utc::now()).await {
            Ok(Some(posts)) => {
                let count = posts.len();
                self.lock().state.posts = posts;
                tracing::info!(count, "hydrated timeline from cache");
                count
            }
            Ok(None) => 0,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable timeline cache");
                0
            }
        }
    }

    pub async fn refresh(&self) -> FetchOutcome {
        let generation = {
            let mut inner = self.lock();
            inner.state.refreshing = true;
            Self::next_generation(&mut inner)
        };

        let outcome = self.fetch_generation(generation).await;

        if self.scope.is_root() {
            let posts = self.posts();
            if let Err(e) = self.cache.save(&posts, Utc::now()).await {
                tracing::warn!(error = %e, "failed to persist timeline cache");
            }
        }
        outcome
    }

    pub async fn fetch_posts(&self) -> FetchOutcome {
        let generation = Self::next_generation(&mut self.lock());
        self.fetch_generation(generation).await
    }

    async fn fetch_generation(&self, generation: u64) -> FetchOutcome {
        let query = PostsQuery {
            channel_id: self.scope.channel().map(|c| c.id.clone()),
            location: location::resolve_best_effort(&self.location).await,
        };
        let result = self.api.fetch_posts(&query).await;

        let mut inner = self.lock();
        if generation != inner.latest_generation {
            tracing::debug!(
                generation,
                latest = inner.latest_generation,
                "dropping superseded feed response"
            );
            return FetchOutcome::Superseded;
        }

        inner.state.refreshing = false;
        match result {
            Ok(posts) => {
                let count = posts.len();
                inner.state.posts = posts;
                inner.state.error = None;
                tracing::info!(count, channel = ?query.channel_id, "timeline updated");
                FetchOutcome::Updated(count)
            }
            Err(e) => {
                let error = FeedError::classify(&e);
                tracing::warn!(error = %e, class = ?error, "failed to fetch posts");
                inner.state.error = Some(error);
                FetchOutcome::Failed(error)
            }
        }
    }

    pub fn new_post(&self) {
        self.lock().state.show_new_post_modal = true;
    }

    pub fn dismiss_new_post(&self) {
        self.lock().state.show_new_post_modal = false;
    }

    /// Puts a just-composed post at the top without re-fetching.
    pub fn submit_new_post(&self, post: Post) {
        let mut inner = self.lock();
        inner.state.show_new_post_modal = false;
        inner.state.posts.insert(0, post);
    }

    /// Only the root feed may push a channel timeline.
    pub fn open_channel(&self, channel: &Channel) {
        if !self.scope.is_root() {
            tracing::debug!(channel = %channel.name, "channel to channel navigation ignored");
            return;
        }
        self.navigator.push(Route::Timeline {
            channel: Some(channel.clone()),
        });
    }

    pub fn open_profile(&self, profile: &Profile) {
        self.navigator.push(Route::Profile(profile.clone()));
    }

    pub fn open_post(&self, post: &Post) {
        self.navigator.push(Route::Post(post.clone()));
    }

    pub fn open_notifications(&self) {
        if self.scope.is_root() {
            self.navigator.push(Route::Notifications);
        }
    }

    fn next_generation(inner: &mut Inner) -> u64 {
        inner.latest_generation += 1;
        inner.latest_generation
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<A, L, S, N> CardDelegate for FeedController<A, L, S, N>
where
    A: FeedApi,
    L: LocationProvider,
    S: KeyValueStore,
    N: Navigator,
{
    fn open_profile(&self, profile: &Profile) {
        FeedController::open_profile(self, profile)
    }

    fn open_channel(&self, channel: &Channel) {
        FeedController::open_channel(self, channel)
    }
}
