mod common;

use std::sync::Arc;

use chrono::Utc;
use common::*;
use habla_feed::cache::{FeedCache, KeyValueStore, MemoryStore, Staleness, TIMELINE_CACHE_KEY};
use habla_feed::error::FeedError;
use habla_feed::feed::{FeedController, FeedScope, FetchOutcome};
use habla_feed::i18n::Locale;
use habla_feed::location::NoLocation;
use habla_feed::nav::{CardDelegate, RecordingNavigator, Route};
use tokio::sync::oneshot;

async fn seeded_store(ids: &[&str]) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    FeedCache::new(store.clone(), Staleness::Unbounded)
        .save(&posts(ids), Utc::now())
        .await
        .unwrap();
    store
}

async fn cached_ids(store: &Arc<MemoryStore>) -> Vec<String> {
    FeedCache::new(store.clone(), Staleness::Unbounded)
        .load(Utc::now())
        .await
        .unwrap()
        .unwrap_or_default()
        .into_iter()
        .map(|p| p.id)
        .collect()
}

fn ids(feed_posts: &[habla_feed::model::Post]) -> Vec<&str> {
    feed_posts.iter().map(|p| p.id.as_str()).collect()
}

#[tokio::test]
async fn successful_fetch_replaces_list_in_returned_order() {
    let api = ScriptedApi::new();
    api.push_fetch(Ok(posts(&["a", "b", "c"])));
    let h = harness(api, FeedScope::Channel(channel("c1", "food")));

    assert_eq!(h.feed.load_cached().await, 0);
    let outcome = h.feed.mount().await;

    assert_eq!(outcome, FetchOutcome::Updated(3));
    let state = h.feed.state();
    assert_eq!(ids(&state.posts), ["a", "b", "c"]);
    assert_eq!(state.error, None);
    assert!(!state.refreshing);
    assert!(!h.store.contains(TIMELINE_CACHE_KEY).await);
}

#[tokio::test]
async fn network_failure_keeps_cached_posts_and_shows_connection_message() {
    let store = seeded_store(&["x", "y"]).await;
    let api = ScriptedApi::new();
    api.push_fetch(Err(network_error()));
    let h = harness_with_store(api, FeedScope::Root, store);

    let outcome = h.feed.mount().await;

    assert_eq!(outcome, FetchOutcome::Failed(FeedError::Connection));
    assert_eq!(ids(&h.feed.posts()), ["x", "y"]);
    assert_eq!(
        h.feed.error_message(),
        Some(Locale::En.feed_error(FeedError::Connection))
    );
    assert!(!h.feed.state().refreshing);
}

#[tokio::test]
async fn other_failures_are_classified_unexpected() {
    let api = ScriptedApi::new();
    api.push_fetch(Ok(posts(&["a"])));
    api.push_fetch(Err(server_error()));
    let h = harness(api, FeedScope::Root);

    h.feed.refresh().await;
    let outcome = h.feed.refresh().await;

    assert_eq!(outcome, FetchOutcome::Failed(FeedError::Unexpected));
    assert_eq!(ids(&h.feed.posts()), ["a"]);
    assert_eq!(h.feed.state().error, Some(FeedError::Unexpected));
}

#[tokio::test]
async fn success_clears_previous_error() {
    let api = ScriptedApi::new();
    api.push_fetch(Err(network_error()));
    api.push_fetch(Ok(posts(&["a"])));
    let h = harness(api, FeedScope::Root);

    h.feed.refresh().await;
    assert!(h.feed.error_message().is_some());
    h.feed.refresh().await;
    assert_eq!(h.feed.error_message(), None);
}

#[tokio::test]
async fn root_refresh_persists_even_after_failure() {
    let api = ScriptedApi::new();
    api.push_fetch(Ok(posts(&["a", "b"])));
    api.push_fetch(Err(network_error()));
    let h = harness(api, FeedScope::Root);

    h.feed.refresh().await;
    assert_eq!(cached_ids(&h.store).await, ["a", "b"]);

    // Overwrite the entry so the failed attempt's write is observable.
    h.store.set(TIMELINE_CACHE_KEY, "[]").await.unwrap();
    h.feed.refresh().await;
    assert_eq!(cached_ids(&h.store).await, ["a", "b"]);
}

#[tokio::test]
async fn channel_scope_never_touches_cache() {
    let store = seeded_store(&["cached"]).await;
    let api = ScriptedApi::new();
    api.push_fetch(Err(network_error()));
    let h = harness_with_store(api, FeedScope::Channel(channel("c1", "food")), store);

    h.feed.mount().await;

    assert!(h.feed.posts().is_empty());
    assert_eq!(cached_ids(&h.store).await, ["cached"]);
    assert_eq!(h.api.fetch_calls()[0].channel_id.as_deref(), Some("c1"));
}

#[tokio::test]
async fn query_carries_scope_and_location() {
    let api = ScriptedApi::new();
    api.push_fetch(Ok(vec![]));
    let h = harness(api, FeedScope::Root);

    h.feed.fetch_posts().await;

    let calls = h.api.fetch_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].channel_id, None);
    assert_eq!(calls[0].location, Some(HERE));
}

#[tokio::test]
async fn denied_location_still_queries_without_coordinates() {
    let api = Arc::new(ScriptedApi::new());
    api.push_fetch(Ok(posts(&["a"])));
    let feed = FeedController::new(
        api.clone(),
        NoLocation,
        FeedCache::new(MemoryStore::new(), Staleness::Unbounded),
        RecordingNavigator::new(),
        FeedScope::Root,
    );

    assert_eq!(feed.refresh().await, FetchOutcome::Updated(1));
    assert_eq!(api.fetch_calls()[0].location, None);
}

#[tokio::test]
async fn corrupt_cache_is_ignored() {
    let store = Arc::new(MemoryStore::new());
    store.set(TIMELINE_CACHE_KEY, "{not json").await.unwrap();
    let h = harness_with_store(ScriptedApi::new(), FeedScope::Root, store);

    assert_eq!(h.feed.load_cached().await, 0);
    assert!(h.feed.posts().is_empty());
}

#[tokio::test]
async fn submitted_post_goes_first_and_closes_modal() {
    let api = ScriptedApi::new();
    api.push_fetch(Ok(posts(&["a", "b"])));
    let h = harness(api, FeedScope::Root);

    h.feed.new_post();
    assert!(h.feed.state().show_new_post_modal);
    h.feed.submit_new_post(post("fresh"));
    assert_eq!(ids(&h.feed.posts()), ["fresh"]);
    assert!(!h.feed.state().show_new_post_modal);

    h.feed.refresh().await;
    h.feed.new_post();
    h.feed.submit_new_post(post("newer"));
    let state = h.feed.state();
    assert_eq!(ids(&state.posts), ["newer", "a", "b"]);
    assert!(!state.show_new_post_modal);
    assert_eq!(h.api.fetch_calls().len(), 1);
}

#[tokio::test]
async fn dismissing_modal_keeps_list() {
    let h = harness(ScriptedApi::new(), FeedScope::Root);
    h.feed.submit_new_post(post("a"));
    h.feed.new_post();
    h.feed.dismiss_new_post();
    assert!(!h.feed.state().show_new_post_modal);
    assert_eq!(ids(&h.feed.posts()), ["a"]);
}

#[tokio::test]
async fn superseded_refresh_is_discarded() {
    let (tx_old, rx_old) = oneshot::channel();
    let (tx_new, rx_new) = oneshot::channel();
    let h = harness(GatedApi::new(vec![rx_old, rx_new]), FeedScope::Root);

    let (first, second, ()) = tokio::join!(h.feed.refresh(), h.feed.refresh(), async {
        tx_new.send(Ok(posts(&["new"]))).unwrap();
        tokio::task::yield_now().await;
        tx_old.send(Ok(posts(&["old"]))).unwrap();
    });

    assert_eq!(first, FetchOutcome::Superseded);
    assert_eq!(second, FetchOutcome::Updated(1));
    let state = h.feed.state();
    assert_eq!(ids(&state.posts), ["new"]);
    assert!(!state.refreshing);
    assert_eq!(cached_ids(&h.store).await, ["new"]);
}

#[tokio::test]
async fn superseded_failure_does_not_set_error() {
    let (tx_old, rx_old) = oneshot::channel();
    let (tx_new, rx_new) = oneshot::channel();
    let h = harness(GatedApi::new(vec![rx_old, rx_new]), FeedScope::Root);

    let (first, second, ()) = tokio::join!(h.feed.refresh(), h.feed.refresh(), async {
        tx_new.send(Ok(posts(&["new"]))).unwrap();
        tokio::task::yield_now().await;
        tx_old.send(Err(network_error())).unwrap();
    });

    assert_eq!(first, FetchOutcome::Superseded);
    assert_eq!(second, FetchOutcome::Updated(1));
    assert_eq!(h.feed.state().error, None);
}

#[tokio::test]
async fn open_channel_only_from_root() {
    let root = harness(ScriptedApi::new(), FeedScope::Root);
    let food = channel("c1", "food");
    root.feed.open_channel(&food);
    assert_eq!(
        root.navigator.routes(),
        [Route::Timeline {
            channel: Some(food.clone())
        }]
    );

    let scoped = harness(ScriptedApi::new(), FeedScope::Channel(food.clone()));
    scoped.feed.open_channel(&channel("c2", "rust"));
    scoped.feed.open_notifications();
    assert!(scoped.navigator.routes().is_empty());
}

#[tokio::test]
async fn profile_and_post_routes_are_pushed() {
    let h = harness(ScriptedApi::new(), FeedScope::Channel(channel("c1", "food")));
    let p = post("a");
    let owner = p.owner.clone().unwrap();

    CardDelegate::open_profile(&h.feed, &owner);
    h.feed.open_post(&p);

    assert_eq!(
        h.navigator.routes(),
        [Route::Profile(owner), Route::Post(p)]
    );
}

#[test]
fn title_follows_scope_and_locale() {
    let root = harness(ScriptedApi::new(), FeedScope::Root);
    assert_eq!(root.feed.title(), "Timeline");

    let store = Arc::new(MemoryStore::new());
    let pt = FeedController::new(
        Arc::new(ScriptedApi::new()),
        NoLocation,
        FeedCache::new(store, Staleness::Unbounded),
        RecordingNavigator::new(),
        FeedScope::Root,
    )
    .with_locale(Locale::Pt);
    assert_eq!(pt.title(), "Linha do tempo");

    let scoped = harness(ScriptedApi::new(), FeedScope::Channel(channel("c1", "food")));
    assert_eq!(scoped.feed.title(), "#food");
}
