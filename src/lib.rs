pub mod cache;
pub mod card;
pub mod client;
pub mod error;
pub mod feed;
pub mod i18n;
pub mod location;
pub mod model;
pub mod nav;
pub mod render;

mod builtin;
mod cli;
mod progress;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use chrono::Utc;

use cache::{FeedCache, FileStore, Staleness};
use card::VoteAttempt;
use client::{ClientOptions, GraphqlClient};
use feed::{FeedController, FeedScope, FetchOutcome};
use location::{FixedLocation, LocationProvider, NoLocation};
use model::{Channel, Coordinates};
use nav::LogNavigator;

pub use cli::{Args as CliArgs, Command, CommonArgs, Direction, ProgressMode};

type CliFeed = FeedController<GraphqlClient, Box<dyn LocationProvider>, FileStore, LogNavigator>;

pub async fn run(args: CliArgs) -> anyhow::Result<()> {
    use std::io::IsTerminal as _;

    let progress_enabled = match args.common.progress {
        ProgressMode::Always => true,
        ProgressMode::Never => false,
        ProgressMode::Auto => std::io::stderr().is_terminal(),
    };
    let progress = progress::Progress::new(progress_enabled);

    let res = match &args.command {
        Command::Timeline {
            channel_id,
            channel_name,
            out,
        } => {
            let scope = match channel_id {
                Some(id) => FeedScope::Channel(Channel {
                    id: id.clone(),
                    name: channel_name.clone().unwrap_or_else(|| id.clone()),
                }),
                None => FeedScope::Root,
            };
            let feed = build_feed(&args.common, scope)?;
            timeline(&feed, out.as_deref(), &progress).await
        }
        Command::Vote { post_id, direction } => {
            let feed = build_feed(&args.common, FeedScope::Root)?;
            vote(&feed, post_id, (*direction).into(), &progress).await
        }
    };
    progress.finish();
    res
}

fn build_feed(common: &CommonArgs, scope: FeedScope) -> anyhow::Result<CliFeed> {
    let options = ClientOptions {
        user_agent: common.user_agent.clone(),
        token: common.token.clone(),
        timeout: common.timeout_secs.map(Duration::from_secs),
    };
    let api = GraphqlClient::new(common.endpoint.clone(), &options)
        .with_context(|| format!("create client for {}", common.endpoint))?;

    let location: Box<dyn LocationProvider> = match (common.latitude, common.longitude) {
        (Some(latitude), Some(longitude)) => Box::new(FixedLocation(Coordinates {
            latitude,
            longitude,
        })),
        _ => Box::new(NoLocation),
    };

    let staleness = match common.cache_max_age_secs {
        Some(secs) => Staleness::MaxAge(Duration::from_secs(secs)),
        None => Staleness::Unbounded,
    };
    let cache = FeedCache::new(FileStore::new(common.cache_dir.clone()), staleness);

    Ok(FeedController::new(api, location, cache, LogNavigator, scope).with_locale(common.locale))
}

async fn timeline(
    feed: &CliFeed,
    out: Option<&std::path::Path>,
    progress: &Arc<progress::Progress>,
) -> anyhow::Result<()> {
    progress.set_stage("loading cached timeline");
    feed.load_cached().await;

    progress.set_stage("fetching posts");
    match feed.refresh().await {
        FetchOutcome::Updated(count) => tracing::info!(count, "fetched timeline"),
        FetchOutcome::Failed(error) => tracing::warn!(?error, "showing last known timeline"),
        FetchOutcome::Superseded => {}
    }

    progress.set_stage("rendering");
    let now = Utc::now();
    let locale = feed.locale();
    let views: Vec<_> = feed.cards().iter().map(|c| c.view(locale, now)).collect();
    let title = feed.title();
    let page = render::FeedPage {
        title: &title,
        locale,
        error: feed.error_message(),
        cards: &views,
    };

    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("create {}", parent.display()))?;
                }
            }
            std::fs::write(path, render::build_html(&page))
                .with_context(|| format!("write {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote timeline html");
        }
        None => print!("{}", render::build_text(&page)),
    }
    Ok(())
}

async fn vote(
    feed: &CliFeed,
    post_id: &str,
    direction: model::VoteType,
    progress: &Arc<progress::Progress>,
) -> anyhow::Result<()> {
    progress.set_stage("fetching posts");
    feed.mount().await;

    let mut card = feed
        .cards()
        .into_iter()
        .find(|c| c.post().id == post_id)
        .with_context(|| format!("post {post_id} is not in the timeline"))?;

    progress.set_stage(format!("voting {direction}"));
    match card.vote(feed.api(), direction).await {
        VoteAttempt::Confirmed => {
            println!("{post_id}: rate {} ({direction})", card.rate());
            Ok(())
        }
        VoteAttempt::Failed { retryable } => {
            let err = card
                .last_error()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "vote failed".to_string());
            if retryable {
                anyhow::bail!("{err} (retry later)")
            }
            anyhow::bail!("{err}")
        }
        VoteAttempt::Ignored => Ok(()),
    }
}
