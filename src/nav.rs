use std::sync::Mutex;

use crate::model::{Channel, Post, Profile};

/// A push-style request for the host navigator.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Timeline { channel: Option<Channel> },
    Profile(Profile),
    Post(Post),
    Notifications,
}

pub trait Navigator: Send + Sync {
    fn push(&self, route: Route);
}

/// Navigation callbacks a card invokes but does not implement.
pub trait CardDelegate {
    fn open_profile(&self, profile: &Profile);

    fn open_channel(&self, channel: &Channel);
}

/// Logs requests instead of navigating; used by the command line front end.
#[derive(Debug, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn push(&self, route: Route) {
        match &route {
            Route::Timeline { channel: Some(c) } => {
                tracing::info!(channel = %c.name, "navigate: channel timeline")
            }
            Route::Timeline { channel: None } => tracing::info!("navigate: timeline"),
            Route::Profile(p) => tracing::info!(uid = %p.uid, "navigate: profile"),
            Route::Post(p) => tracing::info!(post_id = %p.id, "navigate: post"),
            Route::Notifications => tracing::info!("navigate: notifications"),
        }
    }
}

/// Keeps every pushed route in order.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> Vec<Route> {
        self.routes
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn push(&self, route: Route) {
        if let Ok(mut routes) = self.routes.lock() {
            routes.push(route);
        }
    }
}

impl<N: Navigator + ?Sized> Navigator for std::sync::Arc<N> {
    fn push(&self, route: Route) {
        (**self).push(route)
    }
}
