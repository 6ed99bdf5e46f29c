use std::collections::HashMap;
use std::io::Write as _;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::model::Post;

pub const TIMELINE_CACHE_KEY: &str = "cached-timeline";

/// String-keyed blob storage, the local persistence the feed is given.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// One file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let dir = self.dir.clone();
        let value = value.to_owned();

        // Each write goes through its own temp file, then replaces the entry in one rename.
        let written = tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            std::fs::create_dir_all(&dir)?;
            let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
            tmp.write_all(value.as_bytes())?;
            tmp.persist(&path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(std::io::Error::other)
        .and_then(|res| res);

        written.map_err(|source| StoreError::Io {
            key: key.to_string(),
            source,
        })
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: tokio::sync::Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.entries.lock().await.contains_key(key)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// How long a cached root feed stays usable for hydration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Staleness {
    /// Any saved list is shown until the next successful fetch replaces it.
    #[default]
    Unbounded,
    MaxAge(Duration),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedTimeline {
    pub saved_at: DateTime<Utc>,
    pub posts: Vec<Post>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredTimeline {
    Entry(CachedTimeline),
    // Older clients wrote the bare list.
    Legacy(Vec<Post>),
}

/// The "last fetched root feed" entry on top of a [`KeyValueStore`].
pub struct FeedCache<S> {
    store: S,
    staleness: Staleness,
}

impl<S: KeyValueStore> FeedCache<S> {
    pub fn new(store: S, staleness: Staleness) -> Self {
        Self { store, staleness }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads the saved list. `Ok(None)` when nothing usable is stored.
    pub async fn load(&self, now: DateTime<Utc>) -> Result<Option<Vec<Post>>, StoreError> {
        let Some(text) = self.store.get(TIMELINE_CACHE_KEY).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<StoredTimeline>(&text)? {
            StoredTimeline::Legacy(posts) => Ok(Some(posts)),
            StoredTimeline::Entry(entry) => {
                if let Staleness::MaxAge(max_age) = self.staleness {
                    let age = (now - entry.saved_at).to_std().unwrap_or_default();
                    if age > max_age {
                        tracing::info!(
                            age_secs = age.as_secs(),
                            max_age_secs = max_age.as_secs(),
                            "cached timeline is stale; ignoring"
                        );
                        return Ok(None);
                    }
                }
                Ok(Some(entry.posts))
            }
        }
    }

    pub async fn save(&self, posts: &[Post], now: DateTime<Utc>) -> Result<(), StoreError> {
        let entry = CachedTimeline {
            saved_at: now,
            posts: posts.to_vec(),
        };
        let text = serde_json::to_string(&entry)?;
        self.store.set(TIMELINE_CACHE_KEY, &text).await
    }
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value).await
    }
}
