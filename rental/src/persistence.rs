//! Key-value persistence of the marketplace collections.
//!
//! Each collection is stored as one JSON document under a fixed key. Loading
//! never fails: a missing or unreadable key falls back to the demo data.
//! Writes are issued by the reducer as fire-and-forget effects through a
//! [`StorageWriter`], which applies them in the order they were issued; a
//! failed write is logged and otherwise ignored.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::{Mutex, watch};

use crate::{rating, seed};
use crate::state::RentalState;

/// Errors from a [`KeyValueStore`]
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem failure
    #[error("I/O error for {key}: {source}")]
    Io {
        /// Key being accessed
        key: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Value could not be encoded
    #[error("Serialization error for {key}: {source}")]
    Serialization {
        /// Key being written
        key: String,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// Key contains characters not allowed in a file name
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

/// Logical names of the stored collections
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// Signed-in user
    User,
    /// Fleet
    Cars,
    /// Bookings
    Bookings,
    /// Reviews
    Reviews,
    /// Favorite car ids
    Favorites,
}

impl StorageKey {
    /// Every key
    pub const ALL: [Self; 5] = [Self::User, Self::Cars, Self::Bookings, Self::Reviews, Self::Favorites];

    /// Key string used in the store
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "driveeasy_user",
            Self::Cars => "driveeasy_cars",
            Self::Bookings => "driveeasy_bookings",
            Self::Reviews => "driveeasy_reviews",
            Self::Favorites => "driveeasy_favorites",
        }
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// String key-value storage
///
/// Object safe so environments can hold `Arc<dyn KeyValueStore>`.
pub trait KeyValueStore: Send + Sync {
    /// Value under `key`, if any
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>, StorageError>>;

    /// Stores `value` under `key`
    fn set<'a>(&'a self, key: &'a str, value: String) -> BoxFuture<'a, Result<(), StorageError>>;

    /// Deletes `key`; deleting a missing key succeeds
    fn remove<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>>;

    /// Deletes every key
    fn clear(&self) -> BoxFuture<'_, Result<(), StorageError>>;
}

/// In-process storage, for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether nothing is stored
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>, StorageError>> {
        async move { Ok(self.entries.lock().await.get(key).cloned()) }.boxed()
    }

    fn set<'a>(&'a self, key: &'a str, value: String) -> BoxFuture<'a, Result<(), StorageError>> {
        async move {
            self.entries.lock().await.insert(key.to_string(), value);
            Ok(())
        }
        .boxed()
    }

    fn remove<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
        async move {
            self.entries.lock().await.remove(key);
            Ok(())
        }
        .boxed()
    }

    fn clear(&self) -> BoxFuture<'_, Result<(), StorageError>> {
        async move {
            self.entries.lock().await.clear();
            Ok(())
        }
        .boxed()
    }
}

/// Storage in a directory, one `<key>.json` file per key
///
/// Files are replaced atomically by writing a temporary file and renaming it.
/// Every write gets its own temporary file, so concurrent writes to one key
/// leave one complete document behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    tmp_seq: Arc<AtomicU64>,
}

impl FileStore {
    /// Store rooted at `dir`; the directory is created on first write
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            tmp_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Root directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn io_error(key: &str) -> impl FnOnce(std::io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        key: key.to_string(),
        source,
    }
}

impl KeyValueStore for FileStore {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>, StorageError>> {
        async move {
            let path = self.path(key)?;
            match tokio::fs::read_to_string(&path).await {
                Ok(value) => Ok(Some(value)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(io_error(key)(e)),
            }
        }
        .boxed()
    }

    fn set<'a>(&'a self, key: &'a str, value: String) -> BoxFuture<'a, Result<(), StorageError>> {
        async move {
            let path = self.path(key)?;
            tokio::fs::create_dir_all(&self.dir).await.map_err(io_error(key))?;
            let seq = self.tmp_seq.fetch_add(1, Ordering::Relaxed);
            let tmp = path.with_extension(format!("json.{}-{seq}.tmp", std::process::id()));
            tokio::fs::write(&tmp, value).await.map_err(io_error(key))?;
            tokio::fs::rename(&tmp, &path).await.map_err(io_error(key))
        }
        .boxed()
    }

    fn remove<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
        async move {
            let path = self.path(key)?;
            match tokio::fs::remove_file(&path).await {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(io_error(key)(e)),
                _ => Ok(()),
            }
        }
        .boxed()
    }

    fn clear(&self) -> BoxFuture<'_, Result<(), StorageError>> {
        async move {
            let mut entries = match tokio::fs::read_dir(&self.dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
                Err(e) => return Err(io_error("*")(e)),
            };
            while let Some(entry) = entries.next_entry().await.map_err(io_error("*"))? {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "json") {
                    tokio::fs::remove_file(&path).await.map_err(io_error("*"))?;
                }
            }
            Ok(())
        }
        .boxed()
    }
}

/// One pending storage operation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageWrite {
    /// Delete every key
    Clear,
    /// Store a JSON document
    Set {
        /// Target key
        key: StorageKey,
        /// Encoded collection
        value: String,
    },
    /// Delete one key
    Remove {
        /// Target key
        key: StorageKey,
    },
}

fn encode<T: Serialize + ?Sized>(key: StorageKey, value: &T) -> Option<StorageWrite> {
    match serde_json::to_string(value) {
        Ok(value) => Some(StorageWrite::Set { key, value }),
        Err(source) => {
            let error = StorageError::Serialization {
                key: key.to_string(),
                source,
            };
            tracing::warn!(%error, "Skipping write");
            None
        },
    }
}

/// Encodes the current value of each key
///
/// A signed-out user is written as a removal of its key.
#[must_use]
pub fn snapshot(state: &RentalState, keys: &[StorageKey]) -> Vec<StorageWrite> {
    keys.iter()
        .filter_map(|&key| match key {
            StorageKey::User => match &state.current_user {
                Some(user) => encode(key, user),
                None => Some(StorageWrite::Remove { key }),
            },
            StorageKey::Cars => encode(key, &state.cars),
            StorageKey::Bookings => encode(key, &state.bookings),
            StorageKey::Reviews => encode(key, &state.reviews),
            StorageKey::Favorites => encode(key, &state.favorites),
        })
        .collect()
}

/// Applies writes in order, logging and skipping failures
pub async fn apply_writes(store: &dyn KeyValueStore, writes: Vec<StorageWrite>) {
    for write in writes {
        let result = match &write {
            StorageWrite::Clear => store.clear().await,
            StorageWrite::Set { key, value } => store.set(key.as_str(), value.clone()).await,
            StorageWrite::Remove { key } => store.remove(key.as_str()).await,
        };
        match result {
            Ok(()) => tracing::trace!(?write, "Storage write applied"),
            Err(error) => tracing::warn!(%error, "Storage write failed"),
        }
    }
}

/// Applies write batches in the order they were enqueued
///
/// `enqueue` takes a ticket synchronously, so batches issued from the reducer
/// land in command order no matter how their effects are scheduled.
pub struct StorageWriter {
    store: Arc<dyn KeyValueStore>,
    issued: AtomicU64,
    applied: watch::Sender<u64>,
}

impl StorageWriter {
    /// Writer over `store`
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            issued: AtomicU64::new(0),
            applied: watch::Sender::new(0),
        }
    }

    /// Reserves the next slot and returns a future that applies `writes`
    /// once every earlier batch has finished
    pub fn enqueue(self: &Arc<Self>, writes: Vec<StorageWrite>) -> impl Future<Output = ()> + Send + 'static {
        let ticket = self.issued.fetch_add(1, Ordering::SeqCst);
        let this = Arc::clone(self);
        async move {
            let mut applied = this.applied.subscribe();
            let ready = applied.wait_for(|done| *done >= ticket).await.is_ok();
            if !ready {
                return;
            }
            let _done = Advance(&this.applied);
            apply_writes(this.store.as_ref(), writes).await;
        }
    }
}

impl std::fmt::Debug for StorageWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageWriter")
            .field("issued", &self.issued.load(Ordering::SeqCst))
            .field("applied", &*self.applied.borrow())
            .finish_non_exhaustive()
    }
}

/// Releases the next ticket even if the batch is dropped mid-write
struct Advance<'a>(&'a watch::Sender<u64>);

impl Drop for Advance<'_> {
    fn drop(&mut self) {
        self.0.send_modify(|done| *done += 1);
    }
}

async fn load_key<T: DeserializeOwned>(store: &dyn KeyValueStore, key: StorageKey, fallback: impl FnOnce() -> T) -> T {
    match store.get(key.as_str()).await {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(%key, %error, "Malformed stored value, using defaults");
                fallback()
            },
        },
        Ok(None) => {
            tracing::debug!(%key, "Nothing stored, using defaults");
            fallback()
        },
        Err(error) => {
            tracing::warn!(%key, %error, "Storage read failed, using defaults");
            fallback()
        },
    }
}

/// Loads the marketplace from `store`, falling back per key to demo data
///
/// Car ratings are recomputed from the loaded reviews, since the two keys
/// can fall back or fail to write independently.
pub async fn load_state(store: &dyn KeyValueStore) -> RentalState {
    let mut state = RentalState {
        current_user: load_key(store, StorageKey::User, || None).await,
        cars: load_key(store, StorageKey::Cars, seed::cars).await,
        bookings: load_key(store, StorageKey::Bookings, seed::bookings).await,
        reviews: load_key(store, StorageKey::Reviews, seed::reviews).await,
        favorites: load_key(store, StorageKey::Favorites, Vec::new).await,
        ..RentalState::seeded()
    };
    for car in &mut state.cars {
        rating::apply(car, &state.reviews);
    }
    tracing::info!(
        cars = state.cars.len(),
        bookings = state.bookings.len(),
        reviews = state.reviews.len(),
        signed_in = state.current_user.is_some(),
        "Marketplace loaded"
    );
    state
}
