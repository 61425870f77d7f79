//! Cache collaborator contract.
//!
//! The coordinator never touches caches itself; it only makes them reachable
//! so middleware can. Two supply routes exist, mirroring how embedding
//! servers hand caches to the pipeline:
//!
//! - **Global lookup**: [`open`] returns the named cache from a process-wide
//!   registry, creating a default [`MemoryCache`] on first use.
//! - **Context**: stash an opened cache under the [`RequestCache`] token
//!   before middleware that wants it runs, e.g. from an early function
//!   middleware.
//!
//! ```
//! use switchyard::cache::{self, RequestCache};
//! use switchyard::pipeline::Context;
//!
//! let assets = cache::open("assets");
//! let mut ctx = Context::new();
//! ctx.insert::<RequestCache>(assets);
//! ```

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use lru::LruCache;
use once_cell::sync::Lazy;
use tracing::debug;

use crate::pipeline::{ContextKey, RouterRequest, RouterResponse};
use crate::runtime_config::RuntimeConfig;

/// The interface a cache backend exposes to middleware.
///
/// Implementations carry their own concurrency contract (`Send + Sync`);
/// the pipeline imposes none beyond that.
pub trait Cache: Send + Sync {
    /// Look up a stored response for this request, if any.
    fn match_request(&self, req: &RouterRequest) -> Option<RouterResponse>;

    /// Store a response for this request, replacing any previous entry.
    fn put(&self, req: &RouterRequest, res: &RouterResponse);
}

/// Context token for a per-request cache handle.
pub struct RequestCache;

impl ContextKey for RequestCache {
    type Value = Arc<dyn Cache>;
}

/// In-memory LRU cache keyed by `METHOD url`.
pub struct MemoryCache {
    entries: Mutex<LruCache<String, RouterResponse>>,
}

impl MemoryCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn key(req: &RouterRequest) -> String {
        format!("{} {}", req.method, req.url)
    }
}

impl Default for MemoryCache {
    /// Capacity comes from `SWITCHYARD_CACHE_CAPACITY` (see
    /// [`RuntimeConfig`]), defaulting to 1024 entries.
    fn default() -> Self {
        Self::new(RuntimeConfig::from_env().cache_capacity)
    }
}

impl Cache for MemoryCache {
    fn match_request(&self, req: &RouterRequest) -> Option<RouterResponse> {
        let key = Self::key(req);
        match self.entries.lock() {
            Ok(mut entries) => entries.get(&key).cloned(),
            Err(_) => None,
        }
    }

    fn put(&self, req: &RouterRequest, res: &RouterResponse) {
        let key = Self::key(req);
        if let Ok(mut entries) = self.entries.lock() {
            entries.put(key, res.clone());
        }
    }
}

static REGISTRY: Lazy<DashMap<String, Arc<dyn Cache>>> = Lazy::new(DashMap::new);

/// Open the named cache, creating a default [`MemoryCache`] on first use.
/// Subsequent opens under the same name return the same instance.
pub fn open(name: &str) -> Arc<dyn Cache> {
    let entry = REGISTRY
        .entry(name.to_string())
        .or_insert_with(|| {
            debug!(cache = %name, "Named cache created");
            Arc::new(MemoryCache::default()) as Arc<dyn Cache>
        });
    Arc::clone(entry.value())
}

/// Install a custom backend under a name, replacing any existing cache.
pub fn register(name: &str, cache: Arc<dyn Cache>) {
    REGISTRY.insert(name.to_string(), cache);
}

/// Remove a named cache from the registry. Outstanding handles stay valid.
pub fn remove(name: &str) -> bool {
    REGISTRY.remove(name).is_some()
}
