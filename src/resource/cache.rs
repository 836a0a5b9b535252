//! LRU cache of resolved clip payloads
//!
//! Letters can share one clip identity (е/э both map to `e`), so the
//! resolver funnels every fetch through this cache to avoid repeating
//! I/O for the same resource id. Only successful fetches are cached;
//! failures stay with the resolver's soft-fail path.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;

use super::source::{ClipData, ClipSource, Result};

pub struct ClipCache {
    inner: Mutex<LruCache<String, Arc<ClipData>>>,
}

impl ClipCache {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(cap)),
        }
    }

    /// Cached payload for `resource_id`, fetching through `source` on
    /// a miss. Two racing misses may both fetch; the later insert wins,
    /// which is harmless for immutable payloads.
    pub fn get_or_fetch(&self, resource_id: &str, source: &dyn ClipSource) -> Result<Arc<ClipData>> {
        if let Some(hit) = self.inner.lock().get(resource_id) {
            return Ok(Arc::clone(hit));
        }
        let data = Arc::new(source.fetch(resource_id)?);
        self.inner
            .lock()
            .put(resource_id.to_string(), Arc::clone(&data));
        Ok(data)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
