//! LRU cache for rendered pages

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;

use super::request::{PageImage, RenderParams};

/// Cache key for rendered pages
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub page: usize,
    /// Zoom factor (stored as millionths for stable hashing)
    pub zoom_millionths: u32,
    /// Brightness (stored as thousandths)
    pub brightness_millis: u32,
    pub night_mode: bool,
}

impl CacheKey {
    /// Create a cache key from render parameters
    #[must_use]
    pub fn from_params(page: usize, params: &RenderParams) -> Self {
        Self {
            page,
            zoom_millionths: (params.zoom * 1_000_000.0) as u32,
            brightness_millis: (params.brightness * 1_000.0) as u32,
            night_mode: params.night_mode,
        }
    }
}

pub struct PageCache {
    cache: LruCache<CacheKey, Arc<PageImage>>,
}

impl PageCache {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
        }
    }

    /// Get a cached page, promoting it in the LRU order
    #[must_use]
    pub fn get(&mut self, key: &CacheKey) -> Option<Arc<PageImage>> {
        self.cache.get(key).cloned()
    }

    #[must_use]
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.cache.contains(key)
    }

    /// Insert a page into the cache, returning an Arc to the data
    pub fn insert(&mut self, key: CacheKey, data: PageImage) -> Arc<PageImage> {
        let arc = Arc::new(data);
        self.cache.put(key, Arc::clone(&arc));
        arc
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
