//! Resolution cache: content identifier -> first confirmed gateway URL.
//!
//! Entries never expire. Without a capacity the cache lives as long as the
//! process (the page-lifetime behaviour); with one, the oldest insertion is
//! evicted first so long-running processes stay bounded.

use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

use crate::content_id::ContentId;

#[derive(Debug, Default)]
struct Inner {
    urls: HashMap<ContentId, String>,
    order: VecDeque<ContentId>,
}

#[derive(Debug, Default)]
pub struct ResolutionCache {
    inner: RwLock<Inner>,
    capacity: Option<usize>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            capacity: capacity.filter(|c| *c > 0),
        }
    }

    pub fn get(&self, id: &ContentId) -> Option<String> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.urls.get(id).cloned()
    }

    /// Store a confirmed URL. Re-inserting an identifier overwrites its URL
    /// without refreshing its eviction position.
    pub fn insert(&self, id: ContentId, url: String) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if inner.urls.insert(id.clone(), url).is_some() {
            return;
        }
        inner.order.push_back(id);
        if let Some(cap) = self.capacity {
            while inner.order.len() > cap {
                if let Some(old) = inner.order.pop_front() {
                    inner.urls.remove(&old);
                    tracing::debug!(id = %old, "evicted resolution cache entry");
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.urls.clear();
        inner.order.clear();
    }
}
