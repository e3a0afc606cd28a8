// src/services/feed_cache.rs
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use log::{debug, info};
use moka::future::Cache;
use uuid::Uuid;

use crate::models::page::{Page, PageToken};
use crate::models::post::{PostFilter, PostWithAuthor};

pub type FeedPage = Page<PostWithAuthor>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CachedView {
    All,
    Group(Uuid),
    Author(Uuid),
}

type Key = (u64, CachedView, PageToken);

/// Memoized feed pages. Follow feeds are per-viewer and never stored here.
///
/// Keys carry a generation that every invalidation bumps, so a page loaded
/// before a write but stored after it is never served.
#[derive(Clone)]
pub struct FeedCache {
    pages: Cache<Key, Arc<FeedPage>>,
    generation: Arc<AtomicU64>,
}

impl FeedCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        info!("feed cache: capacity={} ttl={:?}", capacity, ttl);
        Self {
            pages: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Read before loading a page from the store; pass it back to `put`.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn key(generation: u64, filter: PostFilter, token: PageToken) -> Option<Key> {
        let view = match filter {
            PostFilter::All => CachedView::All,
            PostFilter::Group(id) => CachedView::Group(id),
            PostFilter::Author(id) => CachedView::Author(id),
            PostFilter::FollowedBy(_) => return None,
        };
        Some((generation, view, token))
    }

    pub async fn get(&self, filter: PostFilter, token: PageToken) -> Option<Arc<FeedPage>> {
        let key = Self::key(self.generation(), filter, token)?;
        let hit = self.pages.get(&key).await;
        if hit.is_some() {
            debug!("feed cache hit: {:?} page {}", filter, token.number());
        }
        hit
    }

    pub async fn put(
        &self,
        generation: u64,
        filter: PostFilter,
        token: PageToken,
        page: Arc<FeedPage>,
    ) {
        if let Some(key) = Self::key(generation, filter, token) {
            self.pages.insert(key, page).await;
        }
    }

    /// Drops every stored page. Called after any write that can change
    /// what a cached view shows.
    pub fn invalidate_all(&self, reason: &str) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.pages.invalidate_all();
        info!("feed cache invalidated ({})", reason);
    }
}
