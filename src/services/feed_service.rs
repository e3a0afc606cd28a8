// src/services/feed_service.rs
use std::sync::Arc;

use log::debug;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::group::Group;
use crate::models::page::{Page, PageToken};
use crate::models::post::PostFilter;
use crate::models::user::User;
use crate::repositories::EntityStore;
use crate::services::feed_cache::{FeedCache, FeedPage};

/// The four post listings the site renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedKind {
    All,
    ByGroup(String),
    ByAuthor(String),
    /// Posts by every author the given user follows.
    ByFollow(Uuid),
}

/// Builds paginated, newest-first post listings. Read-only.
#[derive(Clone)]
pub struct FeedService {
    store: Arc<dyn EntityStore>,
    cache: FeedCache,
}

impl FeedService {
    pub fn new(store: Arc<dyn EntityStore>, cache: FeedCache) -> Self {
        Self { store, cache }
    }

    pub async fn compose(&self, kind: FeedKind, token: PageToken) -> AppResult<FeedPage> {
        let filter = match kind {
            FeedKind::All => PostFilter::All,
            FeedKind::ByGroup(slug) => PostFilter::Group(self.group(&slug).await?.id),
            FeedKind::ByAuthor(username) => PostFilter::Author(self.author(&username).await?.id),
            FeedKind::ByFollow(user_id) => PostFilter::FollowedBy(user_id),
        };
        self.page(filter, token).await
    }

    /// Group page: the group itself plus its posts.
    pub async fn group_feed(&self, slug: &str, token: PageToken) -> AppResult<(Group, FeedPage)> {
        let group = self.group(slug).await?;
        let page = self.page(PostFilter::Group(group.id), token).await?;
        Ok((group, page))
    }

    /// Profile page: the author plus their posts.
    pub async fn author_feed(&self, username: &str, token: PageToken) -> AppResult<(User, FeedPage)> {
        let author = self.author(username).await?;
        let page = self.page(PostFilter::Author(author.id), token).await?;
        Ok((author, page))
    }

    async fn group(&self, slug: &str) -> AppResult<Group> {
        self.store
            .find_group_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::not_found(format!("group '{slug}'")))
    }

    async fn author(&self, username: &str) -> AppResult<User> {
        self.store
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found(format!("user '{username}'")))
    }

    async fn page(&self, filter: PostFilter, token: PageToken) -> AppResult<FeedPage> {
        if let Some(cached) = self.cache.get(filter, token).await {
            return Ok((*cached).clone());
        }

        let generation = self.cache.generation();
        let total = self.store.count_posts(filter).await?;
        let items = if token.offset() >= total {
            Vec::new()
        } else {
            self.store
                .list_posts(filter, token.offset(), token.limit())
                .await?
        };
        debug!(
            "feed {:?} page {}: {} of {} posts",
            filter,
            token.number(),
            items.len(),
            total
        );

        let page = Page::new(token, total, items);
        self.cache
            .put(generation, filter, token, Arc::new(page.clone()))
            .await;
        Ok(page)
    }
}
