// src/repositories/entity_store.rs
use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::comment::{Comment, NewComment};
use crate::models::follow::{Follow, FollowCounts};
use crate::models::group::{Group, NewGroup};
use crate::models::post::{NewPost, Post, PostChanges, PostFilter, PostWithAuthor};
use crate::models::user::{NewUser, User};

/// Persistence seam for every service in this crate.
///
/// Each method is one atomic unit: it either fully applies or leaves the
/// store untouched. Listings are ordered newest first by
/// `(created_at, id)`, which is a total order.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Fails with `Validation` when the username is taken.
    async fn insert_user(&self, user: NewUser) -> AppResult<User>;
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Fails with `Validation` when the slug is taken.
    async fn insert_group(&self, group: NewGroup) -> AppResult<Group>;
    async fn find_group_by_slug(&self, slug: &str) -> AppResult<Option<Group>>;
    async fn list_groups(&self) -> AppResult<Vec<Group>>;

    async fn insert_post(&self, post: NewPost) -> AppResult<Post>;
    async fn find_post(&self, id: Uuid) -> AppResult<Option<PostWithAuthor>>;
    /// Applies `changes` only if `author_id` still owns the post.
    /// Returns `None` when no such post exists for that author.
    async fn update_post(
        &self,
        id: Uuid,
        author_id: Uuid,
        changes: PostChanges,
    ) -> AppResult<Option<Post>>;
    async fn list_posts(
        &self,
        filter: PostFilter,
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<PostWithAuthor>>;
    async fn count_posts(&self, filter: PostFilter) -> AppResult<u64>;

    async fn insert_comment(&self, comment: NewComment) -> AppResult<Comment>;
    /// Oldest first.
    async fn list_comments(&self, post_id: Uuid) -> AppResult<Vec<Comment>>;

    /// Returns true if a new edge was created, false if it already existed.
    async fn insert_follow(&self, follow: Follow) -> AppResult<bool>;
    /// Returns true if an edge was removed.
    async fn delete_follow(&self, follow: Follow) -> AppResult<bool>;
    async fn follow_exists(&self, follow: Follow) -> AppResult<bool>;
    async fn follow_counts(&self, user_id: Uuid) -> AppResult<FollowCounts>;
}
