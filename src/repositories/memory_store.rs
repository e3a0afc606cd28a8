// src/repositories/memory_store.rs
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::comment::{Comment, NewComment};
use crate::models::follow::{Follow, FollowCounts};
use crate::models::group::{Group, NewGroup};
use crate::models::post::{NewPost, Post, PostChanges, PostFilter, PostWithAuthor};
use crate::models::user::{NewUser, User};
use crate::repositories::EntityStore;

/// `EntityStore` kept entirely in process memory. Used with
/// `STORE_BACKEND=memory` and by the test suites.
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    groups: HashMap<Uuid, Group>,
    posts: HashMap<Uuid, Post>,
    comments: Vec<Comment>,
    follows: HashSet<Follow>,
    last_stamp: Option<DateTime<Utc>>,
}

impl Inner {
    /// Strictly increasing timestamps, so insertion order and creation
    /// order agree even when the wall clock does not move between calls.
    fn stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_stamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }

    fn matches(&self, post: &Post, filter: PostFilter) -> bool {
        match filter {
            PostFilter::All => true,
            PostFilter::Group(group_id) => post.group_id == Some(group_id),
            PostFilter::Author(author_id) => post.author_id == author_id,
            PostFilter::FollowedBy(user_id) => self.follows.contains(&Follow {
                user_id,
                author_id: post.author_id,
            }),
        }
    }

    fn joined(&self, post: &Post) -> PostWithAuthor {
        PostWithAuthor {
            post: post.clone(),
            author_username: self
                .users
                .get(&post.author_id)
                .map(|u| u.username.clone())
                .unwrap_or_default(),
            group_slug: post
                .group_id
                .and_then(|id| self.groups.get(&id))
                .map(|g| g.slug.clone()),
        }
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore for InMemoryStore {
    async fn insert_user(&self, user: NewUser) -> AppResult<User> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.username == user.username) {
            return Err(AppError::Validation(format!(
                "username '{}' is already taken",
                user.username
            )));
        }
        let created_at = inner.stamp();
        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at,
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.username == username).cloned())
    }

    async fn insert_group(&self, group: NewGroup) -> AppResult<Group> {
        let mut inner = self.inner.write().await;
        if inner.groups.values().any(|g| g.slug == group.slug) {
            return Err(AppError::Validation(format!(
                "group slug '{}' is already taken",
                group.slug
            )));
        }
        let group = Group {
            id: Uuid::new_v4(),
            title: group.title,
            slug: group.slug,
        };
        inner.groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn find_group_by_slug(&self, slug: &str) -> AppResult<Option<Group>> {
        let inner = self.inner.read().await;
        Ok(inner.groups.values().find(|g| g.slug == slug).cloned())
    }

    async fn list_groups(&self) -> AppResult<Vec<Group>> {
        let inner = self.inner.read().await;
        let mut groups: Vec<Group> = inner.groups.values().cloned().collect();
        groups.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(groups)
    }

    async fn insert_post(&self, post: NewPost) -> AppResult<Post> {
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&post.author_id) {
            return Err(AppError::not_found("author"));
        }
        let created_at = inner.stamp();
        let post = Post {
            id: Uuid::new_v4(),
            author_id: post.author_id,
            group_id: post.group_id,
            text: post.text,
            image_url: post.image_url,
            created_at,
            updated_at: None,
        };
        inner.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_post(&self, id: Uuid) -> AppResult<Option<PostWithAuthor>> {
        let inner = self.inner.read().await;
        Ok(inner.posts.get(&id).map(|p| inner.joined(p)))
    }

    async fn update_post(
        &self,
        id: Uuid,
        author_id: Uuid,
        changes: PostChanges,
    ) -> AppResult<Option<Post>> {
        let mut inner = self.inner.write().await;
        let updated_at = inner.stamp();
        let Some(post) = inner.posts.get_mut(&id).filter(|p| p.author_id == author_id) else {
            return Ok(None);
        };
        post.text = changes.text;
        post.image_url = changes.image_url;
        post.group_id = changes.group_id;
        post.updated_at = Some(updated_at);
        Ok(Some(post.clone()))
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<PostWithAuthor>> {
        let inner = self.inner.read().await;
        let mut posts: Vec<&Post> = inner
            .posts
            .values()
            .filter(|p| inner.matches(p, filter))
            .collect();
        posts.sort_by_key(|p| Reverse((p.created_at, p.id)));
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(posts
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|p| inner.joined(p))
            .collect())
    }

    async fn count_posts(&self, filter: PostFilter) -> AppResult<u64> {
        let inner = self.inner.read().await;
        let count = inner.posts.values().filter(|p| inner.matches(p, filter)).count();
        Ok(count as u64)
    }

    async fn insert_comment(&self, comment: NewComment) -> AppResult<Comment> {
        let mut inner = self.inner.write().await;
        if !inner.posts.contains_key(&comment.post_id) {
            return Err(AppError::not_found("post"));
        }
        let author_username = inner
            .users
            .get(&comment.author_id)
            .map(|u| u.username.clone())
            .ok_or_else(|| AppError::not_found("user"))?;
        let created_at = inner.stamp();
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id: comment.post_id,
            author_id: comment.author_id,
            author_username,
            text: comment.text,
            created_at,
        };
        inner.comments.push(comment.clone());
        Ok(comment)
    }

    async fn list_comments(&self, post_id: Uuid) -> AppResult<Vec<Comment>> {
        let inner = self.inner.read().await;
        let mut comments: Vec<Comment> = inner
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by_key(|c| (c.created_at, c.id));
        Ok(comments)
    }

    async fn insert_follow(&self, follow: Follow) -> AppResult<bool> {
        if follow.user_id == follow.author_id {
            return Err(AppError::SelfFollow);
        }
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&follow.user_id) {
            return Err(AppError::not_found("user"));
        }
        if !inner.users.contains_key(&follow.author_id) {
            return Err(AppError::not_found("author"));
        }
        Ok(inner.follows.insert(follow))
    }

    async fn delete_follow(&self, follow: Follow) -> AppResult<bool> {
        Ok(self.inner.write().await.follows.remove(&follow))
    }

    async fn follow_exists(&self, follow: Follow) -> AppResult<bool> {
        Ok(self.inner.read().await.follows.contains(&follow))
    }

    async fn follow_counts(&self, user_id: Uuid) -> AppResult<FollowCounts> {
        let inner = self.inner.read().await;
        Ok(FollowCounts {
            followers: inner.follows.iter().filter(|f| f.author_id == user_id).count() as u64,
            following: inner.follows.iter().filter(|f| f.user_id == user_id).count() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn user(store: &InMemoryStore, name: &str) -> User {
        store
            .insert_user(NewUser::new(name, format!("{name}@example.com")))
            .await
            .unwrap()
    }

    #[actix_web::test]
    async fn duplicate_username_is_rejected() {
        let store = InMemoryStore::new();
        user(&store, "sarah").await;
        let err = store
            .insert_user(NewUser::new("sarah", "other@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[actix_web::test]
    async fn listing_is_newest_first_and_joined() {
        let store = InMemoryStore::new();
        let sarah = user(&store, "sarah").await;
        let group = store
            .insert_group(NewGroup {
                title: "Sun".into(),
                slug: "sun".into(),
            })
            .await
            .unwrap();
        for (i, group_id) in [None, Some(group.id), None].into_iter().enumerate() {
            store
                .insert_post(NewPost {
                    author_id: sarah.id,
                    group_id,
                    text: format!("post {i}"),
                    image_url: None,
                })
                .await
                .unwrap();
        }

        let all = store.list_posts(PostFilter::All, 0, 10).await.unwrap();
        let texts: Vec<&str> = all.iter().map(|p| p.post.text.as_str()).collect();
        assert_eq!(texts, ["post 2", "post 1", "post 0"]);
        assert!(all.iter().all(|p| p.author_username == "sarah"));
        assert_eq!(all[1].group_slug.as_deref(), Some("sun"));

        let in_group = store.list_posts(PostFilter::Group(group.id), 0, 10).await.unwrap();
        assert_eq!(in_group.len(), 1);
        assert_eq!(store.count_posts(PostFilter::Group(group.id)).await.unwrap(), 1);
    }

    #[actix_web::test]
    async fn update_requires_matching_author() {
        let store = InMemoryStore::new();
        let sarah = user(&store, "sarah").await;
        let edwin = user(&store, "edwin").await;
        let post = store
            .insert_post(NewPost {
                author_id: sarah.id,
                group_id: None,
                text: "Hello World".into(),
                image_url: None,
            })
            .await
            .unwrap();

        let changes = PostChanges {
            group_id: None,
            text: "Miracle".into(),
            image_url: None,
        };
        assert!(store.update_post(post.id, edwin.id, changes.clone()).await.unwrap().is_none());
        let stored = store.find_post(post.id).await.unwrap().unwrap();
        assert_eq!(stored.post.text, "Hello World");

        let updated = store.update_post(post.id, sarah.id, changes).await.unwrap().unwrap();
        assert_eq!(updated.text, "Miracle");
        assert_eq!(updated.author_id, sarah.id);
        assert_eq!(updated.created_at, post.created_at);
    }

    #[actix_web::test]
    async fn follow_edges_are_unique_and_irreflexive() {
        let store = InMemoryStore::new();
        let sarah = user(&store, "sarah").await;
        let erick = user(&store, "erick").await;
        let edge = Follow {
            user_id: sarah.id,
            author_id: erick.id,
        };

        assert!(store.insert_follow(edge).await.unwrap());
        assert!(!store.insert_follow(edge).await.unwrap());
        assert_eq!(store.follow_counts(sarah.id).await.unwrap().following, 1);
        assert_eq!(store.follow_counts(erick.id).await.unwrap().followers, 1);

        let self_edge = Follow {
            user_id: sarah.id,
            author_id: sarah.id,
        };
        assert_eq!(store.insert_follow(self_edge).await, Err(AppError::SelfFollow));

        assert!(store.delete_follow(edge).await.unwrap());
        assert!(!store.delete_follow(edge).await.unwrap());
        assert!(!store.follow_exists(edge).await.unwrap());
    }
}
