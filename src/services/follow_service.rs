// src/services/follow_service.rs
use std::sync::Arc;

use log::{info, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::follow::{Follow, FollowCounts};
use crate::models::user::User;
use crate::repositories::EntityStore;
use crate::services::authorization;

/// Owns the follow graph. Both directions are idempotent; the store's
/// uniqueness guarantee covers concurrent duplicate follows.
#[derive(Clone)]
pub struct FollowService {
    store: Arc<dyn EntityStore>,
}

impl FollowService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Ensures `user_id` follows `author_id`. Returns true if a new edge
    /// was created.
    pub async fn follow(&self, user_id: Uuid, author_id: Uuid) -> AppResult<bool> {
        if let Err(e) = authorization::can_follow(user_id, author_id) {
            warn!("user {} tried to follow themselves", user_id);
            return Err(e);
        }
        let created = self.store.insert_follow(Follow { user_id, author_id }).await?;
        if created {
            info!("user {} now follows {}", user_id, author_id);
        }
        Ok(created)
    }

    /// Removes the edge if present. Returns true if one was removed.
    pub async fn unfollow(&self, user_id: Uuid, author_id: Uuid) -> AppResult<bool> {
        let removed = self.store.delete_follow(Follow { user_id, author_id }).await?;
        if removed {
            info!("user {} unfollowed {}", user_id, author_id);
        }
        Ok(removed)
    }

    pub async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> AppResult<bool> {
        self.store.follow_exists(Follow { user_id, author_id }).await
    }

    pub async fn counts(&self, user_id: Uuid) -> AppResult<FollowCounts> {
        self.store.follow_counts(user_id).await
    }

    /// `follow` addressed by the author's username.
    pub async fn follow_username(&self, user_id: Uuid, username: &str) -> AppResult<(User, bool)> {
        let author = self.author(username).await?;
        let created = self.follow(user_id, author.id).await?;
        Ok((author, created))
    }

    /// `unfollow` addressed by the author's username.
    pub async fn unfollow_username(&self, user_id: Uuid, username: &str) -> AppResult<(User, bool)> {
        let author = self.author(username).await?;
        let removed = self.unfollow(user_id, author.id).await?;
        Ok((author, removed))
    }

    async fn author(&self, username: &str) -> AppResult<User> {
        self.store
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found(format!("user '{username}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::NewUser;
    use crate::repositories::InMemoryStore;

    async fn setup() -> (FollowService, User, User) {
        let store = Arc::new(InMemoryStore::new());
        let sarah = store
            .insert_user(NewUser::new("sarah", "flower@gmail.com"))
            .await
            .unwrap();
        let erick = store
            .insert_user(NewUser::new("erick", "tots@gmail.com"))
            .await
            .unwrap();
        (FollowService::new(store), sarah, erick)
    }

    #[actix_web::test]
    async fn follow_twice_keeps_one_edge() {
        let (svc, sarah, erick) = setup().await;
        assert!(svc.follow(sarah.id, erick.id).await.unwrap());
        assert!(!svc.follow(sarah.id, erick.id).await.unwrap());
        assert_eq!(svc.counts(sarah.id).await.unwrap().following, 1);
        assert!(svc.is_following(sarah.id, erick.id).await.unwrap());
        assert!(!svc.is_following(erick.id, sarah.id).await.unwrap());
    }

    #[actix_web::test]
    async fn follow_then_unfollow_restores_edge_count() {
        let (svc, sarah, erick) = setup().await;
        let before = svc.counts(sarah.id).await.unwrap();
        svc.follow(sarah.id, erick.id).await.unwrap();
        svc.unfollow(sarah.id, erick.id).await.unwrap();
        assert_eq!(svc.counts(sarah.id).await.unwrap(), before);
        assert!(!svc.unfollow(sarah.id, erick.id).await.unwrap());
    }

    #[actix_web::test]
    async fn self_follow_fails_without_creating_an_edge() {
        let (svc, sarah, _) = setup().await;
        assert_eq!(svc.follow(sarah.id, sarah.id).await, Err(AppError::SelfFollow));
        assert_eq!(svc.counts(sarah.id).await.unwrap().following, 0);
        assert!(!svc.is_following(sarah.id, sarah.id).await.unwrap());
    }

    #[actix_web::test]
    async fn username_variants_resolve_the_author() {
        let (svc, sarah, erick) = setup().await;
        let (author, created) = svc.follow_username(sarah.id, "erick").await.unwrap();
        assert_eq!(author.id, erick.id);
        assert!(created);

        let err = svc.follow_username(sarah.id, "nobody").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let (_, removed) = svc.unfollow_username(sarah.id, "erick").await.unwrap();
        assert!(removed);
    }
}
