// src/services/post_service.rs
use std::sync::Arc;

use log::{info, warn};
use uuid::Uuid;

use crate::dtos::comment_dtos::CommentForm;
use crate::dtos::post_dtos::{PostForm, PostViewOut};
use crate::error::{AppError, AppResult};
use crate::models::comment::{Comment, NewComment};
use crate::models::post::{NewPost, Post, PostChanges, PostWithAuthor};
use crate::models::user::{User, UserPublic};
use crate::repositories::EntityStore;
use crate::services::authorization;
use crate::services::feed_cache::FeedCache;

#[derive(Clone)]
pub struct PostService {
    store: Arc<dyn EntityStore>,
    cache: FeedCache,
}

impl PostService {
    pub fn new(store: Arc<dyn EntityStore>, cache: FeedCache) -> Self {
        Self { store, cache }
    }

    pub async fn create_post(&self, author_id: Uuid, form: PostForm) -> AppResult<Post> {
        form.check()?;
        self.store
            .find_user(author_id)
            .await?
            .ok_or_else(|| AppError::not_found("author"))?;
        let group_id = self.group_id(form.group.as_deref()).await?;

        let post = self
            .store
            .insert_post(NewPost {
                author_id,
                group_id,
                text: form.text,
                image_url: form.image_url,
            })
            .await?;
        self.cache.invalidate_all("post created");
        info!("post {} created by {}", post.id, author_id);
        Ok(post)
    }

    /// A post addressed as `/{username}/posts/{post_id}`; the post must
    /// belong to that user.
    pub async fn find_authored(&self, username: &str, post_id: Uuid) -> AppResult<(User, PostWithAuthor)> {
        let author = self
            .store
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found(format!("user '{username}'")))?;
        let post = self
            .store
            .find_post(post_id)
            .await?
            .filter(|p| p.post.author_id == author.id)
            .ok_or_else(|| AppError::not_found(format!("post {post_id}")))?;
        Ok((author, post))
    }

    pub async fn post_view(&self, username: &str, post_id: Uuid) -> AppResult<PostViewOut> {
        let (author, post) = self.find_authored(username, post_id).await?;
        let comments = self.store.list_comments(post.post.id).await?;
        Ok(PostViewOut {
            post,
            author: UserPublic::from(&author),
            comments,
        })
    }

    /// Replaces text, image and group. Author and creation time never change.
    pub async fn edit_post(
        &self,
        actor_id: Uuid,
        username: &str,
        post_id: Uuid,
        form: PostForm,
    ) -> AppResult<Post> {
        let (_, existing) = self.find_authored(username, post_id).await?;
        if let Err(e) = authorization::ensure_can_edit(actor_id, &existing.post) {
            warn!("user {} may not edit post {}", actor_id, post_id);
            return Err(e);
        }
        form.check()?;
        let group_id = self.group_id(form.group.as_deref()).await?;

        let updated = self
            .store
            .update_post(
                post_id,
                actor_id,
                PostChanges {
                    group_id,
                    text: form.text,
                    image_url: form.image_url,
                },
            )
            .await?
            // Vanished between lookup and update.
            .ok_or_else(|| AppError::not_found(format!("post {post_id}")))?;
        self.cache.invalidate_all("post edited");
        info!("post {} edited by {}", post_id, actor_id);
        Ok(updated)
    }

    pub async fn add_comment(
        &self,
        actor: Option<Uuid>,
        username: &str,
        post_id: Uuid,
        form: CommentForm,
    ) -> AppResult<Comment> {
        let author_id = match authorization::ensure_can_comment(actor) {
            Ok(id) => id,
            Err(e) => {
                warn!("anonymous comment attempt on post {}", post_id);
                return Err(e);
            }
        };
        let (_, post) = self.find_authored(username, post_id).await?;
        form.check()?;

        let comment = self
            .store
            .insert_comment(NewComment {
                post_id: post.post.id,
                author_id,
                text: form.text,
            })
            .await?;
        self.cache.invalidate_all("comment added");
        info!("comment {} on post {} by {}", comment.id, post_id, author_id);
        Ok(comment)
    }

    async fn group_id(&self, slug: Option<&str>) -> AppResult<Option<Uuid>> {
        let Some(slug) = slug.filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        let group = self
            .store
            .find_group_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::not_found(format!("group '{slug}'")))?;
        Ok(Some(group.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::models::group::NewGroup;
    use crate::models::page::PageToken;
    use crate::models::user::NewUser;
    use crate::repositories::InMemoryStore;
    use crate::services::feed_service::{FeedKind, FeedService};

    struct Fixture {
        store: Arc<InMemoryStore>,
        posts: PostService,
        feed: FeedService,
        sarah: User,
        edwin: User,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let cache = FeedCache::new(100, Duration::from_secs(60));
        let sarah = store
            .insert_user(NewUser::new("sarah", "flower@gmail.com"))
            .await
            .unwrap();
        let edwin = store
            .insert_user(NewUser::new("edwin", "fire@gmail.com"))
            .await
            .unwrap();
        Fixture {
            posts: PostService::new(store.clone(), cache.clone()),
            feed: FeedService::new(store.clone(), cache),
            store,
            sarah,
            edwin,
        }
    }

    fn form(text: &str) -> PostForm {
        PostForm {
            text: text.to_string(),
            image_url: None,
            image_content_type: None,
            group: None,
        }
    }

    #[actix_web::test]
    async fn author_edit_shows_up_in_every_view() {
        let f = fixture().await;
        f.store
            .insert_group(NewGroup {
                title: "Sun".into(),
                slug: "sun".into(),
            })
            .await
            .unwrap();
        let mut original = form("Hello World");
        original.group = Some("sun".into());
        let post = f.posts.create_post(f.sarah.id, original).await.unwrap();

        // Warm the cache for each view.
        for kind in [
            FeedKind::All,
            FeedKind::ByAuthor("sarah".into()),
            FeedKind::ByGroup("sun".into()),
        ] {
            f.feed.compose(kind, PageToken::first()).await.unwrap();
        }

        let mut edit = form("Miracle");
        edit.group = Some("sun".into());
        f.posts
            .edit_post(f.sarah.id, "sarah", post.id, edit)
            .await
            .unwrap();

        for kind in [
            FeedKind::All,
            FeedKind::ByAuthor("sarah".into()),
            FeedKind::ByGroup("sun".into()),
        ] {
            let page = f.feed.compose(kind, PageToken::first()).await.unwrap();
            assert_eq!(page.items[0].post.text, "Miracle");
        }
        let view = f.posts.post_view("sarah", post.id).await.unwrap();
        assert_eq!(view.post.post.text, "Miracle");
        assert_eq!(view.post.post.author_id, f.sarah.id);
    }

    #[actix_web::test]
    async fn non_author_edit_leaves_text_unchanged() {
        let f = fixture().await;
        let post = f.posts.create_post(f.sarah.id, form("Hello World")).await.unwrap();

        let err = f
            .posts
            .edit_post(f.edwin.id, "sarah", post.id, form("Miracle"))
            .await
            .unwrap_err();
        assert_eq!(err, AppError::Forbidden);

        let view = f.posts.post_view("sarah", post.id).await.unwrap();
        assert_eq!(view.post.post.text, "Hello World");
    }

    #[actix_web::test]
    async fn post_must_belong_to_the_named_author() {
        let f = fixture().await;
        let post = f.posts.create_post(f.sarah.id, form("Hello")).await.unwrap();
        let err = f.posts.post_view("edwin", post.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let err = f.posts.post_view("sarah", Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[actix_web::test]
    async fn unknown_group_is_not_found() {
        let f = fixture().await;
        let mut bad = form("Mainland");
        bad.group = Some("moon".into());
        let err = f.posts.create_post(f.sarah.id, bad).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[actix_web::test]
    async fn comments_need_a_signed_in_user() {
        let f = fixture().await;
        let post = f.posts.create_post(f.sarah.id, form("Hello")).await.unwrap();
        let text = CommentForm {
            text: "giant cat".into(),
        };

        let err = f
            .posts
            .add_comment(None, "sarah", post.id, text.clone())
            .await
            .unwrap_err();
        assert_eq!(err, AppError::Unauthorized);
        assert!(f.posts.post_view("sarah", post.id).await.unwrap().comments.is_empty());

        f.posts
            .add_comment(Some(f.edwin.id), "sarah", post.id, text)
            .await
            .unwrap();
        let view = f.posts.post_view("sarah", post.id).await.unwrap();
        assert_eq!(view.comments.len(), 1);
        assert_eq!(view.comments[0].text, "giant cat");
        assert_eq!(view.comments[0].author_username, "edwin");
    }
}
