// src/repositories/pg_store.rs
use async_trait::async_trait;
use deadpool_postgres::Pool;
use log::info;
use tokio_postgres::error::SqlState;
use tokio_postgres::types::ToSql;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::comment::{Comment, NewComment};
use crate::models::follow::{Follow, FollowCounts};
use crate::models::group::{Group, NewGroup};
use crate::models::post::{NewPost, Post, PostChanges, PostFilter, PostWithAuthor};
use crate::models::user::{NewUser, User};
use crate::repositories::EntityStore;

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

const POST_SELECT: &str = r#"
    SELECT p.id, p.author_id, p.group_id, p.text, p.image_url, p.created_at, p.updated_at,
           u.username AS author_username, g.slug AS group_slug
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN groups g ON g.id = p.group_id
"#;

/// `EntityStore` backed by Postgres through a deadpool connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Creates missing tables and indexes. Safe to run on every start.
    pub async fn migrate(&self) -> AppResult<()> {
        let client = self.pool.get().await?;
        client.batch_execute(SCHEMA).await?;
        info!("database schema is up to date");
        Ok(())
    }
}

/// WHERE clause for a filter; `$1` is the filter's id when there is one.
fn filter_clause(filter: PostFilter) -> (&'static str, Option<Uuid>) {
    match filter {
        PostFilter::All => ("TRUE", None),
        PostFilter::Group(id) => ("p.group_id = $1", Some(id)),
        PostFilter::Author(id) => ("p.author_id = $1", Some(id)),
        PostFilter::FollowedBy(id) => (
            "EXISTS (SELECT 1 FROM follows f WHERE f.author_id = p.author_id AND f.user_id = $1)",
            Some(id),
        ),
    }
}

fn is_violation(e: &tokio_postgres::Error, state: &SqlState) -> bool {
    e.code() == Some(state)
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[async_trait]
impl EntityStore for PgStore {
    async fn insert_user(&self, user: NewUser) -> AppResult<User> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                r#"
                INSERT INTO users (id, username, email, password_hash, role, created_at)
                VALUES ($1, $2, $3, $4, $5, NOW())
                RETURNING *
                "#,
                &[
                    &Uuid::new_v4(),
                    &user.username,
                    &user.email,
                    &user.password_hash,
                    &user.role,
                ],
            )
            .await
            .map_err(|e| {
                if is_violation(&e, &SqlState::UNIQUE_VIOLATION) {
                    AppError::Validation(format!("username '{}' is already taken", user.username))
                } else {
                    e.into()
                }
            })?;
        Ok(User::from_row(&row))
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt("SELECT * FROM users WHERE id = $1", &[&id])
            .await?;
        Ok(row.as_ref().map(User::from_row))
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt("SELECT * FROM users WHERE username = $1", &[&username])
            .await?;
        Ok(row.as_ref().map(User::from_row))
    }

    async fn insert_group(&self, group: NewGroup) -> AppResult<Group> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                "INSERT INTO groups (id, title, slug) VALUES ($1, $2, $3) RETURNING *",
                &[&Uuid::new_v4(), &group.title, &group.slug],
            )
            .await
            .map_err(|e| {
                if is_violation(&e, &SqlState::UNIQUE_VIOLATION) {
                    AppError::Validation(format!("group slug '{}' is already taken", group.slug))
                } else {
                    e.into()
                }
            })?;
        Ok(Group::from_row(&row))
    }

    async fn find_group_by_slug(&self, slug: &str) -> AppResult<Option<Group>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt("SELECT * FROM groups WHERE slug = $1", &[&slug])
            .await?;
        Ok(row.as_ref().map(Group::from_row))
    }

    async fn list_groups(&self) -> AppResult<Vec<Group>> {
        let client = self.pool.get().await?;
        let rows = client
            .query("SELECT * FROM groups ORDER BY title", &[])
            .await?;
        Ok(rows.iter().map(Group::from_row).collect())
    }

    async fn insert_post(&self, post: NewPost) -> AppResult<Post> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                r#"
                INSERT INTO posts (id, author_id, group_id, text, image_url, created_at)
                VALUES ($1, $2, $3, $4, $5, clock_timestamp())
                RETURNING id, author_id, group_id, text, image_url, created_at, updated_at
                "#,
                &[
                    &Uuid::new_v4(),
                    &post.author_id,
                    &post.group_id,
                    &post.text,
                    &post.image_url,
                ],
            )
            .await
            .map_err(|e| {
                if is_violation(&e, &SqlState::FOREIGN_KEY_VIOLATION) {
                    AppError::not_found("author or group")
                } else {
                    e.into()
                }
            })?;
        Ok(Post {
            id: row.get("id"),
            author_id: row.get("author_id"),
            group_id: row.get("group_id"),
            text: row.get("text"),
            image_url: row.get("image_url"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    async fn find_post(&self, id: Uuid) -> AppResult<Option<PostWithAuthor>> {
        let client = self.pool.get().await?;
        let sql = format!("{POST_SELECT} WHERE p.id = $1");
        let row = client.query_opt(sql.as_str(), &[&id]).await?;
        Ok(row.as_ref().map(PostWithAuthor::from_row))
    }

    async fn update_post(
        &self,
        id: Uuid,
        author_id: Uuid,
        changes: PostChanges,
    ) -> AppResult<Option<Post>> {
        let client = self.pool.get().await?;
        // The author check lives in the WHERE clause so a concurrent ownership
        // change cannot slip between check and write.
        let row = client
            .query_opt(
                r#"
                UPDATE posts
                SET text = $3, image_url = $4, group_id = $5, updated_at = NOW()
                WHERE id = $1 AND author_id = $2
                RETURNING id, author_id, group_id, text, image_url, created_at, updated_at
                "#,
                &[
                    &id,
                    &author_id,
                    &changes.text,
                    &changes.image_url,
                    &changes.group_id,
                ],
            )
            .await?;
        Ok(row.map(|row| Post {
            id: row.get("id"),
            author_id: row.get("author_id"),
            group_id: row.get("group_id"),
            text: row.get("text"),
            image_url: row.get("image_url"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }))
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<PostWithAuthor>> {
        let client = self.pool.get().await?;
        let (clause, id) = filter_clause(filter);
        let offset = to_i64(offset);
        let limit = to_i64(limit);

        let rows = match id {
            Some(id) => {
                let sql = format!(
                    "{POST_SELECT} WHERE {clause} ORDER BY p.created_at DESC, p.id DESC OFFSET $2 LIMIT $3"
                );
                let params: [&(dyn ToSql + Sync); 3] = [&id, &offset, &limit];
                client.query(sql.as_str(), &params).await?
            }
            None => {
                let sql = format!(
                    "{POST_SELECT} WHERE {clause} ORDER BY p.created_at DESC, p.id DESC OFFSET $1 LIMIT $2"
                );
                let params: [&(dyn ToSql + Sync); 2] = [&offset, &limit];
                client.query(sql.as_str(), &params).await?
            }
        };
        Ok(rows.iter().map(PostWithAuthor::from_row).collect())
    }

    async fn count_posts(&self, filter: PostFilter) -> AppResult<u64> {
        let client = self.pool.get().await?;
        let (clause, id) = filter_clause(filter);
        let sql = format!("SELECT COUNT(*) AS n FROM posts p WHERE {clause}");
        let row = match id {
            Some(id) => client.query_one(sql.as_str(), &[&id]).await?,
            None => client.query_one(sql.as_str(), &[]).await?,
        };
        let n: i64 = row.get("n");
        Ok(u64::try_from(n).unwrap_or(0))
    }

    async fn insert_comment(&self, comment: NewComment) -> AppResult<Comment> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                r#"
                WITH inserted AS (
                    INSERT INTO comments (id, post_id, author_id, text, created_at)
                    VALUES ($1, $2, $3, $4, clock_timestamp())
                    RETURNING *
                )
                SELECT i.*, u.username AS author_username
                FROM inserted i JOIN users u ON u.id = i.author_id
                "#,
                &[&Uuid::new_v4(), &comment.post_id, &comment.author_id, &comment.text],
            )
            .await
            .map_err(|e| {
                if is_violation(&e, &SqlState::FOREIGN_KEY_VIOLATION) {
                    AppError::not_found("post or user")
                } else {
                    e.into()
                }
            })?;
        row.as_ref()
            .map(Comment::from_row)
            .ok_or_else(|| AppError::not_found("user"))
    }

    async fn list_comments(&self, post_id: Uuid) -> AppResult<Vec<Comment>> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                r#"
                SELECT c.*, u.username AS author_username
                FROM comments c JOIN users u ON u.id = c.author_id
                WHERE c.post_id = $1
                ORDER BY c.created_at, c.id
                "#,
                &[&post_id],
            )
            .await?;
        Ok(rows.iter().map(Comment::from_row).collect())
    }

    async fn insert_follow(&self, follow: Follow) -> AppResult<bool> {
        let client = self.pool.get().await?;
        let inserted = client
            .query_opt(
                r#"
                INSERT INTO follows (id, user_id, author_id, created_at)
                VALUES ($1, $2, $3, NOW())
                ON CONFLICT (user_id, author_id) DO NOTHING
                RETURNING id
                "#,
                &[&Uuid::new_v4(), &follow.user_id, &follow.author_id],
            )
            .await
            .map_err(|e| {
                if is_violation(&e, &SqlState::CHECK_VIOLATION) {
                    AppError::SelfFollow
                } else if is_violation(&e, &SqlState::FOREIGN_KEY_VIOLATION) {
                    AppError::not_found("user")
                } else {
                    e.into()
                }
            })?;
        Ok(inserted.is_some())
    }

    async fn delete_follow(&self, follow: Follow) -> AppResult<bool> {
        let client = self.pool.get().await?;
        let affected = client
            .execute(
                "DELETE FROM follows WHERE user_id = $1 AND author_id = $2",
                &[&follow.user_id, &follow.author_id],
            )
            .await?;
        Ok(affected > 0)
    }

    async fn follow_exists(&self, follow: Follow) -> AppResult<bool> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                "SELECT EXISTS (SELECT 1 FROM follows WHERE user_id = $1 AND author_id = $2) AS found",
                &[&follow.user_id, &follow.author_id],
            )
            .await?;
        Ok(row.get("found"))
    }

    async fn follow_counts(&self, user_id: Uuid) -> AppResult<FollowCounts> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                r#"
                SELECT
                    (SELECT COUNT(*) FROM follows WHERE author_id = $1) AS followers,
                    (SELECT COUNT(*) FROM follows WHERE user_id = $1) AS following
                "#,
                &[&user_id],
            )
            .await?;
        let followers: i64 = row.get("followers");
        let following: i64 = row.get("following");
        Ok(FollowCounts {
            followers: u64::try_from(followers).unwrap_or(0),
            following: u64::try_from(following).unwrap_or(0),
        })
    }
}
