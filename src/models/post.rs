use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_postgres::Row;
use uuid::Uuid;

/// Row `posts`. `author_id` is fixed at insert time; updates only touch
/// `text`, `image_url`, `group_id` and `updated_at`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub group_id: Option<Uuid>,
    pub text: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: Uuid,
    pub group_id: Option<Uuid>,
    pub text: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PostChanges {
    pub group_id: Option<Uuid>,
    pub text: String,
    pub image_url: Option<String>,
}

/// A post joined with the author's username and the group slug, the shape
/// every feed renders.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PostWithAuthor {
    #[serde(flatten)]
    pub post: Post,
    pub author_username: String,
    pub group_slug: Option<String>,
}

impl PostWithAuthor {
    /// Expects the `posts` columns plus `author_username` and `group_slug`.
    pub fn from_row(row: &Row) -> Self {
        Self {
            post: Post {
                id: row.get("id"),
                author_id: row.get("author_id"),
                group_id: row.get("group_id"),
                text: row.get("text"),
                image_url: row.get("image_url"),
                created_at: row.get("created_at"),
                updated_at: row.get("updated_at"),
            },
            author_username: row.get("author_username"),
            group_slug: row.get("group_slug"),
        }
    }
}

/// Which subset of posts a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostFilter {
    All,
    Group(Uuid),
    Author(Uuid),
    /// Posts whose author is followed by this user.
    FollowedBy(Uuid),
}
