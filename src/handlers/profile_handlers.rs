// src/handlers/profile_handlers.rs
use actix_web::{delete, get, post, web, HttpResponse};

use crate::dtos::feed_dtos::{FollowOut, ProfileOut};
use crate::dtos::ApiResponse;
use crate::error::AppResult;
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::models::page::PageQuery;
use crate::models::user::UserPublic;
use crate::AppState;

/// GET /api/profiles/{username}?page=N
/// The author's posts, follower counts and whether the caller follows them.
#[get("/profiles/{username}")]
pub async fn profile(
    state: web::Data<AppState>,
    viewer: Option<AuthenticatedUser>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let (author, page) = state.feed.author_feed(&path, query.token()).await?;
    let following = match viewer {
        Some(v) => state.follows.is_following(v.user_id, author.id).await?,
        None => false,
    };
    let counts = state.follows.counts(author.id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Profile retrieved successfully",
        ProfileOut {
            author: UserPublic::from(&author),
            following,
            counts,
            page,
        },
    )))
}

/// POST /api/profiles/{username}/follow
#[post("/profiles/{username}/follow")]
pub async fn profile_follow(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let (author, created) = state.follows.follow_username(user.user_id, &path).await?;
    let message = if created {
        "Now following"
    } else {
        "Already following"
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        message,
        FollowOut {
            author: UserPublic::from(&author),
            following: true,
            changed: created,
        },
    )))
}

/// DELETE /api/profiles/{username}/follow
#[delete("/profiles/{username}/follow")]
pub async fn profile_unfollow(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let (author, removed) = state.follows.unfollow_username(user.user_id, &path).await?;
    let message = if removed {
        "Unfollowed"
    } else {
        "Was not following"
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        message,
        FollowOut {
            author: UserPublic::from(&author),
            following: false,
            changed: removed,
        },
    )))
}
