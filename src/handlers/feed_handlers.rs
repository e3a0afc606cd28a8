// src/handlers/feed_handlers.rs
use actix_web::{get, web, HttpResponse};

use crate::dtos::feed_dtos::GroupFeedOut;
use crate::dtos::ApiResponse;
use crate::error::AppResult;
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::models::page::PageQuery;
use crate::services::feed_service::FeedKind;
use crate::AppState;

/// GET /api/posts?page=N
#[get("/posts")]
pub async fn index(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state.feed.compose(FeedKind::All, query.token()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Posts retrieved successfully", page)))
}

/// GET /api/groups/{slug}?page=N
#[get("/groups/{slug}")]
pub async fn group_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let (group, page) = state.feed.group_feed(&path, query.token()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Group posts retrieved successfully",
        GroupFeedOut { group, page },
    )))
}

/// GET /api/follow?page=N
/// Posts by everyone the caller follows.
#[get("/follow")]
pub async fn follow_index(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .feed
        .compose(FeedKind::ByFollow(user.user_id), query.token())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Follow feed retrieved successfully", page)))
}
