// src/handlers/post_handlers.rs
use actix_web::{get, post, put, web, HttpResponse};
use uuid::Uuid;

use crate::dtos::comment_dtos::CommentForm;
use crate::dtos::post_dtos::PostForm;
use crate::dtos::ApiResponse;
use crate::error::AppResult;
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::AppState;

/// POST /api/posts
#[post("/posts")]
pub async fn create_post(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<PostForm>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .create_post(user.user_id, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success("Post created successfully", post)))
}

/// GET /api/profiles/{username}/posts/{post_id}
#[get("/profiles/{username}/posts/{post_id}")]
pub async fn post_view(
    state: web::Data<AppState>,
    path: web::Path<(String, Uuid)>,
) -> AppResult<HttpResponse> {
    let (username, post_id) = path.into_inner();
    let view = state.posts.post_view(&username, post_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Post retrieved successfully", view)))
}

/// PUT /api/profiles/{username}/posts/{post_id}
/// Only the author gets past this; everyone else receives 403 and the post
/// stays as it was.
#[put("/profiles/{username}/posts/{post_id}")]
pub async fn post_edit(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<(String, Uuid)>,
    body: web::Json<PostForm>,
) -> AppResult<HttpResponse> {
    let (username, post_id) = path.into_inner();
    let post = state
        .posts
        .edit_post(user.user_id, &username, post_id, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Post updated successfully", post)))
}

/// POST /api/profiles/{username}/posts/{post_id}/comments
#[post("/profiles/{username}/posts/{post_id}/comments")]
pub async fn add_comment(
    state: web::Data<AppState>,
    user: Option<AuthenticatedUser>,
    path: web::Path<(String, Uuid)>,
    body: web::Json<CommentForm>,
) -> AppResult<HttpResponse> {
    let (username, post_id) = path.into_inner();
    let comment = state
        .posts
        .add_comment(user.map(|u| u.user_id), &username, post_id, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success("Comment added successfully", comment)))
}
