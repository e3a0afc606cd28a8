// src/handlers/group_handlers.rs
use actix_web::{get, post, web, HttpResponse};

use crate::dtos::group_dtos::GroupForm;
use crate::dtos::ApiResponse;
use crate::error::AppResult;
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::AppState;

/// GET /api/groups
#[get("/groups")]
pub async fn list_groups(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let groups = state.groups.list_groups().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Groups retrieved successfully", groups)))
}

/// POST /api/groups (admins only)
#[post("/groups")]
pub async fn create_group(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<GroupForm>,
) -> AppResult<HttpResponse> {
    let group = state
        .groups
        .create_group(user.user_id, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success("Group created successfully", group)))
}
