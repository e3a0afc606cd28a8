// src/services/authorization.rs
//! Permission checks run by the services before they touch the store.
//! None of these look at request state or the store; callers pass in
//! everything the decision needs.

use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::post::Post;
use crate::models::user::User;

/// Only the author may edit a post.
pub fn can_edit(actor: Uuid, post: &Post) -> bool {
    actor == post.author_id
}

/// Any signed-in user may comment.
pub fn can_create_comment(actor: Option<Uuid>) -> bool {
    actor.is_some()
}

pub fn can_follow(actor: Uuid, target: Uuid) -> AppResult<()> {
    if actor == target {
        return Err(AppError::SelfFollow);
    }
    Ok(())
}

pub fn can_manage_groups(actor: &User) -> bool {
    actor.is_admin()
}

/// `can_edit` as a guard for mutating paths.
pub fn ensure_can_edit(actor: Uuid, post: &Post) -> AppResult<()> {
    if can_edit(actor, post) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// `can_create_comment` as a guard, yielding the commenter's id.
pub fn ensure_can_comment(actor: Option<Uuid>) -> AppResult<Uuid> {
    match actor {
        Some(id) if can_create_comment(actor) => Ok(id),
        _ => Err(AppError::Unauthorized),
    }
}
