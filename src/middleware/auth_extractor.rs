// src/middleware/auth_extractor.rs
use actix_web::{dev::Payload, web, Error, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use log::{debug, error};
use uuid::Uuid;

use crate::error::AppError;
use crate::AppState;

/// Caller identified by a valid `Authorization: Bearer <jwt>` header.
/// Use `Option<AuthenticatedUser>` on routes open to anonymous callers.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<AuthenticatedUser, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map_err(Error::from))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        error!("AppState is not registered; cannot authenticate");
        return Err(AppError::Unauthorized);
    };

    let header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;
    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Unauthorized)?;

    match state.auth.verify_token(token) {
        Ok(user_id) => Ok(AuthenticatedUser { user_id }),
        Err(e) => {
            debug!("rejected token: {}", e);
            Err(AppError::Unauthorized)
        }
    }
}
