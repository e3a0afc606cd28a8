pub mod feed_handlers;
pub mod group_handlers;
pub mod post_handlers;
pub mod profile_handlers;

use actix_web::{get, web, HttpResponse};
use log::debug;

use crate::dtos::ApiResponse;
use crate::error::AppError;

#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success("ok", ()))
}

/// Extractor failures answer with the same envelope as every other error.
fn extractor_errors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, req| {
        debug!("rejected body for {}: {}", req.path(), err);
        AppError::Validation(format!("invalid JSON body: {err}")).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, req| {
        debug!("unmatched path {}: {}", req.path(), err);
        AppError::not_found(req.path().to_string()).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::Validation(format!("invalid query string: {err}")).into()
    }));
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    extractor_errors(cfg);
    cfg.service(health).service(
        web::scope("/api")
            .service(feed_handlers::index)             // GET /api/posts
            .service(post_handlers::create_post)       // POST /api/posts
            .service(feed_handlers::follow_index)      // GET /api/follow
            .service(group_handlers::list_groups)      // GET /api/groups
            .service(group_handlers::create_group)     // POST /api/groups
            .service(feed_handlers::group_posts)       // GET /api/groups/{slug}
            .service(profile_handlers::profile)        // GET /api/profiles/{username}
            .service(profile_handlers::profile_follow) // POST /api/profiles/{username}/follow
            .service(profile_handlers::profile_unfollow) // DELETE /api/profiles/{username}/follow
            .service(post_handlers::post_view)         // GET /api/profiles/{username}/posts/{id}
            .service(post_handlers::post_edit)         // PUT /api/profiles/{username}/posts/{id}
            .service(post_handlers::add_comment),      // POST .../posts/{id}/comments
    );
}
