pub mod config;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;

use std::sync::Arc;

use crate::repositories::EntityStore;
use crate::services::auth_services::AuthService;
use crate::services::feed_cache::FeedCache;
use crate::services::feed_service::FeedService;
use crate::services::follow_service::FollowService;
use crate::services::group_service::GroupService;
use crate::services::post_service::PostService;

pub use crate::handlers::configure_routes;

/// Everything a request handler needs. All services share one store and
/// one feed cache.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub feed: FeedService,
    pub posts: PostService,
    pub follows: FollowService,
    pub groups: GroupService,
}

impl AppState {
    pub fn new(store: Arc<dyn EntityStore>, auth: AuthService, cache: FeedCache) -> Self {
        Self {
            feed: FeedService::new(store.clone(), cache.clone()),
            posts: PostService::new(store.clone(), cache),
            follows: FollowService::new(store.clone()),
            groups: GroupService::new(store),
            auth,
        }
    }
}
