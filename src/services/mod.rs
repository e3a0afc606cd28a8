pub mod auth_services;
pub mod authorization;
pub mod feed_cache;
pub mod feed_service;
pub mod follow_service;
pub mod group_service;
pub mod post_service;
