// src/main.rs
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{error, info, warn};

use blogroll_be::config::{self, AppConfig, StoreBackend};
use blogroll_be::repositories::{EntityStore, InMemoryStore, PgStore};
use blogroll_be::services::auth_services::AuthService;
use blogroll_be::services::feed_cache::FeedCache;
use blogroll_be::{configure_routes, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let cfg = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    let store: Arc<dyn EntityStore> = match cfg.store {
        StoreBackend::Postgres => {
            let pool = match config::get_pg_pool(cfg.pg_pool_max) {
                Ok(p) => p,
                Err(e) => {
                    error!("Failed to create PG pool: {:#}", e);
                    std::process::exit(1);
                }
            };
            let pg = PgStore::new(pool);
            if let Err(e) = pg.migrate().await {
                error!("Failed to apply schema: {}", e);
                std::process::exit(1);
            }
            Arc::new(pg)
        }
        StoreBackend::Memory => {
            warn!("Using in-memory store; data is lost on restart");
            Arc::new(InMemoryStore::new())
        }
    };

    let cache = FeedCache::new(cfg.feed_cache_capacity, cfg.feed_cache_ttl);
    let state = web::Data::new(AppState::new(
        store,
        AuthService::new(cfg.jwt_secret.clone()),
        cache,
    ));

    let bind_address = cfg.bind_address();
    let allowed_origins = cfg.allowed_origins.clone();
    info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec!["authorization", "content-type", "accept"])
            .supports_credentials()
            .max_age(3600);
        for origin in &allowed_origins {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(configure_routes)
    })
    .bind(&bind_address)?
    .run()
    .await
}
