use std::env;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use deadpool_postgres::{Config, Pool, Runtime};
use tokio_postgres::NoTls;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub jwt_secret: String,
    pub store: StoreBackend,
    pub pg_pool_max: usize,
    pub feed_cache_ttl: Duration,
    pub feed_cache_capacity: u64,
}

impl AppConfig {
    /// Reads the process environment. Call `dotenv::dotenv()` first to pick
    /// up a local `.env`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = parse_or(&get, "PORT", 8080)?;
        let allowed_origins = get("ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000,http://127.0.0.1:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let jwt_secret = get("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .context("JWT_SECRET not set")?;
        let store = match get("STORE_BACKEND").as_deref().map(str::trim) {
            None | Some("") | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => bail!("unknown STORE_BACKEND '{}'", other),
        };

        Ok(Self {
            port,
            allowed_origins,
            jwt_secret,
            store,
            pg_pool_max: parse_or(&get, "PG_POOL_MAX", 16)?,
            feed_cache_ttl: Duration::from_secs(parse_or(&get, "FEED_CACHE_TTL_SECS", 20)?),
            feed_cache_capacity: parse_or(&get, "FEED_CACHE_CAPACITY", 1000)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

pub fn get_pg_pool(max_size: usize) -> Result<Pool> {
    let mut cfg = Config::new();
    cfg.host = Some(env::var("PG_HOST").context("PG_HOST not set")?);
    cfg.user = Some(env::var("PG_USER").context("PG_USER not set")?);
    cfg.password = env::var("PG_PASS").ok();
    cfg.dbname = Some(env::var("PG_DB").context("PG_DB not set")?);

    let mut pool_cfg = cfg.pool.unwrap_or_default();
    pool_cfg.max_size = max_size;
    cfg.pool = Some(pool_cfg);

    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
        .context("failed to create postgres pool")
}
