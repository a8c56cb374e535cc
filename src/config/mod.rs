use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::InvalidationPolicy;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub db_max_connections: u32,
    pub cache_ttl_secs: u64,
    pub cache_timeout_ms: u64,
    pub cache_pool_size: usize,
    pub cache_invalidation: InvalidationPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".into()),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            server_port: parse_or("SERVER_PORT", 8000),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 10),
            cache_ttl_secs: parse_or("CACHE_TTL_SECS", crate::cache::keys::DEFAULT_TTL_SECS),
            cache_timeout_ms: parse_or("CACHE_TIMEOUT_MS", 500),
            cache_pool_size: parse_or("CACHE_POOL_SIZE", crate::cache::redis_cache::DEFAULT_POOL_SIZE),
            cache_invalidation: parse_or("CACHE_INVALIDATION", InvalidationPolicy::Strict),
        })
    }

    /// Redis 的 SET EX 不接受 0 秒，两个缓存后端统一按至少 1 秒处理
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs.max(1))
    }

    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }
}

/// 读取可选环境变量，未设置或无法解析时使用默认值
fn parse_or<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid value for {}: {:?}, using default", name, raw);
            default
        }),
        Err(_) => default,
    }
}
