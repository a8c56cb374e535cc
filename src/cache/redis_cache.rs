use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::redis::AsyncCommands;
use deadpool_redis::{Config as PoolSettings, Connection, Pool, PoolConfig, Runtime};

use super::{CacheError, CacheLayer};

/// 连接池默认大小
pub const DEFAULT_POOL_SIZE: usize = 16;

/// Redis 缓存后端
///
/// 连接由 deadpool 连接池管理，按需建立；池中没有共享锁，并发请求各自等待自己的连接。
/// 每次取连接和每条命令都受 `timeout` 限制，超时的连接直接丢弃，不再放回池中。
pub struct RedisCache {
    pool: Pool,
    timeout: Duration,
}

impl RedisCache {
    pub fn new(pool: Pool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    pub fn open(redis_url: &str, pool_size: usize, timeout: Duration) -> Result<Self, CacheError> {
        let mut settings = PoolSettings::from_url(redis_url);
        settings.pool = Some(PoolConfig::new(pool_size.max(1)));
        let pool = settings
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| CacheError::Unavailable(format!("Failed to create Redis pool: {}", e)))?;
        Ok(Self::new(pool, timeout))
    }

    /// 启动时探测连接，失败只记录警告
    pub async fn warm_up(&self) {
        match self.get_conn().await {
            Ok(_) => tracing::info!("Connected to Redis"),
            Err(e) => tracing::warn!("Redis not reachable at startup, continuing without cache: {}", e),
        }
    }

    async fn get_conn(&self) -> Result<Connection, CacheError> {
        match tokio::time::timeout(self.timeout, self.pool.get()).await {
            Ok(conn) => Ok(conn?),
            Err(_) => Err(CacheError::Timeout(self.timeout)),
        }
    }

    /// 连接上的命令超时后，连接状态未知，直接从池中摘除
    fn discard(&self, conn: Connection) {
        drop(Connection::take(conn));
        tracing::debug!("Discarded Redis connection after timeout");
    }
}

#[async_trait]
impl CacheLayer for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.get_conn().await?;
        let result = tokio::time::timeout(self.timeout, conn.get::<_, Option<String>>(key)).await;
        match result {
            Ok(value) => Ok(value?),
            Err(_) => {
                self.discard(conn);
                Err(CacheError::Timeout(self.timeout))
            }
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.get_conn().await?;
        let ttl_secs = ttl.as_secs().max(1);
        let result =
            tokio::time::timeout(self.timeout, conn.set_ex::<_, _, ()>(key, value, ttl_secs)).await;
        match result {
            Ok(done) => Ok(done?),
            Err(_) => {
                self.discard(conn);
                Err(CacheError::Timeout(self.timeout))
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.get_conn().await?;
        let result = tokio::time::timeout(self.timeout, conn.del::<_, i64>(key)).await;
        match result {
            Ok(deleted) => Ok(deleted? > 0),
            Err(_) => {
                self.discard(conn);
                Err(CacheError::Timeout(self.timeout))
            }
        }
    }
}
