// 缓存模块
// 缓存层抽象、后端实现以及缓存键策略

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;

pub mod keys;
pub mod memory;
pub mod operations;
pub mod redis_cache;

// 重新导出常用类型，方便其他模块使用
pub use memory::MemoryCache;
pub use operations::UserCacheOperations;
pub use redis_cache::RedisCache;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error(transparent)]
    Redis(#[from] deadpool_redis::redis::RedisError),
    #[error(transparent)]
    Pool(#[from] deadpool_redis::PoolError),
    #[error("cache operation timed out after {0:?}")]
    Timeout(Duration),
    #[error("{0}")]
    Unavailable(String),
    #[error("malformed cache entry: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 带过期时间的键值缓存
///
/// 各个键相互独立，没有跨键的顺序保证。
#[async_trait]
pub trait CacheLayer: Send + Sync {
    /// 已过期或不存在的键返回 `None`
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// 整体覆盖写入，并重新计时
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// 键存在并被删除时返回 `true`
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;
}

/// 写操作之后的缓存失效策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidationPolicy {
    /// 更新和删除都会清除受影响的键
    #[default]
    Strict,
    /// 保留旧行为：更新不动缓存，删除只刷新用户列表
    Legacy,
}

impl FromStr for InvalidationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "legacy" => Ok(Self::Legacy),
            other => Err(format!("unknown invalidation policy: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_policy_case_insensitively() {
        assert_eq!("STRICT".parse(), Ok(InvalidationPolicy::Strict));
        assert_eq!("legacy".parse(), Ok(InvalidationPolicy::Legacy));
        assert!("sometimes".parse::<InvalidationPolicy>().is_err());
    }
}
