use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::keys::user_keys;
use crate::cache::{CacheError, CacheLayer};
use crate::user::User;

/// 用户缓存操作
pub struct UserCacheOperations;

impl UserCacheOperations {
    /// 从缓存获取用户列表
    pub async fn get_cached_users(cache: &dyn CacheLayer) -> Result<Option<Vec<User>>, CacheError> {
        Self::read(cache, user_keys::ALL_USERS_KEY).await
    }

    /// 将用户列表写入缓存
    pub async fn cache_users(
        cache: &dyn CacheLayer,
        users: &[User],
        ttl: Duration,
    ) -> Result<(), CacheError> {
        Self::write(cache, user_keys::ALL_USERS_KEY, &users, ttl).await
    }

    /// 从缓存获取单个用户
    pub async fn get_cached_user(cache: &dyn CacheLayer, user_id: i32) -> Result<Option<User>, CacheError> {
        Self::read(cache, &user_keys::user_key(user_id)).await
    }

    /// 将单个用户写入缓存
    pub async fn cache_user(cache: &dyn CacheLayer, user: &User, ttl: Duration) -> Result<(), CacheError> {
        Self::write(cache, &user_keys::user_key(user.id), user, ttl).await
    }

    /// 清除用户列表缓存
    pub async fn remove_users_from_cache(cache: &dyn CacheLayer) -> Result<bool, CacheError> {
        cache.delete(user_keys::ALL_USERS_KEY).await
    }

    /// 清除单个用户缓存
    pub async fn remove_user_from_cache(cache: &dyn CacheLayer, user_id: i32) -> Result<bool, CacheError> {
        cache.delete(&user_keys::user_key(user_id)).await
    }

    async fn read<T: DeserializeOwned>(cache: &dyn CacheLayer, key: &str) -> Result<Option<T>, CacheError> {
        match cache.get(key).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn write<T: Serialize + ?Sized>(
        cache: &dyn CacheLayer,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let json = serde_json::to_string(value)?;
        cache.set_ex(key, &json, ttl).await
    }
}
