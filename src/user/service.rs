use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cache::keys::{ALL_USERS_KEY, user_key};
use crate::cache::{CacheError, CacheLayer, InvalidationPolicy, UserCacheOperations};
use crate::database::UserStore;
use crate::error::{AppError, AppResult};
use crate::user::types::{Sourced, User, UserInput};

/// 用户读写的缓存旁路协调器
///
/// 读：先查缓存，未命中时读库并回填。写：先提交到数据库，再失效或刷新受影响的键。
/// 缓存故障只记录日志，从不向调用方暴露；数据库结果始终是权威结果。
pub struct UserService {
    store: Arc<dyn UserStore>,
    cache: Arc<dyn CacheLayer>,
    ttl: Duration,
    policy: InvalidationPolicy,
}

impl UserService {
    pub fn new(
        store: Arc<dyn UserStore>,
        cache: Arc<dyn CacheLayer>,
        ttl: Duration,
        policy: InvalidationPolicy,
    ) -> Self {
        Self {
            store,
            cache,
            ttl,
            policy,
        }
    }

    pub async fn get_all_users(&self) -> AppResult<Sourced<Vec<User>>> {
        match UserCacheOperations::get_cached_users(self.cache.as_ref()).await {
            Ok(Some(users)) => {
                debug!("Cache hit for key '{}'", ALL_USERS_KEY);
                return Ok(Sourced::from_cache(users));
            }
            Ok(None) => debug!("Cache miss for key '{}'", ALL_USERS_KEY),
            Err(e) => warn!("Cache read for '{}' failed, falling back to store: {}", ALL_USERS_KEY, e),
        }

        let users = self.store.find_all().await?;
        self.populate_users(&users).await;
        Ok(Sourced::from_store(users))
    }

    pub async fn get_user_by_id(&self, id: i32) -> AppResult<User> {
        ensure_positive(id)?;

        match UserCacheOperations::get_cached_user(self.cache.as_ref(), id).await {
            Ok(Some(user)) => {
                debug!("Cache hit for key '{}'", user_key(id));
                return Ok(user);
            }
            Ok(None) => debug!("Cache miss for key '{}'", user_key(id)),
            Err(e) => warn!("Cache read for '{}' failed, falling back to store: {}", user_key(id), e),
        }

        let user = self.store.find_by_id(id).await?.ok_or(AppError::NotFound)?;
        if let Err(e) = UserCacheOperations::cache_user(self.cache.as_ref(), &user, self.ttl).await {
            warn!("Failed to cache '{}': {}", user_key(id), e);
        }
        Ok(user)
    }

    /// 新用户不预先写入单用户缓存；列表缓存直接失效，由下一次读取回填
    pub async fn create_user(&self, input: UserInput) -> AppResult<User> {
        input.validate()?;

        let user = self.store.create(&input).await?;
        info!("User created: {}", user.id);

        self.invalidate_users().await;
        Ok(user)
    }

    /// 整体替换 name、email、age
    pub async fn update_user(&self, id: i32, input: UserInput) -> AppResult<User> {
        ensure_positive(id)?;
        input.validate()?;

        let user = self
            .store
            .update(id, &input)
            .await?
            .ok_or(AppError::NotFound)?;
        info!("User updated: {}", id);

        if self.policy == InvalidationPolicy::Strict {
            self.invalidate_user(id).await;
            self.invalidate_users().await;
        }
        Ok(user)
    }

    /// 删除后立即用最新的用户列表覆盖列表缓存，而不是单纯失效
    pub async fn delete_user(&self, id: i32) -> AppResult<()> {
        ensure_positive(id)?;

        if !self.store.delete(id).await? {
            return Err(AppError::NotFound);
        }
        info!("User deleted: {}", id);

        match self.store.find_all().await {
            Ok(users) => self.populate_users(&users).await,
            Err(e) => {
                // 删除已提交；刷新失败时退回到失效，避免列表缓存继续包含已删除的用户
                warn!("Failed to reload users after deleting {}: {}", id, e);
                self.invalidate_users().await;
            }
        }

        if self.policy == InvalidationPolicy::Strict {
            self.invalidate_user(id).await;
        }
        Ok(())
    }

    async fn populate_users(&self, users: &[User]) {
        if let Err(e) = UserCacheOperations::cache_users(self.cache.as_ref(), users, self.ttl).await {
            warn!("Failed to cache '{}': {}", ALL_USERS_KEY, e);
        }
    }

    async fn invalidate_users(&self) {
        let result = UserCacheOperations::remove_users_from_cache(self.cache.as_ref()).await;
        log_invalidation(ALL_USERS_KEY, result);
    }

    async fn invalidate_user(&self, id: i32) {
        let result = UserCacheOperations::remove_user_from_cache(self.cache.as_ref(), id).await;
        log_invalidation(&user_key(id), result);
    }
}

fn log_invalidation(key: &str, result: Result<bool, CacheError>) {
    match result {
        Ok(existed) => debug!("Invalidated '{}' (present: {})", key, existed),
        Err(e) => warn!("Failed to invalidate '{}': {}", key, e),
    }
}

fn ensure_positive(id: i32) -> AppResult<()> {
    if id > 0 { Ok(()) } else { Err(AppError::InvalidId(id)) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::database::{MemoryUserStore, StoreError};
    use crate::user::DataSource;

    const TTL: Duration = Duration::from_secs(600);

    struct Fixture {
        store: Arc<MemoryUserStore>,
        cache: Arc<MemoryCache>,
        service: UserService,
    }

    fn fixture(policy: InvalidationPolicy) -> Fixture {
        let store = Arc::new(MemoryUserStore::new());
        let cache = Arc::new(MemoryCache::new());
        let service = UserService::new(store.clone(), cache.clone(), TTL, policy);
        Fixture {
            store,
            cache,
            service,
        }
    }

    fn input(name: &str, age: Option<i32>) -> UserInput {
        UserInput {
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            age,
        }
    }

    #[tokio::test]
    async fn list_is_store_sourced_then_cache_sourced() {
        let f = fixture(InvalidationPolicy::Strict);
        f.service.create_user(input("John", Some(25))).await.unwrap();

        let first = f.service.get_all_users().await.unwrap();
        assert_eq!(first.source, DataSource::Store);
        assert!(f.cache.get(ALL_USERS_KEY).await.unwrap().is_some());

        let second = f.service.get_all_users().await.unwrap();
        assert_eq!(second.source, DataSource::Cache);
        assert_eq!(second.data, first.data);
    }

    #[tokio::test]
    async fn create_invalidates_the_list() {
        let f = fixture(InvalidationPolicy::Strict);
        f.service.create_user(input("mark", None)).await.unwrap();
        f.service.get_all_users().await.unwrap();

        let created = f.service.create_user(input("kofi", Some(30))).await.unwrap();
        assert_eq!(f.cache.get(ALL_USERS_KEY).await.unwrap(), None);
        assert_eq!(f.cache.get(&user_key(created.id)).await.unwrap(), None);

        let listed = f.service.get_all_users().await.unwrap();
        assert_eq!(listed.source, DataSource::Store);
        assert!(listed.data.contains(&created));
    }

    #[tokio::test]
    async fn get_by_id_populates_and_is_idempotent() {
        let f = fixture(InvalidationPolicy::Strict);
        let created = f.service.create_user(input("ama", Some(22))).await.unwrap();

        let first = f.service.get_user_by_id(created.id).await.unwrap();
        assert!(f.cache.get(&user_key(created.id)).await.unwrap().is_some());
        let second = f.service.get_user_by_id(created.id).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first, created);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let f = fixture(InvalidationPolicy::Strict);
        assert!(matches!(f.service.get_user_by_id(1).await, Err(AppError::NotFound)));
        assert!(matches!(
            f.service.update_user(1, input("x", None)).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(f.service.delete_user(1).await, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn non_positive_ids_are_rejected() {
        let f = fixture(InvalidationPolicy::Strict);
        assert!(matches!(f.service.get_user_by_id(0).await, Err(AppError::InvalidId(0))));
        assert!(matches!(f.service.delete_user(-3).await, Err(AppError::InvalidId(-3))));
    }

    #[tokio::test(start_paused = true)]
    async fn delete_refreshes_the_list_with_a_new_ttl() {
        let f = fixture(InvalidationPolicy::Strict);
        let a = f.service.create_user(input("kwame", None)).await.unwrap();
        let b = f.service.create_user(input("esi", Some(26))).await.unwrap();
        f.service.get_all_users().await.unwrap();

        tokio::time::advance(Duration::from_secs(300)).await;
        f.service.delete_user(a.id).await.unwrap();

        assert_eq!(f.cache.ttl(ALL_USERS_KEY).await, Some(TTL));
        let listed = f.service.get_all_users().await.unwrap();
        assert_eq!(listed.source, DataSource::Cache);
        assert_eq!(listed.data, vec![b]);
    }

    #[tokio::test]
    async fn strict_policy_drops_stale_entries_on_update_and_delete() {
        let f = fixture(InvalidationPolicy::Strict);
        let user = f.service.create_user(input("mark", Some(25))).await.unwrap();
        f.service.get_user_by_id(user.id).await.unwrap();
        f.service.get_all_users().await.unwrap();

        let updated = f
            .service
            .update_user(user.id, input("Marcus", None))
            .await
            .unwrap();
        assert_eq!(f.service.get_user_by_id(user.id).await.unwrap(), updated);
        assert_eq!(f.service.get_all_users().await.unwrap().data, vec![updated]);

        f.service.delete_user(user.id).await.unwrap();
        assert!(matches!(
            f.service.get_user_by_id(user.id).await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn legacy_policy_keeps_the_known_staleness_windows() {
        let f = fixture(InvalidationPolicy::Legacy);
        let user = f.service.create_user(input("mark", Some(25))).await.unwrap();
        f.service.get_user_by_id(user.id).await.unwrap();
        f.service.get_all_users().await.unwrap();

        f.service
            .update_user(user.id, input("Marcus", None))
            .await
            .unwrap();
        assert_eq!(f.service.get_user_by_id(user.id).await.unwrap(), user);
        let listed = f.service.get_all_users().await.unwrap();
        assert_eq!(listed.source, DataSource::Cache);
        assert_eq!(listed.data, vec![user.clone()]);

        f.service.delete_user(user.id).await.unwrap();
        assert_eq!(f.service.get_user_by_id(user.id).await.unwrap(), user);
        assert!(f.service.get_all_users().await.unwrap().data.is_empty());
    }

    #[tokio::test]
    async fn cache_outage_falls_back_to_store() {
        let f = fixture(InvalidationPolicy::Strict);
        let user = f.service.create_user(input("ama", None)).await.unwrap();
        f.cache.set_online(false);

        let listed = f.service.get_all_users().await.unwrap();
        assert_eq!(listed.source, DataSource::Store);
        assert_eq!(f.service.get_user_by_id(user.id).await.unwrap(), user);

        let other = f.service.create_user(input("esi", None)).await.unwrap();
        f.service.update_user(other.id, input("Esi", Some(1))).await.unwrap();
        f.service.delete_user(other.id).await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_cache_entry_is_treated_as_a_miss() {
        let f = fixture(InvalidationPolicy::Strict);
        let user = f.service.create_user(input("kofi", None)).await.unwrap();
        f.cache.set_ex(ALL_USERS_KEY, "{broken", TTL).await.unwrap();

        let listed = f.service.get_all_users().await.unwrap();
        assert_eq!(listed.source, DataSource::Store);
        assert_eq!(listed.data, vec![user]);
        assert_eq!(
            f.service.get_all_users().await.unwrap().source,
            DataSource::Cache
        );
    }

    #[tokio::test]
    async fn store_outage_is_surfaced() {
        let f = fixture(InvalidationPolicy::Strict);
        f.store.set_online(false);
        assert!(matches!(
            f.service.get_all_users().await,
            Err(AppError::StoreUnavailable(_))
        ));
        assert!(matches!(
            f.service.create_user(input("x", None)).await,
            Err(AppError::StoreUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn cached_list_is_served_while_store_is_down() {
        let f = fixture(InvalidationPolicy::Strict);
        f.service.create_user(input("mark", None)).await.unwrap();
        f.service.get_all_users().await.unwrap();

        f.store.set_online(false);
        let listed = f.service.get_all_users().await.unwrap();
        assert_eq!(listed.source, DataSource::Cache);
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_store() {
        let f = fixture(InvalidationPolicy::Strict);
        assert!(matches!(
            f.service.create_user(input("", None)).await,
            Err(AppError::Validation(_))
        ));
        assert!(f.store.find_all().await.unwrap().is_empty());
    }

    /// 删除成功后重新读取列表会失败的存储
    struct FailingReloadStore {
        inner: MemoryUserStore,
        deleted: std::sync::atomic::AtomicBool,
    }

    #[async_trait::async_trait]
    impl UserStore for FailingReloadStore {
        async fn create(&self, input: &UserInput) -> Result<User, StoreError> {
            self.inner.create(input).await
        }

        async fn find_by_id(&self, id: i32) -> Result<Option<User>, StoreError> {
            self.inner.find_by_id(id).await
        }

        async fn find_all(&self) -> Result<Vec<User>, StoreError> {
            if self.deleted.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(StoreError::Unavailable("reload failed".into()));
            }
            self.inner.find_all().await
        }

        async fn update(&self, id: i32, input: &UserInput) -> Result<Option<User>, StoreError> {
            self.inner.update(id, input).await
        }

        async fn delete(&self, id: i32) -> Result<bool, StoreError> {
            let deleted = self.inner.delete(id).await?;
            self.deleted.store(true, std::sync::atomic::Ordering::SeqCst);
            Ok(deleted)
        }
    }

    #[tokio::test]
    async fn failed_reload_after_delete_drops_the_list() {
        let store = Arc::new(FailingReloadStore {
            inner: MemoryUserStore::new(),
            deleted: std::sync::atomic::AtomicBool::new(false),
        });
        let cache = Arc::new(MemoryCache::new());
        let service = UserService::new(store.clone(), cache.clone(), TTL, InvalidationPolicy::Legacy);

        let a = service.create_user(input("kwame", None)).await.unwrap();
        service.create_user(input("esi", None)).await.unwrap();
        service.get_all_users().await.unwrap();
        assert!(cache.get(ALL_USERS_KEY).await.unwrap().is_some());

        service.delete_user(a.id).await.unwrap();
        assert_eq!(cache.get(ALL_USERS_KEY).await.unwrap(), None);
        assert_eq!(store.inner.find_by_id(a.id).await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writers_converge_once_the_ttl_passes() {
        let short_ttl = Duration::from_millis(200);
        let store = Arc::new(MemoryUserStore::new());
        let cache = Arc::new(MemoryCache::new());
        let service = Arc::new(UserService::new(
            store.clone(),
            cache.clone(),
            short_ttl,
            InvalidationPolicy::Strict,
        ));

        let mut seeded = Vec::new();
        for i in 0..10 {
            seeded.push(service.create_user(input(&format!("seed{}", i), None)).await.unwrap());
        }

        let mut tasks = tokio::task::JoinSet::new();
        for (i, user) in seeded.into_iter().enumerate() {
            let svc = service.clone();
            tasks.spawn(async move { svc.delete_user(user.id).await.map(|_| ()) });
            let svc = service.clone();
            tasks.spawn(async move {
                svc.create_user(input(&format!("new{}", i), Some(i as i32)))
                    .await
                    .map(|_| ())
            });
            let svc = service.clone();
            tasks.spawn(async move { svc.get_all_users().await.map(|_| ()) });
        }
        while let Some(joined) = tasks.join_next().await {
            joined.unwrap().unwrap();
        }

        // 并发期间列表缓存可能落后一步，过期后必须与数据库一致
        tokio::time::sleep(short_ttl + Duration::from_millis(100)).await;
        let expected = store.find_all().await.unwrap();
        assert_eq!(expected.len(), 10);

        let fresh = service.get_all_users().await.unwrap();
        assert_eq!(fresh.source, DataSource::Store);
        assert_eq!(fresh.data, expected);

        let cached = service.get_all_users().await.unwrap();
        assert_eq!(cached.source, DataSource::Cache);
        assert_eq!(cached.data, expected);
    }
}
