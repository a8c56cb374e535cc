use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::database::{StoreError, UserStore};
use crate::user::{User, UserInput};

/// 内存用户存储，id 分配方式与 Postgres 序列一致
///
/// 可以切换为离线状态以模拟数据库故障。
#[derive(Debug)]
pub struct MemoryUserStore {
    inner: RwLock<Inner>,
    online: AtomicBool,
}

#[derive(Debug)]
struct Inner {
    rows: BTreeMap<i32, User>,
    next_id: i32,
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
            online: AtomicBool::new(true),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store is offline".into()))
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, input: &UserInput) -> Result<User, StoreError> {
        self.check_online()?;
        let mut inner = self.inner.write().await;
        let id = inner.next_id;
        inner.next_id += 1;
        let user = User {
            id,
            name: input.name.clone(),
            email: input.email.clone(),
            age: input.age,
        };
        inner.rows.insert(id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, StoreError> {
        self.check_online()?;
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        self.check_online()?;
        Ok(self.inner.read().await.rows.values().cloned().collect())
    }

    async fn update(&self, id: i32, input: &UserInput) -> Result<Option<User>, StoreError> {
        self.check_online()?;
        let mut inner = self.inner.write().await;
        Ok(inner.rows.get_mut(&id).map(|user| {
            user.name = input.name.clone();
            user.email = input.email.clone();
            user.age = input.age;
            user.clone()
        }))
    }

    async fn delete(&self, id: i32) -> Result<bool, StoreError> {
        self.check_online()?;
        Ok(self.inner.write().await.rows.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str) -> UserInput {
        UserInput {
            name: name.into(),
            email: format!("{}@example.com", name),
            age: None,
        }
    }

    #[tokio::test]
    async fn ids_are_assigned_sequentially_and_never_reused() {
        let store = MemoryUserStore::new();
        let a = store.create(&input("a")).await.unwrap();
        let b = store.create(&input("b")).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));

        assert!(store.delete(b.id).await.unwrap());
        let c = store.create(&input("c")).await.unwrap();
        assert_eq!(c.id, 3);
    }

    #[tokio::test]
    async fn update_replaces_all_fields() {
        let store = MemoryUserStore::new();
        let created = store
            .create(&UserInput {
                name: "kofi".into(),
                email: "kofi@example.com".into(),
                age: Some(30),
            })
            .await
            .unwrap();

        let updated = store
            .update(created.id, &input("kwame"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "kwame");
        assert_eq!(updated.age, None);
        assert_eq!(store.update(99, &input("x")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn offline_store_fails_every_operation() {
        let store = MemoryUserStore::new();
        store.set_online(false);
        assert!(matches!(
            store.find_all().await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.create(&input("a")).await.is_err());
    }
}
