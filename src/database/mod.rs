// 数据库模块
// 用户数据的权威存储

use async_trait::async_trait;

use crate::user::{User, UserInput};

pub mod repositories;
pub mod schema;

pub use repositories::{MemoryUserStore, PgUserRepository};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Unavailable(String),
}

/// 用户存储，每个方法都是一个原子操作
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 插入用户，由存储分配 id
    async fn create(&self, input: &UserInput) -> Result<User, StoreError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, StoreError>;

    /// 按 id 排序的全部用户
    async fn find_all(&self) -> Result<Vec<User>, StoreError>;

    /// 整体替换可变字段，id 不存在时返回 `None`
    async fn update(&self, id: i32, input: &UserInput) -> Result<Option<User>, StoreError>;

    /// id 不存在时返回 `false`
    async fn delete(&self, id: i32) -> Result<bool, StoreError>;
}
