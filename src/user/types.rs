use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::{AppError, AppResult};

/// 用户实体，同时也是写入缓存的结构
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
}

/// 创建和更新请求体；更新时整体替换所有字段
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub age: Option<i32>,
}

impl UserInput {
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("name must not be blank".into()));
        }
        if self.email.trim().is_empty() {
            return Err(AppError::Validation("email must not be blank".into()));
        }
        if matches!(self.age, Some(age) if age < 0) {
            return Err(AppError::Validation("age must not be negative".into()));
        }
        Ok(())
    }
}

/// 读取结果的数据来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Cache,
    Store,
}

impl DataSource {
    pub fn message(self) -> &'static str {
        match self {
            DataSource::Cache => "Data from Redis Cache",
            DataSource::Store => "Data from PostgreSQL",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sourced<T> {
    pub source: DataSource,
    pub data: T,
}

impl<T> Sourced<T> {
    pub fn from_cache(data: T) -> Self {
        Self {
            source: DataSource::Cache,
            data,
        }
    }

    pub fn from_store(data: T) -> Self {
        Self {
            source: DataSource::Store,
            data,
        }
    }
}
