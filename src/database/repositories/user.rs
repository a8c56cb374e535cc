use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::{StoreError, UserStore};
use crate::user::{User, UserInput};

/// 用户存储库实现（Postgres）
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserRepository {
    async fn create(&self, input: &UserInput) -> Result<User, StoreError> {
        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, age)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, age
            "#,
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(input.age)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => {
                tracing::info!("Created user: {}", user.id);
                Ok(user)
            }
            Err(e) => {
                tracing::error!("Failed to create user: {:?}", e);
                Err(e.into())
            }
        }
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, age
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, age
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn update(&self, id: i32, input: &UserInput) -> Result<Option<User>, StoreError> {
        // 提前返回时 `tx` 被丢弃，事务自动回滚
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_scalar::<_, i32>("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_none() {
            return Ok(None);
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = $1, email = $2, age = $3
            WHERE id = $4
            RETURNING id, name, email, age
            "#,
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(input.age)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!("Updated user: {}", id);
        Ok(Some(user))
    }

    async fn delete(&self, id: i32) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_scalar::<_, i32>("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_none() {
            return Ok(false);
        }

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!("Deleted user: {}", id);
        Ok(true)
    }
}
