use sqlx::PgPool;

/// 创建 `users` 表（已存在时跳过）
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id SERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            age INTEGER
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::debug!("users table ready");
    Ok(())
}
