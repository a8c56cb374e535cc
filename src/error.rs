use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::cache::CacheError;
use crate::database::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("User not found")]
    NotFound,
    #[error("User id must be positive, got {0}")]
    InvalidId(i32),
    #[error("{0}")]
    Validation(String),
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
    /// 缓存故障在协调器内部记录并吞掉，不会返回给客户端；保留该变体以完整表达错误分类
    #[error("Cache unavailable: {0}")]
    CacheUnavailable(#[from] CacheError),
}

pub type AppResult<T> = Result<T, AppError>;

// 请求体和路径参数解析失败，统一按 422 返回
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    code: i32,
    error_message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::InvalidId(_) | AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::StoreUnavailable(_) | AppError::CacheUnavailable(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        // 内部错误细节只写日志，不返回给客户端
        let error_message = if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(ErrorResponse {
            code: status.as_u16() as i32,
            error_message,
        });

        (status, body).into_response()
    }
}
