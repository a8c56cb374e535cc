use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// JSON 请求体，解析失败时返回统一的错误结构
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// 路径参数，解析失败时返回统一的错误结构
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);
