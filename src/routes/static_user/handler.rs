use axum::extract::Json;

use crate::error::{AppError, AppResult};
use crate::routes::extract::AppPath;
use crate::user::User;

use super::model::static_users;

pub async fn list_static_users() -> Json<Vec<User>> {
    Json(static_users())
}

pub async fn get_static_user(AppPath(user_id): AppPath<i32>) -> AppResult<Json<User>> {
    static_users()
        .into_iter()
        .find(|user| user.id == user_id)
        .map(Json)
        .ok_or(AppError::NotFound)
}
