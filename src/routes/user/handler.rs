use axum::extract::{Json, State};

use crate::AppState;
use crate::error::AppResult;
use crate::routes::extract::{AppJson, AppPath};
use crate::user::{User, UserInput};

use super::model::{DeleteUserResponse, UsersResponse};

#[axum::debug_handler]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<UsersResponse>> {
    let users = state.users.get_all_users().await?;
    Ok(Json(users.into()))
}

#[axum::debug_handler]
pub async fn get_user(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<i32>,
) -> AppResult<Json<User>> {
    Ok(Json(state.users.get_user_by_id(user_id).await?))
}

#[axum::debug_handler]
pub async fn create_user(
    State(state): State<AppState>,
    AppJson(req): AppJson<UserInput>,
) -> AppResult<Json<User>> {
    Ok(Json(state.users.create_user(req).await?))
}

#[axum::debug_handler]
pub async fn update_user(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<i32>,
    AppJson(req): AppJson<UserInput>,
) -> AppResult<Json<User>> {
    Ok(Json(state.users.update_user(user_id, req).await?))
}

#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<i32>,
) -> AppResult<Json<DeleteUserResponse>> {
    state.users.delete_user(user_id).await?;
    Ok(Json(DeleteUserResponse::deleted()))
}
