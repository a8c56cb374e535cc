use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::{AppState, middleware::log_errors, routes};

// 动态用户路由：数据库 + 缓存
fn dynamic_user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/dynamic-users/",
            get(routes::user::list_users).post(routes::user::create_user),
        )
        .route(
            "/dynamic-users",
            get(routes::user::list_users).post(routes::user::create_user),
        )
        .route(
            "/dynamic-users/{user_id}",
            get(routes::user::get_user)
                .put(routes::user::update_user)
                .delete(routes::user::delete_user),
        )
}

// 静态用户路由
fn static_user_routes() -> Router<AppState> {
    Router::new()
        .route("/static-users/", get(routes::static_user::list_static_users))
        .route("/static-users", get(routes::static_user::list_static_users))
        .route(
            "/static-users/{user_id}",
            get(routes::static_user::get_static_user),
        )
}

// 创建主路由
pub fn create_router(state: AppState) -> Router {
    let router = Router::new()
        .merge(dynamic_user_routes())
        .merge(static_user_routes())
        .layer(axum::middleware::from_fn(log_errors))
        .layer(TraceLayer::new_for_http());

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = router.layer(tower_http::cors::CorsLayer::permissive());

    router.with_state(state)
}
