//! 路由配置模块
//!
//! 定义所有 REST API 端点的路由映射

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, state::AppState};

/// 构建业务 API 路由（挂载在 /api 下，需要认证）
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // 兑换
        .route(
            "/gifts/{id}/redeem",
            post(handlers::redemption::redeem_gift),
        )
        .route(
            "/gifts/redeem/multiple",
            post(handlers::redemption::redeem_multiple),
        )
        // 评分
        .route("/gifts/{id}/rating", post(handlers::rating::add_rating))
        // 积分
        .route("/users/me/points", get(handlers::points::get_balance))
        .route(
            "/users/me/points/history",
            get(handlers::points::get_history),
        )
        // 兑换历史
        .route(
            "/users/me/redemptions",
            get(handlers::redemption::list_my_redemptions),
        )
}
