//! 礼品兑换 API 服务（C端）
//!
//! 提供礼品兑换、评分、积分查询等 REST API。

use axum::{middleware, routing::get, Json, Router};
use gift_api_service::{middleware::auth_middleware, routes, state::AppState};
use gift_shared::{config::AppConfig, database::Database, observability};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 统一加载配置：config/ 目录 + GIFT_ 前缀环境变量
    let config = AppConfig::load("gift-api-service").unwrap_or_default();

    observability::init(&config.observability)?;

    info!("Starting gift-api-service on {}", config.server_addr());

    // 生产环境禁止使用默认 JWT 密钥
    if config.is_production() && config.auth.jwt_secret == "dev-secret-change-in-production" {
        anyhow::bail!("生产环境必须通过 GIFT_JWT_SECRET 注入 JWT 密钥");
    }
    if !config.is_production() && config.auth.jwt_secret == "dev-secret-change-in-production" {
        warn!("Using default JWT secret - set GIFT_JWT_SECRET for production");
    }

    // 初始化数据库并执行迁移
    let db = Database::connect(&config.database).await?;
    db.run_migrations().await?;
    info!("Database migrations applied");

    let state = AppState::new(db.pool().clone(), &config.auth);

    let app = Router::new()
        .nest("/api", routes::api_routes())
        .route("/health", get(health_check))
        .route(
            "/ready",
            get({
                let db_for_ready = db;
                move || readiness_check(db_for_ready.clone())
            }),
        )
        // 认证中间件：验证 JWT Token
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        // 请求追踪
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    // 优雅关闭：收到 SIGTERM（K8s 停止 Pod）或 Ctrl+C 时，
    // 停止接收新连接并等待已有请求处理完毕
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

/// 监听关闭信号
///
/// K8s 通过 SIGTERM 通知 Pod 停止；本地开发通过 Ctrl+C。
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("注册 Ctrl+C 处理器失败");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("注册 SIGTERM 处理器失败")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}

/// 存活探针：服务进程正常即返回 ok
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "gift-api-service"
    }))
}

/// 就绪探针：检查数据库连接是否可用
async fn readiness_check(db: Database) -> Json<serde_json::Value> {
    let db_ok = db.health_check().await.is_ok();

    Json(serde_json::json!({
        "status": if db_ok { "ok" } else { "degraded" },
        "service": "gift-api-service",
        "checks": {
            "database": if db_ok { "ok" } else { "fail" }
        }
    }))
}
