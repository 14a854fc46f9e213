//! 应用状态定义
//!
//! 包含 Axum 路由共享的应用状态

use std::sync::Arc;

use gift_redemption::repository::{
    GiftRepository, PointLedgerRepository, RatingRepository, RedemptionRepository,
};
use gift_redemption::{PointsService, RatingService, RedemptionService};
use gift_shared::config::AuthConfig;
use sqlx::PgPool;

use crate::auth::JwtManager;

/// Axum 应用共享状态
///
/// 服务实例通过 Arc 在 handler 间共享
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL 连接池
    pub pool: PgPool,
    /// JWT 管理器
    pub jwt_manager: JwtManager,
    /// 积分账本服务
    pub points_service: Arc<PointsService>,
    /// 兑换编排服务
    pub redemption_service: Arc<RedemptionService>,
    /// 评分聚合服务
    pub rating_service: Arc<RatingService>,
}

impl AppState {
    /// 创建应用状态，装配仓储与服务
    pub fn new(pool: PgPool, auth: &AuthConfig) -> Self {
        let gift_repo = Arc::new(GiftRepository::new(pool.clone()));
        let ledger_repo = Arc::new(PointLedgerRepository::new(pool.clone()));
        let redemption_repo = Arc::new(RedemptionRepository::new(pool.clone()));
        let rating_repo = Arc::new(RatingRepository::new(pool.clone()));

        let points_service = Arc::new(PointsService::new(ledger_repo, pool.clone()));
        let redemption_service = Arc::new(RedemptionService::new(
            gift_repo,
            redemption_repo,
            rating_repo,
            pool.clone(),
        ));
        let rating_service = Arc::new(RatingService::new(pool.clone()));

        Self {
            pool,
            jwt_manager: JwtManager::new(auth),
            points_service,
            redemption_service,
            rating_service,
        }
    }
}
