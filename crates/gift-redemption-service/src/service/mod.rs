//! 服务层
//!
//! 组合仓储完成完整业务流程：积分账本、兑换编排、评分聚合。

pub mod dto;
mod points_service;
mod rating_service;
mod redemption_service;

pub use points_service::{PointsService, WELCOME_BONUS_POINTS};
pub use rating_service::RatingService;
pub use redemption_service::RedemptionService;
