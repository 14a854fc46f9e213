//! 积分礼品兑换核心库
//!
//! 以 Postgres 为唯一事实来源的积分账本与兑换一致性引擎：
//!
//! - **积分账本**：append-only 流水，余额取最新一条的 balance_after
//! - **库存守卫**：条件更新原子扣减，并发超卖由数据库裁决
//! - **兑换编排**：记录 + 出账 + 扣库存包在单个事务内，全有或全无
//! - **评分聚合**：兑换后评分，写入时同步重算礼品均分
//!
//! 服务层只依赖仓储层写入共享状态，HTTP 层见 gift-api-service。

pub mod error;
pub mod models;
pub mod repository;
pub mod service;

pub use error::{GiftError, Result};
pub use models::{star_rating, Gift, PointTransaction, Rating, Redemption, RedemptionStatus, TransactionType};
pub use service::{PointsService, RatingService, RedemptionService, WELCOME_BONUS_POINTS};
