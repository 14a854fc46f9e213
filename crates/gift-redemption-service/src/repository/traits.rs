//! 仓储 Trait 定义
//!
//! 定义仓储接口，便于服务层依赖抽象而非具体实现，支持 mock 测试

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Gift, PointTransaction, Rating, Redemption};

use super::redemption_repo::RedemptionWithGiftRow;

/// 礼品仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GiftRepositoryTrait: Send + Sync {
    async fn get_gift(&self, id: Uuid) -> Result<Option<Gift>>;
}

/// 积分账本仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PointLedgerRepositoryTrait: Send + Sync {
    async fn get_balance(&self, user_id: Uuid) -> Result<i32>;
    async fn list_by_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<PointTransaction>>;
}

/// 兑换仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RedemptionRepositoryTrait: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Redemption>>;
    async fn list_by_user_with_gift(&self, user_id: Uuid) -> Result<Vec<RedemptionWithGiftRow>>;
}

/// 评分仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RatingRepositoryTrait: Send + Sync {
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Rating>>;
}
