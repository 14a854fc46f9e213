//! 礼品兑换核心错误类型
//!
//! 定义账本、库存、兑换、评分各环节的业务错误和系统错误

use thiserror::Error;
use uuid::Uuid;

/// 礼品兑换核心错误类型
#[derive(Debug, Error)]
pub enum GiftError {
    // === 礼品相关错误 ===
    #[error("礼品不存在: {0}")]
    GiftNotFound(Uuid),

    #[error("礼品已下架: {0}")]
    GiftInactive(Uuid),

    #[error("礼品库存不足: gift_id={gift_id}, 需要 {requested}, 剩余 {available}")]
    InsufficientStock {
        gift_id: Uuid,
        requested: i32,
        available: i32,
    },

    /// 条件更新影响 0 行：并发兑换已消耗库存
    #[error("库存竞争失败，请重试: gift_id={0}")]
    StockRace(Uuid),

    // === 积分账本相关错误 ===
    #[error("积分不足: 需要 {required}, 可用 {available}")]
    InsufficientPoints { required: i32, available: i32 },

    #[error("用户不存在: {0}")]
    UserNotFound(Uuid),

    // === 评分相关错误 ===
    #[error("兑换记录不存在: {0}")]
    RedemptionNotFound(Uuid),

    #[error("只能评价自己已完成的兑换: redemption_id={redemption_id}")]
    NotEligible { redemption_id: Uuid },

    #[error("该兑换已评价过: redemption_id={0}")]
    AlreadyRated(Uuid),

    // === 系统错误 ===
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON 序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("参数校验失败: {0}")]
    Validation(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 核心 Result 类型别名
pub type Result<T> = std::result::Result<T, GiftError>;

impl GiftError {
    /// 检查是否为调用方可重试的错误
    ///
    /// StockRace 表示输掉了 compare-and-set，整个事务已回滚，
    /// 调用方以全新请求重试是安全的；核心自身从不重试。
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_) | Self::StockRace(_))
    }

    /// 检查是否为业务错误（非系统错误）
    pub fn is_business_error(&self) -> bool {
        !matches!(
            self,
            Self::Database(_) | Self::Serialization(_) | Self::Internal(_)
        )
    }

    /// 获取错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::GiftNotFound(_) => "GIFT_NOT_FOUND",
            Self::GiftInactive(_) => "GIFT_INACTIVE",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::StockRace(_) => "STOCK_RACE",
            Self::InsufficientPoints { .. } => "INSUFFICIENT_POINTS",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::RedemptionNotFound(_) => "REDEMPTION_NOT_FOUND",
            Self::NotEligible { .. } => "NOT_ELIGIBLE",
            Self::AlreadyRated(_) => "ALREADY_RATED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
