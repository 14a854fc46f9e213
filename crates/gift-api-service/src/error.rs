//! C端 API 错误类型定义
//!
//! 将核心库错误映射为 HTTP 状态码与统一响应体

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gift_redemption::GiftError;
use serde_json::json;
use uuid::Uuid;

/// C端 API 错误类型
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // 认证错误
    #[error("未授权: {0}")]
    Unauthorized(String),

    // 参数验证
    #[error("参数验证失败: {0}")]
    Validation(String),

    // 资源不存在
    #[error("礼品不存在: {0}")]
    GiftNotFound(Uuid),
    #[error("礼品已下架: {0}")]
    GiftInactive(Uuid),
    #[error("用户不存在: {0}")]
    UserNotFound(Uuid),
    #[error("兑换记录不存在: {0}")]
    RedemptionNotFound(Uuid),

    // 业务冲突
    #[error("库存不足")]
    InsufficientStock,
    #[error("积分不足: 需要 {required}, 可用 {available}")]
    InsufficientPoints { required: i32, available: i32 },
    #[error("商品已被抢完")]
    StockRace,
    #[error("该兑换已评价过")]
    AlreadyRated,
    #[error("不符合评价条件")]
    NotEligible,

    // 系统错误
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error("内部错误: {0}")]
    Internal(String),
}

impl ApiError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,

            Self::Validation(_) | Self::NotEligible => StatusCode::BAD_REQUEST,

            Self::GiftNotFound(_)
            | Self::GiftInactive(_)
            | Self::UserNotFound(_)
            | Self::RedemptionNotFound(_) => StatusCode::NOT_FOUND,

            Self::InsufficientStock
            | Self::InsufficientPoints { .. }
            | Self::StockRace
            | Self::AlreadyRated => StatusCode::CONFLICT,

            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::GiftNotFound(_) => "GIFT_NOT_FOUND",
            Self::GiftInactive(_) => "GIFT_INACTIVE",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::RedemptionNotFound(_) => "REDEMPTION_NOT_FOUND",
            Self::InsufficientStock => "INSUFFICIENT_STOCK",
            Self::InsufficientPoints { .. } => "INSUFFICIENT_POINTS",
            Self::StockRace => "STOCK_RACE",
            Self::AlreadyRated => "ALREADY_RATED",
            Self::NotEligible => "NOT_ELIGIBLE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志，防止信息泄露
        let message = match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, "数据库操作失败");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// 从核心库错误转换
impl From<GiftError> for ApiError {
    fn from(err: GiftError) -> Self {
        match err {
            GiftError::GiftNotFound(id) => Self::GiftNotFound(id),
            GiftError::GiftInactive(id) => Self::GiftInactive(id),
            GiftError::UserNotFound(id) => Self::UserNotFound(id),
            GiftError::RedemptionNotFound(id) => Self::RedemptionNotFound(id),
            GiftError::InsufficientStock { .. } => Self::InsufficientStock,
            GiftError::InsufficientPoints {
                required,
                available,
            } => Self::InsufficientPoints {
                required,
                available,
            },
            GiftError::StockRace(_) => Self::StockRace,
            GiftError::AlreadyRated(_) => Self::AlreadyRated,
            GiftError::NotEligible { .. } => Self::NotEligible,
            GiftError::Validation(msg) => Self::Validation(msg),
            GiftError::Database(e) => Self::Database(e),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// API 层 Result 类型别名
pub type Result<T> = std::result::Result<T, ApiError>;
