//! 积分查询 API 处理器

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use validator::Validate;

use crate::{
    auth::Claims,
    dto::{ApiResponse, BalanceDto, HistoryQuery, PointTransactionDto},
    error::ApiError,
    state::AppState,
};

const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// GET /api/users/me/points - 当前用户积分余额
pub async fn get_balance(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<BalanceDto>>, ApiError> {
    let balance = state.points_service.get_balance(claims.sub).await?;

    Ok(Json(ApiResponse::success(BalanceDto {
        user_id: claims.sub,
        balance,
    })))
}

/// GET /api/users/me/points/history - 当前用户积分流水，最新在前
pub async fn get_history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<PointTransactionDto>>>, ApiError> {
    query.validate()?;
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);

    let history = state.points_service.get_history(claims.sub, limit).await?;

    let items = history
        .into_iter()
        .map(|entry| PointTransactionDto {
            id: entry.id,
            transaction_type: match entry.transaction_type {
                gift_redemption::TransactionType::Credit => "credit".to_string(),
                gift_redemption::TransactionType::Debit => "debit".to_string(),
            },
            amount: entry.amount,
            balance_after: entry.balance_after,
            description: entry.description,
            reference_id: entry.reference_id,
            created_at: entry.created_at,
        })
        .collect();

    Ok(Json(ApiResponse::success(items)))
}
