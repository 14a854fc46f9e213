//! 兑换 API 处理器
//!
//! 单件兑换、批量兑换与兑换历史查询的 HTTP 接口

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use gift_redemption::service::dto::{
    RedeemGiftResponse, RedeemItem, RedeemMultipleResponse, RedemptionHistoryDto,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::Claims,
    dto::{ApiResponse, RedeemGiftRequest, RedeemMultipleRequest},
    error::ApiError,
};
use crate::state::AppState;

/// POST /api/gifts/{id}/redeem - 兑换单件礼品
pub async fn redeem_gift(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(gift_id): Path<Uuid>,
    Json(request): Json<RedeemGiftRequest>,
) -> Result<Json<ApiResponse<RedeemGiftResponse>>, ApiError> {
    request.validate()?;

    let resp = state
        .redemption_service
        .redeem(claims.sub, gift_id, request.quantity)
        .await?;

    info!(
        user_id = %claims.sub,
        gift_id = %gift_id,
        redemption_id = %resp.redemption.id,
        "兑换请求完成"
    );

    let message = resp.message.clone();
    Ok(Json(ApiResponse::success_with_message(resp, message)))
}

/// POST /api/gifts/redeem/multiple - 批量兑换
pub async fn redeem_multiple(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<RedeemMultipleRequest>,
) -> Result<Json<ApiResponse<RedeemMultipleResponse>>, ApiError> {
    request.validate()?;

    let items: Vec<RedeemItem> = request
        .items
        .iter()
        .map(|item| RedeemItem {
            gift_id: item.gift_id,
            quantity: item.quantity,
        })
        .collect();

    let resp = state
        .redemption_service
        .redeem_multiple(claims.sub, &items)
        .await?;

    info!(
        user_id = %claims.sub,
        item_count = items.len(),
        total_points = resp.total_points_spent,
        "批量兑换请求完成"
    );

    let message = resp.message.clone();
    Ok(Json(ApiResponse::success_with_message(resp, message)))
}

/// GET /api/users/me/redemptions - 当前用户兑换历史
pub async fn list_my_redemptions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<RedemptionHistoryDto>>>, ApiError> {
    let history = state
        .redemption_service
        .list_user_redemptions(claims.sub)
        .await?;

    Ok(Json(ApiResponse::success(history)))
}
