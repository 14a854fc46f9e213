//! 评分 API 处理器

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use gift_redemption::Rating;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::Claims,
    dto::{AddRatingRequest, ApiResponse},
    error::ApiError,
    state::AppState,
};

/// POST /api/gifts/{id}/rating - 对一次兑换提交评分
pub async fn add_rating(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(gift_id): Path<Uuid>,
    Json(request): Json<AddRatingRequest>,
) -> Result<Json<ApiResponse<Rating>>, ApiError> {
    request.validate()?;

    let rating = state
        .rating_service
        .add_rating(
            claims.sub,
            gift_id,
            request.redemption_id,
            request.stars,
            request.review,
        )
        .await?;

    info!(
        user_id = %claims.sub,
        gift_id = %gift_id,
        stars = rating.stars,
        "评分提交完成"
    );

    Ok(Json(ApiResponse::success_with_message(rating, "评价成功")))
}
