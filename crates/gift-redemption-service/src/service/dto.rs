//! 服务层 DTO 定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Redemption, RedemptionStatus};

/// 批量兑换的单个条目
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemItem {
    pub gift_id: Uuid,
    pub quantity: i32,
}

/// 单件兑换响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemGiftResponse {
    pub redemption: Redemption,
    pub points_spent: i32,
    pub message: String,
}

/// 批量兑换响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemMultipleResponse {
    pub redemptions: Vec<Redemption>,
    pub total_points_spent: i32,
    pub message: String,
}

/// 兑换历史中附带的评分摘要
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummaryDto {
    pub stars: i32,
    pub review: Option<String>,
}

/// 用户兑换历史条目
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionHistoryDto {
    pub id: Uuid,
    pub gift_id: Uuid,
    pub gift_name: String,
    pub gift_image_url: Option<String>,
    pub gift_points_required: i32,
    pub quantity: i32,
    pub points_spent: i32,
    pub status: RedemptionStatus,
    pub has_rating: bool,
    pub rating: Option<RatingSummaryDto>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redeem_gift_response_serialization() {
        let redemption = Redemption::new(Uuid::new_v4(), Uuid::new_v4(), 2, 200);
        let response = RedeemGiftResponse {
            redemption,
            points_spent: 200,
            message: "成功兑换 2 x 星巴克礼品卡".to_string(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["pointsSpent"], 200);
        assert_eq!(json["redemption"]["quantity"], 2);
        assert!(json["message"].as_str().unwrap().contains("星巴克礼品卡"));
    }

    #[test]
    fn test_redemption_history_dto_serialization() {
        let dto = RedemptionHistoryDto {
            id: Uuid::new_v4(),
            gift_id: Uuid::new_v4(),
            gift_name: "保温杯".to_string(),
            gift_image_url: None,
            gift_points_required: 50,
            quantity: 1,
            points_spent: 50,
            status: RedemptionStatus::Completed,
            has_rating: true,
            rating: Some(RatingSummaryDto {
                stars: 4,
                review: None,
            }),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["giftName"], "保温杯");
        assert_eq!(json["status"], "completed");
        assert_eq!(json["hasRating"], true);
        assert_eq!(json["rating"]["stars"], 4);
    }
}
