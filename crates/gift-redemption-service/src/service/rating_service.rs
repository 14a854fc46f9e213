//! 评分聚合服务
//!
//! 评分写入与礼品聚合回写在同一事务内完成：
//! 资格检查 -> 重复检查 -> 写入评分 -> 重算并回写 avg_rating / total_reviews。

use chrono::Utc;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{GiftError, Result};
use crate::models::{Rating, RedemptionStatus};
use crate::repository::{GiftRepository, RatingRepository, RedemptionRepository};

/// 评分聚合服务
pub struct RatingService {
    pool: PgPool,
}

impl RatingService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 对一次已完成的兑换提交评分
    ///
    /// 资格要求：存在同时匹配 (redemption_id, user_id, gift_id) 且状态为
    /// completed 的兑换记录；每条兑换记录最多评分一次。
    #[instrument(skip(self, review), fields(user_id = %user_id, gift_id = %gift_id, stars = stars))]
    pub async fn add_rating(
        &self,
        user_id: Uuid,
        gift_id: Uuid,
        redemption_id: Uuid,
        stars: i32,
        review: Option<String>,
    ) -> Result<Rating> {
        if !(1..=5).contains(&stars) {
            return Err(GiftError::Validation(format!(
                "星级必须在 1 到 5 之间: {}",
                stars
            )));
        }

        let mut tx = self.pool.begin().await?;

        // 资格检查：兑换记录必须属于该用户且对应该礼品
        let redemption = RedemptionRepository::get_for_user_gift_in_tx(
            &mut tx,
            redemption_id,
            user_id,
            gift_id,
        )
        .await?
        .ok_or(GiftError::NotEligible { redemption_id })?;

        if redemption.status != RedemptionStatus::Completed {
            return Err(GiftError::NotEligible { redemption_id });
        }

        if RatingRepository::exists_for_redemption_in_tx(&mut tx, redemption_id).await? {
            return Err(GiftError::AlreadyRated(redemption_id));
        }

        let rating = Rating {
            id: Uuid::nil(),
            user_id,
            gift_id,
            redemption_id,
            stars,
            review,
            created_at: Utc::now(),
        };
        let created = RatingRepository::create_in_tx(&mut tx, &rating).await?;

        // 评分写入后立即重算聚合，回写保持与明细一致
        let (avg_rating, total_reviews) =
            RatingRepository::aggregate_for_gift_in_tx(&mut tx, gift_id).await?;
        GiftRepository::update_rating_stats_in_tx(&mut tx, gift_id, avg_rating, total_reviews)
            .await?;

        tx.commit().await?;

        info!(
            user_id = %user_id,
            gift_id = %gift_id,
            rating_id = %created.id,
            avg_rating = avg_rating,
            total_reviews = total_reviews,
            "评分已记录"
        );

        Ok(created)
    }
}
