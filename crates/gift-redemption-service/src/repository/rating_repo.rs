//! 评分仓储

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

use super::traits::RatingRepositoryTrait;
use crate::error::Result;
use crate::models::Rating;

/// 评分仓储
pub struct RatingRepository {
    pool: PgPool,
}

impl RatingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 在事务中检查兑换是否已评分
    pub async fn exists_for_redemption_in_tx(
        conn: &mut PgConnection,
        redemption_id: Uuid,
    ) -> Result<bool> {
        let row = sqlx::query("SELECT 1 AS one FROM ratings WHERE redemption_id = $1")
            .bind(redemption_id)
            .fetch_optional(conn)
            .await?;

        Ok(row.is_some())
    }

    /// 在事务中创建评分
    pub async fn create_in_tx(conn: &mut PgConnection, rating: &Rating) -> Result<Rating> {
        let created = sqlx::query_as::<_, Rating>(
            r#"
            INSERT INTO ratings (user_id, gift_id, redemption_id, stars, review)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, gift_id, redemption_id, stars, review, created_at
            "#,
        )
        .bind(rating.user_id)
        .bind(rating.gift_id)
        .bind(rating.redemption_id)
        .bind(rating.stars)
        .bind(&rating.review)
        .fetch_one(conn)
        .await?;

        Ok(created)
    }

    /// 在事务中重算礼品的评分聚合
    ///
    /// 返回 (平均星级保留两位小数, 评价总数)
    pub async fn aggregate_for_gift_in_tx(
        conn: &mut PgConnection,
        gift_id: Uuid,
    ) -> Result<(f64, i32)> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(ROUND(AVG(stars)::numeric, 2)::float8, 0) AS avg_rating,
                   COUNT(*)::int4 AS total_reviews
            FROM ratings
            WHERE gift_id = $1
            "#,
        )
        .bind(gift_id)
        .fetch_one(conn)
        .await?;

        Ok((row.get("avg_rating"), row.get("total_reviews")))
    }

    /// 查询用户的所有评分
    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Rating>> {
        let ratings = sqlx::query_as::<_, Rating>(
            r#"
            SELECT id, user_id, gift_id, redemption_id, stars, review, created_at
            FROM ratings
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ratings)
    }
}

#[async_trait]
impl RatingRepositoryTrait for RatingRepository {
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Rating>> {
        self.list_by_user(user_id).await
    }
}
