//! 礼品仓储（库存守卫）
//!
//! stock 只能通过 reserve_stock_in_tx 的条件更新扣减，
//! 防止 check-then-act 竞争导致超卖。

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::traits::GiftRepositoryTrait;
use crate::error::{GiftError, Result};
use crate::models::Gift;

const GIFT_COLUMNS: &str = r#"id, name, description, points_required, stock, image_url,
                   avg_rating, total_reviews, is_active, created_at, updated_at"#;

/// 礼品仓储
pub struct GiftRepository {
    pool: PgPool,
}

impl GiftRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 获取礼品
    pub async fn get_gift(&self, id: Uuid) -> Result<Option<Gift>> {
        let gift = sqlx::query_as::<_, Gift>(&format!(
            "SELECT {GIFT_COLUMNS} FROM gifts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(gift)
    }

    /// 在事务中获取礼品
    pub async fn get_gift_in_tx(conn: &mut PgConnection, id: Uuid) -> Result<Option<Gift>> {
        let gift = sqlx::query_as::<_, Gift>(&format!(
            "SELECT {GIFT_COLUMNS} FROM gifts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(gift)
    }

    /// 预留库存（compare-and-set）
    ///
    /// 单条条件更新保证两个并发兑换不会同时成功扣走同一份库存：
    /// 条件不再满足时影响 0 行。0 行时回读礼品区分失败原因——
    /// 不存在 / 已下架 / 库存不足是业务错误；回读显示条件本应满足
    /// 则说明输掉了竞争，返回 StockRace，编排器据此回滚整个事务。
    pub async fn reserve_stock_in_tx(
        conn: &mut PgConnection,
        gift_id: Uuid,
        quantity: i32,
    ) -> Result<Gift> {
        let updated = sqlx::query_as::<_, Gift>(&format!(
            r#"
            UPDATE gifts
            SET stock = stock - $2, updated_at = NOW()
            WHERE id = $1 AND is_active = TRUE AND stock >= $2
            RETURNING {GIFT_COLUMNS}
            "#
        ))
        .bind(gift_id)
        .bind(quantity)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(gift) = updated {
            return Ok(gift);
        }

        match Self::get_gift_in_tx(conn, gift_id).await? {
            None => Err(GiftError::GiftNotFound(gift_id)),
            Some(gift) if !gift.is_active => Err(GiftError::GiftInactive(gift_id)),
            Some(gift) if gift.stock < quantity => Err(GiftError::InsufficientStock {
                gift_id,
                requested: quantity,
                available: gift.stock,
            }),
            Some(_) => Err(GiftError::StockRace(gift_id)),
        }
    }

    /// 在事务中回写评分聚合
    pub async fn update_rating_stats_in_tx(
        conn: &mut PgConnection,
        gift_id: Uuid,
        avg_rating: f64,
        total_reviews: i32,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE gifts
            SET avg_rating = $2, total_reviews = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(gift_id)
        .bind(avg_rating)
        .bind(total_reviews)
        .execute(conn)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl GiftRepositoryTrait for GiftRepository {
    async fn get_gift(&self, id: Uuid) -> Result<Option<Gift>> {
        self.get_gift(id).await
    }
}
