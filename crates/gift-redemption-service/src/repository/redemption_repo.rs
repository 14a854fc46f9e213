//! 兑换记录仓储
//!
//! 兑换记录由编排器在事务内创建，写入后不可变。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::traits::RedemptionRepositoryTrait;
use crate::error::Result;
use crate::models::{Redemption, RedemptionStatus};

/// 用户兑换历史行（联礼品信息）
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionWithGiftRow {
    pub id: Uuid,
    pub gift_id: Uuid,
    pub gift_name: String,
    #[sqlx(default)]
    pub gift_image_url: Option<String>,
    pub gift_points_required: i32,
    pub quantity: i32,
    pub points_spent: i32,
    pub status: RedemptionStatus,
    pub created_at: DateTime<Utc>,
}

/// 兑换记录仓储
pub struct RedemptionRepository {
    pool: PgPool,
}

impl RedemptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 在事务中创建兑换记录，返回数据库生成的 ID
    pub async fn create_in_tx(conn: &mut PgConnection, redemption: &Redemption) -> Result<Uuid> {
        let row: (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO redemptions (user_id, gift_id, quantity, points_spent, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(redemption.user_id)
        .bind(redemption.gift_id)
        .bind(redemption.quantity)
        .bind(redemption.points_spent)
        .bind(redemption.status)
        .fetch_one(conn)
        .await?;

        Ok(row.0)
    }

    /// 根据 ID 获取兑换记录
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Redemption>> {
        let redemption = sqlx::query_as::<_, Redemption>(
            r#"
            SELECT id, user_id, gift_id, quantity, points_spent, status, created_at
            FROM redemptions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(redemption)
    }

    /// 在事务中查询匹配 (id, user, gift) 的兑换记录
    ///
    /// 评分资格检查使用：三个条件同时命中才允许评分
    pub async fn get_for_user_gift_in_tx(
        conn: &mut PgConnection,
        redemption_id: Uuid,
        user_id: Uuid,
        gift_id: Uuid,
    ) -> Result<Option<Redemption>> {
        let redemption = sqlx::query_as::<_, Redemption>(
            r#"
            SELECT id, user_id, gift_id, quantity, points_spent, status, created_at
            FROM redemptions
            WHERE id = $1 AND user_id = $2 AND gift_id = $3
            "#,
        )
        .bind(redemption_id)
        .bind(user_id)
        .bind(gift_id)
        .fetch_optional(conn)
        .await?;

        Ok(redemption)
    }

    /// 查询用户兑换历史（联礼品名称/图片），最新在前
    pub async fn list_by_user_with_gift(&self, user_id: Uuid) -> Result<Vec<RedemptionWithGiftRow>> {
        let rows = sqlx::query_as::<_, RedemptionWithGiftRow>(
            r#"
            SELECT r.id, r.gift_id, g.name AS gift_name, g.image_url AS gift_image_url,
                   g.points_required AS gift_points_required,
                   r.quantity, r.points_spent, r.status, r.created_at
            FROM redemptions r
            JOIN gifts g ON g.id = r.gift_id
            WHERE r.user_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[async_trait]
impl RedemptionRepositoryTrait for RedemptionRepository {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Redemption>> {
        self.get_by_id(id).await
    }

    async fn list_by_user_with_gift(&self, user_id: Uuid) -> Result<Vec<RedemptionWithGiftRow>> {
        self.list_by_user_with_gift(user_id).await
    }
}
