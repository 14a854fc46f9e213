//! 评分实体定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 礼品评分
///
/// 每条兑换记录最多一条评分（redemption_id 唯一约束 + 写入前存在性检查）。
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: Uuid,
    pub user_id: Uuid,
    pub gift_id: Uuid,
    pub redemption_id: Uuid,
    /// 1..=5 星
    pub stars: i32,
    #[sqlx(default)]
    pub review: Option<String>,
    pub created_at: DateTime<Utc>,
}
