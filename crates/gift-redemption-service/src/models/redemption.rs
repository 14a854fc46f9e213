//! 兑换记录实体定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 兑换状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum RedemptionStatus {
    /// 兑换在单个事务内完成，成功即为 completed
    #[default]
    Completed,
}

/// 兑换记录
///
/// 由兑换编排器创建，points_spent 固化兑换时刻的单价 * 数量，
/// 之后不随礼品价格变化重算。写入后不可变。
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Redemption {
    pub id: Uuid,
    pub user_id: Uuid,
    pub gift_id: Uuid,
    pub quantity: i32,
    pub points_spent: i32,
    pub status: RedemptionStatus,
    pub created_at: DateTime<Utc>,
}

impl Redemption {
    /// 构造待插入的兑换记录（id 由数据库生成后回填）
    pub fn new(user_id: Uuid, gift_id: Uuid, quantity: i32, points_spent: i32) -> Self {
        Self {
            id: Uuid::nil(),
            user_id,
            gift_id,
            quantity,
            points_spent,
            status: RedemptionStatus::Completed,
            created_at: Utc::now(),
        }
    }
}
