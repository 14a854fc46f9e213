//! 积分流水实体定义
//!
//! 账本只追加：流水一经写入不再更新或删除，余额由最新一行的
//! balance_after 派生，不单独维护计数器。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 流水类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum TransactionType {
    /// 入账（无条件成功）
    Credit,
    /// 出账（写入前校验余额）
    Debit,
}

/// 积分流水
///
/// amount 带符号存储：credit 为正，debit 为负；
/// balance_after 是写入时刻该用户所有流水的累计和。
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PointTransaction {
    /// 序列号，随插入单调递增，是"最新一行"的排序依据
    pub id: i64,
    pub user_id: Uuid,
    pub transaction_type: TransactionType,
    pub amount: i32,
    pub balance_after: i32,
    #[sqlx(default)]
    pub description: Option<String>,
    /// 关联的兑换记录 ID（兑换扣减时填写）
    #[sqlx(default)]
    pub reference_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
