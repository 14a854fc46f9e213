//! 礼品实体定义
//!
//! 礼品 CRUD 由目录协作方负责，核心只读取兑换所需字段，
//! 并且是 stock / avg_rating / total_reviews 三个字段的唯一写入方。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 礼品
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Gift {
    pub id: Uuid,
    pub name: String,
    #[sqlx(default)]
    pub description: Option<String>,
    /// 兑换单件所需积分
    pub points_required: i32,
    /// 当前库存，不变量: stock >= 0
    pub stock: i32,
    #[sqlx(default)]
    pub image_url: Option<String>,
    /// 平均评分，保留两位小数
    pub avg_rating: f64,
    pub total_reviews: i32,
    /// 下架礼品不可兑换，与库存无关
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Gift {
    /// 检查是否可兑换（上架且有库存）
    pub fn is_redeemable(&self) -> bool {
        self.is_active && self.stock > 0
    }

    /// 是否有库存
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// 展示用星级（0.5 为步长），读取时计算，不落库
    pub fn star_rating(&self) -> f64 {
        star_rating(self.avg_rating)
    }
}

/// 将平均评分归整到最近的 0.5
///
/// 例: 4.3 -> 4.5, 3.2 -> 3.0, 3.6 -> 3.5
pub fn star_rating(avg: f64) -> f64 {
    (avg * 2.0).round() / 2.0
}
