//! C端服务请求 DTO 定义

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

fn default_quantity() -> i32 {
    1
}

/// 单件兑换请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RedeemGiftRequest {
    /// 兑换数量，缺省为 1
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, message = "兑换数量必须大于 0"))]
    pub quantity: i32,
}

impl Default for RedeemGiftRequest {
    fn default() -> Self {
        Self {
            quantity: default_quantity(),
        }
    }
}

/// 批量兑换条目
///
/// length 校验失败时整个列表会进入 ValidationError 的参数，
/// 因此条目本身需要可序列化。
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RedeemItemRequest {
    pub gift_id: Uuid,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, message = "兑换数量必须大于 0"))]
    pub quantity: i32,
}

/// 批量兑换请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RedeemMultipleRequest {
    #[validate(length(min = 1, message = "兑换条目不能为空"))]
    #[validate(nested)]
    pub items: Vec<RedeemItemRequest>,
}

/// 评分请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddRatingRequest {
    /// 被评价的兑换记录
    pub redemption_id: Uuid,
    #[validate(range(min = 1, max = 5, message = "星级必须在 1 到 5 之间"))]
    pub stars: i32,
    #[validate(length(max = 2000, message = "评价内容过长"))]
    pub review: Option<String>,
}

/// 积分流水查询参数
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    /// 返回条数上限，缺省 50
    #[validate(range(min = 1, max = 200, message = "limit 必须在 1 到 200 之间"))]
    pub limit: Option<i64>,
}
