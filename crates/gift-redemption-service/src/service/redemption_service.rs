//! 兑换编排服务
//!
//! 将积分账本与库存守卫组合为单个事务单元：
//! 校验 -> 创建兑换记录 -> 扣减积分 -> 扣减库存，要么整体完成，
//! 要么（包括输掉库存竞争时）整体回滚，不留部分痕迹。
//!
//! ## 单件兑换流程
//!
//! 1. 快路径校验（存在 / 上架 / 库存） -> 2. 开启事务并锁定用户行
//!    -> 3. 余额校验 -> 4. 创建兑换记录 -> 5. 账本出账
//!    -> 6. 条件扣减库存 -> 7. 提交

use std::sync::Arc;

use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{GiftError, Result};
use crate::models::{Gift, Redemption};
use crate::repository::{
    GiftRepository, GiftRepositoryTrait, PointLedgerRepository, RatingRepository,
    RedemptionRepository,
};
use crate::service::dto::{
    RatingSummaryDto, RedeemGiftResponse, RedeemItem, RedeemMultipleResponse, RedemptionHistoryDto,
};

/// 兑换编排服务
pub struct RedemptionService {
    gift_repo: Arc<GiftRepository>,
    redemption_repo: Arc<RedemptionRepository>,
    rating_repo: Arc<RatingRepository>,
    pool: PgPool,
}

impl RedemptionService {
    pub fn new(
        gift_repo: Arc<GiftRepository>,
        redemption_repo: Arc<RedemptionRepository>,
        rating_repo: Arc<RatingRepository>,
        pool: PgPool,
    ) -> Self {
        Self {
            gift_repo,
            redemption_repo,
            rating_repo,
            pool,
        }
    }

    /// 单件兑换
    #[instrument(skip(self), fields(user_id = %user_id, gift_id = %gift_id, quantity = quantity))]
    pub async fn redeem(
        &self,
        user_id: Uuid,
        gift_id: Uuid,
        quantity: i32,
    ) -> Result<RedeemGiftResponse> {
        // 1-2. 快路径校验，明显无法成功的请求不触碰账本
        let gift = load_redeemable_gift(self.gift_repo.as_ref(), gift_id, quantity).await?;

        // 3. 兑换时刻的总价，固化进兑换记录
        let total_points = checked_total(gift.points_required, quantity)?;

        let mut tx = self.pool.begin().await?;

        // 4. 锁定用户行，串行化该用户的账本写入
        PointLedgerRepository::lock_user_for_update(&mut tx, user_id).await?;

        let balance = PointLedgerRepository::get_balance_in_tx(&mut tx, user_id).await?;
        if balance < total_points {
            return Err(GiftError::InsufficientPoints {
                required: total_points,
                available: balance,
            });
        }

        // 5. 先创建兑换记录，让账本流水携带稳定的引用 ID
        let mut redemption = Redemption::new(user_id, gift_id, quantity, total_points);
        redemption.id = RedemptionRepository::create_in_tx(&mut tx, &redemption).await?;

        // 6. 账本出账，引用兑换记录
        PointLedgerRepository::debit_in_tx(
            &mut tx,
            user_id,
            total_points,
            &format!("兑换 {} x {}", quantity, gift.name),
            Some(redemption.id),
        )
        .await?;

        // 7. 条件扣减库存；输掉竞争时整个事务回滚，兑换记录与出账一并消失
        GiftRepository::reserve_stock_in_tx(&mut tx, gift_id, quantity).await?;

        tx.commit().await?;

        info!(
            user_id = %user_id,
            gift_id = %gift_id,
            redemption_id = %redemption.id,
            points_spent = total_points,
            "兑换成功"
        );

        let message = format!("成功兑换 {} x {}", quantity, gift.name);
        Ok(RedeemGiftResponse {
            redemption,
            points_spent: total_points,
            message,
        })
    }

    /// 批量兑换
    ///
    /// 两阶段：先校验所有条目（存在 / 上架 / 库存）并汇总所需积分，
    /// 再在同一事务内逐条提交（兑换记录 + 条件扣库存），最后对合计
    /// 金额做一次出账。任何一步失败整个批次回滚。
    #[instrument(skip(self, items), fields(user_id = %user_id, item_count = items.len()))]
    pub async fn redeem_multiple(
        &self,
        user_id: Uuid,
        items: &[RedeemItem],
    ) -> Result<RedeemMultipleResponse> {
        if items.is_empty() {
            return Err(GiftError::Validation("批量兑换条目不能为空".to_string()));
        }

        // 阶段一：全量校验
        let mut total_points: i32 = 0;
        let mut validated: Vec<(Gift, i32)> = Vec::with_capacity(items.len());

        for item in items {
            let gift =
                load_redeemable_gift(self.gift_repo.as_ref(), item.gift_id, item.quantity).await?;
            let line_points = checked_total(gift.points_required, item.quantity)?;
            total_points = total_points.checked_add(line_points).ok_or_else(|| {
                GiftError::Validation("批量兑换所需积分超出上限".to_string())
            })?;
            validated.push((gift, item.quantity));
        }

        let mut tx = self.pool.begin().await?;

        PointLedgerRepository::lock_user_for_update(&mut tx, user_id).await?;

        // 余额对整个批次的合计检查一次
        let balance = PointLedgerRepository::get_balance_in_tx(&mut tx, user_id).await?;
        if balance < total_points {
            return Err(GiftError::InsufficientPoints {
                required: total_points,
                available: balance,
            });
        }

        // 阶段二：逐条提交
        let mut redemptions = Vec::with_capacity(validated.len());
        for (gift, quantity) in &validated {
            let line_points = gift.points_required * quantity;
            let mut redemption = Redemption::new(user_id, gift.id, *quantity, line_points);
            redemption.id = RedemptionRepository::create_in_tx(&mut tx, &redemption).await?;

            GiftRepository::reserve_stock_in_tx(&mut tx, gift.id, *quantity).await?;

            redemptions.push(redemption);
        }

        // 合计金额一次出账；批次没有单一兑换 ID，reference 留空
        PointLedgerRepository::debit_in_tx(
            &mut tx,
            user_id,
            total_points,
            &format!("兑换 {} 件商品", items.len()),
            None,
        )
        .await?;

        tx.commit().await?;

        info!(
            user_id = %user_id,
            item_count = items.len(),
            total_points = total_points,
            "批量兑换成功"
        );

        let message = format!("成功兑换 {} 件商品", items.len());
        Ok(RedeemMultipleResponse {
            redemptions,
            total_points_spent: total_points,
            message,
        })
    }

    /// 查询用户兑换历史（含评分关联），最新在前
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_user_redemptions(&self, user_id: Uuid) -> Result<Vec<RedemptionHistoryDto>> {
        let rows = self.redemption_repo.list_by_user_with_gift(user_id).await?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ratings = self.rating_repo.list_by_user(user_id).await?;
        let rating_by_redemption: std::collections::HashMap<Uuid, &crate::models::Rating> =
            ratings.iter().map(|r| (r.redemption_id, r)).collect();

        let history = rows
            .into_iter()
            .map(|row| {
                let rating = rating_by_redemption.get(&row.id).map(|r| RatingSummaryDto {
                    stars: r.stars,
                    review: r.review.clone(),
                });
                RedemptionHistoryDto {
                    id: row.id,
                    gift_id: row.gift_id,
                    gift_name: row.gift_name,
                    gift_image_url: row.gift_image_url,
                    gift_points_required: row.gift_points_required,
                    quantity: row.quantity,
                    points_spent: row.points_spent,
                    status: row.status,
                    has_rating: rating.is_some(),
                    rating,
                    created_at: row.created_at,
                }
            })
            .collect();

        Ok(history)
    }
}

/// 快路径校验：礼品存在、上架且库存充足
///
/// 权威校验仍由事务内的条件更新完成，这里只为明显失败的请求
/// 省掉后续的账本读取。
async fn load_redeemable_gift(
    repo: &dyn GiftRepositoryTrait,
    gift_id: Uuid,
    quantity: i32,
) -> Result<Gift> {
    if quantity < 1 {
        return Err(GiftError::Validation(format!(
            "兑换数量必须大于 0: {}",
            quantity
        )));
    }

    let gift = repo
        .get_gift(gift_id)
        .await?
        .ok_or(GiftError::GiftNotFound(gift_id))?;

    if !gift.is_active {
        return Err(GiftError::GiftInactive(gift_id));
    }

    if gift.stock < quantity {
        return Err(GiftError::InsufficientStock {
            gift_id,
            requested: quantity,
            available: gift.stock,
        });
    }

    Ok(gift)
}

/// 计算总价，溢出视为参数错误
fn checked_total(points_required: i32, quantity: i32) -> Result<i32> {
    points_required
        .checked_mul(quantity)
        .ok_or_else(|| GiftError::Validation("兑换所需积分超出上限".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::traits::MockGiftRepositoryTrait;
    use chrono::Utc;

    fn sample_gift(gift_id: Uuid, stock: i32, is_active: bool) -> Gift {
        Gift {
            id: gift_id,
            name: "保温杯".to_string(),
            description: None,
            points_required: 100,
            stock,
            image_url: None,
            avg_rating: 0.0,
            total_reviews: 0,
            is_active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_load_redeemable_gift_not_found() {
        let gift_id = Uuid::new_v4();
        let mut repo = MockGiftRepositoryTrait::new();
        repo.expect_get_gift().returning(|_| Ok(None));

        let err = load_redeemable_gift(&repo, gift_id, 1).await.unwrap_err();
        assert!(matches!(err, GiftError::GiftNotFound(id) if id == gift_id));
    }

    #[tokio::test]
    async fn test_load_redeemable_gift_inactive() {
        let gift_id = Uuid::new_v4();
        let mut repo = MockGiftRepositoryTrait::new();
        repo.expect_get_gift()
            .returning(move |id| Ok(Some(sample_gift(id, 10, false))));

        let err = load_redeemable_gift(&repo, gift_id, 1).await.unwrap_err();
        assert!(matches!(err, GiftError::GiftInactive(id) if id == gift_id));
    }

    #[tokio::test]
    async fn test_load_redeemable_gift_insufficient_stock() {
        let gift_id = Uuid::new_v4();
        let mut repo = MockGiftRepositoryTrait::new();
        repo.expect_get_gift()
            .returning(move |id| Ok(Some(sample_gift(id, 3, true))));

        let err = load_redeemable_gift(&repo, gift_id, 10).await.unwrap_err();
        match err {
            GiftError::InsufficientStock {
                requested,
                available,
                ..
            } => {
                assert_eq!(requested, 10);
                assert_eq!(available, 3);
            }
            other => panic!("期望 InsufficientStock，实际: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_redeemable_gift_rejects_non_positive_quantity() {
        let repo = MockGiftRepositoryTrait::new();
        let err = load_redeemable_gift(&repo, Uuid::new_v4(), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, GiftError::Validation(_)));
    }

    #[tokio::test]
    async fn test_load_redeemable_gift_ok() {
        let gift_id = Uuid::new_v4();
        let mut repo = MockGiftRepositoryTrait::new();
        repo.expect_get_gift()
            .returning(move |id| Ok(Some(sample_gift(id, 5, true))));

        let gift = load_redeemable_gift(&repo, gift_id, 2).await.unwrap();
        assert_eq!(gift.stock, 5);
        assert_eq!(checked_total(gift.points_required, 2).unwrap(), 200);
    }

    #[test]
    fn test_checked_total_overflow() {
        assert!(checked_total(i32::MAX, 2).is_err());
        assert_eq!(checked_total(100, 3).unwrap(), 300);
    }
}
