//! 积分账本服务
//!
//! 余额查询、入账、出账与注册奖励。每次写入都在持有用户行锁的
//! 事务内完成，同一用户的账本操作串行，不同用户互不阻塞。

use std::sync::Arc;

use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{GiftError, Result};
use crate::models::PointTransaction;
use crate::repository::PointLedgerRepository;

/// 新用户注册奖励积分
pub const WELCOME_BONUS_POINTS: i32 = 1000;

/// 积分账本服务
pub struct PointsService {
    ledger_repo: Arc<PointLedgerRepository>,
    pool: PgPool,
}

impl PointsService {
    pub fn new(ledger_repo: Arc<PointLedgerRepository>, pool: PgPool) -> Self {
        Self { ledger_repo, pool }
    }

    /// 查询用户当前积分余额
    ///
    /// 余额始终派生自账本最新一行，无流水返回 0
    pub async fn get_balance(&self, user_id: Uuid) -> Result<i32> {
        self.ledger_repo.get_balance(user_id).await
    }

    /// 查询用户积分流水，最新在前
    pub async fn get_history(&self, user_id: Uuid, limit: i64) -> Result<Vec<PointTransaction>> {
        self.ledger_repo.list_by_user(user_id, limit).await
    }

    /// 入账
    ///
    /// 入账无条件成功（余额只增不减）
    #[instrument(skip(self, description), fields(user_id = %user_id, amount = amount))]
    pub async fn credit(
        &self,
        user_id: Uuid,
        amount: i32,
        description: &str,
        reference_id: Option<Uuid>,
    ) -> Result<PointTransaction> {
        if amount <= 0 {
            return Err(GiftError::Validation(format!(
                "入账金额必须为正数: {}",
                amount
            )));
        }

        let mut tx = self.pool.begin().await?;
        PointLedgerRepository::lock_user_for_update(&mut tx, user_id).await?;
        let entry =
            PointLedgerRepository::credit_in_tx(&mut tx, user_id, amount, description, reference_id)
                .await?;
        tx.commit().await?;

        info!(
            user_id = %user_id,
            amount = amount,
            balance_after = entry.balance_after,
            "积分入账完成"
        );

        Ok(entry)
    }

    /// 出账
    ///
    /// 余额不足时失败，账本保持不变
    #[instrument(skip(self, description), fields(user_id = %user_id, amount = amount))]
    pub async fn debit(
        &self,
        user_id: Uuid,
        amount: i32,
        description: &str,
        reference_id: Option<Uuid>,
    ) -> Result<PointTransaction> {
        if amount <= 0 {
            return Err(GiftError::Validation(format!(
                "出账金额必须为正数: {}",
                amount
            )));
        }

        let mut tx = self.pool.begin().await?;
        PointLedgerRepository::lock_user_for_update(&mut tx, user_id).await?;
        let entry =
            PointLedgerRepository::debit_in_tx(&mut tx, user_id, amount, description, reference_id)
                .await?;
        tx.commit().await?;

        info!(
            user_id = %user_id,
            amount = amount,
            balance_after = entry.balance_after,
            "积分出账完成"
        );

        Ok(entry)
    }

    /// 发放新用户注册奖励
    ///
    /// 由身份协作方在用户持久化创建后调用
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn grant_signup_bonus(&self, user_id: Uuid) -> Result<PointTransaction> {
        self.credit(user_id, WELCOME_BONUS_POINTS, "新用户注册奖励", None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_bonus_amount() {
        assert_eq!(WELCOME_BONUS_POINTS, 1000);
    }
}
