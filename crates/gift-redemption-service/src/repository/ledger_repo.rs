//! 积分账本仓储
//!
//! 账本是每用户一条只追加的带符号流水序列，当前余额派生自最新一行，
//! 不单独缓存计数器。余额非负在写入时保证（debit 校验），读取不兜底。

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

use super::traits::PointLedgerRepositoryTrait;
use crate::error::{GiftError, Result};
use crate::models::{PointTransaction, TransactionType};

/// 积分账本仓储
pub struct PointLedgerRepository {
    pool: PgPool,
}

impl PointLedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 获取用户当前积分余额
    ///
    /// 取最新一条流水的 balance_after，无流水返回 0。
    /// 排序按序列号 id DESC：created_at 是事务开始时间，与行锁获取
    /// 顺序不一致；序列号在插入时分配，即插入顺序。
    pub async fn get_balance(&self, user_id: Uuid) -> Result<i32> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(
                (SELECT balance_after
                 FROM point_balance
                 WHERE user_id = $1
                 ORDER BY id DESC
                 LIMIT 1),
                0
            ) as balance
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("balance"))
    }

    /// 在事务中获取用户当前积分余额
    pub async fn get_balance_in_tx(conn: &mut PgConnection, user_id: Uuid) -> Result<i32> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(
                (SELECT balance_after
                 FROM point_balance
                 WHERE user_id = $1
                 ORDER BY id DESC
                 LIMIT 1),
                0
            ) as balance
            "#,
        )
        .bind(user_id)
        .fetch_one(conn)
        .await?;

        Ok(row.get("balance"))
    }

    /// 锁定用户行（FOR UPDATE）
    ///
    /// 同一用户的账本写入靠这把行锁串行化：余额读取与后续插入
    /// 在锁内完成，不同用户互不阻塞。
    pub async fn lock_user_for_update(conn: &mut PgConnection, user_id: Uuid) -> Result<()> {
        let row = sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(conn)
            .await?;

        if row.is_none() {
            return Err(GiftError::UserNotFound(user_id));
        }

        Ok(())
    }

    /// 在事务中追加入账流水
    ///
    /// 调用方必须已持有该用户的行锁。入账无条件成功。
    pub async fn credit_in_tx(
        conn: &mut PgConnection,
        user_id: Uuid,
        amount: i32,
        description: &str,
        reference_id: Option<Uuid>,
    ) -> Result<PointTransaction> {
        let balance = Self::get_balance_in_tx(&mut *conn, user_id).await?;

        Self::insert_in_tx(
            conn,
            user_id,
            TransactionType::Credit,
            amount,
            balance + amount,
            description,
            reference_id,
        )
        .await
    }

    /// 在事务中追加出账流水
    ///
    /// 调用方必须已持有该用户的行锁。余额不足返回 InsufficientPoints，
    /// amount 以负数落库。
    pub async fn debit_in_tx(
        conn: &mut PgConnection,
        user_id: Uuid,
        amount: i32,
        description: &str,
        reference_id: Option<Uuid>,
    ) -> Result<PointTransaction> {
        let balance = Self::get_balance_in_tx(&mut *conn, user_id).await?;

        if balance < amount {
            return Err(GiftError::InsufficientPoints {
                required: amount,
                available: balance,
            });
        }

        Self::insert_in_tx(
            conn,
            user_id,
            TransactionType::Debit,
            -amount,
            balance - amount,
            description,
            reference_id,
        )
        .await
    }

    async fn insert_in_tx(
        conn: &mut PgConnection,
        user_id: Uuid,
        transaction_type: TransactionType,
        amount: i32,
        balance_after: i32,
        description: &str,
        reference_id: Option<Uuid>,
    ) -> Result<PointTransaction> {
        let tx = sqlx::query_as::<_, PointTransaction>(
            r#"
            INSERT INTO point_balance
                (user_id, transaction_type, amount, balance_after, description, reference_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, transaction_type, amount, balance_after,
                      description, reference_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(transaction_type)
        .bind(amount)
        .bind(balance_after)
        .bind(description)
        .bind(reference_id)
        .fetch_one(conn)
        .await?;

        Ok(tx)
    }

    /// 查询用户积分流水，最新在前
    pub async fn list_by_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<PointTransaction>> {
        let transactions = sqlx::query_as::<_, PointTransaction>(
            r#"
            SELECT id, user_id, transaction_type, amount, balance_after,
                   description, reference_id, created_at
            FROM point_balance
            WHERE user_id = $1
            ORDER BY id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }
}

#[async_trait]
impl PointLedgerRepositoryTrait for PointLedgerRepository {
    async fn get_balance(&self, user_id: Uuid) -> Result<i32> {
        self.get_balance(user_id).await
    }

    async fn list_by_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<PointTransaction>> {
        self.list_by_user(user_id, limit).await
    }
}
