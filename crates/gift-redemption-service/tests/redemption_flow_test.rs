//! 兑换流程集成测试
//!
//! 使用真实 PostgreSQL 测试兑换编排的完整业务流程。
//! RedemptionService 的事务流程（记录 + 出账 + 扣库存）无法通过
//! 纯 mock 覆盖，因此需要集成测试。
//!
//! ## 运行方式
//!
//! ```bash
//! DATABASE_URL=postgres://... \
//!   cargo test --test redemption_flow_test -- --ignored
//! ```

use std::sync::Arc;

use gift_redemption::error::GiftError;
use gift_redemption::repository::{
    GiftRepository, PointLedgerRepository, RatingRepository, RedemptionRepository,
};
use gift_redemption::service::dto::RedeemItem;
use gift_redemption::service::{PointsService, RatingService, RedemptionService};
use sqlx::PgPool;
use uuid::Uuid;

// ==================== 辅助函数 ====================

fn database_url() -> String {
    std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests")
}

async fn connect() -> PgPool {
    let pool = PgPool::connect(&database_url())
        .await
        .expect("数据库连接失败");
    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .expect("迁移执行失败");
    pool
}

fn setup_redemption_service(pool: &PgPool) -> RedemptionService {
    RedemptionService::new(
        Arc::new(GiftRepository::new(pool.clone())),
        Arc::new(RedemptionRepository::new(pool.clone())),
        Arc::new(RatingRepository::new(pool.clone())),
        pool.clone(),
    )
}

fn setup_points_service(pool: &PgPool) -> PointsService {
    PointsService::new(Arc::new(PointLedgerRepository::new(pool.clone())), pool.clone())
}

fn setup_rating_service(pool: &PgPool) -> RatingService {
    RatingService::new(pool.clone())
}

/// 插入测试用户并发放初始积分，返回用户 ID
async fn seed_user_with_points(pool: &PgPool, tag: &str, initial_points: i32) -> Uuid {
    let user_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO users (email, name)
        VALUES ($1, $2)
        RETURNING id
        "#,
    )
    .bind(format!("integ_{}_{}@test.local", tag, Uuid::new_v4()))
    .bind(format!("集成测试用户 {}", tag))
    .fetch_one(pool)
    .await
    .expect("插入测试用户失败");

    if initial_points > 0 {
        setup_points_service(pool)
            .credit(user_id, initial_points, "集成测试初始积分", None)
            .await
            .expect("发放初始积分失败");
    }

    user_id
}

/// 插入测试礼品，返回礼品 ID
async fn seed_gift(pool: &PgPool, name: &str, points_required: i32, stock: i32, active: bool) -> Uuid {
    sqlx::query_scalar(
        r#"
        INSERT INTO gifts (name, points_required, stock, is_active)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(points_required)
    .bind(stock)
    .bind(active)
    .fetch_one(pool)
    .await
    .expect("插入测试礼品失败")
}

async fn get_stock(pool: &PgPool, gift_id: Uuid) -> i32 {
    sqlx::query_scalar("SELECT stock FROM gifts WHERE id = $1")
        .bind(gift_id)
        .fetch_one(pool)
        .await
        .expect("查询库存失败")
}

async fn ledger_row_count(pool: &PgPool, user_id: Uuid) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM point_balance WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("查询账本行数失败")
}

async fn redemption_count(pool: &PgPool, user_id: Uuid) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM redemptions WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("查询兑换记录数失败")
}

// ==================== 测试用例 ====================

/// 成功兑换：余额 250、库存 5、单价 100 x 2
/// 期望：余额 50、库存 3、一条兑换记录、一条出账流水
#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_redeem_success() {
    let pool = connect().await;
    let user_id = seed_user_with_points(&pool, "redeem_ok", 250).await;
    let gift_id = seed_gift(&pool, "保温杯", 100, 5, true).await;

    let svc = setup_redemption_service(&pool);
    let resp = svc.redeem(user_id, gift_id, 2).await.expect("兑换应成功");

    assert_eq!(resp.points_spent, 200);
    assert_eq!(resp.redemption.quantity, 2);
    assert_ne!(resp.redemption.id, Uuid::nil());

    let balance = setup_points_service(&pool).get_balance(user_id).await.unwrap();
    assert_eq!(balance, 50, "250 - 200 = 50");
    assert_eq!(get_stock(&pool, gift_id).await, 3, "5 - 2 = 3");

    // 初始入账 + 兑换出账
    assert_eq!(ledger_row_count(&pool, user_id).await, 2);

    // 出账流水携带负数金额并引用兑换记录
    let (amount, reference_id): (i32, Option<Uuid>) = sqlx::query_as(
        "SELECT amount, reference_id FROM point_balance WHERE user_id = $1 AND transaction_type = 'debit'",
    )
    .bind(user_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(amount, -200);
    assert_eq!(reference_id, Some(resp.redemption.id));
}

/// 余额不足：余额 50 兑换 100 分礼品，期望报错且余额、库存、记录全部不变
#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_redeem_insufficient_points_leaves_no_trace() {
    let pool = connect().await;
    let user_id = seed_user_with_points(&pool, "redeem_poor", 50).await;
    let gift_id = seed_gift(&pool, "积分不足测试礼品", 100, 5, true).await;

    let svc = setup_redemption_service(&pool);
    let err = svc.redeem(user_id, gift_id, 1).await.unwrap_err();

    match err {
        GiftError::InsufficientPoints { required, available } => {
            assert_eq!(required, 100);
            assert_eq!(available, 50);
        }
        other => panic!("期望 InsufficientPoints，实际: {:?}", other),
    }

    assert_eq!(setup_points_service(&pool).get_balance(user_id).await.unwrap(), 50);
    assert_eq!(get_stock(&pool, gift_id).await, 5);
    assert_eq!(redemption_count(&pool, user_id).await, 0);
    assert_eq!(ledger_row_count(&pool, user_id).await, 1, "仅初始入账");
}

/// 库存不足 / 下架 / 不存在的分类错误
#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_redeem_gift_validation_errors() {
    let pool = connect().await;
    let user_id = seed_user_with_points(&pool, "redeem_invalid", 10000).await;
    let svc = setup_redemption_service(&pool);

    let missing = Uuid::new_v4();
    assert!(matches!(
        svc.redeem(user_id, missing, 1).await.unwrap_err(),
        GiftError::GiftNotFound(id) if id == missing
    ));

    let inactive = seed_gift(&pool, "已下架礼品", 100, 5, false).await;
    assert!(matches!(
        svc.redeem(user_id, inactive, 1).await.unwrap_err(),
        GiftError::GiftInactive(id) if id == inactive
    ));

    let low_stock = seed_gift(&pool, "低库存礼品", 100, 2, true).await;
    match svc.redeem(user_id, low_stock, 3).await.unwrap_err() {
        GiftError::InsufficientStock { requested, available, .. } => {
            assert_eq!(requested, 3);
            assert_eq!(available, 2);
        }
        other => panic!("期望 InsufficientStock，实际: {:?}", other),
    }
}

/// 批量兑换成功：合计出账一条流水，每件商品各一条兑换记录
#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_redeem_multiple_success() {
    let pool = connect().await;
    let user_id = seed_user_with_points(&pool, "batch_ok", 1000).await;
    let gift_a = seed_gift(&pool, "批量礼品 A", 100, 10, true).await;
    let gift_b = seed_gift(&pool, "批量礼品 B", 200, 10, true).await;

    let svc = setup_redemption_service(&pool);
    let items = vec![
        RedeemItem { gift_id: gift_a, quantity: 2 },
        RedeemItem { gift_id: gift_b, quantity: 1 },
    ];
    let resp = svc.redeem_multiple(user_id, &items).await.expect("批量兑换应成功");

    assert_eq!(resp.total_points_spent, 400);
    assert_eq!(resp.redemptions.len(), 2);

    assert_eq!(setup_points_service(&pool).get_balance(user_id).await.unwrap(), 600);
    assert_eq!(get_stock(&pool, gift_a).await, 8);
    assert_eq!(get_stock(&pool, gift_b).await, 9);

    // 初始入账 + 合计出账一条
    assert_eq!(ledger_row_count(&pool, user_id).await, 2);
    assert_eq!(redemption_count(&pool, user_id).await, 2);
}

/// 批量兑换全有或全无：第二件库存不足时第一件也不生效
#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_redeem_multiple_all_or_nothing() {
    let pool = connect().await;
    let user_id = seed_user_with_points(&pool, "batch_fail", 1000).await;
    let gift_a = seed_gift(&pool, "全无礼品 A", 100, 10, true).await;
    let gift_b = seed_gift(&pool, "全无礼品 B", 100, 1, true).await;

    let svc = setup_redemption_service(&pool);
    let items = vec![
        RedeemItem { gift_id: gift_a, quantity: 1 },
        RedeemItem { gift_id: gift_b, quantity: 5 },
    ];
    let err = svc.redeem_multiple(user_id, &items).await.unwrap_err();
    assert!(matches!(err, GiftError::InsufficientStock { .. }));

    assert_eq!(setup_points_service(&pool).get_balance(user_id).await.unwrap(), 1000);
    assert_eq!(get_stock(&pool, gift_a).await, 10, "A 不得被部分扣减");
    assert_eq!(get_stock(&pool, gift_b).await, 1);
    assert_eq!(redemption_count(&pool, user_id).await, 0);
}

/// 并发抢购：库存 1，两个任务同时兑换，恰好一个成功
#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_concurrent_redeem_last_item() {
    let pool = connect().await;
    let user_a = seed_user_with_points(&pool, "race_a", 500).await;
    let user_b = seed_user_with_points(&pool, "race_b", 500).await;
    let gift_id = seed_gift(&pool, "最后一件礼品", 100, 1, true).await;

    let svc_a = setup_redemption_service(&pool);
    let svc_b = setup_redemption_service(&pool);

    let (ra, rb) = tokio::join!(
        svc_a.redeem(user_a, gift_id, 1),
        svc_b.redeem(user_b, gift_id, 1),
    );

    let successes = [ra.is_ok(), rb.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1, "恰好一个请求成功: a={:?} b={:?}", ra, rb);
    assert_eq!(get_stock(&pool, gift_id).await, 0);

    // 失败方不留任何痕迹：余额未扣、无兑换记录
    let (winner, loser) = if ra.is_ok() { (user_a, user_b) } else { (user_b, user_a) };
    let points = setup_points_service(&pool);
    assert_eq!(points.get_balance(winner).await.unwrap(), 400);
    assert_eq!(points.get_balance(loser).await.unwrap(), 500);
    assert_eq!(redemption_count(&pool, loser).await, 0);
}

/// 评分全流程：兑换后评分成功，重复评分报 AlreadyRated，聚合回写正确
#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_rating_flow() {
    let pool = connect().await;
    let user_id = seed_user_with_points(&pool, "rating", 500).await;
    let gift_id = seed_gift(&pool, "评分测试礼品", 100, 10, true).await;

    let redeem_svc = setup_redemption_service(&pool);
    let rating_svc = setup_rating_service(&pool);

    let resp = redeem_svc.redeem(user_id, gift_id, 1).await.unwrap();
    let redemption_id = resp.redemption.id;

    // 未兑换对应礼品的记录不可评分
    let err = rating_svc
        .add_rating(user_id, gift_id, Uuid::new_v4(), 5, None)
        .await
        .unwrap_err();
    assert!(matches!(err, GiftError::NotEligible { .. }));

    let rating = rating_svc
        .add_rating(user_id, gift_id, redemption_id, 4, Some("不错".to_string()))
        .await
        .expect("评分应成功");
    assert_eq!(rating.stars, 4);

    // 重复评分
    let err = rating_svc
        .add_rating(user_id, gift_id, redemption_id, 5, None)
        .await
        .unwrap_err();
    assert!(matches!(err, GiftError::AlreadyRated(id) if id == redemption_id));

    // 聚合回写
    let (avg, total): (f64, i32) =
        sqlx::query_as("SELECT avg_rating, total_reviews FROM gifts WHERE id = $1")
            .bind(gift_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(avg, 4.0);
    assert_eq!(total, 1);

    // 兑换历史携带评分
    let history = redeem_svc.list_user_redemptions(user_id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].has_rating);
    assert_eq!(history[0].rating.as_ref().unwrap().stars, 4);
}

/// 余额取最后插入的一行，即使其 created_at 早于先前的行
///
/// created_at 是事务开始时间：晚开始但先拿到行锁的事务会先落库，
/// 余额判据必须跟随插入顺序（序列号）而不是时间戳。
#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_balance_follows_insertion_order_not_timestamp() {
    let pool = connect().await;
    let user_id = seed_user_with_points(&pool, "tiebreak", 0).await;

    // 模拟先开始、后提交的事务：后插入的行带更早的时间戳
    sqlx::query(
        r#"
        INSERT INTO point_balance (user_id, transaction_type, amount, balance_after, created_at)
        VALUES ($1, 'credit', 100, 100, NOW())
        "#,
    )
    .bind(user_id)
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query(
        r#"
        INSERT INTO point_balance (user_id, transaction_type, amount, balance_after, created_at)
        VALUES ($1, 'credit', 150, 250, NOW() - INTERVAL '5 seconds')
        "#,
    )
    .bind(user_id)
    .execute(&pool)
    .await
    .unwrap();

    let points = setup_points_service(&pool);
    assert_eq!(points.get_balance(user_id).await.unwrap(), 250);

    // 流水排序同样跟随插入顺序
    let history = points.get_history(user_id, 10).await.unwrap();
    assert_eq!(history[0].balance_after, 250);
    assert_eq!(history[1].balance_after, 100);
}

/// 账本流水顺序与余额推进：多次出入账后余额等于最新 balance_after
#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_ledger_balance_progression() {
    let pool = connect().await;
    let user_id = seed_user_with_points(&pool, "ledger", 0).await;
    let points = setup_points_service(&pool);

    points.grant_signup_bonus(user_id).await.unwrap();
    assert_eq!(points.get_balance(user_id).await.unwrap(), 1000);

    points.credit(user_id, 500, "活动奖励", None).await.unwrap();
    points.debit(user_id, 300, "测试出账", None).await.unwrap();
    assert_eq!(points.get_balance(user_id).await.unwrap(), 1200);

    let history = points.get_history(user_id, 10).await.unwrap();
    assert_eq!(history.len(), 3);
    // 最新在前
    assert_eq!(history[0].amount, -300);
    assert_eq!(history[0].balance_after, 1200);
    assert_eq!(history[2].balance_after, 1000);
}
