//! 仓储层
//!
//! 所有共享状态都在数据库中；stock 与每个用户的账本尾部
//! 只通过本层的守卫方法写入，其他代码路径不得直接修改。

mod gift_repo;
mod ledger_repo;
mod rating_repo;
mod redemption_repo;
pub mod traits;

pub use gift_repo::GiftRepository;
pub use ledger_repo::PointLedgerRepository;
pub use rating_repo::RatingRepository;
pub use redemption_repo::{RedemptionRepository, RedemptionWithGiftRow};
pub use traits::{
    GiftRepositoryTrait, PointLedgerRepositoryTrait, RatingRepositoryTrait,
    RedemptionRepositoryTrait,
};
