//! 数据模型定义

mod gift;
mod point_transaction;
mod rating;
mod redemption;

pub use gift::{star_rating, Gift};
pub use point_transaction::{PointTransaction, TransactionType};
pub use rating::Rating;
pub use redemption::{Redemption, RedemptionStatus};
