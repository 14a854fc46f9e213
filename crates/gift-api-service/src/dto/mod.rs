//! DTO 模块

pub mod request;
pub mod response;

pub use request::{
    AddRatingRequest, HistoryQuery, RedeemGiftRequest, RedeemItemRequest, RedeemMultipleRequest,
};
pub use response::{ApiResponse, BalanceDto, PointTransactionDto};
