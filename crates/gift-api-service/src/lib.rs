//! C端礼品兑换 REST API
//!
//! 对外暴露兑换、评分与积分查询接口，业务语义由
//! gift-redemption-service 核心库实现。

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, Result};
