//! API 处理器模块

pub mod points;
pub mod rating;
pub mod redemption;
