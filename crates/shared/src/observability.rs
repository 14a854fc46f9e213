//! 可观测性模块
//!
//! 提供结构化日志的统一初始化。所有服务通过单一入口点配置日志，
//! 确保一致的字段命名与过滤规则。

use anyhow::Result;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::config::ObservabilityConfig;

/// 初始化 tracing 日志
///
/// 过滤级别优先取 RUST_LOG 环境变量，其次取配置文件中的 log_level。
/// log_format 为 "json" 时输出结构化日志，否则输出人类可读格式。
pub fn init(config: &ObservabilityConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = if config.log_format == "json" {
        fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .boxed()
    } else {
        fmt::layer().with_target(true).with_ansi(true).boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent_failure() {
        // 全局 subscriber 只能注册一次，第二次 init 返回 Err 而非 panic
        let config = ObservabilityConfig::default();
        let first = init(&config);
        let second = init(&config);
        assert!(first.is_ok() || second.is_err());
    }
}
