//! 日志初始化
//!
//! 配置tracing日志框架。`RUST_LOG` 环境变量优先于配置文件中的日志级别。

use crate::config::{LogLevel, LoggingConfig};
use tracing_subscriber::EnvFilter;

impl LogLevel {
    /// 转换为 `EnvFilter` 指令字符串
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// 构建日志过滤器
///
/// 优先读取 `RUST_LOG`，否则使用配置中的级别。
pub fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_directive()))
}

/// 初始化日志系统
///
/// 重复调用是安全的：已有全局订阅者时静默返回。
pub fn init_logging(config: &LoggingConfig) {
    if !config.log_to_console {
        return;
    }

    let result = tracing_subscriber::fmt()
        .with_env_filter(build_filter(config))
        .with_target(config.show_targets)
        .try_init();

    if result.is_ok() {
        tracing::info!(target: "fx", log_level = config.level.as_directive(), "Logging initialized");
    }
}
