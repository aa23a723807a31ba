//! 核心模块
//!
//! 包含特效子系统的基础设施：
//! - `error` - 错误类型定义
//! - `logging` - tracing 日志初始化
//! - `context` - 显式注入的帧上下文

#[macro_use]
pub mod macros;
pub mod context;
pub mod error;
pub mod logging;

// 重新导出错误类型
pub use error::{DeviceError, DeviceResult, FxError, FxResult};

pub use context::{FxContext, SharedContext};
pub use logging::init_logging;
