//! 统一错误处理模块
//!
//! 特效子系统的错误类型定义
//!
//! ## 错误分类
//!
//! - **前置条件违规**（索引越界、零容量缓冲区）：属于编程错误，使用断言快速失败，不在此处建模
//! - **容量耗尽**：不是错误，环形分配直接覆盖旧粒子
//! - **配置/设备错误**：构造阶段可恢复的错误，由 `FxError` 表达
//!
//! `emit()` / `update()` / `dispose()` 在正常输入下从不返回错误。

use crate::config::ConfigError;
use thiserror::Error;

/// 特效系统核心错误类型
#[derive(Error, Debug)]
pub enum FxError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Compute device error: {0}")]
    Device(#[from] DeviceError),
}

/// 计算设备错误
///
/// 仅在请求 wgpu 适配器/设备时出现；调度失败由渲染层处理，不在此重试。
#[derive(Error, Debug, Clone)]
pub enum DeviceError {
    #[error("Failed to request adapter: no compatible GPU found")]
    NoAdapter,

    #[error("Failed to request device: {0}")]
    DeviceRequest(String),

    #[error("Adapter does not support compute shaders: {0}")]
    Unsupported(String),
}

/// 特效结果类型别名
pub type FxResult<T> = Result<T, FxError>;
pub type DeviceResult<T> = Result<T, DeviceError>;
