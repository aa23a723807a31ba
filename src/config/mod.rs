/// 统一配置系统
///
/// 提供TOML/JSON配置文件和环境变量覆盖。配置在构造时读取一次，不支持热重载。
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub mod particles;
pub mod weather;

pub use particles::ParticleSystemConfig;
pub use weather::{DebrisConfig, RainConfig, SandConfig};

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 文件读取错误
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    /// 解析错误
    #[error("Config parse error: {0}")]
    ParseError(String),
    /// 验证错误
    #[error("Config validation error: {0}")]
    ValidationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// 检查取值范围 `min <= max`
pub(crate) fn validate_range(name: &str, min: f32, max: f32) -> ConfigResult<()> {
    if !min.is_finite() || !max.is_finite() || min > max {
        return Err(ConfigError::ValidationError(format!(
            "{name}: invalid range {min}..{max}"
        )));
    }
    Ok(())
}

/// 检查严格为正的数值
pub(crate) fn validate_positive(name: &str, value: f32) -> ConfigResult<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ConfigError::ValidationError(format!(
            "{name} must be positive, got {value}"
        )));
    }
    Ok(())
}

/// 特效子系统主配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FxConfig {
    /// 通用粒子池
    pub particles: ParticleSystemConfig,

    /// 雨
    pub rain: RainConfig,

    /// 沙尘
    pub sand: SandConfig,

    /// 碎屑
    pub debris: DebrisConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            particles: ParticleSystemConfig::default(),
            rain: RainConfig::default(),
            sand: SandConfig::default(),
            debris: DebrisConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl FxConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 从TOML文件加载配置
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_toml_str(&content)
    }

    /// 从TOML字符串解析配置
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 从JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_json_str(&content)
    }

    /// 从JSON字符串解析配置
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 保存为TOML文件
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 从环境变量覆盖配置
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("FX_MAX_PARTICLES") {
            if let Ok(max) = val.parse() {
                self.particles.max_particles = max;
            }
        }
        if let Ok(val) = env::var("FX_IDLE_MARGIN") {
            if let Ok(margin) = val.parse() {
                self.particles.idle_margin = margin;
            }
        }

        // 天气密度
        if let Ok(val) = env::var("FX_RAIN_COUNT") {
            if let Ok(count) = val.parse() {
                self.rain.count = count;
            }
        }
        if let Ok(val) = env::var("FX_SAND_COUNT") {
            if let Ok(count) = val.parse() {
                self.sand.count = count;
            }
        }
        if let Ok(val) = env::var("FX_DEBRIS_COUNT") {
            if let Ok(count) = val.parse() {
                self.debris.count = count;
            }
        }
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        self.particles.validate()?;
        self.rain.validate()?;
        self.sand.validate()?;
        self.debris.validate()?;
        Ok(())
    }

    /// 自动查找并加载配置文件
    ///
    /// 按以下顺序查找：
    /// 1. ./fx.toml
    /// 2. ./fx.json
    /// 3. 使用默认配置
    pub fn load_or_default() -> Self {
        if let Ok(config) = Self::from_toml_file("fx.toml") {
            tracing::info!(target: "fx.config", "Loaded config from fx.toml");
            return config;
        }

        if let Ok(config) = Self::from_json_file("fx.json") {
            tracing::info!(target: "fx.config", "Loaded config from fx.json");
            return config;
        }

        tracing::info!(target: "fx.config", "Using default configuration");
        Self::default()
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: LogLevel,

    /// 是否输出到控制台
    pub log_to_console: bool,

    /// 是否输出 target（如 `fx.particles`）
    pub show_targets: bool,
}

use crate::impl_default;

impl_default!(LoggingConfig {
    level: LogLevel::Info,
    log_to_console: true,
    show_targets: true,
});

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    /// 跟踪
    Trace,
    /// 调试
    Debug,
    /// 信息
    Info,
    /// 警告
    Warn,
    /// 错误
    Error,
}
