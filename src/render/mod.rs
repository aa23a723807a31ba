//! 特效渲染数据层
//!
//! - `attribute` - 主机端属性缓冲区与脏区跟踪
//! - `compute` - 计算后端（主机 rayon / wgpu）
//! - `particles` - 通用粒子池
//! - `weather` - 雨、沙尘、碎屑粒子场
//! - `director` - 场景驱动

pub mod attribute;
pub mod compute;
pub mod director;
pub mod particles;
pub mod weather;

pub use attribute::AttributeBuffer;
pub use compute::{ComputeBackend, GpuContext};
pub use director::EffectsDirector;
pub use particles::{EffectKind, EmitterParams, ParticleSystem};
pub use weather::{DebrisField, RainField, SandField, WeatherField, WeatherKind};
