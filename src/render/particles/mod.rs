//! 通用粒子系统模块
//!
//! 火花、血液、烟雾、碎屑、枪口火焰、爆炸共用一个固定容量的粒子池。
//!
//! ## 架构设计
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  Generic Particle System                 │
//! ├─────────────────────────────────────────────────────────┤
//! │  1. Emission (host)                                      │
//! │     - 环形游标分配连续槽位，直接覆盖                       │
//! │     - 采样位置、速度、颜色、大小、寿命并标记脏区           │
//! │     - 延长活跃窗口                                        │
//! │                                                          │
//! │  2. Simulation (compute kernel, one dispatch per frame)  │
//! │     - 重力、阻力、地面反弹                                │
//! │     - alpha = 1 - ratio²                                 │
//! │     - 活跃窗口结束后跳过调度                              │
//! │                                                          │
//! │  3. Rendering（渲染层，不在本模块内）                     │
//! │     - 直接绑定设备端存储缓冲区                            │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 使用示例
//!
//! ```
//! use game_engine_fx::config::ParticleSystemConfig;
//! use game_engine_fx::render::compute::ComputeBackend;
//! use game_engine_fx::render::particles::{EffectKind, ParticleSystem};
//! use glam::Vec3;
//!
//! let mut particles =
//!     ParticleSystem::new(ParticleSystemConfig::with_capacity(1000), &ComputeBackend::Host).unwrap();
//! particles.emit_effect(EffectKind::Spark, Vec3::ZERO, Vec3::Y, 15);
//! particles.update(1.0 / 60.0);
//! assert_eq!(particles.alive_count(), 15);
//! ```

pub mod emitter;
pub mod kernel;
pub mod presets;
pub mod ring;
pub mod scheduler;
pub mod system;

pub use emitter::{EffectKind, EmitterParams, FloatRange, SpawnedParticle};
pub use kernel::SimParams;
pub use ring::RingCursor;
pub use scheduler::{DispatchDecision, IdleScheduler};
pub use system::{ParticleAttribute, ParticleBuffers, ParticleSystem, ParticleSystemStats};
