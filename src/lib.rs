//! # Game Engine FX
//!
//! GPU-resident particle and weather-field simulation for game_engine.
//!
//! ## Features
//!
//! - **Generic particle pool**: fixed capacity, ring-buffer allocation, one shared physics kernel
//! - **Emission presets**: spark, smoke, blood, debris, muzzle and explosion bundles
//! - **Idle scheduling**: dispatches stop once the last emission can no longer be visible
//! - **Weather fields**: rain, sand and debris kept around the camera by respawn/wrap rules
//! - **Compute backends**: wgpu compute shaders, or rayon on the host for tests and tools
//!
//! ## Architecture Design
//!
//! Gameplay code only talks to the core through two calls:
//! - `emit(params)`: write particles into the pool (never fails, overwrites when full)
//! - `update(delta)`: at most one fire-and-forget dispatch per system per frame
//!
//! ### Example
//!
//! ```
//! use game_engine_fx::config::FxConfig;
//! use game_engine_fx::render::{ComputeBackend, EffectKind, EffectsDirector, WeatherKind};
//! use glam::Vec3;
//!
//! let mut config = FxConfig::default();
//! config.rain.count = 1000;
//!
//! let mut fx = EffectsDirector::new(&config, ComputeBackend::Host).unwrap();
//! fx.set_weather(WeatherKind::Rain);
//! fx.emit_effect(EffectKind::Blood, Vec3::new(0.0, 1.5, 0.0), Vec3::X, 20);
//! fx.update(1.0 / 60.0);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: errors, logging, shared frame context
//! - [`config`]: TOML/JSON configuration
//! - [`math`]: sampling and kernel hash helpers
//! - [`render`]: attribute buffers, compute backends, particle pool, weather fields
//! - [`systems`]: bevy_ecs integration

/// Errors, logging bootstrap, macros and the shared frame context
pub mod core;
/// Configuration loading and validation
pub mod config;
/// Random sampling and direction helpers
pub mod math;
/// Particle pool, weather fields and compute backends
pub mod render;
/// ECS resources and systems
pub mod systems;

pub use crate::config::FxConfig;
pub use crate::core::{FxContext, FxError, FxResult, SharedContext};
pub use crate::render::{
    ComputeBackend, EffectKind, EffectsDirector, EmitterParams, ParticleSystem, WeatherKind,
};

/// Property-based tests for allocation, fading, idle skipping and weather containment
mod property_tests;
