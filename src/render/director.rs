//! 特效场景驱动
//!
//! 持有一个通用粒子池和三个天气场。玩法系统通过 `emit` 发射，场景每帧调用一次
//! `update`，每个存活系统最多发出一次调度。切换天气只切换可见性。

use crate::config::FxConfig;
use crate::core::context::{FxContext, SharedContext};
use crate::core::error::FxResult;
use crate::render::compute::ComputeBackend;
use crate::render::particles::{EffectKind, EmitterParams, ParticleSystem};
use crate::render::weather::{DebrisField, RainField, SandField, WeatherField, WeatherKind};
use bevy_ecs::prelude::*;
use glam::Vec3;

/// 特效场景驱动
#[derive(Resource)]
pub struct EffectsDirector {
    context: SharedContext,
    backend: ComputeBackend,
    particles: ParticleSystem,
    rain: RainField,
    sand: SandField,
    debris: DebrisField,
    weather: WeatherKind,
    disposed: bool,
}

impl EffectsDirector {
    /// 使用默认帧上下文创建
    pub fn new(config: &FxConfig, backend: ComputeBackend) -> FxResult<Self> {
        Self::with_context(config, FxContext::default().shared(), backend)
    }

    /// 创建场景驱动
    ///
    /// # 参数
    ///
    /// * `config` - 特效配置（构造时读取一次）
    /// * `context` - 注入给各天气场的共享上下文
    /// * `backend` - 内核执行位置
    pub fn with_context(
        config: &FxConfig,
        context: SharedContext,
        backend: ComputeBackend,
    ) -> FxResult<Self> {
        config.validate()?;

        let particles = ParticleSystem::new(config.particles.clone(), &backend)?;
        let rain = RainField::new(config.rain.clone(), context.clone(), &backend)?;
        let sand = SandField::new(config.sand.clone(), context.clone(), &backend)?;
        let debris = DebrisField::new(config.debris.clone(), context.clone(), &backend)?;

        tracing::info!(
            target: "fx",
            backend = backend.name(),
            max_particles = config.particles.max_particles,
            "Effects director ready"
        );

        Ok(Self {
            context,
            backend,
            particles,
            rain,
            sand,
            debris,
            weather: WeatherKind::Clear,
            disposed: false,
        })
    }

    pub fn context(&self) -> &SharedContext {
        &self.context
    }

    pub fn backend(&self) -> &ComputeBackend {
        &self.backend
    }

    pub fn set_camera_position(&self, position: Vec3) {
        self.context.set_camera_position(position);
    }

    pub fn set_wind(&self, direction: Vec3, strength: f32) {
        self.context.set_wind(direction, strength);
    }

    /// 发射一组粒子
    pub fn emit(&mut self, params: &EmitterParams) {
        self.particles.emit(params);
    }

    /// 按预设发射
    pub fn emit_effect(&mut self, kind: EffectKind, origin: Vec3, direction: Vec3, count: u32) {
        self.particles.emit_effect(kind, origin, direction, count);
    }

    /// 切换天气：只切换各天气场的可见性
    pub fn set_weather(&mut self, kind: WeatherKind) {
        if self.disposed || kind == self.weather {
            return;
        }
        tracing::info!(target: "fx.weather", from = ?self.weather, to = ?kind, "Weather changed");
        self.weather = kind;
        for field in self.fields_mut() {
            let visible = field.kind() == kind;
            field.set_visible(visible);
        }
    }

    pub fn weather(&self) -> WeatherKind {
        self.weather
    }

    /// 推进一帧
    pub fn update(&mut self, delta: f32) {
        if self.disposed {
            return;
        }
        self.particles.update(delta);
        for field in self.fields_mut() {
            field.update(delta);
        }
    }

    /// 释放所有系统（幂等）
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.particles.dispose();
        for field in self.fields_mut() {
            field.dispose();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut ParticleSystem {
        &mut self.particles
    }

    pub fn rain(&self) -> &RainField {
        &self.rain
    }

    pub fn sand(&self) -> &SandField {
        &self.sand
    }

    pub fn debris(&self) -> &DebrisField {
        &self.debris
    }

    /// 按类型查找天气场
    pub fn field(&self, kind: WeatherKind) -> Option<&dyn WeatherField> {
        match kind {
            WeatherKind::Clear => None,
            WeatherKind::Rain => Some(&self.rain),
            WeatherKind::Sandstorm => Some(&self.sand),
            WeatherKind::Debris => Some(&self.debris),
        }
    }

    fn fields_mut(&mut self) -> [&mut dyn WeatherField; 3] {
        [&mut self.rain, &mut self.sand, &mut self.debris]
    }
}
