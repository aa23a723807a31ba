//! 碎屑
//!
//! 碎屑沿 +X 漂移，受阵风倍率影响；每个粒子有独立相位驱动竖直旋涡。
//! 越过 `camera.x + half_extent` 后回到后沿重新进入。地面处反弹，
//! 超过天花板时只反转竖直速度，不夹紧位置。

use super::{signed_rand, FieldCore, WeatherField, WeatherKind, WeatherStats, WeatherUniforms};
use crate::config::DebrisConfig;
use crate::core::context::SharedContext;
use crate::core::error::FxResult;
use crate::math::{self, kernel_rand};
use crate::render::attribute::AttributeBuffer;
use crate::render::compute::{ComputeBackend, StorageBinding};
use glam::Vec3;
use rayon::prelude::*;
use std::f32::consts::TAU;

/// 碎屑计算着色器
///
/// uniform 用法：`extent = (半宽, 生成高度, 半宽, 天花板)`，
/// `motion.zw = (阵风相位, 阵风强度)`，`params.xy = (旋转速度, 旋涡幅度)`。
const DEBRIS_SHADER: &str = r#"
@group(0) @binding(1) var<storage, read_write> positions: array<f32>;
@group(0) @binding(2) var<storage, read_write> velocities: array<f32>;
@group(0) @binding(3) var<storage, read_write> phases: array<f32>;

const TAU: f32 = 6.283185307;

@compute @workgroup_size({{WORKGROUP_SIZE}})
fn main(@builtin(global_invocation_id) global_id: vec3<u32>) {
    let i = global_id.x;
    if (i >= u.count) {
        return;
    }

    let base = i * 3u;
    let cam = u.camera.xyz;
    let dt = u.camera.w;
    let half_extent = u.extent.x;
    let gust = 1.0 + sin(u.motion.z) * u.motion.w;

    var vel = vec3<f32>(velocities[base], velocities[base + 1u], velocities[base + 2u]);
    var pos = vec3<f32>(positions[base], positions[base + 1u], positions[base + 2u]);
    let phase = (phases[i] + u.params.x * dt) % TAU;

    pos = pos + vel * gust * dt;
    pos.y = pos.y + sin(phase) * u.params.y * dt;

    if (pos.x - cam.x > half_extent) {
        pos.x = cam.x - half_extent;
        pos.y = rand01(i, u.seed, 0u) * u.extent.y;
        pos.z = cam.z + signed_rand(i, 1u) * u.extent.z;
    } else if (pos.x - cam.x < -half_extent) {
        pos.x = cam.x - half_extent;
    }

    if (pos.y < 0.0) {
        pos.y = 0.0;
        vel.y = abs(vel.y);
    } else if (pos.y > u.extent.w) {
        vel.y = -abs(vel.y);
    }

    positions[base] = pos.x;
    positions[base + 1u] = pos.y;
    positions[base + 2u] = pos.z;
    velocities[base + 1u] = vel.y;
    phases[i] = phase;
}
"#;

/// 单个碎屑的一步模拟（主机版本）
#[inline]
pub fn step_debris(
    index: u32,
    position: &mut Vec3,
    velocity: &mut Vec3,
    phase: &mut f32,
    u: &WeatherUniforms,
) {
    let cam = u.camera();
    let dt = u.delta();
    let half_extent = u.extent[0];
    let gust = 1.0 + u.motion[2].sin() * u.motion[3];

    *phase = (*phase + u.params[0] * dt) % TAU;

    let mut pos = *position + *velocity * gust * dt;
    pos.y += phase.sin() * u.params[1] * dt;

    if pos.x - cam.x > half_extent {
        pos.x = cam.x - half_extent;
        pos.y = kernel_rand(index, u.seed, 0) * u.extent[1];
        pos.z = cam.z + signed_rand(index, u.seed, 1) * u.extent[2];
    } else if pos.x - cam.x < -half_extent {
        pos.x = cam.x - half_extent;
    }

    if pos.y < 0.0 {
        pos.y = 0.0;
        velocity.y = velocity.y.abs();
    } else if pos.y > u.extent[3] {
        velocity.y = -velocity.y.abs();
    }

    *position = pos;
}

/// 碎屑粒子场
pub struct DebrisField {
    config: DebrisConfig,
    phases: AttributeBuffer<f32>,
    core: FieldCore,
}

impl DebrisField {
    /// 创建碎屑场并立即生成所有碎屑
    pub fn new(config: DebrisConfig, context: SharedContext, backend: &ComputeBackend) -> FxResult<Self> {
        config.validate()?;
        let phases = AttributeBuffer::new("Debris Phases", config.count as usize, 0.0f32);
        let core = FieldCore::new(
            WeatherKind::Debris,
            "Debris Simulation",
            config.count,
            config.seed,
            context,
            backend,
            DEBRIS_SHADER,
            &[StorageBinding::for_attribute(&phases)],
            config.workgroup_size,
        );
        let mut field = Self { config, phases, core };
        field.init_spawn();
        Ok(field)
    }

    pub fn config(&self) -> &DebrisConfig {
        &self.config
    }

    pub fn velocities(&self) -> &[Vec3] {
        self.core.velocities.as_slice()
    }

    pub fn phases(&self) -> &[f32] {
        self.phases.as_slice()
    }

    /// 写入单个碎屑
    pub fn set_particle(&mut self, index: usize, position: Vec3, velocity: Vec3) {
        self.core.set_particle(index, position, velocity);
    }

    /// 设备端缓冲区：0 = 位置，1 = 速度，2 = 相位
    pub fn device_buffer(&self, slot: usize) -> Option<&wgpu::Buffer> {
        self.core.device_buffer(slot)
    }
}

impl WeatherField for DebrisField {
    fn kind(&self) -> WeatherKind {
        WeatherKind::Debris
    }

    fn count(&self) -> u32 {
        self.core.count()
    }

    fn init_spawn(&mut self) {
        if !self.core.is_live() {
            return;
        }
        let half = self.config.half_extent;
        let min = Vec3::new(-half, 0.0, -half);
        let max = Vec3::new(half, self.config.spawn_height, half);

        for i in 0..self.core.count() as usize {
            let rng = &mut self.core.rng;
            let position = math::uniform_vec3(rng, min, max);
            let velocity = Vec3::new(
                math::uniform(rng, self.config.speed_min, self.config.speed_max),
                math::uniform(rng, -1.0, 1.0),
                math::uniform(rng, -0.5, 0.5),
            );
            let phase = math::uniform(rng, 0.0, TAU);
            self.core.set_particle(i, position, velocity);
            self.phases.set(i, phase);
        }
        self.core.stats.spawns += 1;
        tracing::debug!(target: "fx.weather", count = self.core.count(), "Debris spawned");
    }

    fn update(&mut self, delta: f32) {
        let Some(frame) = self.core.begin_frame(delta, self.config.gust_frequency) else {
            return;
        };
        let half = self.config.half_extent;
        let uniforms = WeatherUniforms {
            camera: frame.context.camera_position.extend(delta).to_array(),
            extent: [half, self.config.spawn_height, half, self.config.ceiling],
            motion: [0.0, 0.0, frame.gust_phase, self.config.gust_strength],
            params: [self.config.rotation_speed, self.config.swirl_amplitude, 0.0, 0.0],
            seed: frame.seed,
            count: self.core.count(),
            _pad: [0; 2],
        };

        if let Some(gpu) = self.core.gpu() {
            gpu.upload(2, &mut self.phases);
        } else {
            self.phases.take_dirty();
        }

        if !self.core.dispatch_gpu(&uniforms) {
            let core = &mut self.core;
            core.positions
                .device_view_mut()
                .par_iter_mut()
                .zip(core.velocities.device_view_mut().par_iter_mut())
                .zip(self.phases.device_view_mut().par_iter_mut())
                .enumerate()
                .for_each(|(i, ((position, velocity), phase))| {
                    step_debris(i as u32, position, velocity, phase, &uniforms);
                });
        }
        self.core.stats.dispatches += 1;
    }

    fn set_visible(&mut self, visible: bool) {
        self.core.set_visible(visible);
    }

    fn is_visible(&self) -> bool {
        self.core.is_visible()
    }

    fn dispose(&mut self) {
        self.core.dispose();
    }

    fn is_disposed(&self) -> bool {
        self.core.is_disposed()
    }

    fn stats(&self) -> WeatherStats {
        self.core.stats
    }

    fn positions(&self) -> &[Vec3] {
        self.core.positions.as_slice()
    }
}
