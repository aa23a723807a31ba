//! 雨
//!
//! 雨滴在跟随相机的盒子内下落，受水平风影响。落到 `camera.y - drop_below`
//! 以下时在盒子顶部半高处重生；水平越界的轴单独重新随机，盒子跟随相机移动
//! 而不会每帧整体瞬移。

use super::{signed_rand, FieldCore, WeatherField, WeatherKind, WeatherStats, WeatherUniforms};
use crate::config::RainConfig;
use crate::core::context::SharedContext;
use crate::core::error::FxResult;
use crate::math;
use crate::render::compute::ComputeBackend;
use glam::Vec3;
use rayon::prelude::*;

/// 雨计算着色器
///
/// uniform 用法：`extent = (半宽, 高度, 半深, drop_below)`，`motion.xy` 为水平风。
const RAIN_SHADER: &str = r#"
@group(0) @binding(1) var<storage, read_write> positions: array<f32>;
@group(0) @binding(2) var<storage, read_write> velocities: array<f32>;

@compute @workgroup_size({{WORKGROUP_SIZE}})
fn main(@builtin(global_invocation_id) global_id: vec3<u32>) {
    let i = global_id.x;
    if (i >= u.count) {
        return;
    }

    let base = i * 3u;
    let cam = u.camera.xyz;
    let dt = u.camera.w;
    let wind = vec3<f32>(u.motion.x, 0.0, u.motion.y);
    let vel = vec3<f32>(velocities[base], velocities[base + 1u], velocities[base + 2u]);
    var pos = vec3<f32>(positions[base], positions[base + 1u], positions[base + 2u]);

    pos = pos + (vel + wind) * dt;

    if (pos.y < cam.y - u.extent.w) {
        pos.x = cam.x + signed_rand(i, 0u) * u.extent.x;
        pos.z = cam.z + signed_rand(i, 1u) * u.extent.z;
        pos.y = cam.y + u.extent.y * 0.5;
    }
    if (abs(pos.x - cam.x) > u.extent.x) {
        pos.x = cam.x + signed_rand(i, 2u) * u.extent.x;
    }
    if (abs(pos.z - cam.z) > u.extent.z) {
        pos.z = cam.z + signed_rand(i, 3u) * u.extent.z;
    }

    positions[base] = pos.x;
    positions[base + 1u] = pos.y;
    positions[base + 2u] = pos.z;
}
"#;

/// 单个雨滴的一步模拟（主机版本）
#[inline]
pub fn step_raindrop(index: u32, position: &mut Vec3, velocity: Vec3, u: &WeatherUniforms) {
    let cam = u.camera();
    let half_x = u.extent[0];
    let height = u.extent[1];
    let half_z = u.extent[2];
    let drop_below = u.extent[3];
    let wind = Vec3::new(u.motion[0], 0.0, u.motion[1]);

    let mut pos = *position + (velocity + wind) * u.delta();

    if pos.y < cam.y - drop_below {
        pos.x = cam.x + signed_rand(index, u.seed, 0) * half_x;
        pos.z = cam.z + signed_rand(index, u.seed, 1) * half_z;
        pos.y = cam.y + height * 0.5;
    }
    if (pos.x - cam.x).abs() > half_x {
        pos.x = cam.x + signed_rand(index, u.seed, 2) * half_x;
    }
    if (pos.z - cam.z).abs() > half_z {
        pos.z = cam.z + signed_rand(index, u.seed, 3) * half_z;
    }

    *position = pos;
}

/// 雨粒子场
pub struct RainField {
    config: RainConfig,
    core: FieldCore,
}

impl RainField {
    /// 创建雨场并立即生成所有雨滴
    pub fn new(config: RainConfig, context: SharedContext, backend: &ComputeBackend) -> FxResult<Self> {
        config.validate()?;
        let core = FieldCore::new(
            WeatherKind::Rain,
            "Rain Simulation",
            config.count,
            config.seed,
            context,
            backend,
            RAIN_SHADER,
            &[],
            config.workgroup_size,
        );
        let mut field = Self { config, core };
        field.init_spawn();
        Ok(field)
    }

    pub fn config(&self) -> &RainConfig {
        &self.config
    }

    pub fn velocities(&self) -> &[Vec3] {
        self.core.velocities.as_slice()
    }

    /// 写入单个雨滴
    pub fn set_particle(&mut self, index: usize, position: Vec3, velocity: Vec3) {
        self.core.set_particle(index, position, velocity);
    }

    /// 设备端缓冲区：0 = 位置，1 = 速度
    pub fn device_buffer(&self, slot: usize) -> Option<&wgpu::Buffer> {
        self.core.device_buffer(slot)
    }

    fn uniforms(&self, camera: Vec3, wind: Vec3, delta: f32, seed: u32) -> WeatherUniforms {
        let half = self.config.half_extents();
        WeatherUniforms {
            camera: camera.extend(delta).to_array(),
            extent: [half.x, self.config.area.y, half.z, self.config.drop_below],
            motion: [wind.x, wind.z, 0.0, 0.0],
            params: [0.0; 4],
            seed,
            count: self.core.count(),
            _pad: [0; 2],
        }
    }
}

impl WeatherField for RainField {
    fn kind(&self) -> WeatherKind {
        WeatherKind::Rain
    }

    fn count(&self) -> u32 {
        self.core.count()
    }

    fn init_spawn(&mut self) {
        if !self.core.is_live() {
            return;
        }
        let camera = self.core.context().camera_position;
        let half = self.config.half_extents();
        let min = Vec3::new(camera.x - half.x, camera.y, camera.z - half.z);
        let max = Vec3::new(camera.x + half.x, camera.y + self.config.area.y, camera.z + half.z);

        for i in 0..self.core.count() as usize {
            let position = math::uniform_vec3(&mut self.core.rng, min, max);
            let speed = math::uniform(&mut self.core.rng, self.config.speed_min, self.config.speed_max);
            self.core.set_particle(i, position, Vec3::new(0.0, -speed, 0.0));
        }
        self.core.stats.spawns += 1;
        tracing::debug!(target: "fx.weather", count = self.core.count(), "Rain spawned");
    }

    fn update(&mut self, delta: f32) {
        let Some(frame) = self.core.begin_frame(delta, 0.0) else {
            return;
        };
        let uniforms = self.uniforms(
            frame.context.camera_position,
            frame.context.horizontal_wind(),
            delta,
            frame.seed,
        );

        if !self.core.dispatch_gpu(&uniforms) {
            let core = &mut self.core;
            let velocities = core.velocities.as_slice();
            core.positions
                .device_view_mut()
                .par_iter_mut()
                .zip(velocities.par_iter())
                .enumerate()
                .for_each(|(i, (position, velocity))| {
                    step_raindrop(i as u32, position, *velocity, &uniforms);
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
