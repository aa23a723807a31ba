//! 沙尘
//!
//! 沙粒主要沿 +X 漂移，速度乘以阵风倍率 `1 + sin(gustPhase) * gust_amplitude`，
//! 并叠加竖直抖动。越过前沿后回到相机后沿重新进入。高度以地面 y = 0 为基准。

use super::{signed_rand, FieldCore, WeatherField, WeatherKind, WeatherStats, WeatherUniforms};
use crate::config::SandConfig;
use crate::core::context::SharedContext;
use crate::core::error::FxResult;
use crate::math::{self, kernel_rand};
use crate::render::compute::ComputeBackend;
use glam::Vec3;
use rayon::prelude::*;

/// 沙尘计算着色器
///
/// uniform 用法：`extent = (半宽, 高度, 半深, 下部比例)`，
/// `motion.zw = (阵风相位, 阵风幅度)`，`params.x` 为抖动幅度。
const SAND_SHADER: &str = r#"
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
    let half_x = u.extent.x;
    let height = u.extent.y;
    let half_z = u.extent.z;
    let gust = 1.0 + sin(u.motion.z) * u.motion.w;

    let vel = vec3<f32>(velocities[base], velocities[base + 1u], velocities[base + 2u]);
    var pos = vec3<f32>(positions[base], positions[base + 1u], positions[base + 2u]);

    pos = pos + vel * gust * dt;
    pos.y = pos.y + sin(u.motion.z + f32(i) * 0.1) * u.params.x * dt;

    if (pos.x - cam.x > half_x) {
        pos.x = cam.x - half_x;
        pos.y = rand01(i, u.seed, 0u) * height * u.extent.w;
        pos.z = cam.z + signed_rand(i, 1u) * half_z;
    } else if (pos.x - cam.x < -half_x) {
        pos.x = cam.x - half_x;
    }
    if (abs(pos.z - cam.z) > half_z) {
        pos.z = cam.z + signed_rand(i, 2u) * half_z;
    }
    if (pos.y < 0.0) {
        pos.y = rand01(i, u.seed, 3u) * height;
    } else if (pos.y > height) {
        pos.y = 0.0;
    }

    positions[base] = pos.x;
    positions[base + 1u] = pos.y;
    positions[base + 2u] = pos.z;
}
"#;

/// 单个沙粒的一步模拟（主机版本）
#[inline]
pub fn step_grain(index: u32, position: &mut Vec3, velocity: Vec3, u: &WeatherUniforms) {
    let cam = u.camera();
    let dt = u.delta();
    let half_x = u.extent[0];
    let height = u.extent[1];
    let half_z = u.extent[2];
    let gust = 1.0 + u.motion[2].sin() * u.motion[3];

    let mut pos = *position + velocity * gust * dt;
    pos.y += (u.motion[2] + index as f32 * 0.1).sin() * u.params[0] * dt;

    if pos.x - cam.x > half_x {
        pos.x = cam.x - half_x;
        pos.y = kernel_rand(index, u.seed, 0) * height * u.extent[3];
        pos.z = cam.z + signed_rand(index, u.seed, 1) * half_z;
    } else if pos.x - cam.x < -half_x {
        pos.x = cam.x - half_x;
    }
    if (pos.z - cam.z).abs() > half_z {
        pos.z = cam.z + signed_rand(index, u.seed, 2) * half_z;
    }
    if pos.y < 0.0 {
        pos.y = kernel_rand(index, u.seed, 3) * height;
    } else if pos.y > height {
        pos.y = 0.0;
    }

    *position = pos;
}

/// 沙尘粒子场
pub struct SandField {
    config: SandConfig,
    core: FieldCore,
}

impl SandField {
    /// 创建沙尘场并立即生成所有沙粒
    pub fn new(config: SandConfig, context: SharedContext, backend: &ComputeBackend) -> FxResult<Self> {
        config.validate()?;
        let core = FieldCore::new(
            WeatherKind::Sandstorm,
            "Sand Simulation",
            config.count,
            config.seed,
            context,
            backend,
            SAND_SHADER,
            &[],
            config.workgroup_size,
        );
        let mut field = Self { config, core };
        field.init_spawn();
        Ok(field)
    }

    pub fn config(&self) -> &SandConfig {
        &self.config
    }

    pub fn velocities(&self) -> &[Vec3] {
        self.core.velocities.as_slice()
    }

    /// 写入单个沙粒
    pub fn set_particle(&mut self, index: usize, position: Vec3, velocity: Vec3) {
        self.core.set_particle(index, position, velocity);
    }

    /// 设备端缓冲区：0 = 位置，1 = 速度
    pub fn device_buffer(&self, slot: usize) -> Option<&wgpu::Buffer> {
        self.core.device_buffer(slot)
    }
}

impl WeatherField for SandField {
    fn kind(&self) -> WeatherKind {
        WeatherKind::Sandstorm
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
        let min = Vec3::new(camera.x - half.x, 0.0, camera.z - half.z);
        let max = Vec3::new(camera.x + half.x, self.config.area.y, camera.z + half.z);

        for i in 0..self.core.count() as usize {
            let rng = &mut self.core.rng;
            let position = math::uniform_vec3(rng, min, max);
            let velocity = Vec3::new(
                math::uniform(rng, self.config.speed_min, self.config.speed_max),
                0.0,
                math::uniform(rng, -0.5, 0.5),
            );
            self.core.set_particle(i, position, velocity);
        }
        self.core.stats.spawns += 1;
        tracing::debug!(target: "fx.weather", count = self.core.count(), "Sand spawned");
    }

    fn update(&mut self, delta: f32) {
        let Some(frame) = self.core.begin_frame(delta, self.config.gust_frequency) else {
            return;
        };
        let half = self.config.half_extents();
        let uniforms = WeatherUniforms {
            camera: frame.context.camera_position.extend(delta).to_array(),
            extent: [half.x, self.config.area.y, half.z, self.config.lower_fraction],
            motion: [0.0, 0.0, frame.gust_phase, self.config.gust_amplitude],
            params: [self.config.flutter_amplitude, 0.0, 0.0, 0.0],
            seed: frame.seed,
            count: self.core.count(),
            _pad: [0; 2],
        };

        if !self.core.dispatch_gpu(&uniforms) {
            let core = &mut self.core;
            let velocities = core.velocities.as_slice();
            core.positions
                .device_view_mut()
                .par_iter_mut()
                .zip(velocities.par_iter())
                .enumerate()
                .for_each(|(i, (position, velocity))| {
                    step_grain(i as u32, position, *velocity, &uniforms);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::compute::kernel::{assert_valid_wgsl, shader_source};
    use crate::render::weather::weather_shader;

    fn field(count: u32) -> SandField {
        let config = SandConfig {
            count,
            seed: Some(5),
            ..Default::default()
        };
        let mut sand = SandField::new(config, SharedContext::default(), &ComputeBackend::Host).unwrap();
        sand.set_visible(true);
        sand
    }

    #[test]
    fn test_spawn_inside_box() {
        let sand = field(1000);
        for p in sand.positions() {
            assert!(p.x.abs() <= 60.0 && p.z.abs() <= 60.0);
            assert!(p.y >= 0.0 && p.y <= 12.0);
        }
        assert!(sand.velocities().iter().all(|v| v.x >= 6.0));
    }

    #[test]
    fn test_leading_edge_wraps_to_trailing_edge() {
        let mut sand = field(1);
        sand.set_particle(0, Vec3::new(59.9, 5.0, 3.0), Vec3::new(10.0, 0.0, 0.0));
        sand.update(0.1);

        let p = sand.positions()[0];
        assert_eq!(p.x, -60.0);
        assert!(p.y >= 0.0 && p.y <= 12.0 * 0.7);
        assert!(p.z.abs() <= 60.0);
    }

    #[test]
    fn test_height_rules() {
        let mut sand = field(2);
        sand.set_particle(0, Vec3::new(0.0, -0.5, 0.0), Vec3::new(1.0, -1.0, 0.0));
        sand.set_particle(1, Vec3::new(0.0, 12.5, 0.0), Vec3::new(1.0, 1.0, 0.0));
        sand.update(0.1);

        let p = sand.positions();
        assert!(p[0].y >= 0.0 && p[0].y <= 12.0);
        assert_eq!(p[1].y, 0.0);
    }

    #[test]
    fn test_gust_phase_advances() {
        let mut sand = field(1);
        sand.set_particle(0, Vec3::Y, Vec3::new(10.0, 0.0, 0.0));
        sand.update(0.1);
        // 相位先推进再调度：首帧阵风倍率已大于 1
        let x = sand.positions()[0].x;
        assert!(x > 1.0 && x < 1.0 * 1.3);
    }

    #[test]
    fn test_sand_shader_validates() {
        let workgroup_size = SandConfig::default().workgroup_size;
        let source = shader_source(&weather_shader(SAND_SHADER), workgroup_size);
        assert_valid_wgsl("sand", &source);
    }
}
