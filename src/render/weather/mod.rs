//! 天气粒子场
//!
//! 雨、沙尘、碎屑三种粒子场。每个场拥有自己的位置/速度缓冲区（碎屑另有相位），
//! 没有寿命：粒子始终存活，越过跟随相机的边界时就地重生或环绕。
//! 切换天气只切换可见性，不重新分配缓冲区；不可见时 `update()` 不发出调度。

pub mod debris;
pub mod rain;
pub mod sand;

pub use debris::DebrisField;
pub use rain::RainField;
pub use sand::SandField;

use crate::core::context::{FxContext, SharedContext};
use crate::math::kernel_rand;
use crate::render::attribute::AttributeBuffer;
use crate::render::compute::{ComputeBackend, GpuKernel, StorageBinding};
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// 天气类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WeatherKind {
    /// 晴天：所有天气场不可见
    #[default]
    Clear,
    /// 雨
    Rain,
    /// 沙尘暴
    Sandstorm,
    /// 碎屑
    Debris,
}

/// 天气场公共接口
pub trait WeatherField {
    /// 场类型
    fn kind(&self) -> WeatherKind;

    /// 粒子数
    fn count(&self) -> u32;

    /// 重新填充所有槽位（唯一的主机端批量写入）
    fn init_spawn(&mut self);

    /// 推进一帧；不可见或已释放时不做任何事
    fn update(&mut self, delta: f32);

    fn set_visible(&mut self, visible: bool);

    fn is_visible(&self) -> bool;

    /// 释放设备资源（幂等）
    fn dispose(&mut self);

    fn is_disposed(&self) -> bool;

    fn stats(&self) -> WeatherStats;

    fn positions(&self) -> &[Vec3];
}

/// 天气场统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WeatherStats {
    /// 调度次数
    pub dispatches: u64,
    /// 因不可见而跳过的帧数
    pub hidden_frames: u64,
    /// 批量生成次数
    pub spawns: u64,
}

/// 天气内核 uniform 块（80 字节）
///
/// 各字段的分量含义见各个场的着色器。
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct WeatherUniforms {
    /// 相机位置 xyz，w = 时间增量
    pub camera: [f32; 4],
    /// 半宽、高度、半深，w 由场自定
    pub extent: [f32; 4],
    /// 风 x、风 z、阵风相位、阵风幅度
    pub motion: [f32; 4],
    /// 场自定参数
    pub params: [f32; 4],
    /// 本帧随机种子
    pub seed: u32,
    /// 粒子数
    pub count: u32,
    pub _pad: [u32; 2],
}

impl WeatherUniforms {
    pub fn camera(&self) -> Vec3 {
        Vec3::new(self.camera[0], self.camera[1], self.camera[2])
    }

    pub fn delta(&self) -> f32 {
        self.camera[3]
    }
}

/// 所有天气着色器共用的 uniform 声明
pub const WEATHER_UNIFORMS_WGSL: &str = r#"
struct WeatherUniforms {
    camera: vec4<f32>,
    extent: vec4<f32>,
    motion: vec4<f32>,
    params: vec4<f32>,
    seed: u32,
    count: u32,
    _pad0: u32,
    _pad1: u32,
};

@group(0) @binding(0) var<uniform> u: WeatherUniforms;

fn signed_rand(index: u32, salt: u32) -> f32 {
    return rand01(index, u.seed, salt) * 2.0 - 1.0;
}
"#;

/// 天气内核主体前拼接共享的 uniform 声明
pub(crate) fn weather_shader(body: &str) -> String {
    format!("{WEATHER_UNIFORMS_WGSL}\n{body}")
}

/// 内核端 `[-1, 1]` 随机数（对应 WGSL `signed_rand`）
#[inline]
pub(crate) fn signed_rand(index: u32, seed: u32, salt: u32) -> f32 {
    kernel_rand(index, seed, salt) * 2.0 - 1.0
}

/// 单帧输入
#[derive(Debug, Clone, Copy)]
pub(crate) struct FrameInputs {
    pub context: FxContext,
    pub seed: u32,
    pub gust_phase: f32,
}

/// 三种天气场共享的状态
pub(crate) struct FieldCore {
    pub kind: WeatherKind,
    pub positions: AttributeBuffer<Vec3>,
    pub velocities: AttributeBuffer<Vec3>,
    pub rng: StdRng,
    context: SharedContext,
    gpu: Option<GpuKernel>,
    visible: bool,
    disposed: bool,
    frame: u32,
    seed_base: u32,
    gust_phase: f32,
    pub stats: WeatherStats,
}

impl FieldCore {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kind: WeatherKind,
        label: &'static str,
        count: u32,
        seed: Option<u64>,
        context: SharedContext,
        backend: &ComputeBackend,
        shader: &str,
        extra_storage: &[StorageBinding],
        workgroup_size: u32,
    ) -> Self {
        let positions = AttributeBuffer::new("Weather Positions", count as usize, Vec3::ZERO);
        let velocities = AttributeBuffer::new("Weather Velocities", count as usize, Vec3::ZERO);

        let gpu = match backend {
            ComputeBackend::Host => None,
            ComputeBackend::Wgpu(gpu_context) => {
                let mut storage = vec![
                    StorageBinding::for_attribute(&positions),
                    StorageBinding::for_attribute(&velocities),
                ];
                storage.extend_from_slice(extra_storage);
                let source = weather_shader(shader);
                Some(GpuKernel::new(
                    gpu_context,
                    label,
                    &source,
                    std::mem::size_of::<WeatherUniforms>() as u64,
                    &storage,
                    workgroup_size,
                ))
            }
        };

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let seed_base = rng.gen();

        tracing::info!(
            target: "fx.weather",
            field = label,
            count,
            backend = backend.name(),
            "Weather field created"
        );

        Self {
            kind,
            positions,
            velocities,
            rng,
            context,
            gpu,
            visible: false,
            disposed: false,
            frame: 0,
            seed_base,
            gust_phase: 0.0,
            stats: WeatherStats::default(),
        }
    }

    pub fn count(&self) -> u32 {
        self.positions.capacity() as u32
    }

    pub fn context(&self) -> FxContext {
        self.context.snapshot()
    }

    pub fn is_live(&self) -> bool {
        !self.disposed
    }

    pub fn gpu(&self) -> Option<&GpuKernel> {
        self.gpu.as_ref()
    }

    /// 开始一帧：不可见或已释放时返回 `None`
    pub fn begin_frame(&mut self, delta: f32, gust_frequency: f32) -> Option<FrameInputs> {
        if self.disposed {
            return None;
        }
        if !self.visible {
            self.stats.hidden_frames += 1;
            return None;
        }

        self.frame = self.frame.wrapping_add(1);
        self.gust_phase = (self.gust_phase + gust_frequency * delta) % std::f32::consts::TAU;

        Some(FrameInputs {
            context: self.context.snapshot(),
            seed: self.seed_base.wrapping_add(self.frame),
            gust_phase: self.gust_phase,
        })
    }

    /// GPU 后端：上传位置/速度脏区、写 uniform、提交调度，返回 `true`；
    /// 主机后端返回 `false`，由调用方执行主机内核。
    pub fn dispatch_gpu(&mut self, uniforms: &WeatherUniforms) -> bool {
        let Some(gpu) = self.gpu.as_ref() else {
            self.positions.take_dirty();
            self.velocities.take_dirty();
            return false;
        };
        gpu.upload(0, &mut self.positions);
        gpu.upload(1, &mut self.velocities);
        gpu.write_uniforms(uniforms);
        gpu.dispatch(uniforms.count);
        true
    }

    pub fn set_particle(&mut self, index: usize, position: Vec3, velocity: Vec3) {
        self.positions.set(index, position);
        self.velocities.set(index, velocity);
    }

    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            tracing::debug!(target: "fx.weather", kind = ?self.kind, visible, "Weather visibility changed");
        }
        self.visible = visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.visible = false;
        self.gpu = None;
        tracing::info!(
            target: "fx.weather",
            kind = ?self.kind,
            dispatches = self.stats.dispatches,
            "Weather field disposed"
        );
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn device_buffer(&self, slot: usize) -> Option<&wgpu::Buffer> {
        self.gpu.as_ref().and_then(|gpu| gpu.storage_buffer(slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_layout() {
        assert_eq!(std::mem::size_of::<WeatherUniforms>(), 80);
        assert_eq!(std::mem::size_of::<WeatherUniforms>() % 16, 0);
    }

    #[test]
    fn test_signed_rand_range() {
        for i in 0..1000 {
            let r = signed_rand(i, 17, 2);
            assert!((-1.0..=1.0).contains(&r));
        }
    }

    #[test]
    fn test_hidden_field_counts_frames() {
        let mut core = FieldCore::new(
            WeatherKind::Rain,
            "Test Field",
            4,
            Some(1),
            SharedContext::default(),
            &ComputeBackend::Host,
            "",
            &[],
            64,
        );
        assert!(core.begin_frame(0.1, 1.0).is_none());
        assert_eq!(core.stats.hidden_frames, 1);

        core.set_visible(true);
        let frame = core.begin_frame(0.1, 1.0).unwrap();
        assert!((frame.gust_phase - 0.1).abs() < 1e-6);

        core.dispose();
        core.dispose();
        assert!(core.begin_frame(0.1, 1.0).is_none());
        assert!(!core.is_visible());
    }
}
