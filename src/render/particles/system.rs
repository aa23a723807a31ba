//! 通用粒子系统
//!
//! 一个固定容量的粒子池：环形分配、单一物理内核、活跃窗口调度。

use super::emitter::{EffectKind, EmitterParams};
use super::kernel::{self, SimParams, PARTICLE_SHADER};
use super::presets;
use super::ring::RingCursor;
use super::scheduler::{DispatchDecision, IdleScheduler};
use crate::config::ParticleSystemConfig;
use crate::core::error::FxResult;
use crate::render::attribute::AttributeBuffer;
use crate::render::compute::{ComputeBackend, GpuKernel, StorageBinding};
use glam::{Vec3, Vec4};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// 粒子属性（对应设备端存储缓冲区的顺序）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleAttribute {
    Position = 0,
    Velocity = 1,
    Color = 2,
    Size = 3,
    Life = 4,
}

/// 五个并行属性缓冲区
#[derive(Debug, Clone)]
pub struct ParticleBuffers {
    pub position: AttributeBuffer<Vec3>,
    pub velocity: AttributeBuffer<Vec3>,
    pub color: AttributeBuffer<Vec4>,
    /// (初始大小, 结束大小)
    pub size: AttributeBuffer<[f32; 2]>,
    /// (当前寿命, 最大寿命, 阻力, 重力)
    pub life: AttributeBuffer<Vec4>,
}

impl ParticleBuffers {
    fn new(capacity: usize) -> Self {
        Self {
            position: AttributeBuffer::new("Particle Positions", capacity, Vec3::ZERO),
            velocity: AttributeBuffer::new("Particle Velocities", capacity, Vec3::ZERO),
            color: AttributeBuffer::new("Particle Colors", capacity, Vec4::ZERO),
            size: AttributeBuffer::new("Particle Sizes", capacity, [0.0; 2]),
            // 初始状态全部死亡：current == max == 0
            life: AttributeBuffer::new("Particle Lives", capacity, Vec4::ZERO),
        }
    }

    fn storage_bindings(&self) -> [StorageBinding; 5] {
        [
            StorageBinding::for_attribute(&self.position),
            StorageBinding::for_attribute(&self.velocity),
            StorageBinding::for_attribute(&self.color),
            StorageBinding::for_attribute(&self.size),
            StorageBinding::for_attribute(&self.life),
        ]
    }
}

/// 粒子系统统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ParticleSystemStats {
    /// 总调度次数（含预热）
    pub dispatches: u64,
    /// 预热调度次数
    pub warmup_dispatches: u64,
    /// 因活跃窗口结束而跳过的帧数
    pub skipped_frames: u64,
    /// 发射调用次数（count > 0）
    pub emissions: u64,
    /// 总发射粒子数
    pub total_emitted: u64,
}

/// 通用粒子系统
pub struct ParticleSystem {
    config: ParticleSystemConfig,
    buffers: ParticleBuffers,
    ring: RingCursor,
    scheduler: IdleScheduler,
    rng: StdRng,
    gpu: Option<GpuKernel>,
    stats: ParticleSystemStats,
    disposed: bool,
}

impl ParticleSystem {
    /// 创建粒子系统
    ///
    /// # 参数
    ///
    /// * `config` - 池配置（容量、余量、地面高度等）
    /// * `backend` - 内核执行位置
    ///
    /// # 返回
    ///
    /// 配置不合法时返回 `FxError::Config`。
    pub fn new(config: ParticleSystemConfig, backend: &ComputeBackend) -> FxResult<Self> {
        config.validate()?;

        let capacity = config.max_particles as usize;
        let buffers = ParticleBuffers::new(capacity);

        let gpu = match backend {
            ComputeBackend::Host => None,
            ComputeBackend::Wgpu(context) => Some(GpuKernel::new(
                context,
                "Particle Simulation",
                PARTICLE_SHADER,
                std::mem::size_of::<SimParams>() as u64,
                &buffers.storage_bindings(),
                config.workgroup_size,
            )),
        };

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        tracing::info!(
            target: "fx.particles",
            capacity,
            backend = backend.name(),
            "Particle system created"
        );

        Ok(Self {
            ring: RingCursor::new(config.max_particles),
            scheduler: IdleScheduler::new(config.idle_margin),
            config,
            buffers,
            rng,
            gpu,
            stats: ParticleSystemStats::default(),
            disposed: false,
        })
    }

    /// 固定主机端采样种子
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// 发射粒子
    ///
    /// 从环形游标开始写入 `count` 个连续槽位（回绕），不检查这些槽位是否仍存活。
    /// `count == 0` 或系统已释放时不做任何事。
    pub fn emit(&mut self, params: &EmitterParams) {
        if self.disposed || params.count == 0 {
            return;
        }

        let claim = self.ring.claim(params.count);
        let start = claim.start();
        for slot in claim {
            let particle = params.sample_particle(&mut self.rng);
            self.buffers.position.set(slot, particle.position);
            self.buffers.velocity.set(slot, particle.velocity);
            self.buffers.color.set(slot, particle.color);
            self.buffers.size.set(slot, particle.size);
            self.buffers.life.set(slot, particle.life);
        }

        self.scheduler.note_emission(params.lifetime.max);
        self.stats.emissions += 1;
        self.stats.total_emitted += params.count as u64;

        tracing::debug!(
            target: "fx.particles",
            kind = params.kind.name(),
            count = params.count,
            start_slot = start,
            "Particles emitted"
        );
    }

    /// 按预设发射（复合预设展开为多次发射）
    pub fn emit_effect(&mut self, kind: EffectKind, origin: Vec3, direction: Vec3, count: u32) {
        for params in presets::expand(kind, origin, direction, count) {
            self.emit(&params);
        }
    }

    /// 推进时间，并在需要时发出一次调度
    pub fn update(&mut self, delta: f32) {
        if self.disposed {
            return;
        }

        let decision = self.scheduler.advance(delta);
        match decision {
            DispatchDecision::Skip => {
                self.stats.skipped_frames += 1;
                return;
            }
            DispatchDecision::WarmUp => self.stats.warmup_dispatches += 1,
            DispatchDecision::Dispatch => {}
        }

        let params = SimParams {
            delta,
            ground_y: self.config.ground_y,
            bounce: self.config.bounce_damping,
            capacity: self.config.max_particles,
        };
        self.dispatch(&params);
        self.stats.dispatches += 1;
    }

    fn dispatch(&mut self, params: &SimParams) {
        match &self.gpu {
            Some(gpu) => {
                let buffers = &mut self.buffers;
                gpu.upload(ParticleAttribute::Position as usize, &mut buffers.position);
                gpu.upload(ParticleAttribute::Velocity as usize, &mut buffers.velocity);
                gpu.upload(ParticleAttribute::Color as usize, &mut buffers.color);
                gpu.upload(ParticleAttribute::Size as usize, &mut buffers.size);
                gpu.upload(ParticleAttribute::Life as usize, &mut buffers.life);
                gpu.write_uniforms(params);
                gpu.dispatch(params.capacity);
            }
            None => {
                let buffers = &mut self.buffers;
                buffers.position.take_dirty();
                buffers.velocity.take_dirty();
                buffers.color.take_dirty();
                buffers.size.take_dirty();
                buffers.life.take_dirty();
                kernel::run_host(
                    buffers.position.device_view_mut(),
                    buffers.velocity.device_view_mut(),
                    buffers.color.device_view_mut(),
                    buffers.life.device_view_mut(),
                    params,
                );
            }
        }
    }

    /// 释放设备资源（幂等）
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.gpu = None;
        tracing::info!(
            target: "fx.particles",
            dispatches = self.stats.dispatches,
            total_emitted = self.stats.total_emitted,
            "Particle system disposed"
        );
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn capacity(&self) -> u32 {
        self.config.max_particles
    }

    pub fn config(&self) -> &ParticleSystemConfig {
        &self.config
    }

    pub fn stats(&self) -> ParticleSystemStats {
        self.stats
    }

    /// 累计时间（秒）
    pub fn elapsed(&self) -> f64 {
        self.scheduler.now()
    }

    /// 活跃窗口是否仍然打开
    pub fn is_active(&self) -> bool {
        self.scheduler.is_active()
    }

    /// 下一次发射的起始槽位
    pub fn cursor(&self) -> u32 {
        self.ring.next_slot()
    }

    /// 槽位是否存活
    ///
    /// 只在主机后端上反映模拟结果；GPU 后端的主机数组只包含发射时写入的值。
    pub fn is_alive(&self, slot: usize) -> bool {
        let life = self.buffers.life.get(slot);
        life.x < life.y
    }

    /// 存活粒子数（主机视图）
    pub fn alive_count(&self) -> usize {
        self.buffers
            .life
            .as_slice()
            .iter()
            .filter(|life| life.x < life.y)
            .count()
    }

    pub fn buffers(&self) -> &ParticleBuffers {
        &self.buffers
    }

    pub fn positions(&self) -> &[Vec3] {
        self.buffers.position.as_slice()
    }

    pub fn velocities(&self) -> &[Vec3] {
        self.buffers.velocity.as_slice()
    }

    pub fn colors(&self) -> &[Vec4] {
        self.buffers.color.as_slice()
    }

    pub fn sizes(&self) -> &[[f32; 2]] {
        self.buffers.size.as_slice()
    }

    pub fn lives(&self) -> &[Vec4] {
        self.buffers.life.as_slice()
    }

    /// 设备端缓冲区，供渲染层绑定（仅 GPU 后端）
    pub fn device_buffer(&self, attribute: ParticleAttribute) -> Option<&wgpu::Buffer> {
        self.gpu
            .as_ref()
            .and_then(|gpu| gpu.storage_buffer(attribute as usize))
    }
}

impl Drop for ParticleSystem {
    fn drop(&mut self) {
        self.dispose();
    }
}
