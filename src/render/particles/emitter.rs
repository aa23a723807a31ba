//! 发射参数
//!
//! `EmitterParams` 是按值传递的参数对象：`emit()` 读取后不保留。

use crate::math;
use glam::{Vec3, Vec4};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// 特效类型标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// 火花
    Spark,
    /// 烟雾
    Smoke,
    /// 血液（复合预设）
    Blood,
    /// 碎屑
    Debris,
    /// 枪口火焰
    Muzzle,
    /// 爆炸（复合预设）
    Explosion,
}

impl EffectKind {
    pub const ALL: [EffectKind; 6] = [
        EffectKind::Spark,
        EffectKind::Smoke,
        EffectKind::Blood,
        EffectKind::Debris,
        EffectKind::Muzzle,
        EffectKind::Explosion,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EffectKind::Spark => "spark",
            EffectKind::Smoke => "smoke",
            EffectKind::Blood => "blood",
            EffectKind::Debris => "debris",
            EffectKind::Muzzle => "muzzle",
            EffectKind::Explosion => "explosion",
        }
    }
}

/// 闭区间 `[min, max]` 上的取值范围
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloatRange {
    pub min: f32,
    pub max: f32,
}

impl FloatRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// 均匀采样
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        math::uniform(rng, self.min, self.max)
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// 单次发射的参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmitterParams {
    /// 特效类型
    pub kind: EffectKind,
    /// 发射原点
    pub position: Vec3,
    /// 基准方向
    pub direction: Vec3,
    /// 扩散角（弧度）
    pub spread: f32,
    /// 初速度范围
    pub speed: FloatRange,
    /// 寿命范围（秒）
    pub lifetime: FloatRange,
    /// 初始大小
    pub start_size: f32,
    /// 结束大小
    pub end_size: f32,
    /// 初始颜色（RGB，出生时 alpha = 1）
    pub start_color: Vec3,
    /// 结束颜色，交给材质层插值
    pub end_color: Vec3,
    /// 竖直重力加速度
    pub gravity: f32,
    /// 每帧水平阻力系数
    pub drag: f32,
    /// 粒子数量
    pub count: u32,
}

impl EmitterParams {
    /// 以火花参数为基础创建
    pub fn new(kind: EffectKind, position: Vec3, count: u32) -> Self {
        Self {
            kind,
            position,
            direction: Vec3::Y,
            spread: std::f32::consts::FRAC_PI_2,
            speed: FloatRange::new(3.0, 8.0),
            lifetime: FloatRange::new(0.2, 0.5),
            start_size: 0.03,
            end_size: 0.01,
            start_color: Vec3::new(1.0, 0.8, 0.3),
            end_color: Vec3::new(1.0, 0.3, 0.0),
            gravity: -15.0,
            drag: 0.95,
            count,
        }
    }

    pub fn with_direction(mut self, direction: Vec3, spread: f32) -> Self {
        self.direction = direction;
        self.spread = spread;
        self
    }

    pub fn with_speed(mut self, min: f32, max: f32) -> Self {
        self.speed = FloatRange::new(min, max);
        self
    }

    pub fn with_lifetime(mut self, min: f32, max: f32) -> Self {
        self.lifetime = FloatRange::new(min, max);
        self
    }

    pub fn with_size(mut self, start: f32, end: f32) -> Self {
        self.start_size = start;
        self.end_size = end;
        self
    }

    pub fn with_colors(mut self, start: Vec3, end: Vec3) -> Self {
        self.start_color = start;
        self.end_color = end;
        self
    }

    pub fn with_physics(mut self, gravity: f32, drag: f32) -> Self {
        self.gravity = gravity;
        self.drag = drag;
        self
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    /// 采样一个新粒子
    pub fn sample_particle<R: Rng + ?Sized>(&self, rng: &mut R) -> SpawnedParticle {
        let jitter = math::uniform_vec3(rng, Vec3::splat(-SPAWN_JITTER), Vec3::splat(SPAWN_JITTER));
        let direction = math::spread_direction(rng, self.direction, self.spread);
        let speed = self.speed.sample(rng);
        let shade = 1.0 - math::uniform(rng, 0.0, 0.2);

        SpawnedParticle {
            position: self.position + jitter,
            velocity: direction * speed,
            color: (self.start_color * shade).extend(1.0),
            size: [self.start_size * math::uniform(rng, 0.8, 1.2), self.end_size],
            life: Vec4::new(0.0, self.lifetime.sample(rng), self.drag, self.gravity),
        }
    }
}

/// 出生位置在每个轴上的抖动幅度
pub const SPAWN_JITTER: f32 = 0.05;

/// 一个槽位的初始属性
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnedParticle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub color: Vec4,
    pub size: [f32; 2],
    /// (当前寿命, 最大寿命, 阻力, 重力)
    pub life: Vec4,
}
