//! 通用粒子物理内核
//!
//! 每个槽位一次独立调用，仅处理 `life.x < life.y` 的存活槽位。死亡槽位保持原样，
//! 直到下一次发射覆盖。WGSL 版本与主机版本逐行对应。

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};
use rayon::prelude::*;

/// 内核 uniform 块
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct SimParams {
    /// 时间增量（秒）
    pub delta: f32,
    /// 地面高度
    pub ground_y: f32,
    /// 反弹保留比例
    pub bounce: f32,
    /// 槽位数
    pub capacity: u32,
}

/// 通用粒子计算着色器
///
/// 位置和速度按 `array<f32>` 绑定（每个槽位 3 个分量，步长 12 字节）。
/// `@binding(4)` 是大小缓冲区，内核不读写，只在布局中占位。
pub const PARTICLE_SHADER: &str = r#"
struct SimParams {
    delta: f32,
    ground_y: f32,
    bounce: f32,
    capacity: u32,
};

@group(0) @binding(0) var<uniform> params: SimParams;
@group(0) @binding(1) var<storage, read_write> positions: array<f32>;
@group(0) @binding(2) var<storage, read_write> velocities: array<f32>;
@group(0) @binding(3) var<storage, read_write> colors: array<vec4<f32>>;
@group(0) @binding(5) var<storage, read_write> lives: array<vec4<f32>>;

@compute @workgroup_size({{WORKGROUP_SIZE}})
fn main(@builtin(global_invocation_id) global_id: vec3<u32>) {
    let i = global_id.x;
    if (i >= params.capacity) {
        return;
    }

    let life = lives[i];
    if (!(life.x < life.y)) {
        return;
    }

    let dt = params.delta;
    let drag = life.z;
    let gravity = life.w;
    let new_life = life.x + dt;
    let ratio = new_life / life.y;

    let base = i * 3u;
    let old_vx = velocities[base];
    let old_vz = velocities[base + 2u];

    var vy = velocities[base + 1u] + gravity * dt;
    let vx = old_vx * drag;
    let vz = old_vz * drag;

    let px = positions[base] + old_vx * dt;
    var py = positions[base + 1u] + vy * dt;
    let pz = positions[base + 2u] + old_vz * dt;

    if (py < params.ground_y) {
        py = params.ground_y;
        vy = abs(vy) * params.bounce * drag;
    }

    positions[base] = px;
    positions[base + 1u] = py;
    positions[base + 2u] = pz;
    velocities[base] = vx;
    velocities[base + 1u] = vy;
    velocities[base + 2u] = vz;

    colors[i].w = max(1.0 - ratio * ratio, 0.0);
    lives[i] = vec4<f32>(new_life, life.y, drag, gravity);
}
"#;

/// 单个槽位的一步模拟（主机版本）
#[inline]
pub fn step_particle(
    position: &mut Vec3,
    velocity: &mut Vec3,
    color: &mut Vec4,
    life: &mut Vec4,
    params: &SimParams,
) {
    if !(life.x < life.y) {
        return;
    }

    let dt = params.delta;
    let drag = life.z;
    let gravity = life.w;
    let new_life = life.x + dt;
    let ratio = new_life / life.y;

    let old = *velocity;
    velocity.y += gravity * dt;
    velocity.x = old.x * drag;
    velocity.z = old.z * drag;

    position.x += old.x * dt;
    position.y += velocity.y * dt;
    position.z += old.z * dt;

    if position.y < params.ground_y {
        position.y = params.ground_y;
        velocity.y = velocity.y.abs() * params.bounce * drag;
    }

    color.w = (1.0 - ratio * ratio).max(0.0);
    life.x = new_life;
}

/// 在主机上并行执行一次调度
pub fn run_host(
    positions: &mut [Vec3],
    velocities: &mut [Vec3],
    colors: &mut [Vec4],
    lives: &mut [Vec4],
    params: &SimParams,
) {
    positions
        .par_iter_mut()
        .zip(velocities.par_iter_mut())
        .zip(colors.par_iter_mut())
        .zip(lives.par_iter_mut())
        .for_each(|(((position, velocity), color), life)| {
            step_particle(position, velocity, color, life, params);
        });
}
