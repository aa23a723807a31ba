//! 发射预设表
//!
//! 每个预设是一组只读参数；复合预设（血液、爆炸）展开为多次发射。
//! 所有函数都是纯查表，每次返回新的值，调用之间不共享可变状态。

use super::emitter::{EffectKind, EmitterParams};
use glam::Vec3;
use std::f32::consts::PI;

/// 血液四个子发射的比例（百分比，向下取整，不重新归一化）
pub const BLOOD_SPLIT: [u32; 4] = [40, 35, 15, 10];

/// 按百分比向下取整
#[inline]
pub fn split_count(count: u32, percent: u32) -> u32 {
    (count as u64 * percent as u64 / 100) as u32
}

fn spark(origin: Vec3, direction: Vec3, count: u32) -> EmitterParams {
    EmitterParams::new(EffectKind::Spark, origin, count).with_direction(direction, PI / 2.0)
}

fn smoke(origin: Vec3, direction: Vec3, count: u32) -> EmitterParams {
    EmitterParams::new(EffectKind::Smoke, origin, count)
        .with_direction(direction, PI / 3.0)
        .with_speed(0.5, 1.5)
        .with_lifetime(1.0, 2.5)
        .with_size(0.3, 1.2)
        .with_colors(Vec3::splat(0.35), Vec3::splat(0.2))
        .with_physics(0.5, 0.9)
}

fn debris(origin: Vec3, direction: Vec3, count: u32) -> EmitterParams {
    EmitterParams::new(EffectKind::Debris, origin, count)
        .with_direction(direction, PI / 2.0)
        .with_speed(2.0, 6.0)
        .with_lifetime(0.8, 1.6)
        .with_size(0.05, 0.04)
        .with_colors(Vec3::new(0.4, 0.35, 0.3), Vec3::new(0.3, 0.25, 0.2))
        .with_physics(-9.8, 0.97)
}

fn muzzle(origin: Vec3, direction: Vec3, count: u32) -> EmitterParams {
    EmitterParams::new(EffectKind::Muzzle, origin, count)
        .with_direction(direction, PI / 8.0)
        .with_speed(4.0, 10.0)
        .with_lifetime(0.03, 0.08)
        .with_size(0.08, 0.02)
        .with_colors(Vec3::new(1.0, 0.9, 0.5), Vec3::new(1.0, 0.5, 0.1))
        .with_physics(0.0, 0.8)
}

fn blood(origin: Vec3, direction: Vec3, count: u32) -> [EmitterParams; 4] {
    let base = EmitterParams::new(EffectKind::Blood, origin, 0);

    // 明亮、快速、大角度的喷溅
    let spray = base
        .with_direction(direction, PI / 3.0)
        .with_speed(2.0, 5.0)
        .with_lifetime(0.3, 0.7)
        .with_size(0.04, 0.02)
        .with_colors(Vec3::new(0.6, 0.0, 0.0), Vec3::new(0.3, 0.0, 0.0))
        .with_physics(-9.8, 0.96)
        .with_count(split_count(count, BLOOD_SPLIT[0]));

    // 更细、更快、更分散的血雾
    let mist = base
        .with_direction(direction, PI / 2.0)
        .with_speed(3.0, 7.0)
        .with_lifetime(0.2, 0.5)
        .with_size(0.02, 0.01)
        .with_colors(Vec3::new(0.7, 0.05, 0.05), Vec3::new(0.4, 0.0, 0.0))
        .with_physics(-6.0, 0.92)
        .with_count(split_count(count, BLOOD_SPLIT[1]));

    // 缓慢、极宽的雾团
    let fog = base
        .with_direction(direction, PI)
        .with_speed(0.3, 1.0)
        .with_lifetime(0.6, 1.2)
        .with_size(0.15, 0.4)
        .with_colors(Vec3::new(0.45, 0.1, 0.1), Vec3::new(0.25, 0.05, 0.05))
        .with_physics(-0.5, 0.9)
        .with_count(split_count(count, BLOOD_SPLIT[2]));

    // 主要向下的滴落
    let drip_direction = (direction.normalize_or_zero() * 0.2 + Vec3::NEG_Y).normalize_or_zero();
    let drip = base
        .with_direction(drip_direction, PI / 6.0)
        .with_speed(0.5, 1.5)
        .with_lifetime(0.5, 1.0)
        .with_size(0.03, 0.02)
        .with_colors(Vec3::new(0.35, 0.0, 0.0), Vec3::new(0.15, 0.0, 0.0))
        .with_physics(-9.8, 0.98)
        .with_count(split_count(count, BLOOD_SPLIT[3]));

    [spray, mist, fog, drip]
}

fn explosion_fire(origin: Vec3, count: u32) -> EmitterParams {
    EmitterParams::new(EffectKind::Explosion, origin, count)
        .with_direction(Vec3::Y, PI * 0.8)
        .with_speed(4.0, 12.0)
        .with_lifetime(0.2, 0.6)
        .with_size(0.2, 0.05)
        .with_colors(Vec3::new(1.0, 0.6, 0.1), Vec3::new(0.6, 0.1, 0.0))
        .with_physics(-2.0, 0.9)
}

/// 展开一个预设为若干次发射
///
/// # 参数
///
/// * `kind` - 特效类型
/// * `origin` - 发射原点
/// * `direction` - 基准方向（爆炸忽略此参数，始终向上）
/// * `count` - 总粒子数
///
/// # 返回
///
/// 发射参数列表。复合预设的子数量向下取整，总数可能略小于 `count`。
pub fn expand(kind: EffectKind, origin: Vec3, direction: Vec3, count: u32) -> Vec<EmitterParams> {
    match kind {
        EffectKind::Spark => vec![spark(origin, direction, count)],
        EffectKind::Smoke => vec![smoke(origin, direction, count)],
        EffectKind::Debris => vec![debris(origin, direction, count)],
        EffectKind::Muzzle => vec![muzzle(origin, direction, count)],
        EffectKind::Blood => blood(origin, direction, count).to_vec(),
        EffectKind::Explosion => vec![
            explosion_fire(origin, count),
            smoke(origin, Vec3::Y, count / 2),
        ],
    }
}

/// 单个预设的主参数（复合预设返回第一组）
pub fn preset(kind: EffectKind, origin: Vec3, direction: Vec3, count: u32) -> EmitterParams {
    match kind {
        EffectKind::Blood => blood(origin, direction, count)[0],
        EffectKind::Explosion => explosion_fire(origin, count),
        _ => expand(kind, origin, direction, count)[0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blood_split_counts() {
        let bundles = expand(EffectKind::Blood, Vec3::ZERO, Vec3::X, 10);
        let counts: Vec<u32> = bundles.iter().map(|p| p.count).collect();
        assert_eq!(counts, vec![4, 3, 1, 1]);
        assert_eq!(counts.iter().sum::<u32>(), 9);
    }

    #[test]
    fn test_blood_sub_bundles_differ() {
        let bundles = expand(EffectKind::Blood, Vec3::ZERO, Vec3::X, 100);
        assert_ne!(bundles[2].start_color, bundles[0].start_color);
        assert_ne!(bundles[3].start_color, bundles[0].start_color);
        // 滴落主要向下
        assert!(bundles[3].direction.y < -0.9);
    }

    #[test]
    fn test_explosion_adds_half_smoke() {
        let bundles = expand(EffectKind::Explosion, Vec3::ZERO, Vec3::X, 31);
        assert_eq!(bundles.len(), 2);
        assert_eq!(bundles[0].count, 31);
        assert_eq!(bundles[0].direction, Vec3::Y);
        assert_eq!(bundles[1].kind, EffectKind::Smoke);
        assert_eq!(bundles[1].count, 15);
    }

    #[test]
    fn test_spark_bundle() {
        let p = preset(EffectKind::Spark, Vec3::ZERO, Vec3::Y, 15);
        assert_eq!(p.speed.min, 3.0);
        assert_eq!(p.speed.max, 8.0);
        assert_eq!(p.lifetime.max, 0.5);
        assert_eq!(p.gravity, -15.0);
        assert_eq!(p.drag, 0.95);
    }

    #[test]
    fn test_presets_are_fresh_values() {
        let mut a = preset(EffectKind::Smoke, Vec3::ZERO, Vec3::Y, 1);
        a.start_color = Vec3::ONE;
        let b = preset(EffectKind::Smoke, Vec3::ZERO, Vec3::Y, 1);
        assert_eq!(b.start_color, Vec3::splat(0.35));
    }

    #[test]
    fn test_every_kind_expands() {
        for kind in EffectKind::ALL {
            assert!(!expand(kind, Vec3::ZERO, Vec3::Y, 20).is_empty());
        }
    }
}
