//! 数学与随机数工具
//!
//! 主机端发射采样使用 `rand`；内核端的重生随机数使用 PCG 哈希，
//! WGSL 着色器和 CPU 执行器使用同一套整数运算。

use glam::{Quat, Vec3};
use rand::Rng;

/// 区间 `[min, max)` 内均匀采样；空区间或反向区间返回 `min`
#[inline]
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}

/// 逐分量均匀采样
pub fn uniform_vec3<R: Rng + ?Sized>(rng: &mut R, min: Vec3, max: Vec3) -> Vec3 {
    Vec3::new(
        uniform(rng, min.x, max.x),
        uniform(rng, min.y, max.y),
        uniform(rng, min.z, max.z),
    )
}

/// 在 `center ± half` 的盒子内均匀采样
pub fn sample_box<R: Rng + ?Sized>(rng: &mut R, center: Vec3, half: Vec3) -> Vec3 {
    uniform_vec3(rng, center - half, center + half)
}

/// 将基准方向绕两根互相垂直的轴各随机旋转 `(r - 0.5) * spread`
///
/// 结果集中在基准方向附近（锥形分布）。零向量按 +Y 处理。
pub fn spread_direction<R: Rng + ?Sized>(rng: &mut R, base: Vec3, spread: f32) -> Vec3 {
    let dir = base.normalize_or_zero();
    let dir = if dir == Vec3::ZERO { Vec3::Y } else { dir };
    if spread <= 0.0 {
        return dir;
    }

    let (axis_a, axis_b) = dir.any_orthonormal_pair();
    let angle_a = (rng.gen::<f32>() - 0.5) * spread;
    let angle_b = (rng.gen::<f32>() - 0.5) * spread;
    let rotation = Quat::from_axis_angle(axis_b, angle_b) * Quat::from_axis_angle(axis_a, angle_a);
    (rotation * dir).normalize()
}

/// PCG 整数哈希（与 WGSL `pcg_hash` 一致）
#[inline]
pub fn pcg_hash(input: u32) -> u32 {
    let state = input.wrapping_mul(747_796_405).wrapping_add(2_891_336_453);
    let word = ((state >> ((state >> 28) + 4)) ^ state).wrapping_mul(277_803_737);
    (word >> 22) ^ word
}

/// 哈希映射到 `[0, 1]`
#[inline]
pub fn hash01(input: u32) -> f32 {
    pcg_hash(input) as f32 / 4_294_967_295.0
}

/// 内核端随机数：由槽位、帧种子和通道号决定
///
/// 对应 WGSL `rand01(index, seed, salt)`。
#[inline]
pub fn kernel_rand(index: u32, seed: u32, salt: u32) -> f32 {
    hash01(index.wrapping_mul(4).wrapping_add(salt) ^ pcg_hash(seed))
}

/// WGSL 侧的随机数函数，拼接进各个计算着色器
pub const WGSL_RANDOM: &str = r#"
fn pcg_hash(input: u32) -> u32 {
    let state = input * 747796405u + 2891336453u;
    let word = ((state >> ((state >> 28u) + 4u)) ^ state) * 277803737u;
    return (word >> 22u) ^ word;
}

fn hash01(input: u32) -> f32 {
    return f32(pcg_hash(input)) / 4294967295.0;
}

fn rand01(index: u32, seed: u32, salt: u32) -> f32 {
    return hash01((index * 4u + salt) ^ pcg_hash(seed));
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_uniform_degenerate_range() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(uniform(&mut rng, 2.0, 2.0), 2.0);
        assert_eq!(uniform(&mut rng, 3.0, 1.0), 3.0);
    }

    #[test]
    fn test_uniform_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let v = uniform(&mut rng, -1.0, 4.0);
            assert!((-1.0..4.0).contains(&v));
        }
    }

    #[test]
    fn test_pcg_hash_known_values() {
        // 固定输入必须得到固定输出，WGSL 端依赖同样的结果
        assert_eq!(pcg_hash(0), 129_708_002);
        assert_eq!(pcg_hash(1), 2_831_084_092);
        assert_eq!(pcg_hash(12345), 4_099_845_390);
        let h = hash01(12345);
        assert!((0.0..=1.0).contains(&h));
    }

    #[test]
    fn test_kernel_rand_salts_differ() {
        let a = kernel_rand(10, 99, 0);
        let b = kernel_rand(10, 99, 1);
        assert_ne!(a, b);
    }

    #[test]
    fn test_spread_zero_keeps_direction() {
        let mut rng = StdRng::seed_from_u64(3);
        let dir = spread_direction(&mut rng, Vec3::new(0.0, 2.0, 0.0), 0.0);
        assert!((dir - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_spread_stays_in_cone() {
        let mut rng = StdRng::seed_from_u64(11);
        let spread = std::f32::consts::FRAC_PI_2;
        for _ in 0..500 {
            let dir = spread_direction(&mut rng, Vec3::Y, spread);
            assert!((dir.length() - 1.0).abs() < 1e-4);
            // 两次各 ±45° 的旋转不会翻到下半球
            assert!(dir.y > 0.0);
        }
    }

    #[test]
    fn test_sample_box_bounds() {
        let mut rng = StdRng::seed_from_u64(5);
        let center = Vec3::new(10.0, 0.0, -5.0);
        let half = Vec3::new(1.0, 2.0, 3.0);
        for _ in 0..200 {
            let p = sample_box(&mut rng, center, half);
            assert!((p - center).abs().cmple(half).all());
        }
    }
}
