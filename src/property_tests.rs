//! 粒子与天气场属性测试
//!
//! 使用proptest验证分配、淡出、环形覆盖、空闲跳过和天气场包含性

#[cfg(test)]
mod tests {
    use crate::config::{DebrisConfig, ParticleSystemConfig, RainConfig, SandConfig};
    use crate::core::context::{FxContext, SharedContext};
    use crate::render::compute::ComputeBackend;
    use crate::render::particles::{EffectKind, EmitterParams, ParticleSystem};
    use crate::render::weather::{DebrisField, RainField, SandField, WeatherField};
    use glam::Vec3;
    use proptest::prelude::*;

    fn particle_system(capacity: u32, seed: u64) -> ParticleSystem {
        let config = ParticleSystemConfig {
            seed: Some(seed),
            ..ParticleSystemConfig::with_capacity(capacity)
        };
        ParticleSystem::new(config, &ComputeBackend::Host).unwrap()
    }

    fn spark(count: u32, lifetime_min: f32, lifetime_max: f32) -> EmitterParams {
        EmitterParams::new(EffectKind::Spark, Vec3::new(0.0, 2.0, 0.0), count)
            .with_lifetime(lifetime_min, lifetime_max)
    }

    fn camera_path() -> impl Strategy<Value = Vec<(Vec3, f32)>> {
        prop::collection::vec(
            (
                (-30.0f32..30.0, -2.0f32..2.0, -30.0f32..30.0)
                    .prop_map(|(x, y, z)| Vec3::new(x, y, z)),
                0.001f32..0.1,
            ),
            1..20,
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn emit_claims_exactly_count_fresh_slots(
            capacity in 1u32..200,
            warm in 0u32..200,
            count_fraction in 0.0f64..1.0,
            lifetime_min in 0.1f32..1.0,
            lifetime_extra in 0.0f32..2.0,
            seed in any::<u64>(),
        ) {
            let count = 1 + ((capacity - 1) as f64 * count_fraction) as u32;
            let lifetime_max = lifetime_min + lifetime_extra;
            let mut particles = particle_system(capacity, seed);

            // 先占用一部分槽位并推进时间，使它们不再是"新鲜"的
            particles.emit(&spark(warm, 5.0, 6.0));
            particles.update(0.01);

            let start = particles.cursor();
            particles.emit(&spark(count, lifetime_min, lifetime_max));

            let lives = particles.lives();
            let fresh = lives.iter().filter(|l| l.x == 0.0 && l.x < l.y).count();
            prop_assert_eq!(fresh, count as usize);
            for j in 0..count {
                let slot = ((start + j) % capacity) as usize;
                prop_assert_eq!(lives[slot].x, 0.0);
                prop_assert!(lives[slot].y >= lifetime_min && lives[slot].y <= lifetime_max);
            }
            prop_assert_eq!(particles.cursor(), (start + count) % capacity);
        }

        #[test]
        fn alpha_never_increases_and_fades_out(
            count in 1u32..64,
            deltas in prop::collection::vec(0.001f32..0.2, 1..60),
            seed in any::<u64>(),
        ) {
            let mut particles = particle_system(64, seed);
            particles.emit(&spark(count, 0.2, 0.5));

            let mut previous: Vec<f32> = particles.colors().iter().map(|c| c.w).collect();
            for delta in deltas {
                particles.update(delta);
                for slot in 0..count as usize {
                    let alpha = particles.colors()[slot].w;
                    prop_assert!(alpha <= previous[slot]);
                    let life = particles.lives()[slot];
                    if life.x >= life.y {
                        prop_assert!(alpha <= 1e-6);
                    }
                    previous[slot] = alpha;
                }
            }
        }

        #[test]
        fn full_capacity_emission_overwrites_in_place(
            capacity in 1u32..256,
            seed in any::<u64>(),
        ) {
            let mut particles = particle_system(capacity, seed);
            let first = spark(capacity, 1.0, 2.0);
            let second = EmitterParams {
                position: Vec3::new(100.0, 50.0, -100.0),
                ..first
            };

            particles.emit(&first);
            let cursor_after_first = particles.cursor();
            particles.emit(&second);

            prop_assert_eq!(particles.cursor(), cursor_after_first);
            prop_assert_eq!(particles.alive_count(), capacity as usize);
            for position in particles.positions() {
                prop_assert!((*position - second.position).abs().max_element() <= 0.05 + 1e-4);
            }
        }

        #[test]
        fn no_dispatch_after_active_window(
            lifetime in 0.05f32..1.0,
            step in 0.005f32..0.05,
            extra_frames in 1usize..30,
            seed in any::<u64>(),
        ) {
            let mut particles = particle_system(32, seed);
            particles.emit(&spark(16, lifetime * 0.5, lifetime));

            let mut elapsed = 0.0f64;
            while elapsed <= (lifetime + 0.15) as f64 + 1e-3 {
                particles.update(step);
                elapsed += step as f64;
            }

            let dispatches = particles.stats().dispatches;
            for _ in 0..extra_frames {
                particles.update(step);
            }
            prop_assert_eq!(particles.stats().dispatches, dispatches);
            prop_assert_eq!(particles.alive_count(), 0);
        }

        #[test]
        fn rain_stays_around_camera(path in camera_path(), wind in 0.0f32..5.0, seed in any::<u64>()) {
            let context = FxContext::default().shared();
            context.set_wind(Vec3::new(1.0, 0.0, 0.5), wind);
            let config = RainConfig { count: 128, seed: Some(seed), ..Default::default() };
            let mut rain = RainField::new(config, context.clone(), &ComputeBackend::Host).unwrap();
            rain.set_visible(true);
            let half = rain.config().half_extents();

            for (camera, delta) in path {
                context.set_camera_position(camera);
                rain.update(delta);
                for p in rain.positions() {
                    prop_assert!((p.x - camera.x).abs() <= half.x + 1e-3);
                    prop_assert!((p.z - camera.z).abs() <= half.z + 1e-3);
                }
            }
        }

        #[test]
        fn sand_stays_around_camera(path in camera_path(), seed in any::<u64>()) {
            let context = SharedContext::default();
            let config = SandConfig { count: 128, seed: Some(seed), ..Default::default() };
            let mut sand = SandField::new(config, context.clone(), &ComputeBackend::Host).unwrap();
            sand.set_visible(true);
            let half = sand.config().half_extents();
            let height = sand.config().area.y;

            for (camera, delta) in path {
                context.set_camera_position(camera);
                sand.update(delta);
                for p in sand.positions() {
                    prop_assert!((p.x - camera.x).abs() <= half.x + 1e-3);
                    prop_assert!((p.z - camera.z).abs() <= half.z + 1e-3);
                    prop_assert!(p.y >= 0.0 && p.y <= height + 1e-3);
                }
            }
        }

        #[test]
        fn debris_stays_around_camera(path in camera_path(), seed in any::<u64>()) {
            let context = SharedContext::default();
            let config = DebrisConfig { count: 64, seed: Some(seed), ..Default::default() };
            let mut debris = DebrisField::new(config, context.clone(), &ComputeBackend::Host).unwrap();
            debris.set_visible(true);
            let half = debris.config().half_extent;

            for (camera, delta) in path {
                context.set_camera_position(camera);
                debris.update(delta);
                for p in debris.positions() {
                    prop_assert!((p.x - camera.x).abs() <= half + 1e-3);
                    prop_assert!(p.y >= 0.0);
                }
            }
        }
    }
}
