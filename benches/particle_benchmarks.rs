//! 粒子与天气场性能基准测试
//!
//! 测试发射、主机内核调度和天气场更新的性能

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use game_engine_fx::config::{ParticleSystemConfig, RainConfig, SandConfig};
use game_engine_fx::core::SharedContext;
use game_engine_fx::render::compute::ComputeBackend;
use game_engine_fx::render::particles::{EffectKind, ParticleSystem};
use game_engine_fx::render::weather::{RainField, SandField, WeatherField};
use glam::Vec3;
use std::hint::black_box;

fn particles(capacity: u32) -> ParticleSystem {
    let config = ParticleSystemConfig {
        seed: Some(1),
        ..ParticleSystemConfig::with_capacity(capacity)
    };
    ParticleSystem::new(config, &ComputeBackend::Host).unwrap()
}

fn bench_emit(c: &mut Criterion) {
    let mut group = c.benchmark_group("particle_emit");

    for count in [16u32, 256, 4096].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let mut system = particles(10_000);
            b.iter(|| {
                system.emit_effect(EffectKind::Spark, black_box(Vec3::ZERO), Vec3::Y, count);
            });
        });
    }

    group.bench_function("blood_composite_100", |b| {
        let mut system = particles(10_000);
        b.iter(|| {
            system.emit_effect(EffectKind::Blood, black_box(Vec3::ZERO), Vec3::X, 100);
        });
    });

    group.finish();
}

fn bench_host_kernel(c: &mut Criterion) {
    let mut group = c.benchmark_group("particle_host_kernel");

    for capacity in [1_000u32, 10_000, 100_000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            capacity,
            |b, &capacity| {
                let mut system = particles(capacity);
                b.iter(|| {
                    // 每轮重新发射保持活跃窗口打开
                    system.emit_effect(EffectKind::Smoke, Vec3::ZERO, Vec3::Y, capacity);
                    system.update(black_box(1.0 / 60.0));
                });
            },
        );
    }

    group.finish();
}

fn bench_weather(c: &mut Criterion) {
    let mut group = c.benchmark_group("weather_update");

    group.bench_function("rain_20000", |b| {
        let config = RainConfig {
            seed: Some(1),
            ..Default::default()
        };
        let mut rain = RainField::new(config, SharedContext::default(), &ComputeBackend::Host).unwrap();
        rain.set_visible(true);
        b.iter(|| rain.update(black_box(1.0 / 60.0)));
    });

    group.bench_function("sand_12000", |b| {
        let config = SandConfig {
            seed: Some(1),
            ..Default::default()
        };
        let mut sand = SandField::new(config, SharedContext::default(), &ComputeBackend::Host).unwrap();
        sand.set_visible(true);
        b.iter(|| sand.update(black_box(1.0 / 60.0)));
    });

    group.finish();
}

criterion_group!(benches, bench_emit, bench_host_kernel, bench_weather);
criterion_main!(benches);
