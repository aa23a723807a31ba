use game_engine_fx::core::init_logging;
use game_engine_fx::render::{ComputeBackend, EffectKind, EffectsDirector, WeatherField, WeatherKind};
use game_engine_fx::{FxConfig, FxResult};
use glam::Vec3;

/// 无头运行若干帧并输出统计
fn run() -> FxResult<()> {
    let mut config = FxConfig::load_or_default();
    config.apply_env_overrides();
    init_logging(&config.logging);

    let mut director = EffectsDirector::new(&config, ComputeBackend::gpu_or_host())?;
    director.set_weather(WeatherKind::Rain);

    let delta = 1.0 / 60.0;
    for frame in 0..600u32 {
        if frame % 60 == 0 {
            director.emit_effect(EffectKind::Spark, Vec3::new(0.0, 1.0, 0.0), Vec3::Y, 32);
        }
        if frame == 300 {
            director.emit_effect(EffectKind::Explosion, Vec3::new(5.0, 0.0, 5.0), Vec3::Y, 200);
            director.set_weather(WeatherKind::Sandstorm);
        }
        director.set_camera_position(Vec3::new(frame as f32 * 0.05, 1.7, 0.0));
        director.update(delta);
    }

    let stats = director.particles().stats();
    tracing::info!(
        target: "fx",
        dispatches = stats.dispatches,
        skipped = stats.skipped_frames,
        emitted = stats.total_emitted,
        rain_dispatches = director.rain().stats().dispatches,
        sand_dispatches = director.sand().stats().dispatches,
        "Simulation finished"
    );

    director.dispose();
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("FX simulation failed: {}", e);
        std::process::exit(1);
    }
}
