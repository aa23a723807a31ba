//! ECS 集成
//!
//! 玩法系统把发射请求和天气切换写入资源，由本模块的系统在帧内统一应用：
//! 先切换天气，再应用发射，最后推进模拟。发射总是先于同一帧的调度。

use crate::render::director::EffectsDirector;
use crate::render::particles::{EffectKind, EmitterParams};
use crate::render::weather::WeatherKind;
use bevy_ecs::prelude::*;
use glam::Vec3;

/// 帧时间
#[derive(Resource, Debug, Clone, Copy)]
pub struct FxTime {
    pub delta_seconds: f32,
}

impl Default for FxTime {
    fn default() -> Self {
        Self {
            delta_seconds: 1.0 / 60.0,
        }
    }
}

/// 发射请求
#[derive(Debug, Clone, Copy)]
pub enum EmitRequest {
    /// 直接给出参数
    Params(EmitterParams),
    /// 按预设发射
    Effect {
        kind: EffectKind,
        origin: Vec3,
        direction: Vec3,
        count: u32,
    },
}

/// 本帧待处理的发射请求
#[derive(Resource, Debug, Default)]
pub struct EmitQueue {
    requests: Vec<EmitRequest>,
}

impl EmitQueue {
    pub fn push(&mut self, request: EmitRequest) {
        self.requests.push(request);
    }

    pub fn effect(&mut self, kind: EffectKind, origin: Vec3, direction: Vec3, count: u32) {
        self.push(EmitRequest::Effect {
            kind,
            origin,
            direction,
            count,
        });
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

/// 待应用的天气切换
#[derive(Resource, Debug, Default)]
pub struct WeatherRequest(pub Option<WeatherKind>);

/// 应用天气切换
pub fn fx_weather_system(mut request: ResMut<WeatherRequest>, mut director: ResMut<EffectsDirector>) {
    if let Some(kind) = request.0.take() {
        director.set_weather(kind);
    }
}

/// 应用本帧所有发射请求
pub fn fx_emit_system(mut queue: ResMut<EmitQueue>, mut director: ResMut<EffectsDirector>) {
    for request in queue.requests.drain(..) {
        match request {
            EmitRequest::Params(params) => director.emit(&params),
            EmitRequest::Effect {
                kind,
                origin,
                direction,
                count,
            } => director.emit_effect(kind, origin, direction, count),
        }
    }
}

/// 推进所有特效系统
pub fn fx_update_system(time: Res<FxTime>, mut director: ResMut<EffectsDirector>) {
    director.update(time.delta_seconds);
}

/// 注册特效系统到调度器
pub fn register_fx_systems(schedule: &mut Schedule) {
    schedule.add_systems((fx_weather_system, fx_emit_system, fx_update_system).chain());
}

/// 插入特效系统所需的资源
pub fn insert_fx_resources(world: &mut World, director: EffectsDirector) {
    world.insert_resource(director);
    world.insert_resource(FxTime::default());
    world.insert_resource(EmitQueue::default());
    world.insert_resource(WeatherRequest::default());
}
