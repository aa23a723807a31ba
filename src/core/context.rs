//! 帧上下文
//!
//! 显式构造的共享状态（相机位置、风），在构造时注入每个天气场，
//! 每次 `update()` 读取一次快照。取代全局可变的 uniform 单例。

use glam::Vec3;
use std::sync::{Arc, RwLock};

/// 每帧共享的环境状态
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FxContext {
    /// 相机世界坐标
    pub camera_position: Vec3,
    /// 风向（仅使用 XZ 分量）
    pub wind_direction: Vec3,
    /// 风力
    pub wind_strength: f32,
}

impl Default for FxContext {
    fn default() -> Self {
        Self {
            camera_position: Vec3::ZERO,
            wind_direction: Vec3::X,
            wind_strength: 0.0,
        }
    }
}

impl FxContext {
    pub fn new(camera_position: Vec3) -> Self {
        Self {
            camera_position,
            ..Default::default()
        }
    }

    /// 水平风速 `windDirection_xz * windStrength * 2`
    pub fn horizontal_wind(&self) -> Vec3 {
        Vec3::new(self.wind_direction.x, 0.0, self.wind_direction.z) * self.wind_strength * 2.0
    }

    /// 包装为可共享句柄
    pub fn shared(self) -> SharedContext {
        SharedContext::new(self)
    }
}

/// 注入各系统的共享上下文句柄
///
/// 只有场景驱动在帧之间写入；系统在 `update()` 开头取一次快照。
#[derive(Debug, Clone, Default)]
pub struct SharedContext {
    inner: Arc<RwLock<FxContext>>,
}

impl SharedContext {
    pub fn new(context: FxContext) -> Self {
        Self {
            inner: Arc::new(RwLock::new(context)),
        }
    }

    /// 读取当前快照
    pub fn snapshot(&self) -> FxContext {
        match self.inner.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// 修改上下文
    pub fn update<F: FnOnce(&mut FxContext)>(&self, f: F) {
        match self.inner.write() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }

    pub fn set_camera_position(&self, position: Vec3) {
        self.update(|ctx| ctx.camera_position = position);
    }

    pub fn set_wind(&self, direction: Vec3, strength: f32) {
        self.update(|ctx| {
            ctx.wind_direction = direction;
            ctx.wind_strength = strength;
        });
    }
}
