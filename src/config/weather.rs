use super::{validate_positive, validate_range, ConfigError, ConfigResult};
use crate::impl_default;
use glam::Vec3;
use serde::{Deserialize, Serialize};

fn validate_count(name: &str, count: u32) -> ConfigResult<()> {
    if count == 0 {
        return Err(ConfigError::ValidationError(format!(
            "{name}.count must be > 0"
        )));
    }
    Ok(())
}

fn validate_workgroup(name: &str, workgroup_size: u32) -> ConfigResult<()> {
    if workgroup_size == 0 {
        return Err(ConfigError::ValidationError(format!(
            "{name}.workgroup_size must be > 0"
        )));
    }
    Ok(())
}

/// 雨配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RainConfig {
    /// 雨滴数量
    pub count: u32,
    /// 跟随相机的盒子尺寸（宽、高、深）
    pub area: Vec3,
    /// 下落速度范围
    pub speed_min: f32,
    pub speed_max: f32,
    /// 低于 `camera.y - drop_below` 时重生
    pub drop_below: f32,
    /// 计算着色器工作组大小
    pub workgroup_size: u32,
    /// 生成采样的随机种子
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl_default!(RainConfig {
    count: 20_000,
    area: Vec3::new(200.0, 50.0, 200.0),
    speed_min: 18.0,
    speed_max: 28.0,
    drop_below: 5.0,
    workgroup_size: 256,
    seed: None,
});

impl RainConfig {
    pub fn half_extents(&self) -> Vec3 {
        self.area * 0.5
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        validate_count("rain", self.count)?;
        validate_workgroup("rain", self.workgroup_size)?;
        validate_positive("rain.area.x", self.area.x)?;
        validate_positive("rain.area.y", self.area.y)?;
        validate_positive("rain.area.z", self.area.z)?;
        validate_range("rain.speed", self.speed_min, self.speed_max)?;
        validate_positive("rain.drop_below", self.drop_below)?;
        Ok(())
    }
}

/// 沙尘配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandConfig {
    /// 沙粒数量
    pub count: u32,
    /// 跟随相机的盒子尺寸；高度从地面 y=0 起算
    pub area: Vec3,
    /// +X 漂移速度范围
    pub speed_min: f32,
    pub speed_max: f32,
    /// 阵风相位推进速度（弧度/秒）
    pub gust_frequency: f32,
    /// 阵风倍率振幅：`1 + sin(phase) * gust_amplitude`
    pub gust_amplitude: f32,
    /// 竖直抖动振幅
    pub flutter_amplitude: f32,
    /// 重生时 Y 落在高度的下部比例内
    pub lower_fraction: f32,
    /// 计算着色器工作组大小
    pub workgroup_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl_default!(SandConfig {
    count: 12_000,
    area: Vec3::new(120.0, 12.0, 120.0),
    speed_min: 6.0,
    speed_max: 14.0,
    gust_frequency: 0.6,
    gust_amplitude: 0.3,
    flutter_amplitude: 0.5,
    lower_fraction: 0.7,
    workgroup_size: 256,
    seed: None,
});

impl SandConfig {
    pub fn half_extents(&self) -> Vec3 {
        self.area * 0.5
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        validate_count("sand", self.count)?;
        validate_workgroup("sand", self.workgroup_size)?;
        validate_positive("sand.area.x", self.area.x)?;
        validate_positive("sand.area.y", self.area.y)?;
        validate_positive("sand.area.z", self.area.z)?;
        validate_range("sand.speed", self.speed_min, self.speed_max)?;
        if !(self.lower_fraction > 0.0 && self.lower_fraction <= 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "sand.lower_fraction must be in (0, 1], got {}",
                self.lower_fraction
            )));
        }
        Ok(())
    }
}

/// 碎屑配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebrisConfig {
    /// 碎屑数量
    pub count: u32,
    /// X/Z 方向的半宽：生成范围和环绕阈值
    pub half_extent: f32,
    /// 生成/重生的最大高度
    pub spawn_height: f32,
    /// 天花板高度，超过后竖直速度反向
    pub ceiling: f32,
    /// +X 漂移速度范围
    pub speed_min: f32,
    pub speed_max: f32,
    /// 阵风相位推进速度
    pub gust_frequency: f32,
    /// 阵风强度：`1 + sin(phase) * gust_strength`
    pub gust_strength: f32,
    /// 每粒子旋涡相位推进速度
    pub rotation_speed: f32,
    /// 旋涡竖直振幅
    pub swirl_amplitude: f32,
    /// 计算着色器工作组大小
    pub workgroup_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl_default!(DebrisConfig {
    count: 800,
    half_extent: 40.0,
    spawn_height: 20.0,
    ceiling: 25.0,
    speed_min: 4.0,
    speed_max: 10.0,
    gust_frequency: 0.5,
    gust_strength: 0.5,
    rotation_speed: 2.0,
    swirl_amplitude: 2.0,
    workgroup_size: 64,
    seed: None,
});

impl DebrisConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        validate_count("debris", self.count)?;
        validate_workgroup("debris", self.workgroup_size)?;
        validate_positive("debris.half_extent", self.half_extent)?;
        validate_positive("debris.spawn_height", self.spawn_height)?;
        validate_range("debris.speed", self.speed_min, self.speed_max)?;
        if self.ceiling < self.spawn_height {
            return Err(ConfigError::ValidationError(format!(
                "debris.ceiling ({}) must not be below spawn_height ({})",
                self.ceiling, self.spawn_height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_defaults_validate() {
        assert!(RainConfig::default().validate().is_ok());
        assert!(SandConfig::default().validate().is_ok());
        assert!(DebrisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rain_half_extents() {
        let rain = RainConfig::default();
        assert_eq!(rain.half_extents(), Vec3::new(100.0, 25.0, 100.0));
    }

    #[test]
    fn test_inverted_speed_range_rejected() {
        let sand = SandConfig {
            speed_min: 10.0,
            speed_max: 2.0,
            ..Default::default()
        };
        assert!(sand.validate().is_err());
    }

    #[test]
    fn test_debris_ceiling_below_spawn_rejected() {
        let debris = DebrisConfig {
            ceiling: 10.0,
            ..Default::default()
        };
        assert!(debris.validate().is_err());
    }

    #[test]
    fn test_zero_workgroup_size_rejected() {
        let rain = RainConfig {
            workgroup_size: 0,
            ..Default::default()
        };
        let sand = SandConfig {
            workgroup_size: 0,
            ..Default::default()
        };
        let debris = DebrisConfig {
            workgroup_size: 0,
            ..Default::default()
        };
        for result in [rain.validate(), sand.validate(), debris.validate()] {
            assert!(matches!(
                result,
                Err(ConfigError::ValidationError(msg)) if msg.contains("workgroup_size")
            ));
        }
    }
}
