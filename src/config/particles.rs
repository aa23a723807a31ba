use super::{validate_positive, ConfigError, ConfigResult};
use crate::impl_default;
use serde::{Deserialize, Serialize};

/// 通用粒子池配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticleSystemConfig {
    /// 最大粒子数（所有属性缓冲区的固定长度）
    pub max_particles: u32,

    /// 活跃窗口余量（秒），加在本次发射的最长寿命之后
    pub idle_margin: f32,

    /// 地面高度，低于此值的粒子被夹紧并反弹
    pub ground_y: f32,

    /// 反弹时保留的竖直速度比例（再乘以阻力）
    pub bounce_damping: f32,

    /// 计算着色器工作组大小
    pub workgroup_size: u32,

    /// 主机端发射采样的随机种子（None = 使用系统熵）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl_default!(ParticleSystemConfig {
    max_particles: 10_000,
    idle_margin: 0.15,
    ground_y: 0.05,
    bounce_damping: 0.3,
    workgroup_size: 64,
    seed: None,
});

impl ParticleSystemConfig {
    /// 指定容量的默认配置
    pub fn with_capacity(max_particles: u32) -> Self {
        Self {
            max_particles,
            ..Default::default()
        }
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_particles == 0 {
            return Err(ConfigError::ValidationError(
                "particles.max_particles must be > 0".to_string(),
            ));
        }
        if self.workgroup_size == 0 {
            return Err(ConfigError::ValidationError(
                "particles.workgroup_size must be > 0".to_string(),
            ));
        }
        if !(self.idle_margin.is_finite() && self.idle_margin >= 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "particles.idle_margin must be >= 0, got {}",
                self.idle_margin
            )));
        }
        validate_positive("particles.bounce_damping", self.bounce_damping)?;
        if !self.ground_y.is_finite() {
            return Err(ConfigError::ValidationError(
                "particles.ground_y must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_tuned_constants() {
        let config = ParticleSystemConfig::default();
        assert_eq!(config.idle_margin, 0.15);
        assert_eq!(config.ground_y, 0.05);
        assert_eq!(config.bounce_damping, 0.3);
    }

    #[test]
    fn test_negative_margin_rejected() {
        let config = ParticleSystemConfig {
            idle_margin: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
