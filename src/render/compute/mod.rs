//! 计算后端
//!
//! 每个粒子系统每帧最多发出一次调度。调度在哪里执行由 [`ComputeBackend`] 决定：
//!
//! - `Host`：在 CPU 上用 rayon 逐槽位并行执行内核，主机数组即设备内存。
//!   测试和无头工具使用这一后端。
//! - `Wgpu`：属性缓冲区在设备端各有一份存储缓冲区镜像，调度前上传脏区，
//!   编码一个计算通道后提交，不等待完成，也不回读。

pub mod kernel;

pub use kernel::{GpuKernel, StorageBinding};

use crate::core::error::{DeviceError, DeviceResult, FxResult};
use std::sync::Arc;

/// 无头 wgpu 设备与队列
#[derive(Clone)]
pub struct GpuContext {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    adapter_name: String,
}

impl GpuContext {
    /// 请求一个无头设备（阻塞）
    pub fn request() -> DeviceResult<Self> {
        pollster::block_on(Self::request_async())
    }

    /// 请求一个无头设备
    ///
    /// # 返回
    ///
    /// 没有可用适配器时返回 `DeviceError::NoAdapter`。
    pub async fn request_async() -> DeviceResult<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(DeviceError::NoAdapter)?;

        let info = adapter.get_info();
        if !adapter
            .get_downlevel_capabilities()
            .flags
            .contains(wgpu::DownlevelFlags::COMPUTE_SHADERS)
        {
            return Err(DeviceError::Unsupported(info.name));
        }

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("FX Compute Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .map_err(|e| DeviceError::DeviceRequest(e.to_string()))?;

        tracing::info!(
            target: "fx.compute",
            adapter = %info.name,
            backend = ?info.backend,
            "Compute device ready"
        );

        Ok(Self {
            device: Arc::new(device),
            queue: Arc::new(queue),
            adapter_name: info.name,
        })
    }

    /// 复用渲染层已经创建的设备
    pub fn from_parts(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        Self {
            device,
            queue,
            adapter_name: String::from("shared"),
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn adapter_name(&self) -> &str {
        &self.adapter_name
    }
}

impl std::fmt::Debug for GpuContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuContext")
            .field("adapter_name", &self.adapter_name)
            .finish()
    }
}

/// 内核执行位置
#[derive(Debug, Clone, Default)]
pub enum ComputeBackend {
    /// CPU 并行执行
    #[default]
    Host,
    /// wgpu 计算着色器
    Wgpu(GpuContext),
}

impl ComputeBackend {
    /// 请求 GPU 后端，没有可用设备时返回 `FxError::Device`
    pub fn gpu() -> FxResult<Self> {
        Ok(Self::Wgpu(GpuContext::request()?))
    }

    /// 优先使用 GPU，请求失败时退回主机执行
    pub fn gpu_or_host() -> Self {
        match Self::gpu() {
            Ok(backend) => backend,
            Err(e) => {
                tracing::warn!(
                    target: "fx.compute",
                    error = %e,
                    "GPU compute unavailable, falling back to host kernels"
                );
                Self::Host
            }
        }
    }

    pub fn is_gpu(&self) -> bool {
        matches!(self, Self::Wgpu(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Wgpu(_) => "wgpu",
        }
    }
}

/// 覆盖 `invocations` 个槽位所需的工作组数
#[inline]
pub fn workgroup_count(invocations: u32, workgroup_size: u32) -> u32 {
    invocations.div_ceil(workgroup_size.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_backend_is_host() {
        let backend = ComputeBackend::default();
        assert!(!backend.is_gpu());
        assert_eq!(backend.name(), "host");
    }

    #[test]
    fn test_workgroup_count() {
        assert_eq!(workgroup_count(100, 64), 2);
        assert_eq!(workgroup_count(128, 64), 2);
        assert_eq!(workgroup_count(1, 256), 1);
        assert_eq!(workgroup_count(0, 64), 0);
    }
}
