//! 单个 WGSL 计算内核及其设备端缓冲区
//!
//! 绑定布局约定：`@binding(0)` 为 uniform 块，`@binding(1..)` 依次为存储缓冲区。

use super::{workgroup_count, GpuContext};
use crate::math::WGSL_RANDOM;
use crate::render::attribute::AttributeBuffer;
use bytemuck::Pod;
use wgpu::{BindGroup, Buffer, ComputePipeline};

/// 着色器源码中的工作组大小占位符
const WORKGROUP_SIZE_TOKEN: &str = "{{WORKGROUP_SIZE}}";

/// 拼接完整着色器源码：随机数辅助函数 + 内核主体，并替换工作组大小
pub fn shader_source(shader_body: &str, workgroup_size: u32) -> String {
    format!(
        "{WGSL_RANDOM}\n{}",
        shader_body.replace(WORKGROUP_SIZE_TOKEN, &workgroup_size.to_string())
    )
}

/// 存储缓冲区描述
#[derive(Debug, Clone, Copy)]
pub struct StorageBinding {
    pub label: &'static str,
    pub size: u64,
}

impl StorageBinding {
    /// 与属性缓冲区等大的存储绑定
    pub fn for_attribute<T: Pod>(attribute: &AttributeBuffer<T>) -> Self {
        Self {
            label: attribute.label(),
            size: attribute.byte_size(),
        }
    }
}

/// 计算内核
///
/// 持有管线、绑定组、uniform 缓冲区以及每个属性的存储缓冲区镜像。
/// 存储缓冲区同时带有 `VERTEX` 用途，渲染层可以直接绑定。
pub struct GpuKernel {
    context: GpuContext,
    label: &'static str,
    pipeline: ComputePipeline,
    bind_group: BindGroup,
    uniform_buffer: Buffer,
    storage_buffers: Vec<Buffer>,
    workgroup_size: u32,
}

impl GpuKernel {
    /// 创建计算内核
    ///
    /// # 参数
    ///
    /// * `context` - GPU 设备上下文
    /// * `label` - 调试标签
    /// * `shader_body` - WGSL 源码（入口为 `main`，可使用 `rand01`）
    /// * `uniform_size` - uniform 块字节数
    /// * `storage` - 存储缓冲区列表，顺序对应 `@binding(1..)`
    /// * `workgroup_size` - 工作组大小
    pub fn new(
        context: &GpuContext,
        label: &'static str,
        shader_body: &str,
        uniform_size: u64,
        storage: &[StorageBinding],
        workgroup_size: u32,
    ) -> Self {
        let device = context.device();

        let mut layout_entries = Vec::with_capacity(storage.len() + 1);
        layout_entries.push(wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(uniform_size),
            },
            count: None,
        });
        for (i, _) in storage.iter().enumerate() {
            layout_entries.push(wgpu::BindGroupLayoutEntry {
                binding: i as u32 + 1,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: false },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            });
        }

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &layout_entries,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: uniform_size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let storage_buffers: Vec<Buffer> = storage
            .iter()
            .map(|binding| {
                device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(binding.label),
                    size: binding.size,
                    usage: wgpu::BufferUsages::STORAGE
                        | wgpu::BufferUsages::COPY_DST
                        | wgpu::BufferUsages::VERTEX,
                    mapped_at_creation: false,
                })
            })
            .collect();

        let mut group_entries = Vec::with_capacity(storage_buffers.len() + 1);
        group_entries.push(wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform_buffer.as_entire_binding(),
        });
        for (i, buffer) in storage_buffers.iter().enumerate() {
            group_entries.push(wgpu::BindGroupEntry {
                binding: i as u32 + 1,
                resource: buffer.as_entire_binding(),
            });
        }

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &bind_group_layout,
            entries: &group_entries,
        });

        let source = shader_source(shader_body, workgroup_size);
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(label),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(label),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: "main",
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        });

        tracing::debug!(
            target: "fx.compute",
            kernel = label,
            storage_buffers = storage_buffers.len(),
            workgroup_size,
            "Compute kernel created"
        );

        Self {
            context: context.clone(),
            label,
            pipeline,
            bind_group,
            uniform_buffer,
            storage_buffers,
            workgroup_size,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// 第 `slot` 个存储缓冲区（与构造时顺序一致）
    pub fn storage_buffer(&self, slot: usize) -> Option<&Buffer> {
        self.storage_buffers.get(slot)
    }

    /// 上传属性缓冲区的脏区
    pub fn upload<T: Pod>(&self, slot: usize, attribute: &mut AttributeBuffer<T>) {
        let Some(buffer) = self.storage_buffers.get(slot) else {
            return;
        };
        for range in attribute.take_dirty() {
            let (offset, bytes) = attribute.range_bytes(range);
            self.context.queue().write_buffer(buffer, offset, bytes);
        }
    }

    /// 写入 uniform 块
    pub fn write_uniforms<U: Pod>(&self, uniforms: &U) {
        self.context
            .queue()
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    /// 编码一个计算通道并提交
    ///
    /// 之前的 `write_buffer` 在队列上先于本次提交执行。提交后立即返回。
    pub fn dispatch(&self, invocations: u32) {
        let mut encoder = self
            .context
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some(self.label),
            });

        {
            let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(self.label),
                timestamp_writes: None,
            });
            cpass.set_pipeline(&self.pipeline);
            cpass.set_bind_group(0, &self.bind_group, &[]);
            cpass.dispatch_workgroups(workgroup_count(invocations, self.workgroup_size), 1, 1);
        }

        self.context.queue().submit(std::iter::once(encoder.finish()));
    }
}

impl Drop for GpuKernel {
    fn drop(&mut self) {
        for buffer in &self.storage_buffers {
            buffer.destroy();
        }
        self.uniform_buffer.destroy();
    }
}

/// 用 naga 解析并验证 WGSL，失败时带着标签和错误信息 panic
#[cfg(test)]
pub(crate) fn assert_valid_wgsl(label: &str, source: &str) {
    let module = naga::front::wgsl::parse_str(source)
        .unwrap_or_else(|e| panic!("{label}: WGSL parse error:\n{}", e.emit_to_string(source)));
    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    if let Err(e) = validator.validate(&module) {
        panic!("{label}: WGSL validation error: {e:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_source_replaces_workgroup_token() {
        let body = "@compute @workgroup_size({{WORKGROUP_SIZE}})\nfn main() {}\n";
        let source = shader_source(body, 128);
        assert!(source.contains("@workgroup_size(128)"));
        assert!(!source.contains(WORKGROUP_SIZE_TOKEN));
        assert!(source.starts_with(WGSL_RANDOM));
    }

    #[test]
    fn test_random_helpers_validate() {
        let body = "@compute @workgroup_size({{WORKGROUP_SIZE}})\nfn main() {}\n";
        assert_valid_wgsl("random helpers", &shader_source(body, 64));
    }
}
