//! 属性缓冲区
//!
//! 一个粒子属性（位置、速度、颜色、大小、生命）的定长数组。主机端可随机写入，
//! 写入的槽位区间被记为脏区，下一次调度前由计算后端上传到设备端镜像。
//! 容量在构造时确定，之后不可改变。

use bytemuck::Pod;
use std::ops::Range;

/// 定长、定步长的属性数组
///
/// 越界索引属于调用方的编程错误：debug 构建下立即断言失败。
#[derive(Debug, Clone)]
pub struct AttributeBuffer<T: Pod> {
    label: &'static str,
    data: Vec<T>,
    /// 待上传的槽位区间（按写入顺序，相邻写入合并）
    dirty: Vec<Range<usize>>,
}

impl<T: Pod> AttributeBuffer<T> {
    /// 创建属性缓冲区
    ///
    /// # 参数
    ///
    /// * `label` - 调试标签，同时用作设备端缓冲区标签
    /// * `capacity` - 元素个数（必须大于 0）
    /// * `fill` - 初始值
    ///
    /// # 返回
    ///
    /// 新建的缓冲区整体为脏，首次调度时会整体上传。
    pub fn new(label: &'static str, capacity: usize, fill: T) -> Self {
        assert!(capacity > 0, "attribute buffer `{label}` needs a non-zero capacity");
        Self {
            label,
            data: vec![fill; capacity],
            dirty: vec![0..capacity],
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// 元素个数（构造后不变）
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// 单个元素的字节步长
    pub fn stride(&self) -> usize {
        std::mem::size_of::<T>()
    }

    /// 总字节数
    pub fn byte_size(&self) -> u64 {
        (self.stride() * self.capacity()) as u64
    }

    /// 读取一个元素
    #[inline]
    pub fn get(&self, index: usize) -> T {
        debug_assert!(
            index < self.data.len(),
            "attribute `{}` index {index} out of range (capacity {})",
            self.label,
            self.data.len()
        );
        self.data[index]
    }

    /// 主机端写入一个元素并记录脏区
    #[inline]
    pub fn set(&mut self, index: usize, value: T) {
        debug_assert!(
            index < self.data.len(),
            "attribute `{}` index {index} out of range (capacity {})",
            self.label,
            self.data.len()
        );
        self.data[index] = value;
        match self.dirty.last_mut() {
            Some(last) if last.end == index => last.end += 1,
            Some(last) if last.contains(&index) => {}
            _ => self.dirty.push(index..index + 1),
        }
    }

    /// 只读视图，供渲染层绑定
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// 字节视图
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// 某个槽位区间的字节偏移与内容，供 `Queue::write_buffer` 使用
    pub fn range_bytes(&self, range: Range<usize>) -> (u64, &[u8]) {
        let offset = (range.start * self.stride()) as u64;
        (offset, bytemuck::cast_slice(&self.data[range]))
    }

    /// 设备端视图
    ///
    /// 主机执行器把主机数组当作设备内存直接读写，这类写入不需要再上传，
    /// 因此不会产生脏区。
    pub(crate) fn device_view_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// 将整个缓冲区标记为脏
    pub fn mark_dirty(&mut self) {
        self.dirty.clear();
        self.dirty.push(0..self.data.len());
    }

    /// 取出并清空脏区
    pub fn take_dirty(&mut self) -> Vec<Range<usize>> {
        std::mem::take(&mut self.dirty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec3, Vec4};

    #[test]
    fn test_new_buffer_is_dirty() {
        let mut buffer = AttributeBuffer::new("position", 8, Vec3::ZERO);
        assert_eq!(buffer.capacity(), 8);
        assert_eq!(buffer.take_dirty(), vec![0..8]);
        assert!(!buffer.is_dirty());
    }

    #[test]
    fn test_set_records_dirty_ranges() {
        let mut buffer = AttributeBuffer::new("color", 10, Vec4::ONE);
        buffer.take_dirty();

        buffer.set(7, Vec4::ZERO);
        buffer.set(8, Vec4::ZERO);
        buffer.set(9, Vec4::ZERO);
        buffer.set(0, Vec4::ZERO);
        buffer.set(1, Vec4::ZERO);
        assert_eq!(buffer.take_dirty(), vec![7..10, 0..2]);
        assert_eq!(buffer.get(9), Vec4::ZERO);
        assert_eq!(buffer.get(5), Vec4::ONE);
    }

    #[test]
    fn test_device_writes_stay_clean() {
        let mut buffer = AttributeBuffer::new("life", 2, Vec4::ZERO);
        buffer.take_dirty();
        buffer.device_view_mut()[1] = Vec4::ONE;
        assert!(!buffer.is_dirty());
        assert_eq!(buffer.get(1), Vec4::ONE);
    }

    #[test]
    fn test_byte_layout() {
        let buffer = AttributeBuffer::new("position", 10, Vec3::ZERO);
        assert_eq!(buffer.stride(), 12);
        assert_eq!(buffer.byte_size(), 120);
        assert_eq!(buffer.as_bytes().len(), 120);

        let (offset, bytes) = buffer.range_bytes(3..5);
        assert_eq!(offset, 36);
        assert_eq!(bytes.len(), 24);
    }

    #[test]
    #[should_panic]
    fn test_zero_capacity_panics() {
        let _ = AttributeBuffer::new("empty", 0, 0.0f32);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn test_out_of_range_write_panics() {
        let mut buffer = AttributeBuffer::new("size", 2, [0.0f32; 2]);
        buffer.set(2, [1.0, 1.0]);
    }
}
