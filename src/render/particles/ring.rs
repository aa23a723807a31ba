//! 环形游标
//!
//! 单调递增的写指针，对容量取模得到槽位。分配不看槽位是否仍存活，直接覆盖。

/// 环形分配游标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingCursor {
    head: u64,
    capacity: u32,
}

impl RingCursor {
    pub fn new(capacity: u32) -> Self {
        assert!(capacity > 0, "ring cursor needs a non-zero capacity");
        Self { head: 0, capacity }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// 下一个将被写入的槽位
    pub fn next_slot(&self) -> u32 {
        (self.head % self.capacity as u64) as u32
    }

    /// 累计分配次数
    pub fn total_claimed(&self) -> u64 {
        self.head
    }

    /// 申请 `count` 个连续槽位（取模回绕），游标随之前进
    pub fn claim(&mut self, count: u32) -> RingClaim {
        let claim = RingClaim {
            start: self.next_slot(),
            remaining: count,
            capacity: self.capacity,
        };
        self.head += count as u64;
        claim
    }
}

/// 一次申请得到的槽位序列
#[derive(Debug, Clone)]
pub struct RingClaim {
    start: u32,
    remaining: u32,
    capacity: u32,
}

impl RingClaim {
    /// 起始槽位
    pub fn start(&self) -> u32 {
        self.start
    }
}

impl Iterator for RingClaim {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let slot = self.start as usize;
        self.start = (self.start + 1) % self.capacity;
        self.remaining -= 1;
        Some(slot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining as usize, Some(self.remaining as usize))
    }
}

impl ExactSizeIterator for RingClaim {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_wraps() {
        let mut ring = RingCursor::new(5);
        let first: Vec<_> = ring.claim(3).collect();
        assert_eq!(first, vec![0, 1, 2]);

        let second: Vec<_> = ring.claim(4).collect();
        assert_eq!(second, vec![3, 4, 0, 1]);
        assert_eq!(ring.next_slot(), 2);
        assert_eq!(ring.total_claimed(), 7);
    }

    #[test]
    fn test_claim_larger_than_capacity() {
        let mut ring = RingCursor::new(3);
        let slots: Vec<_> = ring.claim(7).collect();
        assert_eq!(slots, vec![0, 1, 2, 0, 1, 2, 0]);
        assert_eq!(ring.next_slot(), 1);
    }

    #[test]
    fn test_zero_claim_keeps_cursor() {
        let mut ring = RingCursor::new(4);
        ring.claim(2);
        assert_eq!(ring.claim(0).len(), 0);
        assert_eq!(ring.next_slot(), 2);
    }
}
