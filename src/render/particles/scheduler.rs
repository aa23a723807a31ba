//! 空闲调度
//!
//! 记录一个"活跃窗口"：最后一批粒子可能仍然可见的截止时间。窗口结束后，
//! `update()` 不再发出调度，直到下一次发射。

/// 本帧的调度决定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchDecision {
    /// 尚未发射过：无条件调度一次，用于资源/管线预热
    WarmUp,
    /// 活跃窗口内：正常调度
    Dispatch,
    /// 活跃窗口已结束：跳过
    Skip,
}

impl DispatchDecision {
    pub fn dispatches(&self) -> bool {
        !matches!(self, DispatchDecision::Skip)
    }
}

/// 活跃窗口调度器
#[derive(Debug, Clone)]
pub struct IdleScheduler {
    now: f64,
    active_until: Option<f64>,
    margin: f64,
}

impl IdleScheduler {
    /// # 参数
    ///
    /// * `margin` - 加在最长寿命之后的余量（秒）
    pub fn new(margin: f32) -> Self {
        Self {
            now: 0.0,
            active_until: None,
            margin: margin as f64,
        }
    }

    /// 累计时间（秒）
    pub fn now(&self) -> f64 {
        self.now
    }

    /// 当前窗口的截止时间
    pub fn active_until(&self) -> Option<f64> {
        self.active_until
    }

    /// 记录一次发射：窗口延长到 `now + max_lifetime + margin`（只延长不缩短）
    pub fn note_emission(&mut self, max_lifetime: f32) {
        let candidate = self.now + max_lifetime as f64 + self.margin;
        match self.active_until {
            Some(until) if until >= candidate => {}
            _ => self.active_until = Some(candidate),
        }
    }

    /// 推进时间并决定本帧是否调度
    ///
    /// 以推进前的时间判断：窗口内开始的帧总会调度，即使 `delta` 跨过了截止时间，
    /// 粒子也能在这一帧被推进到寿命终点。
    pub fn advance(&mut self, delta: f32) -> DispatchDecision {
        let frame_start = self.now;
        self.now += delta as f64;
        match self.active_until {
            None => DispatchDecision::WarmUp,
            Some(until) if frame_start > until => DispatchDecision::Skip,
            Some(_) => DispatchDecision::Dispatch,
        }
    }

    /// 窗口是否仍然打开
    pub fn is_active(&self) -> bool {
        self.active_until.is_some_and(|until| self.now <= until)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warm_up_before_first_emission() {
        let mut scheduler = IdleScheduler::new(0.15);
        assert_eq!(scheduler.advance(0.016), DispatchDecision::WarmUp);
        assert!(scheduler.advance(0.016).dispatches());
        assert!(!scheduler.is_active());
    }

    #[test]
    fn test_window_closes_after_lifetime_plus_margin() {
        let mut scheduler = IdleScheduler::new(0.15);
        scheduler.note_emission(0.5);

        assert_eq!(scheduler.advance(0.5), DispatchDecision::Dispatch);
        assert_eq!(scheduler.advance(0.1), DispatchDecision::Dispatch);
        // 本帧从 0.6 开始，仍在窗口内
        assert_eq!(scheduler.advance(0.1), DispatchDecision::Dispatch);
        assert_eq!(scheduler.advance(1.0), DispatchDecision::Skip);
        assert!(!scheduler.is_active());
    }

    #[test]
    fn test_long_frame_still_dispatches_once() {
        let mut scheduler = IdleScheduler::new(0.15);
        scheduler.note_emission(0.08);

        assert_eq!(scheduler.advance(0.3), DispatchDecision::Dispatch);
        assert_eq!(scheduler.advance(0.016), DispatchDecision::Skip);
    }

    #[test]
    fn test_shorter_emission_does_not_shrink_window() {
        let mut scheduler = IdleScheduler::new(0.15);
        scheduler.note_emission(2.0);
        scheduler.note_emission(0.1);
        assert_eq!(scheduler.active_until(), Some(2.0 + 0.15f32 as f64));
    }

    #[test]
    fn test_emission_reopens_window() {
        let mut scheduler = IdleScheduler::new(0.0);
        scheduler.note_emission(0.1);
        assert_eq!(scheduler.advance(0.5), DispatchDecision::Dispatch);
        assert_eq!(scheduler.advance(0.05), DispatchDecision::Skip);

        scheduler.note_emission(0.1);
        assert_eq!(scheduler.advance(0.05), DispatchDecision::Dispatch);
    }
}
