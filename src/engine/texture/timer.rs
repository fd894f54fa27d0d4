/// ### English
/// Per-texture refresh gate, independent of the display rate.
///
/// `ms_per_frame == 0` means uncapped: every tick is due.
///
/// ### 中文
/// 每个纹理独立于显示帧率的刷新门限。
///
/// `ms_per_frame == 0` 表示不限速：每次 tick 都到期。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameTimer {
    ms_per_frame: u32,
    elapsed_ms: u32,
}

impl FrameTimer {
    pub fn new(ms_per_frame: u32) -> Self {
        Self {
            ms_per_frame,
            elapsed_ms: 0,
        }
    }

    #[inline]
    pub fn ms_per_frame(&self) -> u32 {
        self.ms_per_frame
    }

    /// ### English
    /// Accumulates `elapsed_ms` and reports whether a frame is due.
    ///
    /// The accumulator resets to zero on every due frame, so a stall never turns into a burst.
    ///
    /// ### 中文
    /// 累加 `elapsed_ms` 并返回是否到达出帧时间。
    ///
    /// 每次到期累加器清零，因此卡顿不会变成突发补帧。
    pub fn timeout(&mut self, elapsed_ms: u32) -> bool {
        if self.ms_per_frame == 0 {
            return true;
        }
        self.elapsed_ms = self.elapsed_ms.saturating_add(elapsed_ms);
        if self.elapsed_ms < self.ms_per_frame {
            return false;
        }
        self.elapsed_ms = 0;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncapped_is_always_due() {
        let mut timer = FrameTimer::new(0);
        assert!(timer.timeout(0));
        assert!(timer.timeout(1));
    }

    #[test]
    fn accumulates_until_period() {
        let mut timer = FrameTimer::new(40);
        assert!(!timer.timeout(16));
        assert!(!timer.timeout(16));
        assert!(timer.timeout(16));
        // Overshoot is not carried into the next period.
        assert!(!timer.timeout(16));
        assert!(!timer.timeout(16));
        assert!(timer.timeout(16));
    }

    #[test]
    fn long_stall_does_not_burst() {
        let mut timer = FrameTimer::new(40);
        assert!(timer.timeout(1_000));
        assert!(!timer.timeout(16));
    }

    #[test]
    fn saturates_instead_of_wrapping() {
        let mut timer = FrameTimer::new(u32::MAX);
        assert!(!timer.timeout(u32::MAX - 1));
        assert!(timer.timeout(u32::MAX));
    }
}
