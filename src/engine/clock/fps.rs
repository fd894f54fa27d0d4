use std::time::{Duration, Instant};

/// ### English
/// Averaging window of `FpsCounter`.
///
/// ### 中文
/// `FpsCounter` 的平均窗口。
pub const FPS_WINDOW: Duration = Duration::from_millis(500);

/// ### English
/// Frames-per-second over fixed windows.
///
/// ### 中文
/// 按固定窗口统计的每秒帧数。
#[derive(Clone, Copy, Debug)]
pub struct FpsCounter {
    window_start: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            frames: 0,
            fps: 0.0,
        }
    }

    /// ### English
    /// Counts one frame. Returns the new value when a window closes.
    ///
    /// ### 中文
    /// 计入一帧。窗口结束时返回新的数值。
    pub fn frame(&mut self, now: Instant) -> Option<f32> {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < FPS_WINDOW {
            return None;
        }
        self.fps = self.frames as f32 / elapsed.as_secs_f32();
        self.frames = 0;
        self.window_start = now;
        Some(self.fps)
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_once_per_window() {
        let start = Instant::now();
        let mut counter = FpsCounter::new(start);
        for i in 1..30 {
            assert_eq!(counter.frame(start + Duration::from_millis(i * 16)), None);
        }
        let fps = counter.frame(start + FPS_WINDOW).unwrap();
        assert!((fps - 60.0).abs() < 0.01, "fps = {fps}");
        assert_eq!(counter.fps(), fps);
        assert_eq!(counter.frame(start + FPS_WINDOW + Duration::from_millis(16)), None);
    }
}
