use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, TryRecvError};

/// ### English
/// Fixed-interval tick source for the render thread.
///
/// Ticks that are not collected in time are coalesced by the channel, so a slow render thread
/// sees one long interval instead of a burst.
///
/// ### 中文
/// 渲染线程的固定间隔 tick 源。
///
/// 未及时取走的 tick 会被通道合并，因此渲染线程变慢时看到的是一个较长的间隔，而不是突发的多次 tick。
pub struct RenderTimer {
    ticks: Receiver<Instant>,
    interval: Duration,
    last: Instant,
}

impl RenderTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            ticks: crossbeam_channel::tick(interval),
            interval,
            last: Instant::now(),
        }
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// ### English
    /// Blocks until the next tick and returns the milliseconds since the previous one.
    ///
    /// ### 中文
    /// 阻塞直到下一次 tick，返回距上一次 tick 的毫秒数。
    pub fn wait_tick(&mut self) -> u32 {
        let at = self.ticks.recv().unwrap_or_else(|_| Instant::now());
        self.advance(at)
    }

    /// ### English
    /// Non-blocking variant of `wait_tick` for hosts that own their event loop.
    ///
    /// ### 中文
    /// `wait_tick` 的非阻塞版本，供自行管理事件循环的宿主使用。
    pub fn try_tick(&mut self) -> Option<u32> {
        match self.ticks.try_recv() {
            Ok(at) => Some(self.advance(at)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(self.advance(Instant::now())),
        }
    }

    fn advance(&mut self, at: Instant) -> u32 {
        let elapsed = at.saturating_duration_since(self.last);
        self.last = at;
        u32::try_from(elapsed.as_millis()).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_tick_reports_roughly_one_interval() {
        let mut timer = RenderTimer::new(Duration::from_millis(5));
        let first = timer.wait_tick();
        let second = timer.wait_tick();
        assert!(first >= 4, "first tick after {first} ms");
        assert!(second >= 4, "second tick after {second} ms");
    }

    #[test]
    fn try_tick_is_empty_before_the_first_interval() {
        let mut timer = RenderTimer::new(Duration::from_secs(60));
        assert_eq!(timer.try_tick(), None);
    }
}
