use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// ### English
/// Cooperative cancellation flag handed to a producer for the duration of one frame.
///
/// Producers poll `is_cancelled` at their documented granularity and return early when it is
/// set. The worker raises it on pause/stop and lowers it on resume.
///
/// ### 中文
/// 在单帧生成期间交给生产者的协作式取消标记。
///
/// 生产者按其约定的粒度轮询 `is_cancelled`，被置位时提前返回。
/// worker 在 pause/stop 时置位，在 resume 时清除。
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    #[inline]
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    #[inline]
    pub(crate) fn reset(&self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = CancelToken::new();
        let observer = token.clone();
        assert!(!observer.is_cancelled());
        token.cancel();
        assert!(observer.is_cancelled());
        token.reset();
        assert!(!observer.is_cancelled());
    }
}
