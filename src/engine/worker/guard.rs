use std::sync::Arc;

use tracing::warn;

use crate::engine::error::WorkerError;

use super::Worker;

/// ### English
/// Scoped pause/resume bracket over a set of workers.
///
/// `new` pauses every worker when `active`. On drop, every worker is resumed with
/// `restart_compute = true` if `resume` is set, including on early `?` returns. `resume`
/// starts out equal to `active` and can be changed with `set_resume`, e.g. when the bracketed
/// operation turns threaded production on or off. If a `pause` fails, the workers paused
/// before it are resumed.
///
/// ### 中文
/// 作用于一组 worker 的暂停/恢复作用域。
///
/// `active` 为真时 `new` 会暂停所有 worker。drop 时若 `resume` 为真，则以
/// `restart_compute = true` 恢复所有 worker，包括提前 `?` 返回的情况。`resume` 初始等于
/// `active`，可通过 `set_resume` 修改（例如被包裹的操作开启或关闭了多线程生成）。
/// 若某次 `pause` 失败，之前已暂停的 worker 会被恢复。
#[must_use = "workers are resumed when the guard is dropped"]
pub struct PauseGuard {
    workers: Vec<Arc<Worker>>,
    resume: bool,
}

impl PauseGuard {
    pub fn new(workers: &[Arc<Worker>], active: bool) -> Result<Self, WorkerError> {
        let mut guard = Self {
            workers: Vec::with_capacity(workers.len()),
            resume: active,
        };
        for worker in workers {
            if active {
                worker.pause()?;
            }
            guard.workers.push(worker.clone());
        }
        Ok(guard)
    }

    /// ### English
    /// Overrides whether the workers are resumed on drop.
    ///
    /// ### 中文
    /// 覆盖 drop 时是否恢复 worker。
    pub fn set_resume(&mut self, resume: bool) {
        self.resume = resume;
    }

    pub fn workers(&self) -> &[Arc<Worker>] {
        &self.workers
    }
}

impl Drop for PauseGuard {
    fn drop(&mut self) {
        if !self.resume {
            return;
        }
        for worker in &self.workers {
            if let Err(err) = worker.resume(true) {
                warn!(worker = %worker.name(), %err, "failed to resume worker");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;
    use crate::engine::producers::FractalProducer;
    use crate::engine::texture::SharedProducer;

    fn running_worker(name: &str) -> Arc<Worker> {
        let worker = Arc::new(Worker::new(name));
        let producer: SharedProducer = Arc::new(Mutex::new(FractalProducer::default()));
        worker.bind_producer(producer, 1).unwrap();
        worker.start().unwrap();
        worker.resume(false).unwrap();
        worker
    }

    #[test]
    fn inactive_guard_pauses_nothing() {
        let worker = running_worker("inactive");
        {
            let guard = PauseGuard::new(&[worker.clone()], false).unwrap();
            assert_eq!(guard.workers().len(), 1);
            assert!(!worker.is_paused());
        }
        assert!(!worker.is_paused());
    }

    #[test]
    fn active_guard_pauses_then_resumes() {
        let a = running_worker("a");
        let b = running_worker("b");
        {
            let _guard = PauseGuard::new(&[a.clone(), b.clone()], true).unwrap();
            assert!(a.is_paused() && b.is_paused());
            assert!(a.with_slots(|_| ()).is_ok());
        }
        assert!(!a.is_paused() && !b.is_paused());
    }

    #[test]
    fn set_resume_false_keeps_workers_parked() {
        let worker = running_worker("parked");
        {
            let mut guard = PauseGuard::new(&[worker.clone()], true).unwrap();
            guard.set_resume(false);
        }
        assert!(worker.is_paused());
    }

    #[test]
    fn failing_pause_resumes_earlier_workers() {
        let running = running_worker("running");
        let stopped = Arc::new(Worker::new("stopped"));
        stopped.stop();
        let result = PauseGuard::new(&[running.clone(), stopped], true);
        assert!(matches!(
            result,
            Err(WorkerError::InvalidTransition { op: "pause", .. })
        ));
        assert!(!running.is_paused());
    }
}
