//! ### English
//! Producer worker: one dedicated thread that repeatedly fills the working slot of a
//! `WorkerSlots` set and hands the finished frame to the render thread.
//!
//! The thread moves through `running -> (swap-wait) -> running` and parks whenever `pause` is
//! requested. `stop` is terminal. All owner-side buffer changes (resize, variant switch,
//! re-seeding) require the worker to be quiesced, see `PauseGuard`.
//!
//! ### 中文
//! 生产者 worker：一个专用线程，反复填充 `WorkerSlots` 的 working 槽位，
//! 并把完成的帧交给渲染线程。
//!
//! 线程在 `running -> (swap-wait) -> running` 之间流转，收到 `pause` 请求时停放。
//! `stop` 为终态。所有所有者侧的缓冲区改动（resize、变体切换、重新填充）
//! 都要求 worker 处于静止状态，参见 `PauseGuard`。

mod cancel;
mod guard;
mod run;
mod state;

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::engine::buffer::{BufferMode, PixelBuffer, SlotBuffers, WorkerSlots};
use crate::engine::error::WorkerError;
use crate::engine::texture::SharedProducer;

pub use cancel::CancelToken;
pub use guard::PauseGuard;

use state::WorkerShared;

/// ### English
/// Handle to one producer thread and the slot set it fills.
///
/// All methods take `&self`; a worker is usually shared as `Arc<Worker>` between the texture
/// that consumes it and the compositor that pauses it.
///
/// ### 中文
/// 一个生产者线程及其填充的槽位集合的句柄。
///
/// 所有方法都接收 `&self`；worker 通常以 `Arc<Worker>` 的形式
/// 在消费它的纹理与暂停它的合成器之间共享。
pub struct Worker {
    name: String,
    shared: Arc<WorkerShared>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl Worker {
    /// ### English
    /// Creates a paused, not yet started worker with a triple-buffered slot set.
    ///
    /// ### 中文
    /// 创建一个已暂停、尚未启动、使用三缓冲槽位集合的 worker。
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_mode(name, BufferMode::Triple)
    }

    pub fn with_mode(name: impl Into<String>, mode: BufferMode) -> Self {
        Self {
            name: name.into(),
            shared: Arc::new(WorkerShared::new(WorkerSlots::new(mode, 0))),
            thread: Mutex::new(None),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// ### English
    /// Spawns the producer thread and blocks until it reports in. The thread starts parked.
    ///
    /// If the worker was resumed before `start`, the thread begins producing immediately.
    ///
    /// ### 中文
    /// 启动生产者线程并阻塞直到其报到。线程启动后处于停放状态。
    ///
    /// 若在 `start` 之前已调用 resume，线程会立即开始生成。
    pub fn start(&self) -> Result<(), WorkerError> {
        let mut thread_slot = self.thread.lock();
        {
            let mut state = self.shared.state.lock();
            if state.stop {
                return Err(self.invalid("start"));
            }
            if state.started {
                return Err(WorkerError::AlreadyStarted(self.name.clone()));
            }
            state.started = true;
        }

        let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);
        let shared = self.shared.clone();
        let name = self.name.clone();
        let spawned = thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || run::run_worker(shared, name, ready_tx));

        let handle = match spawned {
            Ok(handle) => handle,
            Err(err) => {
                self.shared.state.lock().started = false;
                return Err(WorkerError::Spawn(err));
            }
        };

        if ready_rx.recv().is_err() {
            if handle.join().is_err() {
                warn!(worker = %self.name, "worker thread panicked during startup");
            }
            return Err(WorkerError::ThreadExited(self.name.clone()));
        }

        *thread_slot = Some(handle);
        info!(worker = %self.name, "worker started");
        Ok(())
    }

    /// ### English
    /// Installs the frame producer and sets the pixel size of every slot.
    ///
    /// Must be called while the worker is quiesced.
    ///
    /// ### 中文
    /// 安装帧生产者并设置所有槽位的每像素字节数。
    ///
    /// 必须在 worker 静止时调用。
    pub fn bind_producer(
        &self,
        producer: SharedProducer,
        pixel_size: usize,
    ) -> Result<(), WorkerError> {
        let mut state = self.shared.state.lock();
        if !state.is_quiesced() {
            return Err(WorkerError::NotQuiesced(self.name.clone()));
        }
        state.producer = Some(producer);
        state.slots.set_pixel_size(pixel_size);
        Ok(())
    }

    /// ### English
    /// Requests a park and blocks until the producer confirms it (or has exited).
    ///
    /// The cancel token is raised so an in-flight frame ends early; the producer is also woken
    /// from swap-wait. No-op if the worker is not started or already parked.
    ///
    /// ### 中文
    /// 请求停放并阻塞直到生产者确认（或已退出）。
    ///
    /// 会置位取消标记以便正在生成的帧提前结束，并唤醒处于 swap-wait 的生产者。
    /// 若 worker 未启动或已停放则为空操作。
    pub fn pause(&self) -> Result<(), WorkerError> {
        let mut state = self.shared.state.lock();
        if state.stop {
            return Err(self.invalid("pause"));
        }
        state.pause = true;
        if state.is_quiesced() {
            return Ok(());
        }

        self.shared.cancel.cancel();
        if state.in_swap_wait {
            self.shared.swap_signal.notify_all();
        }
        while !state.in_pause && !state.exited {
            self.shared.pause_signal.wait(&mut state);
        }
        debug!(worker = %self.name, "worker paused");
        Ok(())
    }

    /// ### English
    /// Lets a parked producer run again.
    ///
    /// `restart_compute` drops the frame that was in flight when the pause landed instead of
    /// publishing it. No-op when no producer is bound.
    ///
    /// ### 中文
    /// 让已停放的生产者重新运行。
    ///
    /// `restart_compute` 会丢弃暂停时正在生成的帧而不发布。未绑定生产者时为空操作。
    pub fn resume(&self, restart_compute: bool) -> Result<(), WorkerError> {
        let mut state = self.shared.state.lock();
        if state.stop {
            return Err(self.invalid("resume"));
        }
        if state.producer.is_none() {
            return Ok(());
        }
        state.restart |= restart_compute;
        if state.pause {
            state.pause = false;
            self.shared.cancel.reset();
            self.shared.run_signal.notify_all();
            debug!(worker = %self.name, restart_compute, "worker resumed");
        }
        Ok(())
    }

    /// ### English
    /// Stops the worker and joins its thread. Idempotent; also run on drop.
    ///
    /// ### 中文
    /// 停止 worker 并 join 其线程。幂等；drop 时也会执行。
    pub fn stop(&self) {
        let mut thread_slot = self.thread.lock();
        {
            let mut state = self.shared.state.lock();
            if !state.stop {
                state.stop = true;
                self.shared.cancel.cancel();
                self.shared.run_signal.notify_all();
                self.shared.swap_signal.notify_all();
            }
        }

        if let Some(handle) = thread_slot.take() {
            if handle.join().is_err() {
                warn!(worker = %self.name, "worker thread panicked");
            }
            info!(worker = %self.name, "worker stopped");
        }
    }

    /// ### English
    /// Consumer-side handoff. Never waits on the producer.
    ///
    /// If a finished frame is pending, stable and intermediate are swapped and a producer
    /// blocked in swap-wait is woken. `read` then sees the current stable buffer, whether or
    /// not a swap happened.
    ///
    /// ### 中文
    /// 消费者侧交接。从不等待生产者。
    ///
    /// 若有已完成的帧待取，交换 stable 与 intermediate，并唤醒处于 swap-wait 的生产者。
    /// 随后 `read` 读取当前 stable 缓冲区（无论是否发生交换）。
    pub fn with_updated_buffer<R>(&self, read: impl FnOnce(&PixelBuffer) -> R) -> R {
        let mut state = self.shared.state.lock();
        if state.slots.can_swap_stable() {
            state.slots.swap_stable();
            if state.in_swap_wait {
                self.shared.swap_signal.notify_all();
            }
        }
        read(state.slots.stable())
    }

    /// ### English
    /// Runs `f` on the slot set. Requires the worker to be quiesced.
    ///
    /// ### 中文
    /// 在槽位集合上执行 `f`。要求 worker 处于静止状态。
    pub fn with_slots<R>(
        &self,
        f: impl FnOnce(&mut WorkerSlots) -> R,
    ) -> Result<R, WorkerError> {
        let mut state = self.shared.state.lock();
        if !state.is_quiesced() {
            return Err(WorkerError::NotQuiesced(self.name.clone()));
        }
        Ok(f(&mut state.slots))
    }

    pub fn use_double_buffer(&self) -> Result<(), WorkerError> {
        self.switch_slots(BufferMode::Double)
    }

    pub fn use_triple_buffer(&self) -> Result<(), WorkerError> {
        self.switch_slots(BufferMode::Triple)
    }

    fn switch_slots(&self, mode: BufferMode) -> Result<(), WorkerError> {
        let mut state = self.shared.state.lock();
        if !state.is_quiesced() {
            return Err(WorkerError::NotQuiesced(self.name.clone()));
        }
        if state.slots.mode() == mode {
            return Ok(());
        }
        state.slots = state.slots.converted(mode)?;
        debug!(worker = %self.name, ?mode, "worker slot set replaced");
        Ok(())
    }

    pub fn buffer_mode(&self) -> BufferMode {
        self.shared.state.lock().slots.mode()
    }

    /// ### English
    /// A pause is in effect (requested or confirmed) and no resume has followed.
    ///
    /// ### 中文
    /// 暂停处于生效状态（已请求或已确认），且之后尚未恢复。
    pub fn is_paused(&self) -> bool {
        self.shared.state.lock().pause
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.state.lock().stop
    }

    /// ### English
    /// Frames moved into the handoff slot since creation.
    ///
    /// ### 中文
    /// 自创建以来被移入交接槽位的帧数。
    pub fn frames_published(&self) -> u64 {
        self.shared.state.lock().frames_published
    }

    pub fn frames_dropped(&self) -> u64 {
        self.shared.state.lock().frames_dropped
    }

    fn invalid(&self, op: &'static str) -> WorkerError {
        WorkerError::InvalidTransition {
            worker: self.name.clone(),
            op,
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker").field("name", &self.name).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use parking_lot::Mutex;

    use super::*;
    use crate::engine::texture::{FrameProducer, Production};

    /// Writes an incrementing counter into every byte.
    struct Counter {
        next: u8,
    }

    impl FrameProducer for Counter {
        fn produce(&mut self, target: &mut PixelBuffer, _cancel: &CancelToken) -> Production {
            self.next = self.next.wrapping_add(1);
            target.fill(self.next);
            Production::Complete
        }
    }

    fn counting_worker(mode: BufferMode) -> Worker {
        let worker = Worker::with_mode("test-worker", mode);
        let producer: SharedProducer = Arc::new(Mutex::new(Counter { next: 0 }));
        worker.bind_producer(producer, 1).unwrap();
        worker.with_slots(|slots| slots.resize(8, 8)).unwrap();
        worker
    }

    fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        false
    }

    #[test]
    fn new_worker_is_paused_and_quiesced() {
        let worker = counting_worker(BufferMode::Triple);
        assert!(worker.is_paused());
        assert!(!worker.is_stopped());
        assert!(worker.with_slots(|_| ()).is_ok());
    }

    #[test]
    fn start_twice_fails() {
        let worker = counting_worker(BufferMode::Triple);
        worker.start().unwrap();
        assert!(matches!(worker.start(), Err(WorkerError::AlreadyStarted(_))));
    }

    #[test]
    fn stop_is_idempotent_and_terminal() {
        let worker = counting_worker(BufferMode::Double);
        worker.start().unwrap();
        worker.resume(false).unwrap();
        worker.stop();
        worker.stop();
        assert!(worker.is_stopped());
        assert!(matches!(
            worker.pause(),
            Err(WorkerError::InvalidTransition { op: "pause", .. })
        ));
        assert!(matches!(
            worker.resume(true),
            Err(WorkerError::InvalidTransition { op: "resume", .. })
        ));
    }

    #[test]
    fn stop_without_start_does_not_block() {
        let worker = counting_worker(BufferMode::Triple);
        worker.stop();
        assert!(worker.is_stopped());
    }

    #[test]
    fn consumer_sees_frames_after_resume() {
        let worker = counting_worker(BufferMode::Triple);
        worker.start().unwrap();
        worker.resume(false).unwrap();

        assert!(wait_for(|| worker.with_updated_buffer(|b| b.as_bytes()[0]) != 0));
        worker.pause().unwrap();
        assert!(worker.frames_published() > 0);

        let frame = worker.with_updated_buffer(|b| b.as_bytes().to_vec());
        assert!(frame.iter().all(|&v| v == frame[0]));
    }

    #[test]
    fn slot_access_is_refused_while_running() {
        let worker = counting_worker(BufferMode::Triple);
        worker.start().unwrap();
        worker.resume(false).unwrap();
        assert!(wait_for(|| worker.frames_published() > 0));

        assert!(matches!(
            worker.with_slots(|_| ()),
            Err(WorkerError::NotQuiesced(_))
        ));
        assert!(matches!(
            worker.use_double_buffer(),
            Err(WorkerError::NotQuiesced(_))
        ));

        worker.pause().unwrap();
        worker.use_double_buffer().unwrap();
        assert_eq!(worker.buffer_mode(), BufferMode::Double);
    }

    #[test]
    fn resume_without_producer_is_noop() {
        let worker = Worker::new("idle");
        worker.start().unwrap();
        worker.resume(false).unwrap();
        assert!(worker.is_paused());
    }

    #[test]
    fn variant_switch_carries_latest_frame() {
        let worker = counting_worker(BufferMode::Triple);
        worker
            .with_slots(|slots| slots.init_all(&[5; 64]))
            .unwrap()
            .unwrap();
        worker.use_double_buffer().unwrap();
        worker.use_double_buffer().unwrap();
        worker.with_updated_buffer(|b| assert_eq!(b.as_bytes(), &[5; 64]));
    }
}
