use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::engine::buffer::WorkerSlots;
use crate::engine::texture::SharedProducer;

use super::CancelToken;

/// ### English
/// State shared between a `Worker` handle and its producer thread.
///
/// Every wait on one of the condition variables is a predicate loop over `WorkerState`, and
/// every state change that can end a wait is followed by a notify on the matching signal.
///
/// ### 中文
/// `Worker` 句柄与其生产者线程共享的状态。
///
/// 对条件变量的每次等待都是基于 `WorkerState` 的谓词循环；
/// 每个可能结束等待的状态变更之后都会通知对应的信号。
pub(super) struct WorkerShared {
    pub(super) state: Mutex<WorkerState>,
    /// ### English
    /// Wakes a parked producer (`pause` cleared or `stop` set).
    ///
    /// ### 中文
    /// 唤醒已停放的生产者（`pause` 被清除或 `stop` 被置位）。
    pub(super) run_signal: Condvar,
    /// ### English
    /// Acknowledgements from the producer: parked (`in_pause`) or exited.
    ///
    /// ### 中文
    /// 来自生产者的确认：已停放（`in_pause`）或已退出。
    pub(super) pause_signal: Condvar,
    /// ### English
    /// Wakes a producer blocked in swap-wait (slot freed, pause or stop requested).
    ///
    /// ### 中文
    /// 唤醒处于 swap-wait 的生产者（槽位已释放、请求暂停或停止）。
    pub(super) swap_signal: Condvar,
    pub(super) cancel: CancelToken,
}

pub(super) struct WorkerState {
    pub(super) slots: WorkerSlots,
    pub(super) producer: Option<SharedProducer>,
    /// ### English
    /// Park at the next checkpoint. Initially `true`.
    ///
    /// ### 中文
    /// 在下一个检查点停放。初始为 `true`。
    pub(super) pause: bool,
    pub(super) stop: bool,
    /// ### English
    /// Drop the in-flight frame instead of publishing it.
    ///
    /// ### 中文
    /// 丢弃正在生成的帧而不发布。
    pub(super) restart: bool,
    pub(super) in_pause: bool,
    pub(super) in_swap_wait: bool,
    pub(super) started: bool,
    pub(super) exited: bool,
    pub(super) frames_published: u64,
    pub(super) frames_dropped: u64,
}

impl WorkerShared {
    pub(super) fn new(slots: WorkerSlots) -> Self {
        Self {
            state: Mutex::new(WorkerState {
                slots,
                producer: None,
                pause: true,
                stop: false,
                restart: false,
                in_pause: false,
                in_swap_wait: false,
                started: false,
                exited: false,
                frames_published: 0,
                frames_dropped: 0,
            }),
            run_signal: Condvar::new(),
            pause_signal: Condvar::new(),
            swap_signal: Condvar::new(),
            cancel: CancelToken::new(),
        }
    }

    /// ### English
    /// Producer side: confirms the park and sleeps until resumed or stopped.
    ///
    /// ### 中文
    /// 生产者侧：确认已停放，并休眠直到被恢复或停止。
    pub(super) fn park(&self, state: &mut MutexGuard<'_, WorkerState>) {
        state.in_pause = true;
        self.pause_signal.notify_all();
        while state.pause && !state.stop {
            self.run_signal.wait(state);
        }
        state.in_pause = false;
    }
}

impl WorkerState {
    /// ### English
    /// Buffers may be touched by the owner: the producer is parked, gone, or never ran.
    ///
    /// ### 中文
    /// 所有者可以访问缓冲区：生产者已停放、已退出或从未运行。
    pub(super) fn is_quiesced(&self) -> bool {
        !self.started || self.in_pause || self.exited
    }
}
