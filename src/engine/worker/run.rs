use std::sync::Arc;

use crossbeam_channel::Sender;
use parking_lot::MutexGuard;
use tracing::{debug, trace};

use crate::engine::buffer::SlotBuffers;
use crate::engine::texture::Production;

use super::state::{WorkerShared, WorkerState};

/// ### English
/// Marks the worker as exited on every path out of the thread body, panics included.
///
/// ### 中文
/// 在线程体的所有退出路径（包括 panic）上把 worker 标记为已退出。
struct ExitGuard<'a> {
    shared: &'a WorkerShared,
}

impl Drop for ExitGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.shared.state.lock();
        state.exited = true;
        state.in_swap_wait = false;
        self.shared.pause_signal.notify_all();
    }
}

/// ### English
/// Producer thread body.
///
/// The working buffer is moved out of the slot set for the duration of `produce`, so the lock
/// is only held at checkpoints and during the handoff.
///
/// ### 中文
/// 生产者线程主体。
///
/// 在 `produce` 期间 working 缓冲区被移出槽位集合，因此锁只在检查点与交接时持有。
pub(super) fn run_worker(shared: Arc<WorkerShared>, name: String, ready: Sender<()>) {
    let _exit = ExitGuard { shared: &shared };
    let mut state = shared.state.lock();
    let _ = ready.send(());
    drop(ready);
    debug!(worker = %name, "worker thread running");

    loop {
        if state.stop {
            break;
        }
        if state.pause {
            trace!(worker = %name, "worker parking");
            shared.park(&mut state);
            continue;
        }
        let Some(producer) = state.producer.clone() else {
            state.pause = true;
            continue;
        };

        state.restart = false;
        let mut target = state.slots.take_working();
        let cancel = shared.cancel.clone();
        let production =
            MutexGuard::unlocked(&mut state, || producer.lock().produce(&mut target, &cancel));
        state.slots.restore_working(target);

        if !hand_off(&shared, &mut state, production, &name) {
            break;
        }
    }

    debug!(worker = %name, "worker thread exiting");
}

/// ### English
/// Publishes a finished frame, blocking in swap-wait while the handoff slot is occupied.
///
/// Pause and stop requests are honoured while waiting. A pending `restart` or an incomplete
/// production retracts the frame instead. Returns `false` when the thread must exit.
///
/// ### 中文
/// 发布已完成的帧；交接槽位被占用时阻塞在 swap-wait 中。
///
/// 等待期间会响应暂停与停止请求。存在 `restart` 请求或生成未完成时改为撤回该帧。
/// 线程需要退出时返回 `false`。
fn hand_off(
    shared: &WorkerShared,
    state: &mut MutexGuard<'_, WorkerState>,
    production: Production,
    name: &str,
) -> bool {
    let mut publish = production == Production::Complete;
    let mut marked = false;

    loop {
        if state.stop {
            return false;
        }
        if state.pause {
            shared.park(state);
            // The owner may have reset the handoff flags while parked.
            marked = false;
            continue;
        }
        if state.restart {
            state.restart = false;
            publish = false;
        }
        if !publish {
            state.slots.set_working_empty();
            state.frames_dropped += 1;
            trace!(worker = %name, "frame dropped");
            return true;
        }
        // Double buffering publishes by flag; mark once so a consumed frame is not re-offered.
        if !marked {
            state.slots.set_working_full();
            marked = true;
        }
        if state.slots.can_swap_working() {
            state.slots.swap_working();
            state.frames_published += 1;
            trace!(worker = %name, frame = state.frames_published, "frame published");
            return true;
        }

        state.in_swap_wait = true;
        shared.swap_signal.wait(state);
        state.in_swap_wait = false;
    }
}
