use dpi::PhysicalSize;
use serde::Deserialize;

use crate::engine::error::BufferError;

use super::PixelBuffer;

/// ### English
/// Globally selected buffering strategy.
///
/// - `Single`: no worker threads; textures produce inline on the render thread.
/// - `Double` / `Triple`: one worker thread per texture, handing frames over through a
///   `DoubleBuffer` / `TripleBuffer`.
///
/// ### 中文
/// 全局选择的缓冲策略。
///
/// - `Single`：不使用 worker 线程；纹理在渲染线程内联生成。
/// - `Double` / `Triple`：每个纹理一个 worker 线程，通过 `DoubleBuffer` / `TripleBuffer` 交接帧。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BufferMode {
    #[default]
    Single,
    Double,
    Triple,
}

impl BufferMode {
    /// ### English
    /// Whether this mode runs producers on worker threads.
    ///
    /// ### 中文
    /// 该模式是否在 worker 线程上运行生产者。
    #[inline]
    pub fn is_threaded(self) -> bool {
        self != BufferMode::Single
    }
}

/// ### English
/// Contract shared by the single, double and triple slot sets.
///
/// Each set exposes a *working* slot (producer writes), a *stable* slot (consumer reads) and
/// an *intermediate* slot (handoff). Roles move between physical buffers by swapping owned
/// buffers, never by copying pixels. Only `init_all` copies, and it is meant for buffer-mode
/// or video-source changes.
///
/// References returned by the role accessors are invalidated by `resize`.
///
/// ### 中文
/// 单缓冲、双缓冲与三缓冲槽位集合共享的契约。
///
/// 每个集合提供 *working* 槽位（生产者写入）、*stable* 槽位（消费者读取）
/// 以及 *intermediate* 槽位（交接用）。角色在物理缓冲区之间通过交换所有权迁移，
/// 从不复制像素。只有 `init_all` 会复制，且仅用于缓冲模式或视频源切换。
///
/// 角色访问器返回的引用会因 `resize` 而失效。
pub trait SlotBuffers {
    /// ### English
    /// Every physical buffer of the set, in no particular role order.
    ///
    /// ### 中文
    /// 集合内的全部物理缓冲区（不区分角色顺序）。
    fn physical_buffers(&self) -> Vec<&PixelBuffer>;

    fn physical_buffers_mut(&mut self) -> Vec<&mut PixelBuffer>;

    fn working(&self) -> &PixelBuffer;

    fn working_mut(&mut self) -> &mut PixelBuffer;

    fn stable(&self) -> &PixelBuffer;

    fn intermediate(&self) -> &PixelBuffer;

    fn intermediate_mut(&mut self) -> &mut PixelBuffer;

    /// ### English
    /// Whether the producer may hand its working slot over now.
    ///
    /// ### 中文
    /// 生产者当前是否可以交出 working 槽位。
    fn can_swap_working(&self) -> bool;

    /// ### English
    /// Producer side handoff. Callers check `can_swap_working` first.
    ///
    /// ### 中文
    /// 生产者侧交接。调用前需先检查 `can_swap_working`。
    fn swap_working(&mut self);

    /// ### English
    /// Whether a completed frame is waiting for the consumer.
    ///
    /// ### 中文
    /// 是否有已完成的帧等待消费者取走。
    fn can_swap_stable(&self) -> bool;

    /// ### English
    /// Consumer side handoff. Callers check `can_swap_stable` first.
    ///
    /// ### 中文
    /// 消费者侧交接。调用前需先检查 `can_swap_stable`。
    fn swap_stable(&mut self);

    /// ### English
    /// Marks the working slot as holding a complete frame.
    ///
    /// ### 中文
    /// 标记 working 槽位已持有完整帧。
    fn set_working_full(&mut self);

    /// ### English
    /// Withdraws the working slot's frame (it will not be published).
    ///
    /// ### 中文
    /// 撤回 working 槽位中的帧（不会被发布）。
    fn set_working_empty(&mut self);

    /// ### English
    /// Resets the handoff flags to "nothing pending".
    ///
    /// ### 中文
    /// 将交接标记重置为“无待取帧”。
    fn reset_handoff(&mut self);

    fn pixel_size(&self) -> usize {
        self.stable().pixel_size()
    }

    /// ### English
    /// Sets the pixel size of every physical buffer. Must precede the first `resize`.
    ///
    /// ### 中文
    /// 设置所有物理缓冲区的每像素字节数。必须在首次 `resize` 之前调用。
    fn set_pixel_size(&mut self, pixel_size: usize) {
        for buffer in self.physical_buffers_mut() {
            buffer.set_pixel_size(pixel_size);
        }
    }

    fn dimensions(&self) -> Option<PhysicalSize<u32>> {
        self.stable().dimensions()
    }

    fn byte_len(&self) -> usize {
        self.stable().byte_len()
    }

    fn row_size(&self) -> usize {
        self.stable().row_size()
    }

    /// ### English
    /// Resizes every physical buffer to the same dimensions. Returns `true` if storage was
    /// reallocated. Old contents are not preserved.
    ///
    /// ### 中文
    /// 将所有物理缓冲区调整为相同尺寸。若重新分配了存储则返回 `true`。不保留旧内容。
    fn resize(&mut self, width: u32, height: u32) -> bool {
        let mut reallocated = false;
        for buffer in self.physical_buffers_mut() {
            reallocated |= buffer.resize(width, height);
        }
        reallocated
    }

    /// ### English
    /// Zero-fills the intermediate slot (the sole buffer for `SingleBuffer`).
    ///
    /// ### 中文
    /// 将 intermediate 槽位清零（对 `SingleBuffer` 即唯一的缓冲区）。
    fn init_intermediate_with_zero(&mut self) {
        self.intermediate_mut().fill(0);
    }

    /// ### English
    /// Zeroes every physical buffer and clears any pending handoff.
    ///
    /// ### 中文
    /// 将所有物理缓冲区清零，并清除待交接状态。
    fn clear_all(&mut self) {
        for buffer in self.physical_buffers_mut() {
            buffer.fill(0);
        }
        self.reset_handoff();
    }

    /// ### English
    /// Copies `data` into the intermediate slot. Fails with `SizeMismatch` if `data.len()`
    /// disagrees with the computed size.
    ///
    /// ### 中文
    /// 将 `data` 复制到 intermediate 槽位。若 `data.len()` 与计算尺寸不一致则返回 `SizeMismatch`。
    fn init_intermediate(&mut self, data: &[u8]) -> Result<(), BufferError> {
        self.intermediate_mut().copy_from(data)
    }

    /// ### English
    /// Copies `data` into every physical buffer so all roles start out identical, and clears
    /// any pending handoff. Checked before anything is written.
    ///
    /// ### 中文
    /// 将 `data` 复制到每个物理缓冲区，使所有角色内容一致，并清除待交接状态。
    /// 写入前会先做尺寸检查。
    fn init_all(&mut self, data: &[u8]) -> Result<(), BufferError> {
        let expected = self.byte_len();
        if data.len() != expected {
            return Err(BufferError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        for buffer in self.physical_buffers_mut() {
            buffer.copy_from(data)?;
        }
        self.reset_handoff();
        Ok(())
    }

    /// ### English
    /// The most recently completed frame: the intermediate slot if the consumer has not
    /// collected it yet, otherwise the stable slot.
    ///
    /// ### 中文
    /// 最近完成的帧：若消费者尚未取走 intermediate 槽位则返回它，否则返回 stable 槽位。
    fn latest(&self) -> &PixelBuffer {
        if self.can_swap_stable() {
            self.intermediate()
        } else {
            self.stable()
        }
    }
}
