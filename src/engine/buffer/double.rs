use std::mem;

use super::{PixelBuffer, SlotBuffers};

/// ### English
/// Two physical buffers: working (producer) and stable (consumer).
///
/// `work_full` gates the exchange:
/// - the producer writes the working slot only while `!work_full`;
/// - finishing a frame sets `work_full`;
/// - the consumer swaps stable with working only while `work_full`, which clears it.
///
/// There is no separate intermediate buffer; "intermediate" aliases "working".
///
/// ### 中文
/// 两个物理缓冲区：working（生产者）与 stable（消费者）。
///
/// `work_full` 控制交换：
/// - 仅在 `!work_full` 时生产者写入 working 槽位；
/// - 完成一帧后置位 `work_full`；
/// - 仅在 `work_full` 时消费者交换 stable 与 working，并清除该标记。
///
/// 没有独立的 intermediate 缓冲区；“intermediate” 即 “working”。
#[derive(Clone, Debug, Default)]
pub struct DoubleBuffer {
    working: PixelBuffer,
    stable: PixelBuffer,
    /// ### English
    /// The working slot holds a complete frame the consumer has not taken yet.
    ///
    /// ### 中文
    /// working 槽位持有消费者尚未取走的完整帧。
    work_full: bool,
}

impl DoubleBuffer {
    pub fn new(pixel_size: usize) -> Self {
        Self {
            working: PixelBuffer::new(pixel_size),
            stable: PixelBuffer::new(pixel_size),
            work_full: false,
        }
    }

    #[inline]
    pub fn is_working_full(&self) -> bool {
        self.work_full
    }

    /// ### English
    /// Moves the working buffer out so the producer can fill it without holding the lock that
    /// guards this set. Must be paired with `restore_working` before any other role access.
    ///
    /// ### 中文
    /// 将 working 缓冲区移出，使生产者无需持有保护该集合的锁即可写入。
    /// 在任何其它角色访问之前必须调用 `restore_working` 归还。
    pub(crate) fn take_working(&mut self) -> PixelBuffer {
        debug_assert!(!self.work_full, "producer took a published frame back");
        mem::take(&mut self.working)
    }

    pub(crate) fn restore_working(&mut self, buffer: PixelBuffer) {
        debug_assert!(!self.working.is_allocated());
        self.working = buffer;
    }
}

impl SlotBuffers for DoubleBuffer {
    fn physical_buffers(&self) -> Vec<&PixelBuffer> {
        vec![&self.working, &self.stable]
    }

    fn physical_buffers_mut(&mut self) -> Vec<&mut PixelBuffer> {
        vec![&mut self.working, &mut self.stable]
    }

    #[inline]
    fn working(&self) -> &PixelBuffer {
        &self.working
    }

    #[inline]
    fn working_mut(&mut self) -> &mut PixelBuffer {
        &mut self.working
    }

    #[inline]
    fn stable(&self) -> &PixelBuffer {
        &self.stable
    }

    #[inline]
    fn intermediate(&self) -> &PixelBuffer {
        &self.working
    }

    #[inline]
    fn intermediate_mut(&mut self) -> &mut PixelBuffer {
        &mut self.working
    }

    /// ### English
    /// The handoff completes once the consumer has taken the frame (`!work_full`).
    ///
    /// ### 中文
    /// 消费者取走帧（`!work_full`）后交接即完成。
    #[inline]
    fn can_swap_working(&self) -> bool {
        !self.work_full
    }

    /// ### English
    /// Nothing to move: the consumer's swap already gave the producer a free buffer.
    ///
    /// ### 中文
    /// 无需移动：消费者的交换已经给了生产者一个空闲缓冲区。
    fn swap_working(&mut self) {}

    #[inline]
    fn can_swap_stable(&self) -> bool {
        self.work_full
    }

    fn swap_stable(&mut self) {
        debug_assert!(self.work_full);
        mem::swap(&mut self.working, &mut self.stable);
        self.work_full = false;
    }

    #[inline]
    fn set_working_full(&mut self) {
        self.work_full = true;
    }

    #[inline]
    fn set_working_empty(&mut self) {
        self.work_full = false;
    }

    fn reset_handoff(&mut self) {
        self.work_full = false;
    }
}
