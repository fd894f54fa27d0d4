use std::mem;

use super::{PixelBuffer, SlotBuffers};

/// ### English
/// Three physical buffers: working (producer), stable (consumer) and intermediate (handoff).
///
/// `working_copy_empty` (initially `true`) says which side owns the intermediate slot:
/// - the producer swaps working with intermediate only while it is `true`, then clears it;
/// - the consumer swaps stable with intermediate only while it is `false`, then sets it.
///
/// Both swaps are ownership exchanges, so producer and consumer never touch the same
/// physical buffer at once.
///
/// ### 中文
/// 三个物理缓冲区：working（生产者）、stable（消费者）与 intermediate（交接）。
///
/// `working_copy_empty`（初始为 `true`）表示 intermediate 槽位归哪一方：
/// - 仅当其为 `true` 时生产者交换 working 与 intermediate，随后清除；
/// - 仅当其为 `false` 时消费者交换 stable 与 intermediate，随后置位。
///
/// 两种交换都是所有权交换，因此生产者与消费者不会同时触碰同一个物理缓冲区。
#[derive(Clone, Debug)]
pub struct TripleBuffer {
    working: PixelBuffer,
    stable: PixelBuffer,
    intermediate: PixelBuffer,
    /// ### English
    /// The intermediate slot holds no unread frame.
    ///
    /// ### 中文
    /// intermediate 槽位没有未读帧。
    working_copy_empty: bool,
}

impl Default for TripleBuffer {
    fn default() -> Self {
        Self::new(0)
    }
}

impl TripleBuffer {
    pub fn new(pixel_size: usize) -> Self {
        Self {
            working: PixelBuffer::new(pixel_size),
            stable: PixelBuffer::new(pixel_size),
            intermediate: PixelBuffer::new(pixel_size),
            working_copy_empty: true,
        }
    }

    #[inline]
    pub fn is_working_copy_empty(&self) -> bool {
        self.working_copy_empty
    }

    /// ### English
    /// Moves the working buffer out for lock-free filling; see `DoubleBuffer::take_working`.
    /// The consumer keeps swapping stable/intermediate meanwhile.
    ///
    /// ### 中文
    /// 将 working 缓冲区移出以便无锁写入；参见 `DoubleBuffer::take_working`。
    /// 期间消费者仍可交换 stable/intermediate。
    pub(crate) fn take_working(&mut self) -> PixelBuffer {
        mem::take(&mut self.working)
    }

    pub(crate) fn restore_working(&mut self, buffer: PixelBuffer) {
        debug_assert!(!self.working.is_allocated());
        self.working = buffer;
    }
}

impl SlotBuffers for TripleBuffer {
    fn physical_buffers(&self) -> Vec<&PixelBuffer> {
        vec![&self.working, &self.stable, &self.intermediate]
    }

    fn physical_buffers_mut(&mut self) -> Vec<&mut PixelBuffer> {
        vec![&mut self.working, &mut self.stable, &mut self.intermediate]
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
        &self.intermediate
    }

    #[inline]
    fn intermediate_mut(&mut self) -> &mut PixelBuffer {
        &mut self.intermediate
    }

    #[inline]
    fn can_swap_working(&self) -> bool {
        self.working_copy_empty
    }

    fn swap_working(&mut self) {
        debug_assert!(self.working_copy_empty);
        mem::swap(&mut self.working, &mut self.intermediate);
        self.working_copy_empty = false;
    }

    #[inline]
    fn can_swap_stable(&self) -> bool {
        !self.working_copy_empty
    }

    fn swap_stable(&mut self) {
        debug_assert!(!self.working_copy_empty);
        mem::swap(&mut self.stable, &mut self.intermediate);
        self.working_copy_empty = true;
    }

    // The intermediate flag alone tracks publication.
    fn set_working_full(&mut self) {}

    fn set_working_empty(&mut self) {}

    fn reset_handoff(&mut self) {
        self.working_copy_empty = true;
    }
}
