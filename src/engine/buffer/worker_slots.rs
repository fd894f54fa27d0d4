use crate::engine::error::BufferError;

use super::{BufferMode, DoubleBuffer, PixelBuffer, SlotBuffers, TripleBuffer};

/// ### English
/// Slot set owned by a worker: the threaded variants only.
///
/// Dispatch happens per coarse operation (resize, swap, role lookup); pixel access is a plain
/// slice on the returned `PixelBuffer`.
///
/// ### 中文
/// worker 持有的槽位集合：仅包含多线程变体。
///
/// 分派只发生在粗粒度操作上（resize、交换、角色查询）；像素访问是返回的 `PixelBuffer` 上的普通切片。
#[derive(Clone, Debug)]
pub enum WorkerSlots {
    Double(DoubleBuffer),
    Triple(TripleBuffer),
}

impl Default for WorkerSlots {
    fn default() -> Self {
        WorkerSlots::Triple(TripleBuffer::default())
    }
}

impl WorkerSlots {
    /// ### English
    /// Creates an empty set for `mode`. `Single` has no threaded counterpart and maps to triple.
    ///
    /// ### 中文
    /// 为 `mode` 创建空集合。`Single` 没有多线程对应物，按三缓冲处理。
    pub fn new(mode: BufferMode, pixel_size: usize) -> Self {
        match mode {
            BufferMode::Double => WorkerSlots::Double(DoubleBuffer::new(pixel_size)),
            BufferMode::Single | BufferMode::Triple => {
                WorkerSlots::Triple(TripleBuffer::new(pixel_size))
            }
        }
    }

    pub fn mode(&self) -> BufferMode {
        match self {
            WorkerSlots::Double(_) => BufferMode::Double,
            WorkerSlots::Triple(_) => BufferMode::Triple,
        }
    }

    /// ### English
    /// Builds a set of the other variant carrying over pixel size, dimensions and the most
    /// recently completed frame (`latest`) into every physical buffer.
    ///
    /// ### 中文
    /// 构建另一种变体的集合，继承每像素字节数、尺寸，并把最近完成的帧（`latest`）
    /// 复制到每个物理缓冲区。
    pub fn converted(&self, mode: BufferMode) -> Result<WorkerSlots, BufferError> {
        let mut next = WorkerSlots::new(mode, self.pixel_size());
        if let Some(size) = self.dimensions() {
            next.resize(size.width, size.height);
            next.init_all(self.latest().as_bytes())?;
        }
        Ok(next)
    }

    pub(crate) fn take_working(&mut self) -> PixelBuffer {
        match self {
            WorkerSlots::Double(slots) => slots.take_working(),
            WorkerSlots::Triple(slots) => slots.take_working(),
        }
    }

    pub(crate) fn restore_working(&mut self, buffer: PixelBuffer) {
        match self {
            WorkerSlots::Double(slots) => slots.restore_working(buffer),
            WorkerSlots::Triple(slots) => slots.restore_working(buffer),
        }
    }

    fn inner(&self) -> &dyn SlotBuffers {
        match self {
            WorkerSlots::Double(slots) => slots,
            WorkerSlots::Triple(slots) => slots,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn SlotBuffers {
        match self {
            WorkerSlots::Double(slots) => slots,
            WorkerSlots::Triple(slots) => slots,
        }
    }
}

impl SlotBuffers for WorkerSlots {
    fn physical_buffers(&self) -> Vec<&PixelBuffer> {
        self.inner().physical_buffers()
    }

    fn physical_buffers_mut(&mut self) -> Vec<&mut PixelBuffer> {
        self.inner_mut().physical_buffers_mut()
    }

    fn working(&self) -> &PixelBuffer {
        self.inner().working()
    }

    fn working_mut(&mut self) -> &mut PixelBuffer {
        self.inner_mut().working_mut()
    }

    fn stable(&self) -> &PixelBuffer {
        self.inner().stable()
    }

    fn intermediate(&self) -> &PixelBuffer {
        self.inner().intermediate()
    }

    fn intermediate_mut(&mut self) -> &mut PixelBuffer {
        self.inner_mut().intermediate_mut()
    }

    fn can_swap_working(&self) -> bool {
        self.inner().can_swap_working()
    }

    fn swap_working(&mut self) {
        self.inner_mut().swap_working();
    }

    fn can_swap_stable(&self) -> bool {
        self.inner().can_swap_stable()
    }

    fn swap_stable(&mut self) {
        self.inner_mut().swap_stable();
    }

    fn set_working_full(&mut self) {
        self.inner_mut().set_working_full();
    }

    fn set_working_empty(&mut self) {
        self.inner_mut().set_working_empty();
    }

    fn reset_handoff(&mut self) {
        self.inner_mut().reset_handoff();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_prefers_uncollected_intermediate() {
        let mut slots = WorkerSlots::new(BufferMode::Triple, 1);
        slots.resize(2, 2);
        slots.init_all(&[1, 1, 1, 1]).unwrap();
        slots.working_mut().fill(2);
        slots.swap_working();

        let double = slots.converted(BufferMode::Double).unwrap();
        assert_eq!(double.mode(), BufferMode::Double);
        assert_eq!(double.pixel_size(), 1);
        for buffer in double.physical_buffers() {
            assert_eq!(buffer.as_bytes(), &[2, 2, 2, 2]);
        }
        assert!(!double.can_swap_stable());
    }

    #[test]
    fn conversion_falls_back_to_stable() {
        let mut slots = WorkerSlots::new(BufferMode::Double, 4);
        slots.resize(1, 1);
        slots.init_all(&[9, 9, 9, 9]).unwrap();
        slots.working_mut().fill(7);

        let triple = slots.converted(BufferMode::Triple).unwrap();
        assert_eq!(triple.mode(), BufferMode::Triple);
        assert_eq!(triple.stable().as_bytes(), &[9, 9, 9, 9]);
        assert_eq!(triple.working().as_bytes(), &[9, 9, 9, 9]);
    }

    #[test]
    fn conversion_of_unsized_set_stays_unsized() {
        let slots = WorkerSlots::new(BufferMode::Triple, 4);
        let double = slots.converted(BufferMode::Double).unwrap();
        assert_eq!(double.dimensions(), None);
        assert_eq!(double.pixel_size(), 4);
    }
}
