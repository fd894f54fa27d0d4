use super::{PixelBuffer, SlotBuffers};

/// ### English
/// One physical buffer playing every role. No handoff, no concurrency: used by a texture
/// producing inline on the render thread.
///
/// ### 中文
/// 一个物理缓冲区同时扮演所有角色。无交接、无并发：用于在渲染线程内联生成的纹理。
#[derive(Clone, Debug, Default)]
pub struct SingleBuffer {
    buffer: PixelBuffer,
}

impl SingleBuffer {
    pub fn new(pixel_size: usize) -> Self {
        Self {
            buffer: PixelBuffer::new(pixel_size),
        }
    }
}

impl SlotBuffers for SingleBuffer {
    fn physical_buffers(&self) -> Vec<&PixelBuffer> {
        vec![&self.buffer]
    }

    fn physical_buffers_mut(&mut self) -> Vec<&mut PixelBuffer> {
        vec![&mut self.buffer]
    }

    #[inline]
    fn working(&self) -> &PixelBuffer {
        &self.buffer
    }

    #[inline]
    fn working_mut(&mut self) -> &mut PixelBuffer {
        &mut self.buffer
    }

    #[inline]
    fn stable(&self) -> &PixelBuffer {
        &self.buffer
    }

    #[inline]
    fn intermediate(&self) -> &PixelBuffer {
        &self.buffer
    }

    #[inline]
    fn intermediate_mut(&mut self) -> &mut PixelBuffer {
        &mut self.buffer
    }

    fn can_swap_working(&self) -> bool {
        false
    }

    fn swap_working(&mut self) {}

    fn can_swap_stable(&self) -> bool {
        false
    }

    fn swap_stable(&mut self) {}

    fn set_working_full(&mut self) {}

    fn set_working_empty(&mut self) {}

    fn reset_handoff(&mut self) {}
}
