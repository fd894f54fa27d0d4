use std::sync::Arc;

use dpi::PhysicalSize;
use parking_lot::Mutex;

use crate::engine::buffer::PixelBuffer;
use crate::engine::worker::CancelToken;

/// ### English
/// Outcome of one `produce` call.
///
/// ### 中文
/// 一次 `produce` 调用的结果。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Production {
    /// ### English
    /// Every byte of the target holds the new frame.
    ///
    /// ### 中文
    /// 目标缓冲区的每个字节都已写入新帧。
    Complete,
    /// ### English
    /// Cancelled part-way; the target must not be published.
    ///
    /// ### 中文
    /// 中途被取消；目标缓冲区不得发布。
    Incomplete,
}

/// ### English
/// Single-method capability that renders one frame into a pixel buffer.
///
/// `produce` runs either on a worker thread (working slot, cancellable) or inline on the
/// render thread (never cancelled). It must leave the target in a usable state even when it
/// returns `Incomplete`.
///
/// ### 中文
/// 把一帧渲染进像素缓冲区的单方法能力。
///
/// `produce` 要么在 worker 线程上运行（working 槽位，可取消），要么在渲染线程上内联运行
/// （不会被取消）。即使返回 `Incomplete`，也必须让目标缓冲区保持可用状态。
pub trait FrameProducer: Send {
    fn produce(&mut self, target: &mut PixelBuffer, cancel: &CancelToken) -> Production;

    /// ### English
    /// Notified after the owning texture changed size, while every worker is paused.
    ///
    /// ### 中文
    /// 所属纹理尺寸变化后收到通知，此时所有 worker 均已暂停。
    fn resize(&mut self, size: PhysicalSize<u32>) {
        let _ = size;
    }

    /// ### English
    /// Whether the texture should render one frame inline right after a resize, so the first
    /// frame shown at the new size is real content instead of black.
    ///
    /// ### 中文
    /// 纹理是否应在 resize 之后立即内联渲染一帧，使新尺寸下显示的第一帧是真实内容而非黑屏。
    fn primes_on_resize(&self) -> bool {
        false
    }
}

/// ### English
/// Producer shared between a texture (inline path) and its worker thread.
///
/// ### 中文
/// 在纹理（内联路径）与其 worker 线程之间共享的生产者。
pub type SharedProducer = Arc<Mutex<dyn FrameProducer>>;
