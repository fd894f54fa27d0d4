//! ### English
//! Pixel storage and the slot sets that hand frames from a producer to the render thread.
//!
//! `SingleBuffer` serves inline production, `DoubleBuffer` / `TripleBuffer` serve worker
//! threads (wrapped by `WorkerSlots`). All three implement `SlotBuffers`.
//!
//! ### 中文
//! 像素存储，以及把帧从生产者交给渲染线程的槽位集合。
//!
//! `SingleBuffer` 用于内联生成，`DoubleBuffer` / `TripleBuffer` 用于 worker 线程
//! （由 `WorkerSlots` 包装）。三者都实现 `SlotBuffers`。
mod double;
mod pixel;
mod single;
mod slot_set;
mod triple;
mod worker_slots;

pub use double::DoubleBuffer;
pub use pixel::{PixelBuffer, PixelFormat};
pub use single::SingleBuffer;
pub use slot_set::{BufferMode, SlotBuffers};
pub use triple::TripleBuffer;
pub use worker_slots::WorkerSlots;
