//! ### English
//! Render-thread clock: the periodic tick that drives `Compositor::tick` and an FPS counter.
//!
//! ### 中文
//! 渲染线程时钟：驱动 `Compositor::tick` 的周期 tick 与 FPS 计数器。

mod fps;
mod timer;

pub use fps::{FPS_WINDOW, FpsCounter};
pub use timer::RenderTimer;
