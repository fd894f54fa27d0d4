//! ### English
//! Texture objects: the mediator between a frame producer, an optional worker thread and the
//! GPU texture the compositor samples.
//!
//! ### 中文
//! 纹理对象：帧生产者、可选的 worker 线程与合成器采样的 GPU 纹理之间的中介。

mod object;
mod producer;
mod timer;

pub use object::TextureObject;
pub use producer::{FrameProducer, Production, SharedProducer};
pub use timer::FrameTimer;
