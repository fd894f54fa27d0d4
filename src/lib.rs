/// ### English
/// `fx_compositor` crate root.
/// Multi-buffered frame handoff between producer threads and a render thread; the
/// implementation lives under `engine` and the public API is re-exported here.
///
/// ### 中文
/// `fx_compositor` 的 crate 根。
/// 在生产者线程与渲染线程之间进行多缓冲帧交接；实现位于 `engine` 模块，公共 API 在此重新导出。
mod engine;

pub use engine::buffer::{
    BufferMode, DoubleBuffer, PixelBuffer, PixelFormat, SingleBuffer, SlotBuffers, TripleBuffer,
    WorkerSlots,
};
pub use engine::clock::{FPS_WINDOW, FpsCounter, RenderTimer};
pub use engine::compositor::{Compositor, EffectKind, EffectSet, TextureId};
pub use engine::config::{CompositorConfig, FractalConfig};
pub use engine::error::{
    BufferError, CompositorError, ConfigError, TextureError, VideoError, WorkerError,
};
pub use engine::producers::{
    CANCEL_CHECK_ROWS, DecodedFrame, FractalProducer, FractalSettings, MAX_DECODE_ATTEMPTS,
    MAX_ITERATIONS, TestPatternDecoder, VideoDecoder, VideoProducer, animated_seed, julia,
};
pub use engine::texture::{FrameProducer, FrameTimer, Production, SharedProducer, TextureObject};
pub use engine::upload::{GlUploader, HeadlessUploader, TextureHandle, TextureUploader, UploadRecord};
pub use engine::worker::{CancelToken, PauseGuard, Worker};
