//! ### English
//! Error types for buffers, workers, textures, video sources and configuration.
//!
//! Buffer and worker errors are programmer errors: callers are expected to propagate them and
//! stop. Video errors are caught at the texture boundary and only logged.
//!
//! ### 中文
//! 缓冲区、worker、纹理、视频源与配置相关的错误类型。
//!
//! 缓冲区与 worker 错误属于编程错误：调用方应向上传播并终止。
//! 视频错误会在纹理边界被捕获，只记录日志。

use thiserror::Error;

/// ### English
/// Errors raised by pixel buffers and slot sets.
///
/// ### 中文
/// 像素缓冲区与槽位集合产生的错误。
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// ### English
    /// A write supplied a byte count different from the buffer's computed size.
    /// The buffer is left untouched.
    ///
    /// ### 中文
    /// 写入的字节数与缓冲区计算尺寸不一致；缓冲区内容保持不变。
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// ### English
/// Errors raised by the producer worker state machine.
///
/// ### 中文
/// 生产者 worker 状态机产生的错误。
#[derive(Debug, Error)]
pub enum WorkerError {
    /// ### English
    /// `pause`/`resume` called on a worker that was already stopped.
    ///
    /// ### 中文
    /// 在已停止的 worker 上调用了 `pause`/`resume`。
    #[error("cannot {op} worker `{worker}` after it was stopped")]
    InvalidTransition { worker: String, op: &'static str },
    /// ### English
    /// `start` called twice.
    ///
    /// ### 中文
    /// 重复调用 `start`。
    #[error("worker `{0}` was already started")]
    AlreadyStarted(String),
    /// ### English
    /// The worker's slot set was touched while the producer thread may be mid-frame.
    ///
    /// ### 中文
    /// 在生产者线程可能正在写帧时访问了 worker 的槽位集合。
    #[error("worker `{0}` must be paused before its buffers are changed")]
    NotQuiesced(String),
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
    /// ### English
    /// The worker thread died before acknowledging its first pause.
    ///
    /// ### 中文
    /// worker 线程在确认首次暂停之前就退出了。
    #[error("worker `{0}` exited before reaching its first pause")]
    ThreadExited(String),
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

/// ### English
/// Errors raised by texture objects.
///
/// ### 中文
/// 纹理对象产生的错误。
#[derive(Debug, Error)]
pub enum TextureError {
    /// ### English
    /// `disable` called more often than `enable`.
    ///
    /// ### 中文
    /// `disable` 的调用次数多于 `enable`。
    #[error("texture `{0}` was disabled more times than it was enabled")]
    EnableUnderflow(String),
    #[error(transparent)]
    Worker(#[from] WorkerError),
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

/// ### English
/// Failures reported by a video decoder. Recoverable: the texture falls back to a blank frame.
///
/// ### 中文
/// 视频解码器报告的失败。可恢复：纹理会回退为空白帧。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VideoError {
    #[error("failed to open video `{path}`: {reason}")]
    Open { path: String, reason: String },
    #[error("{stage}: {message}")]
    Decode { stage: &'static str, message: String },
}

/// ### English
/// Errors raised while loading a `CompositorConfig`.
///
/// ### 中文
/// 加载 `CompositorConfig` 时产生的错误。
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// ### English
/// Errors surfaced by `Compositor` operations.
///
/// ### 中文
/// `Compositor` 操作返回的错误。
#[derive(Debug, Error)]
pub enum CompositorError {
    #[error(transparent)]
    Worker(#[from] WorkerError),
    #[error(transparent)]
    Texture(#[from] TextureError),
}
