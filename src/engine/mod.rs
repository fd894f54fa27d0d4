/// ### English
/// Engine internal modules (buffers, workers, textures, producers, GPU upload and orchestration).
///
/// ### 中文
/// 引擎内部模块（缓冲区、worker、纹理、生产者、GPU 上传与编排）。
pub mod buffer;
pub mod clock;
pub mod compositor;
pub mod config;
pub mod error;
pub mod producers;
pub mod texture;
pub mod upload;
pub mod worker;
