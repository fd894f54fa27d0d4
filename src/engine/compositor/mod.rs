//! ### English
//! Render-surface orchestration: owns the textures and their workers, switches the buffering
//! mode, resizes, and drives the per-tick update.
//!
//! Every operation that touches worker buffers runs inside a `PauseGuard`, so workers are
//! resumed on every exit path once they were paused.
//!
//! ### 中文
//! 渲染表面编排：持有纹理及其 worker，切换缓冲模式、调整尺寸并驱动每次 tick 的更新。
//!
//! 所有触及 worker 缓冲区的操作都在 `PauseGuard` 内执行，
//! 因此 worker 一旦被暂停，在任何退出路径上都会被恢复。

mod effects;

use std::sync::Arc;
use std::time::Instant;

use dpi::PhysicalSize;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::engine::buffer::{BufferMode, PixelFormat};
use crate::engine::clock::FpsCounter;
use crate::engine::config::{CompositorConfig, FractalConfig};
use crate::engine::error::{CompositorError, VideoError};
use crate::engine::producers::{FractalProducer, FractalSettings, VideoDecoder, VideoProducer};
use crate::engine::texture::TextureObject;
use crate::engine::upload::TextureUploader;
use crate::engine::worker::{PauseGuard, Worker};

pub use effects::{EffectKind, EffectSet, TextureId};

impl From<&FractalConfig> for FractalSettings {
    fn from(config: &FractalConfig) -> Self {
        Self {
            seed: config.seed,
            animated: config.animated,
        }
    }
}

/// ### English
/// Owner of the video and fractal textures, one worker per texture, and the effect set.
///
/// All methods run on the render thread. Methods that touch the GPU take the uploader
/// explicitly.
///
/// ### 中文
/// 视频与分形纹理、每个纹理一个 worker 以及效果集合的持有者。
///
/// 所有方法都在渲染线程上运行。涉及 GPU 的方法显式接收 uploader。
pub struct Compositor {
    mode: BufferMode,
    threaded: bool,
    workers: Vec<Arc<Worker>>,
    textures: [TextureObject; 2],
    video: Arc<Mutex<VideoProducer>>,
    fractal: Arc<Mutex<FractalSettings>>,
    effects: EffectSet,
    fps: FpsCounter,
    size: Option<PhysicalSize<u32>>,
}

impl Compositor {
    /// ### English
    /// Builds the textures, starts one parked worker per texture, sizes everything to the
    /// configured initial size, enables `FractalBlend` and applies the configured mode.
    ///
    /// ### 中文
    /// 创建纹理，为每个纹理启动一个已停放的 worker，按配置的初始尺寸设置所有尺寸，
    /// 启用 `FractalBlend` 并应用配置的缓冲模式。
    pub fn new(
        config: &CompositorConfig,
        gpu: &mut dyn TextureUploader,
    ) -> Result<Self, CompositorError> {
        let video = Arc::new(Mutex::new(VideoProducer::new()));
        let fractal_producer = FractalProducer::new(FractalSettings::from(&config.fractal));
        let fractal = fractal_producer.settings();
        let fractal_producer = Arc::new(Mutex::new(fractal_producer));

        let mut textures = [
            TextureObject::new(
                "video",
                PixelFormat::Bgra8,
                video.clone(),
                config.video_ms_per_frame,
            ),
            TextureObject::new(
                "fractal",
                PixelFormat::R8,
                fractal_producer,
                config.fractal_ms_per_frame,
            ),
        ];

        let mut workers = Vec::with_capacity(textures.len());
        for texture in &mut textures {
            let name = format!("{}-{}", config.worker_name_prefix, texture.label());
            let worker = Arc::new(Worker::new(name));
            texture.bind_worker(worker.clone())?;
            worker.start()?;
            workers.push(worker);
        }

        let mut compositor = Self {
            mode: BufferMode::Single,
            threaded: false,
            workers,
            textures,
            video,
            fractal,
            effects: EffectSet::default(),
            fps: FpsCounter::new(Instant::now()),
            size: None,
        };
        compositor.resize(config.initial_size(), gpu)?;
        compositor.enable_effect(EffectKind::FractalBlend)?;
        compositor.change_buffer_mode(config.buffer_mode)?;
        Ok(compositor)
    }

    #[inline]
    pub fn buffer_mode(&self) -> BufferMode {
        self.mode
    }

    #[inline]
    pub fn is_threaded(&self) -> bool {
        self.threaded
    }

    #[inline]
    pub fn size(&self) -> Option<PhysicalSize<u32>> {
        self.size
    }

    pub fn texture(&self, id: TextureId) -> &TextureObject {
        &self.textures[id.index()]
    }

    pub fn worker(&self, id: TextureId) -> &Arc<Worker> {
        &self.workers[id.index()]
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps.fps()
    }

    /// ### English
    /// Switches between inline, double-buffered and triple-buffered production.
    ///
    /// Entering single mode leaves the workers parked and pulls their newest frame into the
    /// textures. Entering a threaded mode sets each worker's slot variant and, when coming
    /// from single mode, seeds the workers with the textures' frames.
    ///
    /// ### 中文
    /// 在内联、双缓冲与三缓冲生成之间切换。
    ///
    /// 进入单缓冲模式时 worker 保持停放，并把其最新帧拉回纹理。进入多线程模式时设置每个
    /// worker 的槽位变体；若来自单缓冲模式，则用纹理中的帧填充 worker。
    pub fn change_buffer_mode(&mut self, mode: BufferMode) -> Result<(), CompositorError> {
        if mode == self.mode {
            return Ok(());
        }
        let previous = self.mode;
        let mut guard = PauseGuard::new(&self.workers, self.threaded)?;

        match mode {
            BufferMode::Single => {
                for texture in &mut self.textures {
                    texture.copy_worker_data_to_me()?;
                }
                self.threaded = false;
                guard.set_resume(false);
            }
            BufferMode::Double | BufferMode::Triple => {
                for worker in &self.workers {
                    match mode {
                        BufferMode::Double => worker.use_double_buffer()?,
                        _ => worker.use_triple_buffer()?,
                    }
                }
                if !previous.is_threaded() {
                    for texture in &self.textures {
                        texture.copy_my_data_to_worker()?;
                    }
                }
                self.threaded = true;
                guard.set_resume(true);
            }
        }

        self.mode = mode;
        info!(?previous, ?mode, "buffer mode changed");
        Ok(())
    }

    /// ### English
    /// Resizes every texture. Returns whether any texture really changed size; those are
    /// force-updated on the next tick.
    ///
    /// ### 中文
    /// 调整所有纹理的尺寸。返回是否有纹理真正改变了尺寸；这些纹理会在下一次 tick 强制更新。
    pub fn resize(
        &mut self,
        size: PhysicalSize<u32>,
        gpu: &mut dyn TextureUploader,
    ) -> Result<bool, CompositorError> {
        let _guard = PauseGuard::new(&self.workers, self.threaded)?;
        let mut resized = false;
        for texture in &mut self.textures {
            resized |= texture.resize(size, gpu)?;
        }
        self.size = Some(size);
        if resized {
            info!(width = size.width, height = size.height, "compositor resized");
        }
        Ok(resized)
    }

    /// ### English
    /// Per-frame update: refreshes every enabled texture whose timer is due (or that was just
    /// resized or enabled). Returns the number of uploads.
    ///
    /// ### 中文
    /// 每帧更新：刷新所有计时器到期（或刚被调整尺寸/启用）的已启用纹理。返回上传次数。
    pub fn tick(&mut self, elapsed_ms: u32, gpu: &mut dyn TextureUploader) -> usize {
        if let Some(fps) = self.fps.frame(Instant::now()) {
            debug!(fps, "render rate");
        }

        let threaded = self.threaded;
        let mut uploads = 0;
        for texture in &mut self.textures {
            let force = texture.take_force_update();
            let uploaded = if threaded {
                texture.update_by_worker(elapsed_ms, force, gpu)
            } else {
                texture.update_by_myself(elapsed_ms, force, gpu)
            };
            uploads += usize::from(uploaded);
        }
        uploads
    }

    /// ### English
    /// Replaces the video source with whatever `open` returns.
    ///
    /// An open failure is logged and leaves the previous source (or a blank frame) in place.
    /// Returns whether the source changed.
    ///
    /// ### 中文
    /// 用 `open` 返回的解码器替换视频源。
    ///
    /// 打开失败时只记录日志，保留之前的视频源（或空白帧）。返回视频源是否被替换。
    pub fn change_video<F>(&mut self, open: F) -> Result<bool, CompositorError>
    where
        F: FnOnce() -> Result<Box<dyn VideoDecoder>, VideoError>,
    {
        let _guard = PauseGuard::new(&self.workers, self.threaded)?;
        match open() {
            Ok(decoder) => {
                self.video.lock().change_video(decoder);
                self.textures[TextureId::Video.index()].request_update();
                info!("video source changed");
                Ok(true)
            }
            Err(err) => {
                warn!(%err, "failed to load video");
                Ok(false)
            }
        }
    }

    /// ### English
    /// Turns an effect on, enabling its textures. Returns `false` if it was already on.
    ///
    /// ### 中文
    /// 开启一个效果并启用其纹理。若已开启则返回 `false`。
    pub fn enable_effect(&mut self, kind: EffectKind) -> Result<bool, CompositorError> {
        if !self.effects.set(kind, true) {
            return Ok(false);
        }
        for id in kind.textures() {
            self.textures[id.index()].enable();
        }
        debug!(?kind, "effect enabled");
        Ok(true)
    }

    /// ### English
    /// Turns an effect off, releasing its textures. Returns `false` if it was already off.
    ///
    /// ### 中文
    /// 关闭一个效果并释放其纹理。若已关闭则返回 `false`。
    pub fn disable_effect(&mut self, kind: EffectKind) -> Result<bool, CompositorError> {
        if !self.effects.set(kind, false) {
            return Ok(false);
        }
        for id in kind.textures() {
            self.textures[id.index()].disable()?;
        }
        debug!(?kind, "effect disabled");
        Ok(true)
    }

    #[inline]
    pub fn effects(&self) -> &EffectSet {
        &self.effects
    }

    pub fn set_fractal_animated(&self, animated: bool) {
        self.fractal.lock().animated = animated;
    }

    pub fn set_fractal_seed(&self, seed: [f32; 2]) {
        self.fractal.lock().seed = seed;
    }

    pub fn fractal_settings(&self) -> FractalSettings {
        *self.fractal.lock()
    }

    /// ### English
    /// Stops every worker. Idempotent; also run on drop. GPU textures are released separately
    /// with `release`.
    ///
    /// ### 中文
    /// 停止所有 worker。幂等；drop 时也会执行。GPU 纹理需另行通过 `release` 释放。
    pub fn shutdown(&mut self) {
        for worker in &self.workers {
            worker.stop();
        }
    }

    /// ### English
    /// Deletes every GPU texture. Must run on the render thread.
    ///
    /// ### 中文
    /// 删除所有 GPU 纹理。必须在渲染线程上调用。
    pub fn release(&mut self, gpu: &mut dyn TextureUploader) {
        for texture in &mut self.textures {
            texture.release(gpu);
        }
    }
}

impl Drop for Compositor {
    fn drop(&mut self) {
        self.shutdown();
    }
}
