use std::sync::Arc;

use dpi::PhysicalSize;
use tracing::{debug, trace};

use crate::engine::buffer::{PixelBuffer, PixelFormat, SingleBuffer, SlotBuffers};
use crate::engine::error::TextureError;
use crate::engine::upload::{TextureHandle, TextureUploader};
use crate::engine::worker::{CancelToken, Worker};

use super::{FrameTimer, Production, SharedProducer};

/// ### English
/// One GPU texture and the machinery that keeps it fed.
///
/// A texture owns a `SingleBuffer` for inline production and may be bound to a `Worker` for
/// threaded production. Which path runs is decided per tick by the compositor; the two
/// representations are reconciled with `copy_my_data_to_worker` / `copy_worker_data_to_me`
/// when the buffering mode changes.
///
/// The enable count is shared by every effect that samples the texture; the texture only
/// refreshes while it is positive.
///
/// ### 中文
/// 一个 GPU 纹理以及为其持续供帧的机制。
///
/// 纹理持有一个用于内联生成的 `SingleBuffer`，并可绑定一个 `Worker` 进行多线程生成。
/// 每次 tick 走哪条路径由合成器决定；缓冲模式切换时通过
/// `copy_my_data_to_worker` / `copy_worker_data_to_me` 使两种表示保持一致。
///
/// 启用计数由所有采样该纹理的效果共享；只有计数为正时纹理才会刷新。
pub struct TextureObject {
    label: String,
    format: PixelFormat,
    buffer: SingleBuffer,
    producer: SharedProducer,
    worker: Option<Arc<Worker>>,
    texture: Option<TextureHandle>,
    enable_count: u32,
    timer: FrameTimer,
    force_update: bool,
}

impl TextureObject {
    pub fn new(
        label: impl Into<String>,
        format: PixelFormat,
        producer: SharedProducer,
        ms_per_frame: u32,
    ) -> Self {
        Self {
            label: label.into(),
            format,
            buffer: SingleBuffer::new(format.pixel_size()),
            producer,
            worker: None,
            texture: None,
            enable_count: 0,
            timer: FrameTimer::new(ms_per_frame),
            force_update: false,
        }
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn dimensions(&self) -> Option<PhysicalSize<u32>> {
        self.buffer.dimensions()
    }

    #[inline]
    pub fn texture(&self) -> Option<TextureHandle> {
        self.texture
    }

    #[inline]
    pub fn worker(&self) -> Option<&Arc<Worker>> {
        self.worker.as_ref()
    }

    #[inline]
    pub fn producer(&self) -> &SharedProducer {
        &self.producer
    }

    /// ### English
    /// Frame most recently produced on the inline path.
    ///
    /// ### 中文
    /// 内联路径上最近生成的帧。
    #[inline]
    pub fn buffer(&self) -> &PixelBuffer {
        self.buffer.stable()
    }

    /// ### English
    /// Binds `worker` to this texture's producer and sizes its slots like the own buffer.
    ///
    /// The worker must be quiesced.
    ///
    /// ### 中文
    /// 将 `worker` 绑定到本纹理的生产者，并按自身缓冲区设置其槽位尺寸。
    ///
    /// worker 必须处于静止状态。
    pub fn bind_worker(&mut self, worker: Arc<Worker>) -> Result<(), TextureError> {
        worker.bind_producer(self.producer.clone(), self.format.pixel_size())?;
        if let Some(size) = self.buffer.dimensions() {
            worker.with_slots(|slots| {
                slots.resize(size.width, size.height);
                slots.clear_all();
            })?;
        }
        self.worker = Some(worker);
        Ok(())
    }

    /// ### English
    /// Resizes the own buffer, the bound worker's slots and the GPU texture.
    ///
    /// Returns `false` without touching anything if the size is unchanged. Otherwise every
    /// buffer is zeroed (or primed with one inline frame when the producer asks for it), the
    /// GPU texture is recreated from the own buffer and the next tick is forced.
    ///
    /// The bound worker must be quiesced.
    ///
    /// ### 中文
    /// 调整自身缓冲区、所绑定 worker 的槽位以及 GPU 纹理的尺寸。
    ///
    /// 尺寸未变化时直接返回 `false`。否则所有缓冲区清零（若生产者要求，则用一帧内联生成的
    /// 内容预填充），GPU 纹理由自身缓冲区重建，并强制下一次 tick 更新。
    ///
    /// 所绑定的 worker 必须处于静止状态。
    pub fn resize(
        &mut self,
        size: PhysicalSize<u32>,
        gpu: &mut dyn TextureUploader,
    ) -> Result<bool, TextureError> {
        if self.buffer.dimensions() == Some(size) {
            return Ok(false);
        }

        if let Some(worker) = &self.worker {
            worker.with_slots(|slots| {
                slots.resize(size.width, size.height);
                slots.clear_all();
            })?;
        }
        self.buffer.resize(size.width, size.height);
        self.buffer.clear_all();

        let primes = {
            let mut producer = self.producer.lock();
            producer.resize(size);
            producer.primes_on_resize()
        };
        if primes {
            self.produce_inline();
            if let Some(worker) = &self.worker {
                let frame = self.buffer.stable().as_bytes();
                worker.with_slots(|slots| slots.init_all(frame))??;
            }
        }

        if let Some(old) = self.texture.take() {
            gpu.delete_texture(old);
        }
        self.texture = Some(gpu.create_texture(
            size,
            self.format,
            Some(self.buffer.stable().as_bytes()),
        ));
        self.force_update = true;

        debug!(
            texture = %self.label,
            width = size.width,
            height = size.height,
            primed = primes,
            "texture resized"
        );
        Ok(true)
    }

    /// ### English
    /// Threaded path: collects the newest frame from the worker and uploads it.
    ///
    /// Does nothing while disabled, unbound, or before the frame timer is due (unless
    /// `force_update`). Never blocks on the producer. Returns whether an upload happened.
    ///
    /// ### 中文
    /// 多线程路径：从 worker 取得最新帧并上传。
    ///
    /// 未启用、未绑定，或帧计时器未到期（且未 `force_update`）时不做任何事。
    /// 从不阻塞等待生产者。返回是否发生了上传。
    pub fn update_by_worker(
        &mut self,
        elapsed_ms: u32,
        force_update: bool,
        gpu: &mut dyn TextureUploader,
    ) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let due = self.timer.timeout(elapsed_ms);
        if !due && !force_update {
            return false;
        }
        let (Some(worker), Some(handle)) = (&self.worker, self.texture) else {
            return false;
        };

        let format = self.format;
        worker.with_updated_buffer(|stable| gpu.upload(handle, stable, format));
        trace!(texture = %self.label, "uploaded worker frame");
        true
    }

    /// ### English
    /// Single-threaded path: renders a frame inline on the caller's thread and uploads it.
    ///
    /// `force_update` bypasses the frame timer. Returns whether an upload happened.
    ///
    /// ### 中文
    /// 单线程路径：在调用线程上内联渲染一帧并上传。
    ///
    /// `force_update` 会绕过帧计时器。返回是否发生了上传。
    pub fn update_by_myself(
        &mut self,
        elapsed_ms: u32,
        force_update: bool,
        gpu: &mut dyn TextureUploader,
    ) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let due = self.timer.timeout(elapsed_ms);
        if !due && !force_update {
            return false;
        }
        let Some(handle) = self.texture else {
            return false;
        };

        self.produce_inline();
        gpu.upload(handle, self.buffer.stable(), self.format);
        trace!(texture = %self.label, "uploaded inline frame");
        true
    }

    fn produce_inline(&mut self) {
        let cancel = CancelToken::new();
        let production = self
            .producer
            .lock()
            .produce(self.buffer.working_mut(), &cancel);
        if production == Production::Incomplete {
            trace!(texture = %self.label, "inline production kept the previous frame");
        }
    }

    /// ### English
    /// Seeds every worker slot with the own buffer. Used when leaving single-buffer mode.
    ///
    /// ### 中文
    /// 用自身缓冲区填充 worker 的所有槽位。离开单缓冲模式时使用。
    pub fn copy_my_data_to_worker(&self) -> Result<(), TextureError> {
        if let Some(worker) = &self.worker {
            let frame = self.buffer.stable().as_bytes();
            worker.with_slots(|slots| slots.init_all(frame))??;
        }
        Ok(())
    }

    /// ### English
    /// Copies the worker's most recent completed frame into the own buffer. Used when entering
    /// single-buffer mode.
    ///
    /// ### 中文
    /// 把 worker 最近完成的帧复制到自身缓冲区。进入单缓冲模式时使用。
    pub fn copy_worker_data_to_me(&mut self) -> Result<(), TextureError> {
        if let Some(worker) = &self.worker {
            let buffer = &mut self.buffer;
            worker.with_slots(|slots| buffer.init_all(slots.latest().as_bytes()))??;
        }
        Ok(())
    }

    /// ### English
    /// Adds one user. The first user forces a refresh on the next tick.
    ///
    /// ### 中文
    /// 增加一个使用者。第一个使用者会强制下一次 tick 刷新。
    pub fn enable(&mut self) {
        self.enable_count += 1;
        if self.enable_count == 1 {
            self.force_update = true;
        }
    }

    pub fn disable(&mut self) -> Result<(), TextureError> {
        if self.enable_count == 0 {
            return Err(TextureError::EnableUnderflow(self.label.clone()));
        }
        self.enable_count -= 1;
        Ok(())
    }

    #[inline]
    pub fn enable_count(&self) -> u32 {
        self.enable_count
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enable_count > 0
    }

    /// ### English
    /// Forces a refresh on the next tick, bypassing the frame timer.
    ///
    /// ### 中文
    /// 强制在下一次 tick 刷新（绕过帧计时器）。
    pub fn request_update(&mut self) {
        self.force_update = true;
    }

    /// ### English
    /// Returns and clears the pending forced refresh.
    ///
    /// ### 中文
    /// 返回并清除待处理的强制刷新标记。
    pub fn take_force_update(&mut self) -> bool {
        std::mem::take(&mut self.force_update)
    }

    /// ### English
    /// Deletes the GPU texture. Must run on the render thread before the uploader goes away.
    ///
    /// ### 中文
    /// 删除 GPU 纹理。必须在渲染线程上、uploader 销毁之前调用。
    pub fn release(&mut self, gpu: &mut dyn TextureUploader) {
        if let Some(handle) = self.texture.take() {
            gpu.delete_texture(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;
    use crate::engine::texture::FrameProducer;
    use crate::engine::upload::HeadlessUploader;

    struct Solid {
        value: u8,
        primes: bool,
        resized_to: Option<PhysicalSize<u32>>,
    }

    impl FrameProducer for Solid {
        fn produce(&mut self, target: &mut PixelBuffer, _cancel: &CancelToken) -> Production {
            target.fill(self.value);
            Production::Complete
        }

        fn resize(&mut self, size: PhysicalSize<u32>) {
            self.resized_to = Some(size);
        }

        fn primes_on_resize(&self) -> bool {
            self.primes
        }
    }

    fn solid(value: u8, primes: bool) -> Arc<Mutex<Solid>> {
        Arc::new(Mutex::new(Solid {
            value,
            primes,
            resized_to: None,
        }))
    }

    #[test]
    fn resize_reports_real_changes_only() {
        let mut gpu = HeadlessUploader::new();
        let producer = solid(7, false);
        let mut texture = TextureObject::new("solid", PixelFormat::R8, producer.clone(), 0);

        assert!(texture.resize(PhysicalSize::new(4, 2), &mut gpu).unwrap());
        let first = texture.texture().unwrap();
        assert!(!texture.resize(PhysicalSize::new(4, 2), &mut gpu).unwrap());
        assert_eq!(texture.texture(), Some(first));
        assert_eq!(gpu.live_textures(), 1);
        assert_eq!(producer.lock().resized_to, Some(PhysicalSize::new(4, 2)));

        assert!(texture.resize(PhysicalSize::new(2, 2), &mut gpu).unwrap());
        assert_ne!(texture.texture(), Some(first));
        assert_eq!(gpu.live_textures(), 1);
        assert!(texture.take_force_update());
        assert!(!texture.take_force_update());
    }

    #[test]
    fn priming_fills_texture_at_creation() {
        let mut gpu = HeadlessUploader::new();
        let mut texture = TextureObject::new("primed", PixelFormat::Bgra8, solid(3, true), 0);
        texture.resize(PhysicalSize::new(1, 2), &mut gpu).unwrap();
        let record = gpu.texture(texture.texture().unwrap()).unwrap();
        assert_eq!(record.pixels, vec![3; 8]);
    }

    #[test]
    fn disabled_texture_never_updates() {
        let mut gpu = HeadlessUploader::new();
        let mut texture = TextureObject::new("off", PixelFormat::R8, solid(1, false), 0);
        texture.resize(PhysicalSize::new(2, 2), &mut gpu).unwrap();
        assert!(!texture.update_by_myself(16, true, &mut gpu));
        assert_eq!(gpu.texture(texture.texture().unwrap()).unwrap().uploads, 0);
    }

    #[test]
    fn inline_update_respects_timer_unless_forced() {
        let mut gpu = HeadlessUploader::new();
        let mut texture = TextureObject::new("timed", PixelFormat::R8, solid(9, false), 40);
        texture.resize(PhysicalSize::new(2, 2), &mut gpu).unwrap();
        texture.enable();

        assert!(!texture.update_by_myself(16, false, &mut gpu));
        assert!(texture.update_by_myself(0, true, &mut gpu));
        let record = gpu.texture(texture.texture().unwrap()).unwrap();
        assert_eq!(record.uploads, 1);
        assert_eq!(record.pixels, vec![9; 4]);
        assert!(texture.update_by_myself(24, false, &mut gpu));
    }

    #[test]
    fn enable_count_never_goes_negative() {
        let mut texture = TextureObject::new("count", PixelFormat::R8, solid(0, false), 0);
        texture.enable();
        texture.enable();
        assert_eq!(texture.enable_count(), 2);
        texture.disable().unwrap();
        texture.disable().unwrap();
        assert!(!texture.is_enabled());
        assert!(matches!(
            texture.disable(),
            Err(TextureError::EnableUnderflow(_))
        ));
    }

    #[test]
    fn data_moves_between_representations() {
        let mut gpu = HeadlessUploader::new();
        let producer = solid(4, false);
        let mut texture = TextureObject::new("sync", PixelFormat::R8, producer, 0);
        let worker = Arc::new(Worker::new("sync-worker"));
        texture.bind_worker(worker.clone()).unwrap();
        texture.resize(PhysicalSize::new(2, 2), &mut gpu).unwrap();
        texture.enable();

        texture.update_by_myself(0, true, &mut gpu);
        texture.copy_my_data_to_worker().unwrap();
        worker.with_updated_buffer(|stable| assert_eq!(stable.as_bytes(), &[4; 4]));

        worker
            .with_slots(|slots| slots.init_all(&[6; 4]))
            .unwrap()
            .unwrap();
        texture.copy_worker_data_to_me().unwrap();
        assert_eq!(texture.buffer().as_bytes(), &[6; 4]);
    }

    #[test]
    fn release_deletes_gpu_texture() {
        let mut gpu = HeadlessUploader::new();
        let mut texture = TextureObject::new("gone", PixelFormat::R8, solid(0, false), 0);
        texture.resize(PhysicalSize::new(1, 1), &mut gpu).unwrap();
        texture.release(&mut gpu);
        assert_eq!(gpu.live_textures(), 0);
        assert!(texture.texture().is_none());
    }
}
