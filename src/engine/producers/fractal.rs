use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::engine::buffer::PixelBuffer;
use crate::engine::texture::{FrameProducer, Production};
use crate::engine::worker::CancelToken;

/// ### English
/// Iteration cap of the escape-time loop. Points that never escape map to 0.
///
/// ### 中文
/// 逃逸时间循环的迭代上限。始终未逃逸的点映射为 0。
pub const MAX_ITERATIONS: u32 = 256;

/// ### English
/// Rows computed between two cancellation checks. Worst-case cancellation latency is the time
/// to compute this many rows.
///
/// ### 中文
/// 两次取消检查之间计算的行数。最坏情况下的取消延迟即计算这么多行所需的时间。
pub const CANCEL_CHECK_ROWS: u32 = 64;

const DEFAULT_SEED: [f32; 2] = [-0.372_867, 0.602_788];

/// ### English
/// Escape-time value of the Julia set for the normalized point `(x, y)` in `[0, 1)^2`.
///
/// ### 中文
/// 归一化坐标 `(x, y)`（位于 `[0, 1)^2`）在 Julia 集中的逃逸时间值。
#[inline]
pub fn julia(x: f32, y: f32, seed: [f32; 2]) -> u8 {
    let mut x = 3.0 * (x - 0.5);
    let mut y = 2.0 * (y - 0.5);

    for i in 0..MAX_ITERATIONS {
        let tx = (x * x - y * y) + seed[0];
        let ty = (y * x + x * y) + seed[1];
        if tx * tx + ty * ty > 4.0 {
            return i as u8;
        }
        x = tx;
        y = ty;
    }
    0
}

/// ### English
/// Seed that wanders along a closed curve as time passes.
///
/// ### 中文
/// 随时间沿闭合曲线游走的种子点。
pub fn animated_seed(elapsed: Duration) -> [f32; 2] {
    let t = elapsed.as_millis() as f32 / 5000.0;
    let sx = ((t / 10.0).cos() * 10.0).sin() + (t * 2.0).cos() / 4.0 + (t * 3.0).sin() / 6.0;
    let sy = ((t / 10.0).sin() * 10.0).cos() + (t * 2.0).sin() / 4.0 + (t * 3.0).cos() / 6.0;
    [sx * 0.8, sy * 0.8]
}

/// ### English
/// Seed selection shared between a `FractalProducer` and whoever steers it.
///
/// ### 中文
/// 在 `FractalProducer` 与其控制方之间共享的种子点设置。
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FractalSettings {
    pub seed: [f32; 2],
    pub animated: bool,
}

impl Default for FractalSettings {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            animated: true,
        }
    }
}

/// ### English
/// Renders a Julia set into a single-channel buffer.
///
/// Settings live behind their own small lock, so they can be changed from the render thread
/// while a worker is mid-frame; each frame reads them once at its start. When animated, the
/// seed follows `animated_seed` measured from construction. Wider pixels get the same value
/// in every channel.
///
/// ### 中文
/// 将 Julia 集渲染到单通道缓冲区。
///
/// 设置位于独立的小锁之后，因此 worker 正在生成时也可以从渲染线程修改；
/// 每帧在开始时读取一次。动画模式下种子点按 `animated_seed`（从构造时刻起计时）变化。
/// 多字节像素的每个通道写入相同的值。
#[derive(Debug)]
pub struct FractalProducer {
    settings: Arc<Mutex<FractalSettings>>,
    last_seed: [f32; 2],
    epoch: Instant,
}

impl Default for FractalProducer {
    fn default() -> Self {
        Self::new(FractalSettings::default())
    }
}

impl FractalProducer {
    pub fn new(settings: FractalSettings) -> Self {
        Self {
            settings: Arc::new(Mutex::new(settings)),
            last_seed: settings.seed,
            epoch: Instant::now(),
        }
    }

    /// ### English
    /// Handle for changing the seed or animation flag.
    ///
    /// ### 中文
    /// 用于修改种子点或动画开关的句柄。
    pub fn settings(&self) -> Arc<Mutex<FractalSettings>> {
        self.settings.clone()
    }

    /// ### English
    /// Seed used by the most recent frame.
    ///
    /// ### 中文
    /// 最近一帧使用的种子点。
    pub fn last_seed(&self) -> [f32; 2] {
        self.last_seed
    }

    /// ### English
    /// Fills `target` with the fractal for `seed`. Returns `false` if cancelled part-way;
    /// rows already written keep their values.
    ///
    /// ### 中文
    /// 用 `seed` 对应的分形填充 `target`。中途被取消时返回 `false`；已写入的行保留其值。
    pub fn generate(target: &mut PixelBuffer, seed: [f32; 2], cancel: &CancelToken) -> bool {
        let width = target.width();
        let height = target.height();
        if width == 0 || height == 0 {
            return true;
        }
        let pixel_size = target.pixel_size();
        let row_size = target.row_size();
        let data = target.as_bytes_mut();

        for (j, row) in data.chunks_exact_mut(row_size).enumerate() {
            if j as u32 % CANCEL_CHECK_ROWS == 0 && cancel.is_cancelled() {
                return false;
            }
            let y = j as f32 / height as f32;
            for (i, pixel) in row.chunks_exact_mut(pixel_size).enumerate() {
                let value = julia(i as f32 / width as f32, y, seed);
                pixel.fill(value);
            }
        }
        true
    }
}

impl FrameProducer for FractalProducer {
    fn produce(&mut self, target: &mut PixelBuffer, cancel: &CancelToken) -> Production {
        let settings = *self.settings.lock();
        let seed = if settings.animated {
            animated_seed(self.epoch.elapsed())
        } else {
            settings.seed
        };
        self.last_seed = seed;
        if Self::generate(target, seed, cancel) {
            Production::Complete
        } else {
            Production::Incomplete
        }
    }
}
