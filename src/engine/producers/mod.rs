//! ### English
//! Concrete frame producers: a Julia-set fractal and a video decode loop.
//!
//! ### 中文
//! 具体的帧生产者：Julia 集分形与视频解码循环。

mod fractal;
mod test_pattern;
mod video;

pub use fractal::{
    CANCEL_CHECK_ROWS, FractalProducer, FractalSettings, MAX_ITERATIONS, animated_seed, julia,
};
pub use test_pattern::TestPatternDecoder;
pub use video::{DecodedFrame, MAX_DECODE_ATTEMPTS, VideoDecoder, VideoProducer};
