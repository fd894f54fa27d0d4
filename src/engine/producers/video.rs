use dpi::PhysicalSize;
use tracing::{debug, warn};

use crate::engine::buffer::PixelBuffer;
use crate::engine::error::VideoError;
use crate::engine::texture::{FrameProducer, Production};
use crate::engine::worker::CancelToken;

/// ### English
/// Decode calls per frame before giving up on getting a new picture.
///
/// ### 中文
/// 每帧放弃获取新画面之前的最大解码调用次数。
pub const MAX_DECODE_ATTEMPTS: u32 = 256;

/// ### English
/// Result of one decode call.
///
/// ### 中文
/// 一次解码调用的结果。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodedFrame {
    /// ### English
    /// `out` now holds a new picture. `false` for packets without a picture and after an
    /// internal end-of-stream seek.
    ///
    /// ### 中文
    /// `out` 中已写入新画面。对于不含画面的数据包或内部到达流末尾后的 seek，该值为 `false`。
    pub new_frame: bool,
    pub pts_ms: u32,
}

/// ### English
/// Video source producing BGRA frames at a configurable output size.
///
/// ### 中文
/// 以可配置输出尺寸产出 BGRA 帧的视频源。
pub trait VideoDecoder: Send {
    /// ### English
    /// Decodes the next packet into `out`, rows `row_stride` bytes apart.
    ///
    /// ### 中文
    /// 将下一个数据包解码到 `out`，相邻行间隔 `row_stride` 字节。
    fn decode_next_frame(
        &mut self,
        out: &mut [u8],
        row_stride: usize,
    ) -> Result<DecodedFrame, VideoError>;

    fn set_output_size(&mut self, size: PhysicalSize<u32>);
}

/// ### English
/// Frame producer wrapping an optional `VideoDecoder`.
///
/// Without a decoder (nothing loaded, or the last one failed) every frame is black. A decode
/// error is logged once and drops the decoder.
///
/// ### 中文
/// 包装可选 `VideoDecoder` 的帧生产者。
///
/// 没有解码器时（未加载或上一个已失败）每一帧都是黑色。解码错误只记录一次并丢弃解码器。
#[derive(Default)]
pub struct VideoProducer {
    decoder: Option<Box<dyn VideoDecoder>>,
    output_size: Option<PhysicalSize<u32>>,
    last_pts_ms: Option<u32>,
}

impl VideoProducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// ### English
    /// Installs `decoder`, sized to the current output, and returns the previous one.
    ///
    /// ### 中文
    /// 安装 `decoder`（按当前输出尺寸设置），并返回之前的解码器。
    pub fn change_video(
        &mut self,
        mut decoder: Box<dyn VideoDecoder>,
    ) -> Option<Box<dyn VideoDecoder>> {
        if let Some(size) = self.output_size {
            decoder.set_output_size(size);
        }
        self.last_pts_ms = None;
        self.decoder.replace(decoder)
    }

    pub fn has_video(&self) -> bool {
        self.decoder.is_some()
    }

    /// ### English
    /// Presentation time of the last picture handed out.
    ///
    /// ### 中文
    /// 最近一次输出画面的显示时间戳。
    pub fn last_pts_ms(&self) -> Option<u32> {
        self.last_pts_ms
    }
}

impl FrameProducer for VideoProducer {
    fn produce(&mut self, target: &mut PixelBuffer, cancel: &CancelToken) -> Production {
        let Some(decoder) = self.decoder.as_mut() else {
            target.fill(0);
            return Production::Complete;
        };
        if target.byte_len() == 0 {
            return Production::Complete;
        }

        let row_stride = target.row_size();
        for _ in 0..MAX_DECODE_ATTEMPTS {
            if cancel.is_cancelled() {
                return Production::Incomplete;
            }
            match decoder.decode_next_frame(target.as_bytes_mut(), row_stride) {
                Ok(frame) if frame.new_frame => {
                    self.last_pts_ms = Some(frame.pts_ms);
                    return Production::Complete;
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(%err, "video decode failed; output stays blank until a new video is loaded");
                    self.decoder = None;
                    target.fill(0);
                    return Production::Complete;
                }
            }
        }

        debug!(attempts = MAX_DECODE_ATTEMPTS, "no new video frame");
        Production::Incomplete
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.output_size = Some(size);
        if let Some(decoder) = self.decoder.as_mut() {
            decoder.set_output_size(size);
        }
    }

    fn primes_on_resize(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Returns `new_frame = false` `gaps` times before each picture.
    struct Gappy {
        gaps: u32,
        calls: u32,
        fail: bool,
    }

    impl VideoDecoder for Gappy {
        fn decode_next_frame(
            &mut self,
            out: &mut [u8],
            _row_stride: usize,
        ) -> Result<DecodedFrame, VideoError> {
            if self.fail {
                return Err(VideoError::Decode {
                    stage: "decode",
                    message: "corrupt packet".into(),
                });
            }
            self.calls += 1;
            if self.calls % (self.gaps + 1) != 0 {
                return Ok(DecodedFrame::default());
            }
            out.fill(0xAB);
            Ok(DecodedFrame {
                new_frame: true,
                pts_ms: self.calls * 10,
            })
        }

        fn set_output_size(&mut self, _size: PhysicalSize<u32>) {}
    }

    fn target() -> PixelBuffer {
        let mut buffer = PixelBuffer::new(4);
        buffer.resize(2, 2);
        buffer.fill(0x11);
        buffer
    }

    #[test]
    fn empty_producer_outputs_black() {
        let mut producer = VideoProducer::new();
        let mut buffer = target();
        assert_eq!(producer.produce(&mut buffer, &CancelToken::new()), Production::Complete);
        assert!(buffer.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn decodes_until_a_new_frame_arrives() {
        let mut producer = VideoProducer::new();
        producer.change_video(Box::new(Gappy {
            gaps: 3,
            calls: 0,
            fail: false,
        }));
        let mut buffer = target();
        assert_eq!(producer.produce(&mut buffer, &CancelToken::new()), Production::Complete);
        assert_eq!(buffer.as_bytes(), &[0xAB; 16]);
        assert_eq!(producer.last_pts_ms(), Some(40));
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let mut producer = VideoProducer::new();
        producer.change_video(Box::new(Gappy {
            gaps: MAX_DECODE_ATTEMPTS,
            calls: 0,
            fail: false,
        }));
        let mut buffer = target();
        assert_eq!(producer.produce(&mut buffer, &CancelToken::new()), Production::Incomplete);
        assert_eq!(buffer.as_bytes(), &[0x11; 16]);
    }

    #[test]
    fn decode_error_blanks_and_drops_decoder() {
        let mut producer = VideoProducer::new();
        producer.change_video(Box::new(Gappy {
            gaps: 0,
            calls: 0,
            fail: true,
        }));
        let mut buffer = target();
        assert_eq!(producer.produce(&mut buffer, &CancelToken::new()), Production::Complete);
        assert!(buffer.as_bytes().iter().all(|&b| b == 0));
        assert!(!producer.has_video());
    }

    #[test]
    fn cancellation_stops_the_decode_loop() {
        let mut producer = VideoProducer::new();
        producer.change_video(Box::new(Gappy {
            gaps: 10,
            calls: 0,
            fail: false,
        }));
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut buffer = target();
        assert_eq!(producer.produce(&mut buffer, &cancel), Production::Incomplete);
    }
}
