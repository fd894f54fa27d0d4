use dpi::PhysicalSize;

use crate::engine::error::VideoError;

use super::{DecodedFrame, VideoDecoder};

const BAR_WIDTH: u32 = 16;
const SCROLL_PER_FRAME: u32 = 4;
const MS_PER_FRAME: u32 = 40;

/// ### English
/// BGRA colours of the scrolling bars.
///
/// ### 中文
/// 滚动色条的 BGRA 颜色。
const BARS: [[u8; 4]; 8] = [
    [0xFF, 0xFF, 0xFF, 0xFF],
    [0x00, 0xFF, 0xFF, 0xFF],
    [0xFF, 0xFF, 0x00, 0xFF],
    [0x00, 0xFF, 0x00, 0xFF],
    [0xFF, 0x00, 0xFF, 0xFF],
    [0x00, 0x00, 0xFF, 0xFF],
    [0xFF, 0x00, 0x00, 0xFF],
    [0x00, 0x00, 0x00, 0xFF],
];

/// ### English
/// Synthetic video source: colour bars scrolling one step per frame.
///
/// After `frames` pictures it reports one `new_frame = false` call (the end-of-stream seek)
/// and starts over.
///
/// ### 中文
/// 合成视频源：每帧滚动一步的彩条。
///
/// 输出 `frames` 张画面后会返回一次 `new_frame = false`（到达流末尾后的 seek），然后从头开始。
#[derive(Clone, Debug)]
pub struct TestPatternDecoder {
    frames: u32,
    index: u32,
    output_size: PhysicalSize<u32>,
}

impl TestPatternDecoder {
    pub fn new(frames: u32) -> Self {
        Self {
            frames: frames.max(1),
            index: 0,
            output_size: PhysicalSize::new(0, 0),
        }
    }

    /// ### English
    /// Opens a `testpattern:<frames>` source name.
    ///
    /// ### 中文
    /// 打开形如 `testpattern:<frames>` 的视频源名称。
    pub fn open(path: &str) -> Result<Self, VideoError> {
        let open_error = |reason: &str| VideoError::Open {
            path: path.to_string(),
            reason: reason.to_string(),
        };
        let frames = path
            .strip_prefix("testpattern:")
            .ok_or_else(|| open_error("unsupported source"))?
            .parse::<u32>()
            .map_err(|err| open_error(&err.to_string()))?;
        Ok(Self::new(frames))
    }
}

impl VideoDecoder for TestPatternDecoder {
    fn decode_next_frame(
        &mut self,
        out: &mut [u8],
        row_stride: usize,
    ) -> Result<DecodedFrame, VideoError> {
        if self.index == self.frames {
            self.index = 0;
            return Ok(DecodedFrame::default());
        }

        let width = self.output_size.width as usize;
        let height = self.output_size.height as usize;
        let row_bytes = width * 4;
        if row_stride == 0 || row_stride < row_bytes || out.len() < row_stride * height {
            return Err(VideoError::Decode {
                stage: "scale",
                message: format!(
                    "output buffer of {} bytes (stride {row_stride}) cannot hold {width}x{height}",
                    out.len()
                ),
            });
        }

        let offset = self.index * SCROLL_PER_FRAME;
        for row in out.chunks_exact_mut(row_stride).take(height) {
            for (x, pixel) in row[..row_bytes].chunks_exact_mut(4).enumerate() {
                let bar = ((x as u32 + offset) / BAR_WIDTH) as usize % BARS.len();
                pixel.copy_from_slice(&BARS[bar]);
            }
        }

        let pts_ms = self.index * MS_PER_FRAME;
        self.index += 1;
        Ok(DecodedFrame {
            new_frame: true,
            pts_ms,
        })
    }

    fn set_output_size(&mut self, size: PhysicalSize<u32>) {
        self.output_size = size;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_parses_frame_count() {
        assert_eq!(TestPatternDecoder::open("testpattern:3").unwrap().frames, 3);
        assert!(matches!(
            TestPatternDecoder::open("movie.mp4"),
            Err(VideoError::Open { .. })
        ));
        assert!(TestPatternDecoder::open("testpattern:x").is_err());
    }

    #[test]
    fn loops_with_a_seek_gap() {
        let mut decoder = TestPatternDecoder::new(2);
        decoder.set_output_size(PhysicalSize::new(4, 1));
        let mut out = vec![0u8; 16];
        let pts: Vec<_> = (0..4)
            .map(|_| decoder.decode_next_frame(&mut out, 16).unwrap())
            .collect();
        assert!(pts[0].new_frame && pts[1].new_frame);
        assert!(!pts[2].new_frame);
        assert_eq!(pts[3].pts_ms, 0);
        assert_eq!(pts[1].pts_ms, MS_PER_FRAME);
    }

    #[test]
    fn bars_scroll_between_frames() {
        let mut decoder = TestPatternDecoder::new(10);
        decoder.set_output_size(PhysicalSize::new(16, 1));
        let mut first = vec![0u8; 64];
        let mut second = vec![0u8; 64];
        decoder.decode_next_frame(&mut first, 64).unwrap();
        decoder.decode_next_frame(&mut second, 64).unwrap();
        assert_eq!(&first[..4], &BARS[0]);
        assert_eq!(&second[48..52], &BARS[1]);
        assert_ne!(first, second);
    }

    #[test]
    fn undersized_output_is_a_decode_error() {
        let mut decoder = TestPatternDecoder::new(1);
        decoder.set_output_size(PhysicalSize::new(4, 4));
        let mut out = vec![0u8; 8];
        assert!(matches!(
            decoder.decode_next_frame(&mut out, 16),
            Err(VideoError::Decode { stage: "scale", .. })
        ));
    }
}
