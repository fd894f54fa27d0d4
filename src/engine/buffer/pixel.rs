use dpi::PhysicalSize;

use crate::engine::error::BufferError;

/// ### English
/// Pixel layouts a texture can carry.
///
/// ### 中文
/// 纹理可以承载的像素布局。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// ### English
    /// 8-bit BGRA, 4 bytes per pixel (decoded video).
    ///
    /// ### 中文
    /// 8 位 BGRA，每像素 4 字节（解码后的视频）。
    Bgra8,
    /// ### English
    /// 8-bit single channel, 1 byte per pixel (fractal intensity).
    ///
    /// ### 中文
    /// 8 位单通道，每像素 1 字节（分形强度）。
    R8,
}

impl PixelFormat {
    /// ### English
    /// Bytes per pixel.
    ///
    /// ### 中文
    /// 每像素字节数。
    #[inline]
    pub const fn pixel_size(self) -> usize {
        match self {
            PixelFormat::Bgra8 => 4,
            PixelFormat::R8 => 1,
        }
    }
}

/// ### English
/// One contiguous pixel region of `width * height * pixel_size` bytes.
///
/// A fresh buffer has no dimensions. `pixel_size` must be set before the first `resize`.
/// Storage is reallocated only when the byte size changes.
///
/// ### 中文
/// 一块连续的像素内存，大小为 `width * height * pixel_size` 字节。
///
/// 新建的缓冲区没有尺寸。首次 `resize` 之前必须先设置 `pixel_size`。
/// 仅当字节大小变化时才重新分配存储。
#[derive(Clone, Debug, Default)]
pub struct PixelBuffer {
    /// ### English
    /// Current dimensions, `None` until the first resize.
    ///
    /// ### 中文
    /// 当前尺寸；首次 resize 之前为 `None`。
    size: Option<PhysicalSize<u32>>,
    /// ### English
    /// Bytes per pixel.
    ///
    /// ### 中文
    /// 每像素字节数。
    pixel_size: usize,
    data: Box<[u8]>,
}

impl PixelBuffer {
    /// ### English
    /// Creates an empty buffer for pixels of `pixel_size` bytes.
    ///
    /// ### 中文
    /// 创建一个每像素 `pixel_size` 字节的空缓冲区。
    pub fn new(pixel_size: usize) -> Self {
        Self {
            size: None,
            pixel_size,
            data: Box::default(),
        }
    }

    #[inline]
    pub fn pixel_size(&self) -> usize {
        self.pixel_size
    }

    /// ### English
    /// Changes the pixel size. Existing storage keeps its old layout until the next `resize`.
    ///
    /// ### 中文
    /// 修改每像素字节数。已有存储在下一次 `resize` 之前保持旧布局。
    #[inline]
    pub fn set_pixel_size(&mut self, pixel_size: usize) {
        self.pixel_size = pixel_size;
    }

    /// ### English
    /// Sets new dimensions. Returns `true` if the storage was reallocated.
    ///
    /// Contents are not preserved across a reallocation (the new storage is zeroed).
    ///
    /// ### 中文
    /// 设置新尺寸。若发生了重新分配则返回 `true`。
    ///
    /// 重新分配时不保留旧内容（新存储清零）。
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        let new_len = width as usize * height as usize * self.pixel_size;
        self.size = Some(PhysicalSize::new(width, height));

        if new_len == self.data.len() {
            return false;
        }

        self.data = vec![0u8; new_len].into_boxed_slice();
        true
    }

    #[inline]
    pub fn dimensions(&self) -> Option<PhysicalSize<u32>> {
        self.size
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.size.map_or(0, |size| size.width)
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.size.map_or(0, |size| size.height)
    }

    /// ### English
    /// Computed byte size (`width * height * pixel_size`), 0 while unset.
    ///
    /// ### 中文
    /// 计算得到的字节大小（`width * height * pixel_size`），未设置时为 0。
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.width() as usize * self.height() as usize * self.pixel_size
    }

    /// ### English
    /// Bytes per row (no padding).
    ///
    /// ### 中文
    /// 每行字节数（无填充）。
    #[inline]
    pub fn row_size(&self) -> usize {
        self.width() as usize * self.pixel_size
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// ### English
    /// Address of the storage; changes only when the storage is reallocated.
    ///
    /// ### 中文
    /// 存储地址；仅在重新分配时改变。
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.data.as_ptr()
    }

    #[inline]
    pub fn fill(&mut self, value: u8) {
        self.data.fill(value);
    }

    /// ### English
    /// Overwrites the whole buffer with `data`.
    ///
    /// Fails with `SizeMismatch` (leaving the buffer untouched) unless `data.len()` equals the
    /// computed byte size.
    ///
    /// ### 中文
    /// 用 `data` 覆盖整个缓冲区。
    ///
    /// 若 `data.len()` 与计算的字节大小不一致，则返回 `SizeMismatch` 且不修改缓冲区。
    pub fn copy_from(&mut self, data: &[u8]) -> Result<(), BufferError> {
        let expected = self.byte_len();
        if data.len() != expected || self.data.len() != expected {
            return Err(BufferError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        self.data.copy_from_slice(data);
        Ok(())
    }

    /// ### English
    /// Returns `true` if the storage matches the computed byte size.
    ///
    /// ### 中文
    /// 存储大小与计算的字节大小一致时返回 `true`。
    #[inline]
    pub(crate) fn is_allocated(&self) -> bool {
        self.size.is_some() && self.data.len() == self.byte_len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_buffer_has_no_dimensions() {
        let buffer = PixelBuffer::new(4);
        assert_eq!(buffer.dimensions(), None);
        assert_eq!(buffer.byte_len(), 0);
        assert!(buffer.as_bytes().is_empty());
    }

    #[test]
    fn resize_reallocates_only_when_byte_size_changes() {
        let mut buffer = PixelBuffer::new(4);
        assert!(buffer.resize(100, 100));
        let ptr = buffer.as_ptr();

        assert!(!buffer.resize(100, 100));
        assert_eq!(buffer.as_ptr(), ptr);

        // Same byte count, different shape.
        assert!(!buffer.resize(50, 200));
        assert_eq!(buffer.as_ptr(), ptr);
        assert_eq!(buffer.row_size(), 200);

        assert!(buffer.resize(10, 10));
        assert_eq!(buffer.byte_len(), 400);
    }

    #[test]
    fn copy_from_rejects_wrong_length_without_touching_contents() {
        let mut buffer = PixelBuffer::new(4);
        buffer.resize(100, 100);
        buffer.fill(7);

        let err = buffer.copy_from(&vec![1u8; 39_999]).unwrap_err();
        assert_eq!(
            err,
            BufferError::SizeMismatch {
                expected: 40_000,
                actual: 39_999
            }
        );
        assert!(buffer.as_bytes().iter().all(|&b| b == 7));

        buffer.copy_from(&vec![1u8; 40_000]).unwrap();
        assert!(buffer.as_bytes().iter().all(|&b| b == 1));
    }

    #[test]
    fn pixel_format_sizes() {
        assert_eq!(PixelFormat::Bgra8.pixel_size(), 4);
        assert_eq!(PixelFormat::R8.pixel_size(), 1);
    }
}
