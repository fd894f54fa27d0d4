use std::collections::HashMap;

use dpi::PhysicalSize;

use crate::engine::buffer::{PixelBuffer, PixelFormat};

use super::{TextureHandle, TextureUploader};

/// ### English
/// What a headless texture currently holds.
///
/// ### 中文
/// 无头纹理当前保存的内容。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadRecord {
    pub size: PhysicalSize<u32>,
    pub format: PixelFormat,
    pub uploads: u64,
    pub pixels: Vec<u8>,
}

/// ### English
/// `TextureUploader` without a GPU: keeps a CPU copy of every live texture.
///
/// Used by tests and by embedders that only want the produced frames.
///
/// ### 中文
/// 不依赖 GPU 的 `TextureUploader`：为每个存活纹理保留一份 CPU 副本。
///
/// 供测试以及只需要生成帧的宿主使用。
#[derive(Debug, Default)]
pub struct HeadlessUploader {
    next_id: u32,
    textures: HashMap<TextureHandle, UploadRecord>,
}

impl HeadlessUploader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texture(&self, handle: TextureHandle) -> Option<&UploadRecord> {
        self.textures.get(&handle)
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }
}

impl TextureUploader for HeadlessUploader {
    fn create_texture(
        &mut self,
        size: PhysicalSize<u32>,
        format: PixelFormat,
        initial: Option<&[u8]>,
    ) -> TextureHandle {
        self.next_id += 1;
        let handle = TextureHandle(self.next_id);
        let len = size.width as usize * size.height as usize * format.pixel_size();
        let pixels = match initial {
            Some(data) => data.to_vec(),
            None => vec![0; len],
        };
        self.textures.insert(
            handle,
            UploadRecord {
                size,
                format,
                uploads: 0,
                pixels,
            },
        );
        handle
    }

    fn upload(&mut self, handle: TextureHandle, buffer: &PixelBuffer, format: PixelFormat) {
        if let Some(record) = self.textures.get_mut(&handle) {
            record.format = format;
            record.uploads += 1;
            record.pixels.clear();
            record.pixels.extend_from_slice(buffer.as_bytes());
        }
    }

    fn delete_texture(&mut self, handle: TextureHandle) {
        self.textures.remove(&handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_uploads_per_texture() {
        let mut uploader = HeadlessUploader::new();
        let a = uploader.create_texture(PhysicalSize::new(2, 1), PixelFormat::Bgra8, None);
        let b = uploader.create_texture(PhysicalSize::new(1, 1), PixelFormat::R8, Some(&[9]));
        assert_ne!(a, b);
        assert_eq!(uploader.texture(a).unwrap().pixels, vec![0; 8]);
        assert_eq!(uploader.texture(b).unwrap().pixels, vec![9]);

        let mut buffer = PixelBuffer::new(4);
        buffer.resize(2, 1);
        buffer.fill(3);
        uploader.upload(a, &buffer, PixelFormat::Bgra8);
        let record = uploader.texture(a).unwrap();
        assert_eq!(record.uploads, 1);
        assert_eq!(record.pixels, vec![3; 8]);

        uploader.delete_texture(a);
        assert!(uploader.texture(a).is_none());
        assert_eq!(uploader.live_textures(), 1);
    }
}
