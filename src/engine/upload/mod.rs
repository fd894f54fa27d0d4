//! ### English
//! GPU upload seam. A `TextureObject` never talks to OpenGL directly; it goes through a
//! `TextureUploader` owned by the render thread.
//!
//! ### 中文
//! GPU 上传接口。`TextureObject` 从不直接调用 OpenGL，而是通过渲染线程持有的
//! `TextureUploader` 完成上传。

mod gl;
mod headless;

use dpi::PhysicalSize;

use crate::engine::buffer::{PixelBuffer, PixelFormat};

pub use gl::GlUploader;
pub use headless::{HeadlessUploader, UploadRecord};

/// ### English
/// Backend-specific texture name.
///
/// ### 中文
/// 与后端相关的纹理名。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// ### English
/// Render-thread capability for creating, filling and deleting 2D textures.
///
/// Implementations are only ever called from the thread that owns the graphics context.
///
/// ### 中文
/// 渲染线程上创建、填充与删除 2D 纹理的能力。
///
/// 实现只会在持有图形上下文的线程上被调用。
pub trait TextureUploader {
    /// ### English
    /// Allocates a texture of `size`, optionally filled with `initial`.
    ///
    /// ### 中文
    /// 分配尺寸为 `size` 的纹理，可选地用 `initial` 填充。
    fn create_texture(
        &mut self,
        size: PhysicalSize<u32>,
        format: PixelFormat,
        initial: Option<&[u8]>,
    ) -> TextureHandle;

    /// ### English
    /// Replaces the whole texture contents with `buffer`.
    ///
    /// ### 中文
    /// 用 `buffer` 替换纹理的全部内容。
    fn upload(&mut self, handle: TextureHandle, buffer: &PixelBuffer, format: PixelFormat);

    fn delete_texture(&mut self, handle: TextureHandle);
}
