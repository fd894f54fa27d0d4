use std::rc::Rc;

use dpi::PhysicalSize;
use gleam::gl::{self, Gl};
use tracing::trace;

use crate::engine::buffer::{PixelBuffer, PixelFormat};

use super::{TextureHandle, TextureUploader};

/// ### English
/// `TextureUploader` over a gleam GL API wrapper.
///
/// Textures use linear filtering and clamp-to-edge wrapping. Rows are uploaded with an unpack
/// alignment of 1 so `R8` textures of odd width are laid out tightly.
///
/// ### 中文
/// 基于 gleam GL API 封装的 `TextureUploader`。
///
/// 纹理使用线性过滤与 clamp-to-edge 环绕。行以 1 字节解包对齐上传，
/// 以便奇数宽度的 `R8` 纹理紧密排列。
pub struct GlUploader {
    gl: Rc<dyn Gl>,
}

impl GlUploader {
    pub fn new(gl: Rc<dyn Gl>) -> Self {
        Self { gl }
    }
}

/// ### English
/// `(internal_format, format)` pair used for `tex_image_2d`.
///
/// ### 中文
/// `tex_image_2d` 使用的 `(internal_format, format)` 组合。
fn gl_formats(format: PixelFormat) -> (gl::GLint, gl::GLenum) {
    match format {
        PixelFormat::Bgra8 => (gl::RGBA8 as gl::GLint, gl::BGRA),
        PixelFormat::R8 => (gl::R8 as gl::GLint, gl::RED),
    }
}

impl TextureUploader for GlUploader {
    fn create_texture(
        &mut self,
        size: PhysicalSize<u32>,
        format: PixelFormat,
        initial: Option<&[u8]>,
    ) -> TextureHandle {
        let gl = &self.gl;
        let (internal_format, pixel_format) = gl_formats(format);

        let texture_ids = gl.gen_textures(1);
        gl.bind_texture(gl::TEXTURE_2D, texture_ids[0]);
        gl.pixel_store_i(gl::UNPACK_ALIGNMENT, 1);
        gl.tex_image_2d(
            gl::TEXTURE_2D,
            0,
            internal_format,
            size.width as gl::GLsizei,
            size.height as gl::GLsizei,
            0,
            pixel_format,
            gl::UNSIGNED_BYTE,
            initial,
        );
        gl.tex_parameter_i(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::LINEAR as gl::GLint);
        gl.tex_parameter_i(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR as gl::GLint);
        gl.tex_parameter_i(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as gl::GLint);
        gl.tex_parameter_i(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as gl::GLint);
        gl.bind_texture(gl::TEXTURE_2D, 0);

        trace!(texture = texture_ids[0], width = size.width, height = size.height, "texture created");
        TextureHandle(texture_ids[0])
    }

    fn upload(&mut self, handle: TextureHandle, buffer: &PixelBuffer, format: PixelFormat) {
        if buffer.byte_len() == 0 {
            return;
        }
        let gl = &self.gl;
        let (_, pixel_format) = gl_formats(format);

        gl.bind_texture(gl::TEXTURE_2D, handle.0);
        gl.pixel_store_i(gl::UNPACK_ALIGNMENT, 1);
        gl.tex_sub_image_2d(
            gl::TEXTURE_2D,
            0,
            0,
            0,
            buffer.width() as gl::GLsizei,
            buffer.height() as gl::GLsizei,
            pixel_format,
            gl::UNSIGNED_BYTE,
            buffer.as_bytes(),
        );
        gl.bind_texture(gl::TEXTURE_2D, 0);
    }

    fn delete_texture(&mut self, handle: TextureHandle) {
        self.gl.delete_textures(&[handle.0]);
    }
}
