// GpuKit
// copyright zipxing@hotmail.com 2022~2025

//! Textures and renderbuffers.
//!
//! Creation validates the internal format against the registry before any
//! driver call, allocates the level-0 image, and re-asserts the driver's
//! sampling defaults so the caller never has to remember them: filter =
//! NEAREST, wrap = REPEAT, mipmap off, base level 0, max level 1000.
//!
//! A renderbuffer is a non-sampleable storage image; it only makes sense as
//! a framebuffer attachment.

use crate::error::{CoreError, Result};
use crate::gl::format;
use crate::gl::{check_error, clear_errors};
use glow::HasContext;

const DEFAULT_BASE_LEVEL: i32 = 0;
const DEFAULT_MAX_LEVEL: i32 = 1000;

/// 1D/2D/3D texture; caller owned
pub struct GlTexture {
    pub texture: glow::Texture,
    pub target: u32,
    pub width: i32,
    pub height: i32,
    pub depth: i32,
    pub internal_format: u32,
}

impl GlTexture {
    pub fn new_1d(
        gl: &glow::Context,
        internal_format: u32,
        width: i32,
        transfer_format: u32,
        transfer_type: u32,
        pixels: Option<&[u8]>,
    ) -> Result<Self> {
        check_dims(internal_format, width, 1, 1)?;
        check_pixels(internal_format, width, 1, 1, pixels)?;
        unsafe {
            let texture = gl.create_texture()?;
            gl.bind_texture(glow::TEXTURE_1D, Some(texture));
            clear_errors(gl);
            gl.tex_image_1d(
                glow::TEXTURE_1D,
                0,
                internal_format as i32,
                width,
                0,
                transfer_format,
                transfer_type,
                pixels,
            );
            check_error(gl)?;
            apply_defaults(gl, glow::TEXTURE_1D);
            gl.bind_texture(glow::TEXTURE_1D, None);
            Ok(Self {
                texture,
                target: glow::TEXTURE_1D,
                width,
                height: 1,
                depth: 1,
                internal_format,
            })
        }
    }

    pub fn new_2d(
        gl: &glow::Context,
        internal_format: u32,
        width: i32,
        height: i32,
        transfer_format: u32,
        transfer_type: u32,
        pixels: Option<&[u8]>,
    ) -> Result<Self> {
        check_dims(internal_format, width, height, 1)?;
        check_pixels(internal_format, width, height, 1, pixels)?;
        unsafe {
            let texture = gl.create_texture()?;
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            clear_errors(gl);
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                internal_format as i32,
                width,
                height,
                0,
                transfer_format,
                transfer_type,
                pixels,
            );
            check_error(gl)?;
            apply_defaults(gl, glow::TEXTURE_2D);
            gl.bind_texture(glow::TEXTURE_2D, None);
            Ok(Self {
                texture,
                target: glow::TEXTURE_2D,
                width,
                height,
                depth: 1,
                internal_format,
            })
        }
    }

    pub fn new_3d(
        gl: &glow::Context,
        internal_format: u32,
        width: i32,
        height: i32,
        depth: i32,
        transfer_format: u32,
        transfer_type: u32,
        pixels: Option<&[u8]>,
    ) -> Result<Self> {
        check_dims(internal_format, width, height, depth)?;
        check_pixels(internal_format, width, height, depth, pixels)?;
        unsafe {
            let texture = gl.create_texture()?;
            gl.bind_texture(glow::TEXTURE_3D, Some(texture));
            clear_errors(gl);
            gl.tex_image_3d(
                glow::TEXTURE_3D,
                0,
                internal_format as i32,
                width,
                height,
                depth,
                0,
                transfer_format,
                transfer_type,
                pixels,
            );
            check_error(gl)?;
            apply_defaults(gl, glow::TEXTURE_3D);
            gl.bind_texture(glow::TEXTURE_3D, None);
            Ok(Self {
                texture,
                target: glow::TEXTURE_3D,
                width,
                height,
                depth,
                internal_format,
            })
        }
    }

    /// mipmap generation plus base/max level; levels default to 0 / 1000
    pub fn set_mipmap(&self, gl: &glow::Context, generate: bool, base: i32, max: i32) {
        unsafe {
            gl.bind_texture(self.target, Some(self.texture));
            gl.tex_parameter_i32(self.target, glow::TEXTURE_BASE_LEVEL, base);
            gl.tex_parameter_i32(self.target, glow::TEXTURE_MAX_LEVEL, max);
            if generate {
                gl.generate_mipmap(self.target);
            }
            gl.bind_texture(self.target, None);
        }
    }

    /// minification / magnification filters
    pub fn set_filter(&self, gl: &glow::Context, min: u32, mag: u32) {
        unsafe {
            gl.bind_texture(self.target, Some(self.texture));
            gl.tex_parameter_i32(self.target, glow::TEXTURE_MIN_FILTER, min as i32);
            gl.tex_parameter_i32(self.target, glow::TEXTURE_MAG_FILTER, mag as i32);
            gl.bind_texture(self.target, None);
        }
    }

    /// S/T/R wrap modes
    pub fn set_wrap(&self, gl: &glow::Context, s: u32, t: u32, r: u32) {
        unsafe {
            gl.bind_texture(self.target, Some(self.texture));
            gl.tex_parameter_i32(self.target, glow::TEXTURE_WRAP_S, s as i32);
            gl.tex_parameter_i32(self.target, glow::TEXTURE_WRAP_T, t as i32);
            gl.tex_parameter_i32(self.target, glow::TEXTURE_WRAP_R, r as i32);
            gl.bind_texture(self.target, None);
        }
    }

    /// bind to a texture unit for sampling
    pub fn active_bind(&self, gl: &glow::Context, unit: u32) {
        unsafe {
            gl.active_texture(glow::TEXTURE0 + unit);
            gl.bind_texture(self.target, Some(self.texture));
        }
    }

    pub fn get_width(&self) -> i32 {
        self.width
    }

    pub fn get_height(&self) -> i32 {
        self.height
    }

    pub fn get_depth(&self) -> i32 {
        self.depth
    }

    pub fn get_internal_format(&self) -> u32 {
        self.internal_format
    }

    pub fn free(&self, gl: &glow::Context) {
        unsafe {
            gl.delete_texture(self.texture);
        }
    }
}

fn apply_defaults(gl: &glow::Context, target: u32) {
    unsafe {
        gl.tex_parameter_i32(target, glow::TEXTURE_MIN_FILTER, glow::NEAREST as i32);
        gl.tex_parameter_i32(target, glow::TEXTURE_MAG_FILTER, glow::NEAREST as i32);
        gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
        gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
        gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_R, glow::REPEAT as i32);
        gl.tex_parameter_i32(target, glow::TEXTURE_BASE_LEVEL, DEFAULT_BASE_LEVEL);
        gl.tex_parameter_i32(target, glow::TEXTURE_MAX_LEVEL, DEFAULT_MAX_LEVEL);
    }
}

fn check_dims(internal_format: u32, width: i32, height: i32, depth: i32) -> Result<()> {
    if !format::is_texture_format(internal_format) {
        return Err(CoreError::Precondition(format!(
            "{:#06x} is not a texture format",
            internal_format
        )));
    }
    if width <= 0 || height <= 0 || depth <= 0 {
        return Err(CoreError::Precondition(format!(
            "texture dimensions must be positive, got {}x{}x{}",
            width, height, depth
        )));
    }
    Ok(())
}

/// registry arithmetic makes the transfer size check trivially correct
fn check_pixels(
    internal_format: u32,
    width: i32,
    height: i32,
    depth: i32,
    pixels: Option<&[u8]>,
) -> Result<()> {
    if let Some(px) = pixels {
        let need = width as usize
            * height as usize
            * depth as usize
            * format::component_count(internal_format) as usize
            * format::element_bytes(internal_format) as usize;
        if px.len() < need {
            return Err(CoreError::Precondition(format!(
                "pixel upload needs {} bytes, got {}",
                need,
                px.len()
            )));
        }
    }
    Ok(())
}

/// non-sampleable storage image for framebuffer attachment; caller owned
pub struct GlRenderbuffer {
    pub renderbuffer: glow::Renderbuffer,
    pub width: i32,
    pub height: i32,
    pub internal_format: u32,
}

impl GlRenderbuffer {
    pub fn new(gl: &glow::Context, internal_format: u32, width: i32, height: i32) -> Result<Self> {
        if !format::is_renderbuffer_format(internal_format) {
            return Err(CoreError::Precondition(format!(
                "{:#06x} is not a renderbuffer format",
                internal_format
            )));
        }
        if width <= 0 || height <= 0 {
            return Err(CoreError::Precondition(format!(
                "renderbuffer dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        unsafe {
            let renderbuffer = gl.create_renderbuffer()?;
            gl.bind_renderbuffer(glow::RENDERBUFFER, Some(renderbuffer));
            clear_errors(gl);
            gl.renderbuffer_storage(glow::RENDERBUFFER, internal_format, width, height);
            check_error(gl)?;
            gl.bind_renderbuffer(glow::RENDERBUFFER, None);
            Ok(Self {
                renderbuffer,
                width,
                height,
                internal_format,
            })
        }
    }

    pub fn get_width(&self) -> i32 {
        self.width
    }

    pub fn get_height(&self) -> i32 {
        self.height
    }

    pub fn get_internal_format(&self) -> u32 {
        self.internal_format
    }

    pub fn free(&self, gl: &glow::Context) {
        unsafe {
            gl.delete_renderbuffer(self.renderbuffer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_size_arithmetic() {
        // rgba8 2x2: 2*2*4*1
        assert!(check_pixels(glow::RGBA8, 2, 2, 1, Some(&[0u8; 16])).is_ok());
        assert!(check_pixels(glow::RGBA8, 2, 2, 1, Some(&[0u8; 15])).is_err());
        // rg32f 3x1: 3*2*4
        assert!(check_pixels(glow::RG32F, 3, 1, 1, Some(&[0u8; 24])).is_ok());
        // null pixels always pass: memory is allocated but not initialized
        assert!(check_pixels(glow::RGBA8, 4096, 4096, 1, None).is_ok());
    }

    #[test]
    fn dimension_preconditions() {
        assert!(check_dims(glow::RGBA8, 0, 1, 1).is_err());
        assert!(check_dims(glow::RGBA8, 1, -1, 1).is_err());
        assert!(check_dims(0xdead, 1, 1, 1).is_err());
        assert!(check_dims(glow::DEPTH_COMPONENT24, 64, 64, 1).is_ok());
    }
}
