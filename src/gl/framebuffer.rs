// GpuKit
// copyright zipxing@hotmail.com 2022~2025

//! Framebuffer composition.
//!
//! Assembling a framebuffer needs several mutually-consistent steps in a
//! fixed order: validate formats, generate and bind, create and attach N
//! color images, attach the optional depth image, declare the draw-buffer
//! set, assert completeness, unbind. This module is the one blessed path
//! through that sequence; partial-setup states never escape it.
//!
//! The composite owns the framebuffer plus every image it created. `free`
//! releases them individually.

use crate::error::{CoreError, Result};
use crate::gl::format;
use crate::gl::texture::{GlRenderbuffer, GlTexture};
use glow::HasContext;

/// whether attachments are sampleable textures or renderbuffer storage;
/// chosen at composition time and fixed for the composite's lifetime
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AttachKind {
    Texture,
    Renderbuffer,
}

pub enum Attachment {
    Texture(GlTexture),
    Renderbuffer(GlRenderbuffer),
}

impl Attachment {
    fn free(&self, gl: &glow::Context) {
        match self {
            Attachment::Texture(t) => t.free(gl),
            Attachment::Renderbuffer(r) => r.free(gl),
        }
    }

    /// the texture behind this attachment, if it is sampleable
    pub fn texture(&self) -> Option<glow::Texture> {
        match self {
            Attachment::Texture(t) => Some(t.texture),
            Attachment::Renderbuffer(_) => None,
        }
    }
}

/// composed framebuffer; caller owned
pub struct GlFramebuffer {
    pub framebuffer: glow::Framebuffer,
    pub width: i32,
    pub height: i32,
    pub colors: Vec<Attachment>,
    pub depth: Option<Attachment>,
}

/// driver limit on color attachment slots
pub fn max_color_attachments(gl: &glow::Context) -> i32 {
    unsafe { gl.get_parameter_i32(glow::MAX_COLOR_ATTACHMENTS) }
}

/// driver limit on simultaneous draw buffers
pub fn max_draw_buffers(gl: &glow::Context) -> i32 {
    unsafe { gl.get_parameter_i32(glow::MAX_DRAW_BUFFERS) }
}

/// symbolic name of a completeness status
pub fn completeness_name(status: u32) -> &'static str {
    match status {
        glow::FRAMEBUFFER_COMPLETE => "GL_FRAMEBUFFER_COMPLETE",
        glow::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => "GL_FRAMEBUFFER_INCOMPLETE_ATTACHMENT",
        glow::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => {
            "GL_FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT"
        }
        glow::FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER => "GL_FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER",
        glow::FRAMEBUFFER_INCOMPLETE_READ_BUFFER => "GL_FRAMEBUFFER_INCOMPLETE_READ_BUFFER",
        glow::FRAMEBUFFER_UNSUPPORTED => "GL_FRAMEBUFFER_UNSUPPORTED",
        glow::FRAMEBUFFER_INCOMPLETE_MULTISAMPLE => "GL_FRAMEBUFFER_INCOMPLETE_MULTISAMPLE",
        glow::FRAMEBUFFER_INCOMPLETE_LAYER_TARGETS => "GL_FRAMEBUFFER_INCOMPLETE_LAYER_TARGETS",
        _ => "GL_FRAMEBUFFER_UNKNOWN_STATUS",
    }
}

/// depth formats with a stencil part attach at the combined point
fn depth_attachment_point(fmt: u32) -> u32 {
    if fmt == glow::DEPTH24_STENCIL8 {
        glow::DEPTH_STENCIL_ATTACHMENT
    } else {
        glow::DEPTH_ATTACHMENT
    }
}

/// create one color image of the composite's format and attach it at `slot`
/// on the currently bound framebuffer
pub fn create_framebuffer_texture(
    gl: &glow::Context,
    width: i32,
    height: i32,
    color_format: u32,
    slot: u32,
    min_filter: u32,
    mag_filter: u32,
) -> Result<GlTexture> {
    let tex = GlTexture::new_2d(
        gl,
        color_format,
        width,
        height,
        format::transfer_format(color_format),
        format::transfer_type(color_format),
        None,
    )?;
    tex.set_filter(gl, min_filter, mag_filter);
    unsafe {
        gl.framebuffer_texture_2d(
            glow::FRAMEBUFFER,
            glow::COLOR_ATTACHMENT0 + slot,
            glow::TEXTURE_2D,
            Some(tex.texture),
            0,
        );
    }
    Ok(tex)
}

/// renderbuffer flavor of [`create_framebuffer_texture`]
pub fn create_framebuffer_renderbuffer(
    gl: &glow::Context,
    width: i32,
    height: i32,
    color_format: u32,
    slot: u32,
) -> Result<GlRenderbuffer> {
    let rb = GlRenderbuffer::new(gl, color_format, width, height)?;
    unsafe {
        gl.framebuffer_renderbuffer(
            glow::FRAMEBUFFER,
            glow::COLOR_ATTACHMENT0 + slot,
            glow::RENDERBUFFER,
            Some(rb.renderbuffer),
        );
    }
    Ok(rb)
}

/// create the depth image and attach it on the currently bound framebuffer
pub fn create_framebuffer_depth(
    gl: &glow::Context,
    width: i32,
    height: i32,
    depth_format: u32,
    kind: AttachKind,
) -> Result<Attachment> {
    let point = depth_attachment_point(depth_format);
    match kind {
        AttachKind::Texture => {
            let tex = GlTexture::new_2d(
                gl,
                depth_format,
                width,
                height,
                format::transfer_format(depth_format),
                format::transfer_type(depth_format),
                None,
            )?;
            unsafe {
                gl.framebuffer_texture_2d(
                    glow::FRAMEBUFFER,
                    point,
                    glow::TEXTURE_2D,
                    Some(tex.texture),
                    0,
                );
            }
            Ok(Attachment::Texture(tex))
        }
        AttachKind::Renderbuffer => {
            let rb = GlRenderbuffer::new(gl, depth_format, width, height)?;
            unsafe {
                gl.framebuffer_renderbuffer(
                    glow::FRAMEBUFFER,
                    point,
                    glow::RENDERBUFFER,
                    Some(rb.renderbuffer),
                );
            }
            Ok(Attachment::Renderbuffer(rb))
        }
    }
}

impl GlFramebuffer {
    /// Compose a framebuffer of `color_count` color attachments plus an
    /// optional depth attachment. `color_count == 0` with a depth format is
    /// the depth-only variant: draw and read buffers are set to NONE so
    /// completeness does not require a color image.
    pub fn new(
        gl: &glow::Context,
        width: i32,
        height: i32,
        color_count: usize,
        color_format: u32,
        depth_format: Option<u32>,
        kind: AttachKind,
        min_filter: u32,
        mag_filter: u32,
    ) -> Result<Self> {
        // step 1: validate before touching the driver
        if width <= 0 || height <= 0 {
            return Err(CoreError::Precondition(format!(
                "framebuffer dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        if color_count == 0 && depth_format.is_none() {
            return Err(CoreError::Precondition(
                "framebuffer needs at least one color attachment or a depth format".into(),
            ));
        }
        if color_count > 0 && !format::is_framebuffer_color_format(color_format) {
            return Err(CoreError::Precondition(format!(
                "{:#06x} is not a framebuffer color format",
                color_format
            )));
        }
        if let Some(df) = depth_format {
            if !format::is_framebuffer_depth_format(df) {
                return Err(CoreError::Precondition(format!(
                    "{:#06x} is not a framebuffer depth format",
                    df
                )));
            }
        }
        let max_slots = max_color_attachments(gl) as usize;
        if color_count > max_slots {
            return Err(CoreError::Precondition(format!(
                "{} color attachments exceed the driver limit {}",
                color_count, max_slots
            )));
        }

        // step 2: generate and bind
        let framebuffer = unsafe { gl.create_framebuffer()? };
        unsafe {
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(framebuffer));
        }

        let mut colors: Vec<Attachment> = vec![];
        let mut depth: Option<Attachment> = None;

        // on any failure past this point release what was created so far
        let fail = |gl: &glow::Context,
                    e: CoreError,
                    colors: Vec<Attachment>,
                    depth: Option<Attachment>| {
            for c in &colors {
                c.free(gl);
            }
            if let Some(d) = &depth {
                d.free(gl);
            }
            unsafe {
                gl.bind_framebuffer(glow::FRAMEBUFFER, None);
                gl.delete_framebuffer(framebuffer);
            }
            Err(e)
        };

        // step 3: one image per color slot
        for slot in 0..color_count {
            let r = match kind {
                AttachKind::Texture => create_framebuffer_texture(
                    gl,
                    width,
                    height,
                    color_format,
                    slot as u32,
                    min_filter,
                    mag_filter,
                )
                .map(Attachment::Texture),
                AttachKind::Renderbuffer => {
                    create_framebuffer_renderbuffer(gl, width, height, color_format, slot as u32)
                        .map(Attachment::Renderbuffer)
                }
            };
            match r {
                Ok(a) => colors.push(a),
                Err(e) => return fail(gl, e, colors, depth),
            }
        }

        // step 4: optional depth image
        if let Some(df) = depth_format {
            match create_framebuffer_depth(gl, width, height, df, kind) {
                Ok(a) => depth = Some(a),
                Err(e) => return fail(gl, e, colors, depth),
            }
        }

        // step 5: declare the draw-buffer set
        unsafe {
            if color_count > 0 {
                let bufs: Vec<u32> = (0..color_count)
                    .map(|i| glow::COLOR_ATTACHMENT0 + i as u32)
                    .collect();
                gl.draw_buffers(&bufs);
            } else {
                gl.draw_buffers(&[glow::NONE]);
                gl.read_buffer(glow::NONE);
            }
        }

        // step 6: completeness is the contract
        let status = unsafe { gl.check_framebuffer_status(glow::FRAMEBUFFER) };
        if status != glow::FRAMEBUFFER_COMPLETE {
            return fail(
                gl,
                CoreError::Incomplete {
                    status,
                    name: completeness_name(status),
                },
                colors,
                depth,
            );
        }

        // step 7: unbind and hand everything to the caller
        unsafe {
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
        }
        Ok(Self {
            framebuffer,
            width,
            height,
            colors,
            depth,
        })
    }

    /// bind for drawing and match the viewport to the composite
    pub fn bind(&self, gl: &glow::Context) {
        unsafe {
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(self.framebuffer));
            gl.viewport(0, 0, self.width, self.height);
        }
    }

    pub fn unbind(&self, gl: &glow::Context) {
        unsafe {
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
        }
    }

    /// sampleable texture behind color slot `idx`, if composed as textures
    pub fn color_texture(&self, idx: usize) -> Option<glow::Texture> {
        self.colors.get(idx).and_then(|a| a.texture())
    }

    /// sampleable depth texture, if composed as textures
    pub fn depth_texture(&self) -> Option<glow::Texture> {
        self.depth.as_ref().and_then(|a| a.texture())
    }

    /// release the framebuffer and every attachment it owns
    pub fn free(&self, gl: &glow::Context) {
        for c in &self.colors {
            c.free(gl);
        }
        if let Some(d) = &self.depth {
            d.free(gl);
        }
        unsafe {
            gl.delete_framebuffer(self.framebuffer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completeness_names_resolve() {
        assert_eq!(
            completeness_name(glow::FRAMEBUFFER_COMPLETE),
            "GL_FRAMEBUFFER_COMPLETE"
        );
        assert_eq!(
            completeness_name(glow::FRAMEBUFFER_UNSUPPORTED),
            "GL_FRAMEBUFFER_UNSUPPORTED"
        );
        assert_eq!(completeness_name(0x42), "GL_FRAMEBUFFER_UNKNOWN_STATUS");
    }

    #[test]
    fn stencil_formats_use_the_combined_point() {
        assert_eq!(
            depth_attachment_point(glow::DEPTH24_STENCIL8),
            glow::DEPTH_STENCIL_ATTACHMENT
        );
        assert_eq!(
            depth_attachment_point(glow::DEPTH_COMPONENT32F),
            glow::DEPTH_ATTACHMENT
        );
    }
}
