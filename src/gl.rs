// GpuKit
// copyright zipxing@hotmail.com 2022~2025

//! OpenGL object lifecycle layer built on glow.
//!
//! format: sized internal-format registry + usage validators.
//! glsl: GLSL data-type registry used by attribute and uniform dispatch.
//! buffer: data stores and vertex-array state capture.
//! texture: 1D/2D/3D/buffer textures, sampling config, renderbuffers.
//! framebuffer: the composition path with completeness assertion.
//! shader: stage compilation, program link, active-variable tables.
//!
//! All calls take the glow context by reference; the toolkit never stores
//! it. Handles are caller owned and released through `free`.

use crate::error::{CoreError, Result};
use glow::HasContext;

pub mod buffer;
pub mod format;
pub mod framebuffer;
pub mod glsl;
pub mod shader;
pub mod texture;

/// symbolic name of a GL error code
pub fn error_name(code: u32) -> &'static str {
    match code {
        glow::NO_ERROR => "GL_NO_ERROR",
        glow::INVALID_ENUM => "GL_INVALID_ENUM",
        glow::INVALID_VALUE => "GL_INVALID_VALUE",
        glow::INVALID_OPERATION => "GL_INVALID_OPERATION",
        glow::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
        glow::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
        glow::STACK_UNDERFLOW => "GL_STACK_UNDERFLOW",
        glow::STACK_OVERFLOW => "GL_STACK_OVERFLOW",
        _ => "GL_UNKNOWN",
    }
}

/// Drain the driver error queue before a checked operation.
pub fn clear_errors(gl: &glow::Context) {
    unsafe {
        while gl.get_error() != glow::NO_ERROR {}
    }
}

/// Inspect the driver error queue after a checked operation.
pub fn check_error(gl: &glow::Context) -> Result<()> {
    let code = unsafe { gl.get_error() };
    if code == glow::NO_ERROR {
        Ok(())
    } else {
        Err(CoreError::Driver {
            code,
            name: error_name(code),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_names_resolve() {
        assert_eq!(error_name(glow::INVALID_ENUM), "GL_INVALID_ENUM");
        assert_eq!(error_name(glow::NO_ERROR), "GL_NO_ERROR");
        assert_eq!(error_name(0xdead), "GL_UNKNOWN");
    }
}
