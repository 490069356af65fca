// GpuKit
// copyright zipxing@hotmail.com 2022~2025

//! Error taxonomy of the toolkit.
//!
//! Everything fatal travels as a [`CoreError`]. The one non-fatal condition,
//! a uniform or attribute name that the linker dropped, is *not* an error:
//! those operations return `Ok(false)` after logging a diagnostic, because a
//! shader legitimately drops unused inputs.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    /// bad input to a factory: zero size, unknown format token, empty stage list
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// non-success status from a GL call or status query
    #[error("driver error {code:#06x} ({name})")]
    Driver { code: u32, name: &'static str },

    /// shader stage failed to compile; payload carries the driver log and the source
    #[error("shader compile failed: {log}\n--- source ---\n{src}")]
    Compile { log: String, src: String },

    /// program failed to link
    #[error("program link failed: {0}")]
    Link(String),

    /// framebuffer composition did not reach complete status
    #[error("framebuffer incomplete: {status:#06x} ({name})")]
    Incomplete { status: u32, name: &'static str },

    /// uniform write with an unknown or mismatched GLSL type token
    #[error("bad uniform type {0:#06x}")]
    BadUniformType(u32),

    /// non-success status from an OpenCL call
    #[error("OpenCL error {code} ({name})")]
    Cl { code: i32, name: &'static str },

    /// OpenCL program build failure; payload carries the build log
    #[error("OpenCL build failed: {log}")]
    ClBuild { log: String },

    /// source file not openable or short read
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// object-creation failure reported by the binding
    #[error("gl object creation failed: {0}")]
    Gl(String),

    /// window or context plumbing failure from the windowing stack
    #[error("window error: {0}")]
    Window(String),
}

// glow create_* calls surface String errors
impl From<String> for CoreError {
    fn from(s: String) -> Self {
        CoreError::Gl(s)
    }
}
