// GpuKit
// copyright zipxing@hotmail.com 2022~2025

//! GpuKit is a small support toolkit for graphics and GPU-compute programs.
//! It bundles the object lifecycle plumbing that every OpenGL / OpenCL
//! application ends up writing by hand: typed buffer and texture creation,
//! vertex-array capture, framebuffer composition with completeness checks,
//! shader compilation and uniform dispatch, OpenCL context / queue / kernel /
//! memory / event management, and a thin window + event front-end.
//!
//! The GL side is built on glow, the window on winit + glutin, the CL side on
//! the raw cl-sys binding. Every handle returned by a `create` style call
//! carries exactly one logical ownership: the caller that received it must
//! release it through the matching `free` / `release` call. The toolkit never
//! retains handles behind the caller's back.
//!
//! Format knowledge is centralized in two registries: [`gl::format`] maps
//! sized internal formats to their channel layout and element type, and
//! [`gl::glsl`] maps GLSL data types to their element count and scalar
//! primitive. Creation calls validate against these tables so that a buffer,
//! texture and renderbuffer can never disagree on channel count.

/// fatal error taxonomy shared by the GL and CL layers
pub mod error;

/// processing input and window events through a process-wide FIFO queue
pub mod event;

/// common tools: project paths, RNG, PPM image I/O
pub mod util;

/// log
pub mod log;

/// OpenGL object lifecycle: formats, buffers, vertex arrays, textures,
/// renderbuffers, framebuffer composition, shaders and programs
pub mod gl;

/// OpenCL object lifecycle: platforms, devices, contexts, queues, programs,
/// kernels, memory objects and events
pub mod cl;

/// window + context front-end driving the frame loop and the event queue
pub mod renderer;

pub use error::{CoreError, Result};

/// Re-export the GL binding so callers share the toolkit's constants
/// (`glow::RGBA8`, `glow::FLOAT_MAT4`, ...) without a separate dependency.
pub use glow;
