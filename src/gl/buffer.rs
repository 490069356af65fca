// GpuKit
// copyright zipxing@hotmail.com 2022~2025

//! Buffer objects and vertex-array state capture.
//!
//! A vertex array records three things while it is bound: which attribute
//! locations are enabled, the format of each enabled attribute together with
//! whichever buffer is bound to ARRAY_BUFFER at declaration time, and the
//! element-index-buffer binding. The ARRAY_BUFFER binding itself is not part
//! of the captured state.
//!
//! Attribute declaration dispatches on the GLSL type registry: the driver's
//! three pointer calls are not interchangeable, and feeding an integer type
//! through the float call reads as garbage in the shader. The dispatch here
//! prevents that class of mistake by type inspection.

use crate::error::{CoreError, Result};
use crate::gl::glsl::{self, Scalar};
use glow::HasContext;
use log::warn;

/// a typed data store; caller owned
pub struct GlBuffer {
    pub buffer: glow::Buffer,
    pub target: u32,
    pub size: i32,
    pub usage: u32,
}

impl GlBuffer {
    /// allocate an uninitialized store of `size` bytes
    pub fn new(gl: &glow::Context, target: u32, size: i32, usage: u32) -> Result<Self> {
        if size <= 0 {
            return Err(CoreError::Precondition(format!(
                "buffer size must be positive, got {}",
                size
            )));
        }
        unsafe {
            let buffer = gl.create_buffer()?;
            gl.bind_buffer(target, Some(buffer));
            gl.buffer_data_size(target, size, usage);
            gl.bind_buffer(target, None);
            Ok(Self {
                buffer,
                target,
                size,
                usage,
            })
        }
    }

    /// allocate and fill the store in one call
    pub fn with_data(gl: &glow::Context, target: u32, data: &[u8], usage: u32) -> Result<Self> {
        if data.is_empty() {
            return Err(CoreError::Precondition("buffer data must not be empty".into()));
        }
        unsafe {
            let buffer = gl.create_buffer()?;
            gl.bind_buffer(target, Some(buffer));
            gl.buffer_data_u8_slice(target, data, usage);
            gl.bind_buffer(target, None);
            Ok(Self {
                buffer,
                target,
                size: data.len() as i32,
                usage,
            })
        }
    }

    /// upload into a region of the existing store
    pub fn update(&self, gl: &glow::Context, offset: i32, data: &[u8]) -> Result<()> {
        if offset < 0 || offset as usize + data.len() > self.size as usize {
            return Err(CoreError::Precondition(format!(
                "buffer update {}+{} exceeds size {}",
                offset,
                data.len(),
                self.size
            )));
        }
        unsafe {
            gl.bind_buffer(self.target, Some(self.buffer));
            gl.buffer_sub_data_u8_slice(self.target, offset, data);
            gl.bind_buffer(self.target, None);
        }
        Ok(())
    }

    pub fn bind(&self, gl: &glow::Context) {
        unsafe {
            gl.bind_buffer(self.target, Some(self.buffer));
        }
    }

    pub fn unbind(&self, gl: &glow::Context) {
        unsafe {
            gl.bind_buffer(self.target, None);
        }
    }

    pub fn free(&self, gl: &glow::Context) {
        unsafe {
            gl.delete_buffer(self.buffer);
        }
    }
}

/// access flag of the buffer bound to `target`
pub fn buffer_access(gl: &glow::Context, target: u32) -> i32 {
    unsafe { gl.get_buffer_parameter_i32(target, glow::BUFFER_ACCESS) }
}

/// byte size of the buffer bound to `target`
pub fn buffer_size(gl: &glow::Context, target: u32) -> i32 {
    unsafe { gl.get_buffer_parameter_i32(target, glow::BUFFER_SIZE) }
}

/// usage pattern of the buffer bound to `target`
pub fn buffer_usage(gl: &glow::Context, target: u32) -> u32 {
    unsafe { gl.get_buffer_parameter_i32(target, glow::BUFFER_USAGE) as u32 }
}

/// mapped state of the buffer bound to `target`
pub fn buffer_mapped(gl: &glow::Context, target: u32) -> bool {
    unsafe { gl.get_buffer_parameter_i32(target, glow::BUFFER_MAPPED) != 0 }
}

/// vertex-array snapshot; caller owned
pub struct GlVertexArray {
    pub vao: glow::VertexArray,
}

impl GlVertexArray {
    pub fn new(gl: &glow::Context) -> Result<Self> {
        let vao = unsafe { gl.create_vertex_array()? };
        Ok(Self { vao })
    }

    pub fn bind(&self, gl: &glow::Context) {
        unsafe {
            gl.bind_vertex_array(Some(self.vao));
        }
    }

    pub fn unbind(&self, gl: &glow::Context) {
        unsafe {
            gl.bind_vertex_array(None);
        }
    }

    /// capture the element-index-buffer binding into this vertex array
    pub fn set_index_buffer(&self, gl: &glow::Context, buf: &GlBuffer) {
        unsafe {
            gl.bind_vertex_array(Some(self.vao));
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(buf.buffer));
            gl.bind_vertex_array(None);
        }
    }

    pub fn free(&self, gl: &glow::Context) {
        unsafe {
            gl.delete_vertex_array(self.vao);
        }
    }
}

/// column/row geometry of a matrix type token
fn matrix_dims(ty: u32) -> Option<(u32, u32)> {
    let d = match ty {
        glow::FLOAT_MAT2 | glow::DOUBLE_MAT2 => (2, 2),
        glow::FLOAT_MAT3 | glow::DOUBLE_MAT3 => (3, 3),
        glow::FLOAT_MAT4 | glow::DOUBLE_MAT4 => (4, 4),
        glow::FLOAT_MAT2x3 => (2, 3),
        glow::FLOAT_MAT2x4 => (2, 4),
        glow::FLOAT_MAT3x2 => (3, 2),
        glow::FLOAT_MAT3x4 => (3, 4),
        glow::FLOAT_MAT4x2 => (4, 2),
        glow::FLOAT_MAT4x3 => (4, 3),
        _ => return None,
    };
    Some(d)
}

/// GL scalar token for a registry scalar
fn scalar_token(s: Scalar) -> u32 {
    match s {
        Scalar::F64 => glow::DOUBLE,
        Scalar::F32 => glow::FLOAT,
        Scalar::I32 => glow::INT,
        Scalar::U32 => glow::UNSIGNED_INT,
    }
}

/// Enable an attribute location. Location -1 is a routine no-op: the shader
/// may simply not use that input.
pub fn enable_attribute(gl: &glow::Context, location: i32) -> bool {
    if location < 0 {
        warn!("enable_attribute: location -1, name not active");
        return false;
    }
    unsafe {
        gl.enable_vertex_attrib_array(location as u32);
    }
    true
}

pub fn disable_attribute(gl: &glow::Context, location: i32) -> bool {
    if location < 0 {
        warn!("disable_attribute: location -1, name not active");
        return false;
    }
    unsafe {
        gl.disable_vertex_attrib_array(location as u32);
    }
    true
}

/// Float path: float scalar types plus integer types normalized or converted
/// to float. Matrix types occupy one location per column.
pub fn attribute_pointer(
    gl: &glow::Context,
    location: i32,
    glsl_ty: u32,
    normalized: bool,
    stride: i32,
    offset: i32,
) -> Result<bool> {
    if location < 0 {
        warn!("attribute_pointer: location -1, name not active");
        return Ok(false);
    }
    let entry = glsl::lookup(glsl_ty)
        .ok_or_else(|| CoreError::Precondition(format!("unknown glsl type {:#06x}", glsl_ty)))?;
    if entry.scalar == Scalar::F64 {
        return Err(CoreError::Precondition(format!(
            "{} requires the double path",
            entry.name
        )));
    }
    if glsl::is_sampler(glsl_ty) {
        return Err(CoreError::Precondition(format!(
            "{} is not a vertex attribute type",
            entry.name
        )));
    }
    let token = scalar_token(entry.scalar);
    unsafe {
        if let Some((cols, rows)) = matrix_dims(glsl_ty) {
            let col_bytes = rows as i32 * entry.size as i32;
            for c in 0..cols {
                gl.vertex_attrib_pointer_f32(
                    location as u32 + c,
                    rows as i32,
                    token,
                    normalized,
                    stride,
                    offset + c as i32 * col_bytes,
                );
            }
        } else {
            gl.vertex_attrib_pointer_f32(
                location as u32,
                entry.length as i32,
                token,
                normalized,
                stride,
                offset,
            );
        }
    }
    Ok(true)
}

/// Integer-preserving path; rejects non-integer types.
pub fn attribute_pointer_i(
    gl: &glow::Context,
    location: i32,
    glsl_ty: u32,
    stride: i32,
    offset: i32,
) -> Result<bool> {
    if location < 0 {
        warn!("attribute_pointer_i: location -1, name not active");
        return Ok(false);
    }
    let entry = glsl::lookup(glsl_ty)
        .ok_or_else(|| CoreError::Precondition(format!("unknown glsl type {:#06x}", glsl_ty)))?;
    if !matches!(entry.scalar, Scalar::I32 | Scalar::U32) || glsl::is_sampler(glsl_ty) {
        return Err(CoreError::Precondition(format!(
            "{} is not an integer attribute type",
            entry.name
        )));
    }
    unsafe {
        gl.vertex_attrib_pointer_i32(
            location as u32,
            entry.length as i32,
            scalar_token(entry.scalar),
            stride,
            offset,
        );
    }
    Ok(true)
}

/// Double-preserving path; rejects non-f64 types. Matrix types occupy one
/// location per column.
pub fn attribute_pointer_d(
    gl: &glow::Context,
    location: i32,
    glsl_ty: u32,
    stride: i32,
    offset: i32,
) -> Result<bool> {
    if location < 0 {
        warn!("attribute_pointer_d: location -1, name not active");
        return Ok(false);
    }
    let entry = glsl::lookup(glsl_ty)
        .ok_or_else(|| CoreError::Precondition(format!("unknown glsl type {:#06x}", glsl_ty)))?;
    if entry.scalar != Scalar::F64 {
        return Err(CoreError::Precondition(format!(
            "{} is not a double attribute type",
            entry.name
        )));
    }
    unsafe {
        if let Some((cols, rows)) = matrix_dims(glsl_ty) {
            let col_bytes = rows as i32 * entry.size as i32;
            for c in 0..cols {
                gl.vertex_attrib_pointer_f64(
                    location as u32 + c,
                    rows as i32,
                    glow::DOUBLE,
                    stride,
                    offset + c as i32 * col_bytes,
                );
            }
        } else {
            gl.vertex_attrib_pointer_f64(
                location as u32,
                entry.length as i32,
                glow::DOUBLE,
                stride,
                offset,
            );
        }
    }
    Ok(true)
}

/// Constant attribute value, float path. The binding only exposes the float
/// immediate family, so integer and double constants have no setter here.
pub fn attribute_value(
    gl: &glow::Context,
    location: i32,
    glsl_ty: u32,
    data: &[f32],
) -> Result<bool> {
    if location < 0 {
        warn!("attribute_value: location -1, name not active");
        return Ok(false);
    }
    let entry = glsl::lookup(glsl_ty)
        .ok_or_else(|| CoreError::Precondition(format!("unknown glsl type {:#06x}", glsl_ty)))?;
    if entry.scalar != Scalar::F32 || glsl::is_matrix(glsl_ty) {
        return Err(CoreError::Precondition(format!(
            "{} is not a float vector attribute type",
            entry.name
        )));
    }
    if data.len() < entry.length as usize {
        return Err(CoreError::Precondition(format!(
            "attribute_value needs {} floats, got {}",
            entry.length,
            data.len()
        )));
    }
    let loc = location as u32;
    unsafe {
        match entry.length {
            1 => gl.vertex_attrib_1_f32(loc, data[0]),
            2 => gl.vertex_attrib_2_f32(loc, data[0], data[1]),
            3 => gl.vertex_attrib_3_f32(loc, data[0], data[1], data[2]),
            4 => gl.vertex_attrib_4_f32(loc, data[0], data[1], data[2], data[3]),
            _ => unreachable!(),
        }
    }
    Ok(true)
}

/// instancing divisor for an attribute location
pub fn attribute_divisor(gl: &glow::Context, location: i32, divisor: u32) -> bool {
    if location < 0 {
        warn!("attribute_divisor: location -1, name not active");
        return false;
    }
    unsafe {
        gl.vertex_attrib_divisor(location as u32, divisor);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_geometry() {
        assert_eq!(matrix_dims(glow::FLOAT_MAT4), Some((4, 4)));
        assert_eq!(matrix_dims(glow::FLOAT_MAT2x3), Some((2, 3)));
        assert_eq!(matrix_dims(glow::FLOAT_MAT4x2), Some((4, 2)));
        assert_eq!(matrix_dims(glow::FLOAT_VEC3), None);
        // columns x rows matches the registry element count
        for ty in [glow::FLOAT_MAT3, glow::FLOAT_MAT3x4, glow::DOUBLE_MAT2] {
            let (c, r) = matrix_dims(ty).unwrap();
            assert_eq!(c * r, glsl::length(ty));
        }
    }

    #[test]
    fn scalar_tokens() {
        assert_eq!(scalar_token(Scalar::F32), glow::FLOAT);
        assert_eq!(scalar_token(Scalar::F64), glow::DOUBLE);
        assert_eq!(scalar_token(Scalar::I32), glow::INT);
        assert_eq!(scalar_token(Scalar::U32), glow::UNSIGNED_INT);
    }
}
