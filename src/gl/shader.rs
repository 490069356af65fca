// GpuKit
// copyright zipxing@hotmail.com 2022~2025

//! Shader stages, program link, active-variable tables, uniform dispatch.
//!
//! After a successful link the program walks the driver's active-uniform and
//! active-attribute lists into two name-keyed tables. A name the linker
//! dropped resolves to location -1; writing it is a routine no-op, not an
//! error. Writing with the wrong GLSL type is an error: the table knows the
//! real type of every active variable.

use crate::error::{CoreError, Result};
use crate::gl::glsl::{self, Scalar};
use crate::util::read_source;
use glow::HasContext;
use log::warn;
use std::collections::HashMap;

/// one compiled stage; consumed by [`GlProgram::new`]
pub struct GlShader {
    pub shader: glow::Shader,
    pub stage: u32,
}

impl GlShader {
    /// compile one stage; the error payload carries the driver log and the
    /// failing source so diagnostics are self-contained
    pub fn from_source(gl: &glow::Context, stage: u32, source: &str) -> Result<Self> {
        if source.is_empty() {
            return Err(CoreError::Precondition("empty shader source".into()));
        }
        unsafe {
            let shader = gl.create_shader(stage)?;
            gl.shader_source(shader, source);
            gl.compile_shader(shader);
            if !gl.get_shader_compile_status(shader) {
                let log = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);
                return Err(CoreError::Compile {
                    log,
                    src: source.to_string(),
                });
            }
            Ok(Self { shader, stage })
        }
    }

    pub fn from_file(gl: &glow::Context, stage: u32, path: &str) -> Result<Self> {
        let source = read_source(path)?;
        Self::from_source(gl, stage, &source)
    }
}

/// one entry of the active-uniform / active-attribute tables
#[derive(Debug, Clone)]
pub struct ActiveVar {
    pub name: String,
    /// -1 when the name is not active
    pub location: i32,
    /// array size, 1 for non-arrays
    pub size: i32,
    /// GLSL type token
    pub ty: u32,
    gl_location: Option<glow::UniformLocation>,
}

/// linked program plus its variable tables; caller owned
pub struct GlProgram {
    pub program: glow::Program,
    uniforms: HashMap<String, ActiveVar>,
    attributes: HashMap<String, ActiveVar>,
    attached: Vec<glow::Shader>,
}

impl GlProgram {
    /// Link the pre-compiled stages. On success the stages are detached and
    /// deleted (the driver defers actual deletion until the last detach), the
    /// program is made current and the variable tables are materialized. On
    /// failure the stages are released too; nothing leaks.
    pub fn new(gl: &glow::Context, stages: Vec<GlShader>) -> Result<Self> {
        if stages.is_empty() {
            return Err(CoreError::Precondition("program needs at least one stage".into()));
        }
        unsafe {
            let program = gl.create_program()?;
            for s in &stages {
                gl.attach_shader(program, s.shader);
            }
            gl.link_program(program);
            if !gl.get_program_link_status(program) {
                let log = gl.get_program_info_log(program);
                for s in &stages {
                    gl.detach_shader(program, s.shader);
                    gl.delete_shader(s.shader);
                }
                gl.delete_program(program);
                return Err(CoreError::Link(log));
            }
            for s in &stages {
                gl.detach_shader(program, s.shader);
                gl.delete_shader(s.shader);
            }
            gl.use_program(Some(program));

            let mut p = Self {
                program,
                uniforms: HashMap::new(),
                attributes: HashMap::new(),
                attached: vec![],
            };
            p.read_active_uniforms(gl);
            p.read_active_attributes(gl);
            Ok(p)
        }
    }

    fn read_active_uniforms(&mut self, gl: &glow::Context) {
        unsafe {
            let n = gl.get_active_uniforms(self.program);
            for i in 0..n {
                if let Some(u) = gl.get_active_uniform(self.program, i) {
                    // the enumeration index is not the location; the
                    // location query is the authority
                    let gl_location = gl.get_uniform_location(self.program, &u.name);
                    let location = gl_location.as_ref().map(|l| l.0 as i32).unwrap_or(-1);
                    let var = ActiveVar {
                        name: u.name.clone(),
                        location,
                        size: u.size,
                        ty: u.utype,
                        gl_location,
                    };
                    self.uniforms.insert(u.name, var);
                }
            }
        }
    }

    fn read_active_attributes(&mut self, gl: &glow::Context) {
        unsafe {
            let n = gl.get_active_attributes(self.program);
            for i in 0..n {
                if let Some(a) = gl.get_active_attribute(self.program, i) {
                    let location = gl
                        .get_attrib_location(self.program, &a.name)
                        .map(|l| l as i32)
                        .unwrap_or(-1);
                    let var = ActiveVar {
                        name: a.name.clone(),
                        location,
                        size: a.size,
                        ty: a.atype,
                        gl_location: None,
                    };
                    self.attributes.insert(a.name, var);
                }
            }
        }
    }

    pub fn bind(&self, gl: &glow::Context) {
        unsafe {
            gl.use_program(Some(self.program));
        }
    }

    /// active uniforms keyed by name
    pub fn active_uniforms(&self) -> &HashMap<String, ActiveVar> {
        &self.uniforms
    }

    /// active attributes keyed by name
    pub fn active_attributes(&self) -> &HashMap<String, ActiveVar> {
        &self.attributes
    }

    /// location of an active uniform, -1 when the name is not active
    pub fn uniform_location(&self, name: &str) -> i32 {
        self.uniforms.get(name).map(|v| v.location).unwrap_or(-1)
    }

    /// location of an active attribute, -1 when the name is not active
    pub fn attribute_location(&self, name: &str) -> i32 {
        self.attributes.get(name).map(|v| v.location).unwrap_or(-1)
    }

    /// one-line summary for diagnostics
    pub fn get_program_info(&self, gl: &glow::Context) -> String {
        let linked = unsafe { gl.get_program_link_status(self.program) };
        format!(
            "program linked={} uniforms={} attributes={}",
            linked,
            self.uniforms.len(),
            self.attributes.len()
        )
    }

    /// Write a non-matrix uniform from packed scalar bytes. Returns
    /// `Ok(false)` when the name is not active.
    pub fn set_uniform(&self, gl: &glow::Context, name: &str, ty: u32, data: &[u8]) -> Result<bool> {
        let var = match self.uniforms.get(name) {
            Some(v) => v,
            None => {
                warn!("set_uniform: '{}' not active, location -1", name);
                return Ok(false);
            }
        };
        if glsl::is_matrix(ty) {
            return Err(CoreError::BadUniformType(ty));
        }
        self.write_var(gl, var, ty, data, false)
    }

    /// Matrix flavor with a row-major flag.
    pub fn set_uniform_matrix(
        &self,
        gl: &glow::Context,
        name: &str,
        ty: u32,
        data: &[u8],
        transpose: bool,
    ) -> Result<bool> {
        let var = match self.uniforms.get(name) {
            Some(v) => v,
            None => {
                warn!("set_uniform_matrix: '{}' not active, location -1", name);
                return Ok(false);
            }
        };
        if !glsl::is_matrix(ty) {
            return Err(CoreError::BadUniformType(ty));
        }
        self.write_var(gl, var, ty, data, transpose)
    }

    /// Write by location instead of name. Location -1 is a silent no-op with
    /// a diagnostic.
    pub fn set_uniform_loc(
        &self,
        gl: &glow::Context,
        location: i32,
        ty: u32,
        data: &[u8],
    ) -> Result<bool> {
        if location < 0 {
            warn!("set_uniform_loc: location -1, name not active");
            return Ok(false);
        }
        if glsl::is_matrix(ty) {
            return Err(CoreError::BadUniformType(ty));
        }
        let var = self.uniforms.values().find(|v| v.location == location);
        match var {
            Some(v) => self.write_var(gl, v, ty, data, false),
            None => {
                warn!("set_uniform_loc: no active uniform at location {}", location);
                Ok(false)
            }
        }
    }

    /// Matrix flavor of [`GlProgram::set_uniform_loc`].
    pub fn set_uniform_matrix_loc(
        &self,
        gl: &glow::Context,
        location: i32,
        ty: u32,
        data: &[u8],
        transpose: bool,
    ) -> Result<bool> {
        if location < 0 {
            warn!("set_uniform_matrix_loc: location -1, name not active");
            return Ok(false);
        }
        if !glsl::is_matrix(ty) {
            return Err(CoreError::BadUniformType(ty));
        }
        let var = self.uniforms.values().find(|v| v.location == location);
        match var {
            Some(v) => self.write_var(gl, v, ty, data, transpose),
            None => {
                warn!(
                    "set_uniform_matrix_loc: no active uniform at location {}",
                    location
                );
                Ok(false)
            }
        }
    }

    fn write_var(
        &self,
        gl: &glow::Context,
        var: &ActiveVar,
        ty: u32,
        data: &[u8],
        transpose: bool,
    ) -> Result<bool> {
        let entry = glsl::lookup(ty).ok_or(CoreError::BadUniformType(ty))?;
        if var.ty != ty {
            return Err(CoreError::BadUniformType(ty));
        }
        if var.location < 0 || var.gl_location.is_none() {
            warn!("uniform '{}' has no location", var.name);
            return Ok(false);
        }
        // one element, or a whole array of them
        let elem_bytes = (entry.length * entry.size) as usize;
        if elem_bytes == 0
            || data.len() % elem_bytes != 0
            || data.is_empty()
            || data.len() / elem_bytes > var.size.max(1) as usize
        {
            return Err(CoreError::BadUniformType(ty));
        }
        let loc = var.gl_location.clone();
        let loc = loc.as_ref();
        unsafe {
            match entry.scalar {
                Scalar::F32 => {
                    let v = bytes_to_f32(data);
                    if glsl::is_matrix(ty) {
                        write_matrix(gl, loc, ty, &v, transpose);
                    } else {
                        match entry.length {
                            1 => gl.uniform_1_f32_slice(loc, &v),
                            2 => gl.uniform_2_f32_slice(loc, &v),
                            3 => gl.uniform_3_f32_slice(loc, &v),
                            4 => gl.uniform_4_f32_slice(loc, &v),
                            _ => return Err(CoreError::BadUniformType(ty)),
                        }
                    }
                }
                Scalar::I32 => {
                    let v = bytes_to_i32(data);
                    match entry.length {
                        1 => gl.uniform_1_i32_slice(loc, &v),
                        2 => gl.uniform_2_i32_slice(loc, &v),
                        3 => gl.uniform_3_i32_slice(loc, &v),
                        4 => gl.uniform_4_i32_slice(loc, &v),
                        _ => return Err(CoreError::BadUniformType(ty)),
                    }
                }
                Scalar::U32 => {
                    let v = bytes_to_u32(data);
                    match entry.length {
                        1 => gl.uniform_1_u32_slice(loc, &v),
                        2 => gl.uniform_2_u32_slice(loc, &v),
                        3 => gl.uniform_3_u32_slice(loc, &v),
                        4 => gl.uniform_4_u32_slice(loc, &v),
                        _ => return Err(CoreError::BadUniformType(ty)),
                    }
                }
                // the binding exposes no fp64 uniform entry points
                Scalar::F64 => return Err(CoreError::BadUniformType(ty)),
            }
        }
        Ok(true)
    }

    /// Detach and delete whatever is still attached, then delete the program.
    pub fn destroy(self, gl: &glow::Context) {
        unsafe {
            for s in &self.attached {
                gl.detach_shader(self.program, *s);
                gl.delete_shader(*s);
            }
            gl.delete_program(self.program);
        }
    }
}

unsafe fn write_matrix(
    gl: &glow::Context,
    loc: Option<&glow::UniformLocation>,
    ty: u32,
    v: &[f32],
    transpose: bool,
) {
    match ty {
        glow::FLOAT_MAT2 => gl.uniform_matrix_2_f32_slice(loc, transpose, v),
        glow::FLOAT_MAT3 => gl.uniform_matrix_3_f32_slice(loc, transpose, v),
        glow::FLOAT_MAT4 => gl.uniform_matrix_4_f32_slice(loc, transpose, v),
        glow::FLOAT_MAT2x3 => gl.uniform_matrix_2x3_f32_slice(loc, transpose, v),
        glow::FLOAT_MAT2x4 => gl.uniform_matrix_2x4_f32_slice(loc, transpose, v),
        glow::FLOAT_MAT3x2 => gl.uniform_matrix_3x2_f32_slice(loc, transpose, v),
        glow::FLOAT_MAT3x4 => gl.uniform_matrix_3x4_f32_slice(loc, transpose, v),
        glow::FLOAT_MAT4x2 => gl.uniform_matrix_4x2_f32_slice(loc, transpose, v),
        glow::FLOAT_MAT4x3 => gl.uniform_matrix_4x3_f32_slice(loc, transpose, v),
        _ => {}
    }
}

fn bytes_to_f32(data: &[u8]) -> Vec<f32> {
    data.chunks_exact(4)
        .map(|c| f32::from_ne_bytes(c.try_into().unwrap()))
        .collect()
}

fn bytes_to_i32(data: &[u8]) -> Vec<i32> {
    data.chunks_exact(4)
        .map(|c| i32::from_ne_bytes(c.try_into().unwrap()))
        .collect()
}

fn bytes_to_u32(data: &[u8]) -> Vec<u32> {
    data.chunks_exact(4)
        .map(|c| u32::from_ne_bytes(c.try_into().unwrap()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_casts_round_scalars() {
        let f = [1.5f32, -2.0, 0.25];
        let bytes: Vec<u8> = f.iter().flat_map(|x| x.to_ne_bytes()).collect();
        assert_eq!(bytes_to_f32(&bytes), f.to_vec());

        let i = [-7i32, 42];
        let bytes: Vec<u8> = i.iter().flat_map(|x| x.to_ne_bytes()).collect();
        assert_eq!(bytes_to_i32(&bytes), i.to_vec());

        let u = [7u32, 0xffff_ffff];
        let bytes: Vec<u8> = u.iter().flat_map(|x| x.to_ne_bytes()).collect();
        assert_eq!(bytes_to_u32(&bytes), u.to_vec());
    }
}
