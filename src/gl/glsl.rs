// GpuKit
// copyright zipxing@hotmail.com 2022~2025

//! GLSL data-type registry.
//!
//! Parallel to the image format registry but for shader variables: every
//! GLSL type token maps to a printable name, its element count, the byte
//! size of one scalar and the scalar primitive identity. Attribute and
//! uniform dispatch route through this table.
//!
//! Samplers are modeled as single s32 entries because they are assigned by
//! texture-unit index. Matrices carry element count = columns x rows and
//! share the scalar of their base vector. Booleans are s32 backed.

/// scalar primitive identity of a GLSL type
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Scalar {
    F64,
    F32,
    I32,
    U32,
}

/// one registry entry
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct GlslType {
    /// printable GLSL name
    pub name: &'static str,
    /// element count: 1 for scalars and samplers, 2-4 for vectors,
    /// columns x rows for matrices
    pub length: u32,
    /// byte size of one scalar
    pub size: u32,
    /// scalar primitive
    pub scalar: Scalar,
}

const fn t(name: &'static str, length: u32, size: u32, scalar: Scalar) -> GlslType {
    GlslType {
        name,
        length,
        size,
        scalar,
    }
}

/// the registry lookup; `None` for unknown tokens
pub fn lookup(ty: u32) -> Option<GlslType> {
    use Scalar::*;
    let e = match ty {
        glow::FLOAT => t("float", 1, 4, F32),
        glow::FLOAT_VEC2 => t("vec2", 2, 4, F32),
        glow::FLOAT_VEC3 => t("vec3", 3, 4, F32),
        glow::FLOAT_VEC4 => t("vec4", 4, 4, F32),

        glow::DOUBLE => t("double", 1, 8, F64),
        glow::DOUBLE_VEC2 => t("dvec2", 2, 8, F64),
        glow::DOUBLE_VEC3 => t("dvec3", 3, 8, F64),
        glow::DOUBLE_VEC4 => t("dvec4", 4, 8, F64),

        glow::INT => t("int", 1, 4, I32),
        glow::INT_VEC2 => t("ivec2", 2, 4, I32),
        glow::INT_VEC3 => t("ivec3", 3, 4, I32),
        glow::INT_VEC4 => t("ivec4", 4, 4, I32),

        glow::UNSIGNED_INT => t("uint", 1, 4, U32),
        glow::UNSIGNED_INT_VEC2 => t("uvec2", 2, 4, U32),
        glow::UNSIGNED_INT_VEC3 => t("uvec3", 3, 4, U32),
        glow::UNSIGNED_INT_VEC4 => t("uvec4", 4, 4, U32),

        glow::BOOL => t("bool", 1, 4, I32),
        glow::BOOL_VEC2 => t("bvec2", 2, 4, I32),
        glow::BOOL_VEC3 => t("bvec3", 3, 4, I32),
        glow::BOOL_VEC4 => t("bvec4", 4, 4, I32),

        glow::FLOAT_MAT2 => t("mat2", 4, 4, F32),
        glow::FLOAT_MAT3 => t("mat3", 9, 4, F32),
        glow::FLOAT_MAT4 => t("mat4", 16, 4, F32),
        glow::FLOAT_MAT2x3 => t("mat2x3", 6, 4, F32),
        glow::FLOAT_MAT2x4 => t("mat2x4", 8, 4, F32),
        glow::FLOAT_MAT3x2 => t("mat3x2", 6, 4, F32),
        glow::FLOAT_MAT3x4 => t("mat3x4", 12, 4, F32),
        glow::FLOAT_MAT4x2 => t("mat4x2", 8, 4, F32),
        glow::FLOAT_MAT4x3 => t("mat4x3", 12, 4, F32),

        glow::DOUBLE_MAT2 => t("dmat2", 4, 8, F64),
        glow::DOUBLE_MAT3 => t("dmat3", 9, 8, F64),
        glow::DOUBLE_MAT4 => t("dmat4", 16, 8, F64),

        glow::SAMPLER_1D => t("sampler1D", 1, 4, I32),
        glow::SAMPLER_2D => t("sampler2D", 1, 4, I32),
        glow::SAMPLER_3D => t("sampler3D", 1, 4, I32),
        glow::SAMPLER_CUBE => t("samplerCube", 1, 4, I32),
        glow::SAMPLER_1D_SHADOW => t("sampler1DShadow", 1, 4, I32),
        glow::SAMPLER_2D_SHADOW => t("sampler2DShadow", 1, 4, I32),
        glow::SAMPLER_1D_ARRAY => t("sampler1DArray", 1, 4, I32),
        glow::SAMPLER_2D_ARRAY => t("sampler2DArray", 1, 4, I32),
        glow::SAMPLER_2D_ARRAY_SHADOW => t("sampler2DArrayShadow", 1, 4, I32),
        glow::SAMPLER_2D_MULTISAMPLE => t("sampler2DMS", 1, 4, I32),
        glow::SAMPLER_CUBE_SHADOW => t("samplerCubeShadow", 1, 4, I32),
        glow::SAMPLER_BUFFER => t("samplerBuffer", 1, 4, I32),
        glow::INT_SAMPLER_1D => t("isampler1D", 1, 4, I32),
        glow::INT_SAMPLER_2D => t("isampler2D", 1, 4, I32),
        glow::INT_SAMPLER_3D => t("isampler3D", 1, 4, I32),
        glow::INT_SAMPLER_CUBE => t("isamplerCube", 1, 4, I32),
        glow::INT_SAMPLER_BUFFER => t("isamplerBuffer", 1, 4, I32),
        glow::UNSIGNED_INT_SAMPLER_1D => t("usampler1D", 1, 4, I32),
        glow::UNSIGNED_INT_SAMPLER_2D => t("usampler2D", 1, 4, I32),
        glow::UNSIGNED_INT_SAMPLER_3D => t("usampler3D", 1, 4, I32),
        glow::UNSIGNED_INT_SAMPLER_CUBE => t("usamplerCube", 1, 4, I32),
        glow::UNSIGNED_INT_SAMPLER_BUFFER => t("usamplerBuffer", 1, 4, I32),

        _ => return None,
    };
    Some(e)
}

pub fn contains(ty: u32) -> bool {
    lookup(ty).is_some()
}

/// printable name, "" for unknown tokens
pub fn name(ty: u32) -> &'static str {
    lookup(ty).map(|e| e.name).unwrap_or("")
}

/// element count, 0 for unknown tokens
pub fn length(ty: u32) -> u32 {
    lookup(ty).map(|e| e.length).unwrap_or(0)
}

/// scalar byte size, 0 for unknown tokens
pub fn size(ty: u32) -> u32 {
    lookup(ty).map(|e| e.size).unwrap_or(0)
}

pub fn is_double(ty: u32) -> bool {
    lookup(ty).map(|e| e.scalar == Scalar::F64).unwrap_or(false)
}

pub fn is_float(ty: u32) -> bool {
    lookup(ty).map(|e| e.scalar == Scalar::F32).unwrap_or(false)
}

pub fn is_int(ty: u32) -> bool {
    lookup(ty).map(|e| e.scalar == Scalar::I32).unwrap_or(false)
}

pub fn is_uint(ty: u32) -> bool {
    lookup(ty).map(|e| e.scalar == Scalar::U32).unwrap_or(false)
}

/// matrix classification, used by the uniform dispatcher
pub fn is_matrix(ty: u32) -> bool {
    matches!(
        ty,
        glow::FLOAT_MAT2
            | glow::FLOAT_MAT3
            | glow::FLOAT_MAT4
            | glow::FLOAT_MAT2x3
            | glow::FLOAT_MAT2x4
            | glow::FLOAT_MAT3x2
            | glow::FLOAT_MAT3x4
            | glow::FLOAT_MAT4x2
            | glow::FLOAT_MAT4x3
            | glow::DOUBLE_MAT2
            | glow::DOUBLE_MAT3
            | glow::DOUBLE_MAT4
    )
}

/// sampler classification
pub fn is_sampler(ty: u32) -> bool {
    matches!(
        ty,
        glow::SAMPLER_1D
            | glow::SAMPLER_2D
            | glow::SAMPLER_3D
            | glow::SAMPLER_CUBE
            | glow::SAMPLER_1D_SHADOW
            | glow::SAMPLER_2D_SHADOW
            | glow::SAMPLER_1D_ARRAY
            | glow::SAMPLER_2D_ARRAY
            | glow::SAMPLER_2D_ARRAY_SHADOW
            | glow::SAMPLER_2D_MULTISAMPLE
            | glow::SAMPLER_CUBE_SHADOW
            | glow::SAMPLER_BUFFER
            | glow::INT_SAMPLER_1D
            | glow::INT_SAMPLER_2D
            | glow::INT_SAMPLER_3D
            | glow::INT_SAMPLER_CUBE
            | glow::INT_SAMPLER_BUFFER
            | glow::UNSIGNED_INT_SAMPLER_1D
            | glow::UNSIGNED_INT_SAMPLER_2D
            | glow::UNSIGNED_INT_SAMPLER_3D
            | glow::UNSIGNED_INT_SAMPLER_CUBE
            | glow::UNSIGNED_INT_SAMPLER_BUFFER
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_widths() {
        // length * size equals the packed scalar width
        assert_eq!(length(glow::FLOAT_VEC3) * size(glow::FLOAT_VEC3), 12);
        assert_eq!(length(glow::FLOAT_MAT4) * size(glow::FLOAT_MAT4), 64);
        assert_eq!(length(glow::DOUBLE_VEC4) * size(glow::DOUBLE_VEC4), 32);
        assert_eq!(length(glow::SAMPLER_2D) * size(glow::SAMPLER_2D), 4);
        assert_eq!(length(glow::FLOAT_MAT2x3) * size(glow::FLOAT_MAT2x3), 24);
    }

    #[test]
    fn scalar_classification_is_exclusive() {
        for ty in [
            glow::FLOAT_VEC2,
            glow::DOUBLE_MAT4,
            glow::INT_VEC3,
            glow::UNSIGNED_INT,
            glow::SAMPLER_BUFFER,
            glow::BOOL_VEC4,
        ] {
            let n = [is_double(ty), is_float(ty), is_int(ty), is_uint(ty)]
                .iter()
                .filter(|&&b| b)
                .count();
            assert_eq!(n, 1, "type {:#x}", ty);
        }
    }

    #[test]
    fn samplers_are_unit_ints() {
        assert!(is_sampler(glow::UNSIGNED_INT_SAMPLER_3D));
        assert!(is_int(glow::UNSIGNED_INT_SAMPLER_3D));
        assert_eq!(length(glow::SAMPLER_CUBE), 1);
        assert!(!is_sampler(glow::FLOAT_VEC4));
    }

    #[test]
    fn unknown_tokens_are_neutral() {
        let bogus = 0xbeef_0000;
        assert!(!contains(bogus));
        assert_eq!(name(bogus), "");
        assert_eq!(length(bogus), 0);
        assert_eq!(size(bogus), 0);
        assert!(!is_float(bogus) && !is_double(bogus) && !is_int(bogus) && !is_uint(bogus));
    }

    #[test]
    fn names_print_as_glsl() {
        assert_eq!(name(glow::FLOAT_MAT3), "mat3");
        assert_eq!(name(glow::UNSIGNED_INT_VEC2), "uvec2");
        assert_eq!(name(glow::SAMPLER_2D), "sampler2D");
    }
}
