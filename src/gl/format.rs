// GpuKit
// copyright zipxing@hotmail.com 2022~2025

//! Image format registry.
//!
//! One table maps every supported sized internal format to its base channel
//! layout and element data type; bytes-per-element and component count are
//! derived from those two in exactly one place. The usage validators below
//! are closed enumerations over the same keys and are the only gate in the
//! toolkit preventing ill-formed resource creation.
//!
//! Queries on unknown tokens return neutral values, they never fail.

/// channel set of an internal format
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum BaseLayout {
    R,
    Rg,
    Rgb,
    Rgba,
    Depth,
    DepthStencil,
}

impl BaseLayout {
    /// channel cardinality
    pub fn channels(self) -> u32 {
        match self {
            BaseLayout::R => 1,
            BaseLayout::Rg => 2,
            BaseLayout::Rgb => 3,
            BaseLayout::Rgba => 4,
            BaseLayout::Depth => 1,
            BaseLayout::DepthStencil => 2,
        }
    }
}

/// scalar data type of one channel
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ElementType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F16,
    F32,
    U24_8,
}

impl ElementType {
    /// storage width in bytes
    pub fn bytes(self) -> u32 {
        match self {
            ElementType::I8 | ElementType::U8 => 1,
            ElementType::I16 | ElementType::U16 | ElementType::F16 => 2,
            ElementType::I32 | ElementType::U32 | ElementType::F32 | ElementType::U24_8 => 4,
        }
    }

    /// matching GL pixel-transfer type token
    pub fn transfer_type(self) -> u32 {
        match self {
            ElementType::I8 => glow::BYTE,
            ElementType::U8 => glow::UNSIGNED_BYTE,
            ElementType::I16 => glow::SHORT,
            ElementType::U16 => glow::UNSIGNED_SHORT,
            ElementType::I32 => glow::INT,
            ElementType::U32 => glow::UNSIGNED_INT,
            ElementType::F16 => glow::HALF_FLOAT,
            ElementType::F32 => glow::FLOAT,
            ElementType::U24_8 => glow::UNSIGNED_INT_24_8,
        }
    }
}

/// the unique (layout, element type) decomposition of a sized format
pub fn entry(fmt: u32) -> Option<(BaseLayout, ElementType)> {
    use BaseLayout::*;
    use ElementType::*;
    let e = match fmt {
        glow::R8 => (R, U8),
        glow::R8_SNORM => (R, I8),
        glow::R8I => (R, I8),
        glow::R8UI => (R, U8),
        glow::R16 => (R, U16),
        glow::R16_SNORM => (R, I16),
        glow::R16I => (R, I16),
        glow::R16UI => (R, U16),
        glow::R16F => (R, F16),
        glow::R32I => (R, I32),
        glow::R32UI => (R, U32),
        glow::R32F => (R, F32),

        glow::RG8 => (Rg, U8),
        glow::RG8_SNORM => (Rg, I8),
        glow::RG8I => (Rg, I8),
        glow::RG8UI => (Rg, U8),
        glow::RG16 => (Rg, U16),
        glow::RG16_SNORM => (Rg, I16),
        glow::RG16I => (Rg, I16),
        glow::RG16UI => (Rg, U16),
        glow::RG16F => (Rg, F16),
        glow::RG32I => (Rg, I32),
        glow::RG32UI => (Rg, U32),
        glow::RG32F => (Rg, F32),

        glow::RGB8 => (Rgb, U8),
        glow::RGB8_SNORM => (Rgb, I8),
        glow::RGB8I => (Rgb, I8),
        glow::RGB8UI => (Rgb, U8),
        glow::RGB16 => (Rgb, U16),
        glow::RGB16_SNORM => (Rgb, I16),
        glow::RGB16I => (Rgb, I16),
        glow::RGB16UI => (Rgb, U16),
        glow::RGB16F => (Rgb, F16),
        glow::RGB32I => (Rgb, I32),
        glow::RGB32UI => (Rgb, U32),
        glow::RGB32F => (Rgb, F32),

        glow::RGBA8 => (Rgba, U8),
        glow::RGBA8_SNORM => (Rgba, I8),
        glow::RGBA8I => (Rgba, I8),
        glow::RGBA8UI => (Rgba, U8),
        glow::RGBA16 => (Rgba, U16),
        glow::RGBA16_SNORM => (Rgba, I16),
        glow::RGBA16I => (Rgba, I16),
        glow::RGBA16UI => (Rgba, U16),
        glow::RGBA16F => (Rgba, F16),
        glow::RGBA32I => (Rgba, I32),
        glow::RGBA32UI => (Rgba, U32),
        glow::RGBA32F => (Rgba, F32),

        glow::DEPTH_COMPONENT16 => (Depth, U16),
        glow::DEPTH_COMPONENT24 => (Depth, U32),
        glow::DEPTH_COMPONENT32F => (Depth, F32),
        glow::DEPTH24_STENCIL8 => (DepthStencil, U24_8),

        _ => return None,
    };
    Some(e)
}

pub fn contains(fmt: u32) -> bool {
    entry(fmt).is_some()
}

pub fn base_layout(fmt: u32) -> Option<BaseLayout> {
    entry(fmt).map(|e| e.0)
}

pub fn element_type(fmt: u32) -> Option<ElementType> {
    entry(fmt).map(|e| e.1)
}

/// bytes per element, 0 for unknown tokens
pub fn element_bytes(fmt: u32) -> u32 {
    entry(fmt).map(|e| e.1.bytes()).unwrap_or(0)
}

/// channel count, 0 for unknown tokens
pub fn component_count(fmt: u32) -> u32 {
    entry(fmt).map(|e| e.0.channels()).unwrap_or(0)
}

/// whether the format stores non-normalized integers (the *I / *UI set)
fn is_integer(fmt: u32) -> bool {
    matches!(
        fmt,
        glow::R8I
            | glow::R8UI
            | glow::R16I
            | glow::R16UI
            | glow::R32I
            | glow::R32UI
            | glow::RG8I
            | glow::RG8UI
            | glow::RG16I
            | glow::RG16UI
            | glow::RG32I
            | glow::RG32UI
            | glow::RGB8I
            | glow::RGB8UI
            | glow::RGB16I
            | glow::RGB16UI
            | glow::RGB32I
            | glow::RGB32UI
            | glow::RGBA8I
            | glow::RGBA8UI
            | glow::RGBA16I
            | glow::RGBA16UI
            | glow::RGBA32I
            | glow::RGBA32UI
    )
}

/// GL pixel-transfer format matching the internal format, 0 for unknown.
/// Integer internal formats take the *_INTEGER layouts.
pub fn transfer_format(fmt: u32) -> u32 {
    let layout = match base_layout(fmt) {
        Some(l) => l,
        None => return 0,
    };
    match (layout, is_integer(fmt)) {
        (BaseLayout::R, false) => glow::RED,
        (BaseLayout::R, true) => glow::RED_INTEGER,
        (BaseLayout::Rg, false) => glow::RG,
        (BaseLayout::Rg, true) => glow::RG_INTEGER,
        (BaseLayout::Rgb, false) => glow::RGB,
        (BaseLayout::Rgb, true) => glow::RGB_INTEGER,
        (BaseLayout::Rgba, false) => glow::RGBA,
        (BaseLayout::Rgba, true) => glow::RGBA_INTEGER,
        (BaseLayout::Depth, _) => glow::DEPTH_COMPONENT,
        (BaseLayout::DepthStencil, _) => glow::DEPTH_STENCIL,
    }
}

/// GL pixel-transfer type matching the internal format, 0 for unknown
pub fn transfer_type(fmt: u32) -> u32 {
    element_type(fmt).map(|t| t.transfer_type()).unwrap_or(0)
}

/// usable as the internal format of a 1D/2D/3D texture
pub fn is_texture_format(fmt: u32) -> bool {
    contains(fmt)
}

/// color-renderable: allowed for framebuffer color attachments.
/// The RGB and SNORM families are not required color-renderable and are
/// excluded.
pub fn is_framebuffer_color_format(fmt: u32) -> bool {
    matches!(
        fmt,
        glow::R8
            | glow::R16
            | glow::R16F
            | glow::R32F
            | glow::R8I
            | glow::R8UI
            | glow::R16I
            | glow::R16UI
            | glow::R32I
            | glow::R32UI
            | glow::RG8
            | glow::RG16
            | glow::RG16F
            | glow::RG32F
            | glow::RG8I
            | glow::RG8UI
            | glow::RG16I
            | glow::RG16UI
            | glow::RG32I
            | glow::RG32UI
            | glow::RGBA8
            | glow::RGBA16
            | glow::RGBA16F
            | glow::RGBA32F
            | glow::RGBA8I
            | glow::RGBA8UI
            | glow::RGBA16I
            | glow::RGBA16UI
            | glow::RGBA32I
            | glow::RGBA32UI
    )
}

/// allowed for framebuffer depth attachments; this is the stricter
/// depth-texture set and is applied to the renderbuffer path as well
pub fn is_framebuffer_depth_format(fmt: u32) -> bool {
    matches!(
        fmt,
        glow::DEPTH_COMPONENT16
            | glow::DEPTH_COMPONENT24
            | glow::DEPTH_COMPONENT32F
            | glow::DEPTH24_STENCIL8
    )
}

/// usable as renderbuffer storage: the renderable color set plus depth
pub fn is_renderbuffer_format(fmt: u32) -> bool {
    is_framebuffer_color_format(fmt) || is_framebuffer_depth_format(fmt)
}

/// usable behind a buffer texture, per the GL texture-buffer format list
pub fn is_texture_buffer_format(fmt: u32) -> bool {
    matches!(
        fmt,
        glow::R8
            | glow::R16
            | glow::R16F
            | glow::R32F
            | glow::R8I
            | glow::R16I
            | glow::R32I
            | glow::R8UI
            | glow::R16UI
            | glow::R32UI
            | glow::RG8
            | glow::RG16
            | glow::RG16F
            | glow::RG32F
            | glow::RG8I
            | glow::RG16I
            | glow::RG32I
            | glow::RG8UI
            | glow::RG16UI
            | glow::RG32UI
            | glow::RGB32F
            | glow::RGB32I
            | glow::RGB32UI
            | glow::RGBA8
            | glow::RGBA16
            | glow::RGBA16F
            | glow::RGBA32F
            | glow::RGBA8I
            | glow::RGBA16I
            | glow::RGBA32I
            | glow::RGBA8UI
            | glow::RGBA16UI
            | glow::RGBA32UI
    )
}

/// every format the registry knows, for iteration in checks and tests
pub const ALL_FORMATS: [u32; 52] = [
    glow::R8,
    glow::R8_SNORM,
    glow::R8I,
    glow::R8UI,
    glow::R16,
    glow::R16_SNORM,
    glow::R16I,
    glow::R16UI,
    glow::R16F,
    glow::R32I,
    glow::R32UI,
    glow::R32F,
    glow::RG8,
    glow::RG8_SNORM,
    glow::RG8I,
    glow::RG8UI,
    glow::RG16,
    glow::RG16_SNORM,
    glow::RG16I,
    glow::RG16UI,
    glow::RG16F,
    glow::RG32I,
    glow::RG32UI,
    glow::RG32F,
    glow::RGB8,
    glow::RGB8_SNORM,
    glow::RGB8I,
    glow::RGB8UI,
    glow::RGB16,
    glow::RGB16_SNORM,
    glow::RGB16I,
    glow::RGB16UI,
    glow::RGB16F,
    glow::RGB32I,
    glow::RGB32UI,
    glow::RGB32F,
    glow::RGBA8,
    glow::RGBA8_SNORM,
    glow::RGBA8I,
    glow::RGBA8UI,
    glow::RGBA16,
    glow::RGBA16_SNORM,
    glow::RGBA16I,
    glow::RGBA16UI,
    glow::RGBA16F,
    glow::RGBA32I,
    glow::RGBA32UI,
    glow::RGBA32F,
    glow::DEPTH_COMPONENT16,
    glow::DEPTH_COMPONENT24,
    glow::DEPTH_COMPONENT32F,
    glow::DEPTH24_STENCIL8,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_formats_decompose_uniquely() {
        for &f in ALL_FORMATS.iter() {
            assert!(contains(f));
            assert!(element_bytes(f) > 0);
            let c = component_count(f);
            assert!((1..=4).contains(&c), "components of {:#x} = {}", f, c);
            // derived values agree with the decomposition
            let (layout, ty) = entry(f).unwrap();
            assert_eq!(element_bytes(f), ty.bytes());
            assert_eq!(component_count(f), layout.channels());
        }
    }

    #[test]
    fn unknown_tokens_are_neutral() {
        let bogus = 0x1234_5678;
        assert!(!contains(bogus));
        assert_eq!(base_layout(bogus), None);
        assert_eq!(element_type(bogus), None);
        assert_eq!(element_bytes(bogus), 0);
        assert_eq!(component_count(bogus), 0);
        assert_eq!(transfer_format(bogus), 0);
        assert_eq!(transfer_type(bogus), 0);
    }

    #[test]
    fn validator_sets_nest_into_the_registry() {
        for &f in ALL_FORMATS.iter() {
            if is_framebuffer_color_format(f) {
                assert!(is_texture_format(f));
                assert!(is_renderbuffer_format(f));
            }
            if is_framebuffer_depth_format(f) {
                assert!(is_renderbuffer_format(f));
            }
            if is_texture_buffer_format(f) {
                assert!(is_texture_format(f));
            }
        }
        // depth set is disjoint from the color set
        assert!(!is_framebuffer_color_format(glow::DEPTH_COMPONENT24));
        assert!(!is_framebuffer_depth_format(glow::RGBA8));
    }

    #[test]
    fn integer_formats_take_integer_transfer_layouts() {
        assert_eq!(transfer_format(glow::RGBA8), glow::RGBA);
        assert_eq!(transfer_format(glow::RGBA8UI), glow::RGBA_INTEGER);
        assert_eq!(transfer_format(glow::R32I), glow::RED_INTEGER);
        assert_eq!(transfer_format(glow::DEPTH_COMPONENT24), glow::DEPTH_COMPONENT);
        assert_eq!(transfer_type(glow::DEPTH24_STENCIL8), glow::UNSIGNED_INT_24_8);
        assert_eq!(transfer_type(glow::RGBA16F), glow::HALF_FLOAT);
    }

    #[test]
    fn spec_sizes() {
        assert_eq!(element_bytes(glow::RGBA8), 1);
        assert_eq!(component_count(glow::RGBA8), 4);
        assert_eq!(element_bytes(glow::RG32F), 4);
        assert_eq!(component_count(glow::DEPTH24_STENCIL8), 2);
        assert_eq!(element_bytes(glow::DEPTH24_STENCIL8), 4);
    }
}
