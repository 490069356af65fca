// GpuKit
// copyright zipxing@hotmail.com 2022~2025

//! Memory objects: buffers and the six image descriptor kinds
//! {1D, 1D-buffer, 1D-array, 2D, 2D-array, 3D}.
//!
//! The access mode in `flags` is fixed at creation. Image formats on this
//! side are (channel order, channel type) records, independent of the GL
//! internal-format tokens; converting between the two is out of scope.
//!
//! The conversion helpers pack a host bitmap into float arrays normalized
//! to [0,1]; channels the host bitmap lacks are zero filled.

use crate::cl::check;
use crate::cl::context::ClContext;
use crate::error::{CoreError, Result};
use cl_sys::{
    cl_channel_order, cl_channel_type, cl_image_desc, cl_image_format, cl_int, cl_mem,
    cl_mem_flags, cl_mem_object_type, clCreateBuffer, clCreateImage, clReleaseMemObject,
    CL_MEM_COPY_HOST_PTR, CL_MEM_OBJECT_IMAGE1D, CL_MEM_OBJECT_IMAGE1D_ARRAY,
    CL_MEM_OBJECT_IMAGE1D_BUFFER, CL_MEM_OBJECT_IMAGE2D, CL_MEM_OBJECT_IMAGE2D_ARRAY,
    CL_MEM_OBJECT_IMAGE3D, CL_MEM_USE_HOST_PTR, CL_SUCCESS,
};
use std::ffi::c_void;
use std::ptr;

/// (channel order, channel type) record of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClImageFormat {
    pub order: cl_channel_order,
    pub data_type: cl_channel_type,
}

impl ClImageFormat {
    pub fn new(order: cl_channel_order, data_type: cl_channel_type) -> Self {
        Self { order, data_type }
    }

    fn raw(&self) -> cl_image_format {
        cl_image_format {
            image_channel_order: self.order,
            image_channel_data_type: self.data_type,
        }
    }
}

/// buffer or image object; caller owned, access mode fixed at creation
pub struct ClMem {
    pub(crate) mem: cl_mem,
    /// byte size for buffers, 0 for images
    pub size: usize,
}

fn host_ptr(host: Option<&[u8]>) -> *mut c_void {
    match host {
        Some(h) => h.as_ptr() as *mut c_void,
        None => ptr::null_mut(),
    }
}

/// the raw API only accepts a host pointer together with a host-ptr flag
fn host_flags(flags: cl_mem_flags, host: Option<&[u8]>) -> cl_mem_flags {
    if host.is_some() && flags & (CL_MEM_COPY_HOST_PTR | CL_MEM_USE_HOST_PTR) == 0 {
        flags | CL_MEM_COPY_HOST_PTR
    } else {
        flags
    }
}

impl ClMem {
    /// plain buffer of `size` bytes, optionally initialized from `host`
    pub fn buffer(
        ctx: &ClContext,
        flags: cl_mem_flags,
        size: usize,
        host: Option<&[u8]>,
    ) -> Result<Self> {
        if size == 0 {
            return Err(CoreError::Precondition("buffer size must be positive".into()));
        }
        if let Some(h) = host {
            if h.len() < size {
                return Err(CoreError::Precondition(format!(
                    "host init needs {} bytes, got {}",
                    size,
                    h.len()
                )));
            }
        }
        let mut err: cl_int = CL_SUCCESS;
        let mem = unsafe {
            clCreateBuffer(
                ctx.context,
                host_flags(flags, host),
                size,
                host_ptr(host),
                &mut err,
            )
        };
        check(err, "clCreateBuffer")?;
        Ok(Self { mem, size })
    }

    fn image(
        ctx: &ClContext,
        flags: cl_mem_flags,
        format: ClImageFormat,
        desc: cl_image_desc,
        host: Option<&[u8]>,
    ) -> Result<Self> {
        let fmt = format.raw();
        let mut err: cl_int = CL_SUCCESS;
        let mem = unsafe {
            clCreateImage(
                ctx.context,
                host_flags(flags, host),
                &fmt,
                &desc,
                host_ptr(host),
                &mut err,
            )
        };
        check(err, "clCreateImage")?;
        Ok(Self { mem, size: 0 })
    }

    fn desc(image_type: cl_mem_object_type) -> cl_image_desc {
        cl_image_desc {
            image_type,
            image_width: 0,
            image_height: 0,
            image_depth: 0,
            image_array_size: 0,
            image_row_pitch: 0,
            image_slice_pitch: 0,
            num_mip_levels: 0,
            num_samples: 0,
            buffer: ptr::null_mut(),
        }
    }

    pub fn image1d(
        ctx: &ClContext,
        flags: cl_mem_flags,
        format: ClImageFormat,
        width: usize,
        host: Option<&[u8]>,
    ) -> Result<Self> {
        if width == 0 {
            return Err(CoreError::Precondition("image width must be positive".into()));
        }
        let mut d = Self::desc(CL_MEM_OBJECT_IMAGE1D);
        d.image_width = width;
        Self::image(ctx, flags, format, d, host)
    }

    /// 1D image backed by an existing buffer object's data store
    pub fn image1d_buffer(
        ctx: &ClContext,
        flags: cl_mem_flags,
        format: ClImageFormat,
        width: usize,
        buffer: &ClMem,
    ) -> Result<Self> {
        if width == 0 {
            return Err(CoreError::Precondition("image width must be positive".into()));
        }
        let mut d = Self::desc(CL_MEM_OBJECT_IMAGE1D_BUFFER);
        d.image_width = width;
        d.buffer = buffer.mem;
        Self::image(ctx, flags, format, d, None)
    }

    pub fn image1d_array(
        ctx: &ClContext,
        flags: cl_mem_flags,
        format: ClImageFormat,
        width: usize,
        array_size: usize,
        row_pitch: usize,
        host: Option<&[u8]>,
    ) -> Result<Self> {
        if width == 0 || array_size == 0 {
            return Err(CoreError::Precondition(
                "image width and array size must be positive".into(),
            ));
        }
        let mut d = Self::desc(CL_MEM_OBJECT_IMAGE1D_ARRAY);
        d.image_width = width;
        d.image_array_size = array_size;
        d.image_row_pitch = row_pitch;
        Self::image(ctx, flags, format, d, host)
    }

    pub fn image2d(
        ctx: &ClContext,
        flags: cl_mem_flags,
        format: ClImageFormat,
        width: usize,
        height: usize,
        row_pitch: usize,
        host: Option<&[u8]>,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::Precondition(
                "image dimensions must be positive".into(),
            ));
        }
        let mut d = Self::desc(CL_MEM_OBJECT_IMAGE2D);
        d.image_width = width;
        d.image_height = height;
        d.image_row_pitch = row_pitch;
        Self::image(ctx, flags, format, d, host)
    }

    pub fn image2d_array(
        ctx: &ClContext,
        flags: cl_mem_flags,
        format: ClImageFormat,
        width: usize,
        height: usize,
        array_size: usize,
        row_pitch: usize,
        slice_pitch: usize,
        host: Option<&[u8]>,
    ) -> Result<Self> {
        if width == 0 || height == 0 || array_size == 0 {
            return Err(CoreError::Precondition(
                "image dimensions and array size must be positive".into(),
            ));
        }
        let mut d = Self::desc(CL_MEM_OBJECT_IMAGE2D_ARRAY);
        d.image_width = width;
        d.image_height = height;
        d.image_array_size = array_size;
        d.image_row_pitch = row_pitch;
        d.image_slice_pitch = slice_pitch;
        Self::image(ctx, flags, format, d, host)
    }

    pub fn image3d(
        ctx: &ClContext,
        flags: cl_mem_flags,
        format: ClImageFormat,
        width: usize,
        height: usize,
        depth: usize,
        row_pitch: usize,
        slice_pitch: usize,
        host: Option<&[u8]>,
    ) -> Result<Self> {
        if width == 0 || height == 0 || depth == 0 {
            return Err(CoreError::Precondition(
                "image dimensions must be positive".into(),
            ));
        }
        let mut d = Self::desc(CL_MEM_OBJECT_IMAGE3D);
        d.image_width = width;
        d.image_height = height;
        d.image_depth = depth;
        d.image_row_pitch = row_pitch;
        d.image_slice_pitch = slice_pitch;
        Self::image(ctx, flags, format, d, host)
    }

    pub fn release(self) -> Result<()> {
        unsafe { check(clReleaseMemObject(self.mem), "clReleaseMemObject") }
    }
}

fn bitmap_to_floats(data: &[u8], channels: usize, arity: usize) -> Result<Vec<f32>> {
    if channels == 0 || channels > 4 {
        return Err(CoreError::Precondition(format!(
            "bitmap channel count {} out of range",
            channels
        )));
    }
    if data.len() % channels != 0 {
        return Err(CoreError::Precondition(format!(
            "bitmap length {} is not a multiple of {} channels",
            data.len(),
            channels
        )));
    }
    let pixels = data.len() / channels;
    let mut out = Vec::with_capacity(pixels * arity);
    for p in 0..pixels {
        for k in 0..arity {
            if k < channels {
                out.push(data[p * channels + k] as f32 / 255.0);
            } else {
                out.push(0.0);
            }
        }
    }
    Ok(out)
}

/// first channel of each pixel as `float`, normalized to [0,1]
pub fn bitmap_to_float(data: &[u8], channels: usize) -> Result<Vec<f32>> {
    bitmap_to_floats(data, channels, 1)
}

/// packed `float2` per pixel, missing channels zero filled
pub fn bitmap_to_float2(data: &[u8], channels: usize) -> Result<Vec<f32>> {
    bitmap_to_floats(data, channels, 2)
}

/// packed `float3` per pixel, missing channels zero filled
pub fn bitmap_to_float3(data: &[u8], channels: usize) -> Result<Vec<f32>> {
    bitmap_to_floats(data, channels, 3)
}

/// packed `float4` per pixel, missing channels zero filled
pub fn bitmap_to_float4(data: &[u8], channels: usize) -> Result<Vec<f32>> {
    bitmap_to_floats(data, channels, 4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_and_zero_fill() {
        // two RG pixels widened to float4
        let data = [255u8, 0, 51, 102];
        let v = bitmap_to_float4(&data, 2).unwrap();
        assert_eq!(v.len(), 8);
        assert_eq!(v[0], 1.0);
        assert_eq!(v[1], 0.0);
        assert_eq!(&v[2..4], &[0.0, 0.0]);
        assert!((v[4] - 0.2).abs() < 1e-6);
        assert!((v[5] - 0.4).abs() < 1e-6);
    }

    #[test]
    fn narrowing_keeps_leading_channels() {
        // one RGBA pixel narrowed to float2
        let data = [255u8, 128, 64, 32];
        let v = bitmap_to_float2(&data, 4).unwrap();
        assert_eq!(v.len(), 2);
        assert_eq!(v[0], 1.0);
        assert!((v[1] - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn geometry_preconditions() {
        assert!(bitmap_to_float(&[0u8; 10], 3).is_err());
        assert!(bitmap_to_float(&[0u8; 10], 0).is_err());
        assert!(bitmap_to_float(&[0u8; 9], 3).is_ok());
    }
}
