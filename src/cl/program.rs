// GpuKit
// copyright zipxing@hotmail.com 2022~2025

//! Programs, kernels and ND-range dispatch.
//!
//! A program is compiled and linked against exactly one device with an
//! options string; on failure the build log is fetched and carried in the
//! error so the caller never has to re-query it. Kernel arguments are
//! heterogeneous and sized, the caller supplies the byte size; the toolkit
//! does no marshalling. The value added here is uniform, non-leaky error
//! paths, not hiding the API.

use crate::cl::context::{wait_list, ClContext, ClDevice, ClQueue};
use crate::cl::event::ClEvent;
use crate::cl::{check, NdRange};
use crate::error::{CoreError, Result};
use crate::util::read_source;
use cl_sys::{
    cl_device_id, cl_event, cl_int, cl_kernel, cl_program, cl_uint, clBuildProgram,
    clCreateKernel, clCreateProgramWithSource, clEnqueueNDRangeKernel, clGetKernelInfo,
    clGetProgramBuildInfo, clGetProgramInfo, clReleaseKernel, clReleaseProgram,
    CL_KERNEL_FUNCTION_NAME, CL_KERNEL_NUM_ARGS, CL_PROGRAM_BUILD_LOG, CL_PROGRAM_DEVICES,
    CL_PROGRAM_KERNEL_NAMES, CL_PROGRAM_NUM_KERNELS, CL_PROGRAM_SOURCE, CL_SUCCESS,
};
use std::ffi::{c_void, CString};
use std::os::raw::c_char;
use std::ptr;

/// a compiled+linked compute program; caller owned
pub struct ClProgram {
    pub(crate) program: cl_program,
}

fn trimmed(mut bytes: Vec<u8>) -> String {
    while bytes.last() == Some(&0) {
        bytes.pop();
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

impl ClProgram {
    /// program object from a literal source string
    pub fn from_source(ctx: &ClContext, src: &str) -> Result<Self> {
        if src.is_empty() {
            return Err(CoreError::Precondition("empty program source".into()));
        }
        let lengths: [usize; 1] = [src.len()];
        let strings: [*const c_char; 1] = [src.as_ptr() as *const c_char];
        let mut err: cl_int = CL_SUCCESS;
        let program = unsafe {
            clCreateProgramWithSource(ctx.context, 1, strings.as_ptr(), lengths.as_ptr(), &mut err)
        };
        check(err, "clCreateProgramWithSource")?;
        Ok(Self { program })
    }

    /// program object from a source file
    pub fn from_file(ctx: &ClContext, path: &str) -> Result<Self> {
        let src = read_source(path)?;
        Self::from_source(ctx, &src)
    }

    /// Compile and link against one device. On failure the device build log
    /// travels in the error payload.
    pub fn build(&self, device: ClDevice, options: &str) -> Result<()> {
        let opts = CString::new(options)
            .map_err(|_| CoreError::Precondition("NUL in build options".into()))?;
        let devs: [cl_device_id; 1] = [device.0];
        let code = unsafe {
            clBuildProgram(
                self.program,
                1,
                devs.as_ptr(),
                opts.as_ptr(),
                None,
                ptr::null_mut(),
            )
        };
        if code != CL_SUCCESS {
            return Err(CoreError::ClBuild {
                log: self.build_log(device).unwrap_or_else(|_| "<no build log>".into()),
            });
        }
        Ok(())
    }

    /// device build log, available after a build attempt
    pub fn build_log(&self, device: ClDevice) -> Result<String> {
        let mut sz = 0usize;
        unsafe {
            check(
                clGetProgramBuildInfo(
                    self.program,
                    device.0,
                    CL_PROGRAM_BUILD_LOG,
                    0,
                    ptr::null_mut(),
                    &mut sz,
                ),
                "clGetProgramBuildInfo",
            )?;
            let mut buf = vec![0u8; sz];
            check(
                clGetProgramBuildInfo(
                    self.program,
                    device.0,
                    CL_PROGRAM_BUILD_LOG,
                    sz,
                    buf.as_mut_ptr() as *mut c_void,
                    ptr::null_mut(),
                ),
                "clGetProgramBuildInfo",
            )?;
            Ok(trimmed(buf))
        }
    }

    /// number of kernels in the built program
    pub fn get_num_kernels(&self) -> Result<usize> {
        let mut n: usize = 0;
        unsafe {
            check(
                clGetProgramInfo(
                    self.program,
                    CL_PROGRAM_NUM_KERNELS,
                    std::mem::size_of::<usize>(),
                    &mut n as *mut usize as *mut c_void,
                    ptr::null_mut(),
                ),
                "clGetProgramInfo",
            )?;
        }
        Ok(n)
    }

    /// semicolon-separated kernel name list
    pub fn get_kernel_names(&self) -> Result<String> {
        self.info_string(CL_PROGRAM_KERNEL_NAMES)
    }

    /// original source text
    pub fn get_source(&self) -> Result<String> {
        self.info_string(CL_PROGRAM_SOURCE)
    }

    /// devices the program is attached to
    pub fn get_devices(&self) -> Result<Vec<ClDevice>> {
        let mut sz = 0usize;
        unsafe {
            check(
                clGetProgramInfo(
                    self.program,
                    CL_PROGRAM_DEVICES,
                    0,
                    ptr::null_mut(),
                    &mut sz,
                ),
                "clGetProgramInfo",
            )?;
            let n = sz / std::mem::size_of::<cl_device_id>();
            let mut ids: Vec<cl_device_id> = vec![ptr::null_mut(); n];
            check(
                clGetProgramInfo(
                    self.program,
                    CL_PROGRAM_DEVICES,
                    sz,
                    ids.as_mut_ptr() as *mut c_void,
                    ptr::null_mut(),
                ),
                "clGetProgramInfo",
            )?;
            Ok(ids.into_iter().map(ClDevice).collect())
        }
    }

    fn info_string(&self, what: u32) -> Result<String> {
        let mut sz = 0usize;
        unsafe {
            check(
                clGetProgramInfo(self.program, what, 0, ptr::null_mut(), &mut sz),
                "clGetProgramInfo",
            )?;
            let mut buf = vec![0u8; sz];
            check(
                clGetProgramInfo(
                    self.program,
                    what,
                    sz,
                    buf.as_mut_ptr() as *mut c_void,
                    ptr::null_mut(),
                ),
                "clGetProgramInfo",
            )?;
            Ok(trimmed(buf))
        }
    }

    pub fn release(self) -> Result<()> {
        unsafe { check(clReleaseProgram(self.program), "clReleaseProgram") }
    }
}

/// one entry point of a built program; caller owned
pub struct ClKernel {
    pub(crate) kernel: cl_kernel,
}

impl ClKernel {
    pub fn new(program: &ClProgram, name: &str) -> Result<Self> {
        let cname =
            CString::new(name).map_err(|_| CoreError::Precondition("NUL in kernel name".into()))?;
        let mut err: cl_int = CL_SUCCESS;
        let kernel = unsafe { clCreateKernel(program.program, cname.as_ptr(), &mut err) };
        check(err, "clCreateKernel")?;
        Ok(Self { kernel })
    }

    /// Raw argument write; the caller supplies the correct size.
    ///
    /// # Safety
    /// `value` must point to at least `size` readable bytes of the right
    /// layout for the kernel parameter at `index`.
    pub unsafe fn set_arg(&self, index: u32, size: usize, value: *const c_void) -> Result<()> {
        check(
            cl_sys::clSetKernelArg(self.kernel, index, size, value),
            "clSetKernelArg",
        )
    }

    /// memory-object argument
    pub fn set_arg_mem(&self, index: u32, mem: &super::memory::ClMem) -> Result<()> {
        let handle = mem.mem;
        unsafe {
            self.set_arg(
                index,
                std::mem::size_of_val(&handle),
                &handle as *const _ as *const c_void,
            )
        }
    }

    /// plain-old-data argument
    pub fn set_arg_scalar<T: Copy>(&self, index: u32, value: &T) -> Result<()> {
        unsafe {
            self.set_arg(
                index,
                std::mem::size_of::<T>(),
                value as *const T as *const c_void,
            )
        }
    }

    /// entry-point name
    pub fn function_name(&self) -> Result<String> {
        let mut sz = 0usize;
        unsafe {
            check(
                clGetKernelInfo(
                    self.kernel,
                    CL_KERNEL_FUNCTION_NAME,
                    0,
                    ptr::null_mut(),
                    &mut sz,
                ),
                "clGetKernelInfo",
            )?;
            let mut buf = vec![0u8; sz];
            check(
                clGetKernelInfo(
                    self.kernel,
                    CL_KERNEL_FUNCTION_NAME,
                    sz,
                    buf.as_mut_ptr() as *mut c_void,
                    ptr::null_mut(),
                ),
                "clGetKernelInfo",
            )?;
            Ok(trimmed(buf))
        }
    }

    /// declared argument count
    pub fn num_args(&self) -> Result<u32> {
        let mut n: cl_uint = 0;
        unsafe {
            check(
                clGetKernelInfo(
                    self.kernel,
                    CL_KERNEL_NUM_ARGS,
                    std::mem::size_of::<cl_uint>(),
                    &mut n as *mut cl_uint as *mut c_void,
                    ptr::null_mut(),
                ),
                "clGetKernelInfo",
            )?;
        }
        Ok(n)
    }

    pub fn release(self) -> Result<()> {
        unsafe { check(clReleaseKernel(self.kernel), "clReleaseKernel") }
    }
}

impl ClQueue {
    /// Submit `kernel` with the declared work geometry. The offset may be
    /// `Null` (origin), the local range may be `Null` (driver chooses); an
    /// explicit local range with a zero dimension is a precondition
    /// violation, as is a zero or missing global range.
    pub fn enqueue_nd_range(
        &self,
        kernel: &ClKernel,
        offset: NdRange,
        global: NdRange,
        local: NdRange,
        wait: &[ClEvent],
        want_event: bool,
    ) -> Result<Option<ClEvent>> {
        let work_dim = global.dims();
        if work_dim == 0 || global.is_empty() {
            return Err(CoreError::Precondition(
                "global range must have 1-3 nonzero dimensions".into(),
            ));
        }
        if offset != NdRange::Null && offset.dims() != work_dim {
            return Err(CoreError::Precondition(format!(
                "offset dimensionality {} does not match global {}",
                offset.dims(),
                work_dim
            )));
        }
        if local != NdRange::Null {
            if local.dims() != work_dim {
                return Err(CoreError::Precondition(format!(
                    "local dimensionality {} does not match global {}",
                    local.dims(),
                    work_dim
                )));
            }
            let l = local.as_sizes();
            if l[..work_dim as usize].iter().any(|&d| d == 0) {
                return Err(CoreError::Precondition(
                    "local range has a zero dimension; use Null to delegate".into(),
                ));
            }
        }

        let goff = offset.as_sizes();
        let gsz = global.as_sizes();
        let lsz = local.as_sizes();
        let (nw, wl) = wait_list(wait);
        let mut evt: cl_event = ptr::null_mut();
        unsafe {
            check(
                clEnqueueNDRangeKernel(
                    self.queue,
                    kernel.kernel,
                    work_dim,
                    if offset == NdRange::Null {
                        ptr::null()
                    } else {
                        goff.as_ptr()
                    },
                    gsz.as_ptr(),
                    if local == NdRange::Null {
                        ptr::null()
                    } else {
                        lsz.as_ptr()
                    },
                    nw,
                    if nw == 0 { ptr::null() } else { wl.as_ptr() },
                    if want_event { &mut evt } else { ptr::null_mut() },
                ),
                "clEnqueueNDRangeKernel",
            )?;
        }
        Ok(if want_event { Some(ClEvent(evt)) } else { None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // geometry validation is driver independent; exercise it with dangling
    // stand-ins that are never dereferenced because validation rejects first
    fn dummy_queue() -> ClQueue {
        ClQueue {
            queue: std::ptr::null_mut(),
            device: crate::cl::ClDevice(std::ptr::null_mut()),
        }
    }

    fn dummy_kernel() -> ClKernel {
        ClKernel {
            kernel: std::ptr::null_mut(),
        }
    }

    #[test]
    fn zero_local_dimension_is_rejected() {
        let q = dummy_queue();
        let k = dummy_kernel();
        let r = q.enqueue_nd_range(
            &k,
            NdRange::Null,
            NdRange::Two(64, 64),
            NdRange::Two(16, 0),
            &[],
            false,
        );
        assert!(matches!(r, Err(crate::error::CoreError::Precondition(_))));
    }

    #[test]
    fn null_global_is_rejected() {
        let q = dummy_queue();
        let k = dummy_kernel();
        let r = q.enqueue_nd_range(&k, NdRange::Null, NdRange::Null, NdRange::Null, &[], false);
        assert!(matches!(r, Err(crate::error::CoreError::Precondition(_))));
    }

    #[test]
    fn mismatched_dims_are_rejected() {
        let q = dummy_queue();
        let k = dummy_kernel();
        let r = q.enqueue_nd_range(
            &k,
            NdRange::One(0),
            NdRange::Two(8, 8),
            NdRange::Null,
            &[],
            false,
        );
        assert!(matches!(r, Err(crate::error::CoreError::Precondition(_))));
    }
}
