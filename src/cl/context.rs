// GpuKit
// copyright zipxing@hotmail.com 2022~2025

//! Platforms, devices, contexts and command queues.
//!
//! A context is constructed over a device-type filter: the first platform is
//! asked for a context of that type, and on failure the toolkit falls back to
//! the CPU type. The device list is recorded into the context at creation so
//! later queries never re-enumerate.
//!
//! A queue is pinned to one device of one context and is strictly in-order;
//! dependencies between commands are expressed through wait-list events only.

use crate::cl::event::ClEvent;
use crate::cl::{check, error_name};
use crate::error::{CoreError, Result};
use cl_sys::{
    cl_command_queue, cl_command_queue_properties, cl_context, cl_context_properties,
    cl_device_id, cl_device_type, cl_event, cl_int, cl_platform_id, cl_uint,
    clCreateCommandQueue, clCreateContextFromType, clEnqueueReadBuffer, clEnqueueReadImage,
    clEnqueueWriteBuffer, clEnqueueWriteImage, clFinish, clGetContextInfo, clGetDeviceIDs,
    clGetDeviceInfo, clGetPlatformIDs, clGetPlatformInfo, clReleaseCommandQueue,
    clReleaseContext, clReleaseDevice, CL_CONTEXT_DEVICES, CL_CONTEXT_PLATFORM,
    CL_DEVICE_NAME, CL_DEVICE_NOT_FOUND, CL_DEVICE_TYPE_CPU, CL_FALSE, CL_PLATFORM_NAME,
    CL_QUEUE_PROFILING_ENABLE, CL_SUCCESS, CL_TRUE,
};
use log::{info, warn};
use std::ffi::c_void;
use std::ptr;

use super::memory::ClMem;

/// an OpenCL platform handle; not reference counted, nothing to release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClPlatform(pub(crate) cl_platform_id);

/// an OpenCL device handle; release decrements the driver count once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClDevice(pub(crate) cl_device_id);

/// trim the trailing NUL of an info string
fn info_string(mut bytes: Vec<u8>) -> String {
    while bytes.last() == Some(&0) {
        bytes.pop();
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// enumerate the available platforms
pub fn list_platforms() -> Result<Vec<ClPlatform>> {
    let mut n: cl_uint = 0;
    unsafe {
        check(clGetPlatformIDs(0, ptr::null_mut(), &mut n), "clGetPlatformIDs")?;
        if n == 0 {
            return Ok(vec![]);
        }
        let mut ids: Vec<cl_platform_id> = vec![ptr::null_mut(); n as usize];
        check(
            clGetPlatformIDs(n, ids.as_mut_ptr(), ptr::null_mut()),
            "clGetPlatformIDs",
        )?;
        Ok(ids.into_iter().map(ClPlatform).collect())
    }
}

/// devices of `platform` matching the type filter; empty when none match
pub fn list_devices(platform: ClPlatform, device_type: cl_device_type) -> Result<Vec<ClDevice>> {
    let mut n: cl_uint = 0;
    unsafe {
        let code = clGetDeviceIDs(platform.0, device_type, 0, ptr::null_mut(), &mut n);
        if code == CL_DEVICE_NOT_FOUND {
            return Ok(vec![]);
        }
        check(code, "clGetDeviceIDs")?;
        let mut ids: Vec<cl_device_id> = vec![ptr::null_mut(); n as usize];
        check(
            clGetDeviceIDs(platform.0, device_type, n, ids.as_mut_ptr(), ptr::null_mut()),
            "clGetDeviceIDs",
        )?;
        Ok(ids.into_iter().map(ClDevice).collect())
    }
}

impl ClPlatform {
    pub fn name(&self) -> Result<String> {
        let mut sz = 0usize;
        unsafe {
            check(
                clGetPlatformInfo(self.0, CL_PLATFORM_NAME, 0, ptr::null_mut(), &mut sz),
                "clGetPlatformInfo",
            )?;
            let mut buf = vec![0u8; sz];
            check(
                clGetPlatformInfo(
                    self.0,
                    CL_PLATFORM_NAME,
                    sz,
                    buf.as_mut_ptr() as *mut c_void,
                    ptr::null_mut(),
                ),
                "clGetPlatformInfo",
            )?;
            Ok(info_string(buf))
        }
    }
}

impl ClDevice {
    pub fn name(&self) -> Result<String> {
        let mut sz = 0usize;
        unsafe {
            check(
                clGetDeviceInfo(self.0, CL_DEVICE_NAME, 0, ptr::null_mut(), &mut sz),
                "clGetDeviceInfo",
            )?;
            let mut buf = vec![0u8; sz];
            check(
                clGetDeviceInfo(
                    self.0,
                    CL_DEVICE_NAME,
                    sz,
                    buf.as_mut_ptr() as *mut c_void,
                    ptr::null_mut(),
                ),
                "clGetDeviceInfo",
            )?;
            Ok(info_string(buf))
        }
    }

    pub fn release(self) -> Result<()> {
        unsafe { check(clReleaseDevice(self.0), "clReleaseDevice") }
    }
}

/// context over a device-type filter; caller owned
pub struct ClContext {
    pub(crate) context: cl_context,
    devices: Vec<ClDevice>,
}

impl ClContext {
    /// Build a context of `device_type` on the first platform, falling back
    /// to the CPU type when the request cannot be satisfied.
    pub fn from_type(device_type: cl_device_type) -> Result<Self> {
        let platforms = list_platforms()?;
        let platform = platforms.first().ok_or(CoreError::Cl {
            code: CL_DEVICE_NOT_FOUND,
            name: error_name(CL_DEVICE_NOT_FOUND),
        })?;
        let props: [cl_context_properties; 3] = [
            CL_CONTEXT_PLATFORM as cl_context_properties,
            platform.0 as cl_context_properties,
            0,
        ];
        let mut err: cl_int = CL_SUCCESS;
        let mut context = unsafe {
            clCreateContextFromType(
                props.as_ptr(),
                device_type,
                None,
                ptr::null_mut(),
                &mut err,
            )
        };
        if err != CL_SUCCESS {
            warn!(
                "context of type {:#x} failed ({}), falling back to CPU",
                device_type,
                error_name(err)
            );
            err = CL_SUCCESS;
            context = unsafe {
                clCreateContextFromType(
                    props.as_ptr(),
                    CL_DEVICE_TYPE_CPU,
                    None,
                    ptr::null_mut(),
                    &mut err,
                )
            };
            check(err, "clCreateContextFromType")?;
        }

        // record the device list for later queries
        let mut sz = 0usize;
        let devices = unsafe {
            check(
                clGetContextInfo(context, CL_CONTEXT_DEVICES, 0, ptr::null_mut(), &mut sz),
                "clGetContextInfo",
            )?;
            let n = sz / std::mem::size_of::<cl_device_id>();
            let mut ids: Vec<cl_device_id> = vec![ptr::null_mut(); n];
            check(
                clGetContextInfo(
                    context,
                    CL_CONTEXT_DEVICES,
                    sz,
                    ids.as_mut_ptr() as *mut c_void,
                    ptr::null_mut(),
                ),
                "clGetContextInfo",
            )?;
            ids.into_iter().map(ClDevice).collect::<Vec<_>>()
        };
        info!("cl context created with {} device(s)", devices.len());
        Ok(Self { context, devices })
    }

    /// devices recorded at creation
    pub fn get_devices(&self) -> &[ClDevice] {
        &self.devices
    }

    pub fn release(self) -> Result<()> {
        unsafe { check(clReleaseContext(self.context), "clReleaseContext") }
    }
}

/// wait-list marshalling shared by every enqueue
pub(crate) fn wait_list(wait: &[ClEvent]) -> (cl_uint, Vec<cl_event>) {
    let list: Vec<cl_event> = wait.iter().map(|e| e.0).collect();
    (list.len() as cl_uint, list)
}

/// in-order command queue pinned to one device; caller owned
pub struct ClQueue {
    pub(crate) queue: cl_command_queue,
    pub device: ClDevice,
}

impl ClQueue {
    pub fn new(ctx: &ClContext, device: ClDevice, profiling: bool) -> Result<Self> {
        let props: cl_command_queue_properties = if profiling {
            CL_QUEUE_PROFILING_ENABLE
        } else {
            0
        };
        let mut err: cl_int = CL_SUCCESS;
        let queue = unsafe { clCreateCommandQueue(ctx.context, device.0, props, &mut err) };
        check(err, "clCreateCommandQueue")?;
        Ok(Self { queue, device })
    }

    /// host-blocking barrier over everything submitted so far
    pub fn finish(&self) -> Result<()> {
        unsafe { check(clFinish(self.queue), "clFinish") }
    }

    /// Write host bytes into a buffer object. `blocking` makes the call a
    /// host-blocking point; otherwise order against later commands with the
    /// returned event.
    pub fn enqueue_write_buffer(
        &self,
        mem: &ClMem,
        blocking: bool,
        offset: usize,
        data: &[u8],
        wait: &[ClEvent],
        want_event: bool,
    ) -> Result<Option<ClEvent>> {
        let (nw, wl) = wait_list(wait);
        let mut evt: cl_event = ptr::null_mut();
        unsafe {
            check(
                clEnqueueWriteBuffer(
                    self.queue,
                    mem.mem,
                    if blocking { CL_TRUE } else { CL_FALSE },
                    offset,
                    data.len(),
                    data.as_ptr() as *const c_void,
                    nw,
                    if nw == 0 { ptr::null() } else { wl.as_ptr() },
                    if want_event { &mut evt } else { ptr::null_mut() },
                ),
                "clEnqueueWriteBuffer",
            )?;
        }
        Ok(if want_event { Some(ClEvent(evt)) } else { None })
    }

    /// Read a buffer object into host bytes.
    pub fn enqueue_read_buffer(
        &self,
        mem: &ClMem,
        blocking: bool,
        offset: usize,
        data: &mut [u8],
        wait: &[ClEvent],
        want_event: bool,
    ) -> Result<Option<ClEvent>> {
        let (nw, wl) = wait_list(wait);
        let mut evt: cl_event = ptr::null_mut();
        unsafe {
            check(
                clEnqueueReadBuffer(
                    self.queue,
                    mem.mem,
                    if blocking { CL_TRUE } else { CL_FALSE },
                    offset,
                    data.len(),
                    data.as_mut_ptr() as *mut c_void,
                    nw,
                    if nw == 0 { ptr::null() } else { wl.as_ptr() },
                    if want_event { &mut evt } else { ptr::null_mut() },
                ),
                "clEnqueueReadBuffer",
            )?;
        }
        Ok(if want_event { Some(ClEvent(evt)) } else { None })
    }

    /// float flavor of [`ClQueue::enqueue_write_buffer`]
    pub fn enqueue_write_buffer_f32(
        &self,
        mem: &ClMem,
        blocking: bool,
        offset: usize,
        data: &[f32],
        wait: &[ClEvent],
        want_event: bool,
    ) -> Result<Option<ClEvent>> {
        let (nw, wl) = wait_list(wait);
        let mut evt: cl_event = ptr::null_mut();
        unsafe {
            check(
                clEnqueueWriteBuffer(
                    self.queue,
                    mem.mem,
                    if blocking { CL_TRUE } else { CL_FALSE },
                    offset,
                    data.len() * std::mem::size_of::<f32>(),
                    data.as_ptr() as *const c_void,
                    nw,
                    if nw == 0 { ptr::null() } else { wl.as_ptr() },
                    if want_event { &mut evt } else { ptr::null_mut() },
                ),
                "clEnqueueWriteBuffer",
            )?;
        }
        Ok(if want_event { Some(ClEvent(evt)) } else { None })
    }

    /// float flavor of [`ClQueue::enqueue_read_buffer`]
    pub fn enqueue_read_buffer_f32(
        &self,
        mem: &ClMem,
        blocking: bool,
        offset: usize,
        data: &mut [f32],
        wait: &[ClEvent],
        want_event: bool,
    ) -> Result<Option<ClEvent>> {
        let (nw, wl) = wait_list(wait);
        let mut evt: cl_event = ptr::null_mut();
        unsafe {
            check(
                clEnqueueReadBuffer(
                    self.queue,
                    mem.mem,
                    if blocking { CL_TRUE } else { CL_FALSE },
                    offset,
                    data.len() * std::mem::size_of::<f32>(),
                    data.as_mut_ptr() as *mut c_void,
                    nw,
                    if nw == 0 { ptr::null() } else { wl.as_ptr() },
                    if want_event { &mut evt } else { ptr::null_mut() },
                ),
                "clEnqueueReadBuffer",
            )?;
        }
        Ok(if want_event { Some(ClEvent(evt)) } else { None })
    }

    /// Write host bytes into an image object. `origin`/`region` follow the
    /// image geometry; pitches of 0 mean tightly packed.
    pub fn enqueue_write_image(
        &self,
        mem: &ClMem,
        blocking: bool,
        origin: [usize; 3],
        region: [usize; 3],
        row_pitch: usize,
        slice_pitch: usize,
        data: &[u8],
        wait: &[ClEvent],
        want_event: bool,
    ) -> Result<Option<ClEvent>> {
        let (nw, wl) = wait_list(wait);
        let mut evt: cl_event = ptr::null_mut();
        unsafe {
            check(
                clEnqueueWriteImage(
                    self.queue,
                    mem.mem,
                    if blocking { CL_TRUE } else { CL_FALSE },
                    origin.as_ptr(),
                    region.as_ptr(),
                    row_pitch,
                    slice_pitch,
                    data.as_ptr() as *const c_void,
                    nw,
                    if nw == 0 { ptr::null() } else { wl.as_ptr() },
                    if want_event { &mut evt } else { ptr::null_mut() },
                ),
                "clEnqueueWriteImage",
            )?;
        }
        Ok(if want_event { Some(ClEvent(evt)) } else { None })
    }

    /// Read an image object into host bytes.
    pub fn enqueue_read_image(
        &self,
        mem: &ClMem,
        blocking: bool,
        origin: [usize; 3],
        region: [usize; 3],
        row_pitch: usize,
        slice_pitch: usize,
        data: &mut [u8],
        wait: &[ClEvent],
        want_event: bool,
    ) -> Result<Option<ClEvent>> {
        let (nw, wl) = wait_list(wait);
        let mut evt: cl_event = ptr::null_mut();
        unsafe {
            check(
                clEnqueueReadImage(
                    self.queue,
                    mem.mem,
                    if blocking { CL_TRUE } else { CL_FALSE },
                    origin.as_ptr(),
                    region.as_ptr(),
                    row_pitch,
                    slice_pitch,
                    data.as_mut_ptr() as *mut c_void,
                    nw,
                    if nw == 0 { ptr::null() } else { wl.as_ptr() },
                    if want_event { &mut evt } else { ptr::null_mut() },
                ),
                "clEnqueueReadImage",
            )?;
        }
        Ok(if want_event { Some(ClEvent(evt)) } else { None })
    }

    pub fn release(self) -> Result<()> {
        unsafe { check(clReleaseCommandQueue(self.queue), "clReleaseCommandQueue") }
    }
}
