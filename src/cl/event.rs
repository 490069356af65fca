// GpuKit
// copyright zipxing@hotmail.com 2022~2025

//! Events: completion tokens, host waits, callbacks and profiling.
//!
//! A user event is completed by the host; queue-submitted commands gated on
//! it through a wait list will not start until `set_complete`. The host wait
//! is a blocking barrier; callers that need overlap must submit with wait
//! lists instead.
//!
//! Profiling getters need the owning queue created with the profiling flag;
//! timestamps are the device timer in nanoseconds.

use crate::cl::check;
use crate::cl::context::ClContext;
use crate::error::Result;
use cl_sys::{
    cl_event, cl_int, cl_ulong, clCreateUserEvent, clGetEventProfilingInfo, clReleaseEvent,
    clSetEventCallback, clSetUserEventStatus, clWaitForEvents, CL_COMPLETE,
    CL_PROFILING_COMMAND_END, CL_PROFILING_COMMAND_QUEUED, CL_PROFILING_COMMAND_START,
    CL_PROFILING_COMMAND_SUBMIT, CL_SUCCESS,
};
use std::ffi::c_void;
use std::ptr;

/// completion-state callback: (event, execution status, user data)
pub type EventCallback = extern "C" fn(cl_event, cl_int, *mut c_void);

/// opaque completion token; caller owned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClEvent(pub(crate) cl_event);

impl ClEvent {
    /// event whose completion the host controls
    pub fn user(ctx: &ClContext) -> Result<Self> {
        let mut err: cl_int = CL_SUCCESS;
        let e = unsafe { clCreateUserEvent(ctx.context, &mut err) };
        check(err, "clCreateUserEvent")?;
        Ok(Self(e))
    }

    /// signal a user event complete, releasing everything gated on it
    pub fn set_complete(&self) -> Result<()> {
        unsafe {
            check(
                clSetUserEventStatus(self.0, CL_COMPLETE as cl_int),
                "clSetUserEventStatus",
            )
        }
    }

    /// host-blocking barrier until every listed event completes
    pub fn wait(events: &[ClEvent]) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }
        let list: Vec<cl_event> = events.iter().map(|e| e.0).collect();
        unsafe {
            check(
                clWaitForEvents(list.len() as u32, list.as_ptr()),
                "clWaitForEvents",
            )
        }
    }

    /// invoke `callback` when the event reaches `state` (e.g. CL_COMPLETE)
    pub fn set_callback(
        &self,
        state: cl_int,
        callback: EventCallback,
        user_data: *mut c_void,
    ) -> Result<()> {
        unsafe {
            check(
                clSetEventCallback(self.0, state, Some(callback), user_data),
                "clSetEventCallback",
            )
        }
    }

    fn profiling(&self, what: u32, name: &'static str) -> Result<u64> {
        let mut v: cl_ulong = 0;
        unsafe {
            check(
                clGetEventProfilingInfo(
                    self.0,
                    what,
                    std::mem::size_of::<cl_ulong>(),
                    &mut v as *mut cl_ulong as *mut c_void,
                    ptr::null_mut(),
                ),
                name,
            )?;
        }
        Ok(v)
    }

    /// device timestamp when the command was queued on the host
    pub fn get_command_queued(&self) -> Result<u64> {
        self.profiling(CL_PROFILING_COMMAND_QUEUED, "clGetEventProfilingInfo")
    }

    /// device timestamp when the command was submitted to the device
    pub fn get_command_submit(&self) -> Result<u64> {
        self.profiling(CL_PROFILING_COMMAND_SUBMIT, "clGetEventProfilingInfo")
    }

    /// device timestamp, in nanoseconds, when execution started
    pub fn get_command_start(&self) -> Result<u64> {
        self.profiling(CL_PROFILING_COMMAND_START, "clGetEventProfilingInfo")
    }

    /// device timestamp, in nanoseconds, when execution finished
    pub fn get_command_end(&self) -> Result<u64> {
        self.profiling(CL_PROFILING_COMMAND_END, "clGetEventProfilingInfo")
    }

    pub fn release(self) -> Result<()> {
        unsafe { check(clReleaseEvent(self.0), "clReleaseEvent") }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waiting_on_nothing_is_a_no_op() {
        assert!(ClEvent::wait(&[]).is_ok());
    }
}
