// GpuKit
// copyright zipxing@hotmail.com 2022~2025

//! OpenCL object lifecycle layer built on the raw cl-sys binding.
//!
//! context: platforms, devices, contexts, command queues, data motion.
//! program: program build with log capture, kernels, ND-range dispatch.
//! memory: buffers, the six image descriptor kinds, float packing helpers.
//! event: user events, host waits, callbacks, profiling timestamps.
//!
//! The underlying API reference-counts every handle; the toolkit treats each
//! as single-owner: one `create_*` equals one logical ownership, `release`
//! decrements exactly once, and `retain` is never called.

use crate::error::{CoreError, Result};
use cl_sys::cl_int;

pub mod context;
pub mod event;
pub mod memory;
pub mod program;

pub use context::{list_devices, list_platforms, ClContext, ClDevice, ClPlatform, ClQueue};
pub use event::ClEvent;
pub use memory::{ClImageFormat, ClMem};
pub use program::{ClKernel, ClProgram};

/// map a status code onto the error type; `what` names the failing call
pub(crate) fn check(code: cl_int, what: &str) -> Result<()> {
    if code == cl_sys::CL_SUCCESS {
        Ok(())
    } else {
        log::warn!("{} failed: {} ({})", what, code, error_name(code));
        Err(CoreError::Cl {
            code,
            name: error_name(code),
        })
    }
}

/// symbolic name of an OpenCL status code
pub fn error_name(code: cl_int) -> &'static str {
    match code {
        0 => "CL_SUCCESS",
        -1 => "CL_DEVICE_NOT_FOUND",
        -2 => "CL_DEVICE_NOT_AVAILABLE",
        -3 => "CL_COMPILER_NOT_AVAILABLE",
        -4 => "CL_MEM_OBJECT_ALLOCATION_FAILURE",
        -5 => "CL_OUT_OF_RESOURCES",
        -6 => "CL_OUT_OF_HOST_MEMORY",
        -7 => "CL_PROFILING_INFO_NOT_AVAILABLE",
        -8 => "CL_MEM_COPY_OVERLAP",
        -9 => "CL_IMAGE_FORMAT_MISMATCH",
        -10 => "CL_IMAGE_FORMAT_NOT_SUPPORTED",
        -11 => "CL_BUILD_PROGRAM_FAILURE",
        -12 => "CL_MAP_FAILURE",
        -13 => "CL_MISALIGNED_SUB_BUFFER_OFFSET",
        -14 => "CL_EXEC_STATUS_ERROR_FOR_EVENTS_IN_WAIT_LIST",
        -15 => "CL_COMPILE_PROGRAM_FAILURE",
        -16 => "CL_LINKER_NOT_AVAILABLE",
        -17 => "CL_LINK_PROGRAM_FAILURE",
        -18 => "CL_DEVICE_PARTITION_FAILED",
        -19 => "CL_KERNEL_ARG_INFO_NOT_AVAILABLE",
        -30 => "CL_INVALID_VALUE",
        -31 => "CL_INVALID_DEVICE_TYPE",
        -32 => "CL_INVALID_PLATFORM",
        -33 => "CL_INVALID_DEVICE",
        -34 => "CL_INVALID_CONTEXT",
        -35 => "CL_INVALID_QUEUE_PROPERTIES",
        -36 => "CL_INVALID_COMMAND_QUEUE",
        -37 => "CL_INVALID_HOST_PTR",
        -38 => "CL_INVALID_MEM_OBJECT",
        -39 => "CL_INVALID_IMAGE_FORMAT_DESCRIPTOR",
        -40 => "CL_INVALID_IMAGE_SIZE",
        -41 => "CL_INVALID_SAMPLER",
        -42 => "CL_INVALID_BINARY",
        -43 => "CL_INVALID_BUILD_OPTIONS",
        -44 => "CL_INVALID_PROGRAM",
        -45 => "CL_INVALID_PROGRAM_EXECUTABLE",
        -46 => "CL_INVALID_KERNEL_NAME",
        -47 => "CL_INVALID_KERNEL_DEFINITION",
        -48 => "CL_INVALID_KERNEL",
        -49 => "CL_INVALID_ARG_INDEX",
        -50 => "CL_INVALID_ARG_VALUE",
        -51 => "CL_INVALID_ARG_SIZE",
        -52 => "CL_INVALID_KERNEL_ARGS",
        -53 => "CL_INVALID_WORK_DIMENSION",
        -54 => "CL_INVALID_WORK_GROUP_SIZE",
        -55 => "CL_INVALID_WORK_ITEM_SIZE",
        -56 => "CL_INVALID_GLOBAL_OFFSET",
        -57 => "CL_INVALID_EVENT_WAIT_LIST",
        -58 => "CL_INVALID_EVENT",
        -59 => "CL_INVALID_OPERATION",
        -60 => "CL_INVALID_GL_OBJECT",
        -61 => "CL_INVALID_BUFFER_SIZE",
        -62 => "CL_INVALID_MIP_LEVEL",
        -63 => "CL_INVALID_GLOBAL_WORK_SIZE",
        -64 => "CL_INVALID_PROPERTY",
        -65 => "CL_INVALID_IMAGE_DESCRIPTOR",
        -66 => "CL_INVALID_COMPILER_OPTIONS",
        -67 => "CL_INVALID_LINKER_OPTIONS",
        -68 => "CL_INVALID_DEVICE_PARTITION_COUNT",
        _ => "CL_UNKNOWN",
    }
}

/// 1/2/3-dimensional work geometry. `Null` means "driver chooses": a null
/// offset starts at the origin, a null local size lets the driver pick the
/// work-group shape.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum NdRange {
    Null,
    One(usize),
    Two(usize, usize),
    Three(usize, usize, usize),
}

impl NdRange {
    /// number of dimensions, 0 for `Null`
    pub fn dims(&self) -> u32 {
        match self {
            NdRange::Null => 0,
            NdRange::One(..) => 1,
            NdRange::Two(..) => 2,
            NdRange::Three(..) => 3,
        }
    }

    /// sizes padded to three entries for the FFI call
    pub fn as_sizes(&self) -> [usize; 3] {
        match *self {
            NdRange::Null => [0, 0, 0],
            NdRange::One(a) => [a, 1, 1],
            NdRange::Two(a, b) => [a, b, 1],
            NdRange::Three(a, b, c) => [a, b, c],
        }
    }

    /// total work-item count, 0 for `Null`
    pub fn len(&self) -> usize {
        match *self {
            NdRange::Null => 0,
            NdRange::One(a) => a,
            NdRange::Two(a, b) => a * b,
            NdRange::Three(a, b, c) => a * b * c,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Round every dimension up to the next multiple of the matching local
    /// work-group dimension, so a partial group at the edge still dispatches.
    pub fn round_up(&self, local: &NdRange) -> NdRange {
        fn up(g: usize, l: usize) -> usize {
            if l == 0 {
                g
            } else {
                g.div_ceil(l) * l
            }
        }
        let l = local.as_sizes();
        match *self {
            NdRange::Null => NdRange::Null,
            NdRange::One(a) => NdRange::One(up(a, l[0])),
            NdRange::Two(a, b) => NdRange::Two(up(a, l[0]), up(b, l[1])),
            NdRange::Three(a, b, c) => {
                NdRange::Three(up(a, l[0]), up(b, l[1]), up(c, l[2]))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_names_resolve() {
        assert_eq!(error_name(0), "CL_SUCCESS");
        assert_eq!(error_name(-11), "CL_BUILD_PROGRAM_FAILURE");
        assert_eq!(error_name(-54), "CL_INVALID_WORK_GROUP_SIZE");
        assert_eq!(error_name(-999), "CL_UNKNOWN");
    }

    #[test]
    fn range_geometry() {
        assert_eq!(NdRange::Null.dims(), 0);
        assert_eq!(NdRange::Two(8, 4).dims(), 2);
        assert_eq!(NdRange::Two(8, 4).len(), 32);
        assert_eq!(NdRange::Three(2, 3, 4).as_sizes(), [2, 3, 4]);
        assert_eq!(NdRange::One(5).as_sizes(), [5, 1, 1]);
        assert!(NdRange::Null.is_empty());
    }

    #[test]
    fn round_up_to_group_multiples() {
        let g = NdRange::Two(100, 60);
        let l = NdRange::Two(16, 16);
        assert_eq!(g.round_up(&l), NdRange::Two(112, 64));
        // already aligned stays put
        assert_eq!(NdRange::One(64).round_up(&NdRange::One(16)), NdRange::One(64));
        // null local leaves the global untouched
        assert_eq!(g.round_up(&NdRange::Null), g);
    }
}
