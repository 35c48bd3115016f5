//! Raw device handles as they cross the launch ABI.

use std::ffi::c_void;

/// Address of a device allocation (`CUdeviceptr`).
///
/// This is only an address; it neither owns nor borrows the allocation. Keeping
/// the memory alive until the launched work completes is the caller's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DevicePtr(u64);

impl DevicePtr {
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    pub const fn null() -> Self {
        Self(0)
    }

    pub const fn addr(&self) -> u64 {
        self.0
    }

    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// The address as the `void*` the launch entry point receives.
    pub fn as_raw(&self) -> *mut c_void {
        self.0 as usize as *mut c_void
    }
}

impl<T> From<*mut T> for DevicePtr {
    fn from(ptr: *mut T) -> Self {
        Self(ptr as usize as u64)
    }
}

/// Raw execution queue handle (`cudaStream_t`).
///
/// The null handle is the legacy default stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamHandle(*mut c_void);

// SAFETY: A stream handle is an opaque driver token. It is never dereferenced
// on the host, and CUDA streams may be used from any host thread.
unsafe impl Send for StreamHandle {}
unsafe impl Sync for StreamHandle {}

impl StreamHandle {
    /// # Safety
    ///
    /// `raw` must be null or a stream that stays valid for as long as kernels
    /// are launched on it.
    pub const unsafe fn from_raw(raw: *mut c_void) -> Self {
        Self(raw)
    }

    pub const fn default_stream() -> Self {
        Self(std::ptr::null_mut())
    }

    pub fn as_raw(&self) -> *mut c_void {
        self.0
    }

    pub fn is_default(&self) -> bool {
        self.0.is_null()
    }
}

impl Default for StreamHandle {
    fn default() -> Self {
        Self::default_stream()
    }
}

#[cfg(feature = "cuda")]
impl From<&cudarc::driver::CudaStream> for StreamHandle {
    fn from(stream: &cudarc::driver::CudaStream) -> Self {
        Self(stream.cu_stream() as *mut c_void)
    }
}
