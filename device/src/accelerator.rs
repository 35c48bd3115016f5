//! Accelerator queries.

use std::process::Command;

use snafu::ensure;

use crate::arch::ComputeCapability;
use crate::error::{AcceleratorQuerySnafu, Result};

/// The attached device, as far as kernel compilation is concerned.
pub trait Accelerator: Send + Sync {
    /// Compute capability of the device kernels will run on.
    fn compute_capability(&self) -> Result<ComputeCapability>;

    /// Short description for logs.
    fn name(&self) -> &str;
}

/// Accelerator with a fixed, externally supplied compute capability.
///
/// Used when the target is configured explicitly (cross-compiling a cache on a
/// machine without the device) and in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedAccelerator {
    capability: ComputeCapability,
}

impl FixedAccelerator {
    pub const fn new(capability: ComputeCapability) -> Self {
        Self { capability }
    }
}

impl Accelerator for FixedAccelerator {
    fn compute_capability(&self) -> Result<ComputeCapability> {
        Ok(self.capability)
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Queries the device through `nvidia-smi --query-gpu=compute_cap`.
#[derive(Debug, Clone)]
pub struct NvidiaSmi {
    ordinal: usize,
}

impl NvidiaSmi {
    pub fn new(ordinal: usize) -> Self {
        Self { ordinal }
    }
}

impl Accelerator for NvidiaSmi {
    fn compute_capability(&self) -> Result<ComputeCapability> {
        let output = Command::new("nvidia-smi")
            .args(["--query-gpu=compute_cap", "--format=csv,noheader", "-i"])
            .arg(self.ordinal.to_string())
            .output()
            .map_err(|e| crate::Error::AcceleratorQuery { reason: format!("failed to run nvidia-smi: {e}") })?;

        ensure!(
            output.status.success(),
            AcceleratorQuerySnafu { reason: format!("nvidia-smi failed: {}", String::from_utf8_lossy(&output.stderr)) }
        );

        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout.lines().next().unwrap_or_default();
        let capability = line.parse()?;

        tracing::debug!(device.ordinal = self.ordinal, %capability, "queried compute capability via nvidia-smi");
        Ok(capability)
    }

    fn name(&self) -> &str {
        "nvidia-smi"
    }
}

/// Queries the device through the CUDA driver API.
#[cfg(feature = "cuda")]
pub struct CudaAccelerator {
    context: std::sync::Arc<cudarc::driver::CudaContext>,
}

#[cfg(feature = "cuda")]
impl CudaAccelerator {
    pub fn new(ordinal: usize) -> Result<Self> {
        use snafu::ResultExt;

        let context = cudarc::driver::CudaContext::new(ordinal).context(crate::error::CudaSnafu)?;
        Ok(Self { context })
    }
}

#[cfg(feature = "cuda")]
impl Accelerator for CudaAccelerator {
    fn compute_capability(&self) -> Result<ComputeCapability> {
        use snafu::ResultExt;

        use cudarc::driver::sys::CUdevice_attribute::{
            CU_DEVICE_ATTRIBUTE_COMPUTE_CAPABILITY_MAJOR, CU_DEVICE_ATTRIBUTE_COMPUTE_CAPABILITY_MINOR,
        };

        let major = self.context.attribute(CU_DEVICE_ATTRIBUTE_COMPUTE_CAPABILITY_MAJOR).context(crate::error::CudaSnafu)?;
        let minor = self.context.attribute(CU_DEVICE_ATTRIBUTE_COMPUTE_CAPABILITY_MINOR).context(crate::error::CudaSnafu)?;
        Ok(ComputeCapability::new(major as u32, minor as u32))
    }

    fn name(&self) -> &str {
        "cuda-driver"
    }
}

/// The accelerator query used when none is configured.
///
/// With the `cuda` feature this goes through the driver, otherwise through
/// `nvidia-smi`.
pub fn default_accelerator(ordinal: usize) -> Result<Box<dyn Accelerator>> {
    #[cfg(feature = "cuda")]
    {
        Ok(Box::new(CudaAccelerator::new(ordinal)?))
    }

    #[cfg(not(feature = "cuda"))]
    {
        Ok(Box::new(NvidiaSmi::new(ordinal)))
    }
}
