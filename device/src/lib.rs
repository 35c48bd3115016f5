//! Accelerator discovery and raw device handles.
//!
//! The JIT core needs exactly one fact about the attached accelerator, its
//! compute capability, to pick a code-generation target. It also needs
//! device pointers and execution queues in the raw form the launch ABI
//! takes. Both live here so the runtime never depends on a particular
//! driver binding.
//!
//! # Features
//!
//! - `cuda`: query the device through the CUDA driver (`cudarc`) instead of
//!   `nvidia-smi`, and convert `cudarc` streams to [`StreamHandle`]s.

pub mod accelerator;
pub mod arch;
pub mod error;
pub mod handle;


#[cfg(feature = "cuda")]
pub use accelerator::CudaAccelerator;
pub use accelerator::{Accelerator, FixedAccelerator, NvidiaSmi, default_accelerator};
pub use arch::{ComputeCapability, DEFAULT_GENCODE};
pub use error::*;
pub use handle::{DevicePtr, StreamHandle};
