use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// The accelerator could not be queried.
    #[snafu(display("accelerator query failed: {reason}"))]
    AcceleratorQuery { reason: String },

    /// Compute capability string is not `major.minor`.
    #[snafu(display("invalid compute capability: {value:?}"))]
    InvalidComputeCapability { value: String },

    #[cfg(feature = "cuda")]
    /// CUDA-specific errors.
    #[snafu(display("CUDA error: {source}"))]
    CudaError { source: cudarc::driver::DriverError },
}
