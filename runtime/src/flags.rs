//! Compiler flags for a kernel build.

use copyan_device::{ComputeCapability, DEFAULT_GENCODE};

/// Flags passed to every build, ahead of the target selection.
pub const BASE_FLAGS: [&str; 4] = ["-std=c++20", "-O3", "--expt-relaxed-constexpr", "--expt-extended-lambda"];

#[cfg(windows)]
const LINK_FLAGS: &[&str] = &["-shared", "-Xcompiler=/MD"];
#[cfg(not(windows))]
const LINK_FLAGS: &[&str] = &["-shared", "-Xcompiler", "-fPIC"];

/// Full flag list for a device of the given capability.
///
/// Unknown capabilities fall back to [`DEFAULT_GENCODE`].
pub fn compile_flags(capability: ComputeCapability) -> Vec<String> {
    let gencode = capability.gencode().unwrap_or_else(|| {
        tracing::warn!(%capability, fallback = DEFAULT_GENCODE, "unknown compute capability, using default target");
        DEFAULT_GENCODE
    });

    BASE_FLAGS.iter().chain(std::iter::once(&gencode)).chain(LINK_FLAGS).map(|flag| flag.to_string()).collect()
}
