//! Error types for building, caching and invoking kernels.

use std::path::PathBuf;

use snafu::Snafu;

/// Result type for runtime operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur while building or invoking a kernel.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Launch wrapper could not be generated.
    #[snafu(display("Codegen error: {source}"))]
    Codegen { source: copyan_codegen::Error },

    /// The attached accelerator could not be queried.
    #[snafu(display("Accelerator error: {source}"))]
    Accelerator { source: copyan_device::Error },

    /// No compiler executable in any searched location.
    #[snafu(display("nvcc not found (searched: {searched})"))]
    ToolchainNotFound { searched: String },

    /// The compiler process could not be started.
    #[snafu(display("Failed to run `{command}`: {source}"))]
    CompilerSpawn { command: String, source: std::io::Error },

    /// The compiler exited unsuccessfully.
    #[snafu(display("Compilation failed ({status}): `{command}`\n{diagnostics}"))]
    CompilationFailed { command: String, status: String, diagnostics: String },

    /// The compiler ran past the configured deadline and was killed.
    #[snafu(display("Compilation timed out after {seconds:.1}s: `{command}`"))]
    CompilationTimedOut { command: String, seconds: f64 },

    /// The shared library could not be opened.
    #[snafu(display("Failed to load '{}': {source}", path.display()))]
    LibraryLoad { path: PathBuf, source: libloading::Error },

    /// The shared library has no launch entry point.
    #[snafu(display("Entry point '{name}' not found in '{}': {source}", path.display()))]
    EntryPointNotFound { name: String, path: PathBuf, source: libloading::Error },

    /// The argument sidecar is missing or unparsable.
    #[snafu(display("Malformed argument descriptor '{}': {reason}", path.display()))]
    MalformedArgumentDescriptor { path: PathBuf, reason: String },

    /// Invocation arguments do not fit the recorded argument list.
    #[snafu(display("Argument mismatch: {reason}"))]
    ArgumentMismatch { reason: String },

    /// Filesystem error inside the cache.
    #[snafu(display("I/O error at '{}': {source}", path.display()))]
    Io { path: PathBuf, source: std::io::Error },
}
