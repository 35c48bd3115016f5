//! Error types for kernel requests.

use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Launch wrapper could not be generated.
    #[snafu(display("Codegen error: {source}"))]
    Codegen { source: copyan_codegen::Error },

    /// Build, cache or argument error.
    #[snafu(display("Runtime error: {source}"))]
    Runtime { source: copyan_runtime::Error },
}
