//! Error types for code generation.

use copyan_dtype::ArgType;
use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur during code generation.
///
/// All of them are contract violations by the caller and are raised before any
/// compiler process is started.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// The argument type has no entry in the raw-ABI mapping table.
    #[snafu(display("argument '{name}' has unsupported type {ty}"))]
    UnsupportedArgumentType { name: String, ty: ArgType },

    /// The argument name cannot be used as a C identifier.
    #[snafu(display("argument name {name:?} is not a valid C identifier"))]
    InvalidArgumentName { name: String },

    /// Two arguments share a name.
    #[snafu(display("argument '{name}' is defined more than once"))]
    DuplicateArgumentName { name: String },
}
