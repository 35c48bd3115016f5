//! Semantic argument types for JIT-compiled kernels.
//!
//! Every kernel entry point is described by an ordered list of
//! [`ArgumentDefinition`]s. The semantic [`ArgType`] of each definition decides
//! two things:
//!
//! - the raw C type of the `launch` parameter and the device-side type the body
//!   sees (see [`abi`]),
//! - the textual tag stored in the argument descriptor next to a compiled
//!   artifact (see [`tag`]).

pub mod abi;
pub mod error;
pub mod tag;


pub use abi::{AbiType, RawAbi};
pub use error::*;

/// Scalar element types.
///
/// The set is deliberately wider than what the raw-ABI table accepts: device
/// code can name `double` or `long` buffers, the launch ABI cannot marshal them
/// yet, and that gap must surface as an error instead of being unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::Display, strum::EnumString, strum::EnumIter, strum::VariantArray)]
#[cfg_attr(feature = "proptest", derive(proptest_derive::Arbitrary))]
#[strum(serialize_all = "lowercase")]
pub enum ScalarType {
    Bool,
    Int8,
    UInt8,
    Int32,
    UInt32,
    Int64,
    Float16,
    BFloat16,
    Float32,
    Float64,
}

impl ScalarType {
    pub const fn bytes(&self) -> usize {
        match self {
            Self::Bool | Self::Int8 | Self::UInt8 => 1,
            Self::Float16 | Self::BFloat16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::Float64 => 8,
        }
    }

    pub const fn is_float(&self) -> bool {
        matches!(self, Self::Float16 | Self::BFloat16 | Self::Float32 | Self::Float64)
    }
}

/// Semantic type of one kernel argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "proptest", derive(proptest_derive::Arbitrary))]
pub enum ArgType {
    /// Plain host scalar passed by value.
    Scalar(ScalarType),
    /// Device buffer with the given element type, passed as a device pointer.
    Buffer(ScalarType),
    /// Device execution queue (`cudaStream_t`).
    Stream,
}

impl ArgType {
    pub const BOOL: Self = Self::Scalar(ScalarType::Bool);
    pub const INT: Self = Self::Scalar(ScalarType::Int32);
    pub const FLOAT: Self = Self::Scalar(ScalarType::Float32);

    /// Raw-ABI mapping for this type, `None` if the launch ABI cannot carry it.
    pub fn abi(&self) -> Option<AbiType> {
        abi::lookup(*self)
    }

    pub fn is_buffer(&self) -> bool {
        matches!(self, Self::Buffer(_))
    }
}

/// One named, typed parameter of a kernel entry point.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArgumentDefinition {
    pub name: String,
    pub ty: ArgType,
}

impl ArgumentDefinition {
    pub fn new(name: impl Into<String>, ty: ArgType) -> Self {
        Self { name: name.into(), ty }
    }

    pub fn scalar(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self::new(name, ArgType::Scalar(scalar))
    }

    pub fn buffer(name: impl Into<String>, element: ScalarType) -> Self {
        Self::new(name, ArgType::Buffer(element))
    }

    pub fn stream(name: impl Into<String>) -> Self {
        Self::new(name, ArgType::Stream)
    }
}

/// Whether `name` can be used verbatim as a C identifier.
pub fn is_c_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => chars.all(|c| c == '_' || c.is_ascii_alphanumeric()),
        _ => false,
    }
}
