//! Raw-ABI mapping table.
//!
//! The exported `launch` function only ever receives four kinds of raw
//! parameters. Device buffers and queues travel as `void*` and are cast back to
//! their semantic type inside the generated entry point.

use crate::{ArgType, ScalarType};

/// Raw C parameter type of the `launch` entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawAbi {
    Bool,
    Int,
    Float,
    Pointer,
}

impl RawAbi {
    pub const fn c_name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Pointer => "void*",
        }
    }
}

/// Raw parameter type paired with the semantic C type the kernel body expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AbiType {
    pub raw: RawAbi,
    pub semantic: &'static str,
}

impl AbiType {
    const fn new(raw: RawAbi, semantic: &'static str) -> Self {
        Self { raw, semantic }
    }

    /// True when the body needs a `reinterpret_cast` from the raw parameter.
    pub fn needs_cast(&self) -> bool {
        self.raw.c_name() != self.semantic
    }
}

pub(crate) fn lookup(ty: ArgType) -> Option<AbiType> {
    use ScalarType::*;

    let abi = match ty {
        ArgType::Scalar(Bool) => AbiType::new(RawAbi::Bool, "bool"),
        ArgType::Scalar(Int32) => AbiType::new(RawAbi::Int, "int"),
        ArgType::Scalar(Float32) => AbiType::new(RawAbi::Float, "float"),
        ArgType::Buffer(Int32) => AbiType::new(RawAbi::Pointer, "int*"),
        ArgType::Buffer(Float32) => AbiType::new(RawAbi::Pointer, "float*"),
        ArgType::Buffer(Float16) => AbiType::new(RawAbi::Pointer, "half*"),
        ArgType::Buffer(BFloat16) => AbiType::new(RawAbi::Pointer, "__nv_bfloat16*"),
        ArgType::Stream => AbiType::new(RawAbi::Pointer, "cudaStream_t"),
        _ => return None,
    };
    Some(abi)
}
