//! Call-site values and their native representation.

use std::ffi::{c_float, c_int, c_void};

use copyan_device::{DevicePtr, StreamHandle};
use copyan_dtype::{ArgType, ArgumentDefinition, RawAbi, ScalarType};
use libffi::middle::{Arg, Type};
use snafu::ensure;

use crate::error::{ArgumentMismatchSnafu, Result};

/// One live argument of a kernel launch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KernelArg {
    /// Device allocation, passed as its address.
    Buffer(DevicePtr),
    Bool(bool),
    Int(i32),
    Float(f32),
    /// Execution queue, passed as the raw `cudaStream_t`.
    Stream(StreamHandle),
}

impl KernelArg {
    /// Short category name for error messages.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Buffer(_) => "buffer",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int32",
            Self::Float(_) => "float32",
            Self::Stream(_) => "stream",
        }
    }

    /// Whether this value can be passed where `ty` is declared.
    ///
    /// Buffers match any element type; the element type only matters to the
    /// device code.
    pub fn fits(&self, ty: ArgType) -> bool {
        match (self, ty) {
            (Self::Buffer(_), ArgType::Buffer(_)) => true,
            (Self::Bool(_), ArgType::Scalar(ScalarType::Bool)) => true,
            (Self::Int(_), ArgType::Scalar(ScalarType::Int32)) => true,
            (Self::Float(_), ArgType::Scalar(ScalarType::Float32)) => true,
            (Self::Stream(_), ArgType::Stream) => true,
            _ => false,
        }
    }

    pub(crate) fn marshal(&self) -> RawValue {
        match *self {
            Self::Buffer(ptr) => RawValue::Pointer(ptr.as_raw()),
            Self::Bool(value) => RawValue::Bool(u8::from(value)),
            Self::Int(value) => RawValue::Int(value),
            Self::Float(value) => RawValue::Float(value),
            Self::Stream(stream) => RawValue::Pointer(stream.as_raw()),
        }
    }
}

impl From<DevicePtr> for KernelArg {
    fn from(ptr: DevicePtr) -> Self {
        Self::Buffer(ptr)
    }
}

impl From<StreamHandle> for KernelArg {
    fn from(stream: StreamHandle) -> Self {
        Self::Stream(stream)
    }
}

impl From<bool> for KernelArg {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for KernelArg {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<f32> for KernelArg {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

/// A marshaled argument, laid out as the entry point reads it.
#[derive(Debug, Clone, Copy)]
pub(crate) enum RawValue {
    Pointer(*mut c_void),
    Bool(u8),
    Int(c_int),
    Float(c_float),
}

impl RawValue {
    /// libffi view of this value. Borrows `self` for the duration of the call.
    pub(crate) fn as_arg(&self) -> Arg {
        match self {
            Self::Pointer(ptr) => Arg::new(ptr),
            Self::Bool(value) => Arg::new(value),
            Self::Int(value) => Arg::new(value),
            Self::Float(value) => Arg::new(value),
        }
    }
}

/// libffi type of a raw ABI slot.
pub(crate) fn ffi_type(raw: RawAbi) -> Type {
    match raw {
        RawAbi::Bool => Type::u8(),
        RawAbi::Int => Type::c_int(),
        RawAbi::Float => Type::f32(),
        RawAbi::Pointer => Type::pointer(),
    }
}

/// Check count and category of `args` against `defs`.
pub fn check_args(defs: &[ArgumentDefinition], args: &[KernelArg]) -> Result<()> {
    ensure!(
        defs.len() == args.len(),
        ArgumentMismatchSnafu { reason: format!("expected {} arguments, got {}", defs.len(), args.len()) }
    );

    for (idx, (def, arg)) in defs.iter().zip(args).enumerate() {
        ensure!(
            arg.fits(def.ty),
            ArgumentMismatchSnafu {
                reason: format!("argument {idx} ({}) is declared {} but got {}", def.name, def.ty, arg.category())
            }
        );
    }

    Ok(())
}
