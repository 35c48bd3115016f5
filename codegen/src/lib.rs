//! Source generation for JIT-compiled CUDA kernels.
//!
//! A kernel request is a launch template (a few lines of host code that launch
//! device work) plus an ordered list of typed arguments. This crate turns that
//! into a complete translation unit exporting a single C-ABI `launch` function
//! the runtime can call through `dlopen`.
//!
//! # Usage
//!
//! ```ignore
//! use copyan_codegen::{TemplateKeys, cpp_format, generate};
//!
//! let keys = TemplateKeys::new().with("BLOCK_SIZE", 512);
//! let body = cpp_format("reduce<{BLOCK_SIZE}><<<1, {BLOCK_SIZE}>>>(X, N);", &keys);
//! let src = generate(&["\"reduce.cuh\""], &arg_defs, &body)?;
//! ```

pub mod cuda;
pub mod error;
pub mod template;


pub use cuda::{ENTRY_POINT, STATUS_PARAM, check_supported, generate};
pub use error::*;
pub use template::{TemplateKeys, cpp_format};
