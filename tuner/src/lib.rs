//! One-call kernel compilation.
//!
//! [`Tuner::compile_and_tune`] takes a [`KernelRequest`] and a configuration,
//! substitutes the configuration into the launch template, generates the
//! launch wrapper, and builds it through a [`copyan_runtime::BuildCache`]. The
//! result is cached per (kernel name, configuration), so repeated requests skip
//! code generation entirely.
//!
//! The search-space parameter exists for auto-tuning; only its first candidate
//! is compiled and nothing is benchmarked.

pub mod error;
pub mod request;
pub mod tuner;


pub use error::*;
pub use request::KernelRequest;
pub use tuner::Tuner;
