//! Build, cache and invoke JIT-compiled CUDA kernels.
//!
//! [`BuildCache::build`] turns generated source into a [`Runtime`]: the source
//! is hashed together with its compile flags, compiled with `nvcc` into a
//! per-signature cache directory on first use, and reused from there by every
//! later build in this or any other process. A `Runtime` loads its shared
//! library lazily and launches it through the fixed `launch` entry point.
//!
//! ```ignore
//! let cache = BuildCache::from_env()?;
//! let source = copyan_codegen::generate::<&str>(&[], &defs, "my_kernel<<<1, 32, 0, stream>>>(x, n);")?;
//! let runtime = cache.build("my_kernel", &defs, &source)?;
//! let status = unsafe { runtime.call(&[KernelArg::Buffer(x), KernelArg::Int(n), KernelArg::Stream(stream)])? };
//! ```

pub mod args;
pub mod artifact;
pub mod build_cache;
pub mod cache;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod flags;
pub mod loader;
pub mod signature;
pub mod toolchain;

#[cfg(any(test, feature = "testing"))]
pub mod testing;


pub use args::{KernelArg, check_args};
pub use build_cache::BuildCache;
pub use cache::RuntimeCache;
pub use config::JitConfig;
pub use descriptor::ArgumentDescriptor;
pub use error::*;
pub use loader::Runtime;
pub use signature::KernelSignature;
pub use toolchain::{CompileCommand, Compiler, Nvcc};
