//! Lazily loaded handle to one compiled kernel.

use std::ffi::{c_int, c_void};
use std::path::Path;

use copyan_codegen::ENTRY_POINT;
use libffi::middle::{Arg, Cif, CodePtr, Type};
use libloading::{Library, Symbol};
use once_cell::sync::OnceCell;
use snafu::ResultExt;

use crate::args::{KernelArg, RawValue, check_args, ffi_type};
use crate::artifact::ArtifactPaths;
use crate::descriptor::ArgumentDescriptor;
use crate::error::{ArgumentMismatchSnafu, EntryPointNotFoundSnafu, LibraryLoadSnafu, Result};

/// Callable handle bound to one artifact directory.
///
/// Nothing is read from disk until the first [`Runtime::call`]; the library and
/// its descriptor are then loaded once and kept for the lifetime of the handle.
pub struct Runtime {
    paths: ArtifactPaths,
    loaded: OnceCell<LoadedKernel>,
}

struct LoadedKernel {
    descriptor: ArgumentDescriptor,
    cif: Cif,
    entry: CodePtr,
    // Keeps `entry` mapped.
    _library: Library,
}

// SAFETY: `LoadedKernel` is immutable once built. `entry` points into `_library`,
// which lives exactly as long as it does, and the libffi call interface is only
// read during a call. Nothing in it is tied to the loading thread.
unsafe impl Send for LoadedKernel {}
unsafe impl Sync for LoadedKernel {}

impl LoadedKernel {
    fn open(paths: &ArtifactPaths) -> Result<Self> {
        let descriptor = ArgumentDescriptor::read(&paths.descriptor())?;

        let path = paths.library();
        // SAFETY: The library was produced by our own build and has no
        // initialisers beyond what the device runtime registers.
        let library = unsafe { Library::new(&path) }.context(LibraryLoadSnafu { path: &path })?;

        let entry = {
            // SAFETY: The signature is erased here; the real one is described by
            // the call interface built from the descriptor below.
            let symbol: Symbol<unsafe extern "C" fn()> = unsafe { library.get(ENTRY_POINT.as_bytes()) }
                .context(EntryPointNotFoundSnafu { name: ENTRY_POINT, path: &path })?;
            CodePtr::from_ptr(*symbol as *const c_void)
        };

        let mut params = Vec::with_capacity(descriptor.len() + 1);
        for def in descriptor.args() {
            let abi = def.ty.abi().ok_or_else(|| {
                ArgumentMismatchSnafu { reason: format!("argument {} has no launch ABI ({})", def.name, def.ty) }
                    .build()
            })?;
            params.push(ffi_type(abi.raw));
        }
        // Trailing `int&` status.
        params.push(Type::pointer());
        let cif = Cif::new(params, Type::void());

        tracing::debug!(kernel.path = %paths.dir().display(), kernel.num_args = descriptor.len(), "loaded kernel");
        Ok(Self { descriptor, cif, entry, _library: library })
    }
}

impl Runtime {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { paths: ArtifactPaths::new(dir.as_ref()), loaded: OnceCell::new() }
    }

    /// Artifact directory this handle is bound to.
    pub fn path(&self) -> &Path {
        self.paths.dir()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.get().is_some()
    }

    /// Argument list recorded at build time. Loads the kernel if needed.
    pub fn descriptor(&self) -> Result<&ArgumentDescriptor> {
        Ok(&self.load()?.descriptor)
    }

    fn load(&self) -> Result<&LoadedKernel> {
        self.loaded.get_or_try_init(|| LoadedKernel::open(&self.paths))
    }

    /// Launch the kernel and return its status code (`0` on success).
    ///
    /// Arguments are checked against the recorded descriptor for count and
    /// category. A non-zero status is returned as is; it is not an error at
    /// this layer. The launch is asynchronous with respect to the device.
    ///
    /// # Safety
    ///
    /// Every buffer must point to device memory of the declared element type
    /// that stays alive until the launched work completes, and every stream
    /// must be valid. The kernel code itself is trusted.
    pub unsafe fn call(&self, args: &[KernelArg]) -> Result<i32> {
        let kernel = self.load()?;
        check_args(kernel.descriptor.args(), args)?;

        let raw: Vec<RawValue> = args.iter().map(KernelArg::marshal).collect();
        let mut status: c_int = 0;
        let status_ptr: *mut c_int = &mut status;

        let mut ffi_args: Vec<Arg> = raw.iter().map(RawValue::as_arg).collect();
        ffi_args.push(Arg::new(&status_ptr));

        // SAFETY: The call interface was built from the same descriptor the
        // arguments were just checked against, and every `Arg` borrows a local
        // that outlives the call.
        unsafe { kernel.cif.call::<()>(kernel.entry, &ffi_args) };

        tracing::trace!(kernel.path = %self.paths.dir().display(), status, "kernel launched");
        Ok(status)
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime").field("path", &self.paths.dir()).field("loaded", &self.is_loaded()).finish()
    }
}
