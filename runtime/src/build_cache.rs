//! Content-addressed build cache.
//!
//! # Lookup
//!
//! 1. In-process registry: the directory already has a [`Runtime`].
//! 2. Disk: a compiled library already sits at the derived directory (an
//!    earlier process built it).
//! 3. Compile: the artifact is staged in a temporary directory inside the
//!    cache root and renamed into place, so no reader ever observes a
//!    half-written artifact. If another process published the same signature
//!    first, its artifact is adopted.
//!
//! Artifacts are never modified or deleted once published. A failed compile
//! leaves its sources at `.<dir name>.last-failure`, replacing the previous
//! failure of the same signature.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use copyan_codegen::check_supported;
use copyan_device::{Accelerator, FixedAccelerator, default_accelerator};
use copyan_dtype::ArgumentDefinition;
use snafu::ResultExt;
use tempfile::TempDir;

use crate::artifact::ArtifactPaths;
use crate::cache::RuntimeCache;
use crate::config::JitConfig;
use crate::descriptor::ArgumentDescriptor;
use crate::error::{AcceleratorSnafu, CodegenSnafu, IoSnafu, Result};
use crate::flags::compile_flags;
use crate::loader::Runtime;
use crate::signature::KernelSignature;
use crate::toolchain::{CompileCommand, Compiler, Nvcc};

/// Builds kernels on demand and hands out shared [`Runtime`]s.
pub struct BuildCache {
    config: JitConfig,
    compiler: Box<dyn Compiler>,
    accelerator: Box<dyn Accelerator>,
    runtimes: RuntimeCache,
}

impl BuildCache {
    /// Build cache driving `nvcc` for the configured (or attached) device.
    pub fn new(config: JitConfig) -> Result<Self> {
        let accelerator: Box<dyn Accelerator> = match config.arch {
            Some(capability) => Box::new(FixedAccelerator::new(capability)),
            None => default_accelerator(config.device_ordinal).context(AcceleratorSnafu)?,
        };
        let compiler = Nvcc::new(config.cuda_home.clone(), config.compile_timeout);
        Ok(Self::from_parts(config, Box::new(compiler), accelerator))
    }

    /// Build cache configured from the environment.
    pub fn from_env() -> Result<Self> {
        Self::new(JitConfig::from_env())
    }

    /// Build cache with an explicit compiler and accelerator.
    pub fn with_parts(
        config: JitConfig,
        compiler: impl Compiler + 'static,
        accelerator: impl Accelerator + 'static,
    ) -> Self {
        Self::from_parts(config, Box::new(compiler), Box::new(accelerator))
    }

    fn from_parts(config: JitConfig, compiler: Box<dyn Compiler>, accelerator: Box<dyn Accelerator>) -> Self {
        tracing::debug!(cache_dir = %config.cache_dir.display(), accelerator = accelerator.name(), "created build cache");
        Self { config, compiler, accelerator, runtimes: RuntimeCache::new() }
    }

    pub fn config(&self) -> &JitConfig {
        &self.config
    }

    pub fn runtimes(&self) -> &RuntimeCache {
        &self.runtimes
    }

    /// Signature of `source` compiled for the attached device.
    pub fn signature(&self, name: &str, source: &str) -> Result<KernelSignature> {
        let capability = self.accelerator.compute_capability().context(AcceleratorSnafu)?;
        Ok(KernelSignature::new(name, source, compile_flags(capability)))
    }

    /// Directory the artifact for `source` lives (or would live) in.
    pub fn artifact_dir(&self, name: &str, source: &str) -> Result<PathBuf> {
        Ok(self.config.cache_dir.join(self.signature(name, source)?.dir_name()))
    }

    /// Return a runtime for `source`, compiling it if no artifact exists yet.
    ///
    /// `arg_defs` must be the definitions `source` was generated from; they are
    /// recorded next to the library and drive argument marshaling.
    pub fn build(&self, name: &str, arg_defs: &[ArgumentDefinition], source: &str) -> Result<Arc<Runtime>> {
        check_supported(arg_defs).context(CodegenSnafu)?;

        let signature = self.signature(name, source)?;
        let dir = self.config.cache_dir.join(signature.dir_name());

        if let Some(runtime) = self.runtimes.lookup(&dir) {
            return Ok(runtime);
        }

        self.compile(&signature, arg_defs, &dir)?;
        Ok(self.runtimes.register(&dir))
    }

    fn compile(&self, signature: &KernelSignature, arg_defs: &[ArgumentDefinition], dir: &Path) -> Result<()> {
        let root = &self.config.cache_dir;
        fs::create_dir_all(root).context(IoSnafu { path: root })?;

        let staging = tempfile::Builder::new()
            .prefix(&format!(".{}.", signature.dir_name()))
            .tempdir_in(root)
            .context(IoSnafu { path: root })?;
        let staged = ArtifactPaths::new(staging.path());

        fs::write(staged.source(), signature.source()).context(IoSnafu { path: staged.source() })?;

        let command = CompileCommand {
            source: staged.source(),
            output: staged.library(),
            flags: signature.flags().to_vec(),
            include_dirs: self.config.include_dirs(),
        };
        if let Err(error) = self.compiler.compile(&command) {
            let kept = keep_failed(staging, root, signature);
            tracing::warn!(kernel.name = signature.name(), staging = %kept.display(), "compilation failed, keeping sources");
            return Err(error);
        }

        ArgumentDescriptor::new(arg_defs.to_vec()).write(&staged.descriptor())?;
        publish(staging, dir)
    }
}

/// Move a fully built staging directory to `dir`.
fn publish(staging: TempDir, dir: &Path) -> Result<()> {
    let target = ArtifactPaths::new(dir);

    if dir.exists() && !target.is_built() {
        // Leftover without a library; not a published artifact.
        tracing::warn!(kernel.path = %dir.display(), "replacing incomplete artifact directory");
        fs::remove_dir_all(dir).context(IoSnafu { path: dir })?;
    }

    match fs::rename(staging.path(), dir) {
        Ok(()) => {
            tracing::debug!(kernel.path = %dir.display(), "published artifact");
            Ok(())
        }
        Err(_) if target.is_built() => {
            tracing::debug!(kernel.path = %dir.display(), "artifact published concurrently, adopting it");
            Ok(())
        }
        Err(source) => Err(source).context(IoSnafu { path: dir }),
    }
}

/// Keep the sources of a failed compile for inspection, one per signature.
fn keep_failed(staging: TempDir, root: &Path, signature: &KernelSignature) -> PathBuf {
    let target = root.join(format!(".{}.last-failure", signature.dir_name()));
    if target.exists() {
        if let Err(error) = fs::remove_dir_all(&target) {
            tracing::debug!(path = %target.display(), %error, "could not remove previous failure");
        }
    }
    match fs::rename(staging.path(), &target) {
        Ok(()) => {
            // Already moved; nothing left for the guard to clean up.
            let _ = staging.into_path();
            target
        }
        Err(_) => staging.into_path(),
    }
}
