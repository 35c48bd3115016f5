//! Request cache in front of the build cache.

use std::collections::HashMap;
use std::sync::Arc;

use copyan_codegen::{TemplateKeys, check_supported, cpp_format, generate};
use copyan_runtime::{BuildCache, KernelArg, Runtime, check_args};
use parking_lot::RwLock;
use snafu::ResultExt;

use crate::error::{CodegenSnafu, Result, RuntimeSnafu};
use crate::request::KernelRequest;

/// (kernel name, canonical configuration string).
type RequestKey = (String, String);

/// Compiles kernel requests and remembers the result per configuration.
///
/// # Thread Safety
///
/// Lookups take a read lock. A miss generates and builds without holding any
/// lock, then double-checks under the write lock, so concurrent misses on the
/// same request all return the first runtime that was stored.
pub struct Tuner {
    build: BuildCache,
    runtimes: RwLock<HashMap<RequestKey, Arc<Runtime>>>,
}

impl Tuner {
    pub fn new(build: BuildCache) -> Self {
        Self { build, runtimes: RwLock::new(HashMap::new()) }
    }

    pub fn build_cache(&self) -> &BuildCache {
        &self.build
    }

    /// Number of cached requests.
    pub fn len(&self) -> usize {
        self.runtimes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.runtimes.read().is_empty()
    }

    /// Return a runtime for `request` under `keys`.
    ///
    /// `space` is the tuning search space. When it is non-empty its first entry
    /// is overlaid on `keys` and the rest is ignored. `args` are the values the
    /// kernel will be launched with; they are checked against
    /// `request.arg_defs` up front.
    pub fn compile_and_tune(
        &self,
        request: &KernelRequest,
        keys: &TemplateKeys,
        space: &[TemplateKeys],
        args: &[KernelArg],
    ) -> Result<Arc<Runtime>> {
        check_supported(&request.arg_defs).context(CodegenSnafu)?;
        check_args(&request.arg_defs, args).context(RuntimeSnafu)?;

        let config = match space.first() {
            Some(candidate) => keys.merged(candidate),
            None => keys.clone(),
        };
        if space.len() > 1 {
            tracing::debug!(kernel.name = %request.name, candidates = space.len(), "compiling first tuning candidate only");
        }

        let key: RequestKey = (request.name.clone(), config.to_string());

        // Fast path: read lock to check cache
        if let Some(runtime) = self.runtimes.read().get(&key) {
            tracing::debug!(kernel.name = %request.name, config = %key.1, "request cache hit");
            return Ok(Arc::clone(runtime));
        }

        let body = cpp_format(&request.template, &config);
        let source = generate(&request.includes, &request.arg_defs, &body).context(CodegenSnafu)?;
        let runtime = self.build.build(&request.name, &request.arg_defs, &source).context(RuntimeSnafu)?;

        // Double-check: another thread may have stored one meanwhile
        let mut runtimes = self.runtimes.write();
        Ok(Arc::clone(runtimes.entry(key).or_insert(runtime)))
    }
}
