//! In-process path → [`Runtime`] registry.
//!
//! Guarantees at most one `Runtime` per artifact directory within a process,
//! so a kernel library is loaded once no matter how many callers build it.
//! Backed by papaya's lock-free map; concurrent registrations of the same path
//! converge on whichever insert lands first.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use papaya::{Compute, HashMap, Operation};

use crate::artifact::ArtifactPaths;
use crate::loader::Runtime;

#[derive(Default)]
pub struct RuntimeCache {
    runtimes: HashMap<PathBuf, Arc<Runtime>>,
}

impl RuntimeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered runtime for `dir`, or a freshly registered one when a
    /// compiled library already sits on disk there.
    pub fn lookup(&self, dir: &Path) -> Option<Arc<Runtime>> {
        let guard = self.runtimes.guard();

        // Fast path: already registered in this process
        if let Some(runtime) = self.runtimes.get(dir, &guard) {
            tracing::debug!(kernel.path = %dir.display(), "runtime cache hit");
            return Some(Arc::clone(runtime));
        }

        if ArtifactPaths::new(dir).is_built() {
            tracing::debug!(kernel.path = %dir.display(), "reusing compiled artifact from disk");
            return Some(self.register(dir));
        }

        None
    }

    /// Register `dir`, returning the existing runtime if one is already there.
    pub fn register(&self, dir: &Path) -> Arc<Runtime> {
        let guard = self.runtimes.guard();
        let fresh = Arc::new(Runtime::new(dir));

        // Atomic insert - if another thread beat us, use theirs
        match self.runtimes.compute(
            dir.to_path_buf(),
            |entry| match entry {
                Some((_, existing)) => Operation::Abort(Arc::clone(existing)),
                None => Operation::Insert(Arc::clone(&fresh)),
            },
            &guard,
        ) {
            Compute::Inserted(_, runtime) => Arc::clone(runtime),
            Compute::Aborted(runtime) => runtime,
            _ => fresh,
        }
    }

    pub fn contains(&self, dir: &Path) -> bool {
        self.runtimes.pin().contains_key(dir)
    }

    pub fn len(&self) -> usize {
        self.runtimes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runtimes.is_empty()
    }
}
