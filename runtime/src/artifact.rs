//! Layout of one kernel's cache directory.

use std::path::{Path, PathBuf};

pub const SOURCE_FILE: &str = "kernel.cu";
pub const DESCRIPTOR_FILE: &str = "kernel.args";

/// File name of the compiled library (`kernel.so`, `kernel.dll`, `kernel.dylib`).
pub fn library_file() -> String {
    format!("kernel.{}", std::env::consts::DLL_EXTENSION)
}

/// Paths of the files in an artifact directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactPaths {
    dir: PathBuf,
}

impl ArtifactPaths {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn source(&self) -> PathBuf {
        self.dir.join(SOURCE_FILE)
    }

    pub fn library(&self) -> PathBuf {
        self.dir.join(library_file())
    }

    pub fn descriptor(&self) -> PathBuf {
        self.dir.join(DESCRIPTOR_FILE)
    }

    /// A directory counts as built once its library exists.
    pub fn is_built(&self) -> bool {
        self.library().is_file()
    }
}
