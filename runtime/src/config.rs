//! JIT configuration.
//!
//! Every field has a built-in default and an environment override:
//!
//! | Field | Variable | Default |
//! |-------|----------|---------|
//! | `cache_dir` | `COPYAN_CACHE_DIR` | `<user cache dir>/copyan` |
//! | `include_dir` | `COPYAN_INCLUDE_DIR` | `include/` at the workspace root |
//! | `cuda_home` | `CUDA_HOME`, then `CUDA_PATH` | search `PATH`, then `/usr/local/cuda` |
//! | `compile_timeout` | `COPYAN_COMPILE_TIMEOUT` (seconds) | none |
//! | `arch` | `COPYAN_ARCH` (`major.minor`) | query the device |
//! | `device_ordinal` | `COPYAN_DEVICE` | `0` |

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bon::bon;
use copyan_device::ComputeCapability;

/// Where artifacts live and how the compiler is driven.
#[derive(Debug, Clone, PartialEq)]
pub struct JitConfig {
    /// Root of the artifact cache. Each kernel gets one subdirectory.
    pub cache_dir: PathBuf,
    /// Internal include directory, always first on the search path.
    pub include_dir: PathBuf,
    /// Extra include directories, searched after `include_dir`.
    pub extra_include_dirs: Vec<PathBuf>,
    /// Toolkit root; `<cuda_home>/bin/nvcc` is the only candidate when set.
    pub cuda_home: Option<PathBuf>,
    /// Kill the compiler after this long.
    pub compile_timeout: Option<Duration>,
    /// Compile for this target instead of querying the device.
    pub arch: Option<ComputeCapability>,
    /// Device queried for its compute capability.
    pub device_ordinal: usize,
}

#[bon]
impl JitConfig {
    #[builder]
    pub fn new(
        #[builder(into)] cache_dir: Option<PathBuf>,
        #[builder(into)] include_dir: Option<PathBuf>,
        #[builder(default)] extra_include_dirs: Vec<PathBuf>,
        #[builder(into)] cuda_home: Option<PathBuf>,
        compile_timeout: Option<Duration>,
        arch: Option<ComputeCapability>,
        #[builder(default)] device_ordinal: usize,
    ) -> Self {
        Self {
            cache_dir: cache_dir.unwrap_or_else(default_cache_dir),
            include_dir: include_dir.unwrap_or_else(default_include_dir),
            extra_include_dirs,
            cuda_home,
            compile_timeout,
            arch,
            device_ordinal,
        }
    }
}

impl JitConfig {
    /// Create config from environment variables, falling back to defaults.
    ///
    /// Unparsable or out-of-range values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var_os(name))
    }

    /// Same as [`JitConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        let path_var = |name: &str| lookup(name).filter(|v| !v.is_empty()).map(PathBuf::from);
        let text_var = |name: &str| lookup(name).and_then(|v| v.into_string().ok()).filter(|v| !v.trim().is_empty());

        let compile_timeout =
            parse_value::<f64>("COPYAN_COMPILE_TIMEOUT", text_var("COPYAN_COMPILE_TIMEOUT")).and_then(timeout_secs);

        Self::builder()
            .maybe_cache_dir(path_var("COPYAN_CACHE_DIR"))
            .maybe_include_dir(path_var("COPYAN_INCLUDE_DIR"))
            .maybe_cuda_home(path_var("CUDA_HOME").or_else(|| path_var("CUDA_PATH")))
            .maybe_compile_timeout(compile_timeout)
            .maybe_arch(parse_value("COPYAN_ARCH", text_var("COPYAN_ARCH")))
            .device_ordinal(parse_value("COPYAN_DEVICE", text_var("COPYAN_DEVICE")).unwrap_or(0))
            .build()
    }

    /// Include search path in command-line order.
    pub fn include_dirs(&self) -> Vec<PathBuf> {
        std::iter::once(self.include_dir.clone()).chain(self.extra_include_dirs.iter().cloned()).collect()
    }
}

impl Default for JitConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

fn parse_value<T: std::str::FromStr>(name: &str, value: Option<String>) -> Option<T> {
    let value = value?;
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!(var = name, value = %value, "ignoring unparsable environment variable");
            None
        }
    }
}

/// Positive, representable timeout from fractional seconds.
fn timeout_secs(secs: f64) -> Option<Duration> {
    match Duration::try_from_secs_f64(secs) {
        Ok(timeout) if !timeout.is_zero() => Some(timeout),
        _ => {
            tracing::warn!(var = "COPYAN_COMPILE_TIMEOUT", secs, "ignoring out-of-range compile timeout");
            None
        }
    }
}

fn default_cache_dir() -> PathBuf {
    match dirs::cache_dir() {
        Some(dir) => dir.join("copyan"),
        None => std::env::temp_dir().join("copyan"),
    }
}

fn default_include_dir() -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest.parent().unwrap_or(manifest).join("include")
}
