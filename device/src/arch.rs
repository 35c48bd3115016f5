//! Compute capability and the code-generation target table.

use std::fmt;
use std::str::FromStr;

use snafu::OptionExt;

use crate::error::{Error, InvalidComputeCapabilitySnafu};

/// Target used when the attached device is not in [`ComputeCapability::gencode`].
pub const DEFAULT_GENCODE: &str = "-gencode=arch=compute_90a,code=sm_90a";

/// CUDA compute capability (`major.minor`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComputeCapability {
    pub major: u32,
    pub minor: u32,
}

impl ComputeCapability {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Concatenated form used in target names (`86`, `120`).
    pub fn arch_code(&self) -> String {
        format!("{}{}", self.major, self.minor)
    }

    /// `-gencode` flag for this device, if it is a known target.
    ///
    /// Hopper builds target `sm_90a` so that kernels can use the
    /// architecture-specific features (wgmma, setmaxnreg).
    pub const fn gencode(&self) -> Option<&'static str> {
        let flag = match (self.major, self.minor) {
            (8, 0) => "-gencode=arch=compute_80,code=sm_80",
            (8, 6) => "-gencode=arch=compute_86,code=sm_86",
            (8, 9) => "-gencode=arch=compute_89,code=sm_89",
            (9, 0) => "-gencode=arch=compute_90a,code=sm_90a",
            (10, 0) => "-gencode=arch=compute_100,code=sm_100",
            (12, 0) => "-gencode=arch=compute_120,code=sm_120",
            _ => return None,
        };
        Some(flag)
    }
}

impl fmt::Display for ComputeCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sm_{}{}", self.major, self.minor)
    }
}

impl FromStr for ComputeCapability {
    type Err = Error;

    /// Parses the `major.minor` form reported by `nvidia-smi` (`8.6`, `12.0`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        let (major, minor) = value.split_once('.').context(InvalidComputeCapabilitySnafu { value })?;
        let major = major.parse().ok().context(InvalidComputeCapabilitySnafu { value })?;
        let minor = minor.parse().ok().context(InvalidComputeCapabilitySnafu { value })?;
        Ok(Self { major, minor })
    }
}
