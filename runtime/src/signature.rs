//! Content addressing for build artifacts.
//!
//! A kernel's cache directory is `<slug>.<hash>`, where the hash covers the
//! name, the full generated source and the full flag list. Each field is
//! length-prefixed before hashing so that no two distinct inputs can produce
//! the same byte stream.

use sha2::{Digest, Sha256};

/// Number of hex digits of the digest kept in directory names.
pub const HASH_LEN: usize = 12;

/// Everything that determines a compiled artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KernelSignature {
    name: String,
    source: String,
    flags: Vec<String>,
}

impl KernelSignature {
    pub fn new(name: impl Into<String>, source: impl Into<String>, flags: Vec<String>) -> Self {
        Self { name: name.into(), source: source.into(), flags }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    /// Truncated hex SHA-256 over the length-prefixed fields.
    pub fn hash(&self) -> String {
        let mut hasher = Sha256::new();
        update_field(&mut hasher, self.name.as_bytes());
        update_field(&mut hasher, self.source.as_bytes());
        hasher.update((self.flags.len() as u64).to_le_bytes());
        for flag in &self.flags {
            update_field(&mut hasher, flag.as_bytes());
        }

        let digest = hasher.finalize();
        let mut hex: String = digest.iter().map(|byte| format!("{byte:02x}")).collect();
        hex.truncate(HASH_LEN);
        hex
    }

    /// Cache subdirectory name: `<slug>.<hash>`.
    pub fn dir_name(&self) -> String {
        format!("{}.{}", slugify(&self.name), self.hash())
    }
}

fn update_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

/// Filesystem-safe rendering of a kernel name.
///
/// Keeps ASCII alphanumerics, `_` and `-`; every other run of characters
/// becomes a single `_`. Leading and trailing `_` are trimmed, and a name with
/// nothing left becomes `kernel`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_gap = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' {
            slug.push(ch);
            in_gap = false;
        } else if !in_gap {
            slug.push('_');
            in_gap = true;
        }
    }

    let slug = slug.trim_matches('_');
    if slug.is_empty() { "kernel".to_string() } else { slug.to_string() }
}
