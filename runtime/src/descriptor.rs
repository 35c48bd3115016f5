//! The argument sidecar stored next to every compiled library.
//!
//! # Format
//!
//! ```text
//! x: buffer<float32>
//! n: int32
//! stream: stream
//! ```
//!
//! One `<name>: <tag>` line per argument, in entry-point order, each ending in a
//! newline. A kernel without arguments is the single token `()`. Anything else
//! is rejected; a damaged sidecar is never guessed at.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use copyan_dtype::{ArgType, ArgumentDefinition, is_c_identifier};
use snafu::{OptionExt, ResultExt, Snafu, ensure};

use crate::error::{IoSnafu, MalformedArgumentDescriptorSnafu, Result};

const EMPTY: &str = "()";
const SEPARATOR: &str = ": ";

/// Why a sidecar failed to parse.
#[derive(Debug, Snafu)]
pub enum ParseError {
    #[snafu(display("descriptor is empty"))]
    Blank,

    #[snafu(display("line {line}: expected `<name>: <type>`, got {text:?}"))]
    MissingSeparator { line: usize, text: String },

    #[snafu(display("line {line}: invalid argument name {name:?}"))]
    InvalidName { line: usize, name: String },

    #[snafu(display("line {line}: {source}"))]
    UnknownType { line: usize, source: copyan_dtype::Error },

    #[snafu(display("line {line}: duplicate argument {name:?}"))]
    Duplicate { line: usize, name: String },
}

/// Ordered (name, type) list recorded at build time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArgumentDescriptor {
    args: Vec<ArgumentDefinition>,
}

impl ArgumentDescriptor {
    pub fn new(args: Vec<ArgumentDefinition>) -> Self {
        Self { args }
    }

    pub fn args(&self) -> &[ArgumentDefinition] {
        &self.args
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn serialize(&self) -> String {
        if self.args.is_empty() {
            return format!("{EMPTY}\n");
        }
        self.args.iter().map(|def| format!("{}{SEPARATOR}{}\n", def.name, def.ty)).collect()
    }

    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let body = text.strip_suffix('\n').unwrap_or(text);
        ensure!(!body.trim().is_empty(), BlankSnafu);
        if body == EMPTY {
            return Ok(Self::default());
        }

        let mut seen = HashSet::new();
        let mut args = Vec::new();
        for (idx, entry) in body.split('\n').enumerate() {
            let line = idx + 1;
            let (name, tag) = entry.split_once(SEPARATOR).context(MissingSeparatorSnafu { line, text: entry })?;

            ensure!(is_c_identifier(name), InvalidNameSnafu { line, name });
            let ty: ArgType = tag.parse().context(UnknownTypeSnafu { line })?;
            ensure!(seen.insert(name), DuplicateSnafu { line, name });

            args.push(ArgumentDefinition::new(name, ty));
        }

        Ok(Self { args })
    }

    /// Read and parse a sidecar. A missing file is as malformed as a bad one.
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| MalformedArgumentDescriptorSnafu { path, reason: e.to_string() }.build())?;
        Self::parse(&text).map_err(|e| MalformedArgumentDescriptorSnafu { path, reason: e.to_string() }.build())
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.serialize()).context(IoSnafu { path })
    }
}
