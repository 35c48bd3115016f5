//! Compiler doubles for tests.
//!
//! [`RecordingCompiler`] never runs a process; it records each command and
//! writes a placeholder library. [`HostCompiler`] builds real shared libraries
//! from plain C with the host `cc`, for tests that load and call them.

use std::fs;
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use snafu::ResultExt;

use crate::error::{CompilationFailedSnafu, CompilerSpawnSnafu, IoSnafu, Result};
use crate::toolchain::{CompileCommand, Compiler};

/// Records invocations and produces a placeholder library.
#[derive(Debug, Clone, Default)]
pub struct RecordingCompiler {
    commands: Arc<Mutex<Vec<CompileCommand>>>,
    sources: Arc<Mutex<Vec<String>>>,
    failure: Option<String>,
}

impl RecordingCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// A compiler that fails every invocation with `diagnostics`.
    pub fn failing(diagnostics: impl Into<String>) -> Self {
        Self { failure: Some(diagnostics.into()), ..Self::default() }
    }

    pub fn calls(&self) -> usize {
        self.commands.lock().map(|commands| commands.len()).unwrap_or_default()
    }

    pub fn commands(&self) -> Vec<CompileCommand> {
        self.commands.lock().map(|commands| commands.clone()).unwrap_or_default()
    }

    /// Source text as it was on disk when each compile ran.
    pub fn sources(&self) -> Vec<String> {
        self.sources.lock().map(|sources| sources.clone()).unwrap_or_default()
    }
}

impl Compiler for RecordingCompiler {
    fn compile(&self, command: &CompileCommand) -> Result<()> {
        if let Ok(mut commands) = self.commands.lock() {
            commands.push(command.clone());
        }
        let source = fs::read_to_string(&command.source).context(IoSnafu { path: &command.source })?;
        if let Ok(mut sources) = self.sources.lock() {
            sources.push(source);
        }

        if let Some(diagnostics) = &self.failure {
            return CompilationFailedSnafu {
                command: command.render("recording".as_ref()),
                status: "exit status: 1",
                diagnostics: diagnostics.as_str(),
            }
            .fail();
        }

        fs::write(&command.output, b"placeholder").context(IoSnafu { path: &command.output })
    }
}

/// Compiles the source as C with the host `cc`, ignoring device flags.
#[derive(Debug, Clone, Default)]
pub struct HostCompiler {
    calls: Arc<AtomicUsize>,
}

impl HostCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a host C compiler can be run at all.
    pub fn available() -> bool {
        Command::new("cc").arg("--version").output().is_ok_and(|output| output.status.success())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Compiler for HostCompiler {
    fn compile(&self, command: &CompileCommand) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut cc = Command::new("cc");
        cc.args(["-shared", "-fPIC", "-x", "c"]).arg(&command.source).arg("-o").arg(&command.output);
        let rendered = format!("{cc:?}");

        let output = cc.output().context(CompilerSpawnSnafu { command: rendered.as_str() })?;
        if !output.status.success() {
            return CompilationFailedSnafu {
                command: rendered,
                status: output.status.to_string(),
                diagnostics: String::from_utf8_lossy(&output.stderr),
            }
            .fail();
        }
        Ok(())
    }
}
