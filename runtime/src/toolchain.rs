//! Compiler discovery and invocation.
//!
//! Compilation is a blocking subprocess. The command line is logged before it
//! runs; on failure the compiler's own output is returned verbatim.

use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use once_cell::sync::OnceCell;
use snafu::ResultExt;

use crate::error::{CompilerSpawnSnafu, Error, Result};

/// Interval between exit checks while a deadline is armed.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// One compiler invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileCommand {
    pub source: PathBuf,
    pub output: PathBuf,
    pub flags: Vec<String>,
    pub include_dirs: Vec<PathBuf>,
}

impl CompileCommand {
    /// Arguments in invocation order: `<source> -o <output> <flags...> -I<dir>...`.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![self.source.clone().into(), "-o".into(), self.output.clone().into()];
        args.extend(self.flags.iter().map(OsString::from));
        args.extend(self.include_dirs.iter().map(|dir| {
            let mut arg = OsString::from("-I");
            arg.push(dir);
            arg
        }));
        args
    }

    /// Shell-like rendering for logs and error messages.
    pub fn render(&self, program: &Path) -> String {
        std::iter::once(program.as_os_str().to_os_string())
            .chain(self.args())
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Turns a source file into a loadable shared library.
pub trait Compiler: Send + Sync {
    /// Compile `command.source` into `command.output`.
    fn compile(&self, command: &CompileCommand) -> Result<()>;
}

/// The CUDA compiler driver.
///
/// The executable is located on first use and the outcome (including
/// "not found") is remembered for the lifetime of this value.
pub struct Nvcc {
    cuda_home: Option<PathBuf>,
    timeout: Option<Duration>,
    location: OnceCell<Result<PathBuf, String>>,
}

impl Nvcc {
    pub fn new(cuda_home: Option<PathBuf>, timeout: Option<Duration>) -> Self {
        Self { cuda_home, timeout, location: OnceCell::new() }
    }

    /// Path of the compiler executable.
    pub fn locate(&self) -> Result<&Path> {
        let location = self.location.get_or_init(|| {
            let candidates = candidates(self.cuda_home.as_deref());
            match candidates.iter().find(|path| path.is_file()) {
                Some(found) => {
                    tracing::debug!(nvcc = %found.display(), "located CUDA compiler");
                    Ok(found.clone())
                }
                None => Err(candidates.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")),
            }
        });

        match location {
            Ok(path) => Ok(path),
            Err(searched) => Err(Error::ToolchainNotFound { searched: searched.clone() }),
        }
    }
}

impl Compiler for Nvcc {
    fn compile(&self, command: &CompileCommand) -> Result<()> {
        let program = self.locate()?;
        run(program, command, self.timeout)
    }
}

/// Places `nvcc` may live, in priority order.
///
/// An explicit toolkit root is authoritative; otherwise `PATH` is searched and
/// the conventional install prefix is tried last.
fn candidates(cuda_home: Option<&Path>) -> Vec<PathBuf> {
    let exe = format!("nvcc{}", std::env::consts::EXE_SUFFIX);

    if let Some(home) = cuda_home {
        return vec![home.join("bin").join(exe)];
    }

    let mut paths: Vec<PathBuf> = std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).map(|dir| dir.join(&exe)).collect())
        .unwrap_or_default();
    paths.push(Path::new("/usr/local/cuda").join("bin").join(exe));
    paths
}

/// Run `program` with the arguments of `command`, capturing its output.
pub(crate) fn run(program: &Path, command: &CompileCommand, timeout: Option<Duration>) -> Result<()> {
    let rendered = command.render(program);
    tracing::info!(command = %rendered, "compiling kernel");

    let mut process = Command::new(program);
    process.args(command.args()).stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());
    // nvcc forks cicc, ptxas and the host compiler; a timeout must reach them too.
    #[cfg(unix)]
    std::os::unix::process::CommandExt::process_group(&mut process, 0);

    let started = Instant::now();
    let mut child = process.spawn().context(CompilerSpawnSnafu { command: rendered.clone() })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    // A deadline past the end of `Instant` is no deadline.
    let status = match timeout.and_then(|limit| started.checked_add(limit)) {
        Some(deadline) => wait_until(&mut child, deadline),
        None => child.wait().map(Some),
    }
    .context(CompilerSpawnSnafu { command: rendered.clone() })?;

    let Some(status) = status else {
        kill_tree(&mut child);
        let _ = child.wait();
        let seconds = started.elapsed().as_secs_f64();
        tracing::warn!(command = %rendered, seconds, "compiler timed out");
        return Err(Error::CompilationTimedOut { command: rendered, seconds });
    };

    let mut diagnostics = collect(stderr);
    let stdout = collect(stdout);
    if !stdout.is_empty() {
        if !diagnostics.is_empty() && !diagnostics.ends_with('\n') {
            diagnostics.push('\n');
        }
        diagnostics.push_str(&stdout);
    }

    if !status.success() {
        return Err(Error::CompilationFailed { command: rendered, status: status.to_string(), diagnostics });
    }

    tracing::debug!(elapsed_ms = started.elapsed().as_millis() as u64, "compilation finished");
    Ok(())
}

/// Wait for exit until `deadline`. `None` means the deadline passed first.
fn wait_until(child: &mut Child, deadline: Instant) -> std::io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

/// Kill the compiler and everything it spawned.
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    if let Ok(pgid) = libc::pid_t::try_from(child.id()) {
        // SAFETY: `kill` has no memory effects; the group was created at spawn
        // and its leader has not been reaped yet, so the id cannot be reused.
        unsafe {
            libc::kill(-pgid, libc::SIGKILL);
        }
    }
    let _ = child.kill();
}

/// Read a pipe to the end on its own thread so a chatty compiler cannot block
/// on a full pipe while we wait for it.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    })
}

fn collect(reader: Option<JoinHandle<Vec<u8>>>) -> String {
    reader.and_then(|handle| handle.join().ok()).map(|buf| String::from_utf8_lossy(&buf).into_owned()).unwrap_or_default()
}
