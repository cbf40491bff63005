//! Privileged helper invocation.
//!
//! All hardware mutation goes through `pkexec wattsaver-helper.sh <verb>
//! <args…>`. This module never writes sysfs itself — it only speaks the
//! helper's narrow command contract and maps its exit conventions onto a
//! typed failure enum.

use std::env;
use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::system::cpu::CpuCapabilities;

/// System-wide helper install location, then exe-adjacent for dev runs.
const HELPER_NAME: &str = "wattsaver-helper.sh";
const HELPER_SYSTEM_PATH: &str = "/opt/wattsaver/wattsaver-helper.sh";

/// Hard ceiling on a helper run; a pkexec prompt left unanswered counts
/// as a timeout rather than hanging the caller.
const HELPER_TIMEOUT: Duration = Duration::from_secs(30);

/// pkexec exit status when the user dismisses the authentication dialog.
const PKEXEC_DISMISSED: i32 = 126;

/// Custom undervolt bounds (mV) accepted before reaching the helper.
pub const UNDERVOLT_MIN_MV: i64 = -200;
pub const UNDERVOLT_MAX_MV: i64 = 0;

/// Why a helper invocation failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelperError {
    NotFound,
    AuthDismissed,
    Timeout,
    Command(String),
}

impl fmt::Display for HelperError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HelperError::NotFound => write!(f, "Helper script not found"),
            HelperError::AuthDismissed => write!(f, "Authentication dismissed"),
            HelperError::Timeout => write!(f, "Operation timed out"),
            HelperError::Command(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for HelperError {}

/// Locate the helper script: explicit config override, the system install
/// path, then next to the running executable.
pub fn find_helper(override_path: Option<&Path>) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(p) = override_path {
        candidates.push(p.to_path_buf());
    }
    candidates.push(PathBuf::from(HELPER_SYSTEM_PATH));
    if let Ok(exe) = env::current_exe() {
        if let Some(dir) = exe.parent() {
            candidates.push(dir.join(HELPER_NAME));
        }
    }
    candidates.into_iter().find(|p| is_executable(p))
}

fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    match path.metadata() {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

/// True when `name` resolves to an executable somewhere on PATH. Gates the
/// undervolt and GPU menu sections.
pub fn has_command(name: &str) -> bool {
    let Some(path_var) = env::var_os("PATH") else {
        return false;
    };
    env::split_paths(&path_var).any(|dir| is_executable(&dir.join(name)))
}

/// Run the helper with a verb and arguments. Ok carries trimmed stdout.
pub fn run_helper(
    override_path: Option<&Path>,
    verb: &str,
    args: &[String],
) -> Result<String, HelperError> {
    let helper = find_helper(override_path).ok_or(HelperError::NotFound)?;

    let mut cmd = Command::new("pkexec");
    cmd.arg(&helper).arg(verb).args(args);

    let output = match run_with_timeout(&mut cmd, HELPER_TIMEOUT) {
        Ok(Some(out)) => out,
        Ok(None) => return Err(HelperError::Timeout),
        Err(e) => return Err(HelperError::Command(e.to_string())),
    };

    if output.status.success() {
        return Ok(output.stdout.trim().to_string());
    }
    if output.status.code() == Some(PKEXEC_DISMISSED) {
        return Err(HelperError::AuthDismissed);
    }
    let msg = if output.stderr.trim().is_empty() {
        output.stdout.trim().to_string()
    } else {
        output.stderr.trim().to_string()
    };
    Err(HelperError::Command(msg))
}

pub fn set_freq(override_path: Option<&Path>, khz: i64) -> Result<String, HelperError> {
    run_helper(override_path, "set-freq", &[khz.to_string()])
}

pub fn set_undervolt(override_path: Option<&Path>, mv: i64) -> Result<String, HelperError> {
    run_helper(override_path, "set-undervolt", &[mv.to_string()])
}

pub fn set_gpu(override_path: Option<&Path>, mode: &str) -> Result<String, HelperError> {
    run_helper(override_path, "set-gpu", &[mode.to_string()])
}

/// Range-check a user-entered frequency against the detected hardware span.
pub fn validate_freq_khz(khz: i64, caps: &CpuCapabilities) -> Result<(), String> {
    if khz < caps.hw_min_khz || khz > caps.hw_max_khz {
        return Err(format!(
            "Frequency must be between {:.2} and {:.2} GHz",
            caps.hw_min_khz as f64 / 1_000_000.0,
            caps.hw_max_khz as f64 / 1_000_000.0,
        ));
    }
    Ok(())
}

/// Range-check a user-entered undervolt offset (0 to -200 mV).
pub fn validate_undervolt_mv(mv: i64) -> Result<(), String> {
    if !(UNDERVOLT_MIN_MV..=UNDERVOLT_MAX_MV).contains(&mv) {
        return Err(format!(
            "Undervolt offset must be between {} and {} mV",
            UNDERVOLT_MIN_MV, UNDERVOLT_MAX_MV
        ));
    }
    Ok(())
}

/// Captured output of a bounded command run.
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Run a command with a hard deadline. `Ok(None)` means the deadline passed
/// and the child was killed. Pipes are drained on reader threads so a chatty
/// child can't deadlock the wait loop on a full pipe buffer.
pub fn run_with_timeout(
    cmd: &mut Command,
    timeout: Duration,
) -> io::Result<Option<CommandOutput>> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = cmd.spawn()?;

    let stdout_reader = spawn_pipe_reader(child.stdout.take());
    let stderr_reader = spawn_pipe_reader(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(Duration::from_millis(50));
    };

    let stdout = stdout_reader.join().unwrap_or_default();
    let stderr = stderr_reader.join().unwrap_or_default();
    Ok(Some(CommandOutput {
        status,
        stdout,
        stderr,
    }))
}

fn spawn_pipe_reader<R: Read + Send + 'static>(
    pipe: Option<R>,
) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = String::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_string(&mut buf);
        }
        buf
    })
}
