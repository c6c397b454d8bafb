// src/exec/reaper.rs

//! Supervised execution of a single command line with a deadline.

use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::exec::expand::{expand_env, split_command};

/// Pid reported when no process was started.
pub const NO_PID: i64 = -1;

/// Return code reported when the process could not be started, or ended
/// without an exit status (e.g. killed by a signal).
pub const SPAWN_FAILURE_CODE: i32 = 666;

/// Return code reported when the timeout fired before the process exited.
pub const TIMEOUT_CODE: i32 = 127;

/// How long to keep reading the output pipes once the outcome is decided.
///
/// Pipes close as soon as the process group is gone, unless a grandchild that
/// left the group inherited them; in that case we keep what has been captured
/// so far.
const OUTPUT_DRAIN_GRACE: Duration = Duration::from_millis(250);

/// Outcome of one command execution.
///
/// Serialized with PascalCase keys:
/// `{"OriginalCommand", "ExecutedCommand", "ReturnCode", "TimeoutReached",
/// "Pid", "Stdout", "Stderr"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Harvest {
    pub original_command: String,
    pub executed_command: String,
    pub return_code: i32,
    pub timeout_reached: bool,
    pub pid: i64,
    pub stdout: String,
    pub stderr: String,
}

impl Harvest {
    fn spawn_failure(original: &str, executed: &str, reason: String) -> Self {
        Self {
            original_command: original.to_string(),
            executed_command: executed.to_string(),
            return_code: SPAWN_FAILURE_CODE,
            timeout_reached: false,
            pid: NO_PID,
            stdout: String::new(),
            stderr: reason,
        }
    }
}

type OutputBuffer = Arc<Mutex<Vec<u8>>>;

/// Run `cmdline` with `timeout` and classify the outcome.
///
/// - `$VAR` / `${VAR}` are expanded first, then the line is split on
///   whitespace into program + arguments.
/// - Spawn failure: pid [`NO_PID`], code [`SPAWN_FAILURE_CODE`], error text
///   in stderr.
/// - Timeout: the process and the rest of its process group are killed,
///   code [`TIMEOUT_CODE`],
///   `timeout_reached = true`, output captured so far.
/// - Exit: the real exit code, or [`SPAWN_FAILURE_CODE`] when the process
///   ended without one.
///
/// A zero timeout fires immediately. Never retries.
pub async fn reap(cmdline: &str, timeout: Duration) -> Harvest {
    let executed = expand_env(cmdline);
    let argv = split_command(&executed);

    let Some((program, args)) = argv.split_first() else {
        warn!(cmd = %cmdline, "refusing to run an empty command line");
        return Harvest::spawn_failure(cmdline, &executed, "empty command line".to_string());
    };

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    // Own process group, so a timeout can take down the children too.
    #[cfg(unix)]
    cmd.process_group(0);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            warn!(cmd = %executed, error = %e, "failed to spawn process");
            return Harvest::spawn_failure(cmdline, &executed, e.to_string());
        }
    };

    let pid = child.id().map(i64::from).unwrap_or(NO_PID);
    info!(
        pid,
        cmd = %executed,
        timeout_ms = timeout.as_millis() as u64,
        "process started"
    );

    let stdout: OutputBuffer = Arc::default();
    let stderr: OutputBuffer = Arc::default();
    let readers = [
        spawn_reader(child.stdout.take(), Arc::clone(&stdout)),
        spawn_reader(child.stderr.take(), Arc::clone(&stderr)),
    ];

    // Either the process exits on its own, or the deadline passes first.
    let exited = tokio::select! {
        status = child.wait() => Some(status),
        _ = tokio::time::sleep(timeout) => None,
    };

    let (return_code, timeout_reached) = match exited {
        Some(Ok(status)) => {
            let code = exit_code(status);
            info!(pid, cmd = %executed, return_code = code, %status, "process exited");
            (code, false)
        }
        Some(Err(e)) => {
            error!(pid, cmd = %executed, error = %e, "waiting for process failed");
            (SPAWN_FAILURE_CODE, false)
        }
        None => {
            warn!(
                pid,
                cmd = %executed,
                timeout_ms = timeout.as_millis() as u64,
                "timeout reached; killing process"
            );
            kill_process_group(&mut child, pid).await;
            (TIMEOUT_CODE, true)
        }
    };

    settle_readers(readers, pid).await;

    Harvest {
        original_command: cmdline.to_string(),
        executed_command: executed,
        return_code,
        timeout_reached,
        pid,
        stdout: snapshot(&stdout).await,
        stderr: snapshot(&stderr).await,
    }
}

/// SIGKILL the whole process group led by `child`, then kill and reap the
/// child itself. Failures are logged, never returned.
async fn kill_process_group(child: &mut Child, pid: i64) {
    #[cfg(unix)]
    if let Some(raw) = child.id().and_then(|id| libc::pid_t::try_from(id).ok()) {
        // SAFETY: plain syscall on a pgid we created with `process_group(0)`.
        let rc = unsafe { libc::killpg(raw, libc::SIGKILL) };
        if rc != 0 {
            let e = std::io::Error::last_os_error();
            warn!(pid, error = %e, "failed to kill process group after timeout");
        }
    }

    if let Err(e) = child.kill().await {
        warn!(pid, error = %e, "failed to kill process after timeout");
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(SPAWN_FAILURE_CODE)
}

/// Copy everything readable from `pipe` into `buffer` until EOF.
fn spawn_reader<R>(pipe: Option<R>, buffer: OutputBuffer) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let Some(mut pipe) = pipe else {
            return;
        };
        let mut chunk = [0u8; 4096];
        loop {
            match pipe.read(&mut chunk).await {
                Ok(0) => break,
                Ok(n) => buffer.lock().await.extend_from_slice(&chunk[..n]),
                Err(e) => {
                    debug!(error = %e, "output pipe read failed");
                    break;
                }
            }
        }
    })
}

/// Give the readers a short grace period to reach EOF, then stop them.
async fn settle_readers(readers: [JoinHandle<()>; 2], pid: i64) {
    let aborts: Vec<_> = readers.iter().map(JoinHandle::abort_handle).collect();
    let drained = tokio::time::timeout(OUTPUT_DRAIN_GRACE, async move {
        for reader in readers {
            let _ = reader.await;
        }
    })
    .await;

    if drained.is_err() {
        debug!(pid, "output pipes still open; keeping what was captured");
        for abort in aborts {
            abort.abort();
        }
    }
}

async fn snapshot(buffer: &OutputBuffer) -> String {
    String::from_utf8_lossy(&buffer.lock().await).into_owned()
}
