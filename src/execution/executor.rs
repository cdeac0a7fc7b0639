//! Command execution engine.

use std::io::{self, Read};
use std::path::Path;
use std::process::Child;
use std::sync::Arc;
use std::thread::ScopedJoinHandle;
use std::time::{Duration, SystemTime};

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::command::CommandTemplate;
use super::launcher::{find_executable, resolve_identity, LaunchRequest, NativeLauncher, ProcessLauncher};
use super::result::Invocation;
use crate::error::{CmdrError, RunError};
use crate::session::{SessionCounter, SessionId};
use crate::template::{render_in, Param};
use crate::Result;

/// Handle to an asynchronous run whose result is still pending.
#[derive(Debug)]
pub struct Launched {
    /// Identifier issued to the run.
    pub session_id: SessionId,
    /// Process ID of the child, usable for external signalling.
    pub pid: u32,
    /// Task waiting on the child; resolves once the result has been sent.
    pub handle: JoinHandle<Result<()>>,
}

impl Launched {
    /// Wait for the waiting task, surfacing stream or delivery failures.
    pub async fn join(self) -> Result<()> {
        self.handle
            .await
            .map_err(|e| CmdrError::ExecutionFailed(e.to_string()))?
    }
}

/// Runs command templates as child processes.
///
/// Clones share the same session counter.
#[derive(Clone)]
pub struct Runner {
    counter: Arc<SessionCounter>,
    launcher: Arc<dyn ProcessLauncher>,
}

impl Runner {
    /// Create a runner using the native launcher and a fresh counter.
    pub fn new() -> Self {
        Self::with_launcher(NativeLauncher)
    }

    /// Create a runner with a custom launcher.
    pub fn with_launcher(launcher: impl ProcessLauncher + 'static) -> Self {
        Self {
            counter: Arc::new(SessionCounter::new()),
            launcher: Arc::new(launcher),
        }
    }

    /// Share an existing counter with this runner.
    pub fn with_counter(mut self, counter: Arc<SessionCounter>) -> Self {
        self.counter = counter;
        self
    }

    /// The counter issuing this runner's session ids.
    pub fn counter(&self) -> &SessionCounter {
        &self.counter
    }

    /// Run `template` and wait for it to finish.
    ///
    /// A nonzero exit status is not an error. On failure the partially
    /// populated invocation is returned inside the error.
    pub fn run(
        &self,
        template: &CommandTemplate,
        params: &[Param],
    ) -> std::result::Result<Invocation, RunError> {
        let mut invocation = Invocation::default();
        let outcome = self
            .start(template, params, &mut invocation)
            .and_then(|child| finish(child, &mut invocation));

        match outcome {
            Ok(()) => Ok(invocation),
            Err(error) => {
                warn!(path = %template.path, %error, "command failed");
                Err(RunError::new(invocation, error))
            }
        }
    }

    /// Start `template` and deliver its result on `tx` once it finishes.
    ///
    /// Exactly one invocation is sent per call. If the command cannot be
    /// started, the partial invocation is sent and the error returned.
    pub async fn run_async(
        &self,
        template: &CommandTemplate,
        params: &[Param],
        tx: mpsc::Sender<Invocation>,
    ) -> Result<Launched> {
        let mut invocation = Invocation::default();
        let child = match self.start(template, params, &mut invocation) {
            Ok(child) => child,
            Err(error) => {
                warn!(path = %template.path, %error, "command failed to start");
                if tx.send(invocation).await.is_err() {
                    debug!("result receiver dropped");
                }
                return Err(error);
            }
        };

        let session_id = invocation.session_id;
        let pid = invocation.pid;
        let handle = tokio::task::spawn_blocking(move || {
            let outcome = finish(child, &mut invocation);
            if let Err(ref error) = outcome {
                warn!(sid = %invocation.session_id, %error, "command failed while waiting");
            }
            let delivered = tx
                .blocking_send(invocation)
                .map_err(|_| CmdrError::ChannelClosed);
            outcome.and(delivered)
        });

        Ok(Launched {
            session_id,
            pid,
            handle,
        })
    }

    /// Run `template` according to its `asynchronous` flag, delivering the
    /// result on `tx` either way.
    ///
    /// Synchronous templates are waited on from the blocking pool before this
    /// returns `None`.
    pub async fn submit(
        &self,
        template: &CommandTemplate,
        params: &[Param],
        tx: mpsc::Sender<Invocation>,
    ) -> Result<Option<Launched>> {
        if template.asynchronous {
            return self.run_async(template, params, tx).await.map(Some);
        }

        let runner = self.clone();
        let template = template.clone();
        let params = params.to_vec();
        let ran = tokio::task::spawn_blocking(move || runner.run(&template, &params))
            .await
            .map_err(|e| CmdrError::ExecutionFailed(e.to_string()))?;

        let (invocation, outcome) = match ran {
            Ok(invocation) => (invocation, Ok(None)),
            Err(failed) => (failed.invocation, Err(failed.error)),
        };
        let sent = tx.send(invocation).await;
        let launched = outcome?;
        sent.map_err(|_| CmdrError::ChannelClosed)?;
        Ok(launched)
    }

    /// Start the template's executable detached and return its pid.
    ///
    /// Parameters and the argument template are not used, output goes to the
    /// null device, and nothing waits for the result. A reaper thread collects
    /// the exit status.
    pub fn background(&self, template: &CommandTemplate) -> Result<u32> {
        let program = find_executable(&template.path)?;
        let uid = resolve_identity(self.launcher.as_ref(), template.user.as_deref())?;
        let request = LaunchRequest {
            program: &program,
            args: Vec::new(),
            working_dir: template.working_dir.as_deref(),
            uid,
            capture_output: false,
        };

        let mut child = self
            .launcher
            .launch(&request)
            .map_err(|source| spawn_error(&program, source))?;
        let pid = child.id();
        info!(pid, path = %program.display(), "started background process");

        std::thread::spawn(move || match child.wait() {
            Ok(status) => debug!(pid, %status, "background process exited"),
            Err(error) => warn!(pid, %error, "failed to reap background process"),
        });
        Ok(pid)
    }

    /// Resolve, render and spawn; everything up to the wait.
    fn start(
        &self,
        template: &CommandTemplate,
        params: &[Param],
        invocation: &mut Invocation,
    ) -> Result<Child> {
        let program = find_executable(&template.path)?;
        let base = template.working_dir.as_deref().unwrap_or(Path::new("."));
        let text = render_in(&template.args, params, base)?;
        debug!(path = %program.display(), args = %text, "rendered command");

        invocation.command_line = program.display().to_string();
        if !text.is_empty() {
            invocation.command_line.push(' ');
            invocation.command_line.push_str(&text);
        }

        let uid = resolve_identity(self.launcher.as_ref(), template.user.as_deref())?;
        let request = LaunchRequest {
            program: &program,
            args: text.split_whitespace().collect(),
            working_dir: template.working_dir.as_deref(),
            uid,
            capture_output: true,
        };

        invocation.session_id = self.counter.next()?;
        invocation.started = Some(SystemTime::now());
        let child = self
            .launcher
            .launch(&request)
            .map_err(|source| spawn_error(&program, source))?;
        invocation.pid = child.id();

        info!(
            sid = %invocation.session_id,
            pid = invocation.pid,
            cmd = %invocation.command_line,
            "spawned command"
        );
        Ok(child)
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

/// Send SIGTERM to a process started by a runner.
///
/// The runner has no timeout of its own; callers needing a deadline race the
/// result against a timer and terminate the recorded pid. Returns `false` when
/// the process had already exited and been reaped.
pub fn terminate(pid: u32) -> Result<bool> {
    let pid = i32::try_from(pid)
        .map_err(|_| CmdrError::Io(io::Error::from(io::ErrorKind::InvalidInput)))?;
    match kill(Pid::from_raw(pid), Signal::SIGTERM) {
        Ok(()) => Ok(true),
        Err(Errno::ESRCH) => Ok(false),
        Err(errno) => Err(io::Error::from(errno).into()),
    }
}

fn spawn_error(program: &Path, source: io::Error) -> CmdrError {
    CmdrError::Spawn {
        path: program.display().to_string(),
        source,
    }
}

/// Status and resource usage of a reaped child.
struct ExitInfo {
    pid: u32,
    exit_code: i32,
    user_time: Duration,
    system_time: Duration,
}

/// Wait for the child while draining both pipes, then fill in the record.
fn finish(mut child: Child, invocation: &mut Invocation) -> Result<()> {
    let pid = child.id();
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    // Both pipes are drained while waiting so a chatty child cannot block on
    // a full pipe buffer.
    let (exit, out, err) = std::thread::scope(|scope| {
        let out = scope.spawn(move || read_stream(stdout));
        let err = scope.spawn(move || read_stream(stderr));
        let exit = wait_with_usage(pid);
        (exit, join_reader(out), join_reader(err))
    });
    invocation.finished = Some(SystemTime::now());

    let exit = exit?;
    invocation.pid = exit.pid;
    invocation.exit_code = exit.exit_code;
    invocation.user_time = exit.user_time;
    invocation.system_time = exit.system_time;
    invocation.stdout = out?;
    invocation.stderr = err?;

    debug!(
        sid = %invocation.session_id,
        pid = invocation.pid,
        rc = invocation.exit_code,
        elapsed = ?invocation.wall_time(),
        "command finished"
    );
    Ok(())
}

fn read_stream<R: Read>(stream: Option<R>) -> io::Result<String> {
    let mut buf = Vec::new();
    if let Some(mut stream) = stream {
        stream.read_to_end(&mut buf)?;
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn join_reader(handle: ScopedJoinHandle<'_, io::Result<String>>) -> Result<String> {
    handle
        .join()
        .map_err(|_| CmdrError::ExecutionFailed("output reader panicked".into()))?
        .map_err(CmdrError::Io)
}

fn wait_with_usage(pid: u32) -> io::Result<ExitInfo> {
    let mut status: libc::c_int = 0;
    // SAFETY: rusage is plain old data; all-zero is a valid value.
    let mut usage: libc::rusage = unsafe { std::mem::zeroed() };

    loop {
        // SAFETY: both out-pointers refer to live locals, and `pid` is our own
        // unreaped child.
        let reaped = unsafe { libc::wait4(pid as libc::pid_t, &mut status, 0, &mut usage) };
        if reaped >= 0 {
            return Ok(ExitInfo {
                pid: reaped as u32,
                exit_code: exit_code(status),
                user_time: timeval_duration(usage.ru_utime),
                system_time: timeval_duration(usage.ru_stime),
            });
        }

        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(err);
        }
    }
}

fn exit_code(status: libc::c_int) -> i32 {
    if libc::WIFEXITED(status) {
        libc::WEXITSTATUS(status)
    } else {
        -1
    }
}

fn timeval_duration(tv: libc::timeval) -> Duration {
    Duration::from_secs(tv.tv_sec.max(0) as u64) + Duration::from_micros(tv.tv_usec.max(0) as u64)
}
