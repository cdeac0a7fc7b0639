//! Process creation and identity capability.

use std::io;
use std::os::unix::fs::PermissionsExt;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Stdio};

use nix::unistd::{getuid, User};

use crate::error::CmdrError;
use crate::Result;

/// Everything needed to start one child process.
#[derive(Debug, Clone)]
pub struct LaunchRequest<'a> {
    /// Resolved executable.
    pub program: &'a Path,
    /// Arguments after the program name.
    pub args: Vec<&'a str>,
    /// Working directory for the child.
    pub working_dir: Option<&'a Path>,
    /// User id the child should run as.
    pub uid: Option<u32>,
    /// Pipe stdout/stderr back to the caller instead of discarding them.
    pub capture_output: bool,
}

/// OS primitives used by the runner.
///
/// Split out so the identity checks can be exercised without superuser
/// privileges.
pub trait ProcessLauncher: Send + Sync {
    /// Whether the calling process runs with superuser privileges.
    fn is_superuser(&self) -> bool;

    /// Resolve a user name to its numeric id.
    fn lookup_uid(&self, user: &str) -> Result<u32>;

    /// Start the child. Stdin is always the null device.
    fn launch(&self, request: &LaunchRequest<'_>) -> io::Result<Child>;
}

/// Launcher backed by `std::process` and the system user database.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeLauncher;

impl ProcessLauncher for NativeLauncher {
    fn is_superuser(&self) -> bool {
        getuid().is_root()
    }

    fn lookup_uid(&self, user: &str) -> Result<u32> {
        let lookup_error = |reason: String| CmdrError::UserLookup {
            user: user.to_string(),
            reason,
        };
        if user.contains('\0') {
            return Err(lookup_error("name contains NUL".into()));
        }

        match User::from_name(user) {
            Ok(Some(entry)) => Ok(entry.uid.as_raw()),
            Ok(None) => Err(lookup_error("unknown user".into())),
            Err(errno) => Err(lookup_error(errno.to_string())),
        }
    }

    fn launch(&self, request: &LaunchRequest<'_>) -> io::Result<Child> {
        let mut command = std::process::Command::new(request.program);
        command.args(&request.args).stdin(Stdio::null());

        if request.capture_output {
            command.stdout(Stdio::piped()).stderr(Stdio::piped());
        } else {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }
        if let Some(dir) = request.working_dir {
            command.current_dir(dir);
        }
        if let Some(uid) = request.uid {
            command.uid(uid);
        }

        // The child's pipe ends are closed in this process once spawn returns,
        // so reads see EOF as soon as the child exits.
        command.spawn()
    }
}

/// Check impersonation rights and resolve `user` to a uid.
pub fn resolve_identity(
    launcher: &dyn ProcessLauncher,
    user: Option<&str>,
) -> Result<Option<u32>> {
    let Some(user) = user.filter(|u| !u.is_empty()) else {
        return Ok(None);
    };
    if !launcher.is_superuser() {
        return Err(CmdrError::MustBeRoot);
    }
    launcher.lookup_uid(user).map(Some)
}

/// Locate `program` the way a shell would.
///
/// Names containing `/` are used as given; bare names are searched in `PATH`,
/// with an empty entry meaning the current directory.
pub fn find_executable(program: &str) -> Result<PathBuf> {
    let not_found = || CmdrError::ExecutableNotFound(program.to_string());

    if program.is_empty() {
        return Err(not_found());
    }
    if program.contains('/') {
        let path = PathBuf::from(program);
        return if is_executable(&path) {
            Ok(path)
        } else {
            Err(not_found())
        };
    }

    let search = std::env::var_os("PATH").unwrap_or_default();
    std::env::split_paths(&search)
        .map(|dir| {
            if dir.as_os_str().is_empty() {
                PathBuf::from(".").join(program)
            } else {
                dir.join(program)
            }
        })
        .find(|candidate| is_executable(candidate))
        .ok_or_else(not_found)
}

fn is_executable(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}
