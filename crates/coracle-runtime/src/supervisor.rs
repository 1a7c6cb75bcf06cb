//! Process supervision for a single container launch.
//!
//! The supervisor owns the container lifecycle: it resolves the image and
//! builds the overlay root before any process exists, forks the isolated
//! child, blocks on it, and tears the overlay mount down afterwards. The
//! child never cleans up after itself — on any isolation failure it prints
//! the error chain and exits immediately with the failure code.

use coracle_common::config::LauncherConfig;
use coracle_common::constants::{APP_NAME, CHILD_FAILURE_EXIT_CODE};
use coracle_common::error::{CoracleError, Result};
use coracle_common::types::ContainerId;

use crate::root::ContainerRoot;

/// Outcome of one supervised container run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Identity of the container that ran.
    pub container_id: ContainerId,
    /// PID the contained command ran under.
    pub pid: i32,
    /// Exit code of the contained command, if it exited normally.
    pub exit_code: Option<i32>,
    /// Signal number that terminated the contained command, if any.
    pub signal: Option<i32>,
}

impl RunReport {
    /// Exit code the launcher process itself should report.
    ///
    /// By default the launcher exits 0 whenever supervision completed,
    /// regardless of the contained command's own status — that status is
    /// only reported, not adopted. With `propagate` the contained exit code
    /// becomes the launcher's own (`128 + signal` for signal deaths).
    #[must_use]
    pub fn launcher_exit_code(&self, propagate: bool) -> i32 {
        if !propagate {
            return 0;
        }
        self.exit_code
            .unwrap_or_else(|| self.signal.map_or(CHILD_FAILURE_EXIT_CODE, |s| 128 + s))
    }

    /// One-line operator-facing summary of the run.
    #[must_use]
    pub fn describe(&self) -> String {
        match (self.exit_code, self.signal) {
            (Some(code), _) => format!("{} exited with status {code}", self.pid),
            (None, Some(signal)) => format!("{} killed by signal {signal}", self.pid),
            (None, None) => format!("{} terminated", self.pid),
        }
    }
}

/// Runs one command to completion inside a fresh container.
#[derive(Debug)]
pub struct Supervisor {
    config: LauncherConfig,
}

impl Supervisor {
    /// Creates a supervisor with the given launcher configuration.
    #[must_use]
    pub const fn new(config: LauncherConfig) -> Self {
        Self { config }
    }

    /// Launches `command` with `args` inside a fresh container and waits
    /// for it to terminate.
    ///
    /// Image resolution and overlay construction happen before the fork, so
    /// a failure there aborts the invocation with no child and no orphaned
    /// mount. The overlay is lazily unmounted after the wait whether the
    /// child succeeded or failed.
    ///
    /// # Errors
    ///
    /// Returns any pre-spawn resolution or mount error, a wait failure, or
    /// a teardown unmount failure.
    #[cfg(target_os = "linux")]
    pub fn run(&self, command: &str, args: &[String]) -> Result<RunReport> {
        use nix::sys::wait::waitpid;
        use nix::unistd::{ForkResult, fork};

        let id = ContainerId::generate();
        tracing::info!(container = %id, command, "launching container");

        let image_root = coracle_image::resolver::resolve(&self.config.image, &self.config.image_dir)?;
        let root = ContainerRoot::build(&id, &self.config.container_dir, &image_root)?;

        // SAFETY: the supervisor is single-threaded; the child only runs
        // async-signal-safe-ish setup before exec or _exit-style termination.
        let child = match unsafe { fork() }.map_err(|e| CoracleError::Wait {
            pid: 0,
            source: std::io::Error::from_raw_os_error(e as i32),
        })? {
            ForkResult::Child => {
                let err = match crate::isolate::isolate(command, args, root.mount_point(), id.short())
                {
                    Ok(never) => match never {},
                    Err(e) => e,
                };
                report_child_failure(&err);
                // The parent owns mount teardown; nothing to clean up here.
                std::process::exit(CHILD_FAILURE_EXIT_CODE);
            }
            ForkResult::Parent { child } => child,
        };

        // Single blocking wait on the specific child. No timeout, no
        // cancellation: a hung contained command blocks us indefinitely.
        let wait_result = waitpid(child, None).map_err(|e| CoracleError::Wait {
            pid: child.as_raw(),
            source: std::io::Error::from_raw_os_error(e as i32),
        });
        let detach_result = root.detach();

        let status = wait_result?;
        detach_result?;

        let report = report_from_status(&id, &status);
        tracing::info!(container = %id, pid = report.pid, "container finished");
        Ok(report)
    }

    /// Stub for non-Linux platforms.
    ///
    /// # Errors
    ///
    /// Always returns an error — container launches require Linux.
    #[cfg(not(target_os = "linux"))]
    pub fn run(&self, _command: &str, _args: &[String]) -> Result<RunReport> {
        Err(CoracleError::Config {
            message: "Linux required for native container operations".into(),
        })
    }
}

/// Prints the full error chain to stderr from the failed child.
#[cfg(target_os = "linux")]
fn report_child_failure(err: &CoracleError) {
    eprintln!("{APP_NAME}: container setup failed: {err}");
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
}

/// Maps a raw wait status onto a [`RunReport`].
#[cfg(target_os = "linux")]
fn report_from_status(id: &ContainerId, status: &nix::sys::wait::WaitStatus) -> RunReport {
    use nix::sys::wait::WaitStatus;

    let (pid, exit_code, signal) = match *status {
        WaitStatus::Exited(pid, code) => (pid.as_raw(), Some(code), None),
        WaitStatus::Signaled(pid, signal, _core_dumped) => {
            (pid.as_raw(), None, Some(signal as i32))
        }
        WaitStatus::Stopped(pid, _)
        | WaitStatus::PtraceEvent(pid, _, _)
        | WaitStatus::PtraceSyscall(pid)
        | WaitStatus::Continued(pid) => (pid.as_raw(), None, None),
        WaitStatus::StillAlive => (0, None, None),
    };

    RunReport {
        container_id: id.clone(),
        pid,
        exit_code,
        signal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(exit_code: Option<i32>, signal: Option<i32>) -> RunReport {
        RunReport {
            container_id: ContainerId::generate(),
            pid: 4242,
            exit_code,
            signal,
        }
    }

    #[test]
    fn launcher_exit_is_zero_without_propagation() {
        assert_eq!(report(Some(7), None).launcher_exit_code(false), 0);
        assert_eq!(report(None, Some(9)).launcher_exit_code(false), 0);
    }

    #[test]
    fn launcher_exit_propagates_contained_status() {
        assert_eq!(report(Some(7), None).launcher_exit_code(true), 7);
        assert_eq!(report(Some(0), None).launcher_exit_code(true), 0);
    }

    #[test]
    fn launcher_exit_propagates_signal_deaths() {
        assert_eq!(report(None, Some(9)).launcher_exit_code(true), 137);
        assert_eq!(report(None, None).launcher_exit_code(true), 1);
    }

    #[test]
    fn describe_reports_pid_and_status() {
        assert_eq!(report(Some(7), None).describe(), "4242 exited with status 7");
        assert_eq!(report(None, Some(9)).describe(), "4242 killed by signal 9");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn report_from_status_maps_normal_exit() {
        use nix::sys::wait::WaitStatus;
        use nix::unistd::Pid;

        let id = ContainerId::generate();
        let r = report_from_status(&id, &WaitStatus::Exited(Pid::from_raw(100), 7));
        assert_eq!(r.pid, 100);
        assert_eq!(r.exit_code, Some(7));
        assert_eq!(r.signal, None);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn report_from_status_maps_signal_death() {
        use nix::sys::signal::Signal;
        use nix::sys::wait::WaitStatus;
        use nix::unistd::Pid;

        let id = ContainerId::generate();
        let r = report_from_status(
            &id,
            &WaitStatus::Signaled(Pid::from_raw(100), Signal::SIGKILL, false),
        );
        assert_eq!(r.pid, 100);
        assert_eq!(r.exit_code, None);
        assert_eq!(r.signal, Some(9));
    }
}
