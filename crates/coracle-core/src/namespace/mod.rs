//! Linux namespace management for container isolation.
//!
//! The launcher isolates exactly two namespace types: mount (private
//! filesystem view) and UTS (private hostname). PID, network, user, and IPC
//! isolation are out of scope.

pub mod uts;

use coracle_common::error::Result;

/// Requests new mount and UTS namespaces for the calling process.
///
/// # Errors
///
/// On `EPERM` returns
/// [`coracle_common::error::CoracleError::PermissionDenied`] carrying the
/// CAP_SYS_ADMIN remediation message required by the launch contract; any
/// other `unshare(2)` errno maps to
/// [`coracle_common::error::CoracleError::Namespace`].
#[cfg(target_os = "linux")]
pub fn unshare_mount_and_uts() -> Result<()> {
    use nix::sched::{CloneFlags, unshare};

    unshare(CloneFlags::CLONE_NEWNS | CloneFlags::CLONE_NEWUTS).map_err(unshare_error)?;

    tracing::debug!("mount and UTS namespaces unshared");
    Ok(())
}

/// Maps an `unshare(2)` errno onto the launch error taxonomy.
///
/// Only the missing-capability case is a `PermissionDenied`; anything else
/// (EINVAL, ENOMEM, ...) is an ordinary namespace failure.
#[cfg(target_os = "linux")]
fn unshare_error(errno: nix::errno::Errno) -> coracle_common::error::CoracleError {
    use coracle_common::error::CoracleError;

    if errno == nix::errno::Errno::EPERM {
        CoracleError::unshare_permission()
    } else {
        CoracleError::Namespace {
            operation: "unshare",
            source: std::io::Error::from_raw_os_error(errno as i32),
        }
    }
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error — namespaces require Linux.
#[cfg(not(target_os = "linux"))]
pub fn unshare_mount_and_uts() -> Result<()> {
    Err(coracle_common::error::CoracleError::Config {
        message: "Linux required for native container operations".into(),
    })
}
