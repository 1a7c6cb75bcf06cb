//! Mount utilities used inside the child's new mount namespace.
//!
//! Ordering matters: propagation must be detached after `unshare(2)` and
//! before the chroot, otherwise container mounts leak into the host mount
//! table.

use std::path::Path;

use coracle_common::error::{CoracleError, Result};

/// Recursively marks the root mount tree private.
///
/// Equivalent to `mount --make-rprivate /`; after this, mounts performed by
/// the calling process and its descendants are invisible to the host and to
/// sibling containers.
///
/// # Errors
///
/// Returns [`CoracleError::Mount`] if the `mount(2)` syscall fails.
#[cfg(target_os = "linux")]
pub fn make_mounts_private() -> Result<()> {
    use nix::mount::{MsFlags, mount};

    mount(
        None::<&str>,
        "/",
        None::<&str>,
        MsFlags::MS_PRIVATE | MsFlags::MS_REC,
        None::<&str>,
    )
    .map_err(|e| CoracleError::Mount {
        target: std::path::PathBuf::from("/"),
        source: std::io::Error::from_raw_os_error(e as i32),
    })?;

    tracing::debug!("root mount tree marked rprivate");
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error — mount propagation control requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn make_mounts_private() -> Result<()> {
    Err(CoracleError::Config {
        message: "Linux required for native container operations".into(),
    })
}

/// Changes the process root to `new_root` and the working directory to `/`.
///
/// Must only be called after the mount namespace has been unshared and
/// propagation detached; chrooting earlier would leave later mounts visible
/// to the host.
///
/// # Errors
///
/// Returns [`CoracleError::Io`] if `chroot(2)` or `chdir(2)` fails.
#[cfg(target_os = "linux")]
pub fn enter_root(new_root: &Path) -> Result<()> {
    nix::unistd::chroot(new_root).map_err(|e| CoracleError::Io {
        path: new_root.to_path_buf(),
        source: std::io::Error::from_raw_os_error(e as i32),
    })?;
    nix::unistd::chdir("/").map_err(|e| CoracleError::Io {
        path: std::path::PathBuf::from("/"),
        source: std::io::Error::from_raw_os_error(e as i32),
    })?;

    tracing::debug!(root = %new_root.display(), "entered container root");
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error — chroot-based isolation requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn enter_root(_new_root: &Path) -> Result<()> {
    Err(CoracleError::Config {
        message: "Linux required for native container operations".into(),
    })
}

/// Mounts a fresh procfs at `/proc` inside the new root.
///
/// Lets process-listing tools work inside the container. Without a PID
/// namespace this remains a soft boundary; the listing is correct, the
/// isolation is not claimed.
///
/// # Errors
///
/// Returns [`CoracleError::Mount`] if the `mount(2)` syscall fails.
#[cfg(target_os = "linux")]
pub fn mount_proc() -> Result<()> {
    use nix::mount::{MsFlags, mount};

    mount(
        Some("proc"),
        "/proc",
        Some("proc"),
        MsFlags::empty(),
        None::<&str>,
    )
    .map_err(|e| CoracleError::Mount {
        target: std::path::PathBuf::from("/proc"),
        source: std::io::Error::from_raw_os_error(e as i32),
    })?;

    tracing::debug!("procfs mounted");
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error — procfs requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn mount_proc() -> Result<()> {
    Err(CoracleError::Config {
        message: "Linux required for native container operations".into(),
    })
}
