//! `OverlayFS` management for the container root filesystem.
//!
//! Layers a single read-only image rootfs under a writable per-container
//! upper directory, giving each container copy-on-write semantics over a
//! shared extracted image.

use std::path::{Path, PathBuf};

use coracle_common::error::{CoracleError, Result};

/// Configuration for an `OverlayFS` mount.
#[derive(Debug, Clone)]
pub struct OverlayConfig {
    /// Read-only lower layer (the extracted image rootfs).
    pub lower_dir: PathBuf,
    /// Writable upper layer directory.
    pub upper_dir: PathBuf,
    /// Work directory required by `OverlayFS`.
    pub work_dir: PathBuf,
    /// Final merged mount point.
    pub merged_dir: PathBuf,
}

impl OverlayConfig {
    /// Renders the `lowerdir=...,upperdir=...,workdir=...` mount options.
    #[must_use]
    pub fn mount_options(&self) -> String {
        format!(
            "lowerdir={},upperdir={},workdir={}",
            self.lower_dir.display(),
            self.upper_dir.display(),
            self.work_dir.display()
        )
    }
}

/// Mounts an `OverlayFS` with the given configuration.
///
/// The mount is performed with `MS_NODEV`, so device nodes are not honored
/// inside the merged tree. Defense-in-depth with the extraction-time device
/// filter in `coracle-image`.
///
/// # Errors
///
/// Returns [`CoracleError::Mount`] if the `mount(2)` syscall fails.
#[cfg(target_os = "linux")]
pub fn mount_overlay(config: &OverlayConfig) -> Result<()> {
    use nix::mount::{MsFlags, mount};

    let opts = config.mount_options();
    mount(
        Some("overlay"),
        &config.merged_dir,
        Some("overlay"),
        MsFlags::MS_NODEV,
        Some(opts.as_str()),
    )
    .map_err(|e| CoracleError::Mount {
        target: config.merged_dir.clone(),
        source: std::io::Error::from_raw_os_error(e as i32),
    })?;

    tracing::info!(merged = %config.merged_dir.display(), "overlayfs mounted");
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error — `OverlayFS` mounting requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn mount_overlay(_config: &OverlayConfig) -> Result<()> {
    Err(CoracleError::Config {
        message: "Linux required for native container operations".into(),
    })
}

/// Unmounts the overlay at the given mount point.
///
/// Uses `MNT_DETACH` so the entry leaves the mount table immediately even
/// if kernel-internal references linger, avoiding a teardown hang.
///
/// # Errors
///
/// Returns [`CoracleError::Mount`] if the `umount2(2)` syscall fails.
#[cfg(target_os = "linux")]
pub fn unmount_overlay(merged_dir: &Path) -> Result<()> {
    nix::mount::umount2(merged_dir, nix::mount::MntFlags::MNT_DETACH).map_err(|e| {
        CoracleError::Mount {
            target: merged_dir.to_path_buf(),
            source: std::io::Error::from_raw_os_error(e as i32),
        }
    })?;
    tracing::info!(path = %merged_dir.display(), "overlayfs unmounted");
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error — `OverlayFS` unmounting requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn unmount_overlay(_merged_dir: &Path) -> Result<()> {
    Err(CoracleError::Config {
        message: "Linux required for native container operations".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mount_options_encode_all_three_layers() {
        let config = OverlayConfig {
            lower_dir: PathBuf::from("/img/alpine/rootfs"),
            upper_dir: PathBuf::from("/ctr/abc/cow_rw"),
            work_dir: PathBuf::from("/ctr/abc/cow_workdir"),
            merged_dir: PathBuf::from("/ctr/abc/rootfs"),
        };
        assert_eq!(
            config.mount_options(),
            "lowerdir=/img/alpine/rootfs,upperdir=/ctr/abc/cow_rw,workdir=/ctr/abc/cow_workdir"
        );
    }
}
