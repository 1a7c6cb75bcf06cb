//! The child-side isolation sequence.
//!
//! Runs in the forked child and, on success, never returns: the final step
//! replaces the process image with the requested command. The order is
//! load-bearing — unshare before propagation detach, both before chroot —
//! and must not be rearranged.

use std::convert::Infallible;
use std::path::Path;

use coracle_common::error::Result;
use coracle_core::{filesystem, namespace, process};

/// Isolates the calling process and executes `command` inside
/// `container_root`.
///
/// Sequence: unshare mount+UTS namespaces, set the container hostname,
/// mark the root mount tree recursively private, chroot into the overlay
/// mount point, remount `/proc`, then `execvp` the command.
///
/// Chrooting before the propagation detach would leave the container's
/// later mounts visible in the host mount table, so the filesystem steps
/// strictly follow the namespace steps.
///
/// # Errors
///
/// Any failed step aborts the sequence; the permission error from
/// `unshare(2)` carries the CAP_SYS_ADMIN remediation message.
pub fn isolate(
    command: &str,
    args: &[String],
    container_root: &Path,
    hostname: &str,
) -> Result<Infallible> {
    namespace::unshare_mount_and_uts()?;
    namespace::uts::set_hostname(hostname)?;

    filesystem::mount::make_mounts_private()?;
    filesystem::mount::enter_root(container_root)?;
    filesystem::mount::mount_proc()?;

    process::exec_command(command, args)
}
