//! UTS namespace isolation.
//!
//! Allows the container to carry its own hostname without affecting the
//! host. Only meaningful after [`super::unshare_mount_and_uts`] has run.

use coracle_common::error::Result;

/// Sets the hostname inside the new UTS namespace.
///
/// # Errors
///
/// Returns an error if `sethostname(2)` fails.
#[cfg(target_os = "linux")]
pub fn set_hostname(hostname: &str) -> Result<()> {
    use coracle_common::error::CoracleError;

    nix::unistd::sethostname(hostname).map_err(|e| CoracleError::Namespace {
        operation: "sethostname",
        source: std::io::Error::from_raw_os_error(e as i32),
    })?;

    tracing::debug!(hostname, "container hostname set");
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error — UTS namespaces require Linux.
#[cfg(not(target_os = "linux"))]
pub fn set_hostname(_hostname: &str) -> Result<()> {
    Err(coracle_common::error::CoracleError::Config {
        message: "Linux required for native container operations".into(),
    })
}
