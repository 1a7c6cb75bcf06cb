//! Process-image replacement.
//!
//! The final transition of the isolation sequence: the child's own image is
//! discarded in favor of the target command via `execvp(3)`. Never spawn a
//! sub-process here — the command must inherit the child's PID, namespaces,
//! and root exactly.

use std::convert::Infallible;
use std::ffi::CString;

use coracle_common::error::{CoracleError, Result};

/// Replaces the current process image with `command`, searched along
/// `$PATH`, passing `[command, args...]` as the argument vector.
///
/// On success this function does not return.
///
/// # Errors
///
/// Returns [`CoracleError::Exec`] if the command cannot be executed
/// (not found, not executable, or contains an interior NUL byte).
#[cfg(target_os = "linux")]
pub fn exec_command(command: &str, args: &[String]) -> Result<Infallible> {
    let program = to_cstring(command)?;
    let argv = std::iter::once(command)
        .chain(args.iter().map(String::as_str))
        .map(to_cstring)
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(command, ?args, "replacing process image");

    let err = match nix::unistd::execvp(&program, &argv) {
        Ok(never) => match never {},
        Err(e) => e,
    };
    Err(CoracleError::Exec {
        command: command.to_string(),
        source: std::io::Error::from_raw_os_error(err as i32),
    })
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error — the launcher only executes on Linux.
#[cfg(not(target_os = "linux"))]
pub fn exec_command(command: &str, _args: &[String]) -> Result<Infallible> {
    let _ = command;
    Err(CoracleError::Config {
        message: "Linux required for native container operations".into(),
    })
}

fn to_cstring(value: &str) -> Result<CString> {
    CString::new(value).map_err(|e| CoracleError::Exec {
        command: value.to_string(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
    })
}
