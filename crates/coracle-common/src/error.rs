//! Unified error types for the Coracle workspace.
//!
//! Every failure in the launch sequence is fatal and attempted exactly once;
//! the variants here exist to tell the operator *which* privileged step
//! failed, not to drive retry logic.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum CoracleError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// No archive for the named image exists in the image store.
    #[error("unable to locate image {name}: no archive at {searched}")]
    ImageNotFound {
        /// Name of the requested image.
        name: String,
        /// Archive path that was checked.
        searched: PathBuf,
    },

    /// A mount or unmount syscall failed.
    #[error("mount operation failed at {target}: {source}")]
    Mount {
        /// Mount target path.
        target: PathBuf,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// A namespace syscall failed for a reason other than privilege.
    #[error("namespace operation failed: {operation}: {source}")]
    Namespace {
        /// The syscall that failed.
        operation: &'static str,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// A permission or capability error.
    #[error("permission denied: {message}")]
    PermissionDenied {
        /// Description of the denied operation, including remediation.
        message: String,
    },

    /// Waiting on the container child process failed.
    #[error("failed to wait for child {pid}: {source}")]
    Wait {
        /// PID of the child being waited on.
        pid: i32,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// Replacing the process image with the target command failed.
    #[error("failed to exec {command}: {source}")]
    Exec {
        /// The command that could not be executed.
        command: String,
        /// Underlying OS error (typically ENOENT or EACCES).
        source: std::io::Error,
    },
}

impl CoracleError {
    /// Builds the operator-facing error for an `unshare(2)` call rejected
    /// for lack of privilege.
    ///
    /// The message names the required capability and the two common
    /// remedies; surfacing it verbatim is part of the launcher's contract.
    #[must_use]
    pub fn unshare_permission() -> Self {
        Self::PermissionDenied {
            message: "unshare(2) with namespace flags requires the CAP_SYS_ADMIN \
                      capability. Run as root (sudo), or grant the capability to \
                      the execution environment (e.g. `--privileged` under Docker)"
                .to_string(),
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, CoracleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unshare_permission_names_capability_and_remedies() {
        let message = CoracleError::unshare_permission().to_string();
        assert!(message.contains("CAP_SYS_ADMIN"));
        assert!(message.contains("sudo"));
        assert!(message.contains("--privileged"));
    }

    #[test]
    fn image_not_found_reports_searched_path() {
        let err = CoracleError::ImageNotFound {
            name: "alpine".into(),
            searched: PathBuf::from("/volumes/images/alpine.tar"),
        };
        let message = err.to_string();
        assert!(message.contains("alpine"));
        assert!(message.contains("/volumes/images/alpine.tar"));
    }
}
