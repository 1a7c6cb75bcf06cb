//! # coracle-core
//!
//! Low-level Linux isolation primitives for the Coracle launcher.
//!
//! This crate provides safe abstractions over:
//! - **Namespaces**: mount and UTS isolation via `unshare(2)`.
//! - **Filesystem**: `OverlayFS` mounting, mount-propagation control,
//!   chroot, and the in-container `/proc` remount.
//! - **Process**: process-image replacement via `execvp(3)`.
//!
//! Every wrapper is attempted exactly once and fails fatally; retry and
//! recovery are deliberately absent from this layer.

pub mod filesystem;
pub mod namespace;
pub mod process;
