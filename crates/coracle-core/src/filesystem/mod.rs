//! Filesystem management for container isolation.
//!
//! Provides `OverlayFS` mounting and unmounting, mount-propagation
//! detachment, root switching, and the in-container `/proc` remount.

pub mod mount;
pub mod overlay;
