//! Container launch sequence for the Coracle launcher.
//!
//! Composes the image resolver and the isolation primitives into the strict
//! launch order: resolve image, build overlay root, fork, isolate, exec,
//! wait, tear down the mount.

#![allow(unsafe_code)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod isolate;
pub mod root;
pub mod supervisor;
