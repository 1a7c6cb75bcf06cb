//! # coracle-image
//!
//! Base image resolution for the Coracle launcher.
//!
//! An image lives in the image store as a tar archive named `<name>.tar`
//! (optionally gzip-compressed as `<name>.tar.gz` / `<name>.tgz`). The
//! resolver extracts it into `<name>/rootfs` exactly once; the extracted
//! tree is then shared read-only by every container using that image.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod resolver;
