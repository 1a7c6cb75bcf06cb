//! Global configuration model for the Coracle launcher.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::ImageName;

/// Configuration for a single container launch.
///
/// Passed to the supervisor at construction; the defaults reproduce the
/// launcher's conventional fixed layout under `/volumes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LauncherConfig {
    /// Image store root: holds `<name>.tar` archives and extracted
    /// `<name>/rootfs` trees.
    pub image_dir: PathBuf,
    /// Container store root: holds per-container overlay directories.
    pub container_dir: PathBuf,
    /// Base image to construct the container root from.
    pub image: ImageName,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from(crate::constants::DEFAULT_IMAGE_DIR),
            container_dir: PathBuf::from(crate::constants::DEFAULT_CONTAINER_DIR),
            image: ImageName::new(crate::constants::DEFAULT_IMAGE_NAME),
        }
    }
}
