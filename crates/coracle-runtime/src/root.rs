//! Overlay root construction for a single container.
//!
//! Each container owns three directories under `<container_dir>/<id>`:
//! `cow_rw` (writable upper layer), `cow_workdir` (overlay bookkeeping),
//! and `rootfs` (the merged mount point). The extracted image rootfs is the
//! shared read-only lower layer.

use std::path::{Path, PathBuf};

use coracle_common::constants::{
    CONTAINER_COW_RW_DIR, CONTAINER_COW_WORK_DIR, CONTAINER_ROOTFS_DIR,
};
use coracle_common::error::{CoracleError, Result};
use coracle_common::types::ContainerId;
use coracle_core::filesystem::overlay::{self, OverlayConfig};

/// The on-disk overlay layout of one container, plus its mount point.
#[derive(Debug)]
pub struct ContainerRoot {
    id: ContainerId,
    cow_rw: PathBuf,
    cow_workdir: PathBuf,
    mount_point: PathBuf,
}

impl ContainerRoot {
    /// Creates the container's directories under `container_dir`.
    ///
    /// Idempotent per directory: existing directories (and their contents,
    /// notably an already-populated upper layer) are kept as-is. Nothing is
    /// mounted yet.
    ///
    /// # Errors
    ///
    /// Returns [`CoracleError::Io`] if a directory cannot be created.
    pub fn prepare(id: &ContainerId, container_dir: &Path) -> Result<Self> {
        let base = container_dir.join(id.as_str());
        let root = Self {
            id: id.clone(),
            cow_rw: base.join(CONTAINER_COW_RW_DIR),
            cow_workdir: base.join(CONTAINER_COW_WORK_DIR),
            mount_point: base.join(CONTAINER_ROOTFS_DIR),
        };

        for dir in [&root.cow_rw, &root.cow_workdir, &root.mount_point] {
            std::fs::create_dir_all(dir).map_err(|e| CoracleError::Io {
                path: dir.clone(),
                source: e,
            })?;
        }

        tracing::debug!(id = %root.id, base = %base.display(), "container directories ready");
        Ok(root)
    }

    /// Prepares the directories and mounts the overlay in one step.
    ///
    /// The mount point becomes the merged copy-on-write view over
    /// `image_root` and is ready to serve as the isolated process root.
    ///
    /// # Errors
    ///
    /// Returns [`CoracleError::Io`] on directory creation failure or
    /// [`CoracleError::Mount`] if the overlay mount fails.
    pub fn build(id: &ContainerId, container_dir: &Path, image_root: &Path) -> Result<Self> {
        let root = Self::prepare(id, container_dir)?;
        root.mount(image_root)?;
        Ok(root)
    }

    /// Mounts the overlay with `image_root` as the read-only lower layer.
    ///
    /// # Errors
    ///
    /// Returns [`CoracleError::Mount`] if the mount syscall fails.
    pub fn mount(&self, image_root: &Path) -> Result<()> {
        overlay::mount_overlay(&OverlayConfig {
            lower_dir: image_root.to_path_buf(),
            upper_dir: self.cow_rw.clone(),
            work_dir: self.cow_workdir.clone(),
            merged_dir: self.mount_point.clone(),
        })
    }

    /// Lazily unmounts the overlay mount point.
    ///
    /// The container's directories stay on disk; reclaiming them is the
    /// container-store garbage collector's concern, not ours.
    ///
    /// # Errors
    ///
    /// Returns [`CoracleError::Mount`] if the unmount syscall fails.
    pub fn detach(&self) -> Result<()> {
        overlay::unmount_overlay(&self.mount_point)
    }

    /// The container this root belongs to.
    #[must_use]
    pub fn id(&self) -> &ContainerId {
        &self.id
    }

    /// The merged mount point exposed as the container's `/`.
    #[must_use]
    pub fn mount_point(&self) -> &Path {
        &self.mount_point
    }

    /// The writable upper layer directory.
    #[must_use]
    pub fn upper_dir(&self) -> &Path {
        &self.cow_rw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepare_creates_all_three_directories() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let id = ContainerId::generate();

        let root = ContainerRoot::prepare(&id, dir.path()).expect("prepare failed");
        let base = dir.path().join(id.as_str());
        assert!(base.join("cow_rw").is_dir());
        assert!(base.join("cow_workdir").is_dir());
        assert!(base.join("rootfs").is_dir());
        assert_eq!(root.mount_point(), base.join("rootfs"));
    }

    #[test]
    fn prepare_twice_keeps_upper_layer_contents() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let id = ContainerId::generate();

        let root = ContainerRoot::prepare(&id, dir.path()).expect("first prepare failed");
        let kept = root.upper_dir().join("kept.txt");
        std::fs::write(&kept, b"still here").expect("failed to write upper file");

        let again = ContainerRoot::prepare(&id, dir.path()).expect("second prepare failed");
        assert!(kept.exists(), "prepare must not wipe the upper layer");
        assert_eq!(again.upper_dir(), root.upper_dir());
    }

    #[test]
    fn distinct_ids_get_disjoint_directory_sets() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");

        let roots: Vec<_> = (0..8)
            .map(|_| {
                ContainerRoot::prepare(&ContainerId::generate(), dir.path())
                    .expect("prepare failed")
            })
            .collect();

        let mount_points: std::collections::HashSet<_> =
            roots.iter().map(|r| r.mount_point().to_path_buf()).collect();
        assert_eq!(mount_points.len(), roots.len());
    }
}
