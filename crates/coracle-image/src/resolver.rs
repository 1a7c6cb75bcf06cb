//! Image archive lookup and exactly-once rootfs extraction.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use coracle_common::constants::{IMAGE_ARCHIVE_SUFFIX, IMAGE_ROOTFS_DIR};
use coracle_common::error::{CoracleError, Result};
use coracle_common::types::ImageName;

/// Resolves an image name to its extracted filesystem root.
///
/// Locates `<image_dir>/<name>.tar` (or a gzip-compressed variant) and, if
/// `<image_dir>/<name>/rootfs` does not yet exist, extracts the archive into
/// it. An existing rootfs is reused as-is: the extracted tree is treated as
/// immutable and shared across all containers using the image.
///
/// # Errors
///
/// Returns [`CoracleError::ImageNotFound`] if no archive exists for the
/// name, or [`CoracleError::Io`] if extraction fails.
pub fn resolve(image: &ImageName, image_dir: &Path) -> Result<PathBuf> {
    let archive = locate_archive(image, image_dir)?;
    let image_root = image_dir.join(image.as_str()).join(IMAGE_ROOTFS_DIR);

    if image_root.exists() {
        tracing::debug!(image = %image, root = %image_root.display(), "rootfs already extracted");
        return Ok(image_root);
    }

    std::fs::create_dir_all(&image_root).map_err(|e| CoracleError::Io {
        path: image_root.clone(),
        source: e,
    })?;
    extract_archive(&archive, &image_root)?;

    tracing::info!(image = %image, root = %image_root.display(), "image extracted");
    Ok(image_root)
}

/// Finds the archive for an image, preferring the canonical plain `.tar`
/// name over compressed variants.
fn locate_archive(image: &ImageName, image_dir: &Path) -> Result<PathBuf> {
    let canonical = image_dir.join(format!("{}.{IMAGE_ARCHIVE_SUFFIX}", image.as_str()));
    if canonical.exists() {
        return Ok(canonical);
    }

    for suffix in ["tar.gz", "tgz"] {
        let candidate = image_dir.join(format!("{}.{suffix}", image.as_str()));
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    Err(CoracleError::ImageNotFound {
        name: image.as_str().to_string(),
        searched: canonical,
    })
}

/// Extracts the archive into `target`, discarding device entries.
///
/// Character and block device members must never be materialized on the
/// host: a device node extracted from an untrusted archive could expose
/// host devices inside the container. The overlay's `MS_NODEV` flag is the
/// second half of this defense.
fn extract_archive(archive_path: &Path, target: &Path) -> Result<()> {
    let file = File::open(archive_path).map_err(|e| CoracleError::Io {
        path: archive_path.to_path_buf(),
        source: e,
    })?;

    if is_gzip_archive(archive_path) {
        unpack_filtered(tar::Archive::new(flate2::read::GzDecoder::new(file)), target)
    } else {
        unpack_filtered(tar::Archive::new(file), target)
    }
}

fn unpack_filtered<R: Read>(mut archive: tar::Archive<R>, target: &Path) -> Result<()> {
    let io_err = |e| CoracleError::Io {
        path: target.to_path_buf(),
        source: e,
    };

    let mut skipped = 0_u64;
    for entry in archive.entries().map_err(io_err)? {
        let mut entry = entry.map_err(io_err)?;
        let kind = entry.header().entry_type();
        if matches!(kind, tar::EntryType::Char | tar::EntryType::Block) {
            skipped += 1;
            continue;
        }
        // unpack_in also rejects entries escaping the target directory.
        let _ = entry.unpack_in(target).map_err(io_err)?;
    }

    if skipped > 0 {
        tracing::warn!(skipped, "device entries discarded from image archive");
    }
    Ok(())
}

/// Determines whether the archive is gzip-compressed based on extension.
fn is_gzip_archive(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz") || ext.eq_ignore_ascii_case("tgz"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn append_file(builder: &mut tar::Builder<File>, path: &str, data: &[u8]) {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, path, data)
            .expect("failed to append data");
    }

    fn create_image_tar(image_dir: &Path, name: &str) -> PathBuf {
        let tar_path = image_dir.join(format!("{name}.tar"));
        let file = File::create(&tar_path).expect("failed to create tar file");
        let mut builder = tar::Builder::new(file);
        append_file(&mut builder, "etc/hostname", b"box\n");
        append_file(&mut builder, "bin/sh", b"#!/bin/sh\n");
        builder.finish().expect("failed to finish tar");
        tar_path
    }

    fn create_image_tar_with_devices(image_dir: &Path, name: &str) -> PathBuf {
        let tar_path = image_dir.join(format!("{name}.tar"));
        let file = File::create(&tar_path).expect("failed to create tar file");
        let mut builder = tar::Builder::new(file);
        append_file(&mut builder, "etc/hostname", b"box\n");

        for (path, kind) in [
            ("dev/null", tar::EntryType::Char),
            ("dev/sda", tar::EntryType::Block),
        ] {
            let mut header = tar::Header::new_gnu();
            header.set_entry_type(kind);
            header.set_size(0);
            header.set_mode(0o666);
            header.set_device_major(1).expect("failed to set major");
            header.set_device_minor(3).expect("failed to set minor");
            header.set_cksum();
            builder
                .append_data(&mut header, path, &[][..])
                .expect("failed to append device entry");
        }
        builder.finish().expect("failed to finish tar");
        tar_path
    }

    #[test]
    fn resolve_extracts_archive_contents() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let _ = create_image_tar(dir.path(), "alpine");

        let root = resolve(&ImageName::new("alpine"), dir.path()).expect("resolve failed");
        assert_eq!(root, dir.path().join("alpine").join("rootfs"));
        assert!(root.join("etc/hostname").exists());
        assert!(root.join("bin/sh").exists());
    }

    #[test]
    fn resolve_is_idempotent_and_skips_reextraction() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let _ = create_image_tar(dir.path(), "alpine");

        let root = resolve(&ImageName::new("alpine"), dir.path()).expect("first resolve failed");
        let sentinel = root.join("sentinel");
        std::fs::write(&sentinel, b"survives").expect("failed to write sentinel");

        let again = resolve(&ImageName::new("alpine"), dir.path()).expect("second resolve failed");
        assert_eq!(root, again);
        assert!(sentinel.exists(), "second resolve must not re-extract");
    }

    #[test]
    fn resolve_discards_device_entries() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let _ = create_image_tar_with_devices(dir.path(), "devimage");

        let root = resolve(&ImageName::new("devimage"), dir.path()).expect("resolve failed");
        assert!(root.join("etc/hostname").exists());
        assert!(!root.join("dev/null").exists());
        assert!(!root.join("dev/sda").exists());
    }

    #[test]
    fn resolve_missing_archive_is_image_not_found() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let result = resolve(&ImageName::new("ghost"), dir.path());
        match result {
            Err(CoracleError::ImageNotFound { name, searched }) => {
                assert_eq!(name, "ghost");
                assert_eq!(searched, dir.path().join("ghost.tar"));
            }
            _ => panic!("expected ImageNotFound"),
        }
    }

    #[test]
    fn resolve_accepts_gzip_archives() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let gz_path = dir.path().join("mini.tar.gz");
        let file = File::create(&gz_path).expect("failed to create tar.gz");
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        let data = b"gzipped rootfs";
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, "marker.txt", &data[..])
            .expect("failed to append data");
        let encoder = builder.into_inner().expect("failed to finish builder");
        let _ = encoder.finish().expect("failed to finish gzip");

        let root = resolve(&ImageName::new("mini"), dir.path()).expect("resolve failed");
        let content = std::fs::read_to_string(root.join("marker.txt")).expect("read failed");
        assert_eq!(content, "gzipped rootfs");
    }

    #[test]
    fn is_gzip_archive_detects_extensions() {
        assert!(is_gzip_archive(Path::new("alpine.tar.gz")));
        assert!(is_gzip_archive(Path::new("alpine.tgz")));
        assert!(!is_gzip_archive(Path::new("alpine.tar")));
    }
}
