//! System-wide constants and default paths.

/// Default image store root (archives and extracted rootfs trees).
pub const DEFAULT_IMAGE_DIR: &str = "/volumes/images";

/// Default container store root (per-container overlay directories).
pub const DEFAULT_CONTAINER_DIR: &str = "/volumes/containers";

/// Default base image name.
pub const DEFAULT_IMAGE_NAME: &str = "alpine";

/// File extension of image archives in the store.
pub const IMAGE_ARCHIVE_SUFFIX: &str = "tar";

/// Directory name of an image's extracted filesystem tree.
pub const IMAGE_ROOTFS_DIR: &str = "rootfs";

/// Upper (writable) overlay layer directory inside a container.
pub const CONTAINER_COW_RW_DIR: &str = "cow_rw";

/// Overlay work directory inside a container. Internal bookkeeping of the
/// overlay driver; never inspected by us.
pub const CONTAINER_COW_WORK_DIR: &str = "cow_workdir";

/// Overlay mount point directory inside a container.
pub const CONTAINER_ROOTFS_DIR: &str = "rootfs";

/// Exit code a child reports when isolation or exec fails.
pub const CHILD_FAILURE_EXIT_CODE: i32 = 1;

/// Application name used in CLI output.
pub const APP_NAME: &str = "coracle";
