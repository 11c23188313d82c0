//! Release of stored photo files after issue deletion.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Releases the photo behind an opaque reference once its issue is gone.
///
/// Deletion of the issue row has already committed by the time this runs,
/// so failures are logged and swallowed; a stale file is preferable to a
/// rolled-back delete.
pub trait PhotoStore: Send {
    fn release(&self, reference: &str);
}

/// Filesystem-backed photo store rooted at the upload directory.
pub struct FsPhotoStore {
    root: PathBuf,
}

impl FsPhotoStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl PhotoStore for FsPhotoStore {
    fn release(&self, reference: &str) {
        // Only the file name is trusted; references never escape the root
        let Some(file_name) = Path::new(reference).file_name() else {
            return;
        };
        let path = self.root.join(file_name);
        match std::fs::remove_file(&path) {
            Ok(()) => debug!(path = %path.display(), "released photo"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "failed to release photo"),
        }
    }
}

/// No-op store for in-memory engines and tests.
pub struct NoopPhotoStore;

impl PhotoStore for NoopPhotoStore {
    fn release(&self, _reference: &str) {}
}
