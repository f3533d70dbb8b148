//! Images waiting to be imported.
//!
//! A [`PendingSource`] is a path plus the backend that knows how to probe it.
//! Its native size is looked up the first time somebody asks and remembered
//! from then on. A failed probe is not remembered, so a source that was
//! temporarily unreadable can still resolve later.

use crate::imaging::{BackendError, Dimensions, ImageBackend, is_supported_image};
use once_cell::sync::OnceCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

pub struct PendingSource {
    path: PathBuf,
    backend: Arc<dyn ImageBackend>,
    size: OnceCell<Dimensions>,
}

impl PendingSource {
    pub fn new(path: impl Into<PathBuf>, backend: Arc<dyn ImageBackend>) -> Self {
        Self {
            path: path.into(),
            backend,
            size: OnceCell::new(),
        }
    }

    /// A source whose size is already known, e.g. from an earlier probe.
    pub fn with_size(
        path: impl Into<PathBuf>,
        backend: Arc<dyn ImageBackend>,
        size: Dimensions,
    ) -> Self {
        Self {
            path: path.into(),
            backend,
            size: OnceCell::with_value(size),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name for display, falling back to the full path.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Native pixel size, probing the backend on first use.
    pub fn size(&self) -> Result<Dimensions, BackendError> {
        self.size
            .get_or_try_init(|| {
                log::debug!("probing size of {}", self.path.display());
                self.backend.identify(&self.path)
            })
            .copied()
    }

    /// The size if it has already been probed.
    pub fn known_size(&self) -> Option<Dimensions> {
        self.size.get().copied()
    }
}

impl fmt::Debug for PendingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingSource")
            .field("path", &self.path)
            .field("size", &self.size.get())
            .finish_non_exhaustive()
    }
}

/// Wrap every path with the same backend.
pub fn sources_from_paths<I, P>(paths: I, backend: &Arc<dyn ImageBackend>) -> Vec<PendingSource>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    paths
        .into_iter()
        .map(|p| PendingSource::new(p, Arc::clone(backend)))
        .collect()
}

/// Expand directories into the supported images they contain.
///
/// Files named explicitly are kept as given, whatever their extension.
/// Directories are walked recursively in file-name order; unreadable entries
/// are skipped with a warning.
pub fn expand_paths<P: AsRef<Path>>(paths: &[P]) -> Vec<PathBuf> {
    let mut expanded = Vec::new();
    for path in paths {
        let path = path.as_ref();
        if !path.is_dir() {
            expanded.push(path.to_path_buf());
            continue;
        }
        for entry in WalkDir::new(path).sort_by_file_name() {
            match entry {
                Ok(e) if e.file_type().is_file() && is_supported_image(e.path()) => {
                    expanded.push(e.into_path());
                }
                Ok(_) => {}
                Err(e) => log::warn!("skipping unreadable entry under {}: {}", path.display(), e),
            }
        }
    }
    expanded
}
