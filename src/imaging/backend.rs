//! Image probing backend trait and shared types.
//!
//! The import engine never touches pixels. The one thing it needs from an
//! image before handing it to the renderer is its native size, and even that
//! only on demand (see [`DeferredResampler`](crate::resolve::DeferredResampler)).
//! [`ImageBackend`] is that seam.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), which reads headers with
//! the `image` crate. Tests use the `MockBackend` in this module.

use serde::Serialize;
use std::fmt;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Native pixel size of a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Trait for image probing backends.
///
/// Sources hold an `Arc<dyn ImageBackend>` and may be shared with resolved
/// settings read by other threads, hence `Send + Sync`.
pub trait ImageBackend: Send + Sync {
    /// Get image dimensions without decoding pixel data where possible.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;
}
