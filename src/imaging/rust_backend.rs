//! Pure Rust probing backend built on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::image_dimensions` (header only, no full decode) |
//! | Extension filter | `image::ImageFormat::from_extension` + `reading_enabled` |

use super::backend::{BackendError, Dimensions, ImageBackend};
use image::ImageFormat;
use std::path::Path;
use std::sync::LazyLock;

/// Extensions the import session accepts when expanding directories.
const IMPORT_CANDIDATES: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "tif", "tiff", "webp"];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    IMPORT_CANDIDATES
        .iter()
        .copied()
        .filter(|ext| ImageFormat::from_extension(ext).is_some_and(|fmt| fmt.reading_enabled()))
        .collect()
});

/// Returns the image file extensions that have decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Whether `path` has one of the [`supported_input_extensions`].
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(e))
        })
}

/// Backend reading image headers from disk.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| match e {
            image::ImageError::IoError(io) => BackendError::Io(io),
            other => BackendError::ProcessingFailed(format!(
                "Failed to read dimensions of {}: {}",
                path.display(),
                other
            )),
        })?;
        Ok(Dimensions { width, height })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    #[test]
    fn identifies_png_dimensions() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tile.png");
        RgbaImage::from_pixel(200, 64, Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();

        let dims = RustBackend::new().identify(&path).unwrap();
        assert_eq!(dims, Dimensions::new(200, 64));
    }

    #[test]
    fn missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = RustBackend::new().identify(&tmp.path().join("nope.png"));
        assert!(matches!(result, Err(BackendError::Io(_))));
    }

    #[test]
    fn garbage_file_is_processing_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();
        let result = RustBackend::new().identify(&path);
        assert!(result.is_err());
    }

    #[test]
    fn supported_extensions_are_case_insensitive() {
        assert!(is_supported_image(Path::new("a/b/photo.PNG")));
        assert!(is_supported_image(Path::new("photo.jpeg")));
        assert!(!is_supported_image(Path::new("notes.txt")));
        assert!(!is_supported_image(Path::new("no_extension")));
    }
}
