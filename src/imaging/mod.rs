//! Image probing, the only pixel-adjacent work the import engine does.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Extension filter** | `image::ImageFormat` |
//!
//! The module is split into:
//! - **Backend**: [`ImageBackend`] trait + shared [`Dimensions`] type
//! - **Rust backend**: [`RustBackend`], the production implementation

pub mod backend;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use rust_backend::{RustBackend, is_supported_image, supported_input_extensions};
