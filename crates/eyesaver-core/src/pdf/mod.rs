//! PDF processing module.

mod compositor;
mod document;
mod raster;
mod shape;

pub use compositor::{preview, recolor, recolor_hex, Compositor};
pub use document::{PageRect, PdfDocument};
pub use raster::{encode_png, FlatFillRenderer, PageRenderer};
pub use shape::{FilledRect, BACKGROUND_ARTIFACT};

use crate::error::DocumentError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, DocumentError>;
