//! Core library for PDF background recoloring.
//!
//! This crate provides:
//! - `#RRGGBB` color parsing
//! - Standard mode (opaque background beneath the page content) and
//!   overlay mode (translucent tint above it)
//! - Page-one previews rendered to RGB bitmaps
//! - Configuration models shared by the CLI and WASM front ends

pub mod error;
pub mod models;
pub mod pdf;

pub use error::{ColorFormatError, DocumentError, EyesaverError, Result};
pub use models::color::{parse_color, Color};
pub use models::config::{EyesaverConfig, MAX_PREVIEW_DPI};
pub use models::mode::{RenderMode, Stacking, DEFAULT_INTENSITY};
pub use pdf::{encode_png, preview, recolor, recolor_hex, Compositor, PdfDocument};
