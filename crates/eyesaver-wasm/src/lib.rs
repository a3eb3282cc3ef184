//! WASM bindings for PDF background recoloring.
//!
//! This crate provides WebAssembly bindings for use in browsers and Node.js.
//! Documents go in and come out as byte arrays; nothing touches the network
//! or the filesystem.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use eyesaver_core::{Color, Compositor, RenderMode, MAX_PREVIEW_DPI};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[derive(Serialize)]
struct Rgb {
    r: u8,
    g: u8,
    b: u8,
}

/// Parse a `#RRGGBB` color into `{ r, g, b }` with 0-255 channels.
#[wasm_bindgen]
pub fn parse_color(hex: &str) -> Result<JsValue, JsValue> {
    let [r, g, b] = Color::from_hex(hex).map_err(to_js)?.to_rgb8();
    serde_wasm_bindgen::to_value(&Rgb { r, g, b }).map_err(to_js)
}

/// Recolor every page of a PDF and return the new file.
#[wasm_bindgen]
pub fn recolor(data: &[u8], hex: &str, overlay: bool, intensity: f32) -> Result<Vec<u8>, JsValue> {
    Recolorer::new(hex, overlay, intensity)?.recolor(data)
}

/// Render page one with the background applied, as PNG bytes.
#[wasm_bindgen]
pub fn preview_png(
    data: &[u8],
    hex: &str,
    overlay: bool,
    intensity: f32,
    dpi: u32,
) -> Result<Vec<u8>, JsValue> {
    Recolorer::new(hex, overlay, intensity)?.preview_png(data, dpi)
}

/// Recolorer with a fixed color and mode, for repeated use.
#[wasm_bindgen]
pub struct Recolorer {
    compositor: Compositor,
}

#[wasm_bindgen]
impl Recolorer {
    /// Create a recolorer. `intensity` is only used when `overlay` is set
    /// and must then lie strictly between 0 and 1.
    #[wasm_bindgen(constructor)]
    pub fn new(hex: &str, overlay: bool, intensity: f32) -> Result<Recolorer, JsValue> {
        let color = Color::from_hex(hex).map_err(to_js)?;
        if overlay && !(intensity > 0.0 && intensity < 1.0) {
            return Err(JsValue::from_str(&format!(
                "intensity must be between 0 and 1 (exclusive), got {}",
                intensity
            )));
        }
        let mode = RenderMode::from_flags(overlay, intensity);
        Ok(Self {
            compositor: Compositor::new(color, mode),
        })
    }

    /// Compress content streams of the output.
    #[wasm_bindgen]
    pub fn set_compress(&mut self, compress: bool) {
        self.compositor = self.compositor.with_compression(compress);
    }

    /// The background color as `#RRGGBB`.
    #[wasm_bindgen(getter)]
    pub fn color(&self) -> String {
        self.compositor.color().to_hex()
    }

    #[wasm_bindgen(getter)]
    pub fn overlay(&self) -> bool {
        self.compositor.mode().is_overlay()
    }

    #[wasm_bindgen]
    pub fn recolor(&self, data: &[u8]) -> Result<Vec<u8>, JsValue> {
        self.compositor.recolor(data).map_err(to_js)
    }

    #[wasm_bindgen]
    pub fn preview_png(&self, data: &[u8], dpi: u32) -> Result<Vec<u8>, JsValue> {
        if !(1..=MAX_PREVIEW_DPI).contains(&dpi) {
            return Err(JsValue::from_str(&format!(
                "dpi must be between 1 and {}, got {}",
                MAX_PREVIEW_DPI, dpi
            )));
        }
        let image = eyesaver_core::preview(data, self.compositor.color(), self.compositor.mode(), dpi)
            .map_err(to_js)?;
        eyesaver_core::encode_png(&image).map_err(to_js)
    }
}

fn to_js(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}
