//! Page rasterization for previews.
//!
//! [`FlatFillRenderer`] only paints rectangle fills. Text, images, strokes
//! and curved paths are skipped, which is enough to show how a background
//! color or tint will look on a page.

use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::Dictionary;
use tracing::{debug, trace, warn};

use super::document::{PageRect, PdfDocument};
use super::Result;
use crate::error::DocumentError;

/// Points per inch in PDF user space.
const POINTS_PER_INCH: f32 = 72.0;

/// Largest bitmap, in pixels, a preview may allocate.
const MAX_CANVAS_PIXELS: u64 = 200_000_000;

/// Renders a page of a loaded document to an RGB bitmap.
pub trait PageRenderer {
    /// Render a 1-indexed page at the given resolution.
    fn render_page(&self, document: &PdfDocument, page: u32, dpi: u32) -> Result<RgbImage>;
}

/// Rasterizer for rectangle fills over a white canvas.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatFillRenderer;

impl PageRenderer for FlatFillRenderer {
    fn render_page(&self, document: &PdfDocument, page: u32, dpi: u32) -> Result<RgbImage> {
        let page_id = document.page_id(page)?;
        let rect = document.page_rect(page_id);
        let rotation = document.page_rotation(page_id);
        let resources = document.resources(page_id).unwrap_or_else(Dictionary::new);
        let states = document
            .resource_category(&resources, b"ExtGState")
            .unwrap_or_else(Dictionary::new);

        let mut canvas = Canvas::new(rect, rotation, dpi)?;
        let mut painter = Painter::new(|name: &[u8]| fill_alpha(document, &states, name));

        // Streams are decoded one by one so a single unreadable stream only
        // drops its own drawing.
        for id in document.content_ids(page_id) {
            let Some(bytes) = document.stream_bytes(id) else {
                continue;
            };
            match Content::decode(&bytes) {
                Ok(content) => {
                    for op in &content.operations {
                        painter.apply(op, &mut canvas);
                    }
                }
                Err(e) => warn!("Skipping undecodable content stream {:?}: {}", id, e),
            }
        }

        debug!(
            "Rendered page {} at {} dpi, rotated {} ({}x{})",
            page,
            dpi,
            rotation,
            canvas.image.width(),
            canvas.image.height()
        );
        Ok(canvas.image)
    }
}

/// Encode a bitmap as PNG.
pub fn encode_png(image: &RgbImage) -> std::result::Result<Vec<u8>, image::ImageError> {
    let mut data = Vec::new();
    image.write_to(&mut Cursor::new(&mut data), ImageFormat::Png)?;
    Ok(data)
}

/// `/ca` of a named graphics state, if it sets one.
fn fill_alpha(document: &PdfDocument, states: &Dictionary, name: &[u8]) -> Option<f32> {
    let state = states.get(name).ok()?;
    let (_, state) = document.inner().dereference(state).ok()?;
    let alpha = state.as_dict().ok()?.get(b"ca").ok()?;
    alpha.as_float().ok()
}

/// 2D affine transform `[a b c d e f]` as used by the `cm` operator.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f32; 6]);

impl Matrix {
    const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    /// `self` applied first, then `other`.
    fn then(self, other: Matrix) -> Matrix {
        let [a, b, c, d, e, f] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Matrix([
            a * a2 + b * c2,
            a * b2 + b * d2,
            c * a2 + d * c2,
            c * b2 + d * d2,
            e * a2 + f * c2 + e2,
            e * b2 + f * d2 + f2,
        ])
    }

    fn apply(self, x: f32, y: f32) -> (f32, f32) {
        let [a, b, c, d, e, f] = self.0;
        (a * x + c * y + e, b * x + d * y + f)
    }
}

#[derive(Debug, Clone, Copy)]
struct GraphicsState {
    ctm: Matrix,
    fill: [f32; 3],
    fill_alpha: f32,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            fill: [0.0, 0.0, 0.0],
            fill_alpha: 1.0,
        }
    }
}

/// Pixel canvas covering a page rectangle as displayed, after rotation.
struct Canvas {
    image: RgbImage,
    rect: PageRect,
    rotation: u16,
    scale: f32,
}

impl Canvas {
    fn new(rect: PageRect, rotation: u16, dpi: u32) -> Result<Self> {
        let scale = dpi as f32 / POINTS_PER_INCH;
        let (extent_x, extent_y) = match rotation {
            90 | 270 => (rect.height(), rect.width()),
            _ => (rect.width(), rect.height()),
        };
        let pixels = |extent: f32| ((f64::from(extent) * f64::from(scale)).round() as u64).max(1);
        let (width, height) = (pixels(extent_x), pixels(extent_y));

        if width.saturating_mul(height) > MAX_CANVAS_PIXELS {
            return Err(DocumentError::PreviewTooLarge { width, height });
        }

        Ok(Self {
            image: RgbImage::from_pixel(width as u32, height as u32, Rgb([255, 255, 255])),
            rect,
            rotation,
            scale,
        })
    }

    /// Map a page-space point to displayed points, origin top-left.
    fn to_display(&self, x: f32, y: f32) -> (f32, f32) {
        let PageRect { x0, y0, x1, y1 } = self.rect;
        match self.rotation {
            90 => (y - y0, x - x0),
            180 => (x1 - x, y - y0),
            270 => (y1 - y, x1 - x),
            _ => (x - x0, y1 - y),
        }
    }

    /// Composite an axis-aligned box given in page space. A pixel is
    /// covered when its center lies inside the box.
    fn fill_box(&mut self, bounds: [f32; 4], color: [f32; 3], alpha: f32) {
        if alpha <= 0.0 {
            return;
        }
        let [x0, y0, x1, y1] = bounds;
        let (ax, ay) = self.to_display(x0, y0);
        let (bx, by) = self.to_display(x1, y1);

        let to_pixels = |lo: f32, hi: f32, limit: u32| {
            let start = ((lo * self.scale) - 0.5).ceil().max(0.0) as u32;
            let end = (((hi * self.scale) - 0.5).ceil().max(0.0) as u32).min(limit);
            start..end
        };
        let columns = to_pixels(ax.min(bx), ax.max(bx), self.image.width());
        let rows = to_pixels(ay.min(by), ay.max(by), self.image.height());

        let source = color.map(|c| c.clamp(0.0, 1.0) * 255.0);
        let alpha = alpha.min(1.0);
        for y in rows {
            for x in columns.clone() {
                let pixel = self.image.get_pixel_mut(x, y);
                for (channel, src) in pixel.0.iter_mut().zip(source) {
                    let blended = f32::from(*channel) * (1.0 - alpha) + src * alpha;
                    *channel = blended.round().clamp(0.0, 255.0) as u8;
                }
            }
        }
    }
}

/// Interprets content stream operations that affect rectangle fills.
struct Painter<F> {
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    path: Vec<[f32; 4]>,
    lookup_alpha: F,
}

impl<F> Painter<F>
where
    F: Fn(&[u8]) -> Option<f32>,
{
    fn new(lookup_alpha: F) -> Self {
        Self {
            state: GraphicsState::default(),
            stack: Vec::new(),
            path: Vec::new(),
            lookup_alpha,
        }
    }

    fn apply(&mut self, op: &Operation, canvas: &mut Canvas) {
        let numbers = || -> Option<Vec<f32>> {
            op.operands.iter().map(|o| o.as_float().ok()).collect()
        };

        match op.operator.as_str() {
            "q" => self.stack.push(self.state),
            "Q" => {
                if let Some(state) = self.stack.pop() {
                    self.state = state;
                }
            }
            "cm" => {
                if let Some(&[a, b, c, d, e, f]) = numbers().as_deref() {
                    self.state.ctm = Matrix([a, b, c, d, e, f]).then(self.state.ctm);
                }
            }
            "g" | "rg" | "k" | "sc" | "scn" => {
                if let Some(fill) = numbers().as_deref().and_then(device_rgb) {
                    self.state.fill = fill;
                }
            }
            "gs" => {
                let name = op.operands.first().and_then(|o| o.as_name().ok());
                if let Some(alpha) = name.and_then(|n| (self.lookup_alpha)(n)) {
                    self.state.fill_alpha = alpha;
                }
            }
            "re" => {
                if let Some(&[x, y, w, h]) = numbers().as_deref() {
                    self.path.push(self.bounds(x, y, w, h));
                }
            }
            "f" | "F" | "f*" | "B" | "B*" | "b" | "b*" => {
                for bounds in std::mem::take(&mut self.path) {
                    canvas.fill_box(bounds, self.state.fill, self.state.fill_alpha);
                }
            }
            "n" | "S" | "s" => self.path.clear(),
            other => trace!("Skipping operator {}", other),
        }
    }

    /// Bounding box in page space of a user-space rectangle.
    fn bounds(&self, x: f32, y: f32, w: f32, h: f32) -> [f32; 4] {
        let corners = [
            self.state.ctm.apply(x, y),
            self.state.ctm.apply(x + w, y),
            self.state.ctm.apply(x, y + h),
            self.state.ctm.apply(x + w, y + h),
        ];
        corners.iter().fold(
            [f32::MAX, f32::MAX, f32::MIN, f32::MIN],
            |[x0, y0, x1, y1], &(px, py)| [x0.min(px), y0.min(py), x1.max(px), y1.max(py)],
        )
    }
}

/// Interpret gray, RGB or CMYK operands as an RGB color.
fn device_rgb(values: &[f32]) -> Option<[f32; 3]> {
    match *values {
        [gray] => Some([gray; 3]),
        [r, g, b] => Some([r, g, b]),
        [c, m, y, k] => Some([
            (1.0 - c) * (1.0 - k),
            (1.0 - m) * (1.0 - k),
            (1.0 - y) * (1.0 - k),
        ]),
        _ => None,
    }
}
