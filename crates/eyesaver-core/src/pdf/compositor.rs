//! The background compositor: paints one page-sized rectangle per page.

use image::RgbImage;
use lopdf::{Dictionary, Object, ObjectId};
use tracing::{debug, trace};

use super::document::PdfDocument;
use super::raster::{FlatFillRenderer, PageRenderer};
use super::shape::{self, FilledRect};
use super::Result;
use crate::models::color::Color;
use crate::models::mode::{RenderMode, Stacking};

/// Prefix of graphics state resource names added for overlay tints.
const TINT_STATE_PREFIX: &str = "EsTint";

/// Recolors page backgrounds with a fixed color and mode.
///
/// A compositor holds no document state; every call loads its own
/// document from the given bytes, so one value can be shared freely
/// between threads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Compositor {
    color: Color,
    mode: RenderMode,
    compress: bool,
}

impl Compositor {
    pub fn new(color: Color, mode: RenderMode) -> Self {
        Self {
            color,
            mode,
            compress: false,
        }
    }

    /// Compress content streams when saving.
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Recolor every page of a PDF and return the new file.
    pub fn recolor(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut document = PdfDocument::load(data)?;
        self.paint_document(&mut document)?;
        document.save(self.compress)
    }

    /// Paint every page of a loaded document, in page order.
    pub fn paint_document(&self, document: &mut PdfDocument) -> Result<()> {
        let page_ids = document.page_ids();
        debug!(
            "Painting {} pages with {} ({:?})",
            page_ids.len(),
            self.color,
            self.mode
        );
        for page_id in page_ids {
            self.paint_page(document, page_id)?;
        }
        Ok(())
    }

    /// Paint a single page.
    pub fn paint_page(&self, document: &mut PdfDocument, page_id: ObjectId) -> Result<()> {
        let rect = document.page_rect(page_id);
        let shape = FilledRect::for_mode(rect, self.color, self.mode);
        trace!("Page {:?}: {:?}", page_id, rect);

        match self.mode.stacking() {
            Stacking::Below => paint_below(document, page_id, &shape),
            Stacking::Above => paint_above(document, page_id, &shape, self.mode.fill_alpha()),
        }
    }
}

/// Prepend an opaque layer, or rewrite the layer left by an earlier run.
///
/// A layer stream that other pages also draw is left alone for them; this
/// page gets its own copy sized to its rectangle.
fn paint_below(document: &mut PdfDocument, page_id: ObjectId, shape: &FilledRect) -> Result<()> {
    let layer = shape::encode(shape.background_layer())?;
    let mut contents = document.content_ids(page_id);

    let existing: Vec<usize> = contents
        .iter()
        .enumerate()
        .filter(|(_, id)| {
            document
                .stream_bytes(**id)
                .is_some_and(|bytes| shape::is_background_layer(&bytes))
        })
        .map(|(index, _)| index)
        .collect();

    if !existing.is_empty() {
        trace!("Replacing {} background layer(s)", existing.len());
        let mut relinked = false;
        for index in existing {
            let id = contents[index];
            if document.is_shared_stream(id, page_id) {
                contents[index] = document.add_stream(layer.clone());
                relinked = true;
            } else {
                document.replace_stream(id, layer.clone());
            }
        }
        if relinked {
            document.set_content_ids(page_id, &contents)?;
        }
        return Ok(());
    }

    let layer_id = document.add_stream(layer);
    let mut ids = Vec::with_capacity(contents.len() + 1);
    ids.push(layer_id);
    ids.extend(contents);
    document.set_content_ids(page_id, &ids)
}

/// Wrap the existing content in `q`/`Q` and append a translucent tint.
fn paint_above(
    document: &mut PdfDocument,
    page_id: ObjectId,
    shape: &FilledRect,
    alpha: f32,
) -> Result<()> {
    let state_name = register_tint_state(document, page_id, alpha)?;
    let tint = shape::encode(shape.tint_layer(&state_name))?;

    let contents = document.content_ids(page_id);
    let open_id = document.add_stream(b"q\n".to_vec());
    let tint_id = document.add_stream(tint);

    let mut ids = Vec::with_capacity(contents.len() + 2);
    ids.push(open_id);
    ids.extend(contents);
    ids.push(tint_id);
    document.set_content_ids(page_id, &ids)
}

/// Add an `ExtGState` with the given fill and stroke alpha to the page's
/// resources under an unused name, and return that name.
fn register_tint_state(document: &mut PdfDocument, page_id: ObjectId, alpha: f32) -> Result<String> {
    let mut resources = document.resources(page_id).unwrap_or_else(Dictionary::new);
    let mut states = document
        .resource_category(&resources, b"ExtGState")
        .unwrap_or_else(Dictionary::new);

    let mut index = 0usize;
    let name = loop {
        let candidate = format!("{}{}", TINT_STATE_PREFIX, index);
        if !states.has(candidate.as_bytes()) {
            break candidate;
        }
        index += 1;
    };

    let mut state = Dictionary::new();
    state.set("Type", Object::Name(b"ExtGState".to_vec()));
    state.set("ca", Object::Real(alpha));
    state.set("CA", Object::Real(alpha));
    let state_id = document.add_object(state);

    states.set(name.as_str(), Object::Reference(state_id));
    resources.set("ExtGState", Object::Dictionary(states));
    document.set_resources(page_id, resources)?;

    trace!("Registered /{} with alpha {}", name, alpha);
    Ok(name)
}

/// Recolor every page of `data`.
pub fn recolor(data: &[u8], color: Color, mode: RenderMode) -> crate::Result<Vec<u8>> {
    Ok(Compositor::new(color, mode).recolor(data)?)
}

/// Parse `color_hex`, then recolor every page of `data`.
///
/// A malformed color fails before the document is parsed.
pub fn recolor_hex(data: &[u8], color_hex: &str, mode: RenderMode) -> crate::Result<Vec<u8>> {
    let color = Color::from_hex(color_hex)?;
    recolor(data, color, mode)
}

/// Apply the compositor to page one only and rasterize that page.
pub fn preview(data: &[u8], color: Color, mode: RenderMode, dpi: u32) -> crate::Result<RgbImage> {
    let mut document = PdfDocument::load(data)?;
    let first_page = document.page_id(1)?;
    Compositor::new(color, mode).paint_page(&mut document, first_page)?;
    Ok(FlatFillRenderer.render_page(&document, 1, dpi)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::PageRect;
    use lopdf::dictionary;
    use lopdf::{Document, Stream};
    use pretty_assertions::assert_eq;

    /// One page whose resources live in a shared indirect dictionary that
    /// already holds a graphics state called `EsTint0`.
    fn shared_resources_document() -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let existing_state = doc.add_object(dictionary! {
            "Type" => "ExtGState",
            "ca" => Object::Real(0.5),
        });
        let resources_id = doc.add_object(dictionary! {
            "ExtGState" => dictionary! { "EsTint0" => existing_state },
        });
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"0 0 1 rg 0 0 10 10 re f".to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 100.into(), 100.into()],
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog);

        let mut data = Vec::new();
        doc.save_to(&mut data).unwrap();
        data
    }

    #[test]
    fn test_standard_prepends_layer() {
        let data = shared_resources_document();
        let mut document = PdfDocument::load(&data).unwrap();
        let page = document.page_id(1).unwrap();
        let original = document.content_ids(page);

        Compositor::new(Color::CREAM, RenderMode::Standard)
            .paint_page(&mut document, page)
            .unwrap();

        let contents = document.content_ids(page);
        assert_eq!(contents.len(), 2);
        assert_eq!(&contents[1..], original.as_slice());
        let first = document.stream_bytes(contents[0]).unwrap();
        assert!(shape::is_background_layer(&first));
    }

    #[test]
    fn test_standard_twice_replaces_layer() {
        let data = shared_resources_document();
        let mut document = PdfDocument::load(&data).unwrap();
        let page = document.page_id(1).unwrap();

        Compositor::new(Color::WHITE, RenderMode::Standard)
            .paint_page(&mut document, page)
            .unwrap();
        Compositor::new(Color::CREAM, RenderMode::Standard)
            .paint_page(&mut document, page)
            .unwrap();

        let contents = document.content_ids(page);
        assert_eq!(contents.len(), 2);
        let layer = document.stream_bytes(contents[0]).unwrap();
        let ops = lopdf::content::Content::decode(&layer).unwrap().operations;
        let fill = ops.iter().find(|op| op.operator == "rg").unwrap();
        let blue = fill.operands[2].as_float().unwrap();
        assert!((blue - 0.8).abs() < 1e-4);
    }

    #[test]
    fn test_shared_layer_is_split_per_page() {
        let small = PageRect::from_corners([0.0, 0.0, 100.0, 100.0]);
        let layer = shape::encode(
            FilledRect::for_mode(small, Color::WHITE, RenderMode::Standard).background_layer(),
        )
        .unwrap();

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let layer_id = doc.add_object(Stream::new(Dictionary::new(), layer));
        let mut kids: Vec<Object> = Vec::new();
        for size in [100, 300] {
            let page = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), size.into(), size.into()],
                "Contents" => layer_id,
            });
            kids.push(page.into());
        }
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => 2,
            }),
        );
        let catalog = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog);
        let mut data = Vec::new();
        doc.save_to(&mut data).unwrap();

        let mut document = PdfDocument::load(&data).unwrap();
        Compositor::new(Color::CREAM, RenderMode::Standard)
            .paint_document(&mut document)
            .unwrap();

        for (page, size) in [(1, 100.0), (2, 300.0)] {
            let page_id = document.page_id(page).unwrap();
            let contents = document.content_ids(page_id);
            assert_eq!(contents.len(), 1);
            let bytes = document.stream_bytes(contents[0]).unwrap();
            let ops = lopdf::content::Content::decode(&bytes).unwrap().operations;
            let re = ops.iter().find(|op| op.operator == "re").unwrap();
            let width = re.operands[2].as_float().unwrap();
            assert_eq!(width, size);
        }
    }

    #[test]
    fn test_overlay_wraps_content_and_picks_free_state_name() {
        let data = shared_resources_document();
        let mut document = PdfDocument::load(&data).unwrap();
        let page = document.page_id(1).unwrap();
        let original = document.content_ids(page);

        Compositor::new(Color::CREAM, RenderMode::Overlay { intensity: 0.3 })
            .paint_page(&mut document, page)
            .unwrap();

        let contents = document.content_ids(page);
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[1], original[0]);
        assert_eq!(document.stream_bytes(contents[0]).unwrap(), b"q\n".to_vec());

        let tint = String::from_utf8(document.stream_bytes(contents[2]).unwrap()).unwrap();
        assert!(tint.trim_start().starts_with('Q'));
        assert!(tint.contains("/EsTint1 gs"));

        let resources = document.resources(page).unwrap();
        let states = document.resource_category(&resources, b"ExtGState").unwrap();
        assert!(states.has(b"EsTint0"));
        assert!(states.has(b"EsTint1"));
    }

    #[test]
    fn test_recolor_hex_checks_color_first() {
        let err = recolor_hex(b"not a pdf", "#12345", RenderMode::Standard).unwrap_err();
        assert!(matches!(err, crate::EyesaverError::Color(_)));

        let err = recolor_hex(b"not a pdf", "#123456", RenderMode::Standard).unwrap_err();
        assert!(matches!(
            err,
            crate::EyesaverError::Document(crate::DocumentError::Parse(_))
        ));
    }

    #[test]
    fn test_compositor_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync + Copy>() {}
        assert_send_sync::<Compositor>();
    }
}
