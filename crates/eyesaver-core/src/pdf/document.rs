//! PDF loading, page geometry and serialization using lopdf.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, trace};

use super::Result;
use crate::error::DocumentError;

/// Page tree nodes are followed at most this deep when resolving
/// inherited attributes.
const MAX_TREE_DEPTH: usize = 32;

/// US Letter, used when a page has neither a CropBox nor a MediaBox.
const DEFAULT_PAGE_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// A page's visible rectangle in PDF user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl PageRect {
    /// Build a rectangle from two corners in any order.
    pub fn from_corners(corners: [f32; 4]) -> Self {
        let [ax, ay, bx, by] = corners;
        Self {
            x0: ax.min(bx),
            y0: ay.min(by),
            x1: ax.max(bx),
            y1: ay.max(by),
        }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }
}

/// A loaded PDF document owned by a single operation.
pub struct PdfDocument {
    document: Document,
}

impl PdfDocument {
    /// Parse a PDF from bytes.
    ///
    /// Documents encrypted with an empty user password are decrypted;
    /// any other encryption is rejected.
    pub fn load(data: &[u8]) -> Result<Self> {
        let mut document =
            Document::load_mem(data).map_err(|e| DocumentError::Parse(e.to_string()))?;

        if document.is_encrypted() {
            if document.decrypt("").is_err() {
                return Err(DocumentError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");
        }

        let page_count = document.get_pages().len();
        if page_count == 0 {
            return Err(DocumentError::NoPages);
        }

        debug!("Loaded PDF with {} pages ({} bytes)", page_count, data.len());
        Ok(Self { document })
    }

    /// Get the number of pages in the PDF.
    pub fn page_count(&self) -> u32 {
        self.document.get_pages().len() as u32
    }

    /// Page object ids in page order.
    pub fn page_ids(&self) -> Vec<ObjectId> {
        self.document.get_pages().into_values().collect()
    }

    /// Object id of a 1-indexed page.
    pub fn page_id(&self, page: u32) -> Result<ObjectId> {
        self.document
            .get_pages()
            .get(&page)
            .copied()
            .ok_or(DocumentError::InvalidPage(page))
    }

    /// The page's visible rectangle: the effective CropBox, falling back to
    /// the effective MediaBox.
    pub fn page_rect(&self, page_id: ObjectId) -> PageRect {
        let corners = self
            .inherited_box(page_id, b"CropBox")
            .or_else(|| self.inherited_box(page_id, b"MediaBox"))
            .unwrap_or_else(|| {
                debug!("Page {:?} has no page box, assuming US Letter", page_id);
                DEFAULT_PAGE_BOX
            });
        PageRect::from_corners(corners)
    }

    /// Clockwise display rotation of a page in degrees: 0, 90, 180 or 270.
    /// Values that are not multiples of 90 are ignored.
    pub fn page_rotation(&self, page_id: ObjectId) -> u16 {
        let rotate = self
            .inherited_attribute(page_id, b"Rotate")
            .and_then(|value| self.document.dereference(value).ok())
            .and_then(|(_, value)| value.as_i64().ok())
            .unwrap_or(0);
        if rotate % 90 != 0 {
            trace!("Ignoring /Rotate {} on page {:?}", rotate, page_id);
            return 0;
        }
        rotate.rem_euclid(360) as u16
    }

    /// Effective resources dictionary of a page, resolved through
    /// references and the page tree.
    pub fn resources(&self, page_id: ObjectId) -> Option<Dictionary> {
        let resources = self.inherited_attribute(page_id, b"Resources")?;
        match self.document.dereference(resources) {
            Ok((_, Object::Dictionary(dict))) => Some(dict.clone()),
            _ => None,
        }
    }

    /// Resolve a dictionary-valued entry of a resources dictionary, such as
    /// `/ExtGState`, whether it is direct or indirect.
    pub fn resource_category(&self, resources: &Dictionary, category: &[u8]) -> Option<Dictionary> {
        let entry = resources.get(category).ok()?;
        match self.document.dereference(entry) {
            Ok((_, Object::Dictionary(dict))) => Some(dict.clone()),
            _ => None,
        }
    }

    /// Replace a page's resources with a direct dictionary.
    pub fn set_resources(&mut self, page_id: ObjectId, resources: Dictionary) -> Result<()> {
        let page = self.document.get_dictionary_mut(page_id)?;
        page.set("Resources", Object::Dictionary(resources));
        Ok(())
    }

    /// Content stream ids of a page in drawing order.
    pub fn content_ids(&self, page_id: ObjectId) -> Vec<ObjectId> {
        let Ok(page) = self.document.get_dictionary(page_id) else {
            return Vec::new();
        };
        let Ok(contents) = page.get(b"Contents") else {
            return Vec::new();
        };

        let mut ids = Vec::new();
        match contents {
            Object::Reference(id) => match self.document.get_object(*id) {
                Ok(Object::Array(items)) => ids.extend(items.iter().filter_map(reference)),
                _ => ids.push(*id),
            },
            Object::Array(items) => ids.extend(items.iter().filter_map(reference)),
            _ => trace!("Page {:?} has direct /Contents, ignoring", page_id),
        }
        ids
    }

    /// Whether a content stream is also drawn by a page other than
    /// `page_id`.
    pub fn is_shared_stream(&self, id: ObjectId, page_id: ObjectId) -> bool {
        self.page_ids()
            .into_iter()
            .filter(|other| *other != page_id)
            .any(|other| self.content_ids(other).contains(&id))
    }

    /// Replace the content stream list of a page.
    pub fn set_content_ids(&mut self, page_id: ObjectId, ids: &[ObjectId]) -> Result<()> {
        let contents = match ids {
            [single] => Object::Reference(*single),
            _ => Object::Array(ids.iter().copied().map(Object::Reference).collect()),
        };
        let page = self.document.get_dictionary_mut(page_id)?;
        page.set("Contents", contents);
        Ok(())
    }

    /// Decoded bytes of a single content stream.
    pub fn stream_bytes(&self, id: ObjectId) -> Option<Vec<u8>> {
        let stream = self.document.get_object(id).ok()?.as_stream().ok()?;
        match stream.decompressed_content() {
            Ok(data) => Some(data),
            Err(_) => Some(stream.content.clone()),
        }
    }

    /// Add an unfiltered content stream and return its id.
    pub fn add_stream(&mut self, content: Vec<u8>) -> ObjectId {
        self.document
            .add_object(Stream::new(Dictionary::new(), content))
    }

    /// Overwrite an existing content stream with unfiltered data.
    pub fn replace_stream(&mut self, id: ObjectId, content: Vec<u8>) {
        self.document
            .objects
            .insert(id, Object::Stream(Stream::new(Dictionary::new(), content)));
    }

    pub fn add_object<T: Into<Object>>(&mut self, object: T) -> ObjectId {
        self.document.add_object(object)
    }

    /// Read-only access to the underlying lopdf document.
    pub fn inner(&self) -> &Document {
        &self.document
    }

    /// Serialize the document, optionally compressing its streams.
    pub fn save(mut self, compress: bool) -> Result<Vec<u8>> {
        if compress {
            self.document.compress();
        }

        let mut output = Vec::new();
        self.document
            .save_to(&mut output)
            .map_err(|e| DocumentError::Save(e.to_string()))?;

        debug!("Saved PDF ({} bytes)", output.len());
        Ok(output)
    }

    /// Look up a page attribute, following `/Parent` links for inherited
    /// attributes.
    fn inherited_attribute(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut node_id = page_id;
        for _ in 0..MAX_TREE_DEPTH {
            let node = self.document.get_dictionary(node_id).ok()?;
            if let Ok(value) = node.get(key) {
                return Some(value);
            }
            node_id = node.get(b"Parent").ok()?.as_reference().ok()?;
        }
        None
    }

    fn inherited_box(&self, page_id: ObjectId, key: &[u8]) -> Option<[f32; 4]> {
        let value = self.inherited_attribute(page_id, key)?;
        let (_, value) = self.document.dereference(value).ok()?;
        let items = value.as_array().ok()?;
        if items.len() != 4 {
            trace!("Ignoring /{} with {} entries", String::from_utf8_lossy(key), items.len());
            return None;
        }

        let mut corners = [0.0f32; 4];
        for (slot, item) in corners.iter_mut().zip(items) {
            let (_, item) = self.document.dereference(item).ok()?;
            *slot = item.as_float().ok()?;
        }
        Some(corners)
    }
}

fn reference(object: &Object) -> Option<ObjectId> {
    object.as_reference().ok()
}
