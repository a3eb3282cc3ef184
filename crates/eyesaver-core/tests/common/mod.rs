//! PDF fixtures built in memory with lopdf.

#![allow(dead_code)]

use lopdf::{dictionary, Dictionary, Document, Object, Stream};

/// Build a PDF with one page per `(width, height)` entry. Every page gets
/// `content` as its single content stream when given.
pub fn document(pages: &[(f32, f32)], content: Option<&[u8]>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::new();
    for &(width, height) in pages {
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), Object::Real(width), Object::Real(height)],
            "Resources" => Dictionary::new(),
        };
        if let Some(content) = content {
            let content_id = doc.add_object(Stream::new(Dictionary::new(), content.to_vec()));
            page.set("Contents", content_id);
        }
        kids.push(doc.add_object(page).into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
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

/// Blank pages of the given size.
pub fn blank(pages: usize, width: f32, height: f32) -> Vec<u8> {
    document(&vec![(width, height); pages], None)
}

/// US Letter pages with a black 100pt square in the lower-left corner.
pub fn with_black_square(pages: usize) -> Vec<u8> {
    document(
        &vec![(612.0, 792.0); pages],
        Some(b"q 0 0 0 rg 0 0 100 100 re f Q"),
    )
}

/// One blank page of the given size whose `/Rotate` is set on the page
/// tree root, so the page inherits it.
pub fn rotated(width: f32, height: f32, rotate: i64) -> Vec<u8> {
    let mut doc = Document::load_mem(&blank(1, width, height)).unwrap();
    let pages_id = doc
        .catalog()
        .unwrap()
        .get(b"Pages")
        .unwrap()
        .as_reference()
        .unwrap();
    doc.get_dictionary_mut(pages_id)
        .unwrap()
        .set("Rotate", rotate);

    let mut data = Vec::new();
    doc.save_to(&mut data).unwrap();
    data
}
