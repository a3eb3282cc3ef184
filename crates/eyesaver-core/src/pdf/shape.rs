//! Filled rectangle shapes and the content stream operations that draw them.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object};

use super::document::PageRect;
use super::Result;
use crate::models::color::Color;
use crate::models::mode::RenderMode;

/// Marked-content tag wrapping every layer this crate draws.
pub const BACKGROUND_ARTIFACT: &[u8] = b"Artifact";

/// Artifact `/Type` of the standard-mode layer.
const BACKGROUND_TYPE: &[u8] = b"Background";

/// Private key in the artifact properties marking layers this crate drew.
const LAYER_MARKER: &[u8] = b"EyesaverLayer";

/// Operators of a complete standard-mode layer, in order.
const BACKGROUND_OPERATORS: [&str; 8] = ["q", "BDC", "rg", "RG", "re", "B", "EMC", "Q"];

/// A rectangle filled (and optionally stroked) with a single color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilledRect {
    pub rect: PageRect,
    pub fill: Color,
    pub stroke: Option<Color>,
}

impl FilledRect {
    /// The page-covering shape for a render mode.
    pub fn for_mode(rect: PageRect, color: Color, mode: RenderMode) -> Self {
        Self {
            rect,
            fill: color,
            stroke: mode.strokes_border().then_some(color),
        }
    }

    /// A self-contained layer to be drawn beneath existing content.
    pub fn background_layer(&self) -> Vec<Operation> {
        let mut properties = Dictionary::new();
        properties.set("Type", Object::Name(BACKGROUND_TYPE.to_vec()));
        properties.set(LAYER_MARKER, Object::Boolean(true));

        let mut ops = vec![
            Operation::new("q", vec![]),
            Operation::new(
                "BDC",
                vec![
                    Object::Name(BACKGROUND_ARTIFACT.to_vec()),
                    Object::Dictionary(properties),
                ],
            ),
        ];
        ops.extend(self.paint());
        ops.push(Operation::new("EMC", vec![]));
        ops.push(Operation::new("Q", vec![]));
        ops
    }

    /// A tint layer drawn above existing content through the named
    /// graphics state. Starts with `Q` to close the `q` that wraps the
    /// original content.
    pub fn tint_layer(&self, state_name: &str) -> Vec<Operation> {
        let mut ops = vec![
            Operation::new("Q", vec![]),
            Operation::new("q", vec![]),
            Operation::new("BMC", vec![Object::Name(BACKGROUND_ARTIFACT.to_vec())]),
            Operation::new("gs", vec![Object::Name(state_name.as_bytes().to_vec())]),
        ];
        ops.extend(self.paint());
        ops.push(Operation::new("EMC", vec![]));
        ops.push(Operation::new("Q", vec![]));
        ops
    }

    fn paint(&self) -> Vec<Operation> {
        let mut ops = vec![Operation::new("rg", rgb_operands(self.fill))];
        if let Some(stroke) = self.stroke {
            ops.push(Operation::new("RG", rgb_operands(stroke)));
        }

        let rect = self.rect;
        ops.push(Operation::new(
            "re",
            vec![
                Object::Real(rect.x0),
                Object::Real(rect.y0),
                Object::Real(rect.width()),
                Object::Real(rect.height()),
            ],
        ));
        ops.push(Operation::new(
            if self.stroke.is_some() { "B" } else { "f" },
            vec![],
        ));
        ops
    }
}

fn rgb_operands(color: Color) -> Vec<Object> {
    color.channels().into_iter().map(Object::Real).collect()
}

/// Encode operations into content stream bytes.
pub(crate) fn encode(operations: Vec<Operation>) -> Result<Vec<u8>> {
    Ok(Content { operations }.encode()?)
}

/// Whether decoded content stream bytes are exactly a standard-mode
/// background layer drawn by [`FilledRect::background_layer`].
///
/// Streams that carry other drawing after a background artifact belong to
/// another producer and are never matched.
pub(crate) fn is_background_layer(bytes: &[u8]) -> bool {
    let Ok(content) = Content::decode(bytes) else {
        return false;
    };

    let ops = content.operations.as_slice();
    let operators = ops.iter().map(|op| op.operator.as_str());
    if !operators.eq(BACKGROUND_OPERATORS) {
        return false;
    }

    let marker = &ops[1];
    let tag = marker.operands.first().and_then(|o| o.as_name().ok());
    let Some(properties) = marker.operands.get(1).and_then(|o| o.as_dict().ok()) else {
        return false;
    };
    let kind = properties.get(b"Type").and_then(|o| o.as_name()).ok();
    let ours = matches!(properties.get(LAYER_MARKER), Ok(Object::Boolean(true)));

    tag == Some(BACKGROUND_ARTIFACT) && kind == Some(BACKGROUND_TYPE) && ours
}
