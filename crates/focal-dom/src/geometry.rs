//! Geometry APIs
//!
//! The offset box used for "is this element rendered" checks.
//! Focal has no layout engine: elements without an explicit box get a
//! nominal size from their tag, and anything hidden renders at 0x0.

/// Element geometry state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ElementGeometry {
    pub offset_width: f64,
    pub offset_height: f64,
}

impl ElementGeometry {
    /// Box of the given size
    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            offset_width: width,
            offset_height: height,
        }
    }
}

/// Nominal box for an element that has no explicit geometry
pub(crate) fn nominal_size(tag: &str) -> (f64, f64) {
    match tag {
        "html" | "body" => (1024.0, 768.0),
        "button" => (96.0, 32.0),
        "input" | "select" => (200.0, 32.0),
        "textarea" => (200.0, 64.0),
        "a" | "span" | "label" => (80.0, 18.0),
        "br" | "script" | "style" | "template" | "head" | "meta" | "title" => (0.0, 0.0),
        _ => (320.0, 24.0),
    }
}
