//! Vector output produced by a renderer's layout pass.
//!
//! [`VectorOutput`] is an owned SVG document. Tessera never edits the markup;
//! it only inspects the root `<svg>` element to decide whether the renderer
//! produced anything usable and how large it is.

use std::fmt;

use log::trace;
use svg::{
    node::element::tag::Type,
    parser::Event,
};

/// Width and height of a vector document in user units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns `true` when both dimensions are strictly positive and finite.
    pub fn is_drawable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// SVG markup emitted by a renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorOutput {
    markup: String,
}

impl VectorOutput {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.markup
    }

    pub fn into_string(self) -> String {
        self.markup
    }

    pub fn len(&self) -> usize {
        self.markup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markup.trim().is_empty()
    }

    /// Returns `true` if the markup contains a root `<svg>` element.
    ///
    /// # Examples
    ///
    /// ```
    /// use tessera_core::vector::VectorOutput;
    ///
    /// assert!(VectorOutput::new(r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#).has_svg_root());
    /// assert!(!VectorOutput::new("<p>not a drawing</p>").has_svg_root());
    /// ```
    pub fn has_svg_root(&self) -> bool {
        self.root_attributes().is_some()
    }

    /// Returns the intrinsic size of the document.
    ///
    /// Absolute `width`/`height` attributes win; percentage or missing
    /// dimensions fall back to the `viewBox`.
    pub fn intrinsic_size(&self) -> Option<Size> {
        let attributes = self.root_attributes()?;

        let from_attributes = match (
            attributes.width.as_deref().and_then(parse_length),
            attributes.height.as_deref().and_then(parse_length),
        ) {
            (Some(width), Some(height)) => Some(Size::new(width, height)),
            _ => None,
        };

        let size = from_attributes.or_else(|| {
            attributes
                .view_box
                .as_deref()
                .and_then(parse_view_box_size)
        });
        trace!(size:? = size; "Measured vector output");
        size.filter(Size::is_drawable)
    }

    fn root_attributes(&self) -> Option<RootAttributes> {
        let parser = svg::read(&self.markup).ok()?;
        for event in parser {
            if let Event::Tag(name, Type::Start | Type::Empty, attributes) = event {
                if name != "svg" {
                    return None;
                }
                let get = |key: &str| attributes.get(key).map(|value| value.to_string());
                return Some(RootAttributes {
                    width: get("width"),
                    height: get("height"),
                    view_box: get("viewBox"),
                });
            }
        }
        None
    }
}

impl fmt::Display for VectorOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.markup)
    }
}

struct RootAttributes {
    width: Option<String>,
    height: Option<String>,
    view_box: Option<String>,
}

/// Parses an absolute SVG length (`"120"`, `"120.5px"`). Percentages and
/// other relative units are rejected.
fn parse_length(raw: &str) -> Option<f32> {
    let raw = raw.trim();
    let number = raw.strip_suffix("px").unwrap_or(raw);
    number.trim().parse::<f32>().ok()
}

fn parse_view_box_size(raw: &str) -> Option<Size> {
    let numbers: Vec<f32> = raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;

    match numbers.as_slice() {
        [_, _, width, height] => Some(Size::new(*width, *height)),
        _ => None,
    }
}
