//! SVG to shape deserialization.
//!
//! Elements that are not shapes import as `None` rather than an error, so
//! callers skip them.

use crate::path_data::{PathData, PathParseError};
use crate::shapes::{Ellipse, Group, LineCap, Line, Path, Rectangle, Shape, ShapeKind, Text};
use crate::transform::{Transform, TransformParseError};
use roxmltree::Node;
use thiserror::Error;

/// Errors raised while importing SVG markup.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("Expected an <svg> root element, found <{0}>")]
    NotSvgRoot(String),
    #[error("Invalid number for attribute {attr}: {value:?}")]
    InvalidNumber { attr: &'static str, value: String },
    #[error("Invalid path data: {0}")]
    Path(#[from] PathParseError),
    #[error("Invalid transform: {0}")]
    Transform(#[from] TransformParseError),
}

/// Import a single element, e.g. the payload of a `new` or `change` message.
pub fn import_fragment(xml: &str) -> Result<Option<Shape>, ImportError> {
    let doc = roxmltree::Document::parse(xml)?;
    import_node(doc.root_element())
}

/// Import the children of an `<svg>` root, skipping elements that are not
/// shapes.
pub fn import_document(xml: &str) -> Result<Vec<Shape>, ImportError> {
    let doc = roxmltree::Document::parse(xml)?;
    let root = doc.root_element();
    if root.tag_name().name() != "svg" {
        return Err(ImportError::NotSvgRoot(root.tag_name().name().to_string()));
    }
    import_children(root)
}

fn import_children(node: Node<'_, '_>) -> Result<Vec<Shape>, ImportError> {
    let mut shapes = Vec::new();
    for child in node.children().filter(|n| n.is_element()) {
        if let Some(shape) = import_node(child)? {
            shapes.push(shape);
        }
    }
    Ok(shapes)
}

fn import_node(node: Node<'_, '_>) -> Result<Option<Shape>, ImportError> {
    let tag = node.tag_name().name();
    let Some(kind) = ShapeKind::from_tag(tag) else {
        log::debug!("Skipping unsupported element <{}>", tag);
        return Ok(None);
    };
    let id = node.attribute("id").unwrap_or_default().to_string();

    let mut shape = match kind {
        ShapeKind::Rect => {
            let mut rect = Rectangle::new(
                id,
                number(node, "x")?,
                number(node, "y")?,
                number(node, "width")?,
                number(node, "height")?,
            );
            rect.rx = optional_number(node, "rx")?;
            rect.ry = optional_number(node, "ry")?;
            Shape::Rect(rect)
        }
        ShapeKind::Ellipse => Shape::Ellipse(Ellipse::new(
            id,
            number(node, "cx")?,
            number(node, "cy")?,
            number(node, "rx")?,
            number(node, "ry")?,
        )),
        ShapeKind::Line => Shape::Line(Line::new(
            id,
            number(node, "x1")?,
            number(node, "y1")?,
            number(node, "x2")?,
            number(node, "y2")?,
        )),
        ShapeKind::Path => {
            let data = PathData::parse(node.attribute("d").unwrap_or_default())?;
            Shape::Path(Path::new(id, data))
        }
        ShapeKind::Text => {
            let content = node
                .descendants()
                .filter(|n| n.is_text())
                .filter_map(|n| n.text())
                .collect::<String>();
            let mut text = Text::new(id, number(node, "x")?, number(node, "y")?, content);
            text.font_size = optional_number(node, "font-size")?;
            Shape::Text(text)
        }
        ShapeKind::Group => Shape::Group(Group::with_children(id, import_children(node)?)),
    };

    if let Some(fill) = shape.as_fill_mut() {
        fill.set_fill(node.attribute("fill").map(str::to_string));
    }
    if let Some(stroke) = shape.as_stroke_mut() {
        stroke.set_stroke(node.attribute("stroke").map(str::to_string));
        stroke.set_stroke_width(optional_number(node, "stroke-width")?);
        stroke.set_linecap(node.attribute("stroke-linecap").and_then(|value| {
            let cap = LineCap::from_name(value);
            if cap.is_none() {
                log::debug!("Ignoring unknown stroke-linecap {:?}", value);
            }
            cap
        }));
    }
    if let Some(value) = node.attribute("transform").filter(|v| !v.trim().is_empty()) {
        shape
            .as_transform_mut()
            .set_transform(Some(Transform::parse(value)?));
    }

    let typed = typed_attributes(&shape);
    let extra = node
        .attributes()
        .filter(|attr| {
            if attr.namespace().is_some() {
                log::debug!("Dropping namespaced attribute {} on <{}>", attr.name(), tag);
                return false;
            }
            !typed.iter().any(|name| *name == attr.name())
        })
        .map(|attr| (attr.name().to_string(), attr.value().to_string()))
        .collect();
    *shape.extra_attributes_mut() = extra;

    Ok(Some(shape))
}

/// Attributes read into typed fields of `shape`.
fn typed_attributes(shape: &Shape) -> Vec<&'static str> {
    let geometry: &[&str] = match shape.kind() {
        ShapeKind::Rect => &["x", "y", "width", "height", "rx", "ry"],
        ShapeKind::Ellipse => &["cx", "cy", "rx", "ry"],
        ShapeKind::Line => &["x1", "y1", "x2", "y2"],
        ShapeKind::Path => &["d"],
        ShapeKind::Text => &["x", "y", "font-size"],
        ShapeKind::Group => &[],
    };
    let mut names = vec!["id", "transform"];
    names.extend_from_slice(geometry);
    if shape.as_fill().is_some() {
        names.push("fill");
    }
    if shape.as_stroke().is_some() {
        names.extend_from_slice(&["stroke", "stroke-width", "stroke-linecap"]);
    }
    names
}

/// Numeric geometry attribute; absent attributes read as zero.
fn number(node: Node<'_, '_>, attr: &'static str) -> Result<f64, ImportError> {
    Ok(optional_number(node, attr)?.unwrap_or(0.0))
}

fn optional_number(node: Node<'_, '_>, attr: &'static str) -> Result<Option<f64>, ImportError> {
    let Some(value) = node.attribute(attr) else {
        return Ok(None);
    };
    let trimmed = value.trim();
    let trimmed = trimmed.strip_suffix("px").unwrap_or(trimmed);
    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|_| ImportError::InvalidNumber {
            attr,
            value: value.to_string(),
        })
}
