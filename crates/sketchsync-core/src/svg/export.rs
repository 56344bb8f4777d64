//! Shape to SVG serialization.

use super::SVG_NAMESPACE;
use crate::document::Document;
use crate::number::fmt_num;
use crate::shapes::Shape;
use std::fmt::{self, Display, Write};

/// Serialize one shape as a standalone, namespaced fragment.
pub fn write_shape(shape: &Shape) -> String {
    ElementSvg {
        shape,
        namespaced: true,
        document: None,
    }
    .to_string()
}

/// Serialize every included shape of a document under an `<svg>` root.
pub fn write_document(document: &Document) -> String {
    DocumentSvg(document).to_string()
}

struct DocumentSvg<'a>(&'a Document);

impl Display for DocumentSvg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shapes = self.0.visible_shapes().collect::<Vec<_>>();
        if shapes.is_empty() {
            return write!(f, "<svg xmlns=\"{}\"/>", SVG_NAMESPACE);
        }
        write!(f, "<svg xmlns=\"{}\">", SVG_NAMESPACE)?;
        for shape in shapes {
            ElementSvg {
                shape,
                namespaced: false,
                document: Some(self.0),
            }
            .fmt(f)?;
        }
        f.write_str("</svg>")
    }
}

struct ElementSvg<'a> {
    shape: &'a Shape,
    namespaced: bool,
    /// Set when writing inside a document, to skip excluded children.
    document: Option<&'a Document>,
}

impl Display for ElementSvg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = self.shape;
        write!(f, "<{}", shape.kind().tag_name())?;
        if self.namespaced {
            write_attr(f, "xmlns", SVG_NAMESPACE)?;
        }
        if !shape.id().is_empty() {
            write_attr(f, "id", shape.id())?;
        }

        match shape {
            Shape::Rect(r) => {
                write_num(f, "x", r.x())?;
                write_num(f, "y", r.y())?;
                write_num(f, "width", r.width())?;
                write_num(f, "height", r.height())?;
                if let Some(rx) = r.rx {
                    write_num(f, "rx", rx)?;
                }
                if let Some(ry) = r.ry {
                    write_num(f, "ry", ry)?;
                }
            }
            Shape::Ellipse(e) => {
                write_num(f, "cx", e.center().x)?;
                write_num(f, "cy", e.center().y)?;
                write_num(f, "rx", e.radius_x())?;
                write_num(f, "ry", e.radius_y())?;
            }
            Shape::Line(l) => {
                write_num(f, "x1", l.start().x)?;
                write_num(f, "y1", l.start().y)?;
                write_num(f, "x2", l.end().x)?;
                write_num(f, "y2", l.end().y)?;
            }
            Shape::Path(p) => write_attr(f, "d", &p.data().to_string())?,
            Shape::Text(t) => {
                write_num(f, "x", t.position.x)?;
                write_num(f, "y", t.position.y)?;
                if let Some(size) = t.font_size {
                    write_num(f, "font-size", size)?;
                }
            }
            Shape::Group(_) => {}
        }

        if let Some(fill) = shape.as_fill().and_then(|s| s.fill()) {
            write_attr(f, "fill", fill)?;
        }
        if let Some(stroke) = shape.as_stroke() {
            if let Some(color) = stroke.stroke() {
                write_attr(f, "stroke", color)?;
            }
            if let Some(width) = stroke.stroke_width() {
                write_num(f, "stroke-width", width)?;
            }
            if let Some(cap) = stroke.linecap() {
                write_attr(f, "stroke-linecap", cap.as_str())?;
            }
        }
        if let Some(transform) = shape.as_transform().transform_props().attribute() {
            write_attr(f, "transform", &transform)?;
        }
        for (name, value) in shape.extra_attributes() {
            write_attr(f, name, value)?;
        }

        match shape {
            Shape::Text(t) => {
                f.write_char('>')?;
                f.write_str(&escape(&t.content))?;
            }
            Shape::Group(g) => {
                let children = g
                    .children
                    .iter()
                    .filter(|c| self.document.is_none_or(|d| !d.is_excluded(c.id())))
                    .collect::<Vec<_>>();
                if children.is_empty() {
                    return f.write_str("/>");
                }
                f.write_char('>')?;
                for child in children {
                    ElementSvg {
                        shape: child,
                        namespaced: false,
                        document: self.document,
                    }
                    .fmt(f)?;
                }
            }
            _ => return f.write_str("/>"),
        }
        write!(f, "</{}>", shape.kind().tag_name())
    }
}

fn write_attr(f: &mut fmt::Formatter<'_>, name: &str, value: &str) -> fmt::Result {
    write!(f, " {}=\"{}\"", name, escape(value))
}

fn write_num(f: &mut fmt::Formatter<'_>, name: &str, value: f64) -> fmt::Result {
    write!(f, " {}=\"{}\"", name, fmt_num(value))
}

/// Escape text for use in attribute values and character data.
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
