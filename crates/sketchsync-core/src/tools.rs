//! Drawing tools and the shapes they create.

use crate::path_data::PathData;
use crate::shapes::{
    Ellipse, HasFill, HasStroke, LineCap, Line, Path, Rectangle, Shape, ShapeId, Text,
};
use kurbo::Point;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Pen,
    Line,
    Rectangle,
    Ellipse,
    Text,
}

impl ToolKind {
    /// Whether the tool creates shapes.
    pub fn creates_shapes(self) -> bool {
        self != ToolKind::Select
    }
}

/// Style applied to newly created shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolStyle {
    pub stroke: String,
    pub fill: String,
    pub stroke_width: f64,
    pub linecap: LineCap,
}

/// An in-flight creation gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveTool {
    pub tool: ToolKind,
    pub shape_id: ShapeId,
    /// Where the pointer went down.
    pub start: Point,
}

/// Build the initial shape for a gesture starting at `start`.
///
/// Returns `None` for tools that do not create shapes.
pub fn begin_shape(
    tool: ToolKind,
    id: ShapeId,
    start: Point,
    style: &ToolStyle,
    text: &str,
) -> Option<Shape> {
    let shape = match tool {
        ToolKind::Select => return None,
        ToolKind::Pen => {
            let mut data = PathData::new();
            data.move_to(start.x, start.y, false);
            data.take_change();
            let mut path = Path::new(id, data);
            apply_stroke(&mut path, style);
            path.set_fill(Some("none".to_string()));
            Shape::Path(path)
        }
        ToolKind::Line => {
            let mut line = Line::new(id, start.x, start.y, start.x, start.y);
            apply_stroke(&mut line, style);
            Shape::Line(line)
        }
        ToolKind::Rectangle => {
            let mut rect = Rectangle::new(id, start.x, start.y, 0.0, 0.0);
            apply_stroke(&mut rect, style);
            rect.set_fill(Some(style.fill.clone()));
            Shape::Rect(rect)
        }
        ToolKind::Ellipse => {
            let mut ellipse = Ellipse::new(id, start.x, start.y, 0.0, 0.0);
            apply_stroke(&mut ellipse, style);
            ellipse.set_fill(Some(style.fill.clone()));
            Shape::Ellipse(ellipse)
        }
        ToolKind::Text => Shape::Text(Text::new(id, start.x, start.y, text)),
    };
    Some(shape)
}

/// Update the shape of a gesture as the pointer moves to `current`.
pub fn extend_shape(active: &ActiveTool, shape: &mut Shape, current: Point) {
    let start = active.start;
    match shape {
        Shape::Path(path) => {
            path.data_mut().line_to(current.x, current.y, false);
        }
        Shape::Line(line) => line.set_end(current.x, current.y),
        Shape::Rect(rect) => {
            rect.set_x(start.x.min(current.x));
            rect.set_width((current.x - start.x).abs());
            rect.set_y(start.y.min(current.y));
            rect.set_height((current.y - start.y).abs());
        }
        // The center stays where the gesture started.
        Shape::Ellipse(ellipse) => {
            ellipse.set_radius_x((current.x - start.x).abs());
            ellipse.set_radius_y((current.y - start.y).abs());
        }
        Shape::Text(_) | Shape::Group(_) => {}
    }
}

fn apply_stroke(shape: &mut impl HasStroke, style: &ToolStyle) {
    shape.set_stroke(Some(style.stroke.clone()));
    shape.set_stroke_width(Some(style.stroke_width));
    shape.set_linecap(Some(style.linecap));
}
