//! Shape definitions for the shared drawing.

mod ellipse;
mod group;
mod line;
mod path;
mod rectangle;
mod text;

pub use ellipse::Ellipse;
pub use group::Group;
pub use line::Line;
pub use path::Path;
pub use rectangle::Rectangle;
pub use text::Text;

use crate::transform::Transform;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Unique identifier for shapes, `<author>_shape_<counter>`.
pub type ShapeId = String;

/// Build the id for the `counter`-th shape created by `author`.
pub fn shape_id(author: &str, counter: u64) -> ShapeId {
    format!("{}_shape_{}", author, counter)
}

/// Errors raised by shape geometry operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    #[error("{0} shapes have no border rectangle")]
    BorderUnsupported(ShapeKind),
}

/// Element kind of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Rect,
    Ellipse,
    Line,
    Path,
    Text,
    Group,
}

impl ShapeKind {
    /// Element name in the serialized form.
    pub fn tag_name(self) -> &'static str {
        match self {
            ShapeKind::Rect => "rect",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Line => "line",
            ShapeKind::Path => "path",
            ShapeKind::Text => "text",
            ShapeKind::Group => "g",
        }
    }

    /// Kind for an element name, `None` for elements that are not shapes.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "rect" => Some(ShapeKind::Rect),
            "ellipse" => Some(ShapeKind::Ellipse),
            "line" => Some(ShapeKind::Line),
            "path" => Some(ShapeKind::Path),
            "text" => Some(ShapeKind::Text),
            "g" => Some(ShapeKind::Group),
            _ => None,
        }
    }

    /// Whether the kind maps its geometry to a border rectangle.
    pub fn has_border(self) -> bool {
        matches!(self, ShapeKind::Rect | ShapeKind::Ellipse | ShapeKind::Line)
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag_name())
    }
}

/// Stroke line cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    Butt,
    #[default]
    Round,
    Square,
}

impl LineCap {
    pub fn as_str(self) -> &'static str {
        match self {
            LineCap::Butt => "butt",
            LineCap::Round => "round",
            LineCap::Square => "square",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "butt" => Some(LineCap::Butt),
            "round" => Some(LineCap::Round),
            "square" => Some(LineCap::Square),
            _ => None,
        }
    }
}

/// Attributes with no typed field, kept in document order and written back
/// unchanged.
pub type ExtraAttributes = Vec<(String, String)>;

/// Fill attributes. `None` leaves the attribute unset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FillProps {
    pub fill: Option<String>,
}

/// Stroke attributes. `None` leaves the attribute unset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrokeProps {
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
    pub linecap: Option<LineCap>,
}

/// Which form of the transformation is written to the `transform` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransformNotation {
    #[default]
    Normal,
    Matrix,
}

/// Transform attribute of a shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformProps {
    pub transform: Option<Transform>,
    pub notation: TransformNotation,
}

impl TransformProps {
    /// Value of the `transform` attribute, if one is set.
    pub fn attribute(&self) -> Option<String> {
        self.transform.as_ref().map(|t| match self.notation {
            TransformNotation::Normal => t.to_string(),
            TransformNotation::Matrix => t.to_matrix_string().to_string(),
        })
    }
}

/// Shapes that can be filled.
pub trait HasFill {
    fn fill_props(&self) -> &FillProps;
    fn fill_props_mut(&mut self) -> &mut FillProps;

    fn fill(&self) -> Option<&str> {
        self.fill_props().fill.as_deref()
    }

    fn set_fill(&mut self, fill: Option<String>) {
        self.fill_props_mut().fill = fill;
    }
}

/// Shapes with an outline.
pub trait HasStroke {
    fn stroke_props(&self) -> &StrokeProps;
    fn stroke_props_mut(&mut self) -> &mut StrokeProps;

    fn stroke(&self) -> Option<&str> {
        self.stroke_props().stroke.as_deref()
    }

    fn set_stroke(&mut self, stroke: Option<String>) {
        self.stroke_props_mut().stroke = stroke;
    }

    fn stroke_width(&self) -> Option<f64> {
        self.stroke_props().stroke_width
    }

    fn set_stroke_width(&mut self, width: Option<f64>) {
        self.stroke_props_mut().stroke_width = width;
    }

    fn linecap(&self) -> Option<LineCap> {
        self.stroke_props().linecap
    }

    fn set_linecap(&mut self, linecap: Option<LineCap>) {
        self.stroke_props_mut().linecap = linecap;
    }
}

/// Shapes that accept a `transform` attribute.
pub trait HasTransform {
    fn transform_props(&self) -> &TransformProps;
    fn transform_props_mut(&mut self) -> &mut TransformProps;

    fn transform(&self) -> Option<&Transform> {
        self.transform_props().transform.as_ref()
    }

    fn transform_mut(&mut self) -> Option<&mut Transform> {
        self.transform_props_mut().transform.as_mut()
    }

    fn set_transform(&mut self, transform: Option<Transform>) {
        self.transform_props_mut().transform = transform;
    }

    fn set_notation(&mut self, notation: TransformNotation) {
        self.transform_props_mut().notation = notation;
    }
}

macro_rules! impl_capabilities {
    ($ty:ty: fill $(, $rest:ident)*) => {
        impl $crate::shapes::HasFill for $ty {
            fn fill_props(&self) -> &$crate::shapes::FillProps { &self.fill }
            fn fill_props_mut(&mut self) -> &mut $crate::shapes::FillProps { &mut self.fill }
        }
        impl_capabilities!($ty: $($rest),*);
    };
    ($ty:ty: stroke $(, $rest:ident)*) => {
        impl $crate::shapes::HasStroke for $ty {
            fn stroke_props(&self) -> &$crate::shapes::StrokeProps { &self.stroke }
            fn stroke_props_mut(&mut self) -> &mut $crate::shapes::StrokeProps { &mut self.stroke }
        }
        impl_capabilities!($ty: $($rest),*);
    };
    ($ty:ty: transform $(, $rest:ident)*) => {
        impl $crate::shapes::HasTransform for $ty {
            fn transform_props(&self) -> &$crate::shapes::TransformProps { &self.transform }
            fn transform_props_mut(&mut self) -> &mut $crate::shapes::TransformProps { &mut self.transform }
        }
        impl_capabilities!($ty: $($rest),*);
    };
    ($ty:ty:) => {};
}
pub(crate) use impl_capabilities;

/// Common trait for all shapes.
pub trait ShapeTrait {
    /// Get the unique identifier.
    fn id(&self) -> &str;

    /// Replace the identifier.
    fn set_id(&mut self, id: ShapeId);

    /// Element kind.
    fn kind(&self) -> ShapeKind;

    /// Border rectangle derived from the geometry, `None` for kinds that
    /// do not track one.
    fn border(&self) -> Option<Rect>;

    /// Rewrite the geometry so that [`ShapeTrait::border`] equals `border`.
    fn apply_border_change(&mut self, border: Rect) -> Result<(), ShapeError>;
}

/// Enum wrapper for all shape types.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect(Rectangle),
    Ellipse(Ellipse),
    Line(Line),
    Path(Path),
    Text(Text),
    Group(Group),
}

macro_rules! dispatch {
    ($self:expr, $s:ident => $body:expr) => {
        match $self {
            Shape::Rect($s) => $body,
            Shape::Ellipse($s) => $body,
            Shape::Line($s) => $body,
            Shape::Path($s) => $body,
            Shape::Text($s) => $body,
            Shape::Group($s) => $body,
        }
    };
}

impl Shape {
    pub fn id(&self) -> &str {
        dispatch!(self, s => s.id())
    }

    pub fn set_id(&mut self, id: ShapeId) {
        dispatch!(self, s => s.set_id(id))
    }

    pub fn kind(&self) -> ShapeKind {
        dispatch!(self, s => s.kind())
    }

    pub fn border(&self) -> Option<Rect> {
        dispatch!(self, s => s.border())
    }

    pub fn apply_border_change(&mut self, border: Rect) -> Result<(), ShapeError> {
        dispatch!(self, s => s.apply_border_change(border))
    }

    /// Move the border origin to `origin`, keeping its size.
    pub fn move_border_to(&mut self, origin: Point) -> Result<(), ShapeError> {
        let border = self
            .border()
            .ok_or(ShapeError::BorderUnsupported(self.kind()))?;
        self.apply_border_change(Rect::from_origin_size(origin, border.size()))
    }

    /// Whether `point` lies within the border rectangle.
    pub fn contains(&self, point: Point) -> bool {
        self.border().is_some_and(|b| {
            point.x >= b.x0 && point.x <= b.x1 && point.y >= b.y0 && point.y <= b.y1
        })
    }

    /// Drain the change notifications raised by edits to the path data and
    /// the transform. Returns whether there were any.
    pub fn take_change(&mut self) -> bool {
        let path = match self {
            Shape::Path(path) => path.take_change().is_some(),
            _ => false,
        };
        let transform = self
            .as_transform_mut()
            .transform_mut()
            .and_then(Transform::take_change)
            .is_some();
        path || transform
    }

    pub fn extra_attributes(&self) -> &ExtraAttributes {
        dispatch!(self, s => &s.extra)
    }

    pub fn extra_attributes_mut(&mut self) -> &mut ExtraAttributes {
        dispatch!(self, s => &mut s.extra)
    }

    /// Child shapes, empty unless this is a group.
    pub fn children(&self) -> &[Shape] {
        match self {
            Shape::Group(g) => &g.children,
            _ => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Shape>> {
        match self {
            Shape::Group(g) => Some(&mut g.children),
            _ => None,
        }
    }

    pub fn as_fill(&self) -> Option<&dyn HasFill> {
        match self {
            Shape::Rect(s) => Some(s),
            Shape::Ellipse(s) => Some(s),
            Shape::Path(s) => Some(s),
            Shape::Text(s) => Some(s),
            Shape::Line(_) | Shape::Group(_) => None,
        }
    }

    pub fn as_fill_mut(&mut self) -> Option<&mut dyn HasFill> {
        match self {
            Shape::Rect(s) => Some(s),
            Shape::Ellipse(s) => Some(s),
            Shape::Path(s) => Some(s),
            Shape::Text(s) => Some(s),
            Shape::Line(_) | Shape::Group(_) => None,
        }
    }

    pub fn as_stroke(&self) -> Option<&dyn HasStroke> {
        match self {
            Shape::Rect(s) => Some(s),
            Shape::Ellipse(s) => Some(s),
            Shape::Line(s) => Some(s),
            Shape::Path(s) => Some(s),
            Shape::Text(s) => Some(s),
            Shape::Group(_) => None,
        }
    }

    pub fn as_stroke_mut(&mut self) -> Option<&mut dyn HasStroke> {
        match self {
            Shape::Rect(s) => Some(s),
            Shape::Ellipse(s) => Some(s),
            Shape::Line(s) => Some(s),
            Shape::Path(s) => Some(s),
            Shape::Text(s) => Some(s),
            Shape::Group(_) => None,
        }
    }

    pub fn as_transform(&self) -> &dyn HasTransform {
        dispatch!(self, s => s)
    }

    pub fn as_transform_mut(&mut self) -> &mut dyn HasTransform {
        dispatch!(self, s => s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_id_format() {
        assert_eq!(shape_id("alice", 0), "alice_shape_0");
        assert_eq!(shape_id("bob", 12), "bob_shape_12");
    }

    #[test]
    fn test_tag_round_trip() {
        for kind in [
            ShapeKind::Rect,
            ShapeKind::Ellipse,
            ShapeKind::Line,
            ShapeKind::Path,
            ShapeKind::Text,
            ShapeKind::Group,
        ] {
            assert_eq!(ShapeKind::from_tag(kind.tag_name()), Some(kind));
        }
        assert_eq!(ShapeKind::from_tag("circle"), None);
    }

    #[test]
    fn test_capabilities_per_kind() {
        let line = Shape::Line(Line::new("a_shape_0".into(), 0.0, 0.0, 1.0, 1.0));
        assert!(line.as_fill().is_none());
        assert!(line.as_stroke().is_some());

        let group = Shape::Group(Group::new("a_shape_1".into()));
        assert!(group.as_fill().is_none());
        assert!(group.as_stroke().is_none());

        let rect = Shape::Rect(Rectangle::new("a_shape_2".into(), 0.0, 0.0, 1.0, 1.0));
        assert!(rect.as_fill().is_some());
        assert!(rect.as_stroke().is_some());
    }

    #[test]
    fn test_move_border_keeps_size() {
        let mut shape = Shape::Rect(Rectangle::new("a_shape_0".into(), 10.0, 10.0, 50.0, 30.0));
        shape.move_border_to(Point::new(100.0, 200.0)).unwrap();
        assert_eq!(shape.border(), Some(Rect::new(100.0, 200.0, 150.0, 230.0)));

        let mut text = Shape::Text(Text::new("a_shape_1".into(), 0.0, 0.0, "hi"));
        assert_eq!(
            text.move_border_to(Point::ZERO),
            Err(ShapeError::BorderUnsupported(ShapeKind::Text))
        );
    }

    #[test]
    fn test_take_change_drains_path_and_transform() {
        let mut shape = Shape::Path(Path::new(
            "a_shape_0".into(),
            crate::path_data::PathData::new(),
        ));
        assert!(!shape.take_change());

        if let Shape::Path(path) = &mut shape {
            path.data_mut().move_to(2.0, 3.0, false);
        }
        assert!(shape.take_change());
        assert!(!shape.take_change());

        shape
            .as_transform_mut()
            .set_transform(Some(Transform::translate(1.0, 1.0)));
        assert!(!shape.take_change());
        if let Some(t) = shape.as_transform_mut().transform_mut() {
            t.update(|kind| *kind = crate::transform::TransformKind::Translate { tx: 4.0, ty: 1.0 });
        }
        assert!(shape.take_change());
        assert!(!shape.take_change());
    }

    #[test]
    fn test_contains_uses_border() {
        let shape = Shape::Ellipse(Ellipse::new("a_shape_0".into(), 50.0, 50.0, 10.0, 5.0));
        assert!(shape.contains(Point::new(55.0, 52.0)));
        assert!(!shape.contains(Point::new(70.0, 50.0)));
    }

    #[test]
    fn test_transform_attribute_notation() {
        let mut rect = Rectangle::new("a_shape_0".into(), 0.0, 0.0, 1.0, 1.0);
        rect.set_transform(Some(Transform::translate(3.0, 4.0)));
        assert_eq!(
            rect.transform_props().attribute().as_deref(),
            Some("translate(3,4)")
        );
        rect.set_notation(TransformNotation::Matrix);
        assert_eq!(
            rect.transform_props().attribute().as_deref(),
            Some("matrix(1,0,0,1,3,4)")
        );
    }
}
