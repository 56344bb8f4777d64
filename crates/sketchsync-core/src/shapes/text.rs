//! Text shape.

use super::{
    ExtraAttributes, FillProps, ShapeError, ShapeId, ShapeKind, ShapeTrait, StrokeProps,
    TransformProps, impl_capabilities,
};
use kurbo::{Point, Rect};

/// A text label anchored at its baseline origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub(crate) id: ShapeId,
    /// Anchor position.
    pub position: Point,
    /// Text content.
    pub content: String,
    /// Font size, unset uses the renderer default.
    pub font_size: Option<f64>,
    pub fill: FillProps,
    pub stroke: StrokeProps,
    pub transform: TransformProps,
    pub extra: ExtraAttributes,
}

impl_capabilities!(Text: fill, stroke, transform);

impl Text {
    pub fn new(id: ShapeId, x: f64, y: f64, content: impl Into<String>) -> Self {
        Self {
            id,
            position: Point::new(x, y),
            content: content.into(),
            font_size: None,
            fill: FillProps::default(),
            stroke: StrokeProps::default(),
            transform: TransformProps::default(),
            extra: ExtraAttributes::new(),
        }
    }
}

impl ShapeTrait for Text {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: ShapeId) {
        self.id = id;
    }

    fn kind(&self) -> ShapeKind {
        ShapeKind::Text
    }

    // Glyph metrics are not available here, so text has no border.
    fn border(&self) -> Option<Rect> {
        None
    }

    fn apply_border_change(&mut self, _border: Rect) -> Result<(), ShapeError> {
        Err(ShapeError::BorderUnsupported(ShapeKind::Text))
    }
}
