//! Rectangle shape.

use super::{
    ExtraAttributes, FillProps, ShapeError, ShapeId, ShapeKind, ShapeTrait, StrokeProps,
    TransformProps, impl_capabilities,
};
use kurbo::Rect;

/// An axis-aligned rectangle with optional rounded corners.
#[derive(Debug, Clone, PartialEq)]
pub struct Rectangle {
    pub(crate) id: ShapeId,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    /// Horizontal corner radius.
    pub rx: Option<f64>,
    /// Vertical corner radius.
    pub ry: Option<f64>,
    border: Rect,
    pub fill: FillProps,
    pub stroke: StrokeProps,
    pub transform: TransformProps,
    pub extra: ExtraAttributes,
}

impl_capabilities!(Rectangle: fill, stroke, transform);

impl Rectangle {
    /// Create a new rectangle.
    pub fn new(id: ShapeId, x: f64, y: f64, width: f64, height: f64) -> Self {
        let mut rect = Self {
            id,
            x,
            y,
            width,
            height,
            rx: None,
            ry: None,
            border: Rect::ZERO,
            fill: FillProps::default(),
            stroke: StrokeProps::default(),
            transform: TransformProps::default(),
            extra: ExtraAttributes::new(),
        };
        rect.update_border();
        rect
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn set_x(&mut self, x: f64) {
        self.x = x;
        self.update_border();
    }

    pub fn set_y(&mut self, y: f64) {
        self.y = y;
        self.update_border();
    }

    pub fn set_width(&mut self, width: f64) {
        self.width = width;
        self.update_border();
    }

    pub fn set_height(&mut self, height: f64) {
        self.height = height;
        self.update_border();
    }

    fn update_border(&mut self) {
        self.border = Rect::new(self.x, self.y, self.x + self.width, self.y + self.height);
    }
}

impl ShapeTrait for Rectangle {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: ShapeId) {
        self.id = id;
    }

    fn kind(&self) -> ShapeKind {
        ShapeKind::Rect
    }

    fn border(&self) -> Option<Rect> {
        Some(self.border)
    }

    fn apply_border_change(&mut self, border: Rect) -> Result<(), ShapeError> {
        self.x = border.x0;
        self.y = border.y0;
        self.width = border.width();
        self.height = border.height();
        self.update_border();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_border_follows_setters() {
        let mut rect = Rectangle::new("a_shape_0".into(), 10.0, 10.0, 0.0, 0.0);
        assert_eq!(rect.border(), Some(Rect::new(10.0, 10.0, 10.0, 10.0)));
        rect.set_width(50.0);
        rect.set_height(30.0);
        assert_eq!(rect.border(), Some(Rect::new(10.0, 10.0, 60.0, 40.0)));
    }

    #[test]
    fn test_apply_border_change_round_trip() {
        let mut rect = Rectangle::new("a_shape_0".into(), 0.0, 0.0, 5.0, 5.0);
        let target = Rect::new(12.5, -3.0, 40.0, 17.25);
        rect.apply_border_change(target).unwrap();
        assert_eq!(rect.border(), Some(target));
        assert!((rect.x() - 12.5).abs() < f64::EPSILON);
        assert!((rect.width() - 27.5).abs() < f64::EPSILON);
        assert!((rect.height() - 20.25).abs() < f64::EPSILON);
    }
}
