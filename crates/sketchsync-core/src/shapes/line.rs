//! Straight line shape.

use super::{
    ExtraAttributes, ShapeError, ShapeId, ShapeKind, ShapeTrait, StrokeProps, TransformProps,
    impl_capabilities,
};
use kurbo::{Point, Rect};

/// A line segment between two endpoints.
///
/// The border is the bounding box of the endpoints. Applying a border change
/// keeps each endpoint on the side of the box it was on, so `start` stays
/// `start`.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub(crate) id: ShapeId,
    start: Point,
    end: Point,
    border: Rect,
    pub stroke: StrokeProps,
    pub transform: TransformProps,
    pub extra: ExtraAttributes,
}

impl_capabilities!(Line: stroke, transform);

impl Line {
    /// Create a new line from `(x1, y1)` to `(x2, y2)`.
    pub fn new(id: ShapeId, x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        let mut line = Self {
            id,
            start: Point::new(x1, y1),
            end: Point::new(x2, y2),
            border: Rect::ZERO,
            stroke: StrokeProps::default(),
            transform: TransformProps::default(),
            extra: ExtraAttributes::new(),
        };
        line.update_border();
        line
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn set_start(&mut self, x: f64, y: f64) {
        self.start = Point::new(x, y);
        self.update_border();
    }

    pub fn set_end(&mut self, x: f64, y: f64) {
        self.end = Point::new(x, y);
        self.update_border();
    }

    fn update_border(&mut self) {
        self.border = Rect::from_points(self.start, self.end);
    }
}

impl ShapeTrait for Line {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: ShapeId) {
        self.id = id;
    }

    fn kind(&self) -> ShapeKind {
        ShapeKind::Line
    }

    fn border(&self) -> Option<Rect> {
        Some(self.border)
    }

    fn apply_border_change(&mut self, border: Rect) -> Result<(), ShapeError> {
        if self.start.x <= self.end.x {
            self.start.x = border.x0;
            self.end.x = border.x1;
        } else {
            self.start.x = border.x1;
            self.end.x = border.x0;
        }
        if self.start.y <= self.end.y {
            self.start.y = border.y0;
            self.end.y = border.y1;
        } else {
            self.start.y = border.y1;
            self.end.y = border.y0;
        }
        self.update_border();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_border_is_bounding_box() {
        let line = Line::new("a_shape_0".into(), 30.0, 5.0, 10.0, 25.0);
        assert_eq!(line.border(), Some(Rect::new(10.0, 5.0, 30.0, 25.0)));
    }

    #[test]
    fn test_apply_border_keeps_endpoint_identity() {
        // Start is right of and above end.
        let mut line = Line::new("a_shape_0".into(), 30.0, 5.0, 10.0, 25.0);
        line.apply_border_change(Rect::new(100.0, 100.0, 140.0, 160.0))
            .unwrap();
        assert_eq!(line.start(), Point::new(140.0, 100.0));
        assert_eq!(line.end(), Point::new(100.0, 160.0));
        assert_eq!(line.border(), Some(Rect::new(100.0, 100.0, 140.0, 160.0)));
    }

    #[test]
    fn test_apply_border_forward_line() {
        let mut line = Line::new("a_shape_0".into(), 0.0, 0.0, 10.0, 10.0);
        line.apply_border_change(Rect::new(5.0, 5.0, 25.0, 15.0)).unwrap();
        assert_eq!(line.start(), Point::new(5.0, 5.0));
        assert_eq!(line.end(), Point::new(25.0, 15.0));
    }
}
