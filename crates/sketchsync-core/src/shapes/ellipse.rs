//! Ellipse shape.

use super::{
    ExtraAttributes, FillProps, ShapeError, ShapeId, ShapeKind, ShapeTrait, StrokeProps,
    TransformProps, impl_capabilities,
};
use kurbo::{Point, Rect};

/// An ellipse defined by its center and radii.
#[derive(Debug, Clone, PartialEq)]
pub struct Ellipse {
    pub(crate) id: ShapeId,
    cx: f64,
    cy: f64,
    rx: f64,
    ry: f64,
    border: Rect,
    pub fill: FillProps,
    pub stroke: StrokeProps,
    pub transform: TransformProps,
    pub extra: ExtraAttributes,
}

impl_capabilities!(Ellipse: fill, stroke, transform);

impl Ellipse {
    /// Create a new ellipse.
    pub fn new(id: ShapeId, cx: f64, cy: f64, rx: f64, ry: f64) -> Self {
        let mut ellipse = Self {
            id,
            cx,
            cy,
            rx,
            ry,
            border: Rect::ZERO,
            fill: FillProps::default(),
            stroke: StrokeProps::default(),
            transform: TransformProps::default(),
            extra: ExtraAttributes::new(),
        };
        ellipse.update_border();
        ellipse
    }

    pub fn center(&self) -> Point {
        Point::new(self.cx, self.cy)
    }

    pub fn radius_x(&self) -> f64 {
        self.rx
    }

    pub fn radius_y(&self) -> f64 {
        self.ry
    }

    pub fn set_center(&mut self, center: Point) {
        self.cx = center.x;
        self.cy = center.y;
        self.update_border();
    }

    pub fn set_radius_x(&mut self, rx: f64) {
        self.rx = rx;
        self.update_border();
    }

    pub fn set_radius_y(&mut self, ry: f64) {
        self.ry = ry;
        self.update_border();
    }

    fn update_border(&mut self) {
        self.border = Rect::new(
            self.cx - self.rx,
            self.cy - self.ry,
            self.cx + self.rx,
            self.cy + self.ry,
        );
    }
}

impl ShapeTrait for Ellipse {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: ShapeId) {
        self.id = id;
    }

    fn kind(&self) -> ShapeKind {
        ShapeKind::Ellipse
    }

    fn border(&self) -> Option<Rect> {
        Some(self.border)
    }

    fn apply_border_change(&mut self, border: Rect) -> Result<(), ShapeError> {
        // Radius first, the center is derived from it.
        self.rx = border.width() / 2.0;
        self.ry = border.height() / 2.0;
        self.cx = border.x0 + self.rx;
        self.cy = border.y0 + self.ry;
        self.update_border();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_close(a: Rect, b: Rect) -> bool {
        (a.x0 - b.x0).abs() < 1e-9
            && (a.y0 - b.y0).abs() < 1e-9
            && (a.x1 - b.x1).abs() < 1e-9
            && (a.y1 - b.y1).abs() < 1e-9
    }

    #[test]
    fn test_border_from_center_and_radius() {
        let ellipse = Ellipse::new("a_shape_0".into(), 50.0, 40.0, 20.0, 10.0);
        assert_eq!(ellipse.border(), Some(Rect::new(30.0, 30.0, 70.0, 50.0)));
    }

    #[test]
    fn test_apply_border_change_round_trip() {
        let mut ellipse = Ellipse::new("a_shape_0".into(), 0.0, 0.0, 1.0, 1.0);
        let target = Rect::new(10.3, 20.7, 33.1, 41.9);
        ellipse.apply_border_change(target).unwrap();
        assert!(rect_close(ellipse.border().unwrap(), target));
        assert!((ellipse.radius_x() - 11.4).abs() < 1e-9);
        assert!((ellipse.center().x - 21.7).abs() < 1e-9);
    }

    #[test]
    fn test_repeated_moves_do_not_drift() {
        let mut ellipse = Ellipse::new("a_shape_0".into(), 0.0, 0.0, 7.3, 3.1);
        for i in 0..100 {
            let offset = i as f64 * 0.37;
            let border = ellipse.border().unwrap();
            ellipse
                .apply_border_change(Rect::from_origin_size((offset, offset), border.size()))
                .unwrap();
        }
        assert!((ellipse.radius_x() - 7.3).abs() < 1e-9);
        assert!((ellipse.radius_y() - 3.1).abs() < 1e-9);
    }
}
