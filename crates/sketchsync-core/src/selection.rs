//! Dragging selected shapes: moving and resizing through the border rectangle.

use crate::shapes::{Shape, ShapeError, ShapeId};
use kurbo::{Point, Rect, Vec2};

/// Corner handle of a border rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// The diagonally opposite corner.
    pub fn opposite(self) -> Self {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomLeft => Corner::TopRight,
            Corner::BottomRight => Corner::TopLeft,
        }
    }

    /// Position of this corner on `rect`.
    pub fn of(self, rect: Rect) -> Point {
        match self {
            Corner::TopLeft => Point::new(rect.x0, rect.y0),
            Corner::TopRight => Point::new(rect.x1, rect.y0),
            Corner::BottomLeft => Point::new(rect.x0, rect.y1),
            Corner::BottomRight => Point::new(rect.x1, rect.y1),
        }
    }
}

/// How the dragged shape follows the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragKind {
    /// The border origin stays at a fixed offset from the pointer.
    Move { offset: Vec2 },
    /// The border spans from a fixed anchor corner to the pointer.
    Resize { anchor: Point },
}

/// An in-flight drag of one shape.
#[derive(Debug, Clone)]
pub struct DragState {
    pub shape_id: ShapeId,
    pub kind: DragKind,
    /// The shape as it was when the drag started.
    pub before: Shape,
}

impl DragState {
    /// Start moving `shape`, grabbed at `pointer`.
    pub fn begin_move(shape: &Shape, pointer: Point) -> Result<Self, ShapeError> {
        let border = shape
            .border()
            .ok_or(ShapeError::BorderUnsupported(shape.kind()))?;
        Ok(Self {
            shape_id: shape.id().to_string(),
            kind: DragKind::Move {
                offset: border.origin() - pointer,
            },
            before: shape.clone(),
        })
    }

    /// Start resizing `shape` by its `corner` handle. The opposite corner
    /// stays fixed.
    pub fn begin_resize(shape: &Shape, corner: Corner) -> Result<Self, ShapeError> {
        let border = shape
            .border()
            .ok_or(ShapeError::BorderUnsupported(shape.kind()))?;
        Ok(Self {
            shape_id: shape.id().to_string(),
            kind: DragKind::Resize {
                anchor: corner.opposite().of(border),
            },
            before: shape.clone(),
        })
    }

    /// Apply the pointer position to the dragged shape.
    pub fn update(&self, shape: &mut Shape, pointer: Point) -> Result<(), ShapeError> {
        match self.kind {
            DragKind::Move { offset } => shape.move_border_to(pointer + offset),
            DragKind::Resize { anchor } => {
                shape.apply_border_change(Rect::from_points(anchor, pointer))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Line, Rectangle, Text};

    fn rect() -> Shape {
        Shape::Rect(Rectangle::new("a_shape_0".into(), 10.0, 10.0, 20.0, 20.0))
    }

    #[test]
    fn test_corners() {
        let r = Rect::new(0.0, 0.0, 4.0, 2.0);
        assert_eq!(Corner::TopRight.of(r), Point::new(4.0, 0.0));
        assert_eq!(Corner::TopRight.opposite(), Corner::BottomLeft);
        assert_eq!(Corner::BottomLeft.of(r), Point::new(0.0, 2.0));
    }

    #[test]
    fn test_move_keeps_grab_offset() {
        let mut shape = rect();
        let drag = DragState::begin_move(&shape, Point::new(15.0, 12.0)).unwrap();
        drag.update(&mut shape, Point::new(115.0, 52.0)).unwrap();
        assert_eq!(shape.border(), Some(Rect::new(110.0, 50.0, 130.0, 70.0)));
        assert_eq!(drag.before.border(), Some(Rect::new(10.0, 10.0, 30.0, 30.0)));
    }

    #[test]
    fn test_resize_keeps_opposite_corner() {
        let mut shape = rect();
        let drag = DragState::begin_resize(&shape, Corner::BottomRight).unwrap();
        drag.update(&mut shape, Point::new(60.0, 40.0)).unwrap();
        assert_eq!(shape.border(), Some(Rect::new(10.0, 10.0, 60.0, 40.0)));

        // Dragging past the anchor flips the rectangle around it.
        drag.update(&mut shape, Point::new(0.0, 0.0)).unwrap();
        assert_eq!(shape.border(), Some(Rect::new(0.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_resize_line_keeps_direction() {
        let mut shape = Shape::Line(Line::new("a_shape_1".into(), 0.0, 0.0, 10.0, 10.0));
        let drag = DragState::begin_resize(&shape, Corner::BottomRight).unwrap();
        drag.update(&mut shape, Point::new(20.0, 30.0)).unwrap();
        match &shape {
            Shape::Line(line) => {
                assert_eq!(line.start(), Point::new(0.0, 0.0));
                assert_eq!(line.end(), Point::new(20.0, 30.0));
            }
            other => panic!("expected line, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_text_cannot_be_dragged() {
        let shape = Shape::Text(Text::new("a_shape_2".into(), 0.0, 0.0, "x"));
        assert!(DragState::begin_move(&shape, Point::ZERO).is_err());
        assert!(DragState::begin_resize(&shape, Corner::TopLeft).is_err());
    }
}
