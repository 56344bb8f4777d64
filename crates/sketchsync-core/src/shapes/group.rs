//! Group shape.

use super::{
    ExtraAttributes, Shape, ShapeError, ShapeId, ShapeKind, ShapeTrait, TransformProps,
    impl_capabilities,
};
use kurbo::Rect;

/// A container of shapes painted in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub(crate) id: ShapeId,
    pub children: Vec<Shape>,
    pub transform: TransformProps,
    pub extra: ExtraAttributes,
}

impl_capabilities!(Group: transform);

impl Group {
    pub fn new(id: ShapeId) -> Self {
        Self {
            id,
            children: Vec::new(),
            transform: TransformProps::default(),
            extra: ExtraAttributes::new(),
        }
    }

    pub fn with_children(id: ShapeId, children: Vec<Shape>) -> Self {
        Self {
            id,
            children,
            transform: TransformProps::default(),
            extra: ExtraAttributes::new(),
        }
    }
}

impl ShapeTrait for Group {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: ShapeId) {
        self.id = id;
    }

    fn kind(&self) -> ShapeKind {
        ShapeKind::Group
    }

    fn border(&self) -> Option<Rect> {
        None
    }

    fn apply_border_change(&mut self, _border: Rect) -> Result<(), ShapeError> {
        Err(ShapeError::BorderUnsupported(ShapeKind::Group))
    }
}
