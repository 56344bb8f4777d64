//! Free-form path shape.

use super::{
    ExtraAttributes, FillProps, ShapeError, ShapeId, ShapeKind, ShapeTrait, StrokeProps,
    TransformProps, impl_capabilities,
};
use crate::path_data::PathData;
use kurbo::Rect;

/// A path whose geometry is its path data.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub(crate) id: ShapeId,
    data: PathData,
    pub fill: FillProps,
    pub stroke: StrokeProps,
    pub transform: TransformProps,
    pub extra: ExtraAttributes,
}

impl_capabilities!(Path: fill, stroke, transform);

impl Path {
    pub fn new(id: ShapeId, data: PathData) -> Self {
        Self {
            id,
            data,
            fill: FillProps::default(),
            stroke: StrokeProps::default(),
            transform: TransformProps::default(),
            extra: ExtraAttributes::new(),
        }
    }

    pub fn data(&self) -> &PathData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut PathData {
        &mut self.data
    }

    /// Take the change notification left by the last path data edit, carrying
    /// the new `d` value.
    pub fn take_change(&mut self) -> Option<String> {
        self.data.take_change()
    }
}

impl ShapeTrait for Path {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: ShapeId) {
        self.id = id;
    }

    fn kind(&self) -> ShapeKind {
        ShapeKind::Path
    }

    fn border(&self) -> Option<Rect> {
        None
    }

    fn apply_border_change(&mut self, _border: Rect) -> Result<(), ShapeError> {
        Err(ShapeError::BorderUnsupported(ShapeKind::Path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_edit_reports_new_data() {
        let mut path = Path::new("a_shape_0".into(), PathData::new());
        path.data_mut().move_to(1.0, 1.0, false).line_to(4.0, 1.0, false);
        assert_eq!(path.take_change().as_deref(), Some("M1,1H4"));
        assert_eq!(path.take_change(), None);

        // Drawing to the pen position changes nothing.
        path.data_mut().line_to(4.0, 1.0, false);
        assert_eq!(path.take_change(), None);
    }

    #[test]
    fn test_no_border() {
        let mut path = Path::new("a_shape_0".into(), PathData::new());
        assert_eq!(path.border(), None);
        assert!(path.apply_border_change(Rect::ZERO).is_err());
    }
}
