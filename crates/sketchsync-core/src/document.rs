//! The shared drawing: an ordered tree of shapes.

use crate::shapes::{Shape, ShapeId};
use crate::svg::{self, ImportError};
use kurbo::Point;
use std::collections::HashSet;
use uuid::Uuid;

/// A drawing containing all shapes in paint order (back to front).
///
/// Shapes are looked up by id with a depth-first search that descends into
/// groups. Excluded shapes stay in the tree, and so can be found and
/// restored, but are not painted or written out.
#[derive(Debug, Clone)]
pub struct Document {
    /// Unique document identifier.
    pub id: String,
    shapes: Vec<Shape>,
    excluded: HashSet<ShapeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            shapes: Vec::new(),
            excluded: HashSet::new(),
        }
    }

    /// Read a document from its SVG persistence format.
    pub fn from_svg(xml: &str) -> Result<Self, ImportError> {
        let mut doc = Self::new();
        doc.shapes = svg::import_document(xml)?;
        log::debug!("Loaded document {} with {} shapes", doc.id, doc.shapes.len());
        Ok(doc)
    }

    /// Write the included shapes as an SVG document.
    pub fn to_svg(&self) -> String {
        svg::write_document(self)
    }

    /// Append a shape on top of all others.
    pub fn push(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    /// Insert a top-level shape at `index`, clamped to the end.
    pub fn insert(&mut self, index: usize, shape: Shape) {
        let index = index.min(self.shapes.len());
        self.shapes.insert(index, shape);
    }

    /// Top-level shapes, including excluded ones.
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Top-level shapes that are painted, back to front.
    pub fn visible_shapes(&self) -> impl Iterator<Item = &Shape> {
        self.shapes
            .iter()
            .filter(|s| !self.excluded.contains(s.id()))
    }

    /// Find a shape anywhere in the tree.
    pub fn get(&self, id: &str) -> Option<&Shape> {
        find_in(&self.shapes, id)
    }

    /// Find a shape anywhere in the tree, mutably.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Shape> {
        find_in_mut(&mut self.shapes, id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Paint-order index of a top-level shape.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.shapes.iter().position(|s| s.id() == id)
    }

    /// Remove a shape from wherever it sits in the tree.
    pub fn remove(&mut self, id: &str) -> Option<Shape> {
        let removed = remove_in(&mut self.shapes, id);
        if removed.is_some() {
            self.excluded.remove(id);
        }
        removed
    }

    /// Replace the shape sharing `shape`'s id, keeping its place in paint
    /// order. Returns the old shape, or `None` (dropping `shape`) when no
    /// shape has that id.
    pub fn replace(&mut self, shape: Shape) -> Option<Shape> {
        let id = shape.id().to_string();
        replace_in(&mut self.shapes, &id, shape).ok()
    }

    /// Exclude a shape from painting, or include it again. Returns false if
    /// there is no such shape.
    pub fn set_excluded(&mut self, id: &str, excluded: bool) -> bool {
        if !self.contains(id) {
            return false;
        }
        if excluded {
            self.excluded.insert(id.to_string());
        } else {
            self.excluded.remove(id);
        }
        true
    }

    pub fn is_excluded(&self, id: &str) -> bool {
        self.excluded.contains(id)
    }

    /// Find painted top-level shapes whose border contains `point`,
    /// front-most first.
    pub fn shapes_at(&self, point: Point) -> Vec<ShapeId> {
        self.shapes
            .iter()
            .rev()
            .filter(|s| !self.excluded.contains(s.id()) && s.contains(point))
            .map(|s| s.id().to_string())
            .collect()
    }

    /// Remove all shapes.
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.excluded.clear();
    }

    /// Number of top-level shapes, including excluded ones.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

fn find_in<'a>(shapes: &'a [Shape], id: &str) -> Option<&'a Shape> {
    for shape in shapes {
        if shape.id() == id {
            return Some(shape);
        }
        if let Some(found) = find_in(shape.children(), id) {
            return Some(found);
        }
    }
    None
}

fn find_in_mut<'a>(shapes: &'a mut [Shape], id: &str) -> Option<&'a mut Shape> {
    for shape in shapes.iter_mut() {
        if shape.id() == id {
            return Some(shape);
        }
        if let Some(children) = shape.children_mut() {
            if let Some(found) = find_in_mut(children, id) {
                return Some(found);
            }
        }
    }
    None
}

fn remove_in(shapes: &mut Vec<Shape>, id: &str) -> Option<Shape> {
    for i in 0..shapes.len() {
        if shapes[i].id() == id {
            return Some(shapes.remove(i));
        }
        if let Some(children) = shapes[i].children_mut() {
            if let Some(removed) = remove_in(children, id) {
                return Some(removed);
            }
        }
    }
    None
}

/// Depth-first replace; hands the new shape back when the id is absent.
fn replace_in(shapes: &mut [Shape], id: &str, mut shape: Shape) -> Result<Shape, Shape> {
    for i in 0..shapes.len() {
        if shapes[i].id() == id {
            return Ok(std::mem::replace(&mut shapes[i], shape));
        }
        if let Some(children) = shapes[i].children_mut() {
            match replace_in(children, id, shape) {
                Ok(old) => return Ok(old),
                Err(back) => shape = back,
            }
        }
    }
    Err(shape)
}
