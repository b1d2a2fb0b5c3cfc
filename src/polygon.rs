//! Closed fill polygon

use crate::BBox2;
use nalgebra::Vector2;

/// A closed polyline; the last vertex connects back to the first.
///
/// Fill curves of very shallow patterns can have fewer than three vertices,
/// so no minimum count is enforced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polygon {
    vertices: Vec<Vector2<f32>>,
}

impl Polygon {
    pub fn new(vertices: Vec<Vector2<f32>>) -> Self {
        Self { vertices }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, vertex: Vector2<f32>) {
        self.vertices.push(vertex);
    }

    pub fn vertices(&self) -> &[Vector2<f32>] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn bbox(&self) -> BBox2 {
        BBox2::from_points(&self.vertices)
    }
}
