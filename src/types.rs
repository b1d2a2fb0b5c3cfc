//! Basic geometry types

use nalgebra::{Vector2, Vector3};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 2D Bounding Box
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BBox2 {
    pub min: Vector2<f32>,
    pub max: Vector2<f32>,
}

impl BBox2 {
    pub fn new(min: Vector2<f32>, max: Vector2<f32>) -> Self {
        debug_assert!(min.x <= max.x);
        debug_assert!(min.y <= max.y);
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Vector2::new(f32::MAX, f32::MAX),
            max: Vector2::new(f32::MIN, f32::MIN),
        }
    }

    pub fn size(&self) -> Vector2<f32> {
        self.max - self.min
    }

    pub fn center(&self) -> Vector2<f32> {
        (self.min + self.max) * 0.5
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    pub fn contains(&self, point: Vector2<f32>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    pub fn include_point(&mut self, point: Vector2<f32>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }

    /// Bounding box of a set of points; empty when `points` is empty.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vector2<f32>>) -> Self {
        let mut bbox = Self::empty();
        for point in points {
            bbox.include_point(*point);
        }
        bbox
    }
}

/// 3D Bounding Box
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BBox3 {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl BBox3 {
    /// Create a new bounding box
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        debug_assert!(min.x <= max.x);
        debug_assert!(min.y <= max.y);
        debug_assert!(min.z <= max.z);
        Self { min, max }
    }

    /// Create an empty bounding box
    pub fn empty() -> Self {
        Self {
            min: Vector3::new(f32::MAX, f32::MAX, f32::MAX),
            max: Vector3::new(f32::MIN, f32::MIN, f32::MIN),
        }
    }

    /// Axis-aligned cube around `center` with the same half side on every axis
    pub fn from_center_half_size(center: Vector3<f32>, half_size: f32) -> Self {
        let radius = Vector3::new(half_size, half_size, half_size);
        Self::new(center - radius, center + radius)
    }

    /// Lift a 2D box into 3D with the given z-range
    pub fn from_bbox2(bbox: &BBox2, z_min: f32, z_max: f32) -> Self {
        Self::new(
            Vector3::new(bbox.min.x, bbox.min.y, z_min),
            Vector3::new(bbox.max.x, bbox.max.y, z_max),
        )
    }

    /// Get the size of the bounding box
    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Get the center of the bounding box
    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    /// Check if the bounding box is empty
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Check if a point is inside the bounding box
    pub fn contains(&self, point: Vector3<f32>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Expand the bounding box to include a point
    pub fn include_point(&mut self, point: Vector3<f32>) {
        self.min = self.min.inf(&point);
        self.max = self.max.sup(&point);
    }

    /// Drop the z-axis
    pub fn flatten(&self) -> BBox2 {
        BBox2 {
            min: self.min.xy(),
            max: self.max.xy(),
        }
    }

    /// True when all coordinates are finite and min <= max on every axis
    pub fn is_valid(&self) -> bool {
        self.min.iter().chain(self.max.iter()).all(|v| v.is_finite()) && !self.is_empty()
    }
}

impl fmt::Display for BBox3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Min: <{:.2}, {:.2}, {:.2}> | Max: <{:.2}, {:.2}, {:.2}>>",
            self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z
        )
    }
}
