//! Recursion depth and bounding cube for a fractal fill.

use crate::{BBox3, Error, Result};
use std::f32::consts::SQRT_2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Depth and canonical bounding cube of a fractal pattern.
///
/// The cube is centered on the filled volume and its side is
/// `min_line_distance * 2^(depth / 2)`, optionally shrunk by `sqrt(2) / 2`
/// in 2D mode (which makes the depth odd).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FractalConfig {
    pub depth: u32,
    pub bounds: BBox3,
}

impl FractalConfig {
    /// Compute the config for filling `volume` with lines at least
    /// `min_line_distance` apart.
    ///
    /// With `make_3d` the z-extent also counts towards the governing side
    /// length, and the diagonal correction is not applied.
    pub fn compute(volume: &BBox3, min_line_distance: f32, make_3d: bool) -> Result<Self> {
        if !(min_line_distance.is_finite() && min_line_distance > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "min_line_distance must be positive, got {}",
                min_line_distance
            )));
        }
        if !volume.is_valid() {
            return Err(Error::InvalidParameter(format!(
                "volume to fill is not a valid box: {}",
                volume
            )));
        }

        let size = volume.size();
        let mut max_side_length = size.x.max(size.y);
        if make_3d {
            max_side_length = max_side_length.max(size.z);
        }

        let mut depth = 0u32;
        let mut aabb_size = min_line_distance;
        while aabb_size < max_side_length {
            aabb_size *= 2.0;
            depth += 2;
        }

        let half_sqrt2 = 0.5 * SQRT_2;
        if !make_3d && depth > 0 && aabb_size * half_sqrt2 >= max_side_length {
            aabb_size *= half_sqrt2;
            depth -= 1;
        }

        let bounds = BBox3::from_center_half_size(volume.center(), aabb_size / 2.0);
        Ok(Self { depth, bounds })
    }

    /// Side length of the bounding cube
    pub fn side_length(&self) -> f32 {
        self.bounds.size().x
    }
}
