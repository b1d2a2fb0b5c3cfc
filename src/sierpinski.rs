//! Two-dimensional Sierpinski fill shared by every layer.
//!
//! The square is covered by two right triangles which are recursively split
//! along the altitude of their right angle. The leaves, read in order, form
//! a closed Sierpinski curve whose local line spacing follows the requested
//! density.

use crate::density::DensityProvider;
use crate::triangle::Triangle;
use crate::{BBox2, BBox3, Polygon};
use nalgebra::Vector2;
use std::f32::consts::SQRT_2;

#[derive(Debug, Clone, Copy)]
struct Leaf {
    triangle: Triangle,
    depth: u32,
}

/// Leaf sequence of a 2D Sierpinski subdivision.
#[derive(Debug, Clone)]
pub struct SierpinskiFill {
    bounds: BBox2,
    max_depth: u32,
    line_width: f32,
    dithering: bool,
    sequence: Vec<Leaf>,
}

impl SierpinskiFill {
    /// Subdivide `bounds` (a square) up to `max_depth` levels.
    ///
    /// Each level walks the current leaves in curve order. A leaf is split
    /// when its requested amount of line (density times area) is closer to
    /// what two children would realize than to what it realizes itself. With
    /// `dithering` the rounding error of every final leaf is carried on to
    /// the next leaf in curve order.
    pub fn new(
        density: &dyn DensityProvider,
        bounds: BBox2,
        max_depth: u32,
        line_width: f32,
        dithering: bool,
    ) -> Self {
        let mut sequence: Vec<Leaf> = Triangle::square_halves(&bounds)
            .into_iter()
            .map(|triangle| Leaf { triangle, depth: 0 })
            .collect();

        for level in 0..max_depth {
            let mut next = Vec::with_capacity(sequence.len() * 2);
            let mut error = 0.0f32;
            let mut split_any = false;

            for leaf in sequence {
                if leaf.depth != level {
                    next.push(leaf);
                    continue;
                }

                let triangle = &leaf.triangle;
                let area = triangle.area();
                let region = BBox3::from_bbox2(&triangle.bbox(), 0.0, 0.0);
                let requested = density.density(&region) * area;
                let realized = line_width / triangle.leg() * area;
                let realized_split = realized * SQRT_2;

                let value = requested + error;
                let subdivide = value - realized >= realized_split - value;
                // a split above the last level is settled by its children
                let is_final = !subdivide || level + 1 == max_depth;
                let chosen = if subdivide { realized_split } else { realized };
                error = if dithering && is_final {
                    value - chosen
                } else {
                    0.0
                };

                if subdivide {
                    split_any = true;
                    for child in triangle.subdivide() {
                        next.push(Leaf {
                            triangle: child,
                            depth: level + 1,
                        });
                    }
                } else {
                    next.push(leaf);
                }
            }

            sequence = next;
            if !split_any {
                break;
            }
        }

        log::debug!(
            "sierpinski fill: {} triangles, max depth {}, dithering {}",
            sequence.len(),
            max_depth,
            dithering
        );

        Self {
            bounds,
            max_depth,
            line_width,
            dithering,
            sequence,
        }
    }

    pub fn bounds(&self) -> BBox2 {
        self.bounds
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn line_width(&self) -> f32 {
        self.line_width
    }

    pub fn is_dithered(&self) -> bool {
        self.dithering
    }

    /// Number of triangles on the curve
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Subdivision depth of every triangle, in curve order
    pub fn depths(&self) -> impl Iterator<Item = u32> + '_ {
        self.sequence.iter().map(|leaf| leaf.depth)
    }

    /// The closed curve through all triangle centroids.
    pub fn generate_cross(&self) -> Polygon {
        let mut polygon = Polygon::with_capacity(self.sequence.len());
        for leaf in &self.sequence {
            polygon.push(leaf.triangle.centroid());
        }
        polygon
    }

    /// Height-dependent variant of [`Self::generate_cross`].
    ///
    /// Within every triangle the curve point slides between the `a` and `c`
    /// corners as `z` rises, following a triangle wave with a period of two
    /// legs, so stacked layers interlock. The points keep `min_dist_to_side`
    /// away from the legs where the triangle is large enough. A positive
    /// `pocket_size` replaces the point by two points that far apart.
    pub fn generate_cross_layered(&self, z: f32, min_dist_to_side: f32, pocket_size: f32) -> Polygon {
        let per_leaf = if pocket_size > 0.0 { 2 } else { 1 };
        let mut polygon = Polygon::with_capacity(self.sequence.len() * per_leaf);

        for leaf in &self.sequence {
            let triangle = &leaf.triangle;
            let inradius = triangle.inradius();
            let inset = if inradius > 0.0 {
                (min_dist_to_side / inradius).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let incenter = triangle.incenter();
            let start = triangle.a + (incenter - triangle.a) * inset;
            let end = triangle.c + (incenter - triangle.c) * inset;

            let period = 2.0 * triangle.leg();
            let phase = if period > 0.0 {
                (z / period).rem_euclid(1.0)
            } else {
                0.0
            };
            let t = 1.0 - (2.0 * phase - 1.0).abs();

            let length = (end - start).norm();
            if pocket_size > 0.0 && length > 0.0 {
                let half = (pocket_size * 0.5 / length).min(0.5);
                let center = t.clamp(half, 1.0 - half);
                polygon.push(lerp(start, end, center - half));
                polygon.push(lerp(start, end, center + half));
            } else {
                polygon.push(lerp(start, end, t));
            }
        }
        polygon
    }
}

fn lerp(from: Vector2<f32>, to: Vector2<f32>, t: f32) -> Vector2<f32> {
    from + (to - from) * t
}
