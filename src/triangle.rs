//! Right isosceles triangles shared by the 2D and 3D fractal engines.

use crate::BBox2;
use nalgebra::Vector2;

/// Right isosceles triangle with the right angle at `b`.
///
/// The fill curve enters near corner `a` and leaves near corner `c`, so
/// consecutive triangles in curve order share the `c` / `a` corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Triangle {
    pub a: Vector2<f32>,
    pub b: Vector2<f32>,
    pub c: Vector2<f32>,
}

impl Triangle {
    /// The two halves of a square, in curve order, forming a closed loop.
    pub fn square_halves(bounds: &BBox2) -> [Triangle; 2] {
        let p0 = bounds.min;
        let p1 = Vector2::new(bounds.max.x, bounds.min.y);
        let p2 = bounds.max;
        let p3 = Vector2::new(bounds.min.x, bounds.max.y);
        [
            Triangle { a: p0, b: p1, c: p2 },
            Triangle { a: p2, b: p3, c: p0 },
        ]
    }

    /// Split along the altitude from the right angle.
    pub fn subdivide(&self) -> [Triangle; 2] {
        let m = (self.a + self.c) * 0.5;
        [
            Triangle {
                a: self.a,
                b: m,
                c: self.b,
            },
            Triangle {
                a: self.b,
                b: m,
                c: self.c,
            },
        ]
    }

    pub fn leg(&self) -> f32 {
        (self.b - self.a).norm()
    }

    pub fn area(&self) -> f32 {
        let leg = self.leg();
        leg * leg * 0.5
    }

    pub fn centroid(&self) -> Vector2<f32> {
        (self.a + self.b + self.c) / 3.0
    }

    pub fn incenter(&self) -> Vector2<f32> {
        // weights are the lengths of the opposite sides
        let leg = self.leg();
        let hypotenuse = leg * std::f32::consts::SQRT_2;
        (self.a * leg + self.b * hypotenuse + self.c * leg) / (2.0 * leg + hypotenuse)
    }

    pub fn inradius(&self) -> f32 {
        self.leg() * (2.0 - std::f32::consts::SQRT_2) * 0.5
    }

    pub fn bbox(&self) -> BBox2 {
        BBox2::from_points([&self.a, &self.b, &self.c])
    }
}
