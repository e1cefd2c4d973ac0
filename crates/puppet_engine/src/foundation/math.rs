//! Math utilities and types
//!
//! 2D affine transforms are stored as homogeneous `Mat3` values laid out as
//!
//! ```text
//! [ a  c  tx ]
//! [ b  d  ty ]
//! [ 0  0  1  ]
//! ```
//!
//! so `m * p` maps a column point, and `parent * child` appends `child`.

pub use nalgebra::{Matrix3, Vector2};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3x3 matrix type, used as a 2D affine transform
pub type Mat3 = Matrix3<f32>;

/// 2D point type
pub type Point2 = nalgebra::Point2<f32>;

/// Build an affine matrix from its six coefficients.
pub fn affine(a: f32, b: f32, c: f32, d: f32, tx: f32, ty: f32) -> Mat3 {
    Mat3::new(
        a, c, tx,
        b, d, ty,
        0.0, 0.0, 1.0,
    )
}

/// Apply an affine matrix to a point.
pub fn apply(matrix: &Mat3, point: Point2) -> Point2 {
    matrix.transform_point(&point)
}

/// Apply the inverse of an affine matrix to a point.
///
/// Computed directly from the six coefficients. A degenerate matrix yields
/// non-finite coordinates instead of failing.
pub fn apply_inverse(matrix: &Mat3, point: Point2) -> Point2 {
    let (a, b, c, d) = (matrix.m11, matrix.m21, matrix.m12, matrix.m22);
    let (tx, ty) = (matrix.m13, matrix.m23);
    let id = 1.0 / (a * d - c * b);

    Point2::new(
        d * id * point.x + -c * id * point.y + (ty * c - tx * d) * id,
        a * id * point.y + -b * id * point.x + (-ty * a + tx * b) * id,
    )
}

/// Math utility functions
pub mod utils {
    /// Clamp a value between min and max
    pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
        if value < min { min } else if value > max { max } else { value }
    }
}
