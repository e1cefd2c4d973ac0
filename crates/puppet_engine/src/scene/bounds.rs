//! Axis-aligned bounds for containment queries

use serde::{Serialize, Deserialize};

use crate::foundation::math::{apply, Mat3, Point2, Vec2};

/// Axis-Aligned Bounding Box in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Minimum corner of the bounding box
    pub min: Vec2,
    /// Maximum corner of the bounding box
    pub max: Vec2,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::empty()
    }
}

impl Bounds {
    /// Create bounds from min and max corners
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Bounds that contain nothing; growing them with any point makes them valid
    pub fn empty() -> Self {
        Self {
            min: Vec2::new(f32::INFINITY, f32::INFINITY),
            max: Vec2::new(f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    /// Whether no point has been added yet
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Width of the box
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Height of the box
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Grow the box to include a point
    pub fn add_point(&mut self, point: Point2) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }

    /// Grow the box to include the rectangle `(x0, y0)..(x1, y1)` after
    /// mapping its four corners through `transform`
    pub fn add_frame(&mut self, transform: &Mat3, x0: f32, y0: f32, x1: f32, y1: f32) {
        for (x, y) in [(x0, y0), (x1, y0), (x1, y1), (x0, y1)] {
            self.add_point(apply(transform, Point2::new(x, y)));
        }
    }

    /// Check if the box contains a point. The minimum edges are inclusive
    /// and the maximum edges exclusive.
    pub fn contains_point(&self, point: Point2) -> bool {
        if self.width() <= 0.0 || self.height() <= 0.0 {
            return false;
        }
        point.x >= self.min.x && point.x < self.max.x
            && point.y >= self.min.y && point.y < self.max.y
    }
}

/// Signed offsets added to the edges of a model's natural bounding box
///
/// `x0`/`y0` move the top-left edges and `x1`/`y1` the bottom-right edges.
/// Values are not validated; inverted boxes simply contain nothing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundsOverride {
    /// Offset of the left edge
    pub x0: f32,
    /// Offset of the top edge
    pub y0: f32,
    /// Offset of the right edge
    pub x1: f32,
    /// Offset of the bottom edge
    pub y1: f32,
}

impl BoundsOverride {
    /// Create an override
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Local-space frame of a `width` x `height` box with the offsets applied
    pub fn frame(&self, width: f32, height: f32) -> (f32, f32, f32, f32) {
        (self.x0, self.y0, width + self.x1, height + self.y1)
    }
}
