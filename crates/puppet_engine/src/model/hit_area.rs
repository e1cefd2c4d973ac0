//! Named hit areas in model space

use crate::foundation::math::{Point2, Vec2};
use crate::scene::bounds::Bounds;

/// A named rectangle in model space
#[derive(Debug, Clone, PartialEq)]
pub struct HitArea {
    /// Area name reported by hit tests
    pub name: String,
    /// Model-space rectangle
    pub bounds: Bounds,
}

impl HitArea {
    /// Create a hit area from its corners
    pub fn new(name: impl Into<String>, min: Vec2, max: Vec2) -> Self {
        Self {
            name: name.into(),
            bounds: Bounds::new(min, max),
        }
    }
}

/// Ordered collection of hit areas
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitAreas {
    areas: Vec<HitArea>,
}

impl HitAreas {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: append an area
    pub fn with(mut self, area: HitArea) -> Self {
        self.areas.push(area);
        self
    }

    /// Names of every area containing the model-space point, in definition order
    pub fn hit_test(&self, x: f32, y: f32) -> Vec<String> {
        let point = Point2::new(x, y);
        self.areas
            .iter()
            .filter(|area| area.bounds.contains_point(point))
            .map(|area| area.name.clone())
            .collect()
    }

    /// All areas
    pub fn iter(&self) -> impl Iterator<Item = &HitArea> {
        self.areas.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn areas() -> HitAreas {
        HitAreas::new()
            .with(HitArea::new("body", Vec2::new(0.0, 100.0), Vec2::new(200.0, 400.0)))
            .with(HitArea::new("head", Vec2::new(50.0, 0.0), Vec2::new(150.0, 120.0)))
            .with(HitArea::new("face", Vec2::new(70.0, 30.0), Vec2::new(130.0, 110.0)))
    }

    #[test]
    fn test_outside_is_empty() {
        assert!(areas().hit_test(300.0, 300.0).is_empty());
    }

    #[test]
    fn test_overlapping_areas_in_definition_order() {
        assert_eq!(areas().hit_test(100.0, 105.0), vec!["body", "head", "face"]);
        assert_eq!(areas().hit_test(100.0, 50.0), vec!["head", "face"]);
    }
}
