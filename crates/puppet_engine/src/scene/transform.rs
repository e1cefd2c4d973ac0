//! Node transforms
//!
//! A node's local transform is position/rotation/skew/scale around a pivot.
//! World transforms are composed from an explicit ancestor chain, so a node
//! that is not attached anywhere can still be brought up to date without
//! borrowing a temporary parent.

use crate::foundation::math::{affine, Mat3, Vec2};

/// Local 2D transform of a scene node
#[derive(Debug, Clone, PartialEq)]
pub struct Transform2D {
    /// Position of the pivot in parent space
    pub position: Vec2,
    /// Scale factors
    pub scale: Vec2,
    /// Point in local space that `position` refers to
    pub pivot: Vec2,
    /// Skew angles in radians
    pub skew: Vec2,
    /// Rotation in radians
    pub rotation: f32,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            scale: Vec2::new(1.0, 1.0),
            pivot: Vec2::zeros(),
            skew: Vec2::zeros(),
            rotation: 0.0,
        }
    }
}

impl Transform2D {
    /// Create an identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Builder pattern: set position
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = Vec2::new(x, y);
        self
    }

    /// Builder pattern: set scale
    pub fn with_scale(mut self, x: f32, y: f32) -> Self {
        self.scale = Vec2::new(x, y);
        self
    }

    /// Builder pattern: set rotation
    pub fn with_rotation(mut self, radians: f32) -> Self {
        self.rotation = radians;
        self
    }

    /// Builder pattern: set pivot
    pub fn with_pivot(mut self, x: f32, y: f32) -> Self {
        self.pivot = Vec2::new(x, y);
        self
    }

    /// Builder pattern: set skew
    pub fn with_skew(mut self, x: f32, y: f32) -> Self {
        self.skew = Vec2::new(x, y);
        self
    }

    /// Local matrix mapping node space into parent space
    pub fn to_matrix(&self) -> Mat3 {
        let a = (self.rotation + self.skew.y).cos() * self.scale.x;
        let b = (self.rotation + self.skew.y).sin() * self.scale.x;
        let c = -(self.rotation - self.skew.x).sin() * self.scale.y;
        let d = (self.rotation - self.skew.x).cos() * self.scale.y;

        let tx = self.position.x - (self.pivot.x * a + self.pivot.y * c);
        let ty = self.position.y - (self.pivot.x * b + self.pivot.y * d);

        affine(a, b, c, d, tx, ty)
    }
}

/// Compose a world matrix from an ancestor chain and a local transform.
///
/// `ancestors` is ordered root first. An empty chain treats the node as a
/// root, which is also how a detached node is resolved.
pub fn compute_world_transform(ancestors: &[Transform2D], local: &Transform2D) -> Mat3 {
    ancestors
        .iter()
        .fold(Mat3::identity(), |world, ancestor| world * ancestor.to_matrix())
        * local.to_matrix()
}

/// World state handed down by the parent during the host's transform pass
#[derive(Debug, Clone, PartialEq)]
pub struct ParentFrame {
    /// Parent world matrix
    pub world: Mat3,
    /// Parent composite opacity
    pub alpha: f32,
}

impl ParentFrame {
    /// Frame for a node at the root of the scene
    pub fn root() -> Self {
        Self {
            world: Mat3::identity(),
            alpha: 1.0,
        }
    }
}

impl Default for ParentFrame {
    fn default() -> Self {
        Self::root()
    }
}

/// How `to_model_position` obtains the world matrix
#[derive(Debug, Clone, Copy)]
pub enum TransformRefresh<'a> {
    /// Trust the world matrix from the last transform pass
    Skip,
    /// Recompute from this ancestor chain (root first, empty when detached)
    Ancestors(&'a [Transform2D]),
}

/// Local transform plus the cached world state of a node
#[derive(Debug, Clone)]
pub struct NodeTransform {
    /// Local transform
    pub local: Transform2D,
    /// Node opacity
    pub alpha: f32,
    world: Mat3,
    world_alpha: f32,
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self {
            local: Transform2D::default(),
            alpha: 1.0,
            world: Mat3::identity(),
            world_alpha: 1.0,
        }
    }
}

impl NodeTransform {
    /// Update the cached world state from the parent's frame
    pub fn update(&mut self, parent: &ParentFrame) {
        self.world = parent.world * self.local.to_matrix();
        self.world_alpha = parent.alpha * self.alpha;
    }

    /// Recompute the cached world matrix from an explicit ancestor chain
    pub fn recompute(&mut self, ancestors: &[Transform2D]) {
        self.world = compute_world_transform(ancestors, &self.local);
    }

    /// Cached world matrix
    pub fn world(&self) -> &Mat3 {
        &self.world
    }

    /// Cached composite opacity
    pub fn world_alpha(&self) -> f32 {
        self.world_alpha
    }
}
