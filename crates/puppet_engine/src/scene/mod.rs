//! Scene-graph integration
//!
//! The host scene graph owns child management and transform propagation.
//! Nodes plug into it through [`SceneNode`]: the host hands each node its
//! parent's world state, asks it for bounds, renders it and eventually
//! destroys it.

pub mod bounds;
pub mod transform;

pub use bounds::{Bounds, BoundsOverride};
pub use transform::{compute_world_transform, NodeTransform, ParentFrame, Transform2D, TransformRefresh};

use crate::render::{HostRenderer, RenderResult};

/// What a node releases beyond its own resources when destroyed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DestroyOptions {
    /// Release the node's textures
    pub texture: bool,
    /// Also release the images behind those textures
    pub base_texture: bool,
}

/// Callbacks a host scene graph invokes on its nodes
pub trait SceneNode {
    /// Update cached world state from the parent's frame
    fn update_transform(&mut self, parent: &ParentFrame);

    /// World-space bounding box
    fn calculate_bounds(&self) -> Bounds;

    /// Draw the node with the host renderer
    fn render(&mut self, renderer: &mut dyn HostRenderer) -> RenderResult<()>;

    /// Release the node's resources
    fn destroy(&mut self, options: DestroyOptions);
}
