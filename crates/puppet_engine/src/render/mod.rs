//! # Rendering Integration
//!
//! Puppet models draw themselves with raw GPU calls that bypass the host
//! renderer's batching. This module describes what a host renderer has to
//! expose for that to work and keeps the model's GPU-side texture state in
//! step with the host's render context.
//!
//! ## Architecture
//!
//! - **HostRenderer**: the renderer-provided context handed to every draw
//! - **RenderSubsystems**: the mutable renderer state reset around a raw draw
//! - **TextureCache**: per-model GPU handle table keyed by slot and context
//! - **AlphaFilter**: composite opacity applied to the model as a whole

pub mod alpha;
pub mod texture;
pub mod texture_cache;

use std::any::Any;

use bitflags::bitflags;
use thiserror::Error;

use crate::foundation::math::Mat3;

pub use alpha::AlphaFilter;
pub use texture::{ContextId, GpuTextureHandle, ModelTexture, TextureUpload};
pub use texture_cache::TextureCache;

bitflags! {
    /// Mutable renderer sub-systems that a raw draw can disturb
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RenderSubsystems: u8 {
        /// Sprite batcher
        const BATCH = 1 << 0;
        /// Bound vertex/index geometry
        const GEOMETRY = 1 << 1;
        /// Bound shader program
        const SHADER = 1 << 2;
        /// Blend, depth and cull state
        const STATE = 1 << 3;
        /// Texture unit bindings
        const TEXTURE = 1 << 4;

        /// Baseline required before the model issues raw GPU calls
        const BEFORE_RAW_DRAW = Self::BATCH.bits() | Self::GEOMETRY.bits() | Self::SHADER.bits() | Self::STATE.bits();
        /// Baseline restored for whatever the host draws next
        const AFTER_RAW_DRAW = Self::STATE.bits() | Self::TEXTURE.bits();
    }
}

/// Viewport rectangle in framebuffer pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Viewport {
    /// Create a viewport
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// `[x, y, width, height]`, the layout model shaders consume
    pub fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.width, self.height]
    }
}

/// Renderer-provided context for drawing a puppet node
///
/// Implemented by the host graphics framework.
pub trait HostRenderer {
    /// Identity of the current GPU context generation
    fn context_id(&self) -> ContextId;

    /// Reset the given sub-systems to their baseline state
    fn reset(&mut self, subsystems: RenderSubsystems);

    /// Viewport of the current framebuffer
    fn viewport(&self) -> Viewport;

    /// Projection matrix mapping host world space to clip space
    fn projection_matrix(&self) -> Mat3;

    /// Upload a texture image and return its handle in the current context
    fn upload_texture(&mut self, upload: &TextureUpload<'_>) -> RenderResult<GpuTextureHandle>;

    /// Mark a texture as used this frame for the host's texture garbage collector
    fn touch_texture(&mut self, handle: GpuTextureHandle);

    /// Downcast to the concrete renderer so a model can issue raw GPU calls
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Rendering error types
#[derive(Error, Debug)]
pub enum RenderError {
    /// A texture could not be uploaded to the GPU
    #[error("Texture upload failed for slot {slot}: {reason}")]
    TextureUpload {
        /// Texture slot on the model
        slot: usize,
        /// Backend-provided reason
        reason: String,
    },

    /// The model's own draw call failed
    #[error("Draw failed: {0}")]
    DrawFailed(String),

    /// Backend-specific error occurred
    #[error("Backend error: {0}")]
    BackendError(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
