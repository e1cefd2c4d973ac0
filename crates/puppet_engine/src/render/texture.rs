//! Model textures and GPU handle types

use std::borrow::Cow;

use image::RgbaImage;

/// Identity of one GPU context generation
///
/// Changes whenever the host recreates its graphics context. Handles created
/// under one generation are meaningless under another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(pub i64);

impl ContextId {
    /// No context has been seen yet
    pub const UNINITIALIZED: Self = Self(-1);

    /// Whether this is a real context generation
    pub fn is_initialized(self) -> bool {
        self != Self::UNINITIALIZED
    }
}

impl Default for ContextId {
    fn default() -> Self {
        Self::UNINITIALIZED
    }
}

/// Handle for a GPU texture resource in one context generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpuTextureHandle(pub u64);

/// A texture slot of a model
///
/// The image is `None` until the factory has loaded it; such textures are
/// skipped when binding.
#[derive(Debug, Clone, Default)]
pub struct ModelTexture {
    /// Name for logging
    pub label: String,
    image: Option<RgbaImage>,
}

impl ModelTexture {
    /// Create a loaded texture
    pub fn new(label: impl Into<String>, image: RgbaImage) -> Self {
        Self {
            label: label.into(),
            image: Some(image),
        }
    }

    /// Create a texture whose image is not available
    pub fn unloaded(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            image: None,
        }
    }

    /// Whether the image is loaded and can be uploaded
    pub fn is_valid(&self) -> bool {
        self.image.is_some()
    }

    /// The CPU-side image, if loaded
    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_ref()
    }

    /// Drop the CPU-side image
    pub fn release(&mut self) {
        self.image = None;
    }
}

/// Request to upload one model texture into the current context
#[derive(Debug, Clone, Copy)]
pub struct TextureUpload<'a> {
    /// Texture slot on the model
    pub slot: usize,
    /// Image as stored on the CPU
    pub image: &'a RgbaImage,
    /// Whether rows must be flipped vertically for the model's UV convention
    pub flip_y: bool,
    /// Context generation the handle will belong to
    pub context: ContextId,
}

impl<'a> TextureUpload<'a> {
    /// Image rows in the order the GPU should receive them
    pub fn oriented_pixels(&self) -> Cow<'a, RgbaImage> {
        if self.flip_y {
            Cow::Owned(image::imageops::flip_vertical(self.image))
        } else {
            Cow::Borrowed(self.image)
        }
    }
}
