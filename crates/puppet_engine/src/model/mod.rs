//! External model boundary
//!
//! The rigged model itself (parameter core, deformers, physics, motion
//! decoding) is provided by a factory. This module defines what the puppet
//! node needs from it, plus a few building blocks model implementations
//! share: parameter storage, hit areas and a focus controller.

pub mod focus;
pub mod hit_area;
pub mod parameters;

use std::any::Any;
use std::path::PathBuf;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::config::PuppetOptions;
use crate::foundation::math::Mat3;
use crate::motion::MotionManager;
use crate::render::{ContextId, GpuTextureHandle, ModelTexture, RenderResult, Viewport};

pub use focus::FocusController;
pub use hit_area::{HitArea, HitAreas};
pub use parameters::{ParameterModel, ParameterTable};

/// The underlying rigged model driven by a puppet node
///
/// Times are milliseconds. Sizes are in the model's pixel space, where
/// `width`/`height` already include the model's own scaling and
/// `original_width`/`original_height` do not.
pub trait InternalModel {
    /// Name from the model settings, used in log tags
    fn name(&self) -> &str;

    /// Width in pixel space
    fn width(&self) -> f32;

    /// Height in pixel space
    fn height(&self) -> f32;

    /// Unscaled canvas width
    fn original_width(&self) -> f32;

    /// Unscaled canvas height
    fn original_height(&self) -> f32;

    /// Matrix mapping model space into the node's local pixel space
    fn local_transform(&self) -> Mat3;

    /// Names of the hit areas containing a model-space point, in definition order
    fn hit_test(&self, x: f32, y: f32) -> Vec<String>;

    /// Advance motions, procedural cycles and physics
    fn update(&mut self, dt: f32, elapsed: f64);

    /// Set the final matrix mapping pixel space to clip space
    fn update_transform(&mut self, transform: &Mat3);

    /// Issue the model's raw draw calls against the host renderer
    fn draw(&mut self, gpu: &mut dyn Any) -> RenderResult<()>;

    /// Register the GPU handle of a texture slot for the next draw
    fn bind_texture(&mut self, slot: usize, handle: GpuTextureHandle);

    /// Viewport for viewport-relative shader effects
    fn set_viewport(&mut self, viewport: Viewport);

    /// Opacity in `[0, 1]` to composite every raw draw with
    fn set_opacity(&mut self, alpha: f32);

    /// Recreate context-bound GPU objects after a context change
    fn update_context(&mut self, gpu: &mut dyn Any, context: ContextId);

    /// Whether texture images must be flipped vertically on upload
    fn texture_flip_y(&self) -> bool;

    /// Point the gaze in direction `(x, y)`, both in `[-1, 1]`
    fn focus(&mut self, x: f32, y: f32, instant: bool);

    /// Motion playback for this model
    fn motion_manager(&mut self) -> &mut dyn MotionManager;

    /// Release the model. Pending playbacks must be settled or abandoned.
    fn destroy(&mut self);
}

/// Settings describing where a model's assets live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Display name
    pub name: String,
    /// Model description file
    pub model: PathBuf,
    /// Texture images, one per slot
    #[serde(default)]
    pub textures: Vec<PathBuf>,
}

/// Where a factory should load a model from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// Path to a settings file
    Path(PathBuf),
    /// Already parsed settings
    Settings(ModelSettings),
}

impl ModelSource {
    /// Best-effort name for logging before the model exists
    pub fn display_name(&self) -> String {
        match self {
            Self::Path(path) => path
                .file_stem()
                .map_or_else(|| path.display().to_string(), |stem| stem.to_string_lossy().into_owned()),
            Self::Settings(settings) => settings.name.clone(),
        }
    }
}

/// Everything a factory produces for one model
pub struct ModelAssets {
    /// The rigged model
    pub model: Box<dyn InternalModel>,
    /// Texture slots in model order
    pub textures: Vec<ModelTexture>,
}

/// Model setup errors
#[derive(Error, Debug)]
pub enum SetupError {
    /// A referenced file does not exist
    #[error("Model file not found: {0}")]
    NotFound(PathBuf),

    /// Settings could not be interpreted
    #[error("Invalid model settings: {0}")]
    InvalidSettings(String),

    /// IO error while reading assets
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A texture image failed to decode
    #[error("Texture decode failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Builds models from sources
pub trait ModelFactory {
    /// Load and set up a model
    fn create(&mut self, source: &ModelSource, options: &PuppetOptions) -> Result<ModelAssets, SetupError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        let path = ModelSource::Path(PathBuf::from("models/haru/haru.model3.json"));
        assert_eq!(path.display_name(), "haru.model3");

        let settings = ModelSource::Settings(ModelSettings {
            name: "shizuku".into(),
            model: PathBuf::from("shizuku.moc"),
            textures: Vec::new(),
        });
        assert_eq!(settings.display_name(), "shizuku");
    }
}
