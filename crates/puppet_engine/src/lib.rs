//! # Puppet Engine
//!
//! Scene-graph integration for animated 2D rigged characters.
//!
//! ## Features
//!
//! - **Frame Orchestration**: one update/texture-sync/draw pass per rendered frame
//! - **Context-Safe Textures**: GPU handles re-bound whenever the render context changes
//! - **Coordinate Pipeline**: world/model conversion for hit testing and gaze focus
//! - **Procedural Animation**: table-driven eye blink and breath cycles
//! - **Playback Forwarding**: motions, speech and expressions with deferred results
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use puppet_engine::prelude::*;
//!
//! fn frame(
//!     node: &mut PuppetModel,
//!     renderer: &mut dyn HostRenderer,
//!     delta_ms: f32,
//! ) -> Result<(), RenderError> {
//!     node.update(delta_ms);
//!     node.update_transform(&ParentFrame::root());
//!     node.render(renderer)
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod animation;
pub mod config;
pub mod core;
pub mod foundation;
pub mod model;
pub mod motion;
pub mod puppet;
pub mod render;
pub mod scene;

#[cfg(test)]
mod testing;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        animation::{Breath, EyeBlink},
        core::config::{BlinkConfig, BreathConfig, PuppetOptions},
        foundation::math::{Mat3, Point2, Vec2},
        model::{InternalModel, ModelAssets, ModelFactory, ModelSource, SetupError},
        motion::{ExpressionId, MotionOptions, MotionPriority, Playback, PlaybackStatus, SpeakOptions},
        puppet::{ModelError, ModelEvent, PointerEvent, PuppetModel},
        render::{ContextId, HostRenderer, ModelTexture, RenderError, RenderResult, Viewport},
        scene::{DestroyOptions, ParentFrame, SceneNode, Transform2D, TransformRefresh},
    };
}
