//! Motion, speech and expression playback
//!
//! Playback itself (motion decoding, audio, lip sync) belongs to the model
//! implementation. The node only forwards requests and hands back a
//! [`Playback`] the caller can poll.

pub mod playback;

use serde::{Serialize, Deserialize};

pub use playback::{Playback, PlaybackError, PlaybackSettler, PlaybackStatus};

/// Priority of a motion request
///
/// A request only replaces the running motion if its priority is at least
/// as high. `None` never starts anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MotionPriority {
    /// Never plays
    None,
    /// Background idle motions
    Idle,
    /// Regular requests
    #[default]
    Normal,
    /// Always replaces the running motion
    Force,
}

/// Expression reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExpressionId {
    /// Position in the model's expression list
    Index(usize),
    /// Expression name
    Name(String),
}

impl From<usize> for ExpressionId {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for ExpressionId {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

/// Options for starting a motion
#[derive(Debug, Clone, PartialEq)]
pub struct MotionOptions {
    /// Sound to play alongside the motion
    pub sound: Option<String>,
    /// Sound volume in `[0, 1]`
    pub volume: f32,
    /// Expression to apply while the motion plays
    pub expression: Option<ExpressionId>,
    /// Restore the previous expression when the motion ends
    pub reset_expression: bool,
}

impl Default for MotionOptions {
    fn default() -> Self {
        Self {
            sound: None,
            volume: 0.5,
            expression: None,
            reset_expression: true,
        }
    }
}

impl MotionOptions {
    /// Builder pattern: set the accompanying sound
    pub fn with_sound(mut self, sound: impl Into<String>, volume: f32) -> Self {
        self.sound = Some(sound.into());
        self.volume = volume;
        self
    }

    /// Builder pattern: set the expression
    pub fn with_expression(mut self, expression: impl Into<ExpressionId>) -> Self {
        self.expression = Some(expression.into());
        self
    }
}

/// Options for speaking a sound with lip sync
#[derive(Debug, Clone, PartialEq)]
pub struct SpeakOptions {
    /// Sound volume in `[0, 1]`
    pub volume: f32,
    /// Expression to apply while speaking
    pub expression: Option<ExpressionId>,
    /// Restore the previous expression afterwards
    pub reset_expression: bool,
}

impl Default for SpeakOptions {
    fn default() -> Self {
        Self {
            volume: 0.5,
            expression: None,
            reset_expression: true,
        }
    }
}

/// Expression playback of a model
pub trait ExpressionManager {
    /// Apply an expression
    fn set_expression(&mut self, id: &ExpressionId) -> Playback;

    /// Apply a random expression other than the current one
    fn set_random_expression(&mut self) -> Playback;
}

/// Motion playback of a model
pub trait MotionManager {
    /// Start motion `index` of `group`
    fn start_motion(&mut self, group: &str, index: usize, priority: MotionPriority, options: MotionOptions) -> Playback;

    /// Start a random motion of `group`
    fn start_random_motion(&mut self, group: &str, priority: MotionPriority, options: MotionOptions) -> Playback;

    /// Stop every running and queued motion
    fn stop_all_motions(&mut self);

    /// Play a sound with lip sync
    fn speak(&mut self, sound: &str, options: SpeakOptions) -> Playback;

    /// Stop speaking
    fn stop_speaking(&mut self);

    /// Expression playback, if the model has expressions
    fn expression_manager(&mut self) -> Option<&mut dyn ExpressionManager>;

    /// Abandon every pending playback and release resources
    fn destroy(&mut self);
}
