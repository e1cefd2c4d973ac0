//! # Unified Configuration System
//!
//! All option structures for the puppet node and its procedural cycles live
//! here so applications can load them from one TOML or RON document.
//!
//! ## Configuration Categories
//!
//! - **Puppet Options**: bounds override, automation switches, motion manager hints
//! - **Cycle Config**: timing for the eye blink and breath cycles
//!
//! Durations are milliseconds throughout.

use serde::{Serialize, Deserialize};

pub use crate::config::{Config, ConfigError};
use crate::scene::bounds::BoundsOverride;

/// # Automator Options
///
/// Switches for the host-driven automation attached to each puppet node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomatorOptions {
    /// Feed host ticks into `update` automatically
    pub auto_update: bool,
    /// Hit test and emit `Hit` events on pointer taps
    pub auto_hit_test: bool,
    /// Turn the model's gaze toward the pointer
    pub auto_focus: bool,
}

impl Default for AutomatorOptions {
    fn default() -> Self {
        Self {
            auto_update: true,
            auto_hit_test: true,
            auto_focus: true,
        }
    }
}

/// # Motion Manager Options
///
/// Forwarded untouched to the model factory, which owns the motion manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionManagerOptions {
    /// Motion group played whenever nothing else is running
    pub idle_motion_group: Option<String>,
    /// Volume for motion sounds and speech, in `[0, 1]`
    pub sound_volume: f32,
}

impl Default for MotionManagerOptions {
    fn default() -> Self {
        Self {
            idle_motion_group: None,
            sound_volume: 0.5,
        }
    }
}

/// # Puppet Options
///
/// Construction options for a puppet node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PuppetOptions {
    /// Offsets applied to the natural bounding box once the model is loaded
    pub bounds_override: Option<BoundsOverride>,
    /// Automation switches
    pub automator: AutomatorOptions,
    /// Motion manager hints for the factory
    pub motion: MotionManagerOptions,
}

impl PuppetOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bounds override
    pub fn with_bounds_override(mut self, bounds: BoundsOverride) -> Self {
        self.bounds_override = Some(bounds);
        self
    }

    /// Set the automator switches
    pub fn with_automator(mut self, automator: AutomatorOptions) -> Self {
        self.automator = automator;
        self
    }

    /// Set the idle motion group
    pub fn with_idle_motion_group(mut self, group: impl Into<String>) -> Self {
        self.motion.idle_motion_group = Some(group.into());
        self
    }
}

impl Config for PuppetOptions {}

/// # Eye Blink Timing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkConfig {
    /// Base wait between blinks. Must be non-negative.
    pub interval: f32,
    /// Symmetric random jitter applied to the interval
    pub interval_jitter: f32,
    /// Time for the eyes to close
    pub closing: f32,
    /// Time the eyes stay shut
    pub closed: f32,
    /// Time for the eyes to open again
    pub opening: f32,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            interval: 4000.0,
            interval_jitter: 1000.0,
            closing: 100.0,
            closed: 50.0,
            opening: 150.0,
        }
    }
}

impl BlinkConfig {
    /// Length of one blink, excluding the idle wait
    pub fn blink_duration(&self) -> f32 {
        self.closing + self.closed + self.opening
    }
}

/// # Breath Timing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreathConfig {
    /// Pause between breaths. Must be non-negative.
    pub rest: f32,
    /// Symmetric random jitter applied to the pause
    pub rest_jitter: f32,
    /// Time to breathe in
    pub inhale: f32,
    /// Time the breath is held
    pub hold: f32,
    /// Time to breathe out
    pub exhale: f32,
}

impl Default for BreathConfig {
    fn default() -> Self {
        Self {
            rest: 600.0,
            rest_jitter: 200.0,
            inhale: 1500.0,
            hold: 300.0,
            exhale: 1800.0,
        }
    }
}
