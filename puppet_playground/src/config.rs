//! Playground configuration

use std::path::PathBuf;

use puppet_engine::config::Config;
use puppet_engine::core::config::{BlinkConfig, BreathConfig, PuppetOptions};
use serde::{Deserialize, Serialize};

/// Procedural demo model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoModelConfig {
    /// Model name, shows up in log tags
    pub name: String,
    /// Canvas width in pixels
    pub width: f32,
    /// Canvas height in pixels
    pub height: f32,
    /// Number of texture slots to generate
    pub textures: usize,
    /// Edge length of each generated texture
    pub texture_size: u32,
}

impl Default for DemoModelConfig {
    fn default() -> Self {
        Self {
            name: "demo".to_string(),
            width: 400.0,
            height: 800.0,
            textures: 2,
            texture_size: 64,
        }
    }
}

/// Settings for one headless playground run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaygroundConfig {
    /// Frames to render
    pub frames: u32,
    /// Simulated frame time in milliseconds
    pub frame_ms: f32,
    /// Frame at which the render context is lost and recreated
    pub context_loss_frame: Option<u32>,
    /// Seed for the blink and breath jitter; random when unset
    pub seed: Option<u64>,
    /// Framebuffer size
    pub viewport: [f32; 2],
    /// Where to write the first texture as the GPU received it
    pub snapshot: Option<PathBuf>,
    /// Demo model
    pub model: DemoModelConfig,
    /// Node options
    pub puppet: PuppetOptions,
    /// Blink timing
    pub blink: BlinkConfig,
    /// Breath timing
    pub breath: BreathConfig,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            frames: 600,
            frame_ms: 1000.0 / 60.0,
            context_loss_frame: Some(300),
            seed: None,
            viewport: [800.0, 600.0],
            snapshot: None,
            model: DemoModelConfig::default(),
            puppet: PuppetOptions::default(),
            blink: BlinkConfig::default(),
            breath: BreathConfig::default(),
        }
    }
}

impl Config for PlaygroundConfig {}
