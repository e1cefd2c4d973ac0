//! # Core Module
//!
//! Shared configuration types used by the puppet node, its procedural
//! cycles and host applications.

pub mod config;

// Re-export commonly used config types
pub use config::{
    AutomatorOptions,
    BlinkConfig,
    BreathConfig,
    MotionManagerOptions,
    PuppetOptions,
    Config,
    ConfigError,
};
