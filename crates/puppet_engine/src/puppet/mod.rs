//! Puppet node
//!
//! The scene node that owns a rigged model, its textures and its time, and
//! the pieces around it: public events and host-driven automation.

pub mod automator;
pub mod events;
pub mod model;

#[cfg(test)]
mod tests;

pub use automator::{Automator, AutomatorAction, PointerEvent};
pub use events::{ModelEvent, ModelEventHandler, ModelEventType, ModelEvents};
pub use model::{ModelError, PuppetModel};
