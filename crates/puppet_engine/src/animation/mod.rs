//! Procedural animation
//!
//! Self-driving, time-based animations that run inside the model's update
//! independently of motion playback. All of them are instances of
//! [`ProceduralCycle`] with their own phase table.

pub mod breath;
pub mod cycle;
pub mod eye_blink;

pub use breath::Breath;
pub use cycle::{FixedJitter, JitterSource, Phase, PhaseMotion, ProceduralCycle, RampDirection, RngJitter};
pub use eye_blink::{BlinkPhase, EyeBlink};
