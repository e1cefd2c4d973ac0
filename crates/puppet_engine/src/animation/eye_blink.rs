//! Eye blink cycle
//!
//! Idle → Closing → Closed → Opening → Idle, forever. The openness value
//! multiplies both eye-open parameters while a blink is in progress; in Idle
//! the parameters are left to whatever motions wrote.

use crate::animation::cycle::{JitterSource, Phase, ProceduralCycle, RampDirection, RngJitter};
use crate::core::config::BlinkConfig;
use crate::model::ParameterModel;

/// Parameter id of the left eye openness
pub const PARAM_EYE_L_OPEN: &str = "PARAM_EYE_L_OPEN";
/// Parameter id of the right eye openness
pub const PARAM_EYE_R_OPEN: &str = "PARAM_EYE_R_OPEN";

/// Phase of a blink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkPhase {
    /// Eyes open, waiting for the next blink
    Idle,
    /// Eyes closing
    Closing,
    /// Eyes shut
    Closed,
    /// Eyes opening
    Opening,
}

impl BlinkPhase {
    fn from_index(index: usize) -> Self {
        match index {
            0 => Self::Idle,
            1 => Self::Closing,
            2 => Self::Closed,
            _ => Self::Opening,
        }
    }
}

/// Transition table for a blink with the given timing
pub fn blink_table(config: &BlinkConfig) -> Vec<Phase> {
    vec![
        Phase::wait("idle", config.interval, config.interval_jitter),
        Phase::ramp("closing", RampDirection::Down, config.closing),
        Phase::hold("closed", config.closed),
        Phase::ramp("opening", RampDirection::Up, config.opening),
    ]
}

/// Procedural eye blink
#[derive(Debug, Clone)]
pub struct EyeBlink<J = RngJitter> {
    cycle: ProceduralCycle<J>,
    left_param: Option<usize>,
    right_param: Option<usize>,
}

impl EyeBlink<RngJitter> {
    /// Blink with OS-seeded jitter, bound to the model's eye parameters
    pub fn new<P: ParameterModel + ?Sized>(config: &BlinkConfig, params: &P) -> Self {
        Self::with_jitter(config, params, RngJitter::from_entropy())
    }
}

impl<J: JitterSource> EyeBlink<J> {
    /// Blink with an injected jitter source
    ///
    /// `config.interval` must be non-negative.
    pub fn with_jitter<P: ParameterModel + ?Sized>(config: &BlinkConfig, params: &P, jitter: J) -> Self {
        let left_param = params.parameter_index(PARAM_EYE_L_OPEN);
        let right_param = params.parameter_index(PARAM_EYE_R_OPEN);
        if left_param.is_none() && right_param.is_none() {
            log::debug!("Model has no eye-open parameters, blink has no visible effect");
        }

        Self {
            cycle: ProceduralCycle::new(blink_table(config), 1.0, jitter),
            left_param,
            right_param,
        }
    }

    /// Advance the blink without touching any parameters
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.cycle.advance(dt)
    }

    /// Advance the blink and write the openness to the eye parameters
    pub fn update<P: ParameterModel + ?Sized>(&mut self, dt: f32, params: &mut P) {
        let openness = self.cycle.advance(dt);
        if self.cycle.is_waiting() {
            return;
        }

        for index in [self.left_param, self.right_param].into_iter().flatten() {
            params.multiply_parameter(index, openness);
        }
    }

    /// Current phase
    pub fn phase(&self) -> BlinkPhase {
        BlinkPhase::from_index(self.cycle.phase_index())
    }

    /// Current openness in `[0, 1]`
    pub fn openness(&self) -> f32 {
        self.cycle.value()
    }

    /// Time left before the next blink starts, while idle
    pub fn next_blink_in(&self) -> Option<f32> {
        (self.phase() == BlinkPhase::Idle).then(|| self.cycle.timer())
    }
}
