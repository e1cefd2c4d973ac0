//! Breath cycle
//!
//! Shares the blink's table-driven machinery with a different table:
//! rest, breathe in, hold, breathe out.

use crate::animation::cycle::{JitterSource, Phase, ProceduralCycle, RampDirection, RngJitter};
use crate::core::config::BreathConfig;
use crate::model::ParameterModel;

/// Parameter id driven by the breath cycle
pub const PARAM_BREATH: &str = "PARAM_BREATH";

/// Transition table for a breath with the given timing
pub fn breath_table(config: &BreathConfig) -> Vec<Phase> {
    vec![
        Phase::wait("rest", config.rest, config.rest_jitter),
        Phase::ramp("inhale", RampDirection::Up, config.inhale),
        Phase::hold("full", config.hold),
        Phase::ramp("exhale", RampDirection::Down, config.exhale),
    ]
}

/// Procedural breathing
#[derive(Debug, Clone)]
pub struct Breath<J = RngJitter> {
    cycle: ProceduralCycle<J>,
    param: Option<usize>,
}

impl Breath<RngJitter> {
    /// Breath with OS-seeded jitter
    pub fn new<P: ParameterModel + ?Sized>(config: &BreathConfig, params: &P) -> Self {
        Self::with_jitter(config, params, RngJitter::from_entropy())
    }
}

impl<J: JitterSource> Breath<J> {
    /// Breath with an injected jitter source
    pub fn with_jitter<P: ParameterModel + ?Sized>(config: &BreathConfig, params: &P, jitter: J) -> Self {
        Self {
            cycle: ProceduralCycle::new(breath_table(config), 0.0, jitter),
            param: params.parameter_index(PARAM_BREATH),
        }
    }

    /// Advance and write the breath amount
    pub fn update<P: ParameterModel + ?Sized>(&mut self, dt: f32, params: &mut P) {
        let amount = self.cycle.advance(dt);
        if let Some(index) = self.param {
            params.set_parameter(index, amount);
        }
    }

    /// Current breath amount in `[0, 1]`
    pub fn amount(&self) -> f32 {
        self.cycle.value()
    }

    /// Name of the current phase
    pub fn phase_name(&self) -> &'static str {
        self.cycle.phase().name
    }
}
