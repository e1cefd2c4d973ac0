//! Table-driven procedural cycles
//!
//! A procedural cycle is a perpetual state machine producing one value in
//! `[0, 1]` from elapsed time alone. Its phases are plain data: each one
//! either waits out a jittered interval, ramps the value linearly to one end
//! of the range, or holds it. Phases run in table order and wrap around.
//!
//! Time left over when a phase ends is not carried into the next one. The
//! only randomness is the jitter sampled each time a wait phase is entered.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of jitter samples in `[-1, 1]`
pub trait JitterSource {
    /// Draw the next sample
    fn sample(&mut self) -> f32;
}

/// Jitter that always returns the same sample
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FixedJitter(pub f32);

impl JitterSource for FixedJitter {
    fn sample(&mut self) -> f32 {
        self.0
    }
}

/// Uniform jitter drawn from a random number generator
#[derive(Debug, Clone)]
pub struct RngJitter<R = StdRng> {
    rng: R,
}

impl RngJitter<StdRng> {
    /// Reproducible jitter from a seed
    pub fn from_seed(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    /// Jitter seeded from the operating system
    pub fn from_entropy() -> Self {
        Self { rng: StdRng::from_entropy() }
    }
}

impl<R: Rng> RngJitter<R> {
    /// Wrap an existing generator
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> JitterSource for RngJitter<R> {
    fn sample(&mut self) -> f32 {
        self.rng.gen_range(-1.0..=1.0)
    }
}

/// End of the `[0, 1]` range a ramp moves toward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampDirection {
    /// Toward 1
    Up,
    /// Toward 0
    Down,
}

impl RampDirection {
    /// Value at which the ramp ends
    pub fn target(self) -> f32 {
        match self {
            Self::Up => 1.0,
            Self::Down => 0.0,
        }
    }

    fn reached(self, value: f32) -> bool {
        match self {
            Self::Up => value >= 1.0,
            Self::Down => value <= 0.0,
        }
    }
}

/// What a phase does with the value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhaseMotion {
    /// Count down `duration ± jitter` (never below zero) with the value untouched
    Wait {
        /// Maximum deviation from the base duration
        jitter: f32,
    },
    /// Move the value linearly to one end of the range over `duration`
    Ramp(RampDirection),
    /// Keep the value still for `duration`
    Hold,
}

/// One row of a cycle's transition table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Phase {
    /// Name for logging and inspection
    pub name: &'static str,
    /// Behavior during the phase
    pub motion: PhaseMotion,
    /// Base duration, in the same unit as the deltas fed to the cycle
    pub duration: f32,
}

impl Phase {
    /// Waiting phase. `duration` must be non-negative.
    pub const fn wait(name: &'static str, duration: f32, jitter: f32) -> Self {
        Self { name, motion: PhaseMotion::Wait { jitter }, duration }
    }

    /// Ramping phase
    pub const fn ramp(name: &'static str, direction: RampDirection, duration: f32) -> Self {
        Self { name, motion: PhaseMotion::Ramp(direction), duration }
    }

    /// Holding phase
    pub const fn hold(name: &'static str, duration: f32) -> Self {
        Self { name, motion: PhaseMotion::Hold, duration }
    }
}

/// A perpetual procedural cycle driven by a phase table
#[derive(Debug, Clone)]
pub struct ProceduralCycle<J = RngJitter> {
    phases: Vec<Phase>,
    current: usize,
    value: f32,
    timer: f32,
    jitter: J,
}

impl<J: JitterSource> ProceduralCycle<J> {
    /// Create a cycle starting in the first phase
    ///
    /// # Panics
    ///
    /// Panics if `phases` is empty.
    pub fn new(phases: Vec<Phase>, initial_value: f32, jitter: J) -> Self {
        assert!(!phases.is_empty(), "a procedural cycle needs at least one phase");
        debug_assert!(
            phases
                .iter()
                .all(|p| !matches!(p.motion, PhaseMotion::Wait { .. }) || p.duration >= 0.0),
            "wait phases require a non-negative duration"
        );

        let mut cycle = Self {
            phases,
            current: 0,
            value: initial_value.clamp(0.0, 1.0),
            timer: 0.0,
            jitter,
        };
        cycle.enter(0);
        cycle
    }

    /// Advance by `dt` and return the resulting value
    pub fn advance(&mut self, dt: f32) -> f32 {
        let phase = self.phases[self.current];

        match phase.motion {
            PhaseMotion::Wait { .. } => {
                self.timer -= dt;
                if self.timer <= 0.0 {
                    self.enter_next();
                }
            }
            PhaseMotion::Ramp(direction) => {
                let target = direction.target();
                if phase.duration <= 0.0 {
                    self.value = target;
                } else {
                    let step = dt / phase.duration;
                    self.value = match direction {
                        RampDirection::Up => self.value + step,
                        RampDirection::Down => self.value - step,
                    }
                    .clamp(0.0, 1.0);
                }

                if direction.reached(self.value) {
                    self.value = target;
                    self.enter_next();
                }
            }
            PhaseMotion::Hold => {
                self.timer += dt;
                if self.timer >= phase.duration {
                    self.enter_next();
                }
            }
        }

        self.value
    }

    /// Current value in `[0, 1]`
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Index of the current phase in the table
    pub fn phase_index(&self) -> usize {
        self.current
    }

    /// Current phase
    pub fn phase(&self) -> &Phase {
        &self.phases[self.current]
    }

    /// Whether the current phase is a wait
    pub fn is_waiting(&self) -> bool {
        matches!(self.phase().motion, PhaseMotion::Wait { .. })
    }

    /// Countdown left in a wait phase, or time spent in a hold phase
    pub fn timer(&self) -> f32 {
        self.timer
    }

    /// The transition table
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    fn enter_next(&mut self) {
        self.enter((self.current + 1) % self.phases.len());
    }

    fn enter(&mut self, index: usize) {
        self.current = index;
        let phase = self.phases[index];
        self.timer = match phase.motion {
            PhaseMotion::Wait { jitter } => (phase.duration + self.jitter.sample() * jitter).max(0.0),
            PhaseMotion::Ramp(_) | PhaseMotion::Hold => 0.0,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pulse() -> Vec<Phase> {
        vec![
            Phase::wait("rest", 10.0, 5.0),
            Phase::ramp("rise", RampDirection::Up, 4.0),
            Phase::hold("top", 2.0),
            Phase::ramp("fall", RampDirection::Down, 4.0),
        ]
    }

    #[test]
    fn test_wait_uses_jitter_and_clamps() {
        let cycle = ProceduralCycle::new(pulse(), 0.0, FixedJitter(-1.0));
        assert_eq!(cycle.timer(), 5.0);

        let phases = vec![Phase::wait("rest", 1.0, 5.0), Phase::hold("h", 1.0)];
        let cycle = ProceduralCycle::new(phases, 0.0, FixedJitter(-1.0));
        assert_eq!(cycle.timer(), 0.0);
    }

    #[test]
    fn test_linear_ramp_and_wrap() {
        let mut cycle = ProceduralCycle::new(pulse(), 0.0, FixedJitter(0.0));

        cycle.advance(10.0);
        assert_eq!(cycle.phase().name, "rise");
        assert_eq!(cycle.advance(1.0), 0.25);
        assert_eq!(cycle.advance(3.0), 1.0);
        assert_eq!(cycle.phase().name, "top");
        cycle.advance(2.0);
        assert_eq!(cycle.phase().name, "fall");
        assert_eq!(cycle.advance(10.0), 0.0);
        assert_eq!(cycle.phase_index(), 0);
        assert!(cycle.is_waiting());
    }

    #[test]
    fn test_zero_duration_ramp_snaps() {
        let phases = vec![Phase::ramp("snap", RampDirection::Up, 0.0), Phase::hold("h", 1.0)];
        let mut cycle = ProceduralCycle::new(phases, 0.0, FixedJitter(0.0));
        assert_eq!(cycle.advance(0.0), 1.0);
        assert_eq!(cycle.phase().name, "h");
    }

    #[test]
    fn test_seeded_jitter_is_reproducible() {
        let mut a = RngJitter::from_seed(42);
        let mut b = RngJitter::from_seed(42);
        for _ in 0..32 {
            let sample = a.sample();
            assert!((-1.0..=1.0).contains(&sample));
            assert_eq!(sample, b.sample());
        }
    }

    #[test]
    #[should_panic(expected = "at least one phase")]
    fn test_empty_table_panics() {
        let _ = ProceduralCycle::new(Vec::new(), 0.0, FixedJitter(0.0));
    }
}
