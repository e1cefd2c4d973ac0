//! Frame tick management
//!
//! Model time is measured in milliseconds, the unit every procedural cycle
//! and motion duration uses.

use std::time::Instant;

/// Frame ticker producing millisecond deltas
///
/// Either driven by the wall clock with [`Ticker::tick`] or stepped manually
/// with [`Ticker::advance`] for headless and deterministic runs.
#[derive(Debug, Clone)]
pub struct Ticker {
    last_frame: Instant,
    delta_ms: f32,
    elapsed_ms: f64,
    frame_count: u64,
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new()
    }
}

impl Ticker {
    /// Create a new ticker
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_ms: 0.0,
            elapsed_ms: 0.0,
            frame_count: 0,
        }
    }

    /// Measure the wall-clock time since the previous tick and return it in milliseconds
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame).as_secs_f32() * 1000.0;
        self.last_frame = now;
        self.advance(delta)
    }

    /// Step the ticker by a fixed amount of milliseconds
    pub fn advance(&mut self, delta_ms: f32) -> f32 {
        self.delta_ms = delta_ms;
        self.elapsed_ms += f64::from(delta_ms);
        self.frame_count += 1;
        delta_ms
    }

    /// Milliseconds covered by the last tick
    pub fn delta_ms(&self) -> f32 {
        self.delta_ms
    }

    /// Total milliseconds since creation
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Number of ticks so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Average frames per second over the whole run
    pub fn average_fps(&self) -> f64 {
        if self.elapsed_ms > 0.0 {
            self.frame_count as f64 * 1000.0 / self.elapsed_ms
        } else {
            0.0
        }
    }
}
