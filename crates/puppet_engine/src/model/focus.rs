//! Gaze focus controller
//!
//! Eases the model's gaze toward a target direction with bounded speed and
//! acceleration, so the head turns smoothly instead of snapping.

use crate::foundation::math::utils::clamp;

/// Distance below which the gaze counts as arrived
const EPSILON: f32 = 0.01;
/// Maximum gaze speed, in units per second
const MAX_SPEED: f32 = 40.0 / 7.5;
/// Inverse of the time to reach full speed, per millisecond
const ACCELERATION_TIME: f32 = 1.0 / (0.15 * 1000.0);

/// Smoothed focus direction in `[-1, 1]²`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FocusController {
    target_x: f32,
    target_y: f32,
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
}

impl FocusController {
    /// Controller looking straight ahead
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target direction; components are clamped to `[-1, 1]`
    pub fn focus(&mut self, x: f32, y: f32, instant: bool) {
        self.target_x = clamp(x, -1.0, 1.0);
        self.target_y = clamp(y, -1.0, 1.0);

        if instant {
            self.x = self.target_x;
            self.y = self.target_y;
            self.vx = 0.0;
            self.vy = 0.0;
        }
    }

    /// Move toward the target by `dt` milliseconds
    pub fn update(&mut self, dt: f32) {
        let dx = self.target_x - self.x;
        let dy = self.target_y - self.y;

        if dx.abs() <= EPSILON && dy.abs() <= EPSILON {
            return;
        }

        let distance = (dx * dx + dy * dy).sqrt();
        let max_speed = MAX_SPEED * dt / 1000.0;

        let mut ax = max_speed * (dx / distance) - self.vx;
        let mut ay = max_speed * (dy / distance) - self.vy;
        let acceleration = (ax * ax + ay * ay).sqrt();
        let max_acceleration = max_speed * ACCELERATION_TIME * dt;

        if acceleration > max_acceleration {
            ax *= max_acceleration / acceleration;
            ay *= max_acceleration / acceleration;
        }

        self.vx += ax;
        self.vy += ay;

        // Cap speed so the gaze can still stop at the target without overshooting
        let speed = (self.vx * self.vx + self.vy * self.vy).sqrt();
        let max_velocity = 0.5
            * ((max_acceleration * max_acceleration + 8.0 * max_acceleration * distance).sqrt()
                - max_acceleration);

        if speed > max_velocity {
            self.vx *= max_velocity / speed;
            self.vy *= max_velocity / speed;
        }

        self.x += self.vx;
        self.y += self.vy;
    }

    /// Current gaze direction
    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    /// Target gaze direction
    pub fn target(&self) -> (f32, f32) {
        (self.target_x, self.target_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instant_focus_jumps_and_clamps() {
        let mut focus = FocusController::new();
        focus.focus(3.0, -0.5, true);
        assert_eq!(focus.position(), (1.0, -0.5));
    }

    #[test]
    fn test_eases_toward_target() {
        let mut focus = FocusController::new();
        focus.focus(1.0, 0.0, false);

        focus.update(16.0);
        let (first, _) = focus.position();
        assert!(first > 0.0 && first < 1.0);

        for _ in 0..600 {
            focus.update(16.0);
        }
        let (x, y) = focus.position();
        assert!((x - 1.0).abs() <= 0.05, "x = {x}");
        assert!(y.abs() <= 0.05);
    }

    #[test]
    fn test_zero_dt_does_not_move() {
        let mut focus = FocusController::new();
        focus.focus(1.0, 1.0, false);
        focus.update(0.0);
        assert_eq!(focus.position(), (0.0, 0.0));
    }
}
