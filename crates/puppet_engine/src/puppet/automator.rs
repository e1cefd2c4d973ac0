//! Automatic update and interaction
//!
//! Hosts that do not want to drive a puppet by hand feed it the frame tick
//! and raw pointer events; the automator decides which of them reach the
//! node, according to [`AutomatorOptions`].

use crate::core::config::AutomatorOptions;

/// Pointer input in host world coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Pointer moved
    Move {
        /// X position
        x: f32,
        /// Y position
        y: f32,
    },
    /// Pointer tapped
    Tap {
        /// X position
        x: f32,
        /// Y position
        y: f32,
    },
}

/// What the automator wants done with an input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutomatorAction {
    /// Nothing
    Ignore,
    /// Turn the gaze toward a point
    Focus(f32, f32),
    /// Hit test a point and emit hits
    Tap(f32, f32),
}

/// Routes ticks and pointer events to a puppet node
#[derive(Debug, Clone)]
pub struct Automator {
    options: AutomatorOptions,
    enabled: bool,
}

impl Default for Automator {
    fn default() -> Self {
        Self::new(AutomatorOptions::default())
    }
}

impl Automator {
    /// Create an enabled automator
    pub fn new(options: AutomatorOptions) -> Self {
        Self { options, enabled: true }
    }

    /// Current switches
    pub fn options(&self) -> &AutomatorOptions {
        &self.options
    }

    /// Replace the switches
    pub fn set_options(&mut self, options: AutomatorOptions) {
        self.options = options;
    }

    /// Whether the automator is still attached
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Detach for good; every later input is ignored
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Whether frame ticks should feed the node's update
    pub fn wants_tick(&self) -> bool {
        self.enabled && self.options.auto_update
    }

    /// Decide what to do with a pointer event
    pub fn route(&self, event: PointerEvent) -> AutomatorAction {
        if !self.enabled {
            return AutomatorAction::Ignore;
        }

        match event {
            PointerEvent::Move { x, y } if self.options.auto_focus => AutomatorAction::Focus(x, y),
            PointerEvent::Tap { x, y } if self.options.auto_hit_test => AutomatorAction::Tap(x, y),
            _ => AutomatorAction::Ignore,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_by_switch() {
        let automator = Automator::default();
        assert_eq!(automator.route(PointerEvent::Move { x: 1.0, y: 2.0 }), AutomatorAction::Focus(1.0, 2.0));
        assert_eq!(automator.route(PointerEvent::Tap { x: 3.0, y: 4.0 }), AutomatorAction::Tap(3.0, 4.0));

        let automator = Automator::new(AutomatorOptions {
            auto_update: false,
            auto_hit_test: false,
            auto_focus: true,
        });
        assert!(!automator.wants_tick());
        assert_eq!(automator.route(PointerEvent::Tap { x: 3.0, y: 4.0 }), AutomatorAction::Ignore);
    }

    #[test]
    fn test_disabled_ignores_everything() {
        let mut automator = Automator::default();
        automator.disable();
        assert!(!automator.wants_tick());
        assert_eq!(automator.route(PointerEvent::Move { x: 0.0, y: 0.0 }), AutomatorAction::Ignore);
    }
}
