//! Composite opacity for raw-drawn models
//!
//! The model renders with its own GPU calls, so per-node alpha cannot ride
//! along with the host's batching. It is applied as a filter over the
//! whole draw instead, reconfigured only when the world alpha moves.

/// Alpha filter attached to a puppet node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlphaFilter {
    alpha: f32,
    last_world_alpha: f32,
}

impl Default for AlphaFilter {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            last_world_alpha: 1.0,
        }
    }
}

impl AlphaFilter {
    /// Create a fully opaque filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Current filter alpha
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Apply `world_alpha` if it changed since the last call; returns whether it did
    pub fn sync(&mut self, world_alpha: f32) -> bool {
        if world_alpha == self.last_world_alpha {
            return false;
        }
        self.alpha = world_alpha;
        self.last_world_alpha = world_alpha;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_only_on_change() {
        let mut filter = AlphaFilter::new();
        assert!(!filter.sync(1.0));
        assert!(filter.sync(0.5));
        assert_eq!(filter.alpha(), 0.5);
        assert!(!filter.sync(0.5));
        assert!(filter.sync(1.0));
    }
}
