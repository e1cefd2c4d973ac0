//! Deferred playback results
//!
//! Motions, speech and expressions complete some frames after they are
//! started. A [`Playback`] is the caller's side of that result and a
//! [`PlaybackSettler`] the motion manager's side. Both share one slot which
//! settles exactly once; later settle attempts are ignored.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

/// Why a playback failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// The node has no model
    #[error("Model is not loaded")]
    NotLoaded,

    /// The requested motion, sound or expression does not exist
    #[error("Playback unavailable: {0}")]
    Unavailable(String),

    /// Playback started but failed
    #[error("Playback failed: {0}")]
    Failed(String),
}

/// State of a playback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// Still running
    Pending,
    /// Completed; `false` when the request was declined, e.g. by priority
    Finished(bool),
    /// Failed with an error
    Failed(PlaybackError),
    /// The manager went away before completing it
    Abandoned,
}

impl PlaybackStatus {
    /// Whether the playback has settled
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

type Slot = Rc<RefCell<PlaybackStatus>>;

/// Caller's handle to a playback result
#[derive(Clone)]
pub struct Playback {
    slot: Slot,
}

impl Playback {
    /// Create a pending playback and the handle that settles it
    pub fn pending() -> (Self, PlaybackSettler) {
        let slot: Slot = Rc::new(RefCell::new(PlaybackStatus::Pending));
        (Self { slot: Rc::clone(&slot) }, PlaybackSettler { slot })
    }

    /// Playback that is already finished
    pub fn resolved(started: bool) -> Self {
        Self::settled(PlaybackStatus::Finished(started))
    }

    /// Playback that has already failed
    pub fn failed(error: PlaybackError) -> Self {
        Self::settled(PlaybackStatus::Failed(error))
    }

    fn settled(status: PlaybackStatus) -> Self {
        Self { slot: Rc::new(RefCell::new(status)) }
    }

    /// Current state
    pub fn status(&self) -> PlaybackStatus {
        self.slot.borrow().clone()
    }

    /// Whether the playback is still running
    pub fn is_pending(&self) -> bool {
        !self.slot.borrow().is_settled()
    }
}

impl fmt::Debug for Playback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Playback").field("status", &*self.slot.borrow()).finish()
    }
}

/// Motion manager's handle for settling a playback
///
/// Dropping a settler that never settled abandons the playback.
pub struct PlaybackSettler {
    slot: Slot,
}

impl PlaybackSettler {
    /// Settle as finished
    pub fn finish(self, started: bool) {
        self.settle(PlaybackStatus::Finished(started));
    }

    /// Settle as failed
    pub fn fail(self, error: PlaybackError) {
        self.settle(PlaybackStatus::Failed(error));
    }

    /// Settle as abandoned
    pub fn abandon(self) {
        self.settle(PlaybackStatus::Abandoned);
    }

    /// Whether the caller still holds the playback
    pub fn is_observed(&self) -> bool {
        Rc::strong_count(&self.slot) > 1
    }

    fn settle(&self, status: PlaybackStatus) {
        let mut slot = self.slot.borrow_mut();
        if !slot.is_settled() {
            *slot = status;
        }
    }
}

impl Drop for PlaybackSettler {
    fn drop(&mut self) {
        self.settle(PlaybackStatus::Abandoned);
    }
}

impl fmt::Debug for PlaybackSettler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackSettler").field("status", &*self.slot.borrow()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settles_once() {
        let (playback, settler) = Playback::pending();
        assert!(playback.is_pending());

        settler.finish(true);

        assert_eq!(playback.status(), PlaybackStatus::Finished(true));
        assert!(!playback.is_pending());
    }

    #[test]
    fn test_dropped_settler_abandons() {
        let (playback, settler) = Playback::pending();
        drop(settler);
        assert_eq!(playback.status(), PlaybackStatus::Abandoned);
    }

    #[test]
    fn test_failure_is_kept() {
        let (playback, settler) = Playback::pending();
        settler.fail(PlaybackError::Unavailable("tap_body".into()));
        assert_eq!(
            playback.status(),
            PlaybackStatus::Failed(PlaybackError::Unavailable("tap_body".into()))
        );
    }

    #[test]
    fn test_observed_tracks_caller() {
        let (playback, settler) = Playback::pending();
        assert!(settler.is_observed());
        drop(playback);
        assert!(!settler.is_observed());
    }

    #[test]
    fn test_presettled_constructors() {
        assert_eq!(Playback::resolved(false).status(), PlaybackStatus::Finished(false));
        assert_eq!(
            Playback::failed(PlaybackError::NotLoaded).status(),
            PlaybackStatus::Failed(PlaybackError::NotLoaded)
        );
    }
}
