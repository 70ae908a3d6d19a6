//! Open and close sequencing.

use crate::error::LightboxError;
use crate::host::Host;

/// Lifecycle phase of the lightbox.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Phase {
    /// Not showing.
    #[default]
    Closed,
    /// Showing and interactive.
    Open,
    /// Playing the exit animation. Input is ignored.
    Closing,
}

/// Lifecycle controller.
///
/// Tracks the lifecycle phase and whether the page scroll is locked.
#[derive(Debug, Default, Clone)]
pub struct Lifecycle {
    phase: Phase,
    scroll_locked: bool,
}

impl Lifecycle {
    /// Creates a closed lifecycle.
    pub fn new() -> Lifecycle {
        Lifecycle::default()
    }

    /// Opens at `index` in a collection of `len` slides.
    ///
    /// Opening is allowed in any phase; opening during the exit animation
    /// aborts the close.
    pub fn open(&mut self, index: usize, len: usize) -> Result<(), LightboxError> {
        if len == 0 {
            return Err(LightboxError::EmptyCollection);
        }
        if index >= len {
            return Err(LightboxError::InvalidIndex { index, len });
        }
        self.phase = Phase::Open;
        Ok(())
    }

    /// Starts closing. Returns `false` (and does nothing) unless open.
    pub fn begin_close(&mut self) -> bool {
        if self.phase != Phase::Open {
            return false;
        }
        self.phase = Phase::Closing;
        true
    }

    /// Finishes closing. Returns `false` (and does nothing) unless closing.
    pub fn finish_close(&mut self) -> bool {
        if self.phase != Phase::Closing {
            return false;
        }
        self.phase = Phase::Closed;
        true
    }

    /// Locks or unlocks the page scroll, telling the host only on changes.
    pub fn set_scroll_lock<H: Host>(&mut self, host: &mut H, locked: bool) {
        if self.scroll_locked != locked {
            self.scroll_locked = locked;
            host.set_scroll_lock(locked);
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns `true` if open and interactive.
    pub fn is_open(&self) -> bool {
        self.phase == Phase::Open
    }

    /// Returns `true` if showing, including during the exit animation.
    pub fn is_visible(&self) -> bool {
        self.phase != Phase::Closed
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn open_validates_index() {
        let mut lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.open(0, 0), Err(LightboxError::EmptyCollection));
        assert_eq!(
            lifecycle.open(3, 3),
            Err(LightboxError::InvalidIndex { index: 3, len: 3 })
        );
        assert_eq!(lifecycle.phase(), Phase::Closed);
        assert_eq!(lifecycle.open(2, 3), Ok(()));
        assert!(lifecycle.is_open());
    }

    #[test]
    fn close_is_reentrant_safe() {
        let mut lifecycle = Lifecycle::new();
        assert!(!lifecycle.begin_close());
        lifecycle.open(0, 1).unwrap();
        assert!(lifecycle.begin_close());
        assert!(!lifecycle.begin_close());
        assert!(lifecycle.is_visible());
        assert!(!lifecycle.is_open());
        assert!(lifecycle.finish_close());
        assert!(!lifecycle.finish_close());
        assert!(!lifecycle.is_visible());
    }
}
