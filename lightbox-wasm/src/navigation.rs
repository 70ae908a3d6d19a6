//! Slide navigation.
//!
//! A navigation runs in two phases. If the image is zoomed or panned, the view
//! is first animated back to its default and the navigation waits for that
//! animation to finish. Then the slide track is animated towards the
//! neighbouring slide, and the index is committed when that transition ends.
//!
//! Both waits end either with a transition end event or with a fallback timer,
//! whichever comes first. Since both can arrive, the commit is guarded so that
//! it happens exactly once per navigation.

use lightbox_json::Direction;
use std::collections::VecDeque;

/// Navigation phase.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Phase {
    /// No navigation in flight.
    #[default]
    Idle,
    /// Waiting for the view reset animation.
    Resetting(Direction),
    /// Waiting for the slide transition.
    Sliding(Direction),
}

/// Action requested by the navigator.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Step {
    /// Nothing to do.
    None,
    /// The request was queued behind the navigation in flight.
    Queued,
    /// Animate zoom and pan back to their defaults.
    ResetView,
    /// Start the slide transition.
    Slide(Direction),
    /// Commit the index change.
    Commit(Direction),
}

/// Navigation controller.
#[derive(Debug, Default, Clone)]
pub struct Navigator {
    phase: Phase,
    committed: bool,
    queue: VecDeque<Direction>,
}

impl Navigator {
    /// Creates an idle navigator.
    pub fn new() -> Navigator {
        Navigator::default()
    }

    /// Requests a navigation.
    ///
    /// `view_is_default` tells whether zoom and pan already have their default
    /// values, in which case the reset phase is skipped. A request made while
    /// another navigation is in flight joins that navigation's wait and runs
    /// after its commit.
    pub fn request(&mut self, direction: Direction, view_is_default: bool) -> Step {
        if self.phase != Phase::Idle {
            self.queue.push_back(direction);
            return Step::Queued;
        }
        self.begin(direction, view_is_default)
    }

    fn begin(&mut self, direction: Direction, view_is_default: bool) -> Step {
        self.committed = false;
        if view_is_default {
            self.phase = Phase::Sliding(direction);
            Step::Slide(direction)
        } else {
            self.phase = Phase::Resetting(direction);
            Step::ResetView
        }
    }

    /// Signals that the view reset has finished.
    pub fn reset_settled(&mut self) -> Step {
        match self.phase {
            Phase::Resetting(direction) => {
                self.phase = Phase::Sliding(direction);
                Step::Slide(direction)
            }
            _ => Step::None,
        }
    }

    /// Signals that the slide transition has finished.
    pub fn slide_settled(&mut self) -> Step {
        match self.phase {
            Phase::Sliding(direction) if !self.committed => {
                self.committed = true;
                self.phase = Phase::Idle;
                Step::Commit(direction)
            }
            _ => Step::None,
        }
    }

    /// Starts the next queued navigation, if any.
    pub fn next_queued(&mut self, view_is_default: bool) -> Step {
        if self.phase != Phase::Idle {
            return Step::None;
        }
        match self.queue.pop_front() {
            Some(direction) => self.begin(direction, view_is_default),
            None => Step::None,
        }
    }

    /// Abandons the navigation in flight and the queued ones.
    pub fn cancel(&mut self) {
        self.phase = Phase::Idle;
        self.queue.clear();
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns `true` if a navigation is in flight.
    pub fn is_busy(&self) -> bool {
        self.phase != Phase::Idle
    }
}
