//! Host environment.
//!
//! The lightbox engine does not talk to the browser directly. Everything that
//! has to happen outside of it (animation frames, timers, page scroll lock,
//! drawing and notifications) goes through the [`Host`] trait. The DOM
//! implementation lives in [`crate::ui`].

use lightbox_json::Frame;

/// Timers used by the engine.
///
/// There is at most one pending timer of each kind. Setting a timer replaces
/// the pending one of the same kind.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Timer {
    /// Detects the end of a ctrl+wheel zoom gesture.
    WheelEnd,
    /// Fallback for a view reset transition end that never arrives.
    ResetFallback,
    /// Fallback for a slide transition end that never arrives.
    SlideFallback,
    /// End of the close fade.
    CloseFade,
}

impl Timer {
    /// All the timer kinds.
    pub const ALL: [Timer; 4] = [
        Timer::WheelEnd,
        Timer::ResetFallback,
        Timer::SlideFallback,
        Timer::CloseFade,
    ];
}

/// Host environment of the engine.
pub trait Host {
    /// Requests a call to [`Lightbox::on_frame`](crate::Lightbox::on_frame) on
    /// the next animation frame.
    fn request_frame(&mut self);

    /// Arms `timer` to call [`Lightbox::on_timer`](crate::Lightbox::on_timer)
    /// after `delay_ms`, replacing the pending timer of the same kind.
    fn set_timer(&mut self, timer: Timer, delay_ms: u32);

    /// Cancels `timer` if it is pending.
    fn clear_timer(&mut self, timer: Timer);

    /// Locks or unlocks the scrolling of the page under the lightbox.
    fn set_scroll_lock(&mut self, locked: bool);

    /// Draws a frame.
    fn present(&mut self, frame: &Frame);

    /// Notifies that the lightbox has finished closing.
    fn closed(&mut self);
}
