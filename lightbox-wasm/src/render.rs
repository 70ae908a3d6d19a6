//! Render scheduling.
//!
//! Pointer events can arrive at several hundred hertz. Every state change
//! schedules a flush, and all the changes made before the next animation frame
//! are drawn together in a single [`Frame`](lightbox_json::Frame).

use crate::host::Host;

/// Render scheduler.
///
/// Coalesces any number of flush requests made within one animation frame
/// into exactly one flush.
#[derive(Debug, Default, Clone)]
pub struct RenderScheduler {
    pending: bool,
}

impl RenderScheduler {
    /// Creates a new render scheduler with no pending flush.
    pub fn new() -> RenderScheduler {
        RenderScheduler::default()
    }

    /// Schedules a flush on the next animation frame.
    ///
    /// Only the first call after a flush requests an animation frame from the
    /// host; further calls are absorbed. Returns `true` if a frame was
    /// requested.
    pub fn schedule_flush<H: Host>(&mut self, host: &mut H) -> bool {
        if self.pending {
            return false;
        }
        self.pending = true;
        host.request_frame();
        true
    }

    /// Starts the flush of an animation frame.
    ///
    /// Returns `true` if a flush was pending, in which case the caller must
    /// draw the current state.
    pub fn begin_flush(&mut self) -> bool {
        if !self.pending {
            return false;
        }
        self.pending = false;
        true
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::host::Timer;
    use lightbox_json::Frame;

    #[derive(Default)]
    struct FrameCounter {
        requests: usize,
    }

    impl Host for FrameCounter {
        fn request_frame(&mut self) {
            self.requests += 1;
        }
        fn set_timer(&mut self, _: Timer, _: u32) {}
        fn clear_timer(&mut self, _: Timer) {}
        fn set_scroll_lock(&mut self, _: bool) {}
        fn present(&mut self, _: &Frame) {}
        fn closed(&mut self) {}
    }

    #[test]
    fn coalesces_requests() {
        let mut host = FrameCounter::default();
        let mut scheduler = RenderScheduler::new();
        assert!(scheduler.schedule_flush(&mut host));
        for _ in 0..100 {
            assert!(!scheduler.schedule_flush(&mut host));
        }
        assert_eq!(host.requests, 1);
        assert!(scheduler.begin_flush());
        assert!(!scheduler.begin_flush());
        assert!(scheduler.schedule_flush(&mut host));
        assert_eq!(host.requests, 2);
    }

    #[test]
    fn spurious_frame_does_nothing() {
        let mut scheduler = RenderScheduler::new();
        assert!(!scheduler.begin_flush());
        let mut host = FrameCounter::default();
        assert!(scheduler.schedule_flush(&mut host));
        assert_eq!(host.requests, 1);
    }
}
