//! Pointer device handling.
//!
//! This module implements handling of pointer devices for the lightbox: mouse
//! and one-finger drags (which swipe between slides, drag the lightbox closed,
//! or pan a zoomed image) and two-finger touchscreen pinches.

use crate::geometry::Point;
use crate::transform::{ViewState, MIN_ZOOM};
use lightbox_json::{Config, Direction, PointerKind};

const NUM_POINTERS: usize = 2;

// Pinches with the fingers closer than this are ignored.
const MIN_PINCH_DISTANCE: f64 = 1.0;

/// Pointer sample.
///
/// This is the information the tracker needs from a browser `PointerEvent`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerInput {
    /// Pointer ID.
    pub id: i32,
    /// Device kind.
    pub kind: PointerKind,
    /// Position in client coordinates.
    pub position: Point,
    /// Whether the pointer is over the zoomable image.
    pub on_target: bool,
    /// Event timestamp in milliseconds.
    pub time_ms: f64,
}

/// Axis lock of a single-pointer drag.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AxisLock {
    /// The drag has not moved far enough to decide.
    #[default]
    None,
    /// Horizontal swipe between slides.
    Horizontal,
    /// Vertical drag-to-close.
    Vertical,
}

/// Reference values of a pinch.
///
/// The baseline is seeded by the first move of a pinch. Zoom steps are then
/// computed from the distance at the previous move, so that a finger that
/// pauses or lifts does not make the zoom snap.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PinchBaseline {
    /// Distance between the fingers when the pinch was seeded.
    pub distance: f64,
    /// Pinch center when the pinch was seeded.
    pub center: Point,
    /// Zoom when the pinch was seeded.
    pub zoom_at_start: f64,
    /// Pan when the pinch was seeded.
    pub pan_at_start: Point,
    previous_distance: f64,
}

/// Pointer gesture.
///
/// Pointer gestures are higher level descriptions of the actions performed by
/// pointer devices. Each pointer event handler of the [`PointerTracker`]
/// returns one.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PointerGesture {
    /// Nothing to do.
    None,
    /// Pan drag of a zoomed image.
    Pan {
        /// Horizontal displacement since pointer down.
        dx: f64,
        /// Vertical displacement since pointer down.
        dy: f64,
    },
    /// Axis-locked swipe or close drag.
    ///
    /// One of the displacements is always zero.
    Swipe {
        /// Horizontal displacement since pointer down.
        dx: f64,
        /// Vertical displacement since pointer down.
        dy: f64,
    },
    /// A pinch has been seeded. No zoom change yet.
    PinchStart {
        /// Center of the pinch.
        center: Point,
    },
    /// Incremental pinch step.
    Pinch {
        /// Zoom factor since the previous step.
        scale: f64,
        /// Current center of the pinch (mean point of the two fingers).
        center: Point,
    },
    /// The last pointer was lifted.
    Release(Release),
    /// The gesture was cancelled because the pointer stream was inconsistent.
    Cancelled,
}

/// How a finished gesture resolves.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Release {
    /// Regulate zoom and pan.
    Settle,
    /// Move an uncommitted swipe or close drag back to rest.
    SnapBack,
    /// Swipe committed a navigation.
    Navigate(Direction),
    /// Drag committed a close.
    Close,
    /// Second tap of a double tap.
    DoubleTap(Point),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Mode {
    Swipe,
    Pan,
}

#[derive(Debug, Clone)]
struct Session {
    mode: Mode,
    start: Point,
    axis_lock: AxisLock,
    offset: Point,
    pinch: Option<PinchBaseline>,
    // Set when the session had two pointers. Single-pointer movement is not
    // interpreted afterwards.
    suppressed: bool,
    moved: bool,
}

impl Session {
    fn new(mode: Mode, start: Point) -> Session {
        Session {
            mode,
            start,
            axis_lock: AxisLock::None,
            offset: Point::ZERO,
            pinch: None,
            suppressed: false,
            moved: false,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct Thresholds {
    lock: f64,
    swipe_change: f64,
    drag_close: f64,
    double_tap_ms: f64,
    double_tap_slop: f64,
}

/// Pointer tracker.
///
/// A pointer tracker receives [`PointerInput`]'s, maintains state about the
/// pointers that are active and about the gesture session they form, and
/// generates [`PointerGesture`]'s.
#[derive(Debug, Clone)]
pub struct PointerTracker {
    slots: [Option<PointerInput>; NUM_POINTERS],
    session: Option<Session>,
    last_tap: Option<(f64, Point)>,
    thresholds: Thresholds,
}

impl PointerTracker {
    /// Creates a new pointer tracker using the thresholds in `config`.
    pub fn new(config: &Config) -> PointerTracker {
        PointerTracker {
            slots: Default::default(),
            session: None,
            last_tap: None,
            thresholds: Thresholds {
                lock: config.lock_threshold,
                swipe_change: config.swipe_change_threshold,
                drag_close: config.drag_close_threshold,
                double_tap_ms: f64::from(config.double_tap_ms),
                double_tap_slop: config.double_tap_slop,
            },
        }
    }

    /// Handler for the pointer down event.
    ///
    /// The `view` is used to decide whether a single-pointer drag pans the
    /// image or swipes.
    pub fn on_pointer_down(&mut self, event: PointerInput, view: &ViewState) -> PointerGesture {
        if self.get_event(event.id).is_some() {
            self.record_event(event);
            return PointerGesture::None;
        }
        if self.num_active_pointers() == NUM_POINTERS {
            log::warn!("third pointer {} down; cancelling gesture", event.id);
            self.reset();
            return PointerGesture::Cancelled;
        }
        if self.session.is_none() {
            let mode = if view.zoom > MIN_ZOOM {
                Mode::Pan
            } else {
                Mode::Swipe
            };
            self.session = Some(Session::new(mode, event.position));
        }
        self.record_event(event);
        PointerGesture::None
    }

    fn record_event(&mut self, event: PointerInput) {
        // Search previous event with same pointer ID.
        if let Some(slot) = self
            .slots
            .iter_mut()
            .flatten()
            .find(|x| x.id == event.id)
        {
            // Replace event with the new one.
            *slot = event;
            return;
        }
        // Search for an empty slot.
        if let Some(slot) = self.slots.iter_mut().find(|x| x.is_none()) {
            slot.replace(event);
        }
    }

    fn get_event(&self, pointer_id: i32) -> Option<&PointerInput> {
        self.slots.iter().flatten().find(|x| x.id == pointer_id)
    }

    /// Handler for the pointer move event.
    ///
    /// Moves of pointers that are not tracked (such as a mouse hovering) are
    /// ignored. The latest position of each pointer is used, so the moves of
    /// the two fingers of a pinch may arrive in any order.
    pub fn on_pointer_move(&mut self, event: PointerInput, view: &ViewState) -> PointerGesture {
        if self.get_event(event.id).is_none() {
            return PointerGesture::None;
        }
        self.record_event(event);
        match self.num_active_pointers() {
            1 => self.drag(event.position),
            2 => self.pinch(view),
            _ => PointerGesture::None,
        }
    }

    /// Handler for the pointer up event.
    ///
    /// When the last pointer is lifted, the returned gesture tells how the
    /// gesture resolves.
    pub fn on_pointer_up(&mut self, event: PointerInput) -> PointerGesture {
        self.release(event, false)
    }

    /// Handler for the pointer cancel event.
    ///
    /// The pointer is removed exactly as in [`PointerTracker::on_pointer_up`],
    /// but a cancelled gesture never commits a navigation or a close.
    pub fn on_pointer_cancel(&mut self, event: PointerInput) -> PointerGesture {
        self.release(event, true)
    }

    fn release(&mut self, event: PointerInput, cancelled: bool) -> PointerGesture {
        let Some(slot) = self
            .slots
            .iter_mut()
            .find(|x| x.as_ref().is_some_and(|x| x.id == event.id))
        else {
            if self.session.is_some() {
                log::warn!("pointer {} up but not tracked; resetting gesture", event.id);
                self.reset();
                return PointerGesture::Cancelled;
            }
            return PointerGesture::None;
        };
        slot.take();
        if self.has_active_pointers() {
            if let Some(session) = self.session.as_mut() {
                session.suppressed = true;
                session.pinch = None;
            }
            return PointerGesture::None;
        }
        match self.session.take() {
            Some(session) => PointerGesture::Release(self.resolve(&session, event, cancelled)),
            None => PointerGesture::None,
        }
    }

    fn resolve(&mut self, session: &Session, event: PointerInput, cancelled: bool) -> Release {
        if session.suppressed || cancelled {
            self.last_tap = None;
            return if session.axis_lock == AxisLock::None {
                Release::Settle
            } else {
                Release::SnapBack
            };
        }
        if !session.moved {
            return self.tap(event);
        }
        self.last_tap = None;
        let offset = session.offset;
        match (session.mode, session.axis_lock) {
            (Mode::Pan, _) | (Mode::Swipe, AxisLock::None) => Release::Settle,
            (Mode::Swipe, AxisLock::Horizontal) => {
                if offset.x.abs() >= self.thresholds.swipe_change {
                    // Dragging towards the left reveals the next slide.
                    Release::Navigate(if offset.x < 0.0 {
                        Direction::Next
                    } else {
                        Direction::Prev
                    })
                } else {
                    Release::SnapBack
                }
            }
            (Mode::Swipe, AxisLock::Vertical) => {
                if offset.y.abs() >= self.thresholds.drag_close {
                    Release::Close
                } else {
                    Release::SnapBack
                }
            }
        }
    }

    fn tap(&mut self, event: PointerInput) -> Release {
        if let Some((time_ms, position)) = self.last_tap.take() {
            if event.time_ms - time_ms <= self.thresholds.double_tap_ms
                && position.distance(event.position) <= self.thresholds.double_tap_slop
            {
                return Release::DoubleTap(event.position);
            }
        }
        self.last_tap = Some((event.time_ms, event.position));
        Release::Settle
    }

    /// Checks if there are any active pointers.
    ///
    /// An active pointer is one for which a pointer down event has been
    /// received, and the corresponding pointer up or cancel event has not been
    /// received yet.
    pub fn has_active_pointers(&self) -> bool {
        self.slots.iter().any(|x| x.is_some())
    }

    /// Number of active pointers.
    pub fn num_active_pointers(&self) -> usize {
        self.slots.iter().filter(|x| x.is_some()).count()
    }

    /// Axis lock of the current session.
    pub fn axis_lock(&self) -> AxisLock {
        self.session
            .as_ref()
            .map_or(AxisLock::None, |session| session.axis_lock)
    }

    /// Pinch baseline of the current session, if a pinch is in progress.
    pub fn pinch_baseline(&self) -> Option<&PinchBaseline> {
        self.session.as_ref().and_then(|session| session.pinch.as_ref())
    }

    /// Drops all the pointers and the gesture session.
    pub fn reset(&mut self) {
        self.slots = Default::default();
        self.session = None;
    }

    fn drag(&mut self, position: Point) -> PointerGesture {
        let lock_threshold = self.thresholds.lock;
        let Some(session) = self.session.as_mut() else {
            return PointerGesture::None;
        };
        if session.suppressed {
            return PointerGesture::None;
        }
        let delta = position - session.start;
        match session.mode {
            Mode::Pan => {
                if delta.max_abs() >= lock_threshold {
                    session.moved = true;
                }
                PointerGesture::Pan {
                    dx: delta.x,
                    dy: delta.y,
                }
            }
            Mode::Swipe => {
                if session.axis_lock == AxisLock::None {
                    if delta.max_abs() < lock_threshold {
                        return PointerGesture::None;
                    }
                    session.moved = true;
                    session.axis_lock = if delta.x.abs() >= delta.y.abs() {
                        AxisLock::Horizontal
                    } else {
                        AxisLock::Vertical
                    };
                }
                session.offset = match session.axis_lock {
                    AxisLock::Horizontal => Point::new(delta.x, 0.0),
                    _ => Point::new(0.0, delta.y),
                };
                PointerGesture::Swipe {
                    dx: session.offset.x,
                    dy: session.offset.y,
                }
            }
        }
    }

    fn pinch(&mut self, view: &ViewState) -> PointerGesture {
        let [Some(a), Some(b)] = self.slots else {
            return PointerGesture::None;
        };
        let is_pinch = |x: &PointerInput| x.kind == PointerKind::Touch && x.on_target;
        if !(is_pinch(&a) && is_pinch(&b)) {
            return PointerGesture::None;
        }
        let Some(session) = self.session.as_mut() else {
            return PointerGesture::None;
        };
        let distance = a.position.distance(b.position);
        let center = a.position.midpoint(b.position);
        if distance < MIN_PINCH_DISTANCE {
            return PointerGesture::None;
        }
        match session.pinch.as_mut() {
            None => {
                session.suppressed = true;
                session.pinch = Some(PinchBaseline {
                    distance,
                    center,
                    zoom_at_start: view.zoom,
                    pan_at_start: view.pan,
                    previous_distance: distance,
                });
                PointerGesture::PinchStart { center }
            }
            Some(baseline) => {
                let scale = distance / baseline.previous_distance;
                baseline.previous_distance = distance;
                PointerGesture::Pinch { scale, center }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn input(id: i32, kind: PointerKind, x: f64, y: f64) -> PointerInput {
        PointerInput {
            id,
            kind,
            position: Point::new(x, y),
            on_target: true,
            time_ms: 0.0,
        }
    }

    fn touch(id: i32, x: f64, y: f64) -> PointerInput {
        input(id, PointerKind::Touch, x, y)
    }

    fn mouse(x: f64, y: f64) -> PointerInput {
        input(1, PointerKind::Mouse, x, y)
    }

    fn tracker() -> PointerTracker {
        PointerTracker::new(&Config::default())
    }

    fn zoomed() -> ViewState {
        ViewState {
            zoom: 2.0,
            ..ViewState::default()
        }
    }

    #[test]
    fn swipe_waits_for_lock_threshold() {
        let view = ViewState::default();
        let mut tracker = tracker();
        tracker.on_pointer_down(mouse(200.0, 300.0), &view);
        assert_eq!(
            tracker.on_pointer_move(mouse(195.0, 303.0), &view),
            PointerGesture::None
        );
        assert_eq!(tracker.axis_lock(), AxisLock::None);
        assert_eq!(
            tracker.on_pointer_move(mouse(188.0, 305.0), &view),
            PointerGesture::Swipe { dx: -12.0, dy: 0.0 }
        );
        assert_eq!(tracker.axis_lock(), AxisLock::Horizontal);
    }

    #[test]
    fn axis_lock_is_irreversible() {
        let view = ViewState::default();
        let mut tracker = tracker();
        tracker.on_pointer_down(mouse(200.0, 300.0), &view);
        tracker.on_pointer_move(mouse(202.0, 315.0), &view);
        assert_eq!(tracker.axis_lock(), AxisLock::Vertical);
        for (x, y) in [(400.0, 310.0), (-300.0, 300.0), (200.0, 200.0), (900.0, 900.0)] {
            let gesture = tracker.on_pointer_move(mouse(x, y), &view);
            assert_eq!(tracker.axis_lock(), AxisLock::Vertical);
            assert_eq!(
                gesture,
                PointerGesture::Swipe {
                    dx: 0.0,
                    dy: y - 300.0
                }
            );
        }
        tracker.on_pointer_up(mouse(900.0, 900.0));
        assert_eq!(tracker.axis_lock(), AxisLock::None);
    }

    #[test]
    fn swipe_resolution() {
        let view = ViewState::default();
        let mut tracker = tracker();
        tracker.on_pointer_down(mouse(200.0, 300.0), &view);
        tracker.on_pointer_move(mouse(80.0, 300.0), &view);
        assert_eq!(
            tracker.on_pointer_up(mouse(80.0, 300.0)),
            PointerGesture::Release(Release::Navigate(Direction::Next))
        );

        tracker.on_pointer_down(mouse(200.0, 300.0), &view);
        tracker.on_pointer_move(mouse(250.0, 300.0), &view);
        assert_eq!(
            tracker.on_pointer_up(mouse(250.0, 300.0)),
            PointerGesture::Release(Release::SnapBack)
        );

        tracker.on_pointer_down(mouse(200.0, 300.0), &view);
        tracker.on_pointer_move(mouse(200.0, 440.0), &view);
        assert_eq!(
            tracker.on_pointer_up(mouse(200.0, 440.0)),
            PointerGesture::Release(Release::Close)
        );
    }

    #[test]
    fn cancel_cleans_up_without_commit() {
        let view = ViewState::default();
        let mut tracker = tracker();
        tracker.on_pointer_down(mouse(200.0, 300.0), &view);
        tracker.on_pointer_move(mouse(0.0, 300.0), &view);
        assert_eq!(
            tracker.on_pointer_cancel(mouse(0.0, 300.0)),
            PointerGesture::Release(Release::SnapBack)
        );
        assert!(!tracker.has_active_pointers());
    }

    #[test]
    fn pan_when_zoomed() {
        let view = zoomed();
        let mut tracker = tracker();
        tracker.on_pointer_down(touch(1, 100.0, 100.0), &view);
        assert_eq!(
            tracker.on_pointer_move(touch(1, 103.0, 130.0), &view),
            PointerGesture::Pan { dx: 3.0, dy: 30.0 }
        );
        assert_eq!(tracker.axis_lock(), AxisLock::None);
        assert_eq!(
            tracker.on_pointer_up(touch(1, 103.0, 130.0)),
            PointerGesture::Release(Release::Settle)
        );
    }

    #[test]
    fn pinch_seeds_then_steps() {
        let view = ViewState::default();
        let mut tracker = tracker();
        tracker.on_pointer_down(touch(1, 100.0, 300.0), &view);
        tracker.on_pointer_down(touch(2, 200.0, 300.0), &view);
        assert_eq!(
            tracker.on_pointer_move(touch(2, 220.0, 300.0), &view),
            PointerGesture::PinchStart {
                center: Point::new(160.0, 300.0)
            }
        );
        let baseline = *tracker.pinch_baseline().unwrap();
        assert_eq!(baseline.distance, 120.0);
        assert_eq!(baseline.zoom_at_start, 1.0);
        // Interleaved moves use the latest position of the other finger.
        assert_eq!(
            tracker.on_pointer_move(touch(1, 40.0, 300.0), &view),
            PointerGesture::Pinch {
                scale: 1.5,
                center: Point::new(130.0, 300.0)
            }
        );
        assert_eq!(
            tracker.on_pointer_move(touch(2, 400.0, 300.0), &view),
            PointerGesture::Pinch {
                scale: 2.0,
                center: Point::new(220.0, 300.0)
            }
        );
    }

    #[test]
    fn mouse_and_off_target_do_not_pinch() {
        let view = ViewState::default();
        let mut tracker = tracker();
        tracker.on_pointer_down(touch(1, 100.0, 300.0), &view);
        tracker.on_pointer_down(
            PointerInput {
                on_target: false,
                ..touch(2, 200.0, 300.0)
            },
            &view,
        );
        assert_eq!(
            tracker.on_pointer_move(touch(1, 90.0, 300.0), &view),
            PointerGesture::None
        );
        assert!(tracker.pinch_baseline().is_none());
    }

    #[test]
    fn lifting_one_finger_suppresses_drag() {
        let view = ViewState::default();
        let mut tracker = tracker();
        tracker.on_pointer_down(touch(1, 100.0, 300.0), &view);
        tracker.on_pointer_down(touch(2, 200.0, 300.0), &view);
        tracker.on_pointer_move(touch(2, 210.0, 300.0), &view);
        assert_eq!(tracker.on_pointer_up(touch(2, 210.0, 300.0)), PointerGesture::None);
        assert!(tracker.pinch_baseline().is_none());
        assert_eq!(
            tracker.on_pointer_move(touch(1, 0.0, 300.0), &view),
            PointerGesture::None
        );
        assert_eq!(
            tracker.on_pointer_up(touch(1, 0.0, 300.0)),
            PointerGesture::Release(Release::Settle)
        );
    }

    #[test]
    fn pinch_reseeds_after_finger_returns() {
        let view = ViewState::default();
        let mut tracker = tracker();
        tracker.on_pointer_down(touch(1, 100.0, 300.0), &view);
        tracker.on_pointer_down(touch(2, 200.0, 300.0), &view);
        tracker.on_pointer_move(touch(2, 210.0, 300.0), &view);
        tracker.on_pointer_up(touch(2, 210.0, 300.0));
        tracker.on_pointer_down(touch(3, 300.0, 300.0), &view);
        assert_eq!(
            tracker.on_pointer_move(touch(3, 310.0, 300.0), &view),
            PointerGesture::PinchStart {
                center: Point::new(205.0, 300.0)
            }
        );
    }

    #[test]
    fn third_pointer_cancels() {
        let view = ViewState::default();
        let mut tracker = tracker();
        tracker.on_pointer_down(touch(1, 100.0, 300.0), &view);
        tracker.on_pointer_down(touch(2, 200.0, 300.0), &view);
        assert_eq!(
            tracker.on_pointer_down(touch(3, 300.0, 300.0), &view),
            PointerGesture::Cancelled
        );
        assert!(!tracker.has_active_pointers());
        // The remaining fingers are no longer tracked.
        assert_eq!(tracker.on_pointer_up(touch(1, 100.0, 300.0)), PointerGesture::None);
    }

    #[test]
    fn untracked_up_resets_session() {
        let view = ViewState::default();
        let mut tracker = tracker();
        tracker.on_pointer_down(touch(1, 100.0, 300.0), &view);
        assert_eq!(
            tracker.on_pointer_up(touch(9, 100.0, 300.0)),
            PointerGesture::Cancelled
        );
        assert!(!tracker.has_active_pointers());
    }

    #[test]
    fn double_tap() {
        let view = ViewState::default();
        let mut tracker = tracker();
        let tap = |time_ms: f64, x: f64| PointerInput {
            time_ms,
            ..touch(1, x, 300.0)
        };
        tracker.on_pointer_down(tap(0.0, 100.0), &view);
        assert_eq!(
            tracker.on_pointer_up(tap(50.0, 100.0)),
            PointerGesture::Release(Release::Settle)
        );
        tracker.on_pointer_down(tap(200.0, 105.0), &view);
        assert_eq!(
            tracker.on_pointer_up(tap(250.0, 105.0)),
            PointerGesture::Release(Release::DoubleTap(Point::new(105.0, 300.0)))
        );
        // A slow second tap is a new first tap.
        tracker.on_pointer_down(tap(1000.0, 105.0), &view);
        tracker.on_pointer_up(tap(1010.0, 105.0));
        tracker.on_pointer_down(tap(2000.0, 105.0), &view);
        assert_eq!(
            tracker.on_pointer_up(tap(2010.0, 105.0)),
            PointerGesture::Release(Release::Settle)
        );
    }
}
