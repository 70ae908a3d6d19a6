//! View transform.
//!
//! This module owns the numeric state of the image view (pan, zoom, swipe
//! offset and the animation-only fields) and the operations that update it.
//!
//! Operations applied during a gesture never clamp. Zoom and pan are brought
//! back into their limits by [`Transform::regulate`], which is called once
//! the gesture has ended.

use crate::geometry::{clamp, Mapping, Point, Size, Viewport};

/// Minimum zoom scale. At this scale the image fits the viewport.
pub const MIN_ZOOM: f64 = 1.0;

/// Visual state of an open lightbox.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewState {
    /// Translation of the zoomed image relative to the view center.
    pub pan: Point,
    /// Zoom scale.
    pub zoom: f64,
    /// Offset of an uncommitted swipe or drag-to-close.
    pub swipe_offset: Point,
    /// Content scale of the exit animation.
    pub exit_scale: f64,
    /// Backdrop opacity, in `[0, 1]`.
    pub backdrop_opacity: f64,
    /// Content opacity, in `[0, 1]`.
    pub content_opacity: f64,
}

impl Default for ViewState {
    fn default() -> ViewState {
        ViewState {
            pan: Point::ZERO,
            zoom: MIN_ZOOM,
            swipe_offset: Point::ZERO,
            exit_scale: 1.0,
            backdrop_opacity: 1.0,
            content_opacity: 1.0,
        }
    }
}

impl ViewState {
    /// Returns `true` if zoom and pan have their default values.
    pub fn is_default_view(&self) -> bool {
        self.zoom == MIN_ZOOM && self.pan == Point::ZERO
    }
}

/// View transform state machine.
#[derive(Debug, Clone)]
pub struct Transform {
    view: ViewState,
    max_zoom: f64,
    viewport: Option<Viewport>,
    image: Option<Size>,
    pan_origin: Point,
    // Pan for the clamped zoom, captured when a zoom excursion first crossed
    // the limit.
    pending_pan: Option<Point>,
}

impl Transform {
    /// Creates a new transform with the given maximum zoom.
    pub fn new(max_zoom: f64) -> Transform {
        Transform {
            view: ViewState::default(),
            max_zoom: max_zoom.max(MIN_ZOOM),
            viewport: None,
            image: None,
            pan_origin: Point::ZERO,
            pending_pan: None,
        }
    }

    /// Current view state.
    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Mutable access to the view state.
    ///
    /// This is used for the fields that are not governed by the transform
    /// (swipe offset and animation fields).
    pub fn view_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }

    /// Maximum zoom.
    pub fn max_zoom(&self) -> f64 {
        self.max_zoom
    }

    /// Viewport, if it has been measured.
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// Sets the viewport geometry.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if viewport.size.is_measured() && viewport.center.is_finite() {
            self.viewport = Some(viewport);
        } else {
            log::debug!("ignoring unmeasured viewport {viewport:?}");
        }
    }

    /// Sets the on-screen size of the current image at zoom 1.
    pub fn set_image_size(&mut self, size: Size) {
        if size.is_measured() {
            self.image = Some(size);
        } else {
            log::debug!("ignoring unmeasured image size {size:?}");
            self.image = None;
        }
    }

    /// Forgets the image size, for instance when the slide changes.
    pub fn clear_image_size(&mut self) {
        self.image = None;
    }

    /// Resets zoom and pan to their defaults.
    pub fn reset_view(&mut self) {
        self.view.zoom = MIN_ZOOM;
        self.view.pan = Point::ZERO;
        self.pan_origin = Point::ZERO;
        self.pending_pan = None;
    }

    /// Resets the whole view state to its defaults.
    pub fn reset(&mut self) {
        self.view = ViewState::default();
        self.pan_origin = Point::ZERO;
        self.pending_pan = None;
    }

    /// Records the current pan as the origin of a pan drag.
    pub fn begin_pan(&mut self) {
        self.pan_origin = self.view.pan;
    }

    /// Sets the pan to the drag origin displaced by `(dx, dy)`.
    pub fn apply_pan_delta(&mut self, dx: f64, dy: f64) {
        let pan = self.pan_origin + Point::new(dx, dy);
        self.shift_pending_pan(pan - self.view.pan);
        self.view.pan = pan;
    }

    /// Displaces the pan by `(dx, dy)`.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let delta = Point::new(dx, dy);
        self.shift_pending_pan(delta);
        self.view.pan = self.view.pan + delta;
    }

    // A pan made while over the zoom limit also moves the pan that the limit
    // will be settled on.
    fn shift_pending_pan(&mut self, delta: Point) {
        if let Some(pending) = self.pending_pan.as_mut() {
            *pending = *pending + delta;
        }
    }

    /// Applies an incremental zoom step anchored at `center`.
    ///
    /// The zoom is multiplied by `scale`, and the pan is recomputed so that the
    /// image point that was under `center` before the step stays under it.
    /// Returns `false` if the step was skipped.
    pub fn apply_pinch_step(&mut self, scale: f64, center: Point) -> bool {
        let Some(viewport) = self.viewport else {
            log::debug!("zoom step skipped: viewport not measured");
            return false;
        };
        if !(scale.is_finite() && scale > 0.0 && center.is_finite()) {
            return false;
        }
        let mapping = Mapping {
            center: viewport.center,
            pan: self.view.pan,
            zoom: self.view.zoom,
        };
        let anchor = mapping.to_local(center);
        let zoom = (self.view.zoom * scale).max(MIN_ZOOM);
        self.view.pan = Mapping::anchored_pan(viewport.center, center, anchor, zoom);
        self.view.zoom = zoom;
        if zoom > self.max_zoom {
            if self.pending_pan.is_none() {
                self.pending_pan = Some(Mapping::anchored_pan(
                    viewport.center,
                    center,
                    anchor,
                    self.max_zoom,
                ));
            }
        } else {
            self.pending_pan = None;
        }
        true
    }

    /// Applies a ctrl+wheel zoom step anchored at `position`.
    ///
    /// The zoom factor is `exp(-delta_y * sensitivity)`.
    pub fn apply_wheel_zoom(&mut self, delta_y: f64, sensitivity: f64, position: Point) -> bool {
        self.apply_pinch_step((-delta_y * sensitivity).exp(), position)
    }

    /// Maximum absolute pan in each axis at the current zoom.
    ///
    /// Returns `None` if the viewport or the image have not been measured.
    pub fn max_pan(&self) -> Option<Point> {
        let viewport = self.viewport?;
        let image = self.image?;
        let zoom = self.view.zoom;
        Some(Point::new(
            (image.width * zoom - viewport.size.width).max(0.0) / 2.0,
            (image.height * zoom - viewport.size.height).max(0.0) / 2.0,
        ))
    }

    /// Brings zoom and pan back into their limits.
    pub fn regulate(&mut self) {
        let zoom = self.view.zoom;
        let clamped = if zoom.is_finite() {
            clamp(zoom, MIN_ZOOM, self.max_zoom)
        } else {
            MIN_ZOOM
        };
        if clamped != zoom {
            self.view.pan = match self.pending_pan {
                Some(pan) => pan,
                // Keep the point under the view center.
                None => self.view.pan * (clamped / zoom),
            };
            self.view.zoom = clamped;
        }
        self.pending_pan = None;
        if self.view.zoom <= MIN_ZOOM || !self.view.pan.is_finite() {
            self.view.pan = Point::ZERO;
            return;
        }
        match self.max_pan() {
            Some(bound) => {
                self.view.pan = Point::new(
                    clamp(self.view.pan.x, -bound.x, bound.x),
                    clamp(self.view.pan.y, -bound.y, bound.y),
                );
            }
            None => log::debug!("pan bounds unavailable; pan left unclamped"),
        }
    }

    /// Zooms to `target` anchored at `point`, then regulates.
    pub fn zoom_to(&mut self, target: f64, point: Point) -> bool {
        let Some(viewport) = self.viewport else {
            log::debug!("zoom skipped: viewport not measured");
            return false;
        };
        if !point.is_finite() {
            return false;
        }
        let target = clamp(target, MIN_ZOOM, self.max_zoom);
        let mapping = Mapping {
            center: viewport.center,
            pan: self.view.pan,
            zoom: self.view.zoom,
        };
        let anchor = mapping.to_local(point);
        self.view.pan = Mapping::anchored_pan(viewport.center, point, anchor, target);
        self.view.zoom = target;
        self.pending_pan = None;
        self.regulate();
        true
    }

    /// Toggles between minimum and maximum zoom, anchored at `point`.
    pub fn zoom_at(&mut self, point: Point) -> bool {
        let target = if self.view.zoom > MIN_ZOOM {
            MIN_ZOOM
        } else {
            self.max_zoom
        };
        self.zoom_to(target, point)
    }

    /// Toggles between minimum and maximum zoom, anchored at the view center.
    pub fn toggle_zoom(&mut self) -> bool {
        match self.viewport {
            Some(viewport) => self.zoom_at(viewport.center),
            None => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn measured(max_zoom: f64) -> Transform {
        let mut transform = Transform::new(max_zoom);
        transform.set_viewport(Viewport {
            center: Point::new(400.0, 300.0),
            size: Size::new(800.0, 600.0),
        });
        transform.set_image_size(Size::new(800.0, 450.0));
        transform
    }

    fn assert_close(a: Point, b: Point) {
        assert!(
            (a.x - b.x).abs() < TOLERANCE && (a.y - b.y).abs() < TOLERANCE,
            "{a:?} != {b:?}"
        );
    }

    // Small deterministic generator for operation sequences.
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self) -> f64 {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (self.0 >> 11) as f64 / (1u64 << 53) as f64
        }
    }

    #[test]
    fn pinch_step_preserves_anchor() {
        let mut transform = measured(4.0);
        transform.apply_pinch_step(1.7, Point::new(250.0, 180.0));
        let view = *transform.view();
        let center = Point::new(310.0, 220.0);
        let before = Mapping {
            center: Point::new(400.0, 300.0),
            pan: view.pan,
            zoom: view.zoom,
        };
        let anchor = before.to_local(center);
        assert!(transform.apply_pinch_step(1.3, center));
        let after = Mapping {
            center: Point::new(400.0, 300.0),
            pan: transform.view().pan,
            zoom: transform.view().zoom,
        };
        assert!((after.zoom - view.zoom * 1.3).abs() < TOLERANCE);
        assert_close(after.to_screen(anchor), center);
    }

    #[test]
    fn regulate_clamps_sequences() {
        let mut rng = Lcg(7);
        for _ in 0..200 {
            let mut transform = measured(4.0);
            for _ in 0..12 {
                let center = Point::new(800.0 * rng.next(), 600.0 * rng.next());
                match (rng.next() * 3.0) as u32 {
                    0 => {
                        transform.apply_pinch_step(0.3 + 2.5 * rng.next(), center);
                    }
                    1 => {
                        transform.apply_wheel_zoom(400.0 * rng.next() - 200.0, 0.01, center);
                    }
                    _ => {
                        transform.begin_pan();
                        transform.apply_pan_delta(
                            2000.0 * rng.next() - 1000.0,
                            2000.0 * rng.next() - 1000.0,
                        );
                    }
                }
            }
            transform.regulate();
            let view = *transform.view();
            assert!((MIN_ZOOM..=4.0).contains(&view.zoom), "zoom {}", view.zoom);
            if view.zoom <= MIN_ZOOM {
                assert_eq!(view.pan, Point::ZERO);
            } else {
                let bound = transform.max_pan().unwrap();
                assert!(view.pan.x.abs() <= bound.x + TOLERANCE);
                assert!(view.pan.y.abs() <= bound.y + TOLERANCE);
            }
        }
    }

    #[test]
    fn over_zoom_uses_pending_pan() {
        let mut transform = measured(4.0);
        let viewport_center = Point::new(400.0, 300.0);
        transform.apply_pinch_step(3.0, Point::new(380.0, 290.0));
        // This step crosses the maximum.
        let center = Point::new(420.0, 310.0);
        let view = *transform.view();
        let anchor = Mapping {
            center: viewport_center,
            pan: view.pan,
            zoom: view.zoom,
        }
        .to_local(center);
        transform.apply_pinch_step(1.5, center);
        let expected = Mapping::anchored_pan(viewport_center, center, anchor, 4.0);
        // Further excursion with a moving center.
        transform.apply_pinch_step(6.0 / 4.5, Point::new(470.0, 330.0));
        assert!((transform.view().zoom - 6.0).abs() < TOLERANCE);
        transform.regulate();
        assert_eq!(transform.view().zoom, 4.0);
        assert_close(transform.view().pan, expected);
    }

    #[test]
    fn pending_pan_cleared_on_return() {
        let mut transform = measured(4.0);
        transform.apply_pinch_step(5.0, Point::new(300.0, 300.0));
        transform.apply_pinch_step(0.7, Point::new(300.0, 300.0));
        let pan = transform.view().pan;
        transform.regulate();
        // 3.5 is inside the limits, so only the bounds apply.
        assert!((transform.view().zoom - 3.5).abs() < TOLERANCE);
        assert_close(transform.view().pan, pan);
    }

    #[test]
    fn zoom_never_below_minimum() {
        let mut transform = measured(4.0);
        transform.apply_pinch_step(0.2, Point::new(100.0, 100.0));
        assert_eq!(transform.view().zoom, MIN_ZOOM);
        transform.regulate();
        assert_eq!(transform.view().pan, Point::ZERO);
    }

    #[test]
    fn over_pan_clamped_on_regulate() {
        let mut transform = measured(4.0);
        transform.zoom_to(2.0, Point::new(400.0, 300.0));
        transform.begin_pan();
        transform.apply_pan_delta(5000.0, -5000.0);
        assert_eq!(transform.view().pan, Point::new(5000.0, -5000.0));
        transform.regulate();
        // Image is 1600x900 at zoom 2 in an 800x600 viewport.
        assert_eq!(transform.view().pan, Point::new(400.0, -150.0));
    }

    #[test]
    fn regulate_without_image_keeps_pan() {
        let mut transform = Transform::new(4.0);
        transform.set_viewport(Viewport {
            center: Point::new(400.0, 300.0),
            size: Size::new(800.0, 600.0),
        });
        transform.zoom_to(2.0, Point::new(400.0, 300.0));
        transform.pan_by(900.0, 0.0);
        transform.regulate();
        assert_eq!(transform.view().pan, Point::new(900.0, 0.0));
    }

    #[test]
    fn pan_during_over_zoom_moves_pending_pan() {
        let mut transform = measured(4.0);
        transform.apply_wheel_zoom(-300.0, 0.01, Point::new(400.0, 300.0));
        assert!(transform.view().zoom > 4.0);
        transform.begin_pan();
        transform.apply_pan_delta(150.0, 0.0);
        transform.apply_pan_delta(300.0, -20.0);
        transform.pan_by(0.0, 10.0);
        transform.regulate();
        assert_eq!(transform.view().zoom, 4.0);
        assert_close(transform.view().pan, Point::new(300.0, -10.0));
    }

    #[test]
    fn wheel_zoom_is_exponential() {
        let mut transform = measured(4.0);
        transform.apply_wheel_zoom(-100.0, 0.01, Point::new(400.0, 300.0));
        assert!((transform.view().zoom - 1.0_f64.exp()).abs() < TOLERANCE);
        // Anchored at the view center, the pan does not move.
        assert_close(transform.view().pan, Point::ZERO);
    }

    #[test]
    fn toggle_zoom_round_trip() {
        let mut transform = measured(4.0);
        assert!(transform.zoom_at(Point::new(500.0, 350.0)));
        assert_eq!(transform.view().zoom, 4.0);
        // Point (500, 350) stays in place: pan = (S - C)(1 - z).
        assert_close(transform.view().pan, Point::new(-300.0, -150.0));
        assert!(transform.toggle_zoom());
        assert_eq!(transform.view().zoom, MIN_ZOOM);
        assert_eq!(transform.view().pan, Point::ZERO);
    }

    #[test]
    fn steps_skipped_without_viewport() {
        let mut transform = Transform::new(4.0);
        assert!(!transform.apply_pinch_step(2.0, Point::new(10.0, 10.0)));
        assert!(!transform.toggle_zoom());
        assert_eq!(*transform.view(), ViewState::default());
    }
}
