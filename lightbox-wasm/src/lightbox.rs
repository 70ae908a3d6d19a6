//! Lightbox engine.
//!
//! The [`Lightbox`] ties together the pointer tracker, the view transform, the
//! navigation and lifecycle controllers and the render scheduler. It is driven
//! by input events and by the callbacks of its [`Host`] (animation frames,
//! timers and transition ends), and it pushes [`Frame`]'s to the host.

use crate::error::{validate_config, LightboxError};
use crate::geometry::{Point, Size, Viewport};
use crate::host::{Host, Timer};
use crate::lifecycle::{self, Lifecycle};
use crate::navigation::{self, Navigator};
use crate::pointer::{PointerGesture, PointerInput, PointerTracker, Release};
use crate::render::RenderScheduler;
use crate::transform::{Transform, ViewState, MIN_ZOOM};
use lightbox_json::{Animation, Config, Direction, Frame, Slide};

/// Wheel event sample.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WheelInput {
    /// Wheel deltas in pixels.
    pub delta: Point,
    /// Cursor position in client coordinates.
    pub position: Point,
    /// Whether the ctrl key was held. Trackpad pinches are reported by
    /// browsers as ctrl+wheel events.
    pub ctrl_key: bool,
}

/// Element whose CSS transition has ended.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TransitionTarget {
    /// The zoomed image (zoom and pan).
    View,
    /// The slide track.
    Track,
}

/// Lightbox engine.
pub struct Lightbox<H: Host> {
    config: Config,
    slides: Vec<Slide>,
    current_index: usize,
    host: H,
    transform: Transform,
    pointers: PointerTracker,
    scheduler: RenderScheduler,
    navigator: Navigator,
    lifecycle: Lifecycle,
    animation: Animation,
    sliding: Option<Direction>,
}

impl<H: Host> Lightbox<H> {
    /// Creates a closed lightbox over `slides`.
    pub fn new(config: Config, slides: Vec<Slide>, host: H) -> Result<Lightbox<H>, LightboxError> {
        validate_config(&config)?;
        Ok(Lightbox {
            transform: Transform::new(config.max_zoom),
            pointers: PointerTracker::new(&config),
            config,
            slides,
            current_index: 0,
            host,
            scheduler: RenderScheduler::new(),
            navigator: Navigator::new(),
            lifecycle: Lifecycle::new(),
            animation: Animation::None,
            sliding: None,
        })
    }

    /// Host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Index of the current slide.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Current view state.
    pub fn view(&self) -> &ViewState {
        self.transform.view()
    }

    /// Lifecycle phase.
    pub fn phase(&self) -> lifecycle::Phase {
        self.lifecycle.phase()
    }

    /// Navigation phase.
    pub fn navigation_phase(&self) -> navigation::Phase {
        self.navigator.phase()
    }

    /// Returns `true` if open and interactive.
    pub fn is_open(&self) -> bool {
        self.lifecycle.is_open()
    }

    /// Builds the frame for the current state.
    pub fn frame(&self) -> Frame {
        let view = self.transform.view();
        Frame {
            open: self.lifecycle.is_visible(),
            current_index: self.current_index,
            pan_x: view.pan.x,
            pan_y: view.pan.y,
            zoom: view.zoom,
            swipe_offset_x: view.swipe_offset.x,
            swipe_offset_y: view.swipe_offset.y,
            exit_scale: view.exit_scale,
            backdrop_opacity: view.backdrop_opacity,
            content_opacity: view.content_opacity,
            sliding: self.sliding,
            animation: self.animation,
        }
    }

    fn schedule(&mut self) {
        self.scheduler.schedule_flush(&mut self.host);
    }

    /// Animation frame callback.
    ///
    /// Draws the current state if anything changed since the last frame.
    pub fn on_frame(&mut self) {
        if self.scheduler.begin_flush() {
            let frame = self.frame();
            self.host.present(&frame);
        }
    }

    /// Sets the viewport geometry.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.transform.set_viewport(viewport);
        self.regulate_if_idle();
    }

    /// Sets the on-screen size at zoom 1 of the current slide's image.
    pub fn set_image_size(&mut self, size: Size) {
        self.transform.set_image_size(size);
        self.regulate_if_idle();
    }

    fn regulate_if_idle(&mut self) {
        if self.lifecycle.is_open() && !self.pointers.has_active_pointers() {
            self.transform.regulate();
            self.schedule();
        }
    }

    /// Opens the lightbox at slide `index`.
    ///
    /// Fails without changing anything if `index` is out of range.
    pub fn open(&mut self, index: usize) -> Result<(), LightboxError> {
        if let Err(e) = self.lifecycle.open(index, self.slides.len()) {
            log::warn!("refusing to open lightbox: {e}");
            return Err(e);
        }
        for timer in Timer::ALL {
            self.host.clear_timer(timer);
        }
        self.pointers.reset();
        self.navigator.cancel();
        self.transform.reset();
        if index != self.current_index {
            self.transform.clear_image_size();
        }
        self.current_index = index;
        self.sliding = None;
        self.animation = Animation::None;
        self.lifecycle.set_scroll_lock(&mut self.host, true);
        log::debug!("lightbox opened at slide {index}");
        self.schedule();
        Ok(())
    }

    /// Closes the lightbox.
    ///
    /// Starts the exit animation. The lightbox finishes closing when the
    /// [`Timer::CloseFade`] timer fires. Does nothing unless open, so calling
    /// it again during the exit animation is harmless.
    pub fn close(&mut self) {
        if !self.lifecycle.begin_close() {
            return;
        }
        for timer in [Timer::WheelEnd, Timer::ResetFallback, Timer::SlideFallback] {
            self.host.clear_timer(timer);
        }
        self.pointers.reset();
        self.navigator.cancel();
        self.sliding = None;
        // Leave upwards if dragged upwards, downwards otherwise.
        let direction = if self.transform.view().swipe_offset.y < 0.0 {
            -1.0
        } else {
            1.0
        };
        let height = self.transform.viewport().map(|viewport| viewport.size.height);
        self.transform.reset_view();
        let exit_scale = self.config.exit_scale;
        let view = self.transform.view_mut();
        view.swipe_offset = match height {
            Some(height) => Point::new(0.0, direction * height),
            None => Point::new(0.0, view.swipe_offset.y),
        };
        view.exit_scale = exit_scale;
        view.backdrop_opacity = 0.0;
        view.content_opacity = 0.0;
        self.animation = Animation::Exit;
        self.host.set_timer(Timer::CloseFade, self.config.close_fade_ms);
        self.schedule();
    }

    fn finish_close(&mut self) {
        if !self.lifecycle.finish_close() {
            return;
        }
        self.transform.reset();
        self.sliding = None;
        self.animation = Animation::None;
        self.lifecycle.set_scroll_lock(&mut self.host, false);
        log::debug!("lightbox closed");
        self.schedule();
        self.host.closed();
    }

    /// Navigates to the previous or next slide.
    ///
    /// This is the entry point for buttons, keys and swipes alike.
    pub fn navigate(&mut self, direction: Direction) {
        if !self.lifecycle.is_open() {
            log::debug!("ignoring navigation while not open");
            return;
        }
        self.host.clear_timer(Timer::WheelEnd);
        self.pointers.reset();
        self.transform.view_mut().swipe_offset = Point::ZERO;
        let step = self
            .navigator
            .request(direction, self.transform.view().is_default_view());
        self.run_navigation(step);
    }

    fn run_navigation(&mut self, step: navigation::Step) {
        match step {
            navigation::Step::None | navigation::Step::Queued => (),
            navigation::Step::ResetView => {
                self.transform.reset_view();
                self.animation = Animation::ViewReset;
                self.host.set_timer(
                    Timer::ResetFallback,
                    self.config.view_reset_ms + self.config.transition_grace_ms,
                );
            }
            navigation::Step::Slide(direction) => {
                self.sliding = Some(direction);
                self.animation = Animation::Slide;
                self.host.set_timer(
                    Timer::SlideFallback,
                    self.config.slide_ms + self.config.transition_grace_ms,
                );
            }
            navigation::Step::Commit(direction) => {
                self.host.clear_timer(Timer::SlideFallback);
                let index = direction.apply(self.current_index, self.slides.len());
                if index != self.current_index {
                    self.transform.clear_image_size();
                }
                self.current_index = index;
                self.transform.view_mut().swipe_offset = Point::ZERO;
                self.sliding = None;
                self.animation = Animation::None;
                log::debug!("committed slide {}", self.current_index);
                let next = self
                    .navigator
                    .next_queued(self.transform.view().is_default_view());
                self.run_navigation(next);
            }
        }
        self.schedule();
    }

    /// Transition end callback.
    pub fn on_transition_end(&mut self, target: TransitionTarget) {
        match target {
            TransitionTarget::View => {
                let step = self.navigator.reset_settled();
                if step != navigation::Step::None {
                    self.host.clear_timer(Timer::ResetFallback);
                    self.run_navigation(step);
                }
            }
            TransitionTarget::Track => {
                let step = self.navigator.slide_settled();
                self.run_navigation(step);
            }
        }
    }

    /// Timer callback.
    pub fn on_timer(&mut self, timer: Timer) {
        match timer {
            Timer::WheelEnd => {
                if self.accepts_gestures() && !self.pointers.has_active_pointers() {
                    self.transform.regulate();
                    self.animation = Animation::Settle;
                    self.schedule();
                }
            }
            Timer::ResetFallback => {
                let step = self.navigator.reset_settled();
                if step != navigation::Step::None {
                    log::warn!("view reset transition end not received; continuing navigation");
                    self.run_navigation(step);
                }
            }
            Timer::SlideFallback => {
                let step = self.navigator.slide_settled();
                if step != navigation::Step::None {
                    log::warn!("slide transition end not received; committing navigation");
                    self.run_navigation(step);
                }
            }
            Timer::CloseFade => self.finish_close(),
        }
    }

    fn accepts_gestures(&self) -> bool {
        self.lifecycle.is_open() && !self.navigator.is_busy()
    }

    /// Pointer down handler.
    pub fn on_pointer_down(&mut self, event: PointerInput) {
        if !self.accepts_gestures() {
            return;
        }
        let active_before = self.pointers.num_active_pointers();
        let gesture = self.pointers.on_pointer_down(event, self.transform.view());
        if gesture == PointerGesture::Cancelled {
            self.cancel_gesture();
            return;
        }
        // A repeated down of a tracked pointer must not move the pan origin.
        if active_before == 0 && self.pointers.num_active_pointers() == 1 {
            self.transform.begin_pan();
            self.animation = Animation::None;
        }
    }

    /// Pointer move handler.
    pub fn on_pointer_move(&mut self, event: PointerInput) {
        if !self.lifecycle.is_open() {
            return;
        }
        let gesture = self.pointers.on_pointer_move(event, self.transform.view());
        self.apply_gesture(gesture);
    }

    /// Pointer up handler.
    pub fn on_pointer_up(&mut self, event: PointerInput) {
        if !self.lifecycle.is_open() {
            return;
        }
        let gesture = self.pointers.on_pointer_up(event);
        self.apply_gesture(gesture);
    }

    /// Pointer cancel handler.
    pub fn on_pointer_cancel(&mut self, event: PointerInput) {
        if !self.lifecycle.is_open() {
            return;
        }
        let gesture = self.pointers.on_pointer_cancel(event);
        self.apply_gesture(gesture);
    }

    fn apply_gesture(&mut self, gesture: PointerGesture) {
        match gesture {
            PointerGesture::None => return,
            PointerGesture::Pan { dx, dy } => {
                self.transform.apply_pan_delta(dx, dy);
                self.animation = Animation::None;
            }
            PointerGesture::Swipe { dx, dy } => {
                self.transform.view_mut().swipe_offset = Point::new(dx, dy);
                self.animation = Animation::None;
            }
            PointerGesture::PinchStart { .. } => {
                self.transform.view_mut().swipe_offset = Point::ZERO;
                self.animation = Animation::None;
            }
            PointerGesture::Pinch { scale, center } => {
                self.transform.apply_pinch_step(scale, center);
                self.animation = Animation::None;
            }
            PointerGesture::Release(release) => self.resolve(release),
            PointerGesture::Cancelled => self.cancel_gesture(),
        }
        self.schedule();
    }

    fn resolve(&mut self, release: Release) {
        match release {
            Release::Settle => {
                self.transform.regulate();
                self.animation = Animation::Settle;
            }
            Release::SnapBack => {
                self.transform.view_mut().swipe_offset = Point::ZERO;
                self.transform.regulate();
                self.animation = Animation::SnapBack;
            }
            Release::Navigate(direction) => self.navigate(direction),
            Release::Close => self.close(),
            Release::DoubleTap(position) => {
                self.transform.zoom_at(position);
                self.animation = Animation::Settle;
            }
        }
    }

    fn cancel_gesture(&mut self) {
        self.transform.view_mut().swipe_offset = Point::ZERO;
        self.transform.regulate();
        self.animation = Animation::SnapBack;
        self.schedule();
    }

    /// Wheel handler.
    ///
    /// A ctrl+wheel zooms at the cursor; the zoom is regulated once the wheel
    /// has been quiet for [`Config::wheel_end_ms`]. A plain wheel pans a zoomed
    /// image. Returns `true` if the event was used, in which case the page
    /// should not scroll.
    pub fn on_wheel(&mut self, event: WheelInput) -> bool {
        if !self.accepts_gestures() || self.pointers.has_active_pointers() {
            return false;
        }
        if event.ctrl_key {
            if self.transform.apply_wheel_zoom(
                event.delta.y,
                self.config.wheel_sensitivity,
                event.position,
            ) {
                self.animation = Animation::None;
                self.host.set_timer(Timer::WheelEnd, self.config.wheel_end_ms);
                self.schedule();
            }
            return true;
        }
        if self.transform.view().zoom > MIN_ZOOM {
            self.transform.pan_by(-event.delta.x, -event.delta.y);
            self.transform.regulate();
            self.animation = Animation::None;
            self.schedule();
            return true;
        }
        false
    }

    /// Keyboard handler.
    ///
    /// `key` is the value of `KeyboardEvent.key`. Returns `true` if the key
    /// was used.
    pub fn on_key(&mut self, key: &str) -> bool {
        if !self.lifecycle.is_open() {
            return false;
        }
        match key {
            "ArrowLeft" => self.navigate(Direction::Prev),
            "ArrowRight" => self.navigate(Direction::Next),
            "Escape" => self.close(),
            "+" | "=" => self.zoom_to_center(self.transform.max_zoom()),
            "-" => self.zoom_to_center(MIN_ZOOM),
            _ => return false,
        }
        true
    }

    // Zoom commands wait for the pointers to be lifted, so that a zoom never
    // starts in the middle of a swipe.
    fn accepts_zoom_command(&self) -> bool {
        self.accepts_gestures() && !self.pointers.has_active_pointers()
    }

    fn zoom_to_center(&mut self, target: f64) {
        if !self.accepts_zoom_command() {
            return;
        }
        if let Some(viewport) = self.transform.viewport() {
            if self.transform.zoom_to(target, viewport.center) {
                self.animation = Animation::Settle;
                self.schedule();
            }
        }
    }

    /// Toggles between minimum and maximum zoom at the view center.
    pub fn toggle_zoom(&mut self) {
        if self.accepts_zoom_command() && self.transform.toggle_zoom() {
            self.animation = Animation::Settle;
            self.schedule();
        }
    }

    /// Toggles between minimum and maximum zoom anchored at `point`.
    pub fn zoom_at(&mut self, point: Point) {
        if self.accepts_zoom_command() && self.transform.zoom_at(point) {
            self.animation = Animation::Settle;
            self.schedule();
        }
    }
}
