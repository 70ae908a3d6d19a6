//! User interface.
//!
//! This module links the lightbox HTML elements with the engine. Browser
//! events are converted into engine inputs, and [`DomHost`] implements the
//! [`Host`] trait on top of the DOM: animation frames, `setTimeout` timers, the
//! page scroll lock and the CSS styles that draw each [`Frame`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use wasm_bindgen::{closure::Closure, prelude::*, JsCast, JsValue};
use web_sys::{
    AddEventListenerOptions, Document, EventTarget, HtmlButtonElement, HtmlElement,
    HtmlImageElement, KeyboardEvent, PointerEvent, TransitionEvent, WheelEvent, Window,
};

use crate::geometry::{Point, Size, Viewport};
use crate::host::{Host, Timer};
use crate::lifecycle;
use crate::lightbox::{Lightbox, TransitionTarget, WheelInput};
use crate::pointer::PointerInput;
use lightbox_json::{Animation, Config, Direction, Frame, PointerKind, Slide};

#[macro_use]
mod macros;

type Engine = Lightbox<DomHost>;

// Pixels per line for wheel events in DOM_DELTA_LINE mode.
const LINE_HEIGHT_PX: f64 = 16.0;

/// User interface.
///
/// This structure is used to create and set up the callbacks that link the
/// lightbox elements with the engine.
#[derive(Clone)]
pub struct Ui {
    window: Rc<Window>,
    elements: Elements,
    engine: Rc<RefCell<Engine>>,
}

// Defines the 'struct Elements' and its constructor
ui_elements! {
    lightbox: HtmlElement,
    lightbox_backdrop: HtmlElement,
    lightbox_track: HtmlElement,
    lightbox_image: HtmlImageElement,
    lightbox_prev: HtmlButtonElement,
    lightbox_next: HtmlButtonElement,
    lightbox_close: HtmlButtonElement,
    lightbox_zoom: HtmlButtonElement,
}

impl Ui {
    /// Creates a new user interface.
    ///
    /// The `on_closed` function, if given, is called after each close
    /// sequence has finished.
    pub fn new(
        window: Rc<Window>,
        document: &Document,
        slides: Vec<Slide>,
        config: Config,
        on_closed: Option<js_sys::Function>,
    ) -> Result<Ui, JsValue> {
        let elements = Elements::new(document)?;
        let host = DomHost {
            window: Rc::clone(&window),
            body: document.body().ok_or("unable to get body")?,
            elements: elements.clone(),
            config: config.clone(),
            slides: slides.clone(),
            on_closed,
            frame_callback: None,
            timer_callbacks: HashMap::new(),
            timers: HashMap::new(),
            shown_index: None,
        };
        let engine = Rc::new(RefCell::new(Lightbox::new(config, slides, host)?));
        engine.borrow_mut().host_mut().attach(&engine);
        let ui = Ui {
            window,
            elements,
            engine,
        };
        ui.set_callbacks()?;
        Ok(ui)
    }

    fn set_callbacks(&self) -> Result<(), JsValue> {
        set_on!(
            click,
            self,
            lightbox_prev,
            lightbox_next,
            lightbox_close,
            lightbox_zoom
        );
        set_on!(pointerdown, self, lightbox_track);
        set_on!(pointermove, self, lightbox_track);
        set_on!(pointerup, self, lightbox_track);
        set_on!(pointercancel, self, lightbox_track);
        set_on!(transitionend, self, lightbox_track, lightbox_image);
        set_on!(load, self, lightbox_image);

        // Non-passive, so that handled wheel events do not scroll the page.
        let options = AddEventListenerOptions::new();
        options.set_passive(false);
        self.elements
            .lightbox
            .add_event_listener_with_callback_and_add_event_listener_options(
                "wheel",
                self.lightbox_onwheel().into_js_value().unchecked_ref(),
                &options,
            )?;
        self.window.add_event_listener_with_callback(
            "keydown",
            self.window_onkeydown().into_js_value().unchecked_ref(),
        )?;
        self.window.add_event_listener_with_callback(
            "resize",
            self.window_onresize().into_js_value().unchecked_ref(),
        )?;
        Ok(())
    }

    fn with_engine<R>(&self, f: impl FnOnce(&mut Engine) -> R) -> Option<R> {
        match self.engine.try_borrow_mut() {
            Ok(mut engine) => Some(f(&mut engine)),
            Err(_) => {
                web_sys::console::error_1(&"lightbox engine is busy".into());
                None
            }
        }
    }

    fn open(&self, index: usize) -> Result<(), JsValue> {
        // The lightbox must be laid out to measure the viewport.
        self.elements.lightbox.style().remove_property("display")?;
        let viewport = self.viewport();
        let mut engine = self
            .engine
            .try_borrow_mut()
            .map_err(|_| "lightbox engine is busy")?;
        if let Err(e) = engine.open(index) {
            if engine.phase() == lifecycle::Phase::Closed {
                self.elements
                    .lightbox
                    .style()
                    .set_property("display", "none")?;
            }
            return Err(e.into());
        }
        engine.set_viewport(viewport);
        Ok(())
    }

    fn viewport(&self) -> Viewport {
        let rect = self.elements.lightbox.get_bounding_client_rect();
        Viewport {
            center: Point::new(
                rect.left() + rect.width() / 2.0,
                rect.top() + rect.height() / 2.0,
            ),
            size: Size::new(rect.width(), rect.height()),
        }
    }

    fn loaded_image_size(&self) -> Option<Size> {
        let image = &self.elements.lightbox_image;
        (image.complete() && image.natural_width() > 0).then(|| {
            Size::new(
                f64::from(image.offset_width()),
                f64::from(image.offset_height()),
            )
        })
    }
}

// Pointer, wheel and keyboard input
impl Ui {
    impl_pointer_handlers!(
        pointerdown => pointer_down,
        pointermove => pointer_move,
        pointerup => pointer_up,
        pointercancel => pointer_cancel,
    );

    fn take_pointer_event(&self, event: &PointerEvent) -> PointerInput {
        event.prevent_default();
        if event.type_() == "pointerdown" {
            // Keep receiving moves when the pointer leaves the track.
            if let Err(e) = self
                .elements
                .lightbox_track
                .set_pointer_capture(event.pointer_id())
            {
                web_sys::console::error_1(&e);
            }
        }
        let position = Point::new(f64::from(event.client_x()), f64::from(event.client_y()));
        let rect = self.elements.lightbox_image.get_bounding_client_rect();
        PointerInput {
            id: event.pointer_id(),
            kind: event
                .pointer_type()
                .parse()
                .unwrap_or(PointerKind::Mouse),
            position,
            on_target: (rect.left()..=rect.right()).contains(&position.x)
                && (rect.top()..=rect.bottom()).contains(&position.y),
            time_ms: event.time_stamp(),
        }
    }

    fn lightbox_onwheel(&self) -> Closure<dyn Fn(WheelEvent)> {
        let ui = self.clone();
        Closure::new(move |event: WheelEvent| {
            let scale = match event.delta_mode() {
                WheelEvent::DOM_DELTA_LINE => LINE_HEIGHT_PX,
                WheelEvent::DOM_DELTA_PAGE => ui.viewport().size.height,
                _ => 1.0,
            };
            let input = WheelInput {
                delta: Point::new(event.delta_x(), event.delta_y()) * scale,
                position: Point::new(f64::from(event.client_x()), f64::from(event.client_y())),
                ctrl_key: event.ctrl_key(),
            };
            if ui.with_engine(|engine| engine.on_wheel(input)) == Some(true) {
                event.prevent_default();
            }
        })
    }

    fn window_onkeydown(&self) -> Closure<dyn Fn(KeyboardEvent)> {
        let ui = self.clone();
        Closure::new(move |event: KeyboardEvent| {
            if ui.with_engine(|engine| engine.on_key(&event.key())) == Some(true) {
                event.prevent_default();
            }
        })
    }
}

// Buttons
impl Ui {
    impl_onclick!(
        lightbox_prev => navigate(Direction::Prev),
        lightbox_next => navigate(Direction::Next),
        lightbox_close => close,
        lightbox_zoom => toggle_zoom,
    );
}

// Layout
impl Ui {
    fn lightbox_track_ontransitionend(&self) -> Closure<dyn Fn(TransitionEvent)> {
        self.transition_end_handler(TransitionTarget::Track)
    }

    fn lightbox_image_ontransitionend(&self) -> Closure<dyn Fn(TransitionEvent)> {
        self.transition_end_handler(TransitionTarget::View)
    }

    fn transition_end_handler(&self, target: TransitionTarget) -> Closure<dyn Fn(TransitionEvent)> {
        let ui = self.clone();
        Closure::new(move |event: TransitionEvent| {
            let element: &EventTarget = match target {
                TransitionTarget::View => ui.elements.lightbox_image.unchecked_ref(),
                TransitionTarget::Track => ui.elements.lightbox_track.unchecked_ref(),
            };
            // Transitions of the image bubble up to the track.
            if event.target().as_ref() != Some(element) || event.property_name() != "transform" {
                return;
            }
            ui.with_engine(|engine| engine.on_transition_end(target));
        })
    }

    fn lightbox_image_onload(&self) -> Closure<dyn Fn()> {
        let ui = self.clone();
        Closure::new(move || {
            if let Some(size) = ui.loaded_image_size() {
                ui.with_engine(|engine| engine.set_image_size(size));
            }
        })
    }

    fn window_onresize(&self) -> Closure<dyn Fn()> {
        let ui = self.clone();
        Closure::new(move || {
            let viewport = ui.viewport();
            let image = ui.loaded_image_size();
            ui.with_engine(|engine| {
                if !engine.is_open() {
                    return;
                }
                engine.set_viewport(viewport);
                if let Some(size) = image {
                    engine.set_image_size(size);
                }
            });
        })
    }
}

/// DOM host of the lightbox engine.
pub struct DomHost {
    window: Rc<Window>,
    body: HtmlElement,
    elements: Elements,
    config: Config,
    slides: Vec<Slide>,
    on_closed: Option<js_sys::Function>,
    frame_callback: Option<JsValue>,
    // One long-lived callback per timer kind, reused by every set_timer.
    timer_callbacks: HashMap<Timer, JsValue>,
    timers: HashMap<Timer, i32>,
    shown_index: Option<usize>,
}

impl DomHost {
    fn attach(&mut self, engine: &Rc<RefCell<Engine>>) {
        let weak = Rc::downgrade(engine);
        let callback = Closure::<dyn Fn(f64)>::new(move |_: f64| {
            let Some(engine) = weak.upgrade() else {
                return;
            };
            match engine.try_borrow_mut() {
                Ok(mut engine) => engine.on_frame(),
                Err(_) => web_sys::console::error_1(&"lightbox engine is busy".into()),
            };
        });
        self.frame_callback = Some(callback.into_js_value());
        for timer in Timer::ALL {
            self.timer_callbacks
                .insert(timer, Self::timer_callback(Rc::downgrade(engine), timer));
        }
    }

    fn timer_callback(engine: Weak<RefCell<Engine>>, timer: Timer) -> JsValue {
        let callback = Closure::<dyn Fn()>::new(move || {
            let Some(engine) = engine.upgrade() else {
                return;
            };
            match engine.try_borrow_mut() {
                Ok(mut engine) => {
                    engine.host_mut().timers.remove(&timer);
                    engine.on_timer(timer);
                }
                Err(_) => web_sys::console::error_1(
                    &format!("lightbox engine is busy; dropping {timer:?} timer").into(),
                ),
            };
        });
        callback.into_js_value()
    }

    fn draw(&mut self, frame: &Frame) -> Result<(), JsValue> {
        let root = self.elements.lightbox.style();
        if !frame.open {
            return root.set_property("display", "none");
        }
        root.remove_property("display")?;
        self.show_slide(frame.current_index);

        let transitions = Transitions::new(&self.config, frame.animation);
        let image = self.elements.lightbox_image.style();
        image.set_property("transition", &transitions.view)?;
        image.set_property(
            "transform",
            &format!(
                "translate3d({}px, {}px, 0) scale({})",
                frame.pan_x, frame.pan_y, frame.zoom
            ),
        )?;

        // Dragging towards the left reveals the next slide.
        let slide_percent = match frame.sliding {
            Some(Direction::Next) => -100,
            Some(Direction::Prev) => 100,
            None => 0,
        };
        let track = self.elements.lightbox_track.style();
        track.set_property("transition", &transitions.track)?;
        track.set_property(
            "transform",
            &format!(
                "translate3d(calc({slide_percent}% + {}px), {}px, 0) scale({})",
                frame.swipe_offset_x, frame.swipe_offset_y, frame.exit_scale
            ),
        )?;
        track.set_property("opacity", &frame.content_opacity.to_string())?;

        let backdrop = self.elements.lightbox_backdrop.style();
        backdrop.set_property("transition", &transitions.backdrop)?;
        backdrop.set_property("opacity", &frame.backdrop_opacity.to_string())?;
        Ok(())
    }

    fn show_slide(&mut self, index: usize) {
        if self.shown_index == Some(index) {
            return;
        }
        match self.slides.get(index) {
            Some(slide) => {
                let image = &self.elements.lightbox_image;
                image.set_src(&slide.src);
                image.set_alt(slide.alt.as_deref().unwrap_or(""));
                self.shown_index = Some(index);
            }
            None => log::warn!("no slide {index} to show"),
        }
    }
}

impl Host for DomHost {
    fn request_frame(&mut self) {
        let Some(callback) = self.frame_callback.as_ref() else {
            log::warn!("animation frame requested before the engine was attached");
            return;
        };
        if let Err(e) = self.window.request_animation_frame(callback.unchecked_ref()) {
            web_sys::console::error_1(&e);
        }
    }

    fn set_timer(&mut self, timer: Timer, delay_ms: u32) {
        self.clear_timer(timer);
        let Some(callback) = self.timer_callbacks.get(&timer) else {
            log::warn!("no callback for {timer:?} timer; host not attached");
            return;
        };
        let delay_ms = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay_ms)
        {
            Ok(handle) => {
                self.timers.insert(timer, handle);
            }
            Err(e) => web_sys::console::error_1(&e),
        }
    }

    fn clear_timer(&mut self, timer: Timer) {
        if let Some(handle) = self.timers.remove(&timer) {
            self.window.clear_timeout_with_handle(handle);
        }
    }

    fn set_scroll_lock(&mut self, locked: bool) {
        let style = self.body.style();
        let result = if locked {
            style.set_property("overflow", "hidden")
        } else {
            style.remove_property("overflow").map(|_| ())
        };
        if let Err(e) = result {
            web_sys::console::error_1(&e);
        }
    }

    fn present(&mut self, frame: &Frame) {
        if let Err(e) = self.draw(frame) {
            web_sys::console::error_1(&e);
        }
    }

    fn closed(&mut self) {
        let Some(on_closed) = self.on_closed.as_ref() else {
            return;
        };
        // Deferred, so that the callback can use the lightbox.
        if let Err(e) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(on_closed, 0)
        {
            web_sys::console::error_1(&e);
        }
    }
}

// CSS transitions for an animation hint.
struct Transitions {
    view: String,
    track: String,
    backdrop: String,
}

impl Transitions {
    fn new(config: &Config, animation: Animation) -> Transitions {
        let none = || "none".to_string();
        let ease = |property: &str, ms: u32| format!("{property} {ms}ms ease-out");
        match animation {
            Animation::None => Transitions {
                view: none(),
                track: none(),
                backdrop: none(),
            },
            Animation::Settle | Animation::SnapBack => Transitions {
                view: ease("transform", config.view_reset_ms),
                track: ease("transform", config.view_reset_ms),
                backdrop: none(),
            },
            Animation::ViewReset => Transitions {
                view: ease("transform", config.view_reset_ms),
                track: none(),
                backdrop: none(),
            },
            Animation::Slide => Transitions {
                view: none(),
                track: ease("transform", config.slide_ms),
                backdrop: none(),
            },
            Animation::Exit => Transitions {
                view: none(),
                track: format!(
                    "{}, {}",
                    ease("transform", config.close_fade_ms),
                    ease("opacity", config.close_fade_ms)
                ),
                backdrop: ease("opacity", config.close_fade_ms),
            },
        }
    }
}

/// JavaScript handle of a lightbox.
///
/// Created by [`lightbox_start`](crate::lightbox_start).
#[wasm_bindgen(js_name = Lightbox)]
pub struct LightboxHandle {
    ui: Ui,
}

impl LightboxHandle {
    pub(crate) fn new(ui: Ui) -> LightboxHandle {
        LightboxHandle { ui }
    }
}

#[wasm_bindgen(js_class = Lightbox)]
impl LightboxHandle {
    /// Opens the lightbox at slide `index`.
    pub fn open(&self, index: usize) -> Result<(), JsValue> {
        self.ui.open(index)
    }

    /// Closes the lightbox.
    pub fn close(&self) {
        self.ui.with_engine(|engine| engine.close());
    }

    /// Navigates towards `"prev"` or `"next"`.
    pub fn navigate(&self, direction: &str) -> Result<(), JsValue> {
        let direction: Direction = direction
            .parse()
            .map_err(|_| format!("invalid direction {direction:?}"))?;
        self.ui.with_engine(|engine| engine.navigate(direction));
        Ok(())
    }

    /// Toggles between minimum and maximum zoom.
    pub fn toggle_zoom(&self) {
        self.ui.with_engine(|engine| engine.toggle_zoom());
    }

    /// Index of the current slide.
    pub fn current_index(&self) -> Result<usize, JsValue> {
        self.ui
            .with_engine(|engine| engine.current_index())
            .ok_or_else(|| "lightbox engine is busy".into())
    }

    /// Returns `true` if the lightbox is open.
    pub fn is_open(&self) -> bool {
        self.ui
            .with_engine(|engine| engine.is_open())
            .unwrap_or(false)
    }
}
