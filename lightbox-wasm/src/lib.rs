//! lightbox-wasm is the gesture and transform engine of a gallery lightbox. It
//! turns pointer, wheel and keyboard input into zoom, pan, swipe navigation
//! and drag-to-close, and draws the result through CSS transforms.
//!
//! The engine in [`lightbox`] does not depend on the browser. It talks to its
//! environment through the [`Host`] trait, which [`ui`] implements on top of
//! the DOM.

#![warn(missing_docs)]

use std::rc::Rc;
use wasm_bindgen::{prelude::*, JsCast};
use web_sys::{Document, Window};

use lightbox_json::{Config, Slide};

pub mod error;
pub mod geometry;
pub mod host;
pub mod lifecycle;
pub mod lightbox;
pub mod navigation;
pub mod pointer;
pub mod render;
pub mod transform;
pub mod ui;
pub mod version;

pub use error::LightboxError;
pub use host::{Host, Timer};
pub use lightbox::Lightbox;

/// Initialize the wasm module.
///
/// This function is set to run as soon as the wasm module is instantiated. It
/// sets a panic hook using the [`console_error_panic_hook`] crate and
/// installs [`console_log`] as the backend of the [`log`] crate.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
    console_log::init_with_level(log::Level::Info).map_err(|e| e.to_string())?;
    Ok(())
}

/// Starts a lightbox.
///
/// This function should be called from JavaScript once the page containing
/// the lightbox elements has been loaded. `slides_json` is a JSON array of
/// slides and `config_json` a JSON configuration object, in which missing
/// fields take their default values (an empty string means the default
/// configuration). `on_closed` is an optional function that is called each
/// time the lightbox has finished closing.
#[wasm_bindgen]
pub fn lightbox_start(
    slides_json: &str,
    config_json: &str,
    on_closed: JsValue,
) -> Result<ui::LightboxHandle, JsValue> {
    let slides: Vec<Slide> =
        serde_json::from_str(slides_json).map_err(|e| format!("invalid slides: {e}"))?;
    let config: Config = if config_json.trim().is_empty() {
        Config::default()
    } else {
        serde_json::from_str(config_json).map_err(|e| format!("invalid configuration: {e}"))?
    };
    let (window, document) = get_window_and_document()?;
    let ui = ui::Ui::new(
        window,
        &document,
        slides,
        config,
        on_closed.dyn_into::<js_sys::Function>().ok(),
    )?;
    log::info!(
        "lightbox-wasm {} ({}) started",
        version::lightbox_wasm_version(),
        version::lightbox_wasm_git_version()
    );
    Ok(ui::LightboxHandle::new(ui))
}

/// Returns the [`Window`] and [`Document`] objects.
///
/// These are returned inside an [`Rc`] so that their ownership can be shared.
pub fn get_window_and_document() -> Result<(Rc<Window>, Rc<Document>), JsValue> {
    let window = Rc::new(web_sys::window().ok_or("unable to get window")?);
    let document = Rc::new(window.document().ok_or("unable to get document")?);
    Ok((window, document))
}
