//! lightbox-json contains the JSON schemas exchanged between the gallery page
//! and lightbox-wasm: the slide collection, the engine configuration and the
//! frames pushed to the presentation layer.

#![warn(missing_docs)]

use serde::{Deserialize, Serialize};

/// Slide JSON schema.
///
/// The gallery page hands the lightbox an ordered array of slides. The
/// lightbox never modifies them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Slide {
    /// URL of the full-size image.
    pub src: String,
    /// Alternative text for the image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash)]
/// Navigation direction.
pub enum Direction {
    /// Previous slide (wraps from the first to the last).
    Prev,
    /// Next slide (wraps from the last to the first).
    Next,
}

impl Direction {
    /// Index step for this direction.
    pub fn step(self) -> isize {
        match self {
            Direction::Prev => -1,
            Direction::Next => 1,
        }
    }

    /// Applies the direction to `index` in a circular collection of `len`
    /// slides.
    ///
    /// `len` must be nonzero.
    pub fn apply(self, index: usize, len: usize) -> usize {
        let len = len as isize;
        ((index as isize + self.step() + len) % len) as usize
    }
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash)]
/// Pointer device kind, as reported by `PointerEvent.pointerType`.
pub enum PointerKind {
    /// Finger on a touchscreen.
    Touch,
    /// Mouse.
    Mouse,
    /// Stylus.
    Pen,
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
/// Animation hint attached to a frame.
///
/// The presentation layer uses this to choose the CSS transition that moves
/// the visuals from the previous frame to this one.
pub enum Animation {
    /// Follow the values immediately (active dragging or pinching).
    #[default]
    None,
    /// Ease zoom and pan into their clamped values after a gesture.
    Settle,
    /// Ease an uncommitted swipe or close drag back to rest.
    SnapBack,
    /// Animate zoom and pan back to their defaults before a navigation.
    ViewReset,
    /// Slide the track towards the neighbouring slide.
    Slide,
    /// Exit animation of the close sequence.
    Exit,
}

/// Frame JSON schema.
///
/// A frame is the complete visual state of the lightbox. One frame is pushed
/// to the presentation layer per animation frame in which something changed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Frame {
    /// Whether the lightbox is showing (this includes the exit animation).
    pub open: bool,
    /// Index of the current slide.
    pub current_index: usize,
    /// Horizontal translation of the zoomed image in pixels.
    pub pan_x: f64,
    /// Vertical translation of the zoomed image in pixels.
    pub pan_y: f64,
    /// Zoom scale.
    pub zoom: f64,
    /// Horizontal swipe offset of the slide track in pixels.
    pub swipe_offset_x: f64,
    /// Vertical drag-to-close offset in pixels.
    pub swipe_offset_y: f64,
    /// Scale of the content during the exit animation.
    pub exit_scale: f64,
    /// Opacity of the backdrop.
    pub backdrop_opacity: f64,
    /// Opacity of the content.
    pub content_opacity: f64,
    /// Direction of the slide transition in flight, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sliding: Option<Direction>,
    /// Animation hint.
    #[serde(default)]
    pub animation: Animation,
}

macro_rules! impl_config {
    {$($(#[$doc:meta])* $name:ident : $ty:ty = $default:expr,)*} => {
        /// Configuration JSON schema.
        ///
        /// Every field is optional in the JSON document; missing fields take
        /// their default value.
        #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
        #[serde(default)]
        pub struct Config {
            $(
                $(#[$doc])*
                pub $name: $ty,
            )*
        }

        impl Default for Config {
            fn default() -> Self {
                Self {
                    $(
                        $name: $default,
                    )*
                }
            }
        }
    }
}

impl_config! {
    /// Maximum zoom scale. The minimum is always 1.
    max_zoom: f64 = 4.0,
    /// Movement in pixels before a single-pointer drag locks to an axis.
    lock_threshold: f64 = 10.0,
    /// Horizontal movement in pixels that commits a swipe navigation.
    swipe_change_threshold: f64 = 80.0,
    /// Vertical movement in pixels that commits a drag-to-close.
    drag_close_threshold: f64 = 120.0,
    /// Exponential response of ctrl+wheel zoom per unit of `deltaY`.
    wheel_sensitivity: f64 = 0.01,
    /// Quiet time in milliseconds after which a wheel zoom is regulated.
    wheel_end_ms: u32 = 150,
    /// Duration in milliseconds of the view reset animation.
    view_reset_ms: u32 = 250,
    /// Duration in milliseconds of the slide transition.
    slide_ms: u32 = 300,
    /// Extra time in milliseconds to wait for a transition end event before
    /// giving up on it.
    transition_grace_ms: u32 = 80,
    /// Duration in milliseconds of the close fade.
    close_fade_ms: u32 = 200,
    /// Content scale at the end of the exit animation.
    exit_scale: f64 = 0.85,
    /// Maximum time in milliseconds between the taps of a double tap.
    double_tap_ms: u32 = 300,
    /// Maximum distance in pixels between the taps of a double tap.
    double_tap_slop: f64 = 30.0,
}

macro_rules! impl_str_conv {
    ($ty:ty, $($s:expr => $v:ident),*) => {
        impl std::str::FromStr for $ty {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, ()> {
                Ok(match s {
                    $(
                        $s => <$ty>::$v,
                    )*
                        _ => return Err(()),
                })
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
                write!(f, "{}", match self {
                    $(
                        <$ty>::$v => $s,
                    )*
                })
            }
        }
    }
}

impl_str_conv!(Direction,
               "prev" => Prev,
               "next" => Next);

impl_str_conv!(PointerKind,
               "touch" => Touch,
               "mouse" => Mouse,
               "pen" => Pen);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn direction_wraps() {
        assert_eq!(Direction::Next.apply(2, 3), 0);
        assert_eq!(Direction::Prev.apply(0, 3), 2);
        assert_eq!(Direction::Next.apply(0, 1), 0);
    }

    #[test]
    fn str_conversions() {
        assert_eq!("next".parse::<Direction>(), Ok(Direction::Next));
        assert_eq!("touch".parse::<PointerKind>(), Ok(PointerKind::Touch));
        assert!("sideways".parse::<Direction>().is_err());
        assert_eq!(PointerKind::Pen.to_string(), "pen");
    }

    #[test]
    fn partial_config() {
        let config: Config = serde_json::from_str(r#"{"max_zoom": 3.0}"#).unwrap();
        assert_eq!(config.max_zoom, 3.0);
        assert_eq!(config.swipe_change_threshold, 80.0);
        assert_eq!(config.close_fade_ms, 200);
    }

    #[test]
    fn slide_without_alt() {
        let slides: Vec<Slide> =
            serde_json::from_str(r#"[{"src": "a.jpg"}, {"src": "b.jpg", "alt": "B"}]"#).unwrap();
        assert_eq!(slides[0].alt, None);
        assert_eq!(slides[1].alt.as_deref(), Some("B"));
        assert_eq!(serde_json::to_string(&slides[0]).unwrap(), r#"{"src":"a.jpg"}"#);
    }
}
