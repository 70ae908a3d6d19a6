//! Geometry helpers.
//!
//! Points and sizes are in CSS pixels. The [`Mapping`] relates screen space to
//! the local space of the image.

use std::ops::{Add, Mul, Sub};

/// Point or displacement in CSS pixels.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Point {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Point {
    /// Origin.
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    /// Creates a new point.
    pub const fn new(x: f64, y: f64) -> Point {
        Point { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Midpoint between `self` and `other`.
    pub fn midpoint(self, other: Point) -> Point {
        Point::new(lerp(self.x, other.x, 0.5), lerp(self.y, other.y, 0.5))
    }

    /// Largest absolute coordinate.
    pub fn max_abs(self) -> f64 {
        self.x.abs().max(self.y.abs())
    }

    /// Returns `true` if both coordinates are finite.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// Size in CSS pixels.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Size {
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Size {
    /// Creates a new size.
    pub const fn new(width: f64, height: f64) -> Size {
        Size { width, height }
    }

    /// Returns `true` if both dimensions are finite and positive.
    pub fn is_measured(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Viewport of the lightbox.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    /// Screen position of the view center, which is the origin of the pan.
    pub center: Point,
    /// Size of the visible area.
    pub size: Size,
}

/// Clamps `value` to `[min, max]`.
///
/// Unlike [`f64::clamp`] this does not panic when `min > max`; `min` wins.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.min(max).max(min)
}

/// Linear interpolation between `a` and `b`.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Mapping between screen space and image-local space.
///
/// A screen point `S` and an image-local point `i` are related by
/// `S = C + P + z·i`, where `C` is the view center, `P` the pan and `z` the
/// zoom.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mapping {
    /// View center.
    pub center: Point,
    /// Pan.
    pub pan: Point,
    /// Zoom. Must be positive.
    pub zoom: f64,
}

impl Mapping {
    /// Image-local point under the screen point `screen`.
    pub fn to_local(&self, screen: Point) -> Point {
        (screen - self.center - self.pan) * self.zoom.recip()
    }

    /// Screen point of the image-local point `local`.
    pub fn to_screen(&self, local: Point) -> Point {
        self.center + self.pan + local * self.zoom
    }

    /// Pan that places the image-local point `local` under the screen point
    /// `screen` when the zoom is `zoom`.
    pub fn anchored_pan(center: Point, screen: Point, local: Point, zoom: f64) -> Point {
        screen - center - local * zoom
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn distance_and_midpoint() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(30.0, 40.0);
        assert_eq!(a.distance(b), 50.0);
        assert_eq!(a.midpoint(b), Point::new(15.0, 20.0));
    }

    #[test]
    fn clamp_inverted_range() {
        assert_eq!(clamp(5.0, 0.0, 10.0), 5.0);
        assert_eq!(clamp(-5.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp(15.0, 0.0, 10.0), 10.0);
        assert_eq!(clamp(3.0, 1.0, 0.0), 1.0);
    }

    #[test]
    fn mapping_round_trip() {
        let mapping = Mapping {
            center: Point::new(400.0, 300.0),
            pan: Point::new(-35.0, 12.5),
            zoom: 2.5,
        };
        let screen = Point::new(123.0, 456.0);
        let back = mapping.to_screen(mapping.to_local(screen));
        assert!((back.x - screen.x).abs() < 1e-9);
        assert!((back.y - screen.y).abs() < 1e-9);
    }

    #[test]
    fn anchored_pan_keeps_point() {
        let center = Point::new(400.0, 300.0);
        let screen = Point::new(500.0, 200.0);
        let local = Point::new(10.0, -20.0);
        let pan = Mapping::anchored_pan(center, screen, local, 3.0);
        let mapping = Mapping {
            center,
            pan,
            zoom: 3.0,
        };
        assert_eq!(mapping.to_screen(local), screen);
    }
}
