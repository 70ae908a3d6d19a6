//! Lightbox errors.

use lightbox_json::Config;
use wasm_bindgen::JsValue;

/// Lightbox error.
///
/// None of these errors is fatal. They report requests that the lightbox
/// refused, leaving its state untouched.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LightboxError {
    /// The slide collection is empty, so there is nothing to open.
    #[error("cannot open an empty slide collection")]
    EmptyCollection,
    /// The requested slide does not exist.
    #[error("slide index {index} out of range for {len} slides")]
    InvalidIndex {
        /// Requested index.
        index: usize,
        /// Number of slides.
        len: usize,
    },
    /// The configuration has an invalid value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<LightboxError> for JsValue {
    fn from(value: LightboxError) -> JsValue {
        JsValue::from_str(&value.to_string())
    }
}

/// Checks that a configuration can be used by the engine.
pub fn validate_config(config: &Config) -> Result<(), LightboxError> {
    if !(config.max_zoom.is_finite() && config.max_zoom >= 1.0) {
        return Err(LightboxError::InvalidConfig(format!(
            "max_zoom must be at least 1, got {}",
            config.max_zoom
        )));
    }
    let lengths = [
        ("lock_threshold", config.lock_threshold),
        ("swipe_change_threshold", config.swipe_change_threshold),
        ("drag_close_threshold", config.drag_close_threshold),
        ("wheel_sensitivity", config.wheel_sensitivity),
        ("double_tap_slop", config.double_tap_slop),
    ];
    for (name, value) in lengths {
        if !(value.is_finite() && value >= 0.0) {
            return Err(LightboxError::InvalidConfig(format!(
                "{name} must be finite and non-negative, got {value}"
            )));
        }
    }
    if !(config.exit_scale.is_finite() && config.exit_scale > 0.0) {
        return Err(LightboxError::InvalidConfig(format!(
            "exit_scale must be positive, got {}",
            config.exit_scale
        )));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&Config::default()), Ok(()));
    }

    #[test]
    fn rejects_bad_values() {
        let config = Config {
            max_zoom: 0.5,
            ..Config::default()
        };
        assert!(validate_config(&config).is_err());
        let config = Config {
            drag_close_threshold: f64::NAN,
            ..Config::default()
        };
        assert!(validate_config(&config).is_err());
    }
}
