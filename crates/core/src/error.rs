//! Error types for the glyph-field core.
//!
//! Errors only arise while building or reconfiguring a simulation. The
//! per-frame path (spawn, update, draw) is total and never returns one.

use thiserror::Error;

/// Errors produced while constructing or configuring a simulation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The drawing surface was zero-sized, or its size or pixel ratio was not finite.
    #[error("invalid dimensions: width, height and device pixel ratio must be positive and finite")]
    InvalidDimensions,

    /// A configuration value was outside its allowed range.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParam { name: String, reason: String },

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// The color table has no entries.
    #[error("color table requires at least 1 color")]
    EmptyColorTable,

    /// A headless pointer script name was not recognized.
    #[error("unknown pointer script: {0}")]
    UnknownScript(String),

    /// Writing a snapshot failed.
    #[error("i/o error: {0}")]
    Io(String),
}

impl EngineError {
    /// Shorthand for [`EngineError::InvalidParam`].
    pub fn invalid_param(name: &str, reason: impl Into<String>) -> Self {
        EngineError::InvalidParam {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_dimensions_displays_readable_message() {
        let msg = EngineError::InvalidDimensions.to_string();
        assert!(
            msg.contains("width") && msg.contains("height"),
            "expected message mentioning width and height, got: {msg}"
        );
    }

    #[test]
    fn invalid_param_includes_name_and_reason() {
        let err = EngineError::invalid_param("damping", "must be in (0, 1]");
        let msg = err.to_string();
        assert!(msg.contains("damping"), "missing param name in: {msg}");
        assert!(msg.contains("(0, 1]"), "missing reason in: {msg}");
    }

    #[test]
    fn invalid_color_includes_message() {
        let msg = EngineError::InvalidColor("bad hex".into()).to_string();
        assert!(msg.contains("bad hex"), "missing message in: {msg}");
    }

    #[test]
    fn unknown_script_includes_name() {
        let msg = EngineError::UnknownScript("spiral".into()).to_string();
        assert!(msg.contains("spiral"), "missing script name in: {msg}");
    }

    #[test]
    fn io_includes_message() {
        let msg = EngineError::Io("disk full".into()).to_string();
        assert!(msg.contains("disk full"));
    }

    #[test]
    fn engine_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EngineError>();
    }

    #[test]
    fn engine_error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<EngineError>();
    }
}
