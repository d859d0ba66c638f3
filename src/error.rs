//! Error types for morphe.
//!
//! Failures stay local to the engine: profile detection falls back to a
//! default, unknown shapes and overlapping transitions reject the triggering
//! call, and backend draw failures are logged without stopping the loop.

use thiserror::Error;

use crate::shapes::ShapeId;

/// Errors surfaced by engine construction and engine commands.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A shape was requested by a name the generator does not know.
    #[error("unknown shape '{0}' (expected one of: sphere, cube, helix, wave, bug, ribbon, constellation)")]
    UnknownShape(String),

    /// A transition is already running; the new request was dropped.
    #[error("transition to {target} already in progress")]
    TransitionInProgress {
        /// Shape the running transition is heading to.
        target: ShapeId,
    },

    /// `set_palette` was called with an index outside the palette table.
    #[error("palette index {index} out of range (have {len})")]
    PaletteOutOfRange { index: usize, len: usize },

    /// The render backend cannot report a usable surface.
    #[error("render backend unavailable: {0}")]
    RenderBackendUnavailable(String),

    /// A configuration value is out of its valid domain.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A configuration document could not be parsed or written.
    #[error("configuration parse error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Error reported by a [`RenderBackend`](crate::backend::RenderBackend) for a
/// single draw. The engine logs it and schedules the next frame as usual.
#[derive(Debug, Error)]
#[error("render backend error: {0}")]
pub struct BackendError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_shape_message_lists_shapes() {
        let err = EngineError::UnknownShape("torus".into());
        let msg = err.to_string();
        assert!(msg.contains("torus"));
        assert!(msg.contains("ribbon"));
    }

    #[test]
    fn test_config_error_from_json() {
        let parse: Result<u32, _> = serde_json::from_str("not json");
        let err: EngineError = parse.unwrap_err().into();
        assert!(matches!(err, EngineError::Config(_)));
    }
}
