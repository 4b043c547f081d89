//! Structured error types for drawkit.
//!
//! Configuration problems (missing surfaces, malformed path data, empty
//! gradients) fail fast through these variants. Out-of-range values and
//! unattached layouts are handled by policy in the callers and never reach here.

use crate::types::ShapeHandle;

/// All errors that can occur while drawing or animating.
#[derive(Debug, thiserror::Error)]
pub enum DrawkitError {
    /// The root element (SVG host or canvas) does not exist.
    #[error("Root element not found: {0}")]
    RootNotFound(String),

    /// Malformed path data string or command sequence.
    #[error("Invalid path data: {0}")]
    PathData(String),

    /// Gradient without stops or with out-of-order stops.
    #[error("Invalid gradient: {0}")]
    Gradient(String),

    /// Invalid component configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A handle that was never issued or has been removed.
    #[error("Unknown shape handle: {0}")]
    UnknownShape(ShapeHandle),

    /// An attribute update that does not apply to the target shape.
    #[error("Invalid attribute update: {0}")]
    InvalidUpdate(String),

    /// Animation request rejected by the scheduler.
    #[error("Animation error: {0}")]
    Animation(String),

    /// Rendering error reported by a backend.
    #[error("Render error: {0}")]
    Render(String),

    /// SVG serialization error from quick-xml.
    #[error("XML writing: {0}")]
    Xml(#[from] quick_xml::Error),

    /// JSON configuration error.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catch-all for string errors (mostly JS exceptions).
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DrawkitError>;

impl From<String> for DrawkitError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for DrawkitError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

impl From<wasm_bindgen::JsValue> for DrawkitError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        Self::Render(
            value
                .as_string()
                .unwrap_or_else(|| format!("{value:?}")),
        )
    }
}

#[cfg(target_arch = "wasm32")]
impl From<DrawkitError> for wasm_bindgen::JsValue {
    fn from(e: DrawkitError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
