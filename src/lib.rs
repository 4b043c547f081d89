//! drawkit - dual-backend drawing and animation core for progress components
//!
//! Draws the same logical shapes through SVG or Canvas 2D and animates them
//! with a shared scheduler:
//! - Path, arc and line geometry with SVG path-data parsing and emission
//! - Retained SVG nodes or a replayed Canvas display list, behind one trait
//! - Cosine ease-out interpolation, delays, loops and explicit stop
//! - Segments, range bands and clip-path reveals for progress fills
//! - A linear/circular progress bar built on all of the above
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { ProgressView } from 'drawkit';
//! await init();
//! const view = new ProgressView('host', 'svg', { value: 40, animation: { enable: true } });
//! view.onEvent((e) => console.log(e.name));
//! view.render();
//! view.setValue(80);
//! ```
//!
//! # Usage (Rust, headless)
//!
//! ```
//! use drawkit::progress::{render_svg, ProgressConfig};
//!
//! let config = ProgressConfig::from_json(r#"{"value":50,"showProgressValue":true}"#)?;
//! let snapshot = render_svg("bar", config)?;
//! assert!(snapshot.markup.contains("50%"));
//! # Ok::<(), drawkit::DrawkitError>(())
//! ```

pub mod animation;
pub mod compose;
pub mod error;
pub mod geometry;
pub mod progress;
pub mod render;
pub mod types;

// Browser entry point
#[cfg(target_arch = "wasm32")]
pub mod viewer;

use wasm_bindgen::prelude::*;

pub use error::{DrawkitError, Result};
pub use progress::{ProgressBar, ProgressConfig, ProgressEvent};
pub use render::{BackendKind, RenderBackend, Renderer};
#[cfg(target_arch = "wasm32")]
pub use viewer::ProgressView;

pub use types::*;

/// Render a progress configuration (JSON) to settled SVG markup.
///
/// # Errors
/// Returns an error if the configuration is invalid.
#[wasm_bindgen(js_name = "renderSvg")]
pub fn render_svg(id: &str, config_json: &str) -> std::result::Result<String, JsValue> {
    let config =
        ProgressConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    progress::render_svg(id, config)
        .map(|snapshot| snapshot.markup)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
