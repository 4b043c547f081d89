//! Canvas 2D rendering backend.
//!
//! [`CanvasRenderer`] replays a display list through a [`Canvas2d`] context:
//! the browser's `CanvasRenderingContext2D` on wasm32, or [`RecordingCanvas`]
//! for headless use.

mod context;
mod renderer;

#[cfg(target_arch = "wasm32")]
pub use context::context_for;
pub use context::{Canvas2d, CanvasOp, CanvasPaint, RecordingCanvas};
pub use renderer::CanvasRenderer;
