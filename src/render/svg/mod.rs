//! SVG rendering backend.
//!
//! [`SvgRenderer`] writes through an [`SvgSurface`]: the browser DOM on
//! wasm32, or the in-memory [`SvgTree`] for headless rendering and tests.

mod document;
#[cfg(target_arch = "wasm32")]
mod dom;
mod renderer;

pub use document::{NodeId, SvgSurface, SvgTree, SVG_NS};
#[cfg(target_arch = "wasm32")]
pub use dom::DomSurface;
pub use renderer::SvgRenderer;
