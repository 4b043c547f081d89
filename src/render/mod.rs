//! Rendering engine with pluggable backends.
//!
//! This module provides:
//! - The backend-agnostic [`RenderBackend`] trait
//! - An SVG backend (retained nodes)
//! - A Canvas 2D backend (display list replay)
//! - Color parsing utilities

pub mod backend;
pub mod canvas;
pub mod colors;
pub mod svg;

pub use backend::RenderBackend;
pub use canvas::{CanvasRenderer, RecordingCanvas};
pub use colors::{contrast_text_color, palette};
pub use svg::{SvgRenderer, SvgTree};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{
    AttributeUpdate, ClipPath, ClipRegion, DrawRequest, GradientRef, GradientSpec,
    GradientTransform, Rect, ShapeHandle, Size, TextStyle,
};

/// Which backend a component draws through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BackendKind {
    #[default]
    Svg,
    Canvas,
}

/// Renderer enum wrapping available backends for runtime switching.
#[allow(clippy::large_enum_variant)]
pub enum Renderer {
    /// Headless SVG document.
    Svg(SvgRenderer<SvgTree>),
    /// Headless canvas that records its calls.
    Canvas(CanvasRenderer<RecordingCanvas>),
    /// SVG attached to the page.
    #[cfg(target_arch = "wasm32")]
    SvgDom(SvgRenderer<svg::DomSurface>),
    /// Canvas element on the page.
    #[cfg(target_arch = "wasm32")]
    CanvasDom(CanvasRenderer<web_sys::CanvasRenderingContext2d>),
}

macro_rules! dispatch {
    ($self:ident, $r:ident => $body:expr) => {
        match $self {
            Self::Svg($r) => $body,
            Self::Canvas($r) => $body,
            #[cfg(target_arch = "wasm32")]
            Self::SvgDom($r) => $body,
            #[cfg(target_arch = "wasm32")]
            Self::CanvasDom($r) => $body,
        }
    };
}

impl Renderer {
    /// In-memory renderer of the given kind, `id` naming the root element.
    pub fn headless(kind: BackendKind, id: &str, size: Size) -> Self {
        match kind {
            BackendKind::Svg => Self::Svg(SvgRenderer::new(SvgTree::new(id, size), id)),
            BackendKind::Canvas => Self::Canvas(CanvasRenderer::new(
                RecordingCanvas::new(size.width, size.height),
                id,
            )),
        }
    }

    /// Attach to the page element `host_id`.
    ///
    /// For SVG the element is a container that receives a new `<svg>`; for
    /// Canvas it must be the `<canvas>` itself.
    #[cfg(target_arch = "wasm32")]
    pub fn attach(kind: BackendKind, host_id: &str, size: Option<Size>) -> Result<Self> {
        Ok(match kind {
            BackendKind::Svg => Self::SvgDom(SvgRenderer::new(
                svg::DomSurface::attach(host_id, size)?,
                host_id,
            )),
            BackendKind::Canvas => {
                Self::CanvasDom(CanvasRenderer::new(canvas::context_for(host_id)?, host_id))
            }
        })
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Svg(_) => BackendKind::Svg,
            Self::Canvas(_) => BackendKind::Canvas,
            #[cfg(target_arch = "wasm32")]
            Self::SvgDom(_) => BackendKind::Svg,
            #[cfg(target_arch = "wasm32")]
            Self::CanvasDom(_) => BackendKind::Canvas,
        }
    }

    /// SVG markup of a headless SVG renderer.
    pub fn to_svg_markup(&self) -> Option<Result<String>> {
        match self {
            Self::Svg(r) => Some(r.surface().to_markup()),
            _ => None,
        }
    }
}

impl RenderBackend for Renderer {
    fn draw(&mut self, request: DrawRequest) -> Result<ShapeHandle> {
        dispatch!(self, r => r.draw(request))
    }

    fn update_attributes(&mut self, handle: ShapeHandle, update: &AttributeUpdate) -> Result<()> {
        dispatch!(self, r => r.update_attributes(handle, update))
    }

    fn remove(&mut self, handle: ShapeHandle) -> Result<()> {
        dispatch!(self, r => r.remove(handle))
    }

    fn create_gradient(&mut self, spec: &GradientSpec) -> Result<GradientRef> {
        dispatch!(self, r => r.create_gradient(spec))
    }

    fn set_gradient_transform(
        &mut self,
        gradient: &GradientRef,
        transform: GradientTransform,
    ) -> Result<()> {
        dispatch!(self, r => r.set_gradient_transform(gradient, transform))
    }

    fn create_clip_path(&mut self, region: ClipRegion) -> Result<ClipPath> {
        dispatch!(self, r => r.create_clip_path(region))
    }

    fn clear_region(&mut self, region: Rect) -> Result<()> {
        dispatch!(self, r => r.clear_region(region))
    }

    fn measure_text(&self, text: &str, style: &TextStyle) -> Size {
        dispatch!(self, r => r.measure_text(text, style))
    }

    fn size(&self) -> Size {
        dispatch!(self, r => r.size())
    }
}
