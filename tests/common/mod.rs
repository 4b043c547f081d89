//! Common test utilities and assertion helpers.
//!
//! Builders for headless renderers and progress bars, plus helpers for
//! driving the scheduler and reading back what was drawn.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use drawkit::animation::{AnimationEvent, Scheduler};
use drawkit::progress::{ProgressBar, ProgressConfig, ProgressEvent};
use drawkit::render::{BackendKind, Renderer, SvgRenderer, SvgTree};
use drawkit::{RenderBackend, ShapeHandle, Size};

/// Simulated frame interval in milliseconds.
pub const FRAME_MS: f64 = 16.0;

// ============================================================================
// Assertions
// ============================================================================

/// Assert two floats agree within `1e-6`.
#[track_caller]
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

/// Assert two floats agree within `tolerance`.
#[track_caller]
pub fn assert_near(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} ± {tolerance}, got {actual}"
    );
}

// ============================================================================
// Renderers
// ============================================================================

/// A headless SVG renderer over a 200x100 document.
#[must_use]
pub fn svg_renderer() -> SvgRenderer<SvgTree> {
    SvgRenderer::new(SvgTree::new("test", Size::new(200.0, 100.0)), "test")
}

/// Value of attribute `name` on the node behind `handle`.
#[must_use]
pub fn svg_attr(renderer: &SvgRenderer<SvgTree>, handle: ShapeHandle, name: &str) -> String {
    let node = renderer.node(handle).expect("shape has no node");
    renderer
        .surface()
        .attribute(*node, name)
        .unwrap_or_else(|| panic!("attribute `{name}` missing"))
        .to_string()
}

/// Markup of a headless SVG [`Renderer`].
#[must_use]
pub fn markup(renderer: &Renderer) -> String {
    renderer
        .to_svg_markup()
        .expect("renderer is not SVG")
        .expect("serialization failed")
}

/// Attribute `name` of the element with id `element_id` in a headless SVG
/// [`Renderer`].
#[must_use]
pub fn element_attr(renderer: &Renderer, element_id: &str, name: &str) -> Option<String> {
    let Renderer::Svg(svg) = renderer else {
        panic!("renderer is not headless SVG");
    };
    let tree = svg.surface();
    let node = tree.find_by_id(element_id)?;
    tree.attribute(node, name).map(str::to_string)
}

// ============================================================================
// Progress bars
// ============================================================================

/// A rendered bar together with the renderer and scheduler it runs on.
pub struct Harness {
    pub bar: ProgressBar,
    pub renderer: Renderer,
    pub scheduler: Scheduler,
    pub events: Vec<ProgressEvent>,
}

impl Harness {
    /// Parse `json`, mount on a headless `kind` renderer and render once.
    pub fn render(json: &str, kind: BackendKind) -> Self {
        let config = ProgressConfig::from_json(json).expect("invalid test config");
        let mut bar = ProgressBar::new("bar", config).expect("config rejected");
        let mut renderer = Renderer::headless(kind, "bar", bar.size());
        let mut scheduler = Scheduler::new();
        let events = bar
            .render(&mut renderer, &mut scheduler)
            .expect("render failed");
        Self {
            bar,
            renderer,
            scheduler,
            events,
        }
    }

    pub fn svg(json: &str) -> Self {
        Self::render(json, BackendKind::Svg)
    }

    /// Tick every [`FRAME_MS`] from `from` through `until`, collecting the
    /// bar's completion events.
    pub fn run(&mut self, from: f64, until: f64) -> Vec<ProgressEvent> {
        let completed = tick_until(&mut self.scheduler, &mut self.renderer, from, until);
        self.bar.completions(&completed)
    }

    pub fn set_value(&mut self, value: f64) -> Vec<ProgressEvent> {
        self.bar
            .set_value(value, &mut self.renderer, &mut self.scheduler)
            .expect("set_value failed")
    }

    pub fn markup(&self) -> String {
        markup(&self.renderer)
    }

    pub fn attr(&self, element_id: &str, name: &str) -> Option<String> {
        element_attr(&self.renderer, &format!("bar_{element_id}"), name)
    }
}

/// Tick `scheduler` every [`FRAME_MS`] from `from` through `until`.
pub fn tick_until(
    scheduler: &mut Scheduler,
    renderer: &mut dyn RenderBackend,
    from: f64,
    until: f64,
) -> Vec<AnimationEvent> {
    let mut events = Vec::new();
    let mut now = from;
    while now <= until {
        events.extend(scheduler.tick(now, renderer).expect("tick failed"));
        now += FRAME_MS;
    }
    events
}
