//! Headless rendering of a progress bar to SVG markup.

use tracing::debug;

use super::{ProgressBar, ProgressConfig, ProgressEvent};
use crate::animation::Scheduler;
use crate::error::{DrawkitError, Result};
use crate::render::{BackendKind, Renderer};

/// Simulated frame interval in milliseconds.
const FRAME_MS: f64 = 16.0;
/// Time past the configured animation by which every one-shot transition
/// (buffer delay, label fade) has finished.
const SETTLE_MARGIN_MS: f64 = 1000.0;

/// Final markup of a settled render and everything it emitted.
#[derive(Debug, Clone)]
pub struct SvgSnapshot {
    pub markup: String,
    pub events: Vec<ProgressEvent>,
}

/// Render `config` into an in-memory SVG document, play one-shot transitions
/// to the end and stop looping effects.
pub fn render_svg(id: &str, config: ProgressConfig) -> Result<SvgSnapshot> {
    let mut bar = ProgressBar::new(id, config)?;
    let mut renderer = Renderer::headless(BackendKind::Svg, id, bar.size());
    let mut scheduler = Scheduler::new();
    let mut events = bar.render(&mut renderer, &mut scheduler)?;

    let animation = bar.config().animation;
    let limit = animation.delay + animation.duration + SETTLE_MARGIN_MS;
    let mut now = 0.0;
    let mut frames = 0_u32;
    while !scheduler.is_idle() && now <= limit {
        let completed = scheduler.tick(now, &mut renderer)?;
        events.extend(bar.completions(&completed));
        now += FRAME_MS;
        frames += 1;
    }
    bar.stop(&mut scheduler);
    debug!(id, frames, events = events.len(), "snapshot settled");

    let markup = renderer
        .to_svg_markup()
        .ok_or_else(|| DrawkitError::Render("snapshot renderer is not SVG".to_string()))??;
    Ok(SvgSnapshot { markup, events })
}
