//! Progress bar component built on the renderer and the scheduler.
//!
//! A [`ProgressBar`] draws its track, fill, buffer and label through any
//! [`RenderBackend`] and registers its transitions with a [`Scheduler`]. The
//! host owns both and keeps ticking the scheduler; completed transitions
//! come back as [`ProgressEvent::AnimationComplete`] via
//! [`ProgressBar::completions`].

mod circular;
pub mod config;
mod label;
mod linear;
mod snapshot;

pub use config::{
    resolve_length, AnimationSettings, CornerRadius, LabelStyle, Margin, ProgressConfig,
    ProgressRole, ProgressType, TextAlignment,
};
pub use label::linear_label_x;
pub use snapshot::{render_svg, SvgSnapshot};

use serde::Serialize;
use tracing::debug;

use crate::animation::{AnimationEvent, AnimationId, AnimationRequest, CompletionPayload, Scheduler};
use crate::compose::{RangeDomain, Segmentation};
use crate::error::Result;
use crate::geometry::fraction;
use crate::render::RenderBackend;
use crate::types::{AttributeUpdate, ClipPath, GradientRef, Point, Rect, ShapeHandle, Size};

/// Notifications raised while rendering and animating.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "name", rename_all = "camelCase")]
pub enum ProgressEvent {
    /// The value was set to something other than the maximum.
    ValueChanged(CompletionPayload),
    /// The value reached the maximum.
    ProgressCompleted(CompletionPayload),
    /// The label is about to be drawn with this text and color.
    TextRender(TextRenderArgs),
    /// A fill transition finished (once per loop for active bars).
    AnimationComplete(CompletionPayload),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRenderArgs {
    pub text: String,
    pub color: String,
}

/// Handles of everything drawn, kept for in-place refresh.
#[derive(Debug, Default)]
struct Parts {
    track: Option<ShapeHandle>,
    /// Single fill path.
    progress: Option<ShapeHandle>,
    /// Segments or range bands replacing the single fill path.
    pieces: Vec<ShapeHandle>,
    buffer: Vec<ShapeHandle>,
    active: Option<ShapeHandle>,
    label: Option<ShapeHandle>,
    clip: Option<ClipPath>,
    buffer_clip: Option<ClipPath>,
    label_clip: Option<ClipPath>,
    striped: Option<GradientRef>,
}

/// Geometry of a circular bar, fixed at render time.
#[derive(Debug, Clone, Copy, Default)]
struct Dial {
    center: Point,
    total_angle: f64,
    track_end: f64,
    track_radius: f64,
    progress_radius: f64,
}

/// A linear or circular progress indicator.
pub struct ProgressBar {
    id: String,
    config: ProgressConfig,
    size: Size,
    rect: Rect,
    parts: Parts,
    dial: Dial,
    track_length: f64,
    progress_length: f64,
    buffer_width: f64,
    /// Dash pattern shared by the track and the fill.
    dash: Option<Vec<f64>>,
    previous_width: f64,
    /// Where the circular reveal wedge last settled.
    reveal_end: Option<f64>,
    previous_total: f64,
    label_delay: f64,
    animations: Vec<AnimationId>,
}

impl ProgressBar {
    /// Validate `config`; `id` prefixes the ids of drawn elements.
    pub fn new(id: &str, config: ProgressConfig) -> Result<Self> {
        config.validate()?;
        let size = config.surface_size(None);
        let rect = config.progress_rect(size);
        Ok(Self {
            id: id.to_string(),
            config,
            size,
            rect,
            parts: Parts::default(),
            dial: Dial::default(),
            track_length: 0.0,
            progress_length: 0.0,
            buffer_width: 0.0,
            dash: None,
            previous_width: 0.0,
            reveal_end: None,
            previous_total: 0.0,
            label_delay: 0.0,
            animations: Vec::new(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &ProgressConfig {
        &self.config
    }

    /// Surface size the bar lays itself out in.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Drawing area inside the margins.
    pub fn progress_rect(&self) -> Rect {
        self.rect
    }

    /// Position of the value in the domain; `0` when unset or out of range.
    pub fn fraction(&self) -> f64 {
        self.config
            .value
            .map_or(0.0, |v| fraction(v, self.config.minimum, self.config.maximum))
    }

    /// Length of the linear fill, `fraction * track width`.
    pub fn progress_width(&self) -> f64 {
        self.rect.width * self.fraction()
    }

    /// Text of the value label: the custom text, or the rounded percentage.
    pub fn label_text(&self) -> String {
        if self.config.label_style.text.is_empty() {
            format!("{}%", (self.fraction() * 100.0).round())
        } else {
            self.config.label_style.text.clone()
        }
    }

    /// Draw everything. The container size of `renderer` is used for
    /// dimensions the configuration leaves open.
    pub fn render(
        &mut self,
        renderer: &mut dyn RenderBackend,
        scheduler: &mut Scheduler,
    ) -> Result<Vec<ProgressEvent>> {
        let container = renderer.size();
        self.size = self
            .config
            .surface_size((!container.is_empty()).then_some(container));
        self.rect = self.config.progress_rect(self.size);
        debug!(
            id = %self.id,
            kind = ?self.config.kind,
            value = ?self.config.value,
            width = self.size.width,
            height = self.size.height,
            "progress render"
        );
        let mut events = vec![self.value_event()];
        if self.config.is_linear() {
            self.render_linear_track(renderer)?;
            self.render_linear_progress(renderer, scheduler, false)?;
        } else {
            self.render_circular_track(renderer)?;
            self.render_circular_progress(renderer, scheduler, false)?;
        }
        if self.config.show_progress_value && !self.config.is_indeterminate {
            events.extend(self.render_label(renderer, scheduler)?);
        }
        Ok(events)
    }

    /// Change the value and refresh the fill in place, animating from the
    /// previous extent.
    pub fn set_value(
        &mut self,
        value: f64,
        renderer: &mut dyn RenderBackend,
        scheduler: &mut Scheduler,
    ) -> Result<Vec<ProgressEvent>> {
        self.config.value = Some(value);
        self.config.validate()?;
        debug!(id = %self.id, value, "progress refresh");
        let events = vec![self.value_event()];
        let previous = if self.config.is_linear() {
            self.previous_width
        } else {
            self.previous_total
        };
        if self.config.is_linear() {
            self.render_linear_progress(renderer, scheduler, true)?;
        } else {
            self.render_circular_progress(renderer, scheduler, true)?;
        }
        if self.parts.label.is_some() {
            self.refresh_label(renderer, scheduler, previous)?;
        }
        Ok(events)
    }

    /// Translate scheduler completions of this bar's transitions.
    pub fn completions(&self, events: &[AnimationEvent]) -> Vec<ProgressEvent> {
        events
            .iter()
            .filter_map(|event| match event {
                AnimationEvent::Completed {
                    id,
                    payload: Some(payload),
                    ..
                } if self.animations.contains(id) => {
                    Some(ProgressEvent::AnimationComplete(payload.clone()))
                }
                AnimationEvent::Completed { .. } | AnimationEvent::Failed { .. } => None,
            })
            .collect()
    }

    /// Stop every transition and looping effect of this bar.
    pub fn stop(&mut self, scheduler: &mut Scheduler) {
        let stopped = self
            .animations
            .drain(..)
            .filter(|id| scheduler.stop(*id))
            .count();
        debug!(id = %self.id, stopped, "progress stopped");
    }

    fn value_event(&self) -> ProgressEvent {
        let payload = self.payload();
        if self.config.value == Some(self.config.maximum) {
            ProgressEvent::ProgressCompleted(payload)
        } else {
            ProgressEvent::ValueChanged(payload)
        }
    }

    fn payload(&self) -> CompletionPayload {
        CompletionPayload {
            value: self.config.value,
            track_color: self.config.track_color(),
            progress_color: self.config.progress_color(),
        }
    }

    fn animate(
        &mut self,
        renderer: &mut dyn RenderBackend,
        scheduler: &mut Scheduler,
        request: AnimationRequest,
    ) -> Result<AnimationId> {
        let id = scheduler.animate(renderer, request)?;
        // Finished, failed and replaced animations are no longer tracked.
        self.animations.retain(|live| scheduler.phase(*live).is_some());
        self.animations.push(id);
        Ok(id)
    }

    fn segmentation(&self, thickness: f64) -> Segmentation {
        Segmentation {
            count: self.config.segment_count,
            gap: self.config.gap_width(),
            thickness,
            corner: self.config.corner(),
        }
    }

    /// Bands span the filled part of the domain.
    fn range_domain(&self) -> RangeDomain {
        RangeDomain {
            minimum: self.config.minimum,
            maximum: self.config.value.unwrap_or(self.config.minimum),
        }
    }

    fn element_id(&self, suffix: &str) -> String {
        format!("{}_{suffix}", self.id)
    }

    /// Drop the segments or bands of a previous render.
    fn clear_pieces(&mut self, renderer: &mut dyn RenderBackend) -> Result<()> {
        for handle in self.parts.pieces.drain(..) {
            renderer.remove(handle)?;
        }
        Ok(())
    }

    /// Every shape that makes up the fill.
    fn fill_shapes(&self) -> Vec<ShapeHandle> {
        self.parts
            .progress
            .iter()
            .chain(self.parts.pieces.iter())
            .copied()
            .collect()
    }

    fn clip_shapes(
        renderer: &mut dyn RenderBackend,
        shapes: &[ShapeHandle],
        clip: &ClipPath,
    ) -> Result<()> {
        let update = AttributeUpdate::new().clip(clip.reference.clone());
        for shape in shapes {
            renderer.update_attributes(*shape, &update)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::render::{BackendKind, Renderer};

    fn bar(json: &str) -> (ProgressBar, Renderer, Scheduler) {
        let config = ProgressConfig::from_json(json).unwrap();
        let bar = ProgressBar::new("pb", config).unwrap();
        let renderer = Renderer::headless(BackendKind::Svg, "pb", bar.size());
        (bar, renderer, Scheduler::new())
    }

    #[test]
    fn half_value_reads_fifty_percent() {
        let (mut bar, mut r, mut s) = bar(r#"{"value":50,"showProgressValue":true}"#);
        let events = bar.render(&mut r, &mut s).unwrap();
        assert_eq!(bar.label_text(), "50%");
        assert_eq!(bar.fraction(), 0.5);
        assert_eq!(bar.progress_width(), 0.5 * bar.progress_rect().width);
        assert!(matches!(events.first(), Some(ProgressEvent::ValueChanged(_))));
        assert!(matches!(events.get(1), Some(ProgressEvent::TextRender(_))));
    }

    #[test]
    fn maximum_value_completes() {
        let (mut bar, mut r, mut s) = bar(r#"{"value":100}"#);
        let events = bar.render(&mut r, &mut s).unwrap();
        assert!(matches!(events.as_slice(), [ProgressEvent::ProgressCompleted(_)]));
    }

    #[test]
    fn out_of_range_value_shows_zero() {
        let (bar, _, _) = bar(r#"{"value":150}"#);
        assert_eq!(bar.label_text(), "0%");
        assert_eq!(bar.progress_width(), 0.0);
    }

    #[test]
    fn repeated_refreshes_track_only_live_animations() {
        let (mut bar, mut r, mut s) =
            bar(r#"{"value":10,"showProgressValue":true,"animation":{"enable":true,"duration":100}}"#);
        bar.render(&mut r, &mut s).unwrap();
        let mut now = 0.0;
        for step in 1..=20 {
            bar.set_value(f64::from(step) * 4.0, &mut r, &mut s).unwrap();
            s.tick(now, &mut r).unwrap();
            now += 150.0;
            s.tick(now, &mut r).unwrap();
        }
        bar.set_value(95.0, &mut r, &mut s).unwrap();
        assert!(bar.animations.len() <= s.len());
        assert!(bar.animations.iter().all(|id| s.phase(*id).is_some()));
    }

    #[test]
    fn event_serializes_with_name_tag() {
        let event = ProgressEvent::TextRender(TextRenderArgs {
            text: "5%".into(),
            color: "black".into(),
        });
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"name":"textRender","text":"5%","color":"black"}"#);
    }
}
