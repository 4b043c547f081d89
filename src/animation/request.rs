//! Animation request value objects.

use serde::Serialize;

use super::easing::{end_value, Easing};
use crate::error::{DrawkitError, Result};
use crate::geometry::{arc_path, line_segment_path, LinearTrack};
use crate::render::RenderBackend;
use crate::types::{AttributeUpdate, GradientRef, GradientTransform, Point, ShapeHandle};

/// What a looping animation does when a traversal completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum LoopMode {
    /// Start over from the original start value.
    #[default]
    Restart,
    /// Run back from the end value to the start value.
    Swap,
    /// Keep going from the end value by the same change.
    Continue,
}

/// Payload delivered with `animationComplete`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionPayload {
    pub value: Option<f64>,
    pub track_color: String,
    pub progress_color: String,
}

/// State handed to each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Time since the delay elapsed, clamped to the duration.
    pub elapsed: f64,
    pub duration: f64,
    /// Interpolated value.
    pub value: f64,
    /// Whether this is the completion frame.
    pub is_final: bool,
}

/// Percentage counter source for an animated label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LabelCounter {
    /// The animated value is a fill width along a track this long.
    Width { track_width: f64 },
    /// The animated value is an arc end angle.
    Angle { start_angle: f64, total_angle: f64 },
}

impl LabelCounter {
    /// Whole percentage shown for `value`, truncated like the fill it tracks.
    pub fn percent(self, value: f64) -> f64 {
        let ratio = match self {
            Self::Width { track_width } if track_width > 0.0 => value / track_width,
            Self::Angle {
                start_angle,
                total_angle,
            } if total_angle > 0.0 => (value - start_angle) / total_angle,
            _ => 0.0,
        };
        let percent = (ratio * 100.0).trunc();
        if percent > 0.0 {
            percent
        } else {
            0.0
        }
    }
}

/// Horizontal slide of a label, interpolated alongside its counter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelSlide {
    pub start: f64,
    pub change: f64,
    pub rtl: bool,
}

/// Frame callback for [`AnimationTarget::Custom`].
pub type FrameFn = Box<dyn FnMut(&mut dyn RenderBackend, Frame) -> Result<()>>;

/// The visual attribute an animation drives.
pub enum AnimationTarget {
    /// `width` of a rect.
    Width(ShapeHandle),
    /// `x` of a rect, image or text.
    X(ShapeHandle),
    Opacity(ShapeHandle),
    /// Pie or bare arc from a fixed start; the value is the end angle.
    Arc {
        shape: ShapeHandle,
        center: Point,
        radius: f64,
        start_angle: f64,
        rtl: bool,
        pie: bool,
    },
    /// Arc of fixed `span` degrees; the value is its start angle.
    ArcWindow {
        shape: ShapeHandle,
        center: Point,
        radius: f64,
        span: f64,
        rtl: bool,
        pie: bool,
    },
    /// Line segment of fixed `width`; the value is its `x`.
    LinePath {
        shape: ShapeHandle,
        track: LinearTrack,
        width: f64,
    },
    /// Gradient translated by the value, rotated by `rotate` degrees.
    GradientOffset { gradient: GradientRef, rotate: f64 },
    /// Percentage label; shows `final_text` once complete.
    Label {
        shape: ShapeHandle,
        counter: LabelCounter,
        slide: Option<LabelSlide>,
        final_text: String,
    },
    Custom(FrameFn),
}

/// What two animations may not drive at the same time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Slot {
    Shape(ShapeHandle, &'static str),
    Gradient(String),
}

impl AnimationTarget {
    pub(crate) fn slot(&self) -> Option<Slot> {
        match self {
            Self::Width(shape) => Some(Slot::Shape(*shape, "width")),
            Self::X(shape) => Some(Slot::Shape(*shape, "x")),
            Self::Opacity(shape) => Some(Slot::Shape(*shape, "opacity")),
            Self::Arc { shape, .. }
            | Self::ArcWindow { shape, .. }
            | Self::LinePath { shape, .. } => Some(Slot::Shape(*shape, "d")),
            Self::GradientOffset { gradient, .. } => Some(Slot::Gradient(gradient.id.clone())),
            Self::Label { shape, .. } => Some(Slot::Shape(*shape, "text")),
            Self::Custom(_) => None,
        }
    }

    /// Shape whose visibility follows the animation delay.
    pub(crate) fn shape(&self) -> Option<ShapeHandle> {
        match self {
            Self::Width(shape) | Self::X(shape) | Self::Opacity(shape) => Some(*shape),
            Self::Arc { shape, .. }
            | Self::ArcWindow { shape, .. }
            | Self::LinePath { shape, .. }
            | Self::Label { shape, .. } => Some(*shape),
            Self::GradientOffset { .. } | Self::Custom(_) => None,
        }
    }

    /// Push one frame to the renderer.
    pub(crate) fn apply(&mut self, renderer: &mut dyn RenderBackend, frame: Frame) -> Result<()> {
        let value = frame.value;
        match self {
            Self::Width(shape) => {
                renderer.update_attributes(*shape, &AttributeUpdate::new().width(value))
            }
            Self::X(shape) => renderer.update_attributes(*shape, &AttributeUpdate::new().x(value)),
            Self::Opacity(shape) => {
                renderer.update_attributes(*shape, &AttributeUpdate::new().opacity(value))
            }
            Self::Arc {
                shape,
                center,
                radius,
                start_angle,
                rtl,
                pie,
            } => {
                let end = value.rem_euclid(360.0);
                let path = arc_path(*center, *radius, *start_angle, end, *rtl, *pie);
                renderer.update_attributes(*shape, &AttributeUpdate::new().path(path))
            }
            Self::ArcWindow {
                shape,
                center,
                radius,
                span,
                rtl,
                pie,
            } => {
                let path = arc_path(
                    *center,
                    *radius,
                    value.rem_euclid(360.0),
                    (value + *span).rem_euclid(360.0),
                    *rtl,
                    *pie,
                );
                renderer.update_attributes(*shape, &AttributeUpdate::new().path(path))
            }
            Self::LinePath {
                shape,
                track,
                width,
            } => {
                let path = line_segment_path(track, value, *width);
                renderer.update_attributes(*shape, &AttributeUpdate::new().path(path))
            }
            Self::GradientOffset { gradient, rotate } => {
                renderer.set_gradient_transform(gradient, GradientTransform::new(value, *rotate))
            }
            Self::Label {
                shape,
                counter,
                slide,
                final_text,
            } => {
                let text = if frame.is_final {
                    final_text.clone()
                } else {
                    format!("{}%", counter.percent(value))
                };
                let mut update = AttributeUpdate::new().text(text);
                if let Some(slide) = slide {
                    let x = Easing::CosineOut.value(
                        frame.elapsed,
                        slide.start,
                        slide.change,
                        frame.duration,
                        slide.rtl,
                    );
                    update = update.x(x);
                }
                renderer.update_attributes(*shape, &update)
            }
            Self::Custom(f) => f(renderer, frame),
        }
    }
}

impl std::fmt::Debug for AnimationTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.slot() {
            Some(slot) => write!(f, "AnimationTarget({slot:?})"),
            None => f.write_str("AnimationTarget(custom)"),
        }
    }
}

/// One interpolation handed to the [`super::Scheduler`].
#[derive(Debug)]
pub struct AnimationRequest {
    pub target: AnimationTarget,
    /// Traversal length in milliseconds.
    pub duration: f64,
    /// Wait before each traversal, in milliseconds.
    pub delay: f64,
    pub start: f64,
    /// Signed distance covered by one traversal (negated under `rtl`).
    pub change: f64,
    pub rtl: bool,
    pub easing: Easing,
    pub repeat: bool,
    pub loop_mode: LoopMode,
    /// Hide the target shape while the delay runs.
    pub hide_until_start: bool,
    /// Delivered with every completed traversal.
    pub payload: Option<CompletionPayload>,
}

impl AnimationRequest {
    pub fn new(target: AnimationTarget, start: f64, change: f64, duration: f64) -> Self {
        Self {
            target,
            duration,
            delay: 0.0,
            start,
            change,
            rtl: false,
            easing: Easing::CosineOut,
            repeat: false,
            loop_mode: LoopMode::Restart,
            hide_until_start: false,
            payload: None,
        }
    }

    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    pub fn rtl(mut self, rtl: bool) -> Self {
        self.rtl = rtl;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Loop indefinitely until stopped.
    pub fn looping(mut self, mode: LoopMode) -> Self {
        self.repeat = true;
        self.loop_mode = mode;
        self
    }

    pub fn hidden_until_start(mut self) -> Self {
        self.hide_until_start = true;
        self
    }

    pub fn with_payload(mut self, payload: CompletionPayload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Where the first traversal ends.
    pub fn end(&self) -> f64 {
        end_value(self.start, self.change, self.rtl)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, v) in [
            ("duration", self.duration),
            ("delay", self.delay),
            ("start", self.start),
            ("change", self.change),
        ] {
            if !v.is_finite() {
                return Err(DrawkitError::Animation(format!("{name} must be finite, got {v}")));
            }
        }
        if self.duration < 0.0 || self.delay < 0.0 {
            return Err(DrawkitError::Animation(format!(
                "negative timing: duration {} delay {}",
                self.duration, self.delay
            )));
        }
        if self.repeat && self.duration <= 0.0 {
            return Err(DrawkitError::Animation(
                "looping animation needs a positive duration".to_string(),
            ));
        }
        Ok(())
    }
}
