//! Linear progress bar rendering.

use super::ProgressBar;
use crate::animation::{AnimationRequest, AnimationTarget, CompletionPayload, Easing, LoopMode, Scheduler};
use crate::compose::{
    dash_pattern, linear_clip, linear_clip_rect, linear_range_bands, linear_segments,
    refresh_linear_clip, TrackShape,
};
use crate::error::Result;
use crate::geometry::{line_segment_path, LinearTrack};
use crate::render::{palette, RenderBackend};
use crate::types::{
    AttributeUpdate, ClipPath, DrawOptions, GradientSpec, GradientStop, GradientTransform,
    GradientUnits, LineCap, Paint, Point, Rect, ShapeHandle, SpreadMethod,
};

/// Width of one stripe of the striped fill.
const STRIPE_WIDTH: f64 = 30.0;
/// Stripe angle in degrees.
const STRIPE_ROTATION: f64 = -45.0;
/// Distance the stripes scroll per traversal.
const STRIPE_TRAVEL: f64 = 90.0;
const INDETERMINATE_DURATION: f64 = 2500.0;
const INDETERMINATE_LINE_DURATION: f64 = 3500.0;
const ACTIVE_OPACITY: f64 = 0.5;

impl ProgressBar {
    pub(super) fn line(&self, thickness: f64) -> LinearTrack {
        LinearTrack {
            x: self.rect.x,
            y: self.rect.center().y,
            length: self.rect.width,
            thickness,
            rtl: self.config.enable_rtl,
            corner: self.config.corner(),
        }
    }

    /// Stroke length of a fill `width` pixels long on `track`.
    fn stroke_length(track: &LinearTrack, width: f64) -> f64 {
        if track.corner.is_round() && width != 0.0 {
            (width - track.cap_extent()).abs()
        } else {
            width.abs()
        }
    }

    fn round_cap(&self, options: DrawOptions, allowed: bool) -> DrawOptions {
        if allowed && self.config.corner().is_round() {
            options.with_line_cap(LineCap::Round)
        } else {
            options
        }
    }

    pub(super) fn render_linear_track(&mut self, renderer: &mut dyn RenderBackend) -> Result<()> {
        let thickness = self.config.track_thickness();
        let track = self.line(thickness);
        let ranges = self.config.has_ranges();
        self.track_length = Self::stroke_length(&track, self.rect.width);
        self.dash = if ranges || self.config.track_segment_disable {
            None
        } else {
            dash_pattern(TrackShape::Line, self.track_length, &self.segmentation(thickness))
        };

        let mut options = DrawOptions::stroked(Paint::color(self.config.track_color()), thickness)
            .with_opacity(self.config.track_opacity)
            .with_id(self.element_id("Lineartrack"));
        if let Some(dash) = &self.dash {
            options = options.with_dash_array(dash.clone());
        }
        let options = self.round_cap(options, !ranges);
        let path = line_segment_path(&track, self.rect.x, self.rect.width);
        self.parts.track = Some(renderer.draw_path(path, options)?);
        Ok(())
    }

    pub(super) fn render_linear_progress(
        &mut self,
        renderer: &mut dyn RenderBackend,
        scheduler: &mut Scheduler,
        refresh: bool,
    ) -> Result<()> {
        let config = self.config.clone();
        let fraction = self.fraction();
        let thickness = config.progress_thickness();
        let track = self.line(thickness);
        let indeterminate = config.is_indeterminate;
        let full = indeterminate && !config.track_segment_disable;
        let width = self.rect.width * if full { 1.0 } else { fraction };
        let previous_width = self.previous_width;
        self.previous_width = width;
        self.progress_length = Self::stroke_length(&track, width);
        if config.track_segment_disable {
            self.dash = dash_pattern(
                TrackShape::Line,
                self.progress_length,
                &self.segmentation(thickness),
            );
        }

        let striped = config.is_striped && !indeterminate;
        if striped && self.parts.striped.is_none() {
            let spec = GradientSpec::linear(
                Point::new(self.rect.x, 0.0),
                Point::new(self.rect.x + STRIPE_WIDTH, 0.0),
                vec![
                    GradientStop::new(config.progress_color(), 0.5),
                    GradientStop::new(config.progress_color(), 0.5).with_opacity(0.6),
                ],
            )
            .with_id(self.element_id("LinearStriped"))
            .with_units(GradientUnits::UserSpaceOnUse)
            .with_spread(SpreadMethod::Repeat)
            .with_transform(GradientTransform::new(0.0, STRIPE_ROTATION));
            let gradient = renderer.create_linear_gradient(&spec)?;
            if config.animation.enable {
                let request = AnimationRequest::new(
                    AnimationTarget::GradientOffset {
                        gradient: gradient.clone(),
                        rotate: STRIPE_ROTATION,
                    },
                    0.0,
                    STRIPE_TRAVEL,
                    config.animation.duration,
                )
                .with_delay(config.animation.delay)
                .rtl(config.enable_rtl)
                .with_easing(Easing::Linear)
                .looping(LoopMode::Continue);
                self.animate(renderer, scheduler, request)?;
            }
            self.parts.striped = Some(gradient);
        }
        let stroke = match (&self.parts.striped, striped) {
            (Some(gradient), true) => Paint::Gradient(gradient.clone()),
            _ => Paint::color(config.progress_color()),
        };

        if config.secondary_progress.is_some() && !indeterminate && !refresh {
            self.render_linear_buffer(renderer, scheduler)?;
        }
        if config.value.is_none() {
            return Ok(());
        }

        self.clear_pieces(renderer)?;
        let ranges = config.has_ranges();
        if !config.segment_colors.is_empty() && !indeterminate && !ranges {
            self.remove_progress_path(renderer)?;
            let total = if config.track_segment_disable {
                self.progress_length
            } else {
                self.track_length
            };
            self.parts.pieces = linear_segments(
                renderer,
                &track,
                &self.segmentation(thickness),
                width,
                total,
                &config.segment_colors,
                config.progress_opacity,
            )?;
        } else if ranges && !indeterminate {
            self.remove_progress_path(renderer)?;
            self.parts.pieces = linear_range_bands(
                renderer,
                &track,
                self.range_domain(),
                &config.range_colors,
                width,
                config
                    .is_gradient
                    .then(|| self.element_id("LinearRangeGrad"))
                    .as_deref(),
                config.progress_opacity,
            )?
            .into_iter()
            .map(|band| band.shape)
            .collect();
        } else {
            let path = line_segment_path(&track, self.rect.x, width);
            let cap = config.corner().is_round() && fraction > 0.0;
            match self.parts.progress {
                Some(handle) => {
                    let mut update = AttributeUpdate::new().path(path).stroke(stroke);
                    if cap {
                        update = update.line_cap(LineCap::Round);
                    }
                    renderer.update_attributes(handle, &update)?;
                }
                None => {
                    let mut options = DrawOptions::stroked(stroke, thickness)
                        .with_opacity(config.progress_opacity)
                        .with_id(self.element_id("Linearprogress"));
                    if let Some(dash) = self.dash.as_ref().filter(|_| config.segment_count > 1) {
                        options = options.with_dash_array(dash.clone());
                    }
                    let options = self.round_cap(options, cap);
                    self.parts.progress = Some(renderer.draw_path(path, options)?);
                }
            }
        }

        if config.is_active && !indeterminate && !config.is_striped {
            self.render_linear_active(renderer, scheduler, &track, fraction, width)?;
        }

        if config.animation.enable && !indeterminate && !config.is_active && !config.is_striped {
            let mut delay = config.animation.delay;
            if config.secondary_progress.is_some() {
                delay += self.buffer_width - width;
            }
            let delay = delay.max(0.0);
            self.label_delay = delay;
            let rect = linear_clip_rect(&track, fraction, false);
            let clip = self.reveal_clip(renderer, &track, fraction)?;
            Self::clip_shapes(renderer, &self.fill_shapes(), &clip)?;
            let from = if refresh { previous_width } else { 0.0 };
            let payload = self.payload();
            self.animate_linear_clip(renderer, scheduler, &clip, rect, from, delay, Some(payload), false)?;
        }

        if indeterminate {
            let line_mode = config.track_segment_disable;
            let reach = if line_mode { 1.0 } else { fraction };
            let rect = linear_clip_rect(&track, reach, line_mode);
            let clip = match self.parts.clip.clone() {
                Some(clip) => {
                    refresh_linear_clip(renderer, &clip, &rect)?;
                    clip
                }
                None => {
                    let clip = linear_clip(renderer, &track, reach, line_mode)?;
                    self.parts.clip = Some(clip.clone());
                    clip
                }
            };
            Self::clip_shapes(renderer, &self.fill_shapes(), &clip)?;
            self.animate_linear_indeterminate(renderer, scheduler, &track, &clip, rect, width)?;
        }
        Ok(())
    }

    fn remove_progress_path(&mut self, renderer: &mut dyn RenderBackend) -> Result<()> {
        if let Some(handle) = self.parts.progress.take() {
            renderer.remove(handle)?;
        }
        Ok(())
    }

    /// Reuse the fill mask, or create it on first use.
    fn reveal_clip(
        &mut self,
        renderer: &mut dyn RenderBackend,
        track: &LinearTrack,
        fraction: f64,
    ) -> Result<ClipPath> {
        let rect = linear_clip_rect(track, fraction, false);
        match self.parts.clip.clone() {
            Some(clip) => {
                refresh_linear_clip(renderer, &clip, &rect)?;
                Ok(clip)
            }
            None => {
                let clip = linear_clip(renderer, track, fraction, false)?;
                self.parts.clip = Some(clip.clone());
                Ok(clip)
            }
        }
    }

    /// Reveal `rect` through `clip`, starting from `from` pixels.
    ///
    /// Left to right the mask grows; right to left it slides left by the
    /// revealed distance.
    #[allow(clippy::too_many_arguments)]
    fn animate_linear_clip(
        &mut self,
        renderer: &mut dyn RenderBackend,
        scheduler: &mut Scheduler,
        clip: &ClipPath,
        rect: Rect,
        from: f64,
        delay: f64,
        payload: Option<CompletionPayload>,
        looping: bool,
    ) -> Result<()> {
        let animation = self.config.animation;
        let change = rect.width - from;
        let mut request = if self.config.enable_rtl {
            AnimationRequest::new(AnimationTarget::X(clip.shape), rect.x - from, change, animation.duration)
                .rtl(true)
        } else {
            AnimationRequest::new(AnimationTarget::Width(clip.shape), from, change, animation.duration)
        }
        .with_delay(delay)
        .hidden_until_start();
        if let Some(payload) = payload {
            request = request.with_payload(payload);
        }
        if looping {
            request = request.looping(LoopMode::Restart);
        }
        self.animate(renderer, scheduler, request)?;
        Ok(())
    }

    fn render_linear_active(
        &mut self,
        renderer: &mut dyn RenderBackend,
        scheduler: &mut Scheduler,
        track: &LinearTrack,
        fraction: f64,
        width: f64,
    ) -> Result<()> {
        let ranges = self.config.has_ranges();
        let path = line_segment_path(track, self.rect.x, width);
        let active = match self.parts.active {
            Some(handle) => {
                renderer.update_attributes(handle, &AttributeUpdate::new().path(path))?;
                handle
            }
            None => {
                let mut options = DrawOptions::stroked(palette::WHITE, track.thickness)
                    .with_opacity(ACTIVE_OPACITY)
                    .with_id(self.element_id("LinearActiveProgress"));
                if let Some(dash) = self.dash.as_ref().filter(|_| self.config.segment_count > 1 && !ranges) {
                    options = options.with_dash_array(dash.clone());
                }
                let options = self.round_cap(options, fraction > 0.0 && !ranges);
                let handle = renderer.draw_path(path, options)?;
                self.parts.active = Some(handle);
                handle
            }
        };
        if self.config.animation.duration <= 0.0 {
            return Ok(());
        }
        let clip = self.reveal_clip(renderer, track, fraction)?;
        Self::clip_shapes(renderer, &[active], &clip)?;
        let rect = linear_clip_rect(track, fraction, false);
        let payload = self.payload();
        self.animate_linear_clip(renderer, scheduler, &clip, rect, 0.0, 0.0, Some(payload), true)?;
        self.animate_active_pulse(renderer, scheduler, active)
    }

    /// Fade the white overlay from half opacity to none, once per loop.
    pub(super) fn animate_active_pulse(
        &mut self,
        renderer: &mut dyn RenderBackend,
        scheduler: &mut Scheduler,
        active: ShapeHandle,
    ) -> Result<()> {
        let request = AnimationRequest::new(
            AnimationTarget::Opacity(active),
            ACTIVE_OPACITY,
            ACTIVE_OPACITY,
            self.config.animation.duration,
        )
        .rtl(true)
        .looping(LoopMode::Restart);
        self.animate(renderer, scheduler, request)?;
        Ok(())
    }

    fn animate_linear_indeterminate(
        &mut self,
        renderer: &mut dyn RenderBackend,
        scheduler: &mut Scheduler,
        track: &LinearTrack,
        clip: &ClipPath,
        rect: Rect,
        width: f64,
    ) -> Result<()> {
        let rtl = self.config.enable_rtl;
        let far = self.rect.right();
        let request = match self.parts.progress {
            Some(shape) if self.config.track_segment_disable => {
                let start = if rtl { self.rect.x + width } else { -width };
                AnimationRequest::new(
                    AnimationTarget::LinePath {
                        shape,
                        track: *track,
                        width,
                    },
                    start,
                    far + width,
                    INDETERMINATE_LINE_DURATION,
                )
            }
            _ => {
                let start = if rtl { rect.x } else { -rect.width };
                AnimationRequest::new(
                    AnimationTarget::X(clip.shape),
                    start,
                    far + rect.width,
                    INDETERMINATE_DURATION,
                )
            }
        }
        .rtl(rtl)
        .looping(LoopMode::Restart);
        self.animate(renderer, scheduler, request)?;
        Ok(())
    }

    fn render_linear_buffer(
        &mut self,
        renderer: &mut dyn RenderBackend,
        scheduler: &mut Scheduler,
    ) -> Result<()> {
        let config = self.config.clone();
        let Some(secondary) = config.secondary_progress else {
            return Ok(());
        };
        let fraction = crate::geometry::fraction(secondary, config.minimum, config.maximum);
        let thickness = config.progress_thickness();
        let track = self.line(thickness);
        let width = self.rect.width * fraction;
        self.buffer_width = width;
        let ranges = config.has_ranges();

        self.parts.buffer = if !config.segment_colors.is_empty() && !ranges {
            let total = if config.track_segment_disable {
                self.progress_length
            } else {
                self.track_length
            };
            linear_segments(
                renderer,
                &track,
                &self.segmentation(thickness),
                width,
                total,
                &config.segment_colors,
                config.buffer_opacity,
            )?
        } else {
            let mut options = DrawOptions::stroked(Paint::color(config.progress_color()), thickness)
                .with_opacity(config.buffer_opacity)
                .with_id(self.element_id("Linearbuffer"));
            if let Some(dash) = self.dash.as_ref().filter(|_| !ranges) {
                options = options.with_dash_array(dash.clone());
            }
            let options = self.round_cap(options, !ranges);
            let path = line_segment_path(&track, self.rect.x, width);
            vec![renderer.draw_path(path, options)?]
        };

        if config.animation.enable {
            let clip = linear_clip(renderer, &track, fraction, false)?;
            let buffer = self.parts.buffer.clone();
            Self::clip_shapes(renderer, &buffer, &clip)?;
            let rect = linear_clip_rect(&track, fraction, false);
            let payload = self.payload();
            self.animate_linear_clip(
                renderer,
                scheduler,
                &clip,
                rect,
                0.0,
                config.animation.delay,
                Some(payload),
                false,
            )?;
            self.parts.buffer_clip = Some(clip);
        }
        Ok(())
    }
}
