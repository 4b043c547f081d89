//! Circular and pie progress rendering.

use super::{Dial, ProgressBar};
use crate::animation::{
    end_value, AnimationRequest, AnimationTarget, Easing, LoopMode, Scheduler,
};
use crate::compose::{
    circular_clip, circular_clip_path, circular_range_bands, circular_segments, dash_pattern,
    refresh_circular_clip, ArcTrack, TrackShape,
};
use crate::error::Result;
use crate::geometry::{
    arc_length, arc_path, progress_angle, total_angle, LINE_CAP_RADIUS, COMPLETE_ANGLE,
};
use crate::progress::resolve_length;
use crate::render::{palette, RenderBackend};
use crate::types::{AttributeUpdate, DrawOptions, LineCap, Paint};

/// Delay of the fill reveal when a buffer is drawn underneath.
const BUFFER_REVEAL_DELAY: f64 = 300.0;
const SPIN_DURATION: f64 = 400.0;
/// Degrees the indeterminate window turns per spin.
const SPIN_STEP: f64 = 72.0;
const SPIN_STEP_SEGMENTED: f64 = 48.0;
const ACTIVE_OPACITY: f64 = 0.5;

/// Angle `by` degrees from `from` in the drawing direction, wrapped.
fn turn(from: f64, by: f64, rtl: bool) -> f64 {
    (if rtl { from - by } else { from + by }).rem_euclid(360.0)
}

impl ProgressBar {
    fn arc_track(&self, total: f64, length: f64) -> ArcTrack {
        ArcTrack {
            center: self.dial.center,
            radius: self.dial.progress_radius,
            start_angle: self.config.start_angle,
            total_angle: total,
            length,
            rtl: self.config.enable_rtl,
        }
    }

    /// Paint options for an arc, filled as a wedge in pie mode.
    fn arc_options(&self, color: &str, thickness: f64, opacity: f64, id: &str) -> DrawOptions {
        let options = if self.config.enable_pie_progress {
            DrawOptions::filled(Paint::color(color))
        } else {
            DrawOptions::stroked(Paint::color(color), thickness)
        };
        options.with_opacity(opacity).with_id(self.element_id(id))
    }

    pub(super) fn render_circular_track(&mut self, renderer: &mut dyn RenderBackend) -> Result<()> {
        let config = &self.config;
        let rtl = config.enable_rtl;
        let start = config.start_angle;
        let total = total_angle(start, config.end_angle);
        let track_thickness = config.track_thickness();
        let thickest = track_thickness.max(config.progress_thickness());
        let available = self.rect.width.min(self.rect.height) / 2.0 - thickest / 2.0;
        let track_radius = resolve_length(&config.radius, available).unwrap_or(available);
        let progress_radius = resolve_length(&config.inner_radius, available).unwrap_or(available);
        self.dial = Dial {
            center: self.rect.center(),
            total_angle: total,
            track_end: turn(start, total, rtl),
            track_radius,
            progress_radius,
        };

        let pie = config.enable_pie_progress;
        let ranges = config.has_ranges();
        self.track_length = arc_length(track_radius, total);
        self.dash = if config.track_segment_disable || pie || ranges {
            None
        } else {
            dash_pattern(
                TrackShape::Arc {
                    closed: total == COMPLETE_ANGLE,
                },
                self.track_length,
                &self.segmentation(track_thickness),
            )
        };

        let mut options = self.arc_options(
            &config.track_color(),
            track_thickness,
            config.track_opacity,
            "Circulartrack",
        );
        if let Some(dash) = &self.dash {
            options = options.with_dash_array(dash.clone());
        }
        if config.corner().is_round() && !pie && !ranges {
            options = options.with_line_cap(LineCap::Round);
        }
        let path = arc_path(self.dial.center, track_radius, start, self.dial.track_end, rtl, pie);
        self.parts.track = Some(renderer.draw_path(path, options)?);
        Ok(())
    }

    pub(super) fn render_circular_progress(
        &mut self,
        renderer: &mut dyn RenderBackend,
        scheduler: &mut Scheduler,
        refresh: bool,
    ) -> Result<()> {
        let config = self.config.clone();
        let dial = self.dial;
        let rtl = config.enable_rtl;
        let start = config.start_angle;
        let thickness = config.progress_thickness();
        let pie = config.enable_pie_progress;
        let indeterminate = config.is_indeterminate;
        let segmented_line = config.track_segment_disable;
        let closed = dial.total_angle == COMPLETE_ANGLE;

        let value = config.value.unwrap_or(config.minimum);
        let progress_end = progress_angle(value, config.minimum, config.maximum, dial.total_angle);
        self.previous_total = progress_end;
        let end_angle = if indeterminate && !segmented_line {
            dial.track_end
        } else {
            turn(start, progress_end, rtl)
        };
        self.progress_length = arc_length(dial.progress_radius, progress_end);
        let full_length = arc_length(dial.progress_radius, dial.total_angle);
        let seg = self.segmentation(thickness);
        let dash = if segmented_line {
            dash_pattern(TrackShape::Arc { closed: false }, self.progress_length, &seg)
        } else {
            dash_pattern(TrackShape::Arc { closed }, full_length, &seg)
        };

        if config.secondary_progress.is_some() && !indeterminate && !refresh {
            self.render_circular_buffer(renderer, scheduler)?;
        }
        if config.value.is_none() {
            return Ok(());
        }

        self.clear_pieces(renderer)?;
        let ranges = config.has_ranges();
        if !config.segment_colors.is_empty() && !indeterminate && !pie {
            self.remove_circular_path(renderer)?;
            let track = if segmented_line {
                self.arc_track(progress_end, self.progress_length)
            } else {
                self.arc_track(dial.total_angle, full_length)
            };
            self.parts.pieces = circular_segments(
                renderer,
                &track,
                &seg,
                progress_end,
                closed,
                &config.segment_colors,
                config.progress_opacity,
            )?;
        } else if ranges && !indeterminate {
            self.remove_circular_path(renderer)?;
            let track = self.arc_track(dial.total_angle, full_length);
            self.parts.pieces = circular_range_bands(
                renderer,
                &track,
                self.range_domain(),
                &config.range_colors,
                progress_end,
                thickness,
                config
                    .is_gradient
                    .then(|| self.element_id("CircularRangeGrad"))
                    .as_deref(),
                config.progress_opacity,
            )?
            .into_iter()
            .map(|band| band.shape)
            .collect();
        } else {
            let path = arc_path(dial.center, dial.progress_radius, start, end_angle, rtl, pie);
            match self.parts.progress {
                Some(handle) => {
                    renderer.update_attributes(handle, &AttributeUpdate::new().path(path))?;
                }
                None => {
                    let mut options = self.arc_options(
                        &config.progress_color(),
                        thickness,
                        config.progress_opacity,
                        "Circularprogress",
                    );
                    if let Some(dash) = dash.filter(|_| !pie) {
                        options = options.with_dash_array(dash);
                    }
                    if config.corner().is_round() && (end_angle - start).abs() > f64::EPSILON {
                        options = options.with_line_cap(LineCap::Round);
                    }
                    self.parts.progress = Some(renderer.draw_path(path, options)?);
                }
            }
        }

        let active = config.is_active && !indeterminate && !pie;
        if active {
            self.render_circular_active(renderer, end_angle)?;
        }

        if indeterminate {
            return self.animate_circular_indeterminate(renderer, scheduler, progress_end);
        }
        let looping = active && config.animation.duration > 0.0;
        if !(config.animation.enable || looping) {
            return Ok(());
        }
        let delay = if config.secondary_progress.is_some() {
            BUFFER_REVEAL_DELAY
        } else {
            config.animation.delay
        };
        self.label_delay = delay;
        let reveal_radius = dial.progress_radius + thickness / 2.0;
        let wedge = circular_clip_path(dial.center, reveal_radius, start, end_angle, rtl);
        let clip = match self.parts.clip.clone() {
            Some(clip) => {
                refresh_circular_clip(renderer, &clip, wedge)?;
                clip
            }
            None => {
                let clip = circular_clip(renderer, wedge)?;
                self.parts.clip = Some(clip.clone());
                clip
            }
        };
        let mut shapes = self.fill_shapes();
        shapes.extend(self.parts.active);
        Self::clip_shapes(renderer, &shapes, &clip)?;

        // Round caps poke past both wedge edges; widen it by a cap on each side.
        let mut from = start;
        let mut sweep = progress_end;
        if config.corner().is_round() && progress_end != COMPLETE_ANGLE && progress_end != 0.0 {
            let cap = LINE_CAP_RADIUS / 2.0 * thickness;
            from += if rtl { cap } else { -cap };
            sweep = (sweep + 2.0 * cap).min(COMPLETE_ANGLE);
        }
        let target = end_value(from, sweep, rtl);
        let initial = self.reveal_end.filter(|_| refresh).unwrap_or(from);
        self.reveal_end = Some(target);
        let change = if rtl { initial - target } else { target - initial };
        let mut request = AnimationRequest::new(
            AnimationTarget::Arc {
                shape: clip.shape,
                center: dial.center,
                radius: reveal_radius,
                start_angle: from,
                rtl,
                pie: true,
            },
            initial,
            change,
            config.animation.duration,
        )
        .with_delay(delay)
        .rtl(rtl)
        .hidden_until_start()
        .with_payload(self.payload());
        if looping {
            request = request.looping(LoopMode::Restart);
        }
        self.animate(renderer, scheduler, request)?;
        if let Some(shape) = self.parts.active.filter(|_| looping) {
            self.animate_active_pulse(renderer, scheduler, shape)?;
        }
        Ok(())
    }

    fn remove_circular_path(&mut self, renderer: &mut dyn RenderBackend) -> Result<()> {
        if let Some(handle) = self.parts.progress.take() {
            renderer.remove(handle)?;
        }
        Ok(())
    }

    fn render_circular_active(
        &mut self,
        renderer: &mut dyn RenderBackend,
        end_angle: f64,
    ) -> Result<()> {
        let dial = self.dial;
        let rtl = self.config.enable_rtl;
        let start = self.config.start_angle;
        let path = arc_path(dial.center, dial.progress_radius, start, end_angle, rtl, false);
        match self.parts.active {
            Some(handle) => renderer.update_attributes(handle, &AttributeUpdate::new().path(path)),
            None => {
                let mut options =
                    DrawOptions::stroked(palette::WHITE, self.config.progress_thickness())
                        .with_opacity(ACTIVE_OPACITY)
                        .with_id(self.element_id("CircularActiveProgress"));
                if self.config.corner().is_round() {
                    options = options.with_line_cap(LineCap::Round);
                }
                self.parts.active = Some(renderer.draw_path(path, options)?);
                Ok(())
            }
        }
    }

    fn animate_circular_indeterminate(
        &mut self,
        renderer: &mut dyn RenderBackend,
        scheduler: &mut Scheduler,
        progress_end: f64,
    ) -> Result<()> {
        let dial = self.dial;
        let rtl = self.config.enable_rtl;
        let start = self.config.start_angle;
        let thickness = self.config.progress_thickness();
        let segmented_line = self.config.track_segment_disable;
        let reveal_radius = dial.progress_radius + thickness / 2.0;
        let span = if rtl { -progress_end } else { progress_end };

        let wedge = if segmented_line {
            arc_path(dial.center, reveal_radius, start, dial.track_end, rtl, true)
        } else {
            circular_clip_path(dial.center, reveal_radius, start, turn(start, progress_end, rtl), rtl)
        };
        let clip = match self.parts.clip.clone() {
            Some(clip) => {
                refresh_circular_clip(renderer, &clip, wedge)?;
                clip
            }
            None => {
                let clip = circular_clip(renderer, wedge)?;
                self.parts.clip = Some(clip.clone());
                clip
            }
        };
        Self::clip_shapes(renderer, &self.fill_shapes(), &clip)?;

        let (target, step) = match self.parts.progress {
            Some(shape) if segmented_line => (
                AnimationTarget::ArcWindow {
                    shape,
                    center: dial.center,
                    radius: dial.progress_radius,
                    span,
                    rtl,
                    pie: false,
                },
                SPIN_STEP_SEGMENTED,
            ),
            _ => (
                AnimationTarget::ArcWindow {
                    shape: clip.shape,
                    center: dial.center,
                    radius: reveal_radius,
                    span,
                    rtl,
                    pie: true,
                },
                SPIN_STEP,
            ),
        };
        let request = AnimationRequest::new(target, start, step, SPIN_DURATION)
            .rtl(rtl)
            .with_easing(Easing::Linear)
            .looping(LoopMode::Continue);
        self.animate(renderer, scheduler, request)?;
        Ok(())
    }

    fn render_circular_buffer(
        &mut self,
        renderer: &mut dyn RenderBackend,
        scheduler: &mut Scheduler,
    ) -> Result<()> {
        let config = self.config.clone();
        let Some(secondary) = config.secondary_progress else {
            return Ok(());
        };
        let dial = self.dial;
        let rtl = config.enable_rtl;
        let start = config.start_angle;
        let thickness = config.progress_thickness();
        let pie = config.enable_pie_progress;
        let ranges = config.has_ranges();
        let buffer_end = progress_angle(secondary, config.minimum, config.maximum, dial.total_angle);
        let end = turn(start, buffer_end, rtl);
        let full_length = arc_length(dial.progress_radius, dial.total_angle);
        let seg = self.segmentation(thickness);

        self.parts.buffer = if !config.segment_colors.is_empty() && !ranges {
            let track = self.arc_track(dial.total_angle, full_length);
            circular_segments(
                renderer,
                &track,
                &seg,
                buffer_end,
                dial.total_angle == COMPLETE_ANGLE,
                &config.segment_colors,
                config.buffer_opacity,
            )?
        } else {
            let mut options = self.arc_options(
                &config.progress_color(),
                thickness,
                config.buffer_opacity,
                "Circularbuffer",
            );
            if let Some(dash) = self.dash.as_ref().filter(|_| !pie && !ranges) {
                options = options.with_dash_array(dash.clone());
            }
            if config.corner().is_round() && !ranges {
                options = options.with_line_cap(LineCap::Round);
            }
            let path = arc_path(dial.center, dial.progress_radius, start, end, rtl, pie);
            vec![renderer.draw_path(path, options)?]
        };

        if config.animation.enable && !config.is_active {
            let reveal_radius = dial.progress_radius + thickness / 2.0;
            let clip = circular_clip(
                renderer,
                circular_clip_path(dial.center, reveal_radius, start, end, rtl),
            )?;
            let buffer = self.parts.buffer.clone();
            Self::clip_shapes(renderer, &buffer, &clip)?;
            let request = AnimationRequest::new(
                AnimationTarget::Arc {
                    shape: clip.shape,
                    center: dial.center,
                    radius: reveal_radius,
                    start_angle: start,
                    rtl,
                    pie: true,
                },
                start,
                buffer_end,
                config.animation.duration,
            )
            .with_delay(config.animation.delay)
            .rtl(rtl)
            .hidden_until_start()
            .with_payload(self.payload());
            self.animate(renderer, scheduler, request)?;
            self.parts.buffer_clip = Some(clip);
        }
        Ok(())
    }
}
