//! Value label placement and its counting animation.

use super::{ProgressBar, ProgressEvent, TextAlignment, TextRenderArgs};
use crate::animation::{AnimationRequest, AnimationTarget, LabelCounter, LabelSlide, Scheduler};
use crate::compose::linear_clip_rect;
use crate::error::Result;
use crate::render::{contrast_text_color, palette, RenderBackend};
use crate::types::{
    AttributeUpdate, ClipRegion, DrawOptions, Paint, Point, Rect, Size, TextAnchor, TextStyle,
};

/// Gap between a label and the end of the fill.
const LABEL_PADDING: f64 = 5.0;
const LINEAR_FONT_SIZE: f64 = 12.0;
const CIRCULAR_FONT_SIZE: f64 = 20.0;
const FADE_DURATION: f64 = 400.0;

/// Horizontal center of a linear label.
///
/// The label never sits before the position it would take at the start of
/// the track; `Center` and `Far` follow the fill once it is long enough.
pub fn linear_label_x(
    rect: Rect,
    rtl: bool,
    alignment: TextAlignment,
    text_width: f64,
    progress_width: f64,
) -> f64 {
    let default = if rtl {
        rect.right() - text_width / 2.0
    } else {
        rect.x + text_width / 2.0
    };
    let past_default = |x: f64| if rtl { x <= default } else { x >= default };
    let candidate = match alignment {
        TextAlignment::Near => return default + if rtl { -LABEL_PADDING } else { LABEL_PADDING },
        TextAlignment::Center => {
            if rtl {
                rect.right() - progress_width / 2.0
            } else {
                rect.x + progress_width / 2.0
            }
        }
        TextAlignment::Far => {
            if rtl {
                rect.right() - progress_width + text_width / 2.0 + LABEL_PADDING
            } else {
                rect.x + progress_width - text_width / 2.0 - LABEL_PADDING
            }
        }
    };
    if past_default(candidate) {
        candidate
    } else {
        default
    }
}

impl ProgressBar {
    fn label_color(&self) -> String {
        match &self.config.label_style.color {
            Some(color) => color.clone(),
            None if self.config.is_linear() => {
                contrast_text_color(&self.config.progress_color()).to_string()
            }
            None => palette::FONT.to_string(),
        }
    }

    fn label_style(&self, color: &str) -> TextStyle {
        let style = &self.config.label_style;
        let default_size = if self.config.is_linear() {
            LINEAR_FONT_SIZE
        } else {
            CIRCULAR_FONT_SIZE
        };
        TextStyle {
            size: style.size.unwrap_or(default_size),
            family: style
                .font_family
                .clone()
                .unwrap_or_else(|| "Segoe UI".to_string()),
            style: style.font_style.clone().unwrap_or_else(|| "Normal".to_string()),
            weight: style.font_weight.clone(),
            fill: Paint::color(color),
            anchor: TextAnchor::Middle,
            baseline: None,
        }
    }

    /// Measured size of `text`, estimated on unattached surfaces.
    fn text_size(renderer: &dyn RenderBackend, text: &str, style: &TextStyle) -> Size {
        let measured = renderer.measure_text(text, style);
        if measured.is_empty() {
            style.approximate_size(text)
        } else {
            measured
        }
    }

    fn label_position(&self, text_size: Size) -> Point {
        if self.config.is_linear() {
            let x = linear_label_x(
                self.rect,
                self.config.enable_rtl,
                self.config.label_style.text_alignment,
                text_size.width,
                self.progress_width(),
            );
            Point::new(x, self.rect.center().y + text_size.height / 4.0)
        } else {
            Point::new(
                self.dial.center.x,
                self.dial.center.y + text_size.height / 2.0,
            )
        }
    }

    pub(super) fn render_label(
        &mut self,
        renderer: &mut dyn RenderBackend,
        scheduler: &mut Scheduler,
    ) -> Result<Vec<ProgressEvent>> {
        let text = self.label_text();
        let color = self.label_color();
        let style = self.label_style(&color);
        let size = Self::text_size(renderer, &text, &style);
        let position = self.label_position(size);
        let label = renderer.create_text(
            &text,
            style,
            position,
            DrawOptions::default().with_id(self.element_id("Label")),
        )?;
        self.parts.label = Some(label);

        if self.config.animation.enable {
            if self.config.is_linear() {
                // Keeps the sliding label inside the track horizontally.
                let band = linear_clip_rect(&self.line(self.config.progress_thickness()), 1.0, true);
                let region = Rect::new(band.x, 0.0, band.width, self.size.height);
                let clip = renderer.create_clip_path(ClipRegion::Rect(region))?;
                Self::clip_shapes(renderer, &[label], &clip)?;
                self.parts.label_clip = Some(clip);
            }
            self.animate_label(renderer, scheduler, &text, position.x, size.width, None)?;
        }
        Ok(vec![ProgressEvent::TextRender(TextRenderArgs { text, color })])
    }

    /// Update the label after a value change. `previous` is the fill width
    /// (linear) or swept angle (circular) before the change.
    pub(super) fn refresh_label(
        &mut self,
        renderer: &mut dyn RenderBackend,
        scheduler: &mut Scheduler,
        previous: f64,
    ) -> Result<()> {
        let Some(label) = self.parts.label else {
            return Ok(());
        };
        let text = self.label_text();
        let style = self.label_style(&self.label_color());
        let size = Self::text_size(renderer, &text, &style);
        let position = self.label_position(size);
        renderer.update_attributes(label, &AttributeUpdate::new().text(text.clone()).x(position.x))?;
        if self.config.animation.enable {
            self.animate_label(renderer, scheduler, &text, position.x, size.width, Some(previous))?;
        }
        Ok(())
    }

    /// Count the label up with the fill. Custom text fades in once the fill
    /// is done instead. A first render slides `Center`/`Far` labels in.
    fn animate_label(
        &mut self,
        renderer: &mut dyn RenderBackend,
        scheduler: &mut Scheduler,
        text: &str,
        x: f64,
        text_width: f64,
        previous: Option<f64>,
    ) -> Result<()> {
        let Some(label) = self.parts.label else {
            return Ok(());
        };
        let animation = self.config.animation;
        if !self.config.label_style.text.is_empty() {
            if previous.is_none() {
                let request = AnimationRequest::new(AnimationTarget::Opacity(label), 0.0, 1.0, FADE_DURATION)
                    .with_delay(self.label_delay + animation.duration)
                    .hidden_until_start();
                self.animate(renderer, scheduler, request)?;
            }
            return Ok(());
        }

        let rtl = self.config.enable_rtl;
        let from = previous.unwrap_or(0.0);
        let (counter, start, change) = if self.config.is_linear() {
            let width = self.progress_width();
            (
                LabelCounter::Width {
                    track_width: self.rect.width,
                },
                from,
                width - from,
            )
        } else {
            let start_angle = self.config.start_angle;
            (
                LabelCounter::Angle {
                    start_angle,
                    total_angle: self.dial.total_angle,
                },
                start_angle + from,
                self.previous_total - from,
            )
        };
        let slides = self.config.is_linear()
            && previous.is_none()
            && self.config.label_style.text_alignment != TextAlignment::Near;
        let slide = slides.then(|| {
            let start = if rtl {
                self.rect.right() + text_width / 2.0
            } else {
                (self.rect.x - text_width / 2.0).max(0.0)
            };
            LabelSlide {
                start,
                change: if rtl { start - x } else { x - start },
                rtl,
            }
        });
        let request = AnimationRequest::new(
            AnimationTarget::Label {
                shape: label,
                counter,
                slide,
                final_text: text.to_string(),
            },
            start,
            change,
            animation.duration,
        )
        .with_delay(self.label_delay)
        .hidden_until_start();
        self.animate(renderer, scheduler, request)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::panic)]
mod tests {
    use super::*;
    use crate::progress::{ProgressConfig, ProgressEvent};
    use crate::render::{BackendKind, Renderer};

    const RECT: Rect = Rect::new(10.0, 10.0, 180.0, 10.0);

    #[test]
    fn far_label_follows_fill() {
        assert_eq!(linear_label_x(RECT, false, TextAlignment::Far, 20.0, 90.0), 85.0);
        assert_eq!(linear_label_x(RECT, false, TextAlignment::Far, 20.0, 10.0), 20.0);
        assert_eq!(linear_label_x(RECT, true, TextAlignment::Far, 20.0, 90.0), 115.0);
    }

    #[test]
    fn near_and_center_labels() {
        assert_eq!(linear_label_x(RECT, false, TextAlignment::Near, 20.0, 90.0), 25.0);
        assert_eq!(linear_label_x(RECT, true, TextAlignment::Near, 20.0, 90.0), 175.0);
        assert_eq!(linear_label_x(RECT, false, TextAlignment::Center, 20.0, 90.0), 55.0);
    }

    #[test]
    fn linear_label_contrasts_with_fill() {
        let config = ProgressConfig::from_json(r#"{"value":30,"showProgressValue":true}"#).unwrap();
        let mut bar = ProgressBar::new("lb", config).unwrap();
        let mut r = Renderer::headless(BackendKind::Svg, "lb", bar.size());
        let mut s = Scheduler::new();
        let events = bar.render(&mut r, &mut s).unwrap();
        match events.last() {
            Some(ProgressEvent::TextRender(args)) => {
                assert_eq!(args.text, "30%");
                assert_eq!(args.color, "white");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn animated_label_counts_to_final_text() {
        let config = ProgressConfig::from_json(
            r#"{"value":50,"showProgressValue":true,"animation":{"enable":true,"duration":1000}}"#,
        )
        .unwrap();
        let mut bar = ProgressBar::new("lb", config).unwrap();
        let mut r = Renderer::headless(BackendKind::Svg, "lb", bar.size());
        let mut s = Scheduler::new();
        bar.render(&mut r, &mut s).unwrap();
        assert_eq!(s.len(), 2);
        s.tick(0.0, &mut r).unwrap();
        s.tick(500.0, &mut r).unwrap();
        s.tick(1000.0, &mut r).unwrap();
        assert!(s.is_idle());
        let markup = r.to_svg_markup().unwrap().unwrap();
        assert!(markup.contains(">50%</text>"));
    }

    #[test]
    fn circular_label_refreshes_text() {
        let config =
            ProgressConfig::from_json(r#"{"type":"Circular","value":10,"showProgressValue":true}"#)
                .unwrap();
        let mut bar = ProgressBar::new("cl", config).unwrap();
        let mut r = Renderer::headless(BackendKind::Svg, "cl", bar.size());
        let mut s = Scheduler::new();
        bar.render(&mut r, &mut s).unwrap();
        bar.set_value(60.0, &mut r, &mut s).unwrap();
        let markup = r.to_svg_markup().unwrap().unwrap();
        assert!(markup.contains(">60%</text>"));
        assert!(!markup.contains(">10%</text>"));
    }
}
