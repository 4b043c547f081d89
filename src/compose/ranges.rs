//! Colored range bands over the filled part of a track.
//!
//! A band outside the valid domain still produces a zero-length shape at the
//! track origin, so band `i` always maps to shape `i`.

use serde::{Deserialize, Serialize};

use super::segments::ArcTrack;
use crate::error::Result;
use crate::geometry::{arc_path, fraction, point_on_circle, LinearTrack, PathSpec};
use crate::render::RenderBackend;
use crate::types::{
    DrawOptions, GradientRef, GradientSpec, GradientStop, GradientUnits, Paint, Point, ShapeHandle,
};

/// Offset applied to the start of every gradient band after the first, so
/// neighbouring bands overlap by a hairline.
const GRADIENT_SEAM: f64 = 0.1;

/// One `{start, end, color}` window of the value domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeColor {
    pub start: f64,
    pub end: f64,
    pub color: String,
}

impl RangeColor {
    pub fn new(start: f64, end: f64, color: impl Into<String>) -> Self {
        Self {
            start,
            end,
            color: color.into(),
        }
    }

    /// Both ends lie inside `[minimum, maximum]`.
    pub fn is_within(&self, minimum: f64, maximum: f64) -> bool {
        (minimum..=maximum).contains(&self.start) && (minimum..=maximum).contains(&self.end)
    }
}

/// Value domain a set of bands is mapped over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeDomain {
    pub minimum: f64,
    pub maximum: f64,
}

/// A drawn band: its shape and, in gradient mode, its gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeBand {
    pub shape: ShapeHandle,
    pub gradient: Option<GradientRef>,
}

/// Start and end `x` of every band along a track `width` pixels long.
pub fn linear_band_spans(
    track: &LinearTrack,
    domain: RangeDomain,
    bands: &[RangeColor],
    width: f64,
    gradient: bool,
) -> Vec<(f64, f64)> {
    let origin = track.origin();
    bands
        .iter()
        .enumerate()
        .map(|(i, band)| {
            if !band.is_within(domain.minimum, domain.maximum) {
                return (origin, origin);
            }
            let at = |v: f64| track.advance(origin, width * fraction(v, domain.minimum, domain.maximum));
            let mut start = at(band.start);
            if gradient && i > 0 {
                start = track.advance(start, -GRADIENT_SEAM);
            }
            (start, at(band.end))
        })
        .collect()
}

/// Draw linear range bands stroked at `thickness`.
///
/// With `gradient_prefix` set, band `i` blends into the next band through the
/// gradient `{prefix}_{i}`, replacing any earlier gradient of that id.
pub fn linear_range_bands(
    renderer: &mut dyn RenderBackend,
    track: &LinearTrack,
    domain: RangeDomain,
    bands: &[RangeColor],
    width: f64,
    gradient_prefix: Option<&str>,
    opacity: f64,
) -> Result<Vec<RangeBand>> {
    let spans = linear_band_spans(track, domain, bands, width, gradient_prefix.is_some());
    let mut drawn = Vec::with_capacity(bands.len());
    for (i, (band, (from, to))) in bands.iter().zip(spans).enumerate() {
        let gradient_ref = match gradient_prefix {
            Some(prefix) => {
                let spec = band_gradient(
                    format!("{prefix}_{i}"),
                    Point::new(from, track.y),
                    Point::new(to, track.y),
                    &band.color,
                    next_color(bands, i),
                );
                Some(renderer.create_linear_gradient(&spec)?)
            }
            None => None,
        };
        let mut path = PathSpec::new();
        path.move_to(Point::new(from, track.y))
            .line_to(Point::new(to, track.y));
        let shape = renderer.draw_path(
            path,
            band_options(band, gradient_ref.as_ref(), track.thickness, opacity),
        )?;
        drawn.push(RangeBand {
            shape,
            gradient: gradient_ref,
        });
    }
    Ok(drawn)
}

/// Start and end angles of every band over `sweep` degrees of `track`.
pub fn circular_band_angles(
    track: &ArcTrack,
    domain: RangeDomain,
    bands: &[RangeColor],
    sweep: f64,
) -> Vec<(f64, f64)> {
    let start = track.start_angle;
    let turn = |by: f64| {
        let angle = if track.rtl { start - by } else { start + by };
        angle.rem_euclid(360.0)
    };
    bands
        .iter()
        .map(|band| {
            if !band.is_within(domain.minimum, domain.maximum) {
                return (start, start);
            }
            let angle = |v: f64| sweep * fraction(v, domain.minimum, domain.maximum);
            (turn(angle(band.start)), turn(angle(band.end)))
        })
        .collect()
}

/// Draw circular range bands as bare arcs stroked at `thickness`.
/// `gradient_prefix` works as in [`linear_range_bands`].
#[allow(clippy::too_many_arguments)]
pub fn circular_range_bands(
    renderer: &mut dyn RenderBackend,
    track: &ArcTrack,
    domain: RangeDomain,
    bands: &[RangeColor],
    sweep: f64,
    thickness: f64,
    gradient_prefix: Option<&str>,
    opacity: f64,
) -> Result<Vec<RangeBand>> {
    let angles = circular_band_angles(track, domain, bands, sweep);
    let mut drawn = Vec::with_capacity(bands.len());
    for (i, (band, (from, to))) in bands.iter().zip(angles).enumerate() {
        let gradient_ref = match gradient_prefix {
            Some(prefix) => {
                let spec = band_gradient(
                    format!("{prefix}_{i}"),
                    point_on_circle(track.center, track.radius, from),
                    point_on_circle(track.center, track.radius, to),
                    &band.color,
                    next_color(bands, i),
                );
                Some(renderer.create_linear_gradient(&spec)?)
            }
            None => None,
        };
        let path = arc_path(track.center, track.radius, from, to, track.rtl, false);
        let shape = renderer.draw_path(
            path,
            band_options(band, gradient_ref.as_ref(), thickness, opacity),
        )?;
        drawn.push(RangeBand {
            shape,
            gradient: gradient_ref,
        });
    }
    Ok(drawn)
}

fn next_color(bands: &[RangeColor], i: usize) -> &str {
    bands
        .get(i + 1)
        .or_else(|| bands.get(i))
        .map_or("none", |b| b.color.as_str())
}

/// Gradient blending a band into the next one over its second half.
fn band_gradient(id: String, start: Point, end: Point, color: &str, next: &str) -> GradientSpec {
    GradientSpec::linear(
        start,
        end,
        vec![GradientStop::new(color, 0.5), GradientStop::new(next, 1.0)],
    )
    .with_id(id)
    .with_units(GradientUnits::UserSpaceOnUse)
}

fn band_options(
    band: &RangeColor,
    gradient: Option<&GradientRef>,
    thickness: f64,
    opacity: f64,
) -> DrawOptions {
    let stroke = gradient.map_or_else(
        || Paint::color(band.color.as_str()),
        |g| Paint::Gradient(g.clone()),
    );
    DrawOptions::stroked(stroke, thickness).with_opacity(opacity)
}
