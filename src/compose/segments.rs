//! Partitioning a track into discrete colored segments.

use crate::error::Result;
use crate::geometry::{arc_path, length_to_angle, CornerMode, LinearTrack, PathSpec, LINE_CAP_RADIUS};
use crate::render::RenderBackend;
use crate::types::{DrawOptions, LineCap, Point, ShapeHandle};

/// How a track is divided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segmentation {
    pub count: u32,
    /// Space between neighbouring segments.
    pub gap: f64,
    /// Stroke thickness of the segments.
    pub thickness: f64,
    pub corner: CornerMode,
}

impl Segmentation {
    fn n(&self) -> f64 {
        f64::from(self.count)
    }

    /// Room taken by the round caps of one segment.
    fn cap(&self) -> f64 {
        if self.corner.is_round() {
            LINE_CAP_RADIUS * self.thickness
        } else {
            0.0
        }
    }

    /// Gap as seen between stroked segment bodies.
    fn visual_gap(&self) -> f64 {
        self.gap + self.cap()
    }
}

/// Shape of the track being segmented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackShape {
    Line,
    /// `closed` when the arc spans a full turn, so the last segment is
    /// followed by a gap too.
    Arc { closed: bool },
}

/// Dash pattern `[segment, gap]` splitting a stroke of `length` into
/// `seg.count` segments.
///
/// Returns `None` for a single segment, which needs no dashes.
pub fn dash_pattern(shape: TrackShape, length: f64, seg: &Segmentation) -> Option<Vec<f64>> {
    if seg.count <= 1 {
        return None;
    }
    let n = seg.n();
    let (gaps, caps) = match shape {
        TrackShape::Arc { closed: true } => (n, n),
        TrackShape::Arc { closed: false } => (n - 1.0, n - 1.0),
        TrackShape::Line => (n - 1.0, n),
    };
    let size = (length - gaps * seg.gap - caps * seg.cap()) / n;
    Some(vec![size.max(0.0), seg.visual_gap()])
}

/// Color for segment `index`, wrapping around the palette.
pub fn palette_color(colors: &[String], index: usize) -> Option<&str> {
    if colors.is_empty() {
        return None;
    }
    colors.get(index % colors.len()).map(String::as_str)
}

/// Horizontal runs `(from, to)` of the segments covering `filled` pixels of
/// a track divided over `total` pixels.
pub fn linear_segment_runs(
    track: &LinearTrack,
    seg: &Segmentation,
    filled: f64,
    total: f64,
) -> Vec<(f64, f64)> {
    if seg.count == 0 || total <= 0.0 || filled <= 0.0 {
        return Vec::new();
    }
    let n = seg.n();
    let slot = total / n;
    let body = (total - (n - 1.0) * seg.gap - n * seg.cap()) / n;
    let step = body + seg.visual_gap();
    let mut x = track.advance(track.origin(), track.cap_inset());
    let mut remaining = filled - seg.cap();
    let mut runs = Vec::new();
    let mut i = 0_u32;
    while i < seg.count && f64::from(i) * slot < filled {
        let width = remaining.min(body).max(0.0);
        runs.push((x, track.advance(x, width)));
        x = track.advance(x, step);
        remaining = (remaining - step).max(0.0);
        i += 1;
    }
    runs
}

/// Draw the segments of a linear fill, cycling through `colors`.
pub fn linear_segments(
    renderer: &mut dyn RenderBackend,
    track: &LinearTrack,
    seg: &Segmentation,
    filled: f64,
    total: f64,
    colors: &[String],
    opacity: f64,
) -> Result<Vec<ShapeHandle>> {
    let mut handles = Vec::new();
    for (i, (from, to)) in linear_segment_runs(track, seg, filled, total).into_iter().enumerate() {
        let mut path = PathSpec::new();
        path.move_to(Point::new(from, track.y))
            .line_to(Point::new(to, track.y));
        let color = palette_color(colors, i).unwrap_or("none");
        handles.push(renderer.draw_path(path, segment_options(color, seg, opacity))?);
    }
    Ok(handles)
}

/// Angular layout of a circular track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcTrack {
    pub center: Point,
    pub radius: f64,
    pub start_angle: f64,
    /// Degrees covered by the whole track.
    pub total_angle: f64,
    /// Stroke length of the whole track.
    pub length: f64,
    pub rtl: bool,
}

impl ArcTrack {
    fn angle_of(&self, length: f64) -> f64 {
        length_to_angle(length, self.length, self.total_angle)
    }

    fn turn(&self, from: f64, by: f64) -> f64 {
        if self.rtl {
            from - by
        } else {
            from + by
        }
    }
}

/// Angle windows `(start, end)` of the segments covering `sweep` degrees.
///
/// Angles are left unwrapped; callers normalize them when drawing.
pub fn circular_segment_arcs(
    track: &ArcTrack,
    seg: &Segmentation,
    sweep: f64,
    closed: bool,
) -> Vec<(f64, f64)> {
    if seg.count == 0 || track.length <= 0.0 || sweep <= 0.0 {
        return Vec::new();
    }
    let n = seg.n();
    let cap_trim = if seg.corner.is_round() && closed {
        track.angle_of(LINE_CAP_RADIUS / 2.0 * seg.thickness)
    } else {
        0.0
    };
    let end = sweep - cap_trim;
    let gaps = if closed { n } else { n - 1.0 };
    let size = (track.length - gaps * seg.gap - gaps * seg.cap()) / n;
    let slot = track.angle_of(track.length / n) - cap_trim;
    let body = track.angle_of(size);
    let gap = track.angle_of(seg.visual_gap());
    if body <= 0.0 || slot <= 0.0 {
        return Vec::new();
    }
    let left = end - gap * (end / slot).floor();
    let limit = track.turn(track.start_angle, end);
    let mut start = track.start_angle;
    let mut window_end = track.turn(start, body);
    let mut arcs = Vec::new();
    let mut i = 0_u32;
    while i < seg.count && f64::from(i) * body < left {
        let segment_end = if track.rtl {
            limit.max(window_end)
        } else {
            limit.min(window_end)
        };
        arcs.push((start, segment_end));
        start = track.turn(segment_end, gap);
        window_end = track.turn(window_end, body + gap);
        i += 1;
    }
    arcs
}

/// Draw the segments of a circular fill, cycling through `colors`.
pub fn circular_segments(
    renderer: &mut dyn RenderBackend,
    track: &ArcTrack,
    seg: &Segmentation,
    sweep: f64,
    closed: bool,
    colors: &[String],
    opacity: f64,
) -> Result<Vec<ShapeHandle>> {
    let mut handles = Vec::new();
    for (i, (from, to)) in circular_segment_arcs(track, seg, sweep, closed)
        .into_iter()
        .enumerate()
    {
        let path = arc_path(
            track.center,
            track.radius,
            from.rem_euclid(360.0),
            to.rem_euclid(360.0),
            track.rtl,
            false,
        );
        let color = palette_color(colors, i).unwrap_or("none");
        handles.push(renderer.draw_path(path, segment_options(color, seg, opacity))?);
    }
    Ok(handles)
}

fn segment_options(color: &str, seg: &Segmentation, opacity: f64) -> DrawOptions {
    let options = DrawOptions::stroked(color, seg.thickness).with_opacity(opacity);
    if seg.corner.is_round() {
        options.with_line_cap(LineCap::Round)
    } else {
        options
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn seg(count: u32, gap: f64, corner: CornerMode) -> Segmentation {
        Segmentation {
            count,
            gap,
            thickness: 10.0,
            corner,
        }
    }

    fn track(rtl: bool) -> LinearTrack {
        LinearTrack {
            x: 10.0,
            y: 15.0,
            length: 180.0,
            thickness: 10.0,
            rtl,
            corner: CornerMode::Square,
        }
    }

    #[test]
    fn dash_pattern_fills_line() {
        let dash = dash_pattern(TrackShape::Line, 180.0, &seg(4, 4.0, CornerMode::Square)).unwrap();
        assert_eq!(dash, vec![42.0, 4.0]);
        assert!(dash_pattern(TrackShape::Line, 180.0, &seg(1, 4.0, CornerMode::Square)).is_none());
    }

    #[test]
    fn closed_arc_has_gap_after_last_segment() {
        let dash =
            dash_pattern(TrackShape::Arc { closed: true }, 100.0, &seg(5, 4.0, CornerMode::Square))
                .unwrap();
        assert_eq!(dash[0], 16.0);
    }

    #[test]
    fn palette_wraps() {
        let colors = vec!["red".to_string(), "blue".to_string()];
        assert_eq!(palette_color(&colors, 3), Some("blue"));
        assert_eq!(palette_color(&[], 0), None);
    }

    #[test]
    fn runs_cover_track_with_gaps() {
        let runs = linear_segment_runs(&track(false), &seg(3, 6.0, CornerMode::Square), 180.0, 180.0);
        assert_eq!(runs.len(), 3);
        let covered: f64 = runs.iter().map(|(a, b)| b - a).sum();
        assert!((covered + 2.0 * 6.0 - 180.0).abs() < 1e-9);
        assert_eq!(runs[0].0, 10.0);
    }

    #[test]
    fn partial_fill_truncates_last_run() {
        let runs = linear_segment_runs(&track(true), &seg(3, 6.0, CornerMode::Square), 70.0, 180.0);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0], (190.0, 134.0));
        assert!((runs[1].1 - 120.0).abs() < 1e-9);
    }
}
