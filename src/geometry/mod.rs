//! Pure geometry helpers: circle points, arc and line paths, progress fractions.
//!
//! Angles are in degrees, measured clockwise from the 12 o'clock position.

pub mod path;

pub use path::{PathCommand, PathSpec};

use serde::{Deserialize, Serialize};

use crate::types::{Point, Rect};

/// Fraction of the stroke thickness that a round line cap extends past a
/// segment end, counted over both ends.
pub const LINE_CAP_RADIUS: f64 = 0.9;

/// Largest sweep drawn for a "full" circle, so start and end stay distinct.
pub const COMPLETE_ANGLE: f64 = 359.99;

/// Shortest round-trip rendering of a number for attribute strings.
/// Negative zero prints as `0`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

/// How segment ends are finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CornerMode {
    #[default]
    Square,
    Round,
}

impl CornerMode {
    pub fn is_round(self) -> bool {
        matches!(self, Self::Round)
    }
}

/// Point at `angle` degrees on a circle.
pub fn point_on_circle(center: Point, radius: f64, angle: f64) -> Point {
    let radians = (angle - 90.0) * (std::f64::consts::PI / 180.0);
    Point::new(
        center.x + radius * radians.cos(),
        center.y + radius * radians.sin(),
    )
}

/// Large-arc and sweep flags for an arc from `start` to `end`.
///
/// The span is measured in the drawing direction (clockwise, or
/// counter-clockwise under `rtl`) after wrapping by one turn.
pub fn arc_flags(start: f64, end: f64, rtl: bool) -> (bool, bool) {
    let span = if rtl {
        (if start >= end { start } else { start + 360.0 }) - end
    } else {
        (if end >= start { end } else { end + 360.0 }) - start
    };
    (span > 180.0, !rtl)
}

/// Circular arc from `start` to `end` degrees.
///
/// With `as_pie` the path starts at the center, runs out to the arc and
/// closes back, producing a filled wedge.
pub fn arc_path(
    center: Point,
    radius: f64,
    start: f64,
    end: f64,
    rtl: bool,
    as_pie: bool,
) -> PathSpec {
    let from = point_on_circle(center, radius, start);
    let to = point_on_circle(center, radius, end);
    let (large_arc, sweep) = arc_flags(start, end, rtl);
    let mut path = PathSpec::new();
    if as_pie {
        path.move_to(center).line_to(from);
    } else {
        path.move_to(from);
    }
    path.arc_to(radius, radius, 0.0, large_arc, sweep, to);
    if as_pie {
        path.close();
    }
    path
}

/// Horizontal track a linear progress indicator is drawn along.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTrack {
    /// Left edge of the track.
    pub x: f64,
    /// Vertical center line.
    pub y: f64,
    pub length: f64,
    pub thickness: f64,
    pub rtl: bool,
    pub corner: CornerMode,
}

impl LinearTrack {
    /// Half of the cap overshoot; zero for square ends.
    pub fn cap_inset(&self) -> f64 {
        if self.corner.is_round() {
            LINE_CAP_RADIUS / 2.0 * self.thickness
        } else {
            0.0
        }
    }

    /// Full cap overshoot over both ends.
    pub fn cap_extent(&self) -> f64 {
        if self.corner.is_round() {
            LINE_CAP_RADIUS * self.thickness
        } else {
            0.0
        }
    }

    /// Edge the fill grows from (right edge under `rtl`).
    pub fn origin(&self) -> f64 {
        if self.rtl {
            self.x + self.length
        } else {
            self.x
        }
    }

    /// Position `distance` along the track in the fill direction.
    pub fn advance(&self, from: f64, distance: f64) -> f64 {
        if self.rtl {
            from - distance
        } else {
            from + distance
        }
    }
}

/// Straight segment of `width` starting at `x` along `track`.
///
/// Rounded caps shorten the segment by the cap radius at each end so the
/// stroked result keeps the nominal length.
pub fn line_segment_path(track: &LinearTrack, x: f64, width: f64) -> PathSpec {
    let shifted = LinearTrack { x, ..*track };
    let from = shifted.advance(shifted.origin(), track.cap_inset());
    let visible = if track.corner.is_round() && width != 0.0 {
        width - track.cap_extent()
    } else {
        width
    };
    let to = shifted.advance(from, visible);
    let mut path = PathSpec::new();
    path.move_to(Point::new(from, track.y))
        .line_to(Point::new(to, track.y));
    path
}

/// Radius usable for rounded corners of a `width` x `height` box.
pub fn clamp_corner_radius(width: f64, height: f64, radius: f64) -> f64 {
    let mut r = radius.max(0.0);
    if width < 2.0 * r {
        r = width / 2.0;
    }
    if height < 2.0 * r {
        r = height / 2.0;
    }
    r.max(0.0)
}

/// Outline of `rect`, rounded when the clamped radius is positive.
pub fn rect_path(rect: &Rect, corner_radius: f64) -> PathSpec {
    let r = clamp_corner_radius(rect.width, rect.height, corner_radius);
    let (x, y, w, h) = (rect.x, rect.y, rect.width, rect.height);
    let mut path = PathSpec::new();
    if r <= 0.0 {
        path.move_to(Point::new(x, y))
            .line_to(Point::new(x + w, y))
            .line_to(Point::new(x + w, y + h))
            .line_to(Point::new(x, y + h))
            .close();
        return path;
    }
    path.move_to(Point::new(x + r, y))
        .line_to(Point::new(x + w - r, y))
        .arc_to(r, r, 0.0, false, true, Point::new(x + w, y + r))
        .line_to(Point::new(x + w, y + h - r))
        .arc_to(r, r, 0.0, false, true, Point::new(x + w - r, y + h))
        .line_to(Point::new(x + r, y + h))
        .arc_to(r, r, 0.0, false, true, Point::new(x, y + h - r))
        .line_to(Point::new(x, y + r))
        .arc_to(r, r, 0.0, false, true, Point::new(x + r, y))
        .close();
    path
}

/// Position of `value` in `[minimum, maximum]` as a fraction.
///
/// Values outside the range, and empty ranges, map to `0`.
pub fn fraction(value: f64, minimum: f64, maximum: f64) -> f64 {
    let finite = value.is_finite() && minimum.is_finite() && maximum.is_finite();
    if !finite || maximum <= minimum || value < minimum || value > maximum {
        return 0.0;
    }
    (value - minimum) / (maximum - minimum)
}

/// Swept angle for `value` over a track spanning `total_angle` degrees.
pub fn progress_angle(value: f64, minimum: f64, maximum: f64, total_angle: f64) -> f64 {
    fraction(value, minimum, maximum) * total_angle
}

/// Angular span from `start` to `end`; a full or empty turn is capped at
/// [`COMPLETE_ANGLE`].
pub fn total_angle(start: f64, end: f64) -> f64 {
    let mut total = (end - start) % 360.0;
    if total <= 0.0 {
        total += 360.0;
    }
    if total >= 360.0 {
        COMPLETE_ANGLE
    } else {
        total
    }
}

/// Converts a length along an arc track into degrees of that track.
pub fn length_to_angle(length: f64, track_length: f64, total_angle: f64) -> f64 {
    if track_length <= 0.0 {
        return 0.0;
    }
    length / track_length * total_angle
}

/// Length of a circular arc of `angle` degrees.
pub fn arc_length(radius: f64, angle: f64) -> f64 {
    radius * angle.to_radians()
}

/// Center parameterization of an SVG endpoint arc, in the form accepted by
/// Canvas `ellipse()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenterArc {
    pub center: Point,
    pub rx: f64,
    pub ry: f64,
    /// Ellipse rotation in radians.
    pub rotation: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub anticlockwise: bool,
}

/// Converts an endpoint arc into center form.
///
/// Returns `None` when the arc is omitted (coincident endpoints) or degrades
/// to a straight line (a zero radius).
pub fn endpoint_to_center(
    from: Point,
    to: Point,
    rx: f64,
    ry: f64,
    x_rotation: f64,
    large_arc: bool,
    sweep: bool,
) -> Option<CenterArc> {
    if from == to {
        return None;
    }
    let (mut rx, mut ry) = (rx.abs(), ry.abs());
    if rx == 0.0 || ry == 0.0 {
        return None;
    }
    let phi = x_rotation.to_radians();
    let (sin, cos) = phi.sin_cos();
    let dx2 = (from.x - to.x) / 2.0;
    let dy2 = (from.y - to.y) / 2.0;
    let x1p = cos * dx2 + sin * dy2;
    let y1p = -sin * dx2 + cos * dy2;

    let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
    if lambda > 1.0 {
        let scale = lambda.sqrt();
        rx *= scale;
        ry *= scale;
    }

    let num = rx * rx * ry * ry - rx * rx * y1p * y1p - ry * ry * x1p * x1p;
    let den = rx * rx * y1p * y1p + ry * ry * x1p * x1p;
    let mut coef = if den == 0.0 { 0.0 } else { (num / den).max(0.0).sqrt() };
    if large_arc == sweep {
        coef = -coef;
    }
    let cxp = coef * (rx * y1p / ry);
    let cyp = coef * -(ry * x1p / rx);
    let center = Point::new(
        cos * cxp - sin * cyp + (from.x + to.x) / 2.0,
        sin * cxp + cos * cyp + (from.y + to.y) / 2.0,
    );

    let start_angle = vector_angle((1.0, 0.0), ((x1p - cxp) / rx, (y1p - cyp) / ry));
    let mut delta = vector_angle(
        ((x1p - cxp) / rx, (y1p - cyp) / ry),
        ((-x1p - cxp) / rx, (-y1p - cyp) / ry),
    );
    let full = std::f64::consts::TAU;
    if !sweep && delta > 0.0 {
        delta -= full;
    } else if sweep && delta < 0.0 {
        delta += full;
    }

    Some(CenterArc {
        center,
        rx,
        ry,
        rotation: phi,
        start_angle,
        end_angle: start_angle + delta,
        anticlockwise: !sweep,
    })
}

fn vector_angle(u: (f64, f64), v: (f64, f64)) -> f64 {
    (u.0 * v.1 - u.1 * v.0).atan2(u.0 * v.0 + u.1 * v.1)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn twelve_oclock_is_zero_degrees() {
        let p = point_on_circle(Point::new(50.0, 50.0), 10.0, 0.0);
        assert!(close(p.x, 50.0));
        assert!(close(p.y, 40.0));
        let q = point_on_circle(Point::new(50.0, 50.0), 10.0, 90.0);
        assert!(close(q.x, 60.0));
        assert!(close(q.y, 50.0));
    }

    #[test]
    fn total_angle_caps_full_turn() {
        assert_eq!(total_angle(0.0, 360.0), COMPLETE_ANGLE);
        assert_eq!(total_angle(0.0, 0.0), COMPLETE_ANGLE);
        assert_eq!(total_angle(90.0, 180.0), 90.0);
        assert_eq!(total_angle(270.0, 90.0), 180.0);
    }

    #[test]
    fn round_caps_shorten_segment() {
        let track = LinearTrack {
            x: 10.0,
            y: 15.0,
            length: 180.0,
            thickness: 10.0,
            rtl: false,
            corner: CornerMode::Round,
        };
        assert_eq!(
            line_segment_path(&track, 10.0, 100.0).to_path_data(),
            "M 14.5 15 L 105.5 15"
        );
        let rtl = LinearTrack { rtl: true, ..track };
        assert_eq!(
            line_segment_path(&rtl, 10.0, 100.0).to_path_data(),
            "M 185.5 15 L 94.5 15"
        );
    }

    #[test]
    fn endpoint_arc_recovers_circle() {
        let center = Point::new(60.0, 60.0);
        let from = point_on_circle(center, 40.0, 0.0);
        let to = point_on_circle(center, 40.0, 90.0);
        let arc = endpoint_to_center(from, to, 40.0, 40.0, 0.0, false, true).unwrap();
        assert!(close(arc.center.x, 60.0));
        assert!(close(arc.center.y, 60.0));
        assert!(close(arc.end_angle - arc.start_angle, std::f64::consts::FRAC_PI_2));
        assert!(!arc.anticlockwise);
        assert!(endpoint_to_center(from, from, 40.0, 40.0, 0.0, false, true).is_none());
    }
}
