//! Reveal masks for animated progress.

use crate::error::Result;
use crate::geometry::{arc_path, LinearTrack, PathSpec};
use crate::render::RenderBackend;
use crate::types::{AttributeUpdate, ClipPath, ClipRegion, Point, Rect};

/// Rectangle exposing `fraction` of a linear track.
///
/// The rectangle spans the stroke thickness around the track's center line
/// and, for round caps, reaches past both ends by the cap radius. Under
/// `rtl` it starts just right of the track and reveals by sliding left by
/// its own width. A label mask always sits on the left edge.
pub fn linear_clip_rect(track: &LinearTrack, fraction: f64, label: bool) -> Rect {
    let from_right = track.rtl && !label;
    let mut x = if from_right { track.origin() } else { track.x };
    if track.corner.is_round() {
        x += if from_right {
            track.cap_inset()
        } else {
            -track.cap_inset()
        };
    }
    Rect::new(
        x,
        track.y - track.thickness / 2.0,
        track.length * fraction + track.cap_extent(),
        track.thickness,
    )
}

/// Create a linear reveal mask.
pub fn linear_clip(
    renderer: &mut dyn RenderBackend,
    track: &LinearTrack,
    fraction: f64,
    label: bool,
) -> Result<ClipPath> {
    renderer.create_clip_path(ClipRegion::Rect(linear_clip_rect(track, fraction, label)))
}

/// Resize an existing linear mask in place.
pub fn refresh_linear_clip(
    renderer: &mut dyn RenderBackend,
    clip: &ClipPath,
    rect: &Rect,
) -> Result<()> {
    renderer.update_attributes(clip.shape, &AttributeUpdate::new().x(rect.x).width(rect.width))
}

/// Pie wedge of `radius` from `start` to `end` degrees.
pub fn circular_clip_path(center: Point, radius: f64, start: f64, end: f64, rtl: bool) -> PathSpec {
    arc_path(center, radius, start, end, rtl, true)
}

/// Create a circular reveal mask.
pub fn circular_clip(renderer: &mut dyn RenderBackend, path: PathSpec) -> Result<ClipPath> {
    path.validate()?;
    renderer.create_clip_path(ClipRegion::Path(path))
}

/// Replace the wedge of an existing circular mask.
pub fn refresh_circular_clip(
    renderer: &mut dyn RenderBackend,
    clip: &ClipPath,
    path: PathSpec,
) -> Result<()> {
    renderer.update_attributes(clip.shape, &AttributeUpdate::new().path(path))
}
