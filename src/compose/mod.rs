//! Composition helpers layered on the renderer: segments, range bands and
//! reveal masks.

pub mod clip;
pub mod ranges;
pub mod segments;

pub use clip::{
    circular_clip, circular_clip_path, linear_clip, linear_clip_rect, refresh_circular_clip,
    refresh_linear_clip,
};
pub use ranges::{
    circular_band_angles, circular_range_bands, linear_band_spans, linear_range_bands, RangeBand,
    RangeColor, RangeDomain,
};
pub use segments::{
    circular_segment_arcs, circular_segments, dash_pattern, linear_segment_runs, linear_segments,
    palette_color, ArcTrack, Segmentation, TrackShape,
};
