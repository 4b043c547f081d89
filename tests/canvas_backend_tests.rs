//! Canvas backend tests against the recording context.
//!
//! Test categories:
//! - Path replay and parity with the SVG backend
//! - Stroke and text state
//! - Clip paths and gradients
//! - Display list replay on update and removal
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::{assert_close, svg_attr, svg_renderer};
use drawkit::geometry::{arc_path, PathCommand, PathSpec};
use drawkit::render::canvas::{CanvasOp, CanvasPaint};
use drawkit::render::{CanvasRenderer, RecordingCanvas};
use drawkit::types::ImageSource;
use drawkit::{
    AttributeUpdate, ClipRef, ClipRegion, DrawOptions, DrawkitError, GradientSpec, GradientStop,
    GradientUnits, LineCap, Paint, Point, Rect, RenderBackend, Size, TextAnchor, TextStyle,
};

fn canvas() -> CanvasRenderer<RecordingCanvas> {
    CanvasRenderer::new(RecordingCanvas::new(200.0, 100.0), "test")
}

/// Path-building calls only.
fn path_ops(ops: &[CanvasOp]) -> Vec<CanvasOp> {
    ops.iter()
        .filter(|op| {
            matches!(
                op,
                CanvasOp::MoveTo(..)
                    | CanvasOp::LineTo(..)
                    | CanvasOp::QuadraticCurveTo(..)
                    | CanvasOp::BezierCurveTo(..)
                    | CanvasOp::Ellipse(_)
                    | CanvasOp::ClosePath
            )
        })
        .cloned()
        .collect()
}

// ============================================================================
// Path Replay
// ============================================================================

#[test]
fn test_path_matches_svg_geometry() {
    let data = "M0 0 L10 0 L10 10 Z";
    let mut c = canvas();
    c.draw_path_data(data, DrawOptions::stroked("black", 1.0))
        .unwrap();
    let mut s = svg_renderer();
    let handle = s
        .draw_path_data(data, DrawOptions::stroked("black", 1.0))
        .unwrap();

    let from_svg: Vec<CanvasOp> = PathSpec::parse(&svg_attr(&s, handle, "d"))
        .unwrap()
        .commands()
        .iter()
        .map(|command| match *command {
            PathCommand::MoveTo(p) => CanvasOp::MoveTo(p.x, p.y),
            PathCommand::LineTo(p) => CanvasOp::LineTo(p.x, p.y),
            PathCommand::ClosePath => CanvasOp::ClosePath,
            ref other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(path_ops(c.context().ops()), from_svg);
    assert_eq!(
        from_svg,
        vec![
            CanvasOp::MoveTo(0.0, 0.0),
            CanvasOp::LineTo(10.0, 0.0),
            CanvasOp::LineTo(10.0, 10.0),
            CanvasOp::ClosePath,
        ]
    );
}

#[test]
fn test_draw_is_wrapped_in_save_restore() {
    let mut c = canvas();
    c.draw_rect(Rect::new(0.0, 0.0, 5.0, 5.0), DrawOptions::filled("red"))
        .unwrap();
    let ops = c.context().ops();
    assert_eq!(ops.first(), Some(&CanvasOp::Save));
    assert_eq!(ops.last(), Some(&CanvasOp::Restore));
    assert!(ops.contains(&CanvasOp::FillStyle(CanvasPaint::Color("red".to_string()))));
    assert!(!ops.contains(&CanvasOp::Stroke));
}

#[test]
fn test_arc_replays_as_ellipse() {
    let mut c = canvas();
    c.draw_path(
        arc_path(Point::new(60.0, 60.0), 48.0, 0.0, 90.0, false, false),
        DrawOptions::stroked("#0078D6", 4.0),
    )
    .unwrap();
    let arcs: Vec<_> = c
        .context()
        .ops()
        .iter()
        .filter_map(|op| match op {
            CanvasOp::Ellipse(arc) => Some(*arc),
            _ => None,
        })
        .collect();
    assert_eq!(arcs.len(), 1);
    let arc = arcs[0];
    assert_close(arc.center.x, 60.0);
    assert_close(arc.center.y, 60.0);
    assert_close(arc.rx, 48.0);
    assert!(!arc.anticlockwise);
}

#[test]
fn test_curves_replay() {
    let mut c = canvas();
    c.draw_path_data("M 0 0 Q 5 5 10 0 C 1 2 3 4 5 6", DrawOptions::stroked("red", 1.0))
        .unwrap();
    let ops = path_ops(c.context().ops());
    assert_eq!(ops[1], CanvasOp::QuadraticCurveTo(5.0, 5.0, 10.0, 0.0));
    assert_eq!(ops[2], CanvasOp::BezierCurveTo(1.0, 2.0, 3.0, 4.0, 5.0, 6.0));
}

// ============================================================================
// Stroke and Text State
// ============================================================================

#[test]
fn test_stroke_state() {
    let mut c = canvas();
    c.draw_line(
        Point::new(0.0, 15.0),
        Point::new(100.0, 15.0),
        DrawOptions::stroked("#0078D6", 4.0)
            .with_dash_array(vec![4.0, 2.0])
            .with_line_cap(LineCap::Round)
            .with_opacity(0.5),
    )
    .unwrap();
    let ops = c.context().ops();
    assert!(ops.contains(&CanvasOp::GlobalAlpha(0.5)));
    assert!(ops.contains(&CanvasOp::LineWidth(4.0)));
    assert!(ops.contains(&CanvasOp::LineDash(vec![4.0, 2.0])));
    assert!(ops.contains(&CanvasOp::LineCap("round".to_string())));
    assert!(ops.contains(&CanvasOp::Stroke));
    // Lines are never filled.
    assert!(!ops.contains(&CanvasOp::Fill));
}

#[test]
fn test_text_state() {
    let mut c = canvas();
    let style = TextStyle {
        size: 12.0,
        style: "Normal".to_string(),
        weight: "Regular".to_string(),
        anchor: TextAnchor::Middle,
        fill: Paint::color("white"),
        ..TextStyle::default()
    };
    c.create_text("50%", style, Point::new(100.0, 18.0), DrawOptions::default())
        .unwrap();
    let ops = c.context().ops();
    assert!(ops.contains(&CanvasOp::Font("normal normal 12px Segoe UI".to_string())));
    assert!(ops.contains(&CanvasOp::TextAlign("center".to_string())));
    assert!(ops.contains(&CanvasOp::FillText("50%".to_string(), 100.0, 18.0)));
}

#[test]
fn test_measure_text_falls_back_to_estimate() {
    let c = canvas();
    let style = TextStyle {
        size: 10.0,
        ..TextStyle::default()
    };
    let size = c.measure_text("abcd", &style);
    assert_eq!(size, style.approximate_size("abcd"));
}

#[test]
fn test_unattached_surface_measures_zero() {
    let c = CanvasRenderer::new(RecordingCanvas::new(0.0, 0.0), "detached");
    assert_eq!(c.size(), Size::ZERO);
    assert_eq!(c.measure_text("abc", &TextStyle::default()), Size::ZERO);
}

#[test]
fn test_image_replay() {
    let mut c = canvas();
    c.draw_image(
        ImageSource::from_url("logo.png"),
        Rect::new(1.0, 2.0, 3.0, 4.0),
        DrawOptions::default(),
    )
    .unwrap();
    assert!(c
        .context()
        .ops()
        .contains(&CanvasOp::DrawImage("logo.png".to_string(), 1.0, 2.0, 3.0, 4.0)));
}

// ============================================================================
// Clip Paths and Gradients
// ============================================================================

#[test]
fn test_clip_is_applied_before_painting() {
    let mut c = canvas();
    let clip = c
        .create_clip_path(ClipRegion::Rect(Rect::new(10.0, 0.0, 50.0, 30.0)))
        .unwrap();
    let _ = c.context_mut().take_ops();
    c.draw_rect(
        Rect::new(10.0, 0.0, 180.0, 30.0),
        DrawOptions::filled("red").with_clip(clip.reference.clone()),
    )
    .unwrap();
    let ops = c.context().ops();
    let clip_at = ops.iter().position(|op| *op == CanvasOp::Clip).unwrap();
    let fill_at = ops.iter().position(|op| *op == CanvasOp::Fill).unwrap();
    assert!(clip_at < fill_at);
    assert_eq!(ops[2], CanvasOp::MoveTo(10.0, 0.0));
    assert_eq!(ops[3], CanvasOp::LineTo(60.0, 0.0));
}

#[test]
fn test_clip_update_repaints_with_new_region() {
    let mut c = canvas();
    let clip = c
        .create_clip_path(ClipRegion::Rect(Rect::new(10.0, 0.0, 0.0, 30.0)))
        .unwrap();
    c.draw_rect(
        Rect::new(10.0, 0.0, 180.0, 30.0),
        DrawOptions::filled("red").with_clip(clip.reference.clone()),
    )
    .unwrap();
    let _ = c.context_mut().take_ops();
    c.update_attributes(clip.shape, &AttributeUpdate::new().width(90.0))
        .unwrap();
    let ops = c.context().ops();
    assert_eq!(ops[0], CanvasOp::ClearRect(0.0, 0.0, 200.0, 100.0));
    assert!(ops.contains(&CanvasOp::LineTo(100.0, 0.0)));
}

#[test]
fn test_hidden_clip_exposes_nothing() {
    let mut c = canvas();
    let clip = c
        .create_clip_path(ClipRegion::Rect(Rect::new(0.0, 0.0, 50.0, 30.0)))
        .unwrap();
    c.draw_rect(
        Rect::new(0.0, 0.0, 50.0, 30.0),
        DrawOptions::filled("red").with_clip(clip.reference.clone()),
    )
    .unwrap();
    c.update_attributes(clip.shape, &AttributeUpdate::new().visible(false))
        .unwrap();
    let ops = c.context_mut().take_ops();
    let after_clear = ops
        .iter()
        .rposition(|op| matches!(op, CanvasOp::ClearRect(..)))
        .unwrap();
    assert!(!ops[after_clear..].contains(&CanvasOp::Fill));
}

#[test]
fn test_unknown_clip_is_rejected() {
    let mut c = canvas();
    let err = c
        .draw_rect(
            Rect::new(0.0, 0.0, 5.0, 5.0),
            DrawOptions::filled("red").with_clip(ClipRef {
                id: "nowhere".to_string(),
            }),
        )
        .unwrap_err();
    assert!(matches!(err, DrawkitError::Render(_)));
}

#[test]
fn test_user_space_gradient_resolves_to_canvas_gradient() {
    let mut c = canvas();
    let spec = GradientSpec::linear(
        Point::new(0.0, 0.0),
        Point::new(100.0, 0.0),
        vec![GradientStop::new("red", 0.5), GradientStop::new("blue", 1.0)],
    )
    .with_units(GradientUnits::UserSpaceOnUse);
    let gradient = c.create_linear_gradient(&spec).unwrap();
    c.draw_line(
        Point::new(0.0, 15.0),
        Point::new(100.0, 15.0),
        DrawOptions::stroked(Paint::Gradient(gradient), 4.0),
    )
    .unwrap();
    let stroke = c
        .context()
        .ops()
        .iter()
        .find_map(|op| match op {
            CanvasOp::StrokeStyle(paint) => Some(paint.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(
        stroke,
        CanvasPaint::LinearGradient {
            x0: 0.0,
            y0: 0.0,
            x1: 100.0,
            y1: 0.0,
            stops: vec![(0.5, "red".to_string()), (1.0, "blue".to_string())],
        }
    );
}

// ============================================================================
// Display List Replay
// ============================================================================

#[test]
fn test_remove_repaints_remaining_shapes() {
    let mut c = canvas();
    let red = c
        .draw_rect(Rect::new(0.0, 0.0, 5.0, 5.0), DrawOptions::filled("red"))
        .unwrap();
    c.draw_rect(Rect::new(10.0, 0.0, 5.0, 5.0), DrawOptions::filled("blue"))
        .unwrap();
    let _ = c.context_mut().take_ops();
    c.remove(red).unwrap();
    let ops = c.context().ops();
    assert_eq!(ops[0], CanvasOp::ClearRect(0.0, 0.0, 200.0, 100.0));
    assert!(ops.contains(&CanvasOp::FillStyle(CanvasPaint::Color("blue".to_string()))));
    assert!(!ops.contains(&CanvasOp::FillStyle(CanvasPaint::Color("red".to_string()))));
    assert!(c.request(red).is_none());
    assert_eq!(c.shape_count(), 1);
}

#[test]
fn test_text_update_replays_new_content() {
    let mut c = canvas();
    let label = c
        .create_text("10%", TextStyle::default(), Point::new(5.0, 5.0), DrawOptions::default())
        .unwrap();
    let _ = c.context_mut().take_ops();
    c.update_attributes(label, &AttributeUpdate::new().text("20%").x(8.0))
        .unwrap();
    assert!(c
        .context()
        .ops()
        .contains(&CanvasOp::FillText("20%".to_string(), 8.0, 5.0)));
}

#[test]
fn test_clear_region() {
    let mut c = canvas();
    c.draw_rect(Rect::new(10.0, 10.0, 20.0, 20.0), DrawOptions::filled("red"))
        .unwrap();
    c.draw_rect(Rect::new(150.0, 10.0, 20.0, 20.0), DrawOptions::filled("blue"))
        .unwrap();
    c.clear_region(Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
    assert_eq!(c.shape_count(), 1);
}
