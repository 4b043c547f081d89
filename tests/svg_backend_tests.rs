//! SVG backend tests against the headless `SvgTree` surface.
//!
//! Test categories:
//! - Shape attributes
//! - In-place updates and removal
//! - Gradients and clip paths
//! - Text, images and serialization
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::{svg_attr, svg_renderer};
use drawkit::render::{SvgRenderer, SvgTree};
use drawkit::types::ImageSource;
use drawkit::{
    AttributeUpdate, ClipRegion, DrawOptions, DrawkitError, GradientSpec, GradientStop,
    GradientTransform, LineCap, Paint, Point, Rect, RenderBackend, ShapeHandle, Size, TextAnchor,
    TextStyle,
};

// ============================================================================
// Shape Attributes
// ============================================================================

#[test]
fn test_rect_attributes() {
    let mut r = svg_renderer();
    let handle = r
        .draw_rect(
            Rect::new(10.0, 5.0, 80.0, 20.0),
            DrawOptions::filled("#E6E6E6").with_id("track"),
        )
        .unwrap();
    assert_eq!(svg_attr(&r, handle, "id"), "track");
    assert_eq!(svg_attr(&r, handle, "x"), "10");
    assert_eq!(svg_attr(&r, handle, "width"), "80");
    assert_eq!(svg_attr(&r, handle, "fill"), "#E6E6E6");
    assert_eq!(svg_attr(&r, handle, "opacity"), "1");
}

#[test]
fn test_zero_corner_radius_draws_plain_rect() {
    let mut r = svg_renderer();
    let rect = Rect::new(0.0, 0.0, 40.0, 20.0);
    let plain = r.draw_rect(rect, DrawOptions::filled("red")).unwrap();
    let zero = r
        .draw_rect(rect, DrawOptions::filled("red").with_corner_radius(0.0))
        .unwrap();
    let rounded = r
        .draw_rect(rect, DrawOptions::filled("red").with_corner_radius(30.0))
        .unwrap();

    let tree = r.surface();
    for handle in [plain, zero] {
        assert!(tree.attribute(*r.node(handle).unwrap(), "rx").is_none());
    }
    // Clamped to half the height.
    assert_eq!(svg_attr(&r, rounded, "rx"), "10");
}

#[test]
fn test_path_data_is_emitted_verbatim() {
    let mut r = svg_renderer();
    let handle = r
        .draw_path_data("M0 0 L10 0 L10 10 Z", DrawOptions::stroked("blue", 2.0))
        .unwrap();
    assert_eq!(svg_attr(&r, handle, "d"), "M 0 0 L 10 0 L 10 10 Z");
    assert_eq!(svg_attr(&r, handle, "stroke"), "blue");
    assert_eq!(svg_attr(&r, handle, "stroke-width"), "2");
    assert_eq!(svg_attr(&r, handle, "fill"), "transparent");
}

#[test]
fn test_malformed_path_is_rejected() {
    let mut r = svg_renderer();
    let err = r
        .draw_path_data("L 5 5", DrawOptions::default())
        .unwrap_err();
    assert!(matches!(err, DrawkitError::PathData(_)));
    assert_eq!(r.shape_count(), 0);
}

#[test]
fn test_stroke_options() {
    let mut r = svg_renderer();
    let handle = r
        .draw_line(
            Point::new(0.0, 15.0),
            Point::new(100.0, 15.0),
            DrawOptions::stroked("#0078D6", 4.0)
                .with_dash_array(vec![4.0, 2.0])
                .with_line_cap(LineCap::Round)
                .with_opacity(0.5),
        )
        .unwrap();
    assert_eq!(svg_attr(&r, handle, "x2"), "100");
    assert_eq!(svg_attr(&r, handle, "stroke-dasharray"), "4 2");
    assert_eq!(svg_attr(&r, handle, "stroke-linecap"), "round");
    assert_eq!(svg_attr(&r, handle, "opacity"), "0.5");
}

#[test]
fn test_circle_ellipse_polyline() {
    let mut r = svg_renderer();
    let circle = r
        .draw_circle(Point::new(50.0, 50.0), 10.0, DrawOptions::filled("red"))
        .unwrap();
    let ellipse = r
        .draw_ellipse(Point::new(50.0, 50.0), 10.0, 5.0, DrawOptions::filled("red"))
        .unwrap();
    let polyline = r
        .draw_polyline(
            vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)],
            DrawOptions::stroked("red", 1.0),
        )
        .unwrap();
    assert_eq!(svg_attr(&r, circle, "r"), "10");
    assert_eq!(svg_attr(&r, ellipse, "ry"), "5");
    assert_eq!(svg_attr(&r, polyline, "points"), "0,0 5,5");
}

#[test]
fn test_hidden_shape() {
    let mut r = svg_renderer();
    let handle = r
        .draw_rect(Rect::new(0.0, 0.0, 5.0, 5.0), DrawOptions::filled("red").hidden())
        .unwrap();
    assert_eq!(svg_attr(&r, handle, "visibility"), "hidden");
    r.update_attributes(handle, &AttributeUpdate::new().visible(true))
        .unwrap();
    let node = *r.node(handle).unwrap();
    assert!(r.surface().attribute(node, "visibility").is_none());
}

// ============================================================================
// Updates and Removal
// ============================================================================

#[test]
fn test_update_changes_attribute_in_place() {
    let mut r = svg_renderer();
    let handle = r
        .draw_rect(Rect::new(0.0, 0.0, 10.0, 5.0), DrawOptions::filled("red"))
        .unwrap();
    let node = *r.node(handle).unwrap();
    r.update_attributes(handle, &AttributeUpdate::new().width(42.5).fill("blue"))
        .unwrap();
    assert_eq!(*r.node(handle).unwrap(), node);
    assert_eq!(svg_attr(&r, handle, "width"), "42.5");
    assert_eq!(svg_attr(&r, handle, "fill"), "blue");
}

#[test]
fn test_update_rejects_field_for_other_shape() {
    let mut r = svg_renderer();
    let handle = r
        .draw_circle(Point::new(5.0, 5.0), 2.0, DrawOptions::filled("red"))
        .unwrap();
    let err = r
        .update_attributes(handle, &AttributeUpdate::new().width(10.0))
        .unwrap_err();
    assert!(matches!(err, DrawkitError::InvalidUpdate(_)));
}

#[test]
fn test_unknown_handle() {
    let mut r = svg_renderer();
    let stale = ShapeHandle::from_raw(99);
    assert!(matches!(
        r.update_attributes(stale, &AttributeUpdate::new().opacity(0.5)),
        Err(DrawkitError::UnknownShape(h)) if h == stale
    ));
    assert!(matches!(r.remove(stale), Err(DrawkitError::UnknownShape(_))));
}

#[test]
fn test_remove_detaches_node() {
    let mut r = svg_renderer();
    let keep = r
        .draw_rect(Rect::new(0.0, 0.0, 5.0, 5.0), DrawOptions::filled("red").with_id("keep"))
        .unwrap();
    let gone = r
        .draw_rect(Rect::new(0.0, 0.0, 5.0, 5.0), DrawOptions::filled("red").with_id("gone"))
        .unwrap();
    r.remove(gone).unwrap();
    assert_eq!(r.shape_count(), 1);
    assert!(r.node(gone).is_none());
    assert!(r.surface().find_by_id("gone").is_none());
    assert!(r.node(keep).is_some());
    assert!(r.update_attributes(gone, &AttributeUpdate::new().x(1.0)).is_err());
}

#[test]
fn test_clear_region_removes_contained_shapes() {
    let mut r = svg_renderer();
    r.draw_rect(Rect::new(10.0, 10.0, 20.0, 20.0), DrawOptions::filled("red"))
        .unwrap();
    r.draw_rect(Rect::new(150.0, 10.0, 20.0, 20.0), DrawOptions::filled("red"))
        .unwrap();
    r.clear_region(Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
    assert_eq!(r.shape_count(), 1);
    assert_eq!(r.surface().count_tag("rect"), 1);
}

// ============================================================================
// Gradients and Clip Paths
// ============================================================================

fn two_stop_gradient() -> GradientSpec {
    GradientSpec::linear(
        Point::new(0.0, 0.0),
        Point::new(100.0, 0.0),
        vec![GradientStop::new("red", 0.5), GradientStop::new("blue", 1.0)],
    )
}

#[test]
fn test_gradient_definition() {
    let mut r = svg_renderer();
    let gradient = r.create_linear_gradient(&two_stop_gradient()).unwrap();
    let handle = r
        .draw_rect(
            Rect::new(0.0, 0.0, 100.0, 10.0),
            DrawOptions::filled(Paint::Gradient(gradient.clone())),
        )
        .unwrap();
    assert_eq!(svg_attr(&r, handle, "fill"), format!("url(#{})", gradient.id));

    let tree = r.surface();
    let node = tree.find_by_id(&gradient.id).unwrap();
    assert_eq!(tree.tag(node), Some("linearGradient"));
    assert_eq!(tree.children(node).len(), 2);
    let second = tree.children(node)[1];
    assert_eq!(tree.attribute(second, "offset"), Some("100%"));
    assert_eq!(tree.attribute(second, "stop-color"), Some("blue"));
}

#[test]
fn test_gradient_without_stops_is_rejected() {
    let mut r = svg_renderer();
    let spec = GradientSpec::linear(Point::new(0.0, 0.0), Point::new(1.0, 0.0), Vec::new());
    assert!(matches!(
        r.create_linear_gradient(&spec),
        Err(DrawkitError::Gradient(_))
    ));
    let radial = GradientSpec::radial(Point::new(0.0, 0.0), 5.0, vec![GradientStop::new("red", 1.0)]);
    assert!(r.create_linear_gradient(&radial).is_err());
    assert!(r.create_radial_gradient(&radial).is_ok());
}

#[test]
fn test_unknown_gradient_paint() {
    let mut r = svg_renderer();
    let fake = drawkit::GradientRef {
        id: "nowhere".to_string(),
    };
    let err = r
        .draw_rect(Rect::new(0.0, 0.0, 1.0, 1.0), DrawOptions::filled(Paint::Gradient(fake)))
        .unwrap_err();
    assert!(matches!(err, DrawkitError::Gradient(_)));
}

#[test]
fn test_gradient_transform() {
    let mut r = svg_renderer();
    let gradient = r.create_linear_gradient(&two_stop_gradient()).unwrap();
    r.set_gradient_transform(&gradient, GradientTransform::new(12.0, -45.0))
        .unwrap();
    let tree = r.surface();
    let node = tree.find_by_id(&gradient.id).unwrap();
    let transform = tree.attribute(node, "gradientTransform").unwrap();
    assert!(transform.contains("translate(12"), "{transform}");
    assert!(transform.contains("rotate(-45"), "{transform}");
}

#[test]
fn test_clip_path_reveals_by_updating_inner_shape() {
    let mut r = svg_renderer();
    let clip = r
        .create_clip_path(ClipRegion::Rect(Rect::new(10.0, 0.0, 0.0, 30.0)))
        .unwrap();
    let bar = r
        .draw_rect(
            Rect::new(10.0, 0.0, 180.0, 30.0),
            DrawOptions::filled("red").with_clip(clip.reference.clone()),
        )
        .unwrap();
    assert_eq!(svg_attr(&r, bar, "clip-path"), clip.reference.css_value());

    r.update_attributes(clip.shape, &AttributeUpdate::new().width(90.0))
        .unwrap();
    assert_eq!(svg_attr(&r, clip.shape, "width"), "90");

    let tree = r.surface();
    let clip_node = tree.find_by_id(&clip.reference.id).unwrap();
    assert_eq!(tree.tag(clip_node), Some("clipPath"));
    assert_eq!(tree.count_tag("defs"), 1);
}

// ============================================================================
// Text, Images and Serialization
// ============================================================================

#[test]
fn test_text_node() {
    let mut r = svg_renderer();
    let style = TextStyle {
        size: 12.0,
        anchor: TextAnchor::Middle,
        fill: Paint::color("white"),
        ..TextStyle::default()
    };
    let handle = r
        .create_text("50%", style, Point::new(100.0, 18.0), DrawOptions::default())
        .unwrap();
    assert_eq!(svg_attr(&r, handle, "text-anchor"), "middle");
    assert_eq!(svg_attr(&r, handle, "font-size"), "12px");
    assert_eq!(svg_attr(&r, handle, "fill"), "white");

    r.update_attributes(handle, &AttributeUpdate::new().text("75%"))
        .unwrap();
    let node = *r.node(handle).unwrap();
    assert_eq!(r.surface().text(node), Some("75%"));
}

#[test]
fn test_measure_text_estimates_headless() {
    let r = svg_renderer();
    let style = TextStyle {
        size: 10.0,
        ..TextStyle::default()
    };
    let size = r.measure_text("abcd", &style);
    assert!(size.width > 0.0);
    assert_eq!(size.height, 10.0);
}

#[test]
fn test_image_from_bytes() {
    let mut r = svg_renderer();
    let handle = r
        .draw_image(
            ImageSource::from_bytes("image/png", b"abc"),
            Rect::new(0.0, 0.0, 16.0, 16.0),
            DrawOptions::default(),
        )
        .unwrap();
    assert_eq!(svg_attr(&r, handle, "href"), "data:image/png;base64,YWJj");
}

#[test]
fn test_markup_serialization() {
    let mut r: SvgRenderer<SvgTree> =
        SvgRenderer::new(SvgTree::new("doc", Size::new(120.0, 40.0)), "doc");
    r.draw_rect(Rect::new(0.0, 0.0, 10.0, 10.0), DrawOptions::filled("red"))
        .unwrap();
    r.create_text("a<b", TextStyle::default(), Point::new(5.0, 5.0), DrawOptions::default())
        .unwrap();
    let markup = r.surface().to_markup().unwrap();
    assert!(markup.starts_with("<svg"));
    assert!(markup.contains(r#"xmlns="http://www.w3.org/2000/svg""#));
    assert!(markup.contains(r#"width="120""#));
    assert!(markup.contains(r#"id="doc_shape_0""#));
    assert!(markup.contains("a&lt;b</text>"));
    assert!(markup.ends_with("</svg>"));
}
