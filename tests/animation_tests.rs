//! Animation engine tests: easing, scheduling, looping and stopping.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{assert_close, svg_attr, svg_renderer, tick_until};
use drawkit::animation::{
    AnimationEvent, AnimationRequest, AnimationTarget, CompletionPayload, Easing, Frame,
    LabelCounter, LoopMode, Phase, Scheduler,
};
use drawkit::render::{SvgRenderer, SvgTree};
use drawkit::{DrawOptions, DrawkitError, Rect, RenderBackend, ShapeHandle};
use test_case::test_case;

fn rect(r: &mut SvgRenderer<SvgTree>) -> ShapeHandle {
    r.draw_rect(Rect::new(10.0, 10.0, 0.0, 10.0), DrawOptions::filled("red"))
        .unwrap()
}

fn width(r: &SvgRenderer<SvgTree>, handle: ShapeHandle) -> f64 {
    svg_attr(r, handle, "width").parse().unwrap()
}

// ============================================================================
// Easing
// ============================================================================

#[test_case(0.0 => 10.0 ; "starts at start")]
#[test_case(1000.0 => 100.0 ; "ends exactly at end")]
#[test_case(2500.0 => 100.0 ; "clamped past the end")]
fn test_cosine_out_endpoints(elapsed: f64) -> f64 {
    Easing::CosineOut.value(elapsed, 10.0, 90.0, 1000.0, false)
}

#[test]
fn test_cosine_out_midpoint() {
    let mid = Easing::CosineOut.value(500.0, 0.0, 100.0, 1000.0, false);
    assert_close(mid, 100.0 - 100.0 * std::f64::consts::FRAC_1_SQRT_2);
}

#[test]
fn test_cosine_out_is_monotonic() {
    let mut previous = f64::NEG_INFINITY;
    for step in 0..=100 {
        let v = Easing::CosineOut.value(f64::from(step) * 10.0, 0.0, 180.0, 1000.0, false);
        assert!(v >= previous);
        previous = v;
    }
}

#[test]
fn test_rtl_moves_towards_smaller_values() {
    assert_eq!(Easing::CosineOut.value(1000.0, 100.0, 30.0, 1000.0, true), 70.0);
    assert_eq!(Easing::CosineOut.value(0.0, 100.0, 30.0, 1000.0, true), 100.0);
    assert_eq!(Easing::Linear.value(500.0, 100.0, 30.0, 1000.0, true), 85.0);
}

#[test]
fn test_zero_duration_jumps_to_end() {
    assert_eq!(Easing::CosineOut.value(0.0, 5.0, 10.0, 0.0, false), 15.0);
}

#[test_case(LabelCounter::Width { track_width: 180.0 }, 90.0 => 50.0 ; "half a track")]
#[test_case(LabelCounter::Width { track_width: 180.0 }, 179.9 => 99.0 ; "truncated")]
#[test_case(LabelCounter::Width { track_width: 0.0 }, 10.0 => 0.0 ; "empty track")]
#[test_case(LabelCounter::Angle { start_angle: 90.0, total_angle: 180.0 }, 180.0 => 50.0 ; "angle")]
fn test_label_counter(counter: LabelCounter, value: f64) -> f64 {
    counter.percent(value)
}

// ============================================================================
// Scheduling
// ============================================================================

#[test]
fn test_width_animation_completes_exactly_once() {
    let mut r = svg_renderer();
    let bar = rect(&mut r);
    let mut s = Scheduler::new();
    let id = s
        .animate(&mut r, AnimationRequest::new(AnimationTarget::Width(bar), 0.0, 180.0, 1000.0))
        .unwrap();

    assert!(s.tick(0.0, &mut r).unwrap().is_empty());
    assert_eq!(width(&r, bar), 0.0);
    assert_eq!(s.phase(id), Some(Phase::Running));

    s.tick(500.0, &mut r).unwrap();
    let mid = width(&r, bar);
    // The quarter-cosine law starts slowly.
    assert!(mid > 0.0 && mid < 90.0, "{mid}");

    let events = s.tick(1000.0, &mut r).unwrap();
    assert_eq!(width(&r, bar), 180.0);
    assert_eq!(
        events,
        vec![AnimationEvent::Completed {
            id,
            payload: None,
            looping: false
        }]
    );
    assert!(s.is_idle());
    assert!(s.tick(1100.0, &mut r).unwrap().is_empty());
}

#[test]
fn test_delay_hides_until_start() {
    let mut r = svg_renderer();
    let bar = rect(&mut r);
    let mut s = Scheduler::new();
    let id = s
        .animate(
            &mut r,
            AnimationRequest::new(AnimationTarget::Width(bar), 0.0, 50.0, 100.0)
                .with_delay(200.0)
                .hidden_until_start(),
        )
        .unwrap();
    assert_eq!(svg_attr(&r, bar, "visibility"), "hidden");

    s.tick(0.0, &mut r).unwrap();
    s.tick(150.0, &mut r).unwrap();
    assert_eq!(s.phase(id), Some(Phase::Pending));
    assert_eq!(svg_attr(&r, bar, "visibility"), "hidden");

    s.tick(250.0, &mut r).unwrap();
    assert_eq!(s.phase(id), Some(Phase::Running));
    let node = *r.node(bar).unwrap();
    assert!(r.surface().attribute(node, "visibility").is_none());
}

#[test]
fn test_stale_timestamps_are_ignored() {
    let mut r = svg_renderer();
    let bar = rect(&mut r);
    let mut s = Scheduler::new();
    s.animate(&mut r, AnimationRequest::new(AnimationTarget::Width(bar), 0.0, 100.0, 1000.0))
        .unwrap();
    s.tick(100.0, &mut r).unwrap();
    s.tick(600.0, &mut r).unwrap();
    let at_600 = width(&r, bar);
    s.tick(300.0, &mut r).unwrap();
    assert_eq!(width(&r, bar), at_600);
}

#[test]
fn test_frames_arrive_in_order_then_complete() {
    let mut r = svg_renderer();
    let frames: Rc<RefCell<Vec<Frame>>> = Rc::default();
    let sink = Rc::clone(&frames);
    let mut s = Scheduler::new();
    s.animate(
        &mut r,
        AnimationRequest::new(
            AnimationTarget::Custom(Box::new(
                move |_: &mut dyn RenderBackend, frame: Frame| -> drawkit::Result<()> {
                    sink.borrow_mut().push(frame);
                    Ok(())
                },
            )),
            0.0,
            1.0,
            200.0,
        ),
    )
    .unwrap();
    let events = tick_until(&mut s, &mut r, 0.0, 400.0);
    assert_eq!(events.len(), 1);

    let frames = frames.borrow();
    assert!(frames.windows(2).all(|w| w[0].elapsed < w[1].elapsed));
    assert_eq!(frames.iter().filter(|f| f.is_final).count(), 1);
    let last = frames.last().unwrap();
    assert!(last.is_final);
    assert_eq!(last.value, 1.0);
}

#[test]
fn test_payload_is_delivered() {
    let mut r = svg_renderer();
    let bar = rect(&mut r);
    let mut s = Scheduler::new();
    let payload = CompletionPayload {
        value: Some(50.0),
        track_color: "#E6E6E6".to_string(),
        progress_color: "#0078D6".to_string(),
    };
    s.animate(
        &mut r,
        AnimationRequest::new(AnimationTarget::Width(bar), 0.0, 90.0, 100.0)
            .with_payload(payload.clone()),
    )
    .unwrap();
    let events = tick_until(&mut s, &mut r, 0.0, 200.0);
    match &events[..] {
        [AnimationEvent::Completed { payload: got, .. }] => assert_eq!(got.as_ref(), Some(&payload)),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_same_attribute_replaces_running_animation() {
    let mut r = svg_renderer();
    let bar = rect(&mut r);
    let mut s = Scheduler::new();
    let first = s
        .animate(&mut r, AnimationRequest::new(AnimationTarget::Width(bar), 0.0, 100.0, 1000.0))
        .unwrap();
    let opacity = s
        .animate(&mut r, AnimationRequest::new(AnimationTarget::Opacity(bar), 0.0, 1.0, 1000.0))
        .unwrap();
    let second = s
        .animate(&mut r, AnimationRequest::new(AnimationTarget::Width(bar), 50.0, 10.0, 1000.0))
        .unwrap();
    assert_eq!(s.len(), 2);
    assert_eq!(s.phase(first), None);
    assert!(s.phase(opacity).is_some());
    assert!(s.phase(second).is_some());
}

// ============================================================================
// Looping and Stopping
// ============================================================================

#[test]
fn test_restart_loop_runs_until_stopped() {
    let mut r = svg_renderer();
    let bar = rect(&mut r);
    let mut s = Scheduler::new();
    let id = s
        .animate(
            &mut r,
            AnimationRequest::new(AnimationTarget::Width(bar), 0.0, 100.0, 100.0)
                .looping(LoopMode::Restart),
        )
        .unwrap();
    let events = tick_until(&mut s, &mut r, 0.0, 1000.0);
    assert!(events.len() >= 5);
    assert!(events
        .iter()
        .all(|e| matches!(e, AnimationEvent::Completed { looping: true, .. })));
    assert!(s.iterations(id).unwrap() >= 5);

    assert!(s.stop(id));
    assert!(s.is_idle());
    assert!(!s.stop(id));
    let frozen = width(&r, bar);
    s.tick(2000.0, &mut r).unwrap();
    assert_eq!(width(&r, bar), frozen);
}

#[test]
fn test_swap_loop_reverses() {
    let mut r = svg_renderer();
    let bar = rect(&mut r);
    let mut s = Scheduler::new();
    s.animate(
        &mut r,
        AnimationRequest::new(AnimationTarget::Width(bar), 0.0, 100.0, 100.0)
            .looping(LoopMode::Swap),
    )
    .unwrap();
    s.tick(0.0, &mut r).unwrap();
    s.tick(100.0, &mut r).unwrap();
    assert_eq!(width(&r, bar), 100.0);
    s.tick(200.0, &mut r).unwrap();
    assert_eq!(width(&r, bar), 0.0);
}

#[test]
fn test_continue_loop_accumulates() {
    let mut r = svg_renderer();
    let bar = rect(&mut r);
    let mut s = Scheduler::new();
    s.animate(
        &mut r,
        AnimationRequest::new(AnimationTarget::X(bar), 0.0, 30.0, 100.0)
            .with_easing(Easing::Linear)
            .looping(LoopMode::Continue),
    )
    .unwrap();
    for now in [0.0, 100.0, 200.0, 300.0] {
        s.tick(now, &mut r).unwrap();
    }
    assert_eq!(svg_attr(&r, bar, "x"), "90");
}

#[test]
fn test_stop_all() {
    let mut r = svg_renderer();
    let a = rect(&mut r);
    let b = rect(&mut r);
    let mut s = Scheduler::new();
    for handle in [a, b] {
        s.animate(
            &mut r,
            AnimationRequest::new(AnimationTarget::Opacity(handle), 0.0, 1.0, 50.0)
                .looping(LoopMode::Swap),
        )
        .unwrap();
    }
    assert_eq!(s.len(), 2);
    s.stop_all();
    assert!(s.is_empty());
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_invalid_requests_are_rejected() {
    let mut r = svg_renderer();
    let bar = rect(&mut r);
    let mut s = Scheduler::new();
    for request in [
        AnimationRequest::new(AnimationTarget::Width(bar), 0.0, 1.0, -1.0),
        AnimationRequest::new(AnimationTarget::Width(bar), f64::NAN, 1.0, 10.0),
        AnimationRequest::new(AnimationTarget::Width(bar), 0.0, 1.0, 10.0).with_delay(-5.0),
        AnimationRequest::new(AnimationTarget::Width(bar), 0.0, 1.0, 0.0)
            .looping(LoopMode::Restart),
    ] {
        assert!(matches!(
            s.animate(&mut r, request),
            Err(DrawkitError::Animation(_))
        ));
    }
    assert!(s.is_idle());
    assert!(matches!(
        s.tick(f64::INFINITY, &mut r),
        Err(DrawkitError::Animation(_))
    ));
}

#[test]
fn test_frame_error_surfaces_from_tick() {
    let mut r = svg_renderer();
    let circle = r
        .draw_circle(drawkit::Point::new(5.0, 5.0), 2.0, DrawOptions::filled("red"))
        .unwrap();
    let mut s = Scheduler::new();
    let id = s
        .animate(&mut r, AnimationRequest::new(AnimationTarget::Width(circle), 0.0, 1.0, 10.0))
        .unwrap();
    match s.tick(0.0, &mut r).unwrap().as_slice() {
        [AnimationEvent::Failed { id: failed, error }] => {
            assert_eq!(*failed, id);
            assert!(error.starts_with("Invalid attribute update"), "{error}");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(s.is_idle());
}

#[test]
fn test_failed_frame_does_not_stall_siblings() {
    let mut r = svg_renderer();
    let quick = rect(&mut r);
    let slow = rect(&mut r);
    let mut s = Scheduler::new();
    let quick_id = s
        .animate(&mut r, AnimationRequest::new(AnimationTarget::Width(quick), 0.0, 50.0, 100.0))
        .unwrap();
    let slow_id = s
        .animate(&mut r, AnimationRequest::new(AnimationTarget::Width(slow), 0.0, 50.0, 1000.0))
        .unwrap();
    s.tick(0.0, &mut r).unwrap();
    r.remove(slow).unwrap();

    let events = s.tick(200.0, &mut r).unwrap();
    assert_eq!(events.len(), 2);
    assert!(events.iter().any(|e| matches!(
        e,
        AnimationEvent::Completed { id, .. } if *id == quick_id
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        AnimationEvent::Failed { id, .. } if *id == slow_id
    )));
    assert_eq!(width(&r, quick), 50.0);
    assert!(s.is_idle());
    assert!(s.tick(300.0, &mut r).unwrap().is_empty());
}
