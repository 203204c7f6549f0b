#![allow(clippy::float_cmp)]

use std::cell::RefCell;

use super::*;
use crate::config::{MAX_SCALE, MIN_SCALE, ZOOM_STEP};
use crate::model::{build_grid, Bitmap, Position};

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

// =============================================================
// Helpers
// =============================================================

fn grid(width: u32, height: u32) -> Rc<Grid> {
    let mut data = Vec::new();
    for y in 0..height {
        for x in 0..width {
            data.extend_from_slice(&[x as u8 * 10, y as u8 * 10, 0, 255]);
        }
    }
    Rc::new(build_grid(&Bitmap::new(width, height, data).unwrap()))
}

/// 3 columns x 2 rows, 50px cells, identity transform.
fn engine() -> ViewportEngine {
    ViewportEngine::new(grid(3, 2), &ViewerConfig::default())
}

fn recorded(engine: &mut ViewportEngine) -> Rc<RefCell<Vec<Option<Position>>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    engine.set_observer(move |cell: Option<Cell>| {
        sink.borrow_mut().push(cell.map(|c| c.position));
    });
    log
}

fn pos(x: u32, y: u32) -> Position {
    Position { x, y }
}

// =============================================================
// Hit-testing
// =============================================================

#[test]
fn hit_test_scenario_identity_transform() {
    let engine = engine();
    let cell = engine.hit_test(Point::new(10.0, 10.0)).unwrap();
    assert_eq!(cell.position, pos(0, 0));
    let cell = engine.hit_test(Point::new(120.0, 10.0)).unwrap();
    assert_eq!(cell.position, pos(2, 0));
    assert!(engine.hit_test(Point::new(200.0, 10.0)).is_none());
}

#[test]
fn hit_test_upper_left_edge_belongs_to_cell() {
    let engine = engine();
    assert_eq!(engine.hit_test(Point::new(50.0, 50.0)).unwrap().position, pos(1, 1));
    assert_eq!(engine.hit_test(Point::new(100.0, 0.0)).unwrap().position, pos(2, 0));
}

#[test]
fn hit_test_outside_far_edges_is_absent() {
    let engine = engine();
    assert!(engine.hit_test(Point::new(151.0, 10.0)).is_none());
    assert!(engine.hit_test(Point::new(150.0, 10.0)).is_none());
    assert!(engine.hit_test(Point::new(10.0, 101.0)).is_none());
    assert!(engine.hit_test(Point::new(10.0, 100.0)).is_none());
}

#[test]
fn hit_test_negative_coordinates_are_absent() {
    let engine = engine();
    assert!(engine.hit_test(Point::new(-0.5, 10.0)).is_none());
    assert!(engine.hit_test(Point::new(10.0, -1.0)).is_none());
}

#[test]
fn hit_test_returns_cell_color() {
    let engine = engine();
    let cell = engine.hit_test(Point::new(110.0, 60.0)).unwrap();
    assert_eq!(cell.position, pos(2, 1));
    assert_eq!((cell.color.r, cell.color.g), (20, 10));
}

#[test]
fn hit_test_follows_transform() {
    let mut engine = engine();
    engine.drag_start(Point::new(0.0, 0.0));
    engine.drag_move(Point::new(100.0, 40.0));
    engine.drag_end();
    // (110, 50) is world (10, 10) after the pan.
    assert_eq!(engine.hit_test(Point::new(110.0, 50.0)).unwrap().position, pos(0, 0));
    assert!(engine.hit_test(Point::new(90.0, 50.0)).is_none());
}

#[test]
fn hit_test_honours_scale() {
    let mut engine = engine();
    engine.zoom_at(Point::new(0.0, 0.0), 2.0);
    // Cells are now 100 screen units wide.
    assert_eq!(engine.hit_test(Point::new(150.0, 10.0)).unwrap().position, pos(1, 0));
    assert_eq!(engine.hit_test(Point::new(299.0, 199.0)).unwrap().position, pos(2, 1));
    assert!(engine.hit_test(Point::new(300.0, 10.0)).is_none());
}

#[test]
fn hit_test_uses_configured_pixel_size() {
    let config = ViewerConfig {
        pixel_size: 10.0,
        ..ViewerConfig::default()
    };
    let engine = ViewportEngine::new(grid(3, 2), &config);
    assert_eq!(engine.hit_test(Point::new(25.0, 15.0)).unwrap().position, pos(2, 1));
    assert!(engine.hit_test(Point::new(30.0, 5.0)).is_none());
}

#[test]
fn hit_test_on_empty_grid_is_absent() {
    let engine = ViewportEngine::new(grid(0, 0), &ViewerConfig::default());
    assert!(engine.hit_test(Point::new(0.0, 0.0)).is_none());
}

// =============================================================
// Drag
// =============================================================

#[test]
fn drag_changes_translate_by_pointer_delta() {
    let mut engine = engine();
    engine.drag_start(Point::new(10.0, 20.0));
    assert!(engine.is_dragging());
    assert!(engine.drag_move(Point::new(35.0, -5.0)));
    assert!(point_approx_eq(engine.viewport().translate, Point::new(25.0, -25.0)));
}

#[test]
fn drag_delta_is_independent_of_scale() {
    let mut engine = engine();
    engine.zoom_at(Point::new(40.0, 40.0), 3.0);
    let before = engine.viewport();
    engine.drag_start(Point::new(200.0, 200.0));
    engine.drag_move(Point::new(260.0, 170.0));
    let after = engine.viewport();
    assert_eq!(after.scale, before.scale);
    assert!(point_approx_eq(after.translate - before.translate, Point::new(60.0, -30.0)));
}

#[test]
fn drag_moves_are_measured_from_drag_start() {
    let mut engine = engine();
    engine.drag_start(Point::new(0.0, 0.0));
    engine.drag_move(Point::new(10.0, 10.0));
    engine.drag_move(Point::new(30.0, 5.0));
    assert!(point_approx_eq(engine.viewport().translate, Point::new(30.0, 5.0)));
}

#[test]
fn second_drag_recaptures_anchors() {
    let mut engine = engine();
    engine.drag_start(Point::new(0.0, 0.0));
    engine.drag_move(Point::new(50.0, 0.0));
    engine.drag_end();
    engine.drag_start(Point::new(500.0, 500.0));
    engine.drag_move(Point::new(510.0, 500.0));
    assert!(point_approx_eq(engine.viewport().translate, Point::new(60.0, 0.0)));
}

#[test]
fn drag_move_without_drag_is_noop() {
    let mut engine = engine();
    assert!(!engine.drag_move(Point::new(99.0, 99.0)));
    assert_eq!(engine.viewport(), ViewportState::default());
}

#[test]
fn drag_end_when_idle_leaves_state_unchanged() {
    let mut engine = engine();
    engine.zoom_at(Point::new(10.0, 10.0), 1.5);
    let before = engine.viewport();
    engine.drag_end();
    engine.drag_end();
    assert!(!engine.is_dragging());
    assert_eq!(engine.viewport(), before);
}

#[test]
fn pointer_move_pans_while_dragging_without_hover() {
    let mut engine = engine();
    let log = recorded(&mut engine);
    engine.drag_start(Point::new(10.0, 10.0));
    assert!(engine.pointer_move(Point::new(20.0, 10.0)));
    assert!(log.borrow().is_empty());
    assert!(engine.active_cell().is_none());
}

// =============================================================
// Wheel zoom
// =============================================================

#[test]
fn wheel_zoom_in_scenario() {
    let mut engine = engine();
    assert!(engine.wheel(Point::new(100.0, 100.0), -120.0));
    let vp = engine.viewport();
    assert!(approx_eq(vp.scale, 1.1));
    assert!(point_approx_eq(vp.translate, Point::new(-10.0, -10.0)));
}

#[test]
fn wheel_zoom_out_shrinks_scale() {
    let mut engine = engine();
    engine.wheel(Point::new(0.0, 0.0), 3.0);
    assert!(approx_eq(engine.viewport().scale, 0.9));
}

#[test]
fn wheel_magnitude_does_not_matter() {
    let mut a = engine();
    let mut b = engine();
    a.wheel(Point::new(30.0, 30.0), -1.0);
    b.wheel(Point::new(30.0, 30.0), -500.0);
    assert_eq!(a.viewport(), b.viewport());
}

#[test]
fn wheel_zero_delta_is_noop() {
    let mut engine = engine();
    assert!(!engine.wheel(Point::new(30.0, 30.0), 0.0));
    assert!(!engine.wheel(Point::new(30.0, 30.0), f64::NAN));
    assert_eq!(engine.viewport(), ViewportState::default());
}

#[test]
fn wheel_zoom_keeps_point_under_cursor() {
    let cases = [
        (Point::new(100.0, 100.0), -1.0),
        (Point::new(7.0, 333.0), 1.0),
        (Point::new(-50.0, 12.5), -1.0),
    ];
    for (cursor, delta) in cases {
        let mut engine = engine();
        engine.drag_start(Point::new(0.0, 0.0));
        engine.drag_move(Point::new(-17.0, 44.0));
        engine.drag_end();
        engine.zoom_at(Point::new(0.0, 0.0), 1.7);
        let world = engine.viewport().screen_to_world(cursor);
        engine.wheel(cursor, delta);
        assert!(point_approx_eq(engine.viewport().world_to_screen(world), cursor));
    }
}

#[test]
fn wheel_keeps_hovered_cell_under_cursor() {
    let mut engine = engine();
    let cursor = Point::new(120.0, 10.0);
    let before = engine.hit_test(cursor).unwrap().position;
    for _ in 0..5 {
        engine.wheel(cursor, -1.0);
    }
    assert_eq!(engine.hit_test(cursor).unwrap().position, before);
}

fn assert_transform_usable(engine: &ViewportEngine) {
    let vp = engine.viewport();
    assert!(vp.scale.is_finite() && vp.scale > 0.0, "scale {}", vp.scale);
    assert!((1.0 / vp.scale).is_finite(), "inverse scale of {}", vp.scale);
    assert!(vp.translate.x.is_finite() && vp.translate.y.is_finite(), "{:?}", vp.translate);
    assert!((MIN_SCALE..=MAX_SCALE).contains(&vp.scale));
}

#[test]
fn repeated_zoom_out_stops_at_min_scale() {
    let mut engine = engine();
    for _ in 0..10_000 {
        engine.wheel(Point::new(10.0, 10.0), 1.0);
    }
    assert_transform_usable(&engine);
    assert!(engine.viewport().scale < MIN_SCALE / (1.0 - ZOOM_STEP));
    assert!(!engine.wheel(Point::new(10.0, 10.0), 1.0));
}

#[test]
fn repeated_zoom_in_stops_at_max_scale() {
    let mut engine = engine();
    for _ in 0..10_000 {
        engine.wheel(Point::new(120.0, 80.0), -1.0);
    }
    assert_transform_usable(&engine);
    assert!(engine.viewport().scale > MAX_SCALE / (1.0 + ZOOM_STEP));
    let before = engine.viewport();
    assert!(!engine.wheel(Point::new(120.0, 80.0), -1.0));
    assert_eq!(engine.viewport(), before);
}

#[test]
fn refused_zoom_step_keeps_anchor_invariance() {
    let mut engine = engine();
    let cursor = Point::new(75.0, 40.0);
    for _ in 0..10_000 {
        engine.wheel(cursor, -1.0);
    }
    let world = engine.viewport().screen_to_world(cursor);
    engine.wheel(cursor, -1.0);
    assert!(point_approx_eq(engine.viewport().world_to_screen(world), cursor));
}

#[test]
fn repeated_pinch_stays_within_scale_bounds() {
    let mut engine = engine();
    let origin = Point::new(0.0, 0.0);
    for _ in 0..10_000 {
        engine.pinch_start(origin, Point::new(10.0, 0.0));
        engine.pinch_change(origin, Point::new(1000.0, 0.0));
    }
    assert_transform_usable(&engine);

    for _ in 0..10_000 {
        engine.pinch_start(origin, Point::new(1000.0, 0.0));
        engine.pinch_change(origin, Point::new(1.0, 0.0));
    }
    assert_transform_usable(&engine);
}

// =============================================================
// Pinch
// =============================================================

#[test]
fn pinch_records_start_distance() {
    let mut engine = engine();
    engine.pinch_start(Point::new(0.0, 0.0), Point::new(30.0, 40.0));
    assert_eq!(engine.pinch().start_distance, Some(50.0));
}

#[test]
fn pinch_change_scales_by_distance_ratio() {
    let mut engine = engine();
    engine.pinch_start(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
    assert!(engine.pinch_change(Point::new(0.0, 0.0), Point::new(150.0, 0.0)));
    assert!(approx_eq(engine.viewport().scale, 1.5));
    assert_eq!(engine.pinch().start_distance, Some(150.0));
}

#[test]
fn pinch_ratios_compose_incrementally() {
    let mut engine = engine();
    engine.pinch_start(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
    engine.pinch_change(Point::new(0.0, 0.0), Point::new(120.0, 0.0));
    engine.pinch_change(Point::new(0.0, 0.0), Point::new(200.0, 0.0));
    engine.pinch_change(Point::new(0.0, 0.0), Point::new(80.0, 0.0));
    assert!(approx_eq(engine.viewport().scale, 0.8));
}

#[test]
fn pinch_does_not_reanchor_translate() {
    let mut engine = engine();
    engine.drag_start(Point::new(0.0, 0.0));
    engine.drag_move(Point::new(12.0, 34.0));
    engine.drag_end();
    engine.pinch_start(Point::new(100.0, 100.0), Point::new(200.0, 100.0));
    engine.pinch_change(Point::new(50.0, 100.0), Point::new(250.0, 100.0));
    assert!(approx_eq(engine.viewport().scale, 2.0));
    assert!(point_approx_eq(engine.viewport().translate, Point::new(12.0, 34.0)));
}

#[test]
fn pinch_change_without_start_is_noop() {
    let mut engine = engine();
    assert!(!engine.pinch_change(Point::new(0.0, 0.0), Point::new(100.0, 0.0)));
    assert_eq!(engine.viewport(), ViewportState::default());
    assert_eq!(engine.pinch(), PinchState::default());
}

#[test]
fn pinch_change_after_end_is_noop() {
    let mut engine = engine();
    engine.pinch_start(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
    engine.pinch_end();
    assert!(!engine.pinch_change(Point::new(0.0, 0.0), Point::new(300.0, 0.0)));
    assert_eq!(engine.viewport().scale, 1.0);
}

#[test]
fn pinch_with_coincident_touches_never_zeroes_scale() {
    let mut engine = engine();
    engine.pinch_start(Point::new(10.0, 10.0), Point::new(10.0, 10.0));
    assert!(!engine.pinch_change(Point::new(10.0, 10.0), Point::new(60.0, 10.0)));
    assert!(!engine.pinch_change(Point::new(10.0, 10.0), Point::new(10.0, 10.0)));
    assert_eq!(engine.viewport().scale, 1.0);
    // The last valid distance is kept, so the gesture resumes from there.
    assert!(engine.pinch_change(Point::new(10.0, 10.0), Point::new(110.0, 10.0)));
    assert!(approx_eq(engine.viewport().scale, 2.0));
}

#[test]
fn touch_end_with_two_left_restarts_pinch() {
    let mut engine = engine();
    let a = Point::new(0.0, 0.0);
    engine.pinch_start(a, Point::new(100.0, 0.0));
    // Third finger lifted; the first two are still down.
    engine.touch_end(&[a, Point::new(0.0, 80.0)]);
    assert_eq!(engine.pinch().start_distance, Some(80.0));
    assert!(!engine.is_dragging());
    assert!(engine.pinch_change(a, Point::new(0.0, 160.0)));
    assert!(approx_eq(engine.viewport().scale, 2.0));
}

#[test]
fn touch_end_with_one_left_resumes_drag() {
    let mut engine = engine();
    engine.pinch_start(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
    engine.touch_end(&[Point::new(20.0, 20.0)]);
    assert_eq!(engine.pinch().start_distance, None);
    assert!(engine.is_dragging());
    assert!(engine.drag_move(Point::new(30.0, 25.0)));
    assert!(point_approx_eq(engine.viewport().translate, Point::new(10.0, 5.0)));
}

#[test]
fn touch_end_with_none_left_stops_everything() {
    let mut engine = engine();
    engine.drag_start(Point::new(5.0, 5.0));
    engine.touch_end(&[]);
    assert!(!engine.is_dragging());
    assert_eq!(engine.pinch().start_distance, None);
}

// =============================================================
// Active cell observer
// =============================================================

#[test]
fn hover_sets_active_cell_and_notifies() {
    let mut engine = engine();
    let log = recorded(&mut engine);
    engine.hover(Point::new(10.0, 10.0));
    assert_eq!(engine.active_cell().unwrap().position, pos(0, 0));
    assert_eq!(*log.borrow(), vec![Some(pos(0, 0))]);
}

#[test]
fn hover_within_same_cell_notifies_once() {
    let mut engine = engine();
    let log = recorded(&mut engine);
    engine.hover(Point::new(10.0, 10.0));
    engine.hover(Point::new(20.0, 30.0));
    engine.hover(Point::new(49.0, 49.0));
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn hover_reports_each_change_including_absent() {
    let mut engine = engine();
    let log = recorded(&mut engine);
    engine.hover(Point::new(10.0, 10.0));
    engine.hover(Point::new(120.0, 10.0));
    engine.hover(Point::new(200.0, 10.0));
    engine.hover(Point::new(210.0, 10.0));
    engine.hover(Point::new(60.0, 60.0));
    assert_eq!(
        *log.borrow(),
        vec![Some(pos(0, 0)), Some(pos(2, 0)), None, Some(pos(1, 1))]
    );
}

#[test]
fn hover_outside_from_start_is_silent() {
    let mut engine = engine();
    let log = recorded(&mut engine);
    engine.hover(Point::new(-10.0, -10.0));
    assert!(log.borrow().is_empty());
    assert!(engine.active_cell().is_none());
}

#[test]
fn pointer_out_clears_active_cell() {
    let mut engine = engine();
    let log = recorded(&mut engine);
    engine.pointer_move(Point::new(60.0, 10.0));
    engine.pointer_out();
    engine.pointer_out();
    assert!(engine.active_cell().is_none());
    assert_eq!(*log.borrow(), vec![Some(pos(1, 0)), None]);
}

#[test]
fn observer_can_be_cleared() {
    let mut engine = engine();
    let log = recorded(&mut engine);
    engine.clear_observer();
    engine.hover(Point::new(10.0, 10.0));
    assert!(log.borrow().is_empty());
    assert!(engine.active_cell().is_some());
}

#[test]
fn pointer_up_rehits_cell_under_release_point() {
    let mut engine = engine();
    let log = recorded(&mut engine);
    engine.hover(Point::new(10.0, 10.0));
    engine.drag_start(Point::new(10.0, 10.0));
    engine.pointer_up(Some(Point::new(60.0, 60.0)));
    assert!(!engine.is_dragging());
    assert_eq!(engine.active_cell().map(|c| c.position), Some(pos(1, 1)));
    assert_eq!(*log.borrow(), vec![Some(pos(0, 0)), Some(pos(1, 1))]);
}

#[test]
fn pointer_up_off_surface_clears_active_cell() {
    let mut engine = engine();
    engine.hover(Point::new(10.0, 10.0));
    engine.drag_start(Point::new(10.0, 10.0));
    // Dragged out of the canvas; hover stays put while the drag is live.
    engine.pointer_move(Point::new(-40.0, 10.0));
    assert!(engine.active_cell().is_some());
    engine.pointer_up(None);
    assert!(!engine.is_dragging());
    assert_eq!(engine.active_cell(), None);
}

// =============================================================
// Reset
// =============================================================

#[test]
fn reset_view_restores_identity_and_ends_gestures() {
    let mut engine = engine();
    engine.wheel(Point::new(30.0, 30.0), -1.0);
    engine.pinch_start(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
    engine.drag_start(Point::new(5.0, 5.0));
    engine.reset_view();
    assert_eq!(engine.viewport(), ViewportState::default());
    assert!(!engine.is_dragging());
    assert_eq!(engine.pinch().start_distance, None);
}

#[test]
fn engine_exposes_grid_and_pixel_size() {
    let engine = engine();
    assert_eq!(engine.grid().row_count(), 2);
    assert_eq!(engine.pixel_size(), 50.0);
}
