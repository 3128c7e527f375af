mod common;

use common::{assert_close, cell, edge, streets_around};
use taxicab_explorer::action_log::{Action, ActionOutcome};
use taxicab_explorer::{
    AnimationState, Config, DisplayMode, ExplorerError, ExplorerSession, ManualScheduler,
    PointKind, Scheduler,
};

fn session() -> ExplorerSession<ManualScheduler> {
    ExplorerSession::from_config(&Config::default(), ManualScheduler::new())
}

fn advance(s: &mut ExplorerSession<ManualScheduler>, ms: f64) {
    s.motion_mut().scheduler_mut().advance(ms);
    s.pump();
}

#[test]
fn test_classic_layout_metrics() {
    let s = session();
    let metrics = s.metrics();
    assert!((metrics.flight_distance - 11.31).abs() < 0.01);
    assert_eq!(metrics.street_distance, Some(16));
    assert_eq!(s.mode(), DisplayMode::Both);
}

#[test]
fn test_blocked_streets_lengthen_street_distance() {
    let mut s = session();
    let open = edge((11, 11), (12, 11));
    for street in streets_around(cell(11, 11), 15) {
        if street != open {
            assert_eq!(s.toggle_street(street), Some(true));
        }
    }
    assert_eq!(s.metrics().street_distance, Some(18));

    s.start().unwrap();
    let path = s.motion().path().unwrap();
    assert_eq!(path[path.len() - 2], cell(12, 11));
    assert_eq!(s.motion().duration_ms(), 18.0 * 300.0);
}

#[test]
fn test_unreachable_start_leaves_everything_untouched() {
    let mut s = session();
    for x in 0..15 {
        s.toggle_street(edge((x, 6), (x, 7)));
    }
    let blocked_before = s.grid().blocked.clone();
    let revision = s.grid().get_revision();

    let result = s.start();
    assert!(matches!(result, Err(ExplorerError::PathNotFound { .. })));
    assert!(result.unwrap_err().to_string().contains("unreachable"));

    assert_eq!(s.state(), AnimationState::Idle);
    assert_eq!(s.grid().blocked, blocked_before);
    assert_eq!(s.grid().get_revision(), revision);
    assert_eq!(s.grid().start, cell(3, 3));
    assert_eq!(s.grid().end, cell(11, 11));
    assert_close(s.motion().flight_position(), (3.0, 3.0));
    assert_close(s.motion().street_position(), (3.0, 3.0));
    assert_eq!(s.metrics().street_distance, None);

    let last = s.action_log().get_actions().last().unwrap();
    assert_eq!(last.action, Action::Start);
    assert!(matches!(last.outcome, ActionOutcome::Rejected(_)));
}

#[test]
fn test_pause_midway_then_finish() {
    let mut s = session();
    s.start().unwrap();
    let duration = s.motion().duration_ms();
    let t0 = s.motion().scheduler().now();

    advance(&mut s, duration / 2.0);
    s.pause();
    advance(&mut s, 2500.0);
    assert_eq!(s.state(), AnimationState::Paused);
    s.resume();

    while s.state() == AnimationState::Running {
        advance(&mut s, 16.0);
    }
    assert_eq!(s.state(), AnimationState::Completed);

    let wall_clock = s.motion().scheduler().now() - t0;
    assert!(wall_clock >= duration + 2500.0);
    assert!(wall_clock < duration + 2500.0 + 16.0);
    assert_eq!(s.motion().active_elapsed_ms(), duration);
}

#[test]
fn test_grid_locked_while_animating() {
    let mut s = session();
    s.start().unwrap();

    let street = edge((5, 5), (6, 5));
    assert_eq!(s.toggle_street(street), None);
    assert!(!s.move_point(PointKind::Start, 0, 0));
    assert!(!s.set_mode(DisplayMode::DirectOnly));
    assert!(s.grid().blocked.is_empty());

    s.pause();
    assert_eq!(s.toggle_street(street), None);

    s.reset();
    assert_eq!(s.toggle_street(street), Some(true));
}

#[test]
fn test_editing_after_completion_resets() {
    let mut s = session();
    s.start().unwrap();
    let duration = s.motion().duration_ms();
    advance(&mut s, duration);
    assert_eq!(s.state(), AnimationState::Completed);

    assert_eq!(s.toggle_street(edge((0, 0), (1, 0))), Some(true));
    assert_eq!(s.state(), AnimationState::Idle);
    assert!(s.motion().path().is_none());
}

#[test]
fn test_mode_switch_changes_actors() {
    let mut s = session();
    assert!(s.set_mode(DisplayMode::DirectOnly));
    assert!(!s.set_mode(DisplayMode::DirectOnly));
    s.start().unwrap();
    assert!(s.motion().path().is_none());

    let half = s.motion().duration_ms() / 2.0;
    advance(&mut s, half);
    assert_close(s.motion().flight_position(), (7.0, 7.0));
    assert_close(s.motion().street_position(), (3.0, 3.0));
}

#[test]
fn test_drag_end_point() {
    let mut s = session();
    assert!(s.move_point(PointKind::End, 20, -3));
    assert_eq!(s.grid().end, cell(14, 0));
    assert_eq!(s.metrics().street_distance, Some(14));

    // can't drop the end on the start
    assert!(!s.move_point(PointKind::End, 3, 3));
    assert_eq!(s.grid().end, cell(14, 0));

    let logged = s.action_log().get_actions().last().unwrap();
    assert_eq!(
        logged.action,
        Action::MovePoint {
            which: PointKind::End,
            x: 14,
            y: 0
        }
    );
}

#[test]
fn test_independent_sessions() {
    let mut a = session();
    let b = session();
    a.toggle_street(edge((3, 3), (4, 3)));
    a.start().unwrap();
    assert_eq!(b.state(), AnimationState::Idle);
    assert!(b.grid().blocked.is_empty());
}

#[test]
fn test_unusable_pace_in_config_still_completes() {
    let config = Config::from_toml("[animation]\nms_per_unit = nan").unwrap();
    let mut s = ExplorerSession::from_config(&config, ManualScheduler::new());
    assert_eq!(s.motion().ms_per_unit(), 300.0);

    s.start().unwrap();
    for _ in 0..10 {
        advance(&mut s, 1000.0);
    }
    assert_eq!(s.state(), AnimationState::Completed);
    assert_close(s.motion().flight_position(), (11.0, 11.0));
    assert_close(s.motion().street_position(), (11.0, 11.0));
}

#[test]
fn test_clear_streets() {
    let mut s = session();
    for x in 0..15 {
        s.toggle_street(edge((x, 6), (x, 7)));
    }
    assert!(s.start().is_err());

    assert!(s.clear_streets());
    assert!(s.grid().blocked.is_empty());
    assert_eq!(s.metrics().street_distance, Some(16));

    s.toggle_street(edge((0, 0), (0, 1)));
    s.start().unwrap();
    assert!(!s.clear_streets(), "streets stay put during a trip");
    assert_eq!(s.grid().blocked.len(), 1);

    let last = s.action_log().get_actions().last().unwrap();
    assert_eq!(last.action, Action::ClearStreets);
    assert_eq!(last.outcome, ActionOutcome::Ignored);
}

#[test]
fn test_wild_pointer_in_blocking_mode() {
    let mut s = session();
    s.set_blocking_mode(true);
    assert_eq!(s.hover(f64::INFINITY, f64::INFINITY), None);
    assert_eq!(s.hover(f64::NAN, 2.5), None);
    assert_eq!(s.click_street(3.0e9, 4.0), None);
    assert_eq!(s.highlighted_street(), None);
    assert!(s.grid().blocked.is_empty());
}
