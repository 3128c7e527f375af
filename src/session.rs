use crate::action_log::{Action, ActionLog, ActionOutcome};
use crate::config::Config;
use crate::error::{ExplorerError, ExplorerResult};
use crate::grid::{street_at, Edge, GridState, PointKind};
use crate::metrics::Metrics;
use crate::motion::{AnimationState, DisplayMode, MotionController};
use crate::scheduler::Scheduler;
use tracing::{debug, info};

/// One explorer instance: the street grid plus the animation running on it.
///
/// All user intents go through here so that grid edits and animation
/// transitions stay consistent (no editing the grid under a running trip).
pub struct ExplorerSession<S: Scheduler> {
    grid: GridState,
    motion: MotionController<S>,
    mode: DisplayMode,
    blocking_mode: bool,
    highlighted_street: Option<Edge>,
    action_log: ActionLog,
}

impl<S: Scheduler> ExplorerSession<S> {
    pub fn new(grid: GridState, scheduler: S, ms_per_unit: f64, mode: DisplayMode) -> Self {
        let motion = MotionController::new(scheduler, ms_per_unit, grid.start);
        ExplorerSession {
            grid,
            motion,
            mode,
            blocking_mode: false,
            highlighted_street: None,
            action_log: ActionLog::new(),
        }
    }

    pub fn from_config(config: &Config, scheduler: S) -> Self {
        Self::new(
            config.initial_grid(),
            scheduler,
            config.ms_per_unit(),
            config.animation.mode,
        )
    }

    pub fn grid(&self) -> &GridState {
        &self.grid
    }

    pub fn motion(&self) -> &MotionController<S> {
        &self.motion
    }

    pub fn motion_mut(&mut self) -> &mut MotionController<S> {
        &mut self.motion
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn state(&self) -> AnimationState {
        self.motion.state()
    }

    pub fn blocking_mode(&self) -> bool {
        self.blocking_mode
    }

    pub fn highlighted_street(&self) -> Option<Edge> {
        self.highlighted_street
    }

    pub fn action_log(&self) -> &ActionLog {
        &self.action_log
    }

    pub fn metrics(&self) -> Metrics {
        Metrics::compute(&self.grid)
    }

    fn record(&mut self, action: Action, outcome: ActionOutcome) {
        let now = self.motion.scheduler().now();
        self.action_log.log(now, action, outcome);
    }

    fn record_transition(&mut self, action: Action, before: AnimationState) {
        let outcome = if self.motion.state() != before {
            ActionOutcome::Applied
        } else {
            ActionOutcome::Ignored
        };
        self.record(action, outcome);
    }

    /// Switch which actors take part. Ignored while a trip is in flight.
    pub fn set_mode(&mut self, mode: DisplayMode) -> bool {
        let action = Action::SetMode { mode };
        if self.motion.is_active() || mode == self.mode {
            self.record(action, ActionOutcome::Ignored);
            return false;
        }
        self.mode = mode;
        self.record(action, ActionOutcome::Applied);
        true
    }

    /// Drag an endpoint. Ignored while a trip is in flight; after a finished
    /// trip the actors go back home onto the (new) start point.
    pub fn move_point(&mut self, which: PointKind, x: i32, y: i32) -> bool {
        if self.motion.is_active() {
            self.record(Action::MovePoint { which, x, y }, ActionOutcome::Ignored);
            return false;
        }
        if !self.grid.move_point(which, x, y) {
            return false;
        }
        self.motion.reset_to(self.grid.start);
        let moved_to = self.grid.point(which);
        debug!(?which, to = %moved_to, "point moved");
        self.record(
            Action::MovePoint {
                which,
                x: moved_to.x,
                y: moved_to.y,
            },
            ActionOutcome::Applied,
        );
        true
    }

    /// Enter or leave street blocking mode. Only possible while no trip is in
    /// flight.
    pub fn set_blocking_mode(&mut self, enabled: bool) -> bool {
        let action = Action::SetBlockingMode { enabled };
        if self.motion.is_active() || enabled == self.blocking_mode {
            self.record(action, ActionOutcome::Ignored);
            return false;
        }
        self.blocking_mode = enabled;
        if !enabled {
            self.highlighted_street = None;
        }
        info!(enabled, "street blocking mode");
        self.record(action, ActionOutcome::Applied);
        true
    }

    /// Track the pointer (grid units) and highlight the street under it while
    /// blocking mode is on
    pub fn hover(&mut self, fx: f64, fy: f64) -> Option<Edge> {
        self.highlighted_street = if self.blocking_mode {
            street_at(fx, fy, self.grid.size)
        } else {
            None
        };
        self.highlighted_street
    }

    /// Click at a pointer position in blocking mode: toggles the nearest
    /// street. Returns the street's new blocked state if one was hit.
    pub fn click_street(&mut self, fx: f64, fy: f64) -> Option<bool> {
        if !self.blocking_mode {
            return None;
        }
        let edge = street_at(fx, fy, self.grid.size)?;
        self.toggle_street(edge)
    }

    /// Block or unblock a street. Returns the new blocked state, or `None`
    /// when the grid can't be edited right now.
    pub fn toggle_street(&mut self, edge: Edge) -> Option<bool> {
        let action = Action::ToggleStreet {
            street: edge.to_string(),
        };
        if self.motion.is_active() || !edge.fits(self.grid.size) {
            self.record(action, ActionOutcome::Ignored);
            return None;
        }
        let blocked = self.grid.toggle_street(edge);
        // a finished trip no longer matches the streets
        if self.motion.state() == AnimationState::Completed {
            self.motion.reset_to(self.grid.start);
        }
        debug!(street = %edge, blocked, "street toggled");
        self.record(action, ActionOutcome::Applied);
        Some(blocked)
    }

    /// Unblock every street. Same locking rules as `toggle_street`.
    pub fn clear_streets(&mut self) -> bool {
        if self.motion.is_active() {
            self.record(Action::ClearStreets, ActionOutcome::Ignored);
            return false;
        }
        let cleared = self.grid.blocked.len();
        self.grid.clear_blocked();
        if self.motion.state() == AnimationState::Completed {
            self.motion.reset_to(self.grid.start);
        }
        info!(cleared, "blocked streets cleared");
        self.record(Action::ClearStreets, ActionOutcome::Applied);
        true
    }

    /// Start the trip in the current mode.
    ///
    /// Fails with `BlockingModeActive` while streets are being edited and with
    /// `PathNotFound` when the end can't be reached; either way the grid,
    /// points and animation stay exactly as they were.
    pub fn start(&mut self) -> ExplorerResult<()> {
        if self.blocking_mode {
            let err = ExplorerError::BlockingModeActive;
            self.record(Action::Start, ActionOutcome::Rejected(err.to_string()));
            return Err(err);
        }
        match self.motion.start(&self.grid, self.mode) {
            Ok(()) => {
                self.record(Action::Start, ActionOutcome::Applied);
                Ok(())
            }
            Err(e) => {
                self.record(Action::Start, ActionOutcome::Rejected(e.to_string()));
                Err(e)
            }
        }
    }

    pub fn pause(&mut self) {
        let before = self.motion.state();
        self.motion.pause();
        self.record_transition(Action::Pause, before);
    }

    pub fn resume(&mut self) {
        let before = self.motion.state();
        self.motion.resume();
        self.record_transition(Action::Resume, before);
    }

    /// Pause when running, resume when paused, start otherwise
    pub fn toggle_play(&mut self) -> ExplorerResult<()> {
        match self.motion.state() {
            AnimationState::Running => self.pause(),
            AnimationState::Paused => self.resume(),
            AnimationState::Idle | AnimationState::Completed => self.start()?,
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        let before = self.motion.state();
        self.motion.reset_to(self.grid.start);
        self.record_transition(Action::Reset, before);
    }

    /// Run the frames that are due. Call once per display refresh.
    pub fn pump(&mut self) -> usize {
        self.motion.pump()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridCell;
    use crate::scheduler::ManualScheduler;

    fn session() -> ExplorerSession<ManualScheduler> {
        ExplorerSession::from_config(&Config::default(), ManualScheduler::new())
    }

    #[test]
    fn test_move_point_ignored_while_running() {
        let mut s = session();
        s.start().unwrap();
        assert!(!s.move_point(PointKind::End, 5, 5));
        assert_eq!(s.grid().end, GridCell::new(11, 11));
    }

    #[test]
    fn test_move_start_after_completion_resets_actors() {
        let mut s = session();
        s.start().unwrap();
        let duration = s.motion().duration_ms();
        s.motion_mut().scheduler_mut().advance(duration);
        s.pump();
        assert_eq!(s.state(), AnimationState::Completed);

        assert!(s.move_point(PointKind::Start, 1, 2));
        assert_eq!(s.state(), AnimationState::Idle);
        assert_eq!(s.motion().flight_position(), (1.0, 2.0));
        assert_eq!(s.motion().street_position(), (1.0, 2.0));
    }

    #[test]
    fn test_start_rejected_in_blocking_mode() {
        let mut s = session();
        assert!(s.set_blocking_mode(true));
        assert_eq!(s.start(), Err(ExplorerError::BlockingModeActive));
        assert_eq!(s.state(), AnimationState::Idle);
    }

    #[test]
    fn test_blocking_mode_locked_while_animating() {
        let mut s = session();
        s.start().unwrap();
        assert!(!s.set_blocking_mode(true));
        s.pause();
        assert!(!s.set_blocking_mode(true));
        s.reset();
        assert!(s.set_blocking_mode(true));
    }

    #[test]
    fn test_click_street_toggles_nearest() {
        let mut s = session();
        assert_eq!(s.click_street(3.5, 3.05), None);

        s.set_blocking_mode(true);
        let edge = s.hover(3.5, 3.05).unwrap();
        assert_eq!(edge.to_string(), "3,3-4,3");
        assert_eq!(s.highlighted_street(), Some(edge));

        assert_eq!(s.click_street(3.5, 3.05), Some(true));
        assert!(s.grid().blocked.contains(&edge));
        assert_eq!(s.click_street(3.5, 2.95), Some(false));
        assert!(s.grid().blocked.is_empty());

        s.set_blocking_mode(false);
        assert_eq!(s.highlighted_street(), None);
    }

    #[test]
    fn test_toggle_play_cycles() {
        let mut s = session();
        s.toggle_play().unwrap();
        assert_eq!(s.state(), AnimationState::Running);
        s.toggle_play().unwrap();
        assert_eq!(s.state(), AnimationState::Paused);
        s.toggle_play().unwrap();
        assert_eq!(s.state(), AnimationState::Running);
    }

    #[test]
    fn test_actions_are_logged() {
        let mut s = session();
        s.resume();
        s.start().unwrap();
        s.pause();
        let actions = s.action_log().get_actions();
        assert_eq!(actions.len(), 3);
        assert_eq!(actions[0].outcome, ActionOutcome::Ignored);
        assert_eq!(actions[1].action, Action::Start);
        assert_eq!(actions[2].outcome, ActionOutcome::Applied);
    }
}
