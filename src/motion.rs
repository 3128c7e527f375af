//! Time-driven motion of the flight and street actors.
//!
//! `MotionController` owns the animation state machine. Progress is derived
//! from the wall clock of the injected `Scheduler`, normalised against a trip
//! duration set by whichever actor travels farther, so both arrive together.

use crate::actor::{Actor, ActorKind, StreetHeading};
use crate::error::ExplorerResult;
use crate::grid::{GridCell, GridState};
use crate::metrics::flight_heading_degrees;
use crate::pathfinding::{find_path, path_length};
use crate::scheduler::{Scheduler, TickHandle};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

/// Default animation pace: milliseconds per unit of distance
pub const DEFAULT_MS_PER_UNIT: f64 = 300.0;

/// Pace must be a positive, finite number of milliseconds per unit
pub fn is_valid_pace(ms_per_unit: f64) -> bool {
    ms_per_unit.is_finite() && ms_per_unit > 0.0
}

/// Which actors take part in the animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayMode {
    #[serde(alias = "euclidean")]
    DirectOnly,
    #[serde(alias = "taxicab")]
    GridOnly,
    Both,
}

impl DisplayMode {
    pub fn uses_flight(&self) -> bool {
        matches!(self, DisplayMode::DirectOnly | DisplayMode::Both)
    }

    pub fn uses_street(&self) -> bool {
        matches!(self, DisplayMode::GridOnly | DisplayMode::Both)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnimationState {
    Idle,
    Running,
    Paused,
    Completed,
}

/// Position at fraction `progress` of a street path, travelled at constant
/// speed. Also returns the index of the street being driven.
pub fn position_along_path(path: &[GridCell], progress: f64) -> ((f64, f64), usize) {
    match path {
        [] => ((0.0, 0.0), 0),
        [only] => ((only.x as f64, only.y as f64), 0),
        _ => {
            let steps = path_length(path);
            let path_progress = progress.clamp(0.0, 1.0) * steps as f64;
            let edge_index = (path_progress.floor() as usize).min(steps - 1);
            let sub_progress = path_progress - edge_index as f64;

            let from = path[edge_index];
            let to = path[edge_index + 1];
            let x = from.x as f64 + (to.x - from.x) as f64 * sub_progress;
            let y = from.y as f64 + (to.y - from.y) as f64 * sub_progress;
            ((x, y), edge_index)
        }
    }
}

pub struct MotionController<S: Scheduler> {
    scheduler: S,
    ms_per_unit: f64,
    state: AnimationState,
    mode: DisplayMode,
    origin: GridCell,
    destination: GridCell,
    path: Option<Vec<GridCell>>,
    start_wall_clock: Option<f64>,
    paused_wall_clock: Option<f64>,
    /// Total time spent paused since the last start
    paused_total: f64,
    pending_tick: Option<TickHandle>,
    progress: f64,
    street_segment: usize,
    flight: Actor,
    street: Actor,
}

impl<S: Scheduler> MotionController<S> {
    /// Create an idle controller with both actors on `origin`.
    /// A pace that is not a positive finite number falls back to
    /// `DEFAULT_MS_PER_UNIT`.
    pub fn new(scheduler: S, ms_per_unit: f64, origin: GridCell) -> Self {
        let ms_per_unit = if is_valid_pace(ms_per_unit) {
            ms_per_unit
        } else {
            warn!(ms_per_unit, "invalid animation pace, using {}", DEFAULT_MS_PER_UNIT);
            DEFAULT_MS_PER_UNIT
        };
        MotionController {
            scheduler,
            ms_per_unit,
            state: AnimationState::Idle,
            mode: DisplayMode::Both,
            origin,
            destination: origin,
            path: None,
            start_wall_clock: None,
            paused_wall_clock: None,
            paused_total: 0.0,
            pending_tick: None,
            progress: 0.0,
            street_segment: 0,
            flight: Actor::new(ActorKind::Flight, origin),
            street: Actor::new(ActorKind::Street, origin),
        }
    }

    /// Start (or restart) the trip from `grid.start` to `grid.end`.
    ///
    /// When the mode needs the street actor and no street path exists, the
    /// call fails with `PathNotFound` and nothing about the controller
    /// changes.
    pub fn start(&mut self, grid: &GridState, mode: DisplayMode) -> ExplorerResult<()> {
        let path = if mode.uses_street() {
            match find_path(grid.start, grid.end, grid.size, &grid.blocked) {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!(start = %grid.start, end = %grid.end, "start rejected: {}", e);
                    return Err(e);
                }
            }
        } else {
            None
        };

        self.cancel_pending();

        self.mode = mode;
        self.origin = grid.start;
        self.destination = grid.end;
        self.path = path;
        self.flight.place_at(self.origin);
        self.street.place_at(self.origin);
        self.progress = 0.0;
        self.street_segment = 0;

        let now = self.scheduler.now();
        self.start_wall_clock = Some(now);
        self.paused_wall_clock = None;
        self.paused_total = 0.0;
        self.state = AnimationState::Running;

        info!(
            start = %self.origin,
            end = %self.destination,
            ?mode,
            duration_ms = self.duration_ms(),
            "animation started"
        );

        self.update(now);
        Ok(())
    }

    /// Freeze the animation. No-op unless running.
    pub fn pause(&mut self) {
        if self.state != AnimationState::Running {
            trace!(state = ?self.state, "pause ignored");
            return;
        }
        self.cancel_pending();
        let now = self.scheduler.now();
        self.paused_wall_clock = Some(now);
        self.state = AnimationState::Paused;
        debug!(progress = self.progress, "animation paused");
    }

    /// Continue from where `pause` left off. No-op unless paused.
    pub fn resume(&mut self) {
        if self.state != AnimationState::Paused {
            trace!(state = ?self.state, "resume ignored");
            return;
        }
        let now = self.scheduler.now();
        if let Some(paused_at) = self.paused_wall_clock.take() {
            let paused_for = now - paused_at;
            if let Some(start) = self.start_wall_clock.as_mut() {
                *start += paused_for;
            }
            self.paused_total += paused_for;
        }
        self.state = AnimationState::Running;
        debug!(progress = self.progress, paused_total_ms = self.paused_total, "animation resumed");
        self.update(now);
    }

    /// Back to idle with both actors on the current origin
    pub fn reset(&mut self) {
        let origin = self.origin;
        self.reset_to(origin);
    }

    /// Back to idle with both actors on `origin`. Safe from any state.
    pub fn reset_to(&mut self, origin: GridCell) {
        self.cancel_pending();
        self.state = AnimationState::Idle;
        self.origin = origin;
        self.destination = origin;
        self.path = None;
        self.start_wall_clock = None;
        self.paused_wall_clock = None;
        self.paused_total = 0.0;
        self.progress = 0.0;
        self.street_segment = 0;
        self.flight.place_at(origin);
        self.street.place_at(origin);
        debug!(%origin, "animation reset");
    }

    /// Deliver a scheduled frame. Ticks that are no longer pending (cancelled
    /// by pause, reset or a restart) are ignored. Returns true if a frame ran.
    pub fn on_tick(&mut self, handle: TickHandle) -> bool {
        if self.pending_tick != Some(handle) {
            trace!(tick = handle.id(), "ignoring stale tick");
            return false;
        }
        self.pending_tick = None;
        if self.state != AnimationState::Running {
            return false;
        }
        let now = self.scheduler.now();
        self.update(now);
        true
    }

    /// Run every tick the scheduler has ready. Returns the number of frames run.
    pub fn pump(&mut self) -> usize {
        let ready = self.scheduler.take_ready();
        let mut frames = 0;
        for handle in ready {
            if self.on_tick(handle) {
                frames += 1;
            }
        }
        frames
    }

    fn update(&mut self, now: f64) {
        let duration = self.duration_ms();
        let start = self.start_wall_clock.unwrap_or(now);
        let progress = if duration <= 0.0 {
            1.0
        } else {
            ((now - start) / duration).clamp(0.0, 1.0)
        };
        self.progress = progress;

        if progress >= 1.0 {
            self.complete();
            return;
        }

        if self.mode.uses_flight() {
            self.flight.move_between(self.origin, self.destination, progress);
        }

        if self.mode.uses_street() {
            if let Some(path) = self.path.as_deref() {
                if path.len() > 1 {
                    let ((x, y), segment) = position_along_path(path, progress);
                    self.street.fpos_x = x;
                    self.street.fpos_y = y;
                    self.street_segment = segment;
                }
            }
        }

        trace!(
            progress,
            flight = ?self.flight.position(),
            street = ?self.street.position(),
            "frame"
        );

        self.pending_tick = Some(self.scheduler.schedule_tick());
    }

    fn complete(&mut self) {
        self.state = AnimationState::Completed;
        self.progress = 1.0;
        if self.mode.uses_flight() {
            self.flight.place_at(self.destination);
        }
        if self.mode.uses_street() {
            self.street.place_at(self.destination);
            self.street_segment = self.path.as_deref().map(path_length).unwrap_or(0).saturating_sub(1);
        }
        info!(end = %self.destination, "animation completed");
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending_tick.take() {
            self.scheduler.cancel(handle);
        }
    }

    /// Wall-clock length of the whole trip, pauses excluded
    pub fn duration_ms(&self) -> f64 {
        let direct = self.origin.euclidean(&self.destination);
        match self.mode {
            DisplayMode::DirectOnly => direct * self.ms_per_unit,
            DisplayMode::GridOnly | DisplayMode::Both => {
                let steps = self.path.as_deref().map(path_length).unwrap_or(0) as f64;
                direct.max(steps) * self.ms_per_unit
            }
        }
    }

    /// Time the animation has actually been moving since the last start
    pub fn active_elapsed_ms(&self) -> f64 {
        let start = match self.start_wall_clock {
            Some(start) => start,
            None => return 0.0,
        };
        match self.state {
            AnimationState::Idle => 0.0,
            AnimationState::Running => (self.scheduler.now() - start).min(self.duration_ms()),
            AnimationState::Paused => self.paused_wall_clock.map(|p| p - start).unwrap_or(0.0),
            AnimationState::Completed => self.duration_ms(),
        }
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Whether an animation is in flight (running or paused)
    pub fn is_active(&self) -> bool {
        matches!(self.state, AnimationState::Running | AnimationState::Paused)
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn paused_total_ms(&self) -> f64 {
        self.paused_total
    }

    pub fn path(&self) -> Option<&[GridCell]> {
        self.path.as_deref()
    }

    pub fn flight(&self) -> &Actor {
        &self.flight
    }

    pub fn street(&self) -> &Actor {
        &self.street
    }

    pub fn flight_position(&self) -> (f64, f64) {
        self.flight.position()
    }

    pub fn street_position(&self) -> (f64, f64) {
        self.street.position()
    }

    /// Heading of the flight actor in degrees
    pub fn flight_heading(&self) -> f64 {
        flight_heading_degrees(self.origin, self.destination)
    }

    /// Orientation of the street leg the street actor is on
    pub fn street_heading(&self) -> StreetHeading {
        let leg = self
            .path
            .as_deref()
            .and_then(|path| path.get(self.street_segment).zip(path.get(self.street_segment + 1)));
        match leg {
            Some((from, to)) if from.x == to.x => StreetHeading::Vertical,
            _ => StreetHeading::Horizontal,
        }
    }

    pub fn pending_tick(&self) -> Option<TickHandle> {
        self.pending_tick
    }

    pub fn ms_per_unit(&self) -> f64 {
        self.ms_per_unit
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}
