//! Persistent per-player controller state
//!
//! The waypoint cursor is advanced by functions that take the state by value
//! and hand back the next one; nothing else mutates it.

use serde::{Deserialize, Serialize};

use crate::config::{DriveConfig, ThresholdsConfig};
use crate::engine::command::DriveCommand;
use crate::engine::coordinates::{Efcs, Point, Pose};
use crate::engine::geometry::distance;
use crate::engine::steering::steer_toward;
use crate::engine::trajectory::generate_cycloid_path;

/// What a player decided to do on its last tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlayerMode {
    #[default]
    Idle,
    FollowingWaypoints,
    ChasingBall,
    Passing,
    Intercepting,
    StrategicHold,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerControllerState {
    waypoints: Vec<Point<Efcs>>,
    current_goal: usize,
    pub goal_threshold: f64,
    pub possession_threshold: f64,
    pub intercept_threshold: f64,
    /// Reporting only, never an input to the next decision.
    pub mode: PlayerMode,
}

impl Default for PlayerControllerState {
    fn default() -> Self {
        Self::new(&ThresholdsConfig::default())
    }
}

impl PlayerControllerState {
    pub fn new(thresholds: &ThresholdsConfig) -> Self {
        Self {
            waypoints: Vec::new(),
            current_goal: 0,
            goal_threshold: thresholds.goal_m,
            possession_threshold: thresholds.possession_m,
            intercept_threshold: thresholds.intercept_m,
            mode: PlayerMode::Idle,
        }
    }

    /// Replace the route with a cycloid from `from` to `to`.
    pub fn with_cycloid_route(self, from: Point<Efcs>, to: Point<Efcs>) -> Self {
        self.with_route(generate_cycloid_path(from, to))
    }

    /// Replace the route; previous waypoints are discarded.
    pub fn with_route(self, waypoints: Vec<Point<Efcs>>) -> Self {
        Self { waypoints, current_goal: 0, ..self }
    }

    pub fn without_route(self) -> Self {
        self.with_route(Vec::new())
    }

    pub fn has_route(&self) -> bool {
        !self.waypoints.is_empty()
    }

    pub fn waypoints(&self) -> &[Point<Efcs>] {
        &self.waypoints
    }

    pub fn current_goal_index(&self) -> usize {
        self.current_goal
    }

    pub fn active_waypoint(&self) -> Option<Point<Efcs>> {
        if self.waypoints.is_empty() {
            return None;
        }
        self.waypoints.get(self.current_goal % self.waypoints.len()).copied()
    }

    /// Move the cursor to the next waypoint, wrapping around the route.
    pub fn advanced(self) -> Self {
        if self.waypoints.is_empty() {
            return self;
        }
        let next = (self.current_goal + 1) % self.waypoints.len();
        Self { current_goal: next, ..self }
    }

    pub fn with_mode(self, mode: PlayerMode) -> Self {
        Self { mode, ..self }
    }
}

/// Advance the cursor if the active waypoint is reached, then steer toward
/// the (possibly new) active waypoint.
pub fn pursue_waypoints(
    state: PlayerControllerState,
    pose: &Pose<Efcs>,
    drive: &DriveConfig,
) -> (PlayerControllerState, DriveCommand) {
    let Some(goal) = state.active_waypoint() else {
        return (state, DriveCommand::STOP);
    };

    let state = if distance(goal, pose.position) < state.goal_threshold {
        state.advanced()
    } else {
        state
    };

    let command = match state.active_waypoint() {
        Some(target) => steer_toward(pose, target, drive),
        None => DriveCommand::STOP,
    };
    (state, command)
}
