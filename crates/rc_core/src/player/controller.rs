//! Player decision engine
//!
//! One controller per field player. Every tick it reads the current
//! [`GameStateSnapshot`] and returns exactly one [`DriveCommand`].
//!
//! ## Decision priority
//! | # | Condition | Mode |
//! |---|-----------|------|
//! | 1 | index outside roster | Idle |
//! | 2 | player has the ball | Passing (or dribble when alone) |
//! | 3 | opponent contests the ball | Intercepting |
//! | 4 | closest teammate to the ball | ChasingBall |
//! | 5 | route assigned | FollowingWaypoints |
//! | 6 | otherwise | StrategicHold next to the ball carrier |

use tracing::debug;

use crate::config::{DriveConfig, FieldConfig, MatchConfig};
use crate::engine::command::{DriveCommand, ExtraAction};
use crate::engine::coordinates::{Efcs, Point, Pose};
use crate::engine::geometry::{
    arg_closest, arg_closest_excluding, distance, kick_slope, line_intersection_region, GoalMouth,
};
use crate::engine::snapshot::GameStateSnapshot;
use crate::engine::steering::{bearing_to, steer_toward};

use super::state::{pursue_waypoints, PlayerControllerState, PlayerMode};

/// Region corner used as the interception waypoint.
const INTERCEPT_CORNER: usize = 2;

/// Who controls the loose ball, from the defending team's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallControl {
    Free,
    Contested { opponent: usize },
}

impl BallControl {
    pub fn is_free(&self) -> bool {
        matches!(self, BallControl::Free)
    }
}

/// Teammate closest to `target_net`, never `self_index`.
pub fn select_pass_candidate(
    team: &[Point<Efcs>],
    self_index: usize,
    target_net: Point<Efcs>,
) -> Option<usize> {
    arg_closest_excluding(team, target_net, self_index)
}

/// Point that cuts the passing lane of `threatened`.
///
/// The most likely receiver is the opponent closest to `goal` other than
/// `threatened`. Falls back to the ball position whenever the geometry
/// degenerates.
pub fn compute_interception_target(
    snapshot: &GameStateSnapshot,
    opponents: &[Point<Efcs>],
    threatened: usize,
    goal: &GoalMouth,
) -> Point<Efcs> {
    let ball = snapshot.ball_position();

    let Some(threatened_pos) = opponents.get(threatened).copied() else {
        debug!(threatened, "threatened opponent outside roster, targeting ball");
        return ball;
    };
    let Some(candidate) = select_pass_candidate(opponents, threatened, goal.center()) else {
        debug!(threatened, "no opponent pass candidate, targeting ball");
        return ball;
    };
    let candidate_pos = opponents[candidate];

    let region = kick_slope(threatened_pos, candidate_pos)
        .and_then(|slope| line_intersection_region(ball, candidate_pos, slope, goal));
    match region {
        Ok(corners) => corners[INTERCEPT_CORNER],
        Err(err) => {
            debug!(threatened, candidate, %err, "interception geometry degenerate, targeting ball");
            ball
        }
    }
}

/// Support point next to `partner`: one unit ahead, one unit toward midline.
pub fn strategic_point(partner: Point<Efcs>) -> Point<Efcs> {
    let dy = if partner.y < 0.0 { 1.0 } else { -1.0 };
    partner.offset(1.0, dy)
}

pub fn hold_strategic_offset(
    own: &Pose<Efcs>,
    partner: Point<Efcs>,
    drive: &DriveConfig,
) -> DriveCommand {
    steer_toward(own, strategic_point(partner), drive)
}

#[derive(Debug, Clone)]
pub struct PlayerController {
    player_id: usize,
    state: PlayerControllerState,
    drive: DriveConfig,
    field: FieldConfig,
    kick_cone: f64,
}

impl PlayerController {
    pub fn new(player_id: usize, config: &MatchConfig) -> Self {
        Self {
            player_id,
            state: PlayerControllerState::new(&config.thresholds),
            drive: config.drive,
            field: config.field,
            kick_cone: config.thresholds.kick_cone_rad,
        }
    }

    pub fn player_id(&self) -> usize {
        self.player_id
    }

    pub fn state(&self) -> &PlayerControllerState {
        &self.state
    }

    pub fn mode(&self) -> PlayerMode {
        self.state.mode
    }

    /// Seed a cycloid route from `from` to `to`; the route is patrolled cyclically.
    pub fn go_to(&mut self, from: Point<Efcs>, to: Point<Efcs>) {
        self.update_state(|s| s.with_cycloid_route(from, to));
    }

    pub fn clear_route(&mut self) {
        self.update_state(PlayerControllerState::without_route);
    }

    fn update_state(&mut self, f: impl FnOnce(PlayerControllerState) -> PlayerControllerState) {
        let state = std::mem::take(&mut self.state);
        self.state = f(state);
    }

    pub fn has_ball(&self, snapshot: &GameStateSnapshot) -> bool {
        snapshot
            .own_pose()
            .map(|pose| {
                distance(pose.position, snapshot.ball_position()) <= self.state.possession_threshold
            })
            .unwrap_or(false)
    }

    pub fn closest_to_ball(&self, snapshot: &GameStateSnapshot) -> Option<usize> {
        arg_closest(&snapshot.team().own_positions(), snapshot.ball_position())
    }

    pub fn ball_is_free(&self, snapshot: &GameStateSnapshot) -> BallControl {
        let opponents = snapshot.team().opponents_efcs();
        let ball = snapshot.ball_position();
        match arg_closest(&opponents, ball) {
            Some(idx) if distance(opponents[idx], ball) <= self.state.intercept_threshold => {
                BallControl::Contested { opponent: idx }
            }
            _ => BallControl::Free,
        }
    }

    /// Decide this tick's command. The snapshot is not retained.
    pub fn decide(&mut self, snapshot: &GameStateSnapshot) -> DriveCommand {
        let (mode, command) = self.evaluate(snapshot);
        if mode != self.state.mode {
            debug!(
                tick = snapshot.tick(),
                team = snapshot.team().team_id,
                player = self.player_id,
                from = ?self.state.mode,
                to = ?mode,
                "player mode change"
            );
        }
        self.update_state(|s| s.with_mode(mode));
        command.sanitized()
    }

    fn evaluate(&mut self, snapshot: &GameStateSnapshot) -> (PlayerMode, DriveCommand) {
        let Some(pose) = snapshot.own_pose() else {
            debug_assert!(
                false,
                "player {} outside roster of {}",
                snapshot.player_index(),
                snapshot.team().roster_size()
            );
            return (PlayerMode::Idle, DriveCommand::STOP);
        };
        let team = snapshot.team().own_positions();
        let ball = snapshot.ball_position();

        if self.has_ball(snapshot) {
            let net = self.field.opponent_goal().center();
            return match select_pass_candidate(&team, snapshot.player_index(), net) {
                Some(candidate) => (PlayerMode::Passing, self.kick_toward(&pose, team[candidate])),
                None => (PlayerMode::ChasingBall, self.kick_toward(&pose, net)),
            };
        }

        if let BallControl::Contested { opponent } = self.ball_is_free(snapshot) {
            let goal = self.field.defended_goal();
            let opponents = snapshot.team().opponents_efcs();
            let target = compute_interception_target(snapshot, &opponents, opponent, &goal);
            return (PlayerMode::Intercepting, steer_toward(&pose, target, &self.drive));
        }

        let closest = self.closest_to_ball(snapshot);
        if closest == Some(snapshot.player_index()) {
            return (PlayerMode::ChasingBall, steer_toward(&pose, ball, &self.drive));
        }

        if self.state.has_route() {
            let state = std::mem::take(&mut self.state);
            let (state, command) = pursue_waypoints(state, &pose, &self.drive);
            self.state = state;
            return (PlayerMode::FollowingWaypoints, command);
        }

        let partner = closest.map(|idx| team[idx]).unwrap_or(ball);
        (PlayerMode::StrategicHold, hold_strategic_offset(&pose, partner, &self.drive))
    }

    /// Steer toward `target`, attaching a kick once it is inside the kick cone.
    fn kick_toward(&self, pose: &Pose<Efcs>, target: Point<Efcs>) -> DriveCommand {
        let command = steer_toward(pose, target, &self.drive);
        if bearing_to(pose, target).abs() <= self.kick_cone {
            command.with_action(ExtraAction::Kick)
        } else {
            command
        }
    }
}
