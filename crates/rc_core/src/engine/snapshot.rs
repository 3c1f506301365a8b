//! Per-tick game state snapshots
//!
//! ## Design Principles
//! 1. **Immutable**: created once per tick by the game master, never modified
//! 2. **Shared**: one `Arc<TeamSnapshot>` per team, every player borrows it
//! 3. **Ego frame**: own players and ball in EFCS, opponents as observed (WCS)
//!
//! ```text
//! Simulator::step ─► WorldState (WCS) ─► TeamSnapshot per team ─► GameStateSnapshot per player
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::coordinates::{Efcs, FieldSide, Point, Pose, Velocity, Wcs};

/// Simulator output in world coordinates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldState {
    /// Player poses per team, roster order.
    pub teams: Vec<Vec<Pose<Wcs>>>,
    pub ball_position: Point<Wcs>,
    pub ball_velocity: Velocity<Wcs>,
}

impl WorldState {
    /// Index of the team `team_id` plays against.
    pub fn opponent_of(&self, team_id: usize) -> Option<usize> {
        match self.teams.len() {
            2 => Some(1 - team_id.min(1)),
            _ => None,
        }
    }

    /// Ego view of the world for one team.
    pub fn team_snapshot(&self, tick: u64, team_id: usize) -> TeamSnapshot {
        let side = FieldSide::for_team(team_id);
        let players = self
            .teams
            .get(team_id)
            .map(|poses| poses.iter().map(|p| side.pose_to_efcs(*p)).collect())
            .unwrap_or_default();
        let opponents = self
            .opponent_of(team_id)
            .and_then(|opp| self.teams.get(opp))
            .map(|poses| poses.iter().map(|p| p.position).collect())
            .unwrap_or_default();

        TeamSnapshot {
            tick,
            team_id,
            side,
            players,
            opponents,
            ball_position: side.to_efcs(self.ball_position),
            ball_velocity: side.velocity_to_efcs(self.ball_velocity),
        }
    }
}

/// Read-only view of one tick for one team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSnapshot {
    pub tick: u64,
    pub team_id: usize,
    pub side: FieldSide,
    /// Own players, EFCS.
    pub players: Vec<Pose<Efcs>>,
    /// Opposing players as observed, WCS.
    pub opponents: Vec<Point<Wcs>>,
    pub ball_position: Point<Efcs>,
    pub ball_velocity: Velocity<Efcs>,
}

impl TeamSnapshot {
    pub fn own_positions(&self) -> Vec<Point<Efcs>> {
        self.players.iter().map(|p| p.position).collect()
    }

    pub fn opponents_efcs(&self) -> Vec<Point<Efcs>> {
        self.opponents.iter().map(|p| self.side.to_efcs(*p)).collect()
    }

    pub fn roster_size(&self) -> usize {
        self.players.len()
    }
}

/// The snapshot a single player decides from.
#[derive(Debug, Clone)]
pub struct GameStateSnapshot {
    team: Arc<TeamSnapshot>,
    player_index: usize,
}

impl GameStateSnapshot {
    pub fn new(team: Arc<TeamSnapshot>, player_index: usize) -> Self {
        Self { team, player_index }
    }

    pub fn team(&self) -> &TeamSnapshot {
        &self.team
    }

    pub fn tick(&self) -> u64 {
        self.team.tick
    }

    pub fn player_index(&self) -> usize {
        self.player_index
    }

    /// `None` when the index is outside the roster.
    pub fn own_pose(&self) -> Option<Pose<Efcs>> {
        self.team.players.get(self.player_index).copied()
    }

    pub fn ball_position(&self) -> Point<Efcs> {
        self.team.ball_position
    }

    pub fn ball_velocity(&self) -> Velocity<Efcs> {
        self.team.ball_velocity
    }
}
