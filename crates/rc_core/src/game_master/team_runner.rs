//! Team producers
//!
//! A producer answers the newest [`TickMessage`] it has received with one
//! command set; snapshots it fell behind on are skipped. [`TeamRunner`] drives local [`PlayerController`]s,
//! [`PullTeam`] asks a [`DecisionService`] per player.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::MatchConfig;
use crate::engine::command::DriveCommand;
use crate::engine::snapshot::{GameStateSnapshot, TeamSnapshot};
use crate::error::TransportError;
use crate::player::PlayerController;

use super::match_state::MatchSummary;
use super::transport::{DecisionService, TeamHandle, TickMessage};

pub struct TeamRunner {
    handle: TeamHandle,
    controllers: Vec<PlayerController>,
}

impl TeamRunner {
    pub fn new(handle: TeamHandle, config: &MatchConfig) -> Self {
        let controllers = (0..handle.roster_size()).map(|id| PlayerController::new(id, config)).collect();
        Self { handle, controllers }
    }

    pub fn team_id(&self) -> usize {
        self.handle.team_id()
    }

    pub fn handle(&self) -> &TeamHandle {
        &self.handle
    }

    pub fn controller_mut(&mut self, player_id: usize) -> Option<&mut PlayerController> {
        self.controllers.get_mut(player_id)
    }

    /// One command per controller, in roster order.
    ///
    /// Controllers only read their own view of the shared snapshot, so they
    /// are evaluated in parallel.
    pub fn decide_all(&mut self, team: &Arc<TeamSnapshot>) -> Vec<DriveCommand> {
        self.controllers
            .par_iter_mut()
            .map(|controller| {
                let snapshot = GameStateSnapshot::new(Arc::clone(team), controller.player_id());
                controller.decide(&snapshot)
            })
            .collect()
    }

    /// Answer the newest queued tick; `Some` once the match has ended.
    pub fn serve_tick(&mut self) -> Result<Option<MatchSummary>, TransportError> {
        match self.handle.recv_latest()? {
            TickMessage::Snapshot(team) => {
                let commands = self.decide_all(&team);
                self.handle.submit(team.tick, commands)?;
                Ok(None)
            }
            TickMessage::MatchEnded(summary) => {
                debug!(team = self.team_id(), "match ended, team runner stopping");
                Ok(Some(summary))
            }
        }
    }

    /// Serve ticks until the match ends.
    pub fn run(mut self) -> Result<MatchSummary, TransportError> {
        loop {
            if let Some(summary) = self.serve_tick()? {
                return Ok(summary);
            }
        }
    }
}

/// Team whose decisions come from a pull-based service.
pub struct PullTeam<S> {
    handle: TeamHandle,
    service: S,
}

impl<S: DecisionService> PullTeam<S> {
    pub fn new(handle: TeamHandle, service: S) -> Self {
        Self { handle, service }
    }

    /// Query every player. Any failure skips this tick's submission.
    pub fn request_team(&mut self, team: &TeamSnapshot) -> Result<Vec<DriveCommand>, TransportError> {
        team.players
            .iter()
            .enumerate()
            .map(|(player_id, pose)| {
                self.service
                    .request_player_action(team.team_id, player_id, *pose, team.ball_position)
                    .map(DriveCommand::sanitized)
            })
            .collect()
    }

    /// Answer the newest queued tick; `Some` once the match has ended.
    pub fn serve_tick(&mut self) -> Result<Option<MatchSummary>, TransportError> {
        let team = match self.handle.recv_latest()? {
            TickMessage::Snapshot(team) => team,
            TickMessage::MatchEnded(summary) => return Ok(Some(summary)),
        };
        match self.request_team(&team) {
            Ok(commands) => self.handle.submit(team.tick, commands)?,
            Err(err) if err.is_retryable() => {
                warn!(tick = team.tick, team = team.team_id, %err, "decision service failed, skipping tick");
            }
            Err(err) => return Err(err),
        }
        Ok(None)
    }

    pub fn run(mut self) -> Result<MatchSummary, TransportError> {
        loop {
            if let Some(summary) = self.serve_tick()? {
                return Ok(summary);
            }
        }
    }
}
