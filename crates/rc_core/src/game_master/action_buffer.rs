//! Merged per-tick commands of every team

use serde::{Deserialize, Serialize};

use crate::config::MissingTeamPolicy;
use crate::engine::command::DriveCommand;
use crate::error::{MatchError, Result};

/// One team's slot: a command per robot plus the per-tick `updated` flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamActions {
    commands: Vec<DriveCommand>,
    updated: bool,
}

impl TeamActions {
    pub fn commands(&self) -> &[DriveCommand] {
        &self.commands
    }

    pub fn is_updated(&self) -> bool {
        self.updated
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionBuffer {
    teams: Vec<TeamActions>,
}

impl ActionBuffer {
    /// Every slot starts with the stop command.
    pub fn new(number_of_teams: usize, roster_size: usize) -> Self {
        let teams = (0..number_of_teams)
            .map(|_| TeamActions { commands: vec![DriveCommand::STOP; roster_size], updated: false })
            .collect();
        Self { teams }
    }

    pub fn number_of_teams(&self) -> usize {
        self.teams.len()
    }

    pub fn team(&self, team_id: usize) -> Option<&TeamActions> {
        self.teams.get(team_id)
    }

    pub fn teams(&self) -> &[TeamActions] {
        &self.teams
    }

    pub fn reset_flags(&mut self) {
        for team in &mut self.teams {
            team.updated = false;
        }
    }

    /// Store a team's command set and mark it updated.
    pub fn write(&mut self, team_id: usize, commands: Vec<DriveCommand>) -> Result<()> {
        let slot = self.teams.get_mut(team_id).ok_or(MatchError::UnknownTeam(team_id))?;
        if commands.len() != slot.commands.len() {
            return Err(MatchError::RosterMismatch {
                team: team_id,
                expected: slot.commands.len(),
                found: commands.len(),
            });
        }
        slot.commands = commands.into_iter().map(DriveCommand::sanitized).collect();
        slot.updated = true;
        Ok(())
    }

    pub fn all_updated(&self) -> bool {
        self.teams.iter().all(|t| t.updated)
    }

    pub fn missing_teams(&self) -> Vec<usize> {
        self.teams
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.updated)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Fill the slots of teams that did not report this tick.
    pub fn apply_fallback(&mut self, policy: MissingTeamPolicy) {
        for team in self.teams.iter_mut().filter(|t| !t.updated) {
            match policy {
                MissingTeamPolicy::ReusePrevious => {}
                MissingTeamPolicy::ZeroCommand => team.commands.fill(DriveCommand::STOP),
            }
        }
    }
}
