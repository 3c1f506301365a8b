//! # Game Master
//!
//! Owns the match: collects one command set per team per tick behind the
//! [`TickBarrier`], advances the simulator exactly once per tick, keeps score
//! and publishes the next snapshot.
//!
//! ## Tick protocol
//! ```text
//! reset flags ─► barrier (all teams | deadline) ─► fallback for missing teams
//!             ─► Simulator::step ─► score ─► tick += 1 ─► Ended | publish snapshot
//! ```
//!
//! Abort requests are honoured between ticks only.

mod action_buffer;
mod barrier;
mod match_state;
mod simulator;
mod team_runner;
mod transport;


pub use action_buffer::{ActionBuffer, TeamActions};
pub use barrier::{BarrierRelease, TickBarrier};
pub use match_state::{MatchPhase, MatchState, MatchSummary, ScoreEvent};
pub use simulator::{Simulator, StepOutcome};
pub use team_runner::{PullTeam, TeamRunner};
pub use transport::{
    BallChaserService, DecisionService, TeamHandle, TeamSubmission, TickMessage,
};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::MatchConfig;
use crate::engine::command::DriveCommand;
use crate::engine::snapshot::WorldState;
use crate::error::{MatchError, Result, SimulatorError};

/// What happened during one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Tick that was executed.
    pub tick: u64,
    pub release: BarrierRelease,
    /// Teams that missed the deadline and got the fallback.
    pub missing_teams: Vec<usize>,
    pub scoring_team: Option<usize>,
    pub phase: MatchPhase,
    /// Teams that received the next snapshot.
    pub snapshots_published: usize,
}

impl TickReport {
    pub fn is_degraded(&self) -> bool {
        !self.missing_teams.is_empty()
    }
}

pub struct GameMaster<S: Simulator> {
    config: MatchConfig,
    simulator: S,
    state: MatchState,
    buffer: ActionBuffer,
    barrier: TickBarrier,
    submit_tx: Sender<TeamSubmission>,
    subscribers: Vec<Option<Sender<TickMessage>>>,
    world: WorldState,
    degraded_ticks: u64,
    abort: Arc<AtomicBool>,
    started: bool,
}

impl<S: Simulator> GameMaster<S> {
    pub fn new(config: MatchConfig, simulator: S) -> Result<Self> {
        config.validate()?;
        let world = simulator.world();
        check_roster(&config, &world)?;

        let (submit_tx, inbox) = mpsc::channel();
        Ok(Self {
            buffer: ActionBuffer::new(config.number_of_teams, config.number_of_robots),
            state: MatchState::new(config.number_of_teams, config.tick_limit),
            barrier: TickBarrier::new(inbox, config.tick_timeout()),
            subscribers: vec![None; config.number_of_teams],
            submit_tx,
            world,
            simulator,
            config,
            degraded_ticks: 0,
            abort: Arc::new(AtomicBool::new(false)),
            started: false,
        })
    }

    /// Link a producer to `team_id`. Reconnecting replaces the previous link.
    pub fn connect_team(&mut self, team_id: usize) -> Result<TeamHandle> {
        let slot = self.subscribers.get_mut(team_id).ok_or(MatchError::UnknownTeam(team_id))?;
        let (tx, rx) = mpsc::channel();
        if self.started && !self.state.is_over() {
            let snapshot = self.world.team_snapshot(self.state.current_tick(), team_id);
            // The receiver is alive: it is returned below.
            let _ = tx.send(TickMessage::Snapshot(Arc::new(snapshot)));
        }
        *slot = Some(tx);
        Ok(TeamHandle::new(team_id, self.config.number_of_robots, self.submit_tx.clone(), rx))
    }

    /// In-process submission for the current tick.
    pub fn submit_team_commands(&self, team_id: usize, commands: Vec<DriveCommand>) -> Result<()> {
        if team_id >= self.config.number_of_teams {
            return Err(MatchError::UnknownTeam(team_id));
        }
        if commands.len() != self.config.number_of_robots {
            return Err(MatchError::RosterMismatch {
                team: team_id,
                expected: self.config.number_of_robots,
                found: commands.len(),
            });
        }
        // The game master holds the receiving end for its whole lifetime.
        let _ = self.submit_tx.send(TeamSubmission {
            team_id,
            tick: self.state.current_tick(),
            commands,
        });
        Ok(())
    }

    /// Set to stop the match before the next tick.
    pub fn abort_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.abort)
    }

    /// Live goals and tick counter.
    pub fn game_state(&self) -> (&[u32], u64) {
        (self.state.goals(), self.state.current_tick())
    }

    pub fn match_state(&self) -> &MatchState {
        &self.state
    }

    /// Simulator positions, for visualizers.
    pub fn positions(&self) -> WorldState {
        self.simulator.world()
    }

    pub fn action_buffer(&self) -> &ActionBuffer {
        &self.buffer
    }

    pub fn simulator(&self) -> &S {
        &self.simulator
    }

    pub fn summary(&self) -> MatchSummary {
        MatchSummary {
            goals: self.state.goals().to_vec(),
            ticks_played: self.state.current_tick(),
            degraded_ticks: self.degraded_ticks,
            phase: self.state.phase(),
        }
    }

    /// Publish the opening snapshot. Called implicitly by the first tick.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        info!(
            teams = self.config.number_of_teams,
            robots = self.config.number_of_robots,
            tick_limit = self.config.tick_limit,
            "match started"
        );
        self.publish();
    }

    pub fn run_tick(&mut self) -> Result<TickReport> {
        if self.state.is_over() {
            return Err(MatchError::AlreadyEnded(self.state.current_tick()));
        }
        self.start();

        let tick = self.state.current_tick();
        self.buffer.reset_flags();
        let release = self.barrier.collect(tick, &mut self.buffer);

        let missing_teams = self.buffer.missing_teams();
        if !missing_teams.is_empty() {
            warn!(
                tick,
                missing = ?missing_teams,
                policy = ?self.config.missing_team_policy,
                "degraded tick: team commands missing, applying fallback"
            );
            self.buffer.apply_fallback(self.config.missing_team_policy);
        }

        // A failed step leaves the tick retryable and uncounted.
        let outcome = self.simulator.step(&self.buffer)?;
        check_roster(&self.config, &outcome.world)?;
        self.world = outcome.world;
        if !missing_teams.is_empty() {
            self.degraded_ticks += 1;
        }

        let scoring_team = self.state.record_score(outcome.score_event);
        if let Some(team) = scoring_team {
            info!(tick, team, goals = ?self.state.goals(), "goal");
        } else if !outcome.score_event.is_none() {
            warn!(tick, code = outcome.score_event.code(), "ignoring out-of-range score event");
        }

        let phase = self.state.advance_tick();
        let snapshots_published = match phase {
            MatchPhase::Running => self.publish(),
            _ => {
                self.finish();
                0
            }
        };
        debug!(tick, ?release, snapshots_published, "tick complete");

        Ok(TickReport { tick, release, missing_teams, scoring_team, phase, snapshots_published })
    }

    /// Run to completion or abort and return the final report.
    pub fn run(&mut self) -> Result<MatchSummary> {
        self.start();
        while !self.state.is_over() {
            if self.abort.load(Ordering::SeqCst) {
                warn!(tick = self.state.current_tick(), "match aborted between ticks");
                self.state.abort();
                self.finish();
                break;
            }
            self.run_tick()?;
        }
        Ok(self.summary())
    }

    fn publish(&mut self) -> usize {
        let tick = self.state.current_tick();
        let mut published = 0;
        for (team_id, slot) in self.subscribers.iter_mut().enumerate() {
            let Some(tx) = slot else { continue };
            let snapshot = Arc::new(self.world.team_snapshot(tick, team_id));
            if tx.send(TickMessage::Snapshot(snapshot)).is_ok() {
                published += 1;
            } else {
                debug!(tick, team = team_id, "team link closed");
                *slot = None;
            }
        }
        published
    }

    fn finish(&mut self) {
        let summary = self.summary();
        info!(
            goals = ?summary.goals,
            ticks = summary.ticks_played,
            degraded = summary.degraded_ticks,
            phase = ?summary.phase,
            "end of game"
        );
        for tx in self.subscribers.iter_mut().filter_map(Option::take) {
            let _ = tx.send(TickMessage::MatchEnded(summary.clone()));
        }
    }
}

fn check_roster(config: &MatchConfig, world: &WorldState) -> std::result::Result<(), SimulatorError> {
    if world.teams.len() != config.number_of_teams {
        return Err(SimulatorError::Step(format!(
            "simulator reports {} teams, match has {}",
            world.teams.len(),
            config.number_of_teams
        )));
    }
    for (team, poses) in world.teams.iter().enumerate() {
        if poses.len() != config.number_of_robots {
            return Err(SimulatorError::RosterMismatch {
                team,
                expected: config.number_of_robots,
                found: poses.len(),
            });
        }
    }
    Ok(())
}
