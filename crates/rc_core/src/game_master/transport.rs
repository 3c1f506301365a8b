//! Channels between the game master and team producers.
//!
//! Implementations:
//! - [`TeamHandle`]: in-process `mpsc` pair handed out by the game master
//! - [`DecisionService`]: pull-based per-player query (remote decision service)

use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::DriveConfig;
use crate::engine::command::DriveCommand;
use crate::engine::coordinates::{Efcs, Point, Pose};
use crate::engine::snapshot::TeamSnapshot;
use crate::engine::steering::steer_toward;
use crate::error::TransportError;

use super::match_state::MatchSummary;

/// One team's command set for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamSubmission {
    pub team_id: usize,
    pub tick: u64,
    pub commands: Vec<DriveCommand>,
}

/// Game master → team.
#[derive(Debug, Clone)]
pub enum TickMessage {
    Snapshot(Arc<TeamSnapshot>),
    MatchEnded(MatchSummary),
}

/// Producer side of one team's link to the game master.
pub struct TeamHandle {
    team_id: usize,
    roster_size: usize,
    submissions: Sender<TeamSubmission>,
    snapshots: Receiver<TickMessage>,
}

impl TeamHandle {
    pub(crate) fn new(
        team_id: usize,
        roster_size: usize,
        submissions: Sender<TeamSubmission>,
        snapshots: Receiver<TickMessage>,
    ) -> Self {
        Self { team_id, roster_size, submissions, snapshots }
    }

    pub fn team_id(&self) -> usize {
        self.team_id
    }

    pub fn roster_size(&self) -> usize {
        self.roster_size
    }

    /// Block until the next message from the game master.
    pub fn recv(&self) -> Result<TickMessage, TransportError> {
        self.snapshots.recv().map_err(|_| TransportError::Disconnected)
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<TickMessage, TransportError> {
        self.snapshots.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => TransportError::Timeout,
            RecvTimeoutError::Disconnected => TransportError::Disconnected,
        })
    }

    /// Block for the next message, then skip to the newest one already
    /// queued. Older snapshots are dropped; `MatchEnded` is returned as soon
    /// as it is seen.
    pub fn recv_latest(&self) -> Result<TickMessage, TransportError> {
        let mut latest = self.recv()?;
        loop {
            if matches!(latest, TickMessage::MatchEnded(_)) {
                return Ok(latest);
            }
            let Some(next) = self.try_recv() else {
                return Ok(latest);
            };
            if let TickMessage::Snapshot(stale) = &latest {
                debug!(team = self.team_id, tick = stale.tick, "skipping stale snapshot");
            }
            latest = next;
        }
    }

    /// Non-blocking receive; `None` when nothing is queued.
    pub fn try_recv(&self) -> Option<TickMessage> {
        self.snapshots.try_recv().ok()
    }

    pub fn submit(&self, tick: u64, commands: Vec<DriveCommand>) -> Result<(), TransportError> {
        self.submissions
            .send(TeamSubmission { team_id: self.team_id, tick, commands })
            .map_err(|_| TransportError::Disconnected)
    }
}

/// Remote decision service queried once per player per tick.
pub trait DecisionService {
    fn request_player_action(
        &mut self,
        team_id: usize,
        player_id: usize,
        player: Pose<Efcs>,
        ball: Point<Efcs>,
    ) -> Result<DriveCommand, TransportError>;
}

/// In-process service: every player drives straight at the ball.
#[derive(Debug, Clone)]
pub struct BallChaserService {
    drive: DriveConfig,
}

impl BallChaserService {
    pub fn new(drive: DriveConfig) -> Self {
        Self { drive }
    }
}

impl DecisionService for BallChaserService {
    fn request_player_action(
        &mut self,
        _team_id: usize,
        _player_id: usize,
        player: Pose<Efcs>,
        ball: Point<Efcs>,
    ) -> Result<DriveCommand, TransportError> {
        Ok(steer_toward(&player, ball, &self.drive))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::snapshot::WorldState;
    use crate::game_master::MatchPhase;
    use std::sync::mpsc;

    #[test]
    fn handle_tags_submissions_with_team() {
        let (sub_tx, sub_rx) = mpsc::channel();
        let (_snap_tx, snap_rx) = mpsc::channel();
        let handle = TeamHandle::new(1, 2, sub_tx, snap_rx);
        handle.submit(4, vec![DriveCommand::STOP; 2]).unwrap();

        let sub = sub_rx.recv().unwrap();
        assert_eq!((sub.team_id, sub.tick, sub.commands.len()), (1, 4, 2));
    }

    #[test]
    fn closed_master_reports_disconnect() {
        let (sub_tx, sub_rx) = mpsc::channel();
        let (snap_tx, snap_rx) = mpsc::channel::<TickMessage>();
        let handle = TeamHandle::new(0, 1, sub_tx, snap_rx);
        drop(snap_tx);
        drop(sub_rx);
        assert_eq!(handle.recv().unwrap_err(), TransportError::Disconnected);
        assert_eq!(handle.submit(0, vec![]).unwrap_err(), TransportError::Disconnected);
    }

    #[test]
    fn idle_master_times_out() {
        let (sub_tx, _sub_rx) = mpsc::channel();
        let (_snap_tx, snap_rx) = mpsc::channel::<TickMessage>();
        let handle = TeamHandle::new(0, 1, sub_tx, snap_rx);
        assert_eq!(
            handle.recv_timeout(Duration::from_millis(1)).unwrap_err(),
            TransportError::Timeout
        );
        assert!(handle.try_recv().is_none());
    }

    fn queued_snapshot(tick: u64) -> TickMessage {
        TickMessage::Snapshot(Arc::new(WorldState::default().team_snapshot(tick, 0)))
    }

    #[test]
    fn recv_latest_skips_to_newest_snapshot() {
        let (sub_tx, _sub_rx) = mpsc::channel();
        let (snap_tx, snap_rx) = mpsc::channel();
        let handle = TeamHandle::new(0, 1, sub_tx, snap_rx);
        for tick in 0..4 {
            snap_tx.send(queued_snapshot(tick)).unwrap();
        }

        match handle.recv_latest().unwrap() {
            TickMessage::Snapshot(team) => assert_eq!(team.tick, 3),
            other => panic!("expected snapshot, got {other:?}"),
        }
        assert!(handle.try_recv().is_none());
    }

    #[test]
    fn recv_latest_prefers_match_end() {
        let (sub_tx, _sub_rx) = mpsc::channel();
        let (snap_tx, snap_rx) = mpsc::channel();
        let handle = TeamHandle::new(0, 1, sub_tx, snap_rx);
        snap_tx.send(queued_snapshot(7)).unwrap();
        snap_tx
            .send(TickMessage::MatchEnded(MatchSummary {
                goals: vec![0],
                ticks_played: 8,
                degraded_ticks: 0,
                phase: MatchPhase::Ended,
            }))
            .unwrap();

        assert!(matches!(handle.recv_latest().unwrap(), TickMessage::MatchEnded(_)));
    }

    #[test]
    fn ball_chaser_steers_at_ball() {
        let mut service = BallChaserService::new(DriveConfig::default());
        let cmd = service
            .request_player_action(0, 0, Pose::new(0.0, 0.0, 0.0), Point::new(2.0, 0.0))
            .unwrap();
        assert!(cmd.left_wheel_rate > 0.0);
        assert_eq!(cmd.left_wheel_rate, cmd.right_wheel_rate);
    }
}
