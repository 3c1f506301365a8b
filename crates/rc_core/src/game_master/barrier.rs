//! Tick barrier
//!
//! Waits until every team has submitted for the current tick or the deadline
//! passes, whichever comes first. Late, duplicate and malformed submissions
//! never block the tick.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::action_buffer::ActionBuffer;
use super::transport::TeamSubmission;

/// Why the barrier released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarrierRelease {
    AllReported,
    Deadline,
    Disconnected,
}

pub struct TickBarrier {
    inbox: Receiver<TeamSubmission>,
    timeout: Duration,
}

impl TickBarrier {
    pub fn new(inbox: Receiver<TeamSubmission>, timeout: Duration) -> Self {
        Self { inbox, timeout }
    }

    /// Collect submissions for `tick` into `buffer`.
    pub fn collect(&self, tick: u64, buffer: &mut ActionBuffer) -> BarrierRelease {
        let deadline = Instant::now() + self.timeout;
        loop {
            if buffer.all_updated() {
                return BarrierRelease::AllReported;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            let submission = if remaining.is_zero() {
                // Past the deadline: still take whatever already arrived.
                match self.inbox.try_recv() {
                    Ok(sub) => sub,
                    Err(_) => return BarrierRelease::Deadline,
                }
            } else {
                match self.inbox.recv_timeout(remaining) {
                    Ok(sub) => sub,
                    Err(RecvTimeoutError::Timeout) => return BarrierRelease::Deadline,
                    Err(RecvTimeoutError::Disconnected) => return BarrierRelease::Disconnected,
                }
            };
            accept(tick, submission, buffer);
        }
    }
}

fn accept(tick: u64, submission: TeamSubmission, buffer: &mut ActionBuffer) {
    let TeamSubmission { team_id, tick: sub_tick, commands } = submission;

    if sub_tick < tick {
        debug!(tick, team = team_id, submitted_for = sub_tick, "discarding stale submission");
        return;
    }
    if sub_tick > tick {
        warn!(tick, team = team_id, submitted_for = sub_tick, "discarding submission for a future tick");
        return;
    }
    if buffer.team(team_id).is_some_and(|t| t.is_updated()) {
        debug!(tick, team = team_id, "duplicate submission ignored");
        return;
    }
    if let Err(err) = buffer.write(team_id, commands) {
        warn!(tick, team = team_id, %err, "rejected team submission");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::command::DriveCommand;
    use std::sync::mpsc;

    fn submission(team_id: usize, tick: u64, n: usize, rate: f64) -> TeamSubmission {
        TeamSubmission { team_id, tick, commands: vec![DriveCommand::new(rate, rate); n] }
    }

    #[test]
    fn releases_early_when_all_reported() {
        let (tx, rx) = mpsc::channel();
        let barrier = TickBarrier::new(rx, Duration::from_secs(10));
        let mut buffer = ActionBuffer::new(2, 1);
        tx.send(submission(0, 3, 1, 1.0)).unwrap();
        tx.send(submission(1, 3, 1, 2.0)).unwrap();

        let started = Instant::now();
        assert_eq!(barrier.collect(3, &mut buffer), BarrierRelease::AllReported);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn deadline_releases_missing_team() {
        let (tx, rx) = mpsc::channel();
        let barrier = TickBarrier::new(rx, Duration::from_millis(5));
        let mut buffer = ActionBuffer::new(2, 1);
        tx.send(submission(0, 0, 1, 1.0)).unwrap();

        assert_eq!(barrier.collect(0, &mut buffer), BarrierRelease::Deadline);
        assert_eq!(buffer.missing_teams(), vec![1]);
    }

    #[test]
    fn stale_and_malformed_submissions_ignored() {
        let (tx, rx) = mpsc::channel();
        let barrier = TickBarrier::new(rx, Duration::from_millis(5));
        let mut buffer = ActionBuffer::new(2, 2);
        tx.send(submission(0, 4, 2, 9.0)).unwrap(); // stale
        tx.send(submission(1, 5, 3, 1.0)).unwrap(); // wrong roster
        tx.send(submission(0, 6, 2, 1.0)).unwrap(); // future
        tx.send(submission(0, 5, 2, 2.0)).unwrap();
        tx.send(submission(0, 5, 2, 3.0)).unwrap(); // duplicate

        assert_eq!(barrier.collect(5, &mut buffer), BarrierRelease::Deadline);
        assert_eq!(buffer.missing_teams(), vec![1]);
        assert_eq!(buffer.team(0).unwrap().commands()[0], DriveCommand::new(2.0, 2.0));
    }

    #[test]
    fn dropped_producers_release_barrier() {
        let (tx, rx) = mpsc::channel::<TeamSubmission>();
        drop(tx);
        let barrier = TickBarrier::new(rx, Duration::from_secs(10));
        let mut buffer = ActionBuffer::new(1, 1);
        assert_eq!(barrier.collect(0, &mut buffer), BarrierRelease::Disconnected);
    }
}
