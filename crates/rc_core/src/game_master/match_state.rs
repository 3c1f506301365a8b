//! Score, tick counter and match phase

use serde::{Deserialize, Serialize};

/// Score event reported by the simulator. Wire code `0` = no goal,
/// `1..=n` = team `code - 1` scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ScoreEvent(pub u8);

impl ScoreEvent {
    pub const NONE: ScoreEvent = ScoreEvent(0);

    pub fn for_team(team_id: usize) -> Self {
        ScoreEvent(team_id as u8 + 1)
    }

    pub fn code(self) -> u8 {
        self.0
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Scoring team, `None` for no goal or an out-of-range code.
    pub fn scoring_team(self, number_of_teams: usize) -> Option<usize> {
        let code = self.0 as usize;
        if code == 0 || code > number_of_teams {
            None
        } else {
            Some(code - 1)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    Running,
    Ended,
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    goals: Vec<u32>,
    current_tick: u64,
    tick_limit: u64,
    phase: MatchPhase,
}

impl MatchState {
    pub fn new(number_of_teams: usize, tick_limit: u64) -> Self {
        Self {
            goals: vec![0; number_of_teams],
            current_tick: 0,
            tick_limit,
            phase: MatchPhase::Running,
        }
    }

    pub fn goals(&self) -> &[u32] {
        &self.goals
    }

    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    pub fn tick_limit(&self) -> u64 {
        self.tick_limit
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        self.phase != MatchPhase::Running
    }

    /// Returns the team credited with the goal, if any.
    pub fn record_score(&mut self, event: ScoreEvent) -> Option<usize> {
        let team = event.scoring_team(self.goals.len())?;
        self.goals[team] += 1;
        Some(team)
    }

    /// Count one finished tick; ends the match at `tick_limit`.
    pub fn advance_tick(&mut self) -> MatchPhase {
        self.current_tick += 1;
        if self.current_tick >= self.tick_limit {
            self.phase = MatchPhase::Ended;
        }
        self.phase
    }

    pub fn abort(&mut self) {
        if self.phase == MatchPhase::Running {
            self.phase = MatchPhase::Aborted;
        }
    }
}

/// Final report, always produced at match end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub goals: Vec<u32>,
    pub ticks_played: u64,
    pub degraded_ticks: u64,
    pub phase: MatchPhase,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_codes_map_to_teams() {
        assert_eq!(ScoreEvent::NONE.scoring_team(2), None);
        assert_eq!(ScoreEvent(1).scoring_team(2), Some(0));
        assert_eq!(ScoreEvent(2).scoring_team(2), Some(1));
        assert_eq!(ScoreEvent(3).scoring_team(2), None);
        assert_eq!(ScoreEvent::for_team(1), ScoreEvent(2));
    }

    #[test]
    fn goals_only_change_on_score_events() {
        let mut state = MatchState::new(2, 10);
        assert_eq!(state.record_score(ScoreEvent::NONE), None);
        assert_eq!(state.record_score(ScoreEvent(2)), Some(1));
        assert_eq!(state.record_score(ScoreEvent(9)), None);
        assert_eq!(state.goals(), &[0, 1]);
    }

    #[test]
    fn ends_exactly_at_tick_limit() {
        let mut state = MatchState::new(2, 3);
        assert_eq!(state.advance_tick(), MatchPhase::Running);
        assert_eq!(state.advance_tick(), MatchPhase::Running);
        assert_eq!(state.advance_tick(), MatchPhase::Ended);
        assert_eq!(state.current_tick(), 3);
        state.abort();
        assert_eq!(state.phase(), MatchPhase::Ended);
    }
}
