//! Contract with the external physics simulator

use crate::engine::snapshot::WorldState;
use crate::error::SimulatorError;

use super::action_buffer::ActionBuffer;
use super::match_state::ScoreEvent;

#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub world: WorldState,
    pub score_event: ScoreEvent,
}

/// Physics integrator advanced once per tick with the merged commands.
pub trait Simulator {
    fn step(&mut self, actions: &ActionBuffer) -> Result<StepOutcome, SimulatorError>;

    /// Current positions, for snapshots and visualizers.
    fn world(&self) -> WorldState;
}

impl<S: Simulator + ?Sized> Simulator for Box<S> {
    fn step(&mut self, actions: &ActionBuffer) -> Result<StepOutcome, SimulatorError> {
        (**self).step(actions)
    }

    fn world(&self) -> WorldState {
        (**self).world()
    }
}
