use thiserror::Error;

pub use crate::engine::geometry::GeometryError;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure of the channel between a team producer and the game master.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("timed out waiting for team commands")]
    Timeout,

    #[error("transport disconnected")]
    Disconnected,

    #[error("remote decision service failed: {0}")]
    Remote(String),
}

impl TransportError {
    /// Whether the producer can be expected back on a later tick.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Timeout => true,
            TransportError::Remote(_) => true,
            TransportError::Disconnected => false,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulatorError {
    #[error("simulator step failed: {0}")]
    Step(String),

    #[error("simulator roster mismatch for team {team}: expected {expected}, found {found}")]
    RosterMismatch { team: usize, expected: usize, found: usize },
}

#[derive(Error, Debug)]
pub enum MatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Simulator(#[from] SimulatorError),

    #[error("unknown team {0}")]
    UnknownTeam(usize),

    #[error("invalid team size for team {team}: expected {expected}, found {found}")]
    RosterMismatch { team: usize, expected: usize, found: usize },

    #[error("match already ended at tick {0}")]
    AlreadyEnded(u64),
}

pub type Result<T> = std::result::Result<T, MatchError>;
