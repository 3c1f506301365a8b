//! # rc_core - Tick-Synchronized Robot Soccer Core
//!
//! Game master and per-player decision engine for small-size robot soccer.
//!
//! ## Features
//! - One simulator step per tick, behind a per-tick barrier with deadline
//! - Degraded ticks instead of stalls when a team misses the deadline
//! - Frame-typed geometry (world frame vs. each team's ego frame)
//! - Priority-ordered player decisions over immutable snapshots
//!
//! ```text
//! TeamRunner ──submit──► GameMaster ──step──► Simulator
//!     ▲                      │
//!     └──── TeamSnapshot ────┘
//! ```

// Game engine APIs often require many parameters for physics, state, etc.
#![allow(clippy::too_many_arguments)]
// Doc formatting lints - purely cosmetic, fix incrementally
#![allow(clippy::doc_lazy_continuation)]

pub mod config;
pub mod engine;
pub mod error;
pub mod game_master;
pub mod player;

pub use config::{DriveConfig, FieldConfig, MatchConfig, MissingTeamPolicy, ThresholdsConfig};
pub use engine::{DriveCommand, ExtraAction, GameStateSnapshot, Point, Pose, TeamSnapshot, WorldState};
pub use error::{ConfigError, MatchError, Result, SimulatorError, TransportError};
pub use game_master::{GameMaster, MatchPhase, MatchSummary, ScoreEvent, Simulator, TeamRunner};
pub use player::{PlayerController, PlayerMode};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
