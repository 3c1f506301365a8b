//! Per-player decision engine and its persistent state.

pub mod controller;
pub mod state;

pub use controller::{
    compute_interception_target, hold_strategic_offset, select_pass_candidate, strategic_point,
    BallControl, PlayerController,
};
pub use state::{pursue_waypoints, PlayerControllerState, PlayerMode};
