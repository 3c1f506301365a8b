//! Decision thresholds
//!
//! | Threshold | Meaning |
//! |-----------|---------|
//! | goal | waypoint counts as reached |
//! | possession | player controls the ball |
//! | intercept | an opponent contests the ball |
//! | kick_cone | max bearing error for attaching a kick |

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdsConfig {
    /// Waypoint reach distance (m)
    pub goal_m: f64,
    /// Ball possession distance (m)
    pub possession_m: f64,
    /// Opponent-to-ball distance that makes the ball contested (m)
    pub intercept_m: f64,
    /// Bearing error under which a kick is attached (rad)
    pub kick_cone_rad: f64,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            goal_m: 0.2,
            possession_m: 0.2,
            intercept_m: 0.2,
            kick_cone_rad: 0.3,
        }
    }
}

impl ThresholdsConfig {
    /// Looser thresholds for short demo matches.
    pub fn quick() -> Self {
        Self {
            goal_m: 0.3,
            possession_m: 0.25,
            intercept_m: 0.3,
            kick_cone_rad: 0.45,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        let all = [
            ("goal_m", self.goal_m),
            ("possession_m", self.possession_m),
            ("intercept_m", self.intercept_m),
            ("kick_cone_rad", self.kick_cone_rad),
        ];
        for (name, value) in all {
            if !(value.is_finite() && value > 0.0) {
                return Err(format!("threshold {name} must be positive, got {value}"));
            }
        }
        Ok(())
    }
}
