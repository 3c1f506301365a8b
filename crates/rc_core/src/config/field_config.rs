use serde::{Deserialize, Serialize};

use crate::engine::geometry::GoalMouth;

/// Field geometry, symmetric about the center in every EFCS.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub length_m: f64,
    pub width_m: f64,
    pub goal_width_m: f64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self { length_m: 9.0, width_m: 6.0, goal_width_m: 2.0 }
    }
}

impl FieldConfig {
    pub fn half_length(&self) -> f64 {
        self.length_m * 0.5
    }

    pub fn half_width(&self) -> f64 {
        self.width_m * 0.5
    }

    /// Goal a team defends, in that team's EFCS.
    pub fn defended_goal(&self) -> GoalMouth {
        GoalMouth { line_x: -self.half_length(), half_width: self.goal_width_m * 0.5 }
    }

    /// Goal a team attacks, in that team's EFCS.
    pub fn opponent_goal(&self) -> GoalMouth {
        GoalMouth { line_x: self.half_length(), half_width: self.goal_width_m * 0.5 }
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if !(self.length_m > 0.0 && self.width_m > 0.0) {
            return Err("field dimensions must be positive".to_string());
        }
        if !(self.goal_width_m > 0.0 && self.goal_width_m < self.width_m) {
            return Err(format!(
                "goal width {} must be positive and narrower than the field",
                self.goal_width_m
            ));
        }
        Ok(())
    }
}
