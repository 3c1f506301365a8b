//! Per-player drive command

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Extra action attached to a drive command. Wire codes: 0 = none, 1 = kick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExtraAction {
    #[default]
    None,
    Kick,
}

impl ExtraAction {
    pub fn code(self) -> u8 {
        match self {
            ExtraAction::None => 0,
            ExtraAction::Kick => 1,
        }
    }

    /// Unknown codes map to `None`.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => ExtraAction::Kick,
            _ => ExtraAction::None,
        }
    }
}

/// Differential-drive command (wheel rates in rad/s).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DriveCommand {
    pub left_wheel_rate: f64,
    pub right_wheel_rate: f64,
    pub extra_action: ExtraAction,
}

impl DriveCommand {
    pub const STOP: DriveCommand = DriveCommand {
        left_wheel_rate: 0.0,
        right_wheel_rate: 0.0,
        extra_action: ExtraAction::None,
    };

    pub fn new(left_wheel_rate: f64, right_wheel_rate: f64) -> Self {
        Self { left_wheel_rate, right_wheel_rate, extra_action: ExtraAction::None }
    }

    pub fn with_action(mut self, action: ExtraAction) -> Self {
        self.extra_action = action;
        self
    }

    pub fn is_finite(&self) -> bool {
        self.left_wheel_rate.is_finite() && self.right_wheel_rate.is_finite()
    }

    /// Replace a non-finite command with [`DriveCommand::STOP`].
    pub fn sanitized(self) -> Self {
        if self.is_finite() {
            self
        } else {
            warn!(
                left = self.left_wheel_rate,
                right = self.right_wheel_rate,
                "non-finite drive command replaced with stop"
            );
            Self::STOP
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_command_becomes_stop() {
        let cmd = DriveCommand::new(f64::NAN, 1.0).with_action(ExtraAction::Kick);
        assert_eq!(cmd.sanitized(), DriveCommand::STOP);

        let ok = DriveCommand::new(2.0, -1.0);
        assert_eq!(ok.sanitized(), ok);
    }

    #[test]
    fn extra_action_codes() {
        assert_eq!(ExtraAction::from_code(ExtraAction::Kick.code()), ExtraAction::Kick);
        assert_eq!(ExtraAction::from_code(7), ExtraAction::None);
    }
}
