use serde::{Deserialize, Serialize};

/// Differential-drive robot constants used by steering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Forward speed while pursuing (m/s)
    pub cruise_speed: f64,
    /// Distance between the wheels (m)
    pub wheel_base: f64,
    /// Wheel radius (m)
    pub wheel_radius: f64,
    /// Wheel rate limit (rad/s)
    pub max_wheel_rate: f64,
    /// Wheel rate used to turn in place (rad/s)
    pub spin_rate: f64,
    /// Closer than this the robot stops (m)
    pub arrive_distance: f64,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            cruise_speed: 1.0,
            wheel_base: 0.2,
            wheel_radius: 0.05,
            max_wheel_rate: 40.0,
            spin_rate: 10.0,
            arrive_distance: 0.02,
        }
    }
}

impl DriveConfig {
    pub(crate) fn validate(&self) -> Result<(), String> {
        let all = [
            ("cruise_speed", self.cruise_speed),
            ("wheel_base", self.wheel_base),
            ("wheel_radius", self.wheel_radius),
            ("max_wheel_rate", self.max_wheel_rate),
            ("spin_rate", self.spin_rate),
        ];
        for (name, value) in all {
            if !(value.is_finite() && value > 0.0) {
                return Err(format!("drive {name} must be positive, got {value}"));
            }
        }
        if !(self.arrive_distance.is_finite() && self.arrive_distance >= 0.0) {
            return Err(format!("drive arrive_distance must be >= 0, got {}", self.arrive_distance));
        }
        Ok(())
    }
}
