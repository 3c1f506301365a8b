//! Steering: pure-pursuit toward a point, expressed as wheel rates.

use crate::config::DriveConfig;

use super::command::DriveCommand;
use super::coordinates::{wrap_angle, Frame, Point, Pose};
use super::geometry::{distance, pursuit_curvature};

/// Drive toward `target` along the pursuit arc.
///
/// Targets behind the robot are handled by turning in place first.
pub fn steer_toward<F: Frame>(pose: &Pose<F>, target: Point<F>, drive: &DriveConfig) -> DriveCommand {
    if distance(pose.position, target) <= drive.arrive_distance {
        return DriveCommand::STOP;
    }

    let bearing = bearing_to(pose, target);
    if bearing.abs() > std::f64::consts::FRAC_PI_2 {
        return spin_in_place(bearing, drive);
    }

    let curvature = pursuit_curvature(pose, target);
    wheel_rates(curvature, drive).sanitized()
}

/// Angle between the heading and the direction to `target`, in (-π, π].
pub fn bearing_to<F: Frame>(pose: &Pose<F>, target: Point<F>) -> f64 {
    let d = target.coords() - pose.position.coords();
    wrap_angle(d.y.atan2(d.x) - pose.heading)
}

fn spin_in_place(bearing: f64, drive: &DriveConfig) -> DriveCommand {
    let rate = drive.spin_rate.min(drive.max_wheel_rate);
    if bearing >= 0.0 {
        DriveCommand::new(-rate, rate)
    } else {
        DriveCommand::new(rate, -rate)
    }
}

/// Differential wheel rates following `curvature` at cruise speed.
pub fn wheel_rates(curvature: f64, drive: &DriveConfig) -> DriveCommand {
    let v = drive.cruise_speed;
    let half_base = drive.wheel_base * 0.5;
    let mut left = v * (1.0 - curvature * half_base) / drive.wheel_radius;
    let mut right = v * (1.0 + curvature * half_base) / drive.wheel_radius;

    let peak = left.abs().max(right.abs());
    if peak > drive.max_wheel_rate {
        let scale = drive.max_wheel_rate / peak;
        left *= scale;
        right *= scale;
    }
    DriveCommand::new(left, right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::coordinates::Efcs;

    fn drive() -> DriveConfig {
        DriveConfig::default()
    }

    #[test]
    fn straight_ahead_drives_both_wheels_equally() {
        let pose = Pose::<Efcs>::new(0.0, 0.0, 0.0);
        let cmd = steer_toward(&pose, Point::new(3.0, 0.0), &drive());
        assert_eq!(cmd.left_wheel_rate, cmd.right_wheel_rate);
        assert!((cmd.left_wheel_rate - 20.0).abs() < 1e-9);
    }

    #[test]
    fn left_target_speeds_up_right_wheel() {
        let pose = Pose::<Efcs>::new(0.0, 0.0, 0.0);
        let cmd = steer_toward(&pose, Point::new(1.0, 1.0), &drive());
        assert!(cmd.right_wheel_rate > cmd.left_wheel_rate);

        let mirrored = steer_toward(&pose, Point::new(1.0, -1.0), &drive());
        assert!((mirrored.left_wheel_rate - cmd.right_wheel_rate).abs() < 1e-9);
    }

    #[test]
    fn target_behind_turns_in_place() {
        let pose = Pose::<Efcs>::new(0.0, 0.0, 0.0);
        let cmd = steer_toward(&pose, Point::new(-2.0, 0.5), &drive());
        assert_eq!(cmd.left_wheel_rate, -cmd.right_wheel_rate);
        assert!(cmd.right_wheel_rate > 0.0);
    }

    #[test]
    fn arrived_robot_stops() {
        let pose = Pose::<Efcs>::new(1.0, 1.0, 0.3);
        assert_eq!(steer_toward(&pose, Point::new(1.0, 1.01), &drive()), DriveCommand::STOP);
    }

    #[test]
    fn rates_respect_wheel_limit() {
        let cmd = wheel_rates(50.0, &drive());
        assert!(cmd.left_wheel_rate.abs() <= drive().max_wheel_rate + 1e-9);
        assert!(cmd.right_wheel_rate.abs() <= drive().max_wheel_rate + 1e-9);
        assert!(cmd.right_wheel_rate > 0.0);
    }
}
