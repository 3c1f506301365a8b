//! Kinematic demo simulator
//!
//! Point robots on a differential drive, a point ball with linear friction,
//! side-wall bounces and goal detection. Enough physics to watch the
//! decision engine play; not a rigid-body model.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use rc_core::config::{DriveConfig, FieldConfig};
use rc_core::engine::{ExtraAction, FieldSide, Point, Pose, Velocity, Wcs, WorldState};
use rc_core::game_master::{ActionBuffer, ScoreEvent, Simulator, StepOutcome};
use rc_core::{MatchConfig, SimulatorError};

pub mod physics {
    /// Integration step per tick (s)
    pub const TICK_SEC: f64 = 0.05;

    /// Robot-ball center distance at which the robot touches the ball (m)
    pub const CONTACT_RADIUS_M: f64 = 0.12;

    /// Ball speed right after a kick (m/s)
    pub const KICK_SPEED: f64 = 4.0;

    /// Ball leaves a pushing robot this much faster than the robot (ratio)
    pub const PUSH_GAIN: f64 = 1.1;

    /// Linear ball deceleration (m/s²)
    pub const BALL_FRICTION: f64 = 0.6;

    /// Fraction of normal speed kept on a wall bounce
    pub const WALL_COR: f64 = 0.7;

    /// Kickoff placement jitter (m)
    pub const PLACEMENT_JITTER_M: f64 = 0.1;
}

pub struct KinematicSimulator {
    drive: DriveConfig,
    field: FieldConfig,
    number_of_robots: usize,
    world: WorldState,
    rng: ChaCha8Rng,
    dt: f64,
}

impl KinematicSimulator {
    pub fn new(config: &MatchConfig, seed: u64) -> Self {
        let mut sim = Self {
            drive: config.drive,
            field: config.field,
            number_of_robots: config.number_of_robots,
            world: WorldState { teams: vec![Vec::new(); config.number_of_teams], ..WorldState::default() },
            rng: ChaCha8Rng::seed_from_u64(seed),
            dt: physics::TICK_SEC,
        };
        sim.kickoff();
        sim
    }

    /// Ball to the center spot, every team back into its own half.
    pub fn kickoff(&mut self) {
        let half_length = self.field.half_length();
        let half_width = self.field.half_width();
        let robots = self.number_of_robots;

        for (team_id, poses) in self.world.teams.iter_mut().enumerate() {
            let side = FieldSide::for_team(team_id);
            *poses = (0..robots)
                .map(|i| {
                    let lane = (i as f64 + 1.0) / (robots as f64 + 1.0);
                    let depth = if i % 2 == 0 { 0.25 } else { 0.55 };
                    let x = -half_length * depth
                        + self.rng.gen_range(-physics::PLACEMENT_JITTER_M..=physics::PLACEMENT_JITTER_M);
                    let y = half_width * (2.0 * lane - 1.0) * 0.8
                        + self.rng.gen_range(-physics::PLACEMENT_JITTER_M..=physics::PLACEMENT_JITTER_M);
                    side.pose_to_wcs(Pose::new(x, y, 0.0))
                })
                .collect();
        }
        self.world.ball_position = Point::origin();
        self.world.ball_velocity = Velocity::zero();
    }

    fn check_buffer(&self, actions: &ActionBuffer) -> Result<(), SimulatorError> {
        if actions.number_of_teams() != self.world.teams.len() {
            return Err(SimulatorError::Step(format!(
                "action buffer has {} teams, simulator has {}",
                actions.number_of_teams(),
                self.world.teams.len()
            )));
        }
        for (team, slot) in actions.teams().iter().enumerate() {
            if slot.commands().len() != self.number_of_robots {
                return Err(SimulatorError::RosterMismatch {
                    team,
                    expected: self.number_of_robots,
                    found: slot.commands().len(),
                });
            }
        }
        Ok(())
    }

    fn move_robots(&mut self, actions: &ActionBuffer) {
        let r = self.drive.wheel_radius;
        let b = self.drive.wheel_base;
        let half_length = self.field.half_length();
        let half_width = self.field.half_width();
        let dt = self.dt;

        for (poses, slot) in self.world.teams.iter_mut().zip(actions.teams()) {
            for (pose, cmd) in poses.iter_mut().zip(slot.commands()) {
                let v_left = cmd.left_wheel_rate * r;
                let v_right = cmd.right_wheel_rate * r;
                let v = 0.5 * (v_left + v_right);
                let omega = (v_right - v_left) / b;

                let heading = pose.heading + omega * dt;
                let x = (pose.position.x + v * heading.cos() * dt).clamp(-half_length, half_length);
                let y = (pose.position.y + v * heading.sin() * dt).clamp(-half_width, half_width);
                *pose = Pose::new(x, y, rc_core::engine::wrap_angle(heading));
            }
        }
    }

    /// Contact pushes the ball away from the robot; a kick in contact
    /// launches it along the robot's heading.
    fn resolve_contacts(&mut self, actions: &ActionBuffer) {
        let r = self.drive.wheel_radius;
        for (poses, slot) in self.world.teams.iter().zip(actions.teams()) {
            for (pose, cmd) in poses.iter().zip(slot.commands()) {
                let dx = self.world.ball_position.x - pose.position.x;
                let dy = self.world.ball_position.y - pose.position.y;
                let dist = dx.hypot(dy);
                if dist > physics::CONTACT_RADIUS_M {
                    continue;
                }

                if cmd.extra_action == ExtraAction::Kick {
                    let forward = pose.forward();
                    self.world.ball_velocity =
                        Velocity::new(forward.x * physics::KICK_SPEED, forward.y * physics::KICK_SPEED);
                    continue;
                }

                let speed = 0.5 * (cmd.left_wheel_rate + cmd.right_wheel_rate) * r;
                if speed <= 0.0 {
                    continue;
                }
                let (ux, uy) = if dist > f64::EPSILON {
                    (dx / dist, dy / dist)
                } else {
                    (pose.heading.cos(), pose.heading.sin())
                };
                let push = speed * physics::PUSH_GAIN;
                if push > self.world.ball_velocity.speed() {
                    self.world.ball_velocity = Velocity::new(ux * push, uy * push);
                }
                self.world.ball_position = Point::new(
                    pose.position.x + ux * physics::CONTACT_RADIUS_M,
                    pose.position.y + uy * physics::CONTACT_RADIUS_M,
                );
            }
        }
    }

    /// Integrate the ball; returns the score event of this step.
    fn move_ball(&mut self) -> ScoreEvent {
        let dt = self.dt;
        let half_length = self.field.half_length();
        let half_width = self.field.half_width();
        let goal_half_width = 0.5 * self.field.goal_width_m;

        let (vx, vy) = (self.world.ball_velocity.vx, self.world.ball_velocity.vy);
        let speed = vx.hypot(vy);
        let (mut vx, mut vy) = if speed > f64::EPSILON {
            let slowed = (speed - physics::BALL_FRICTION * dt).max(0.0);
            (vx * slowed / speed, vy * slowed / speed)
        } else {
            (0.0, 0.0)
        };

        let mut x = self.world.ball_position.x + vx * dt;
        let mut y = self.world.ball_position.y + vy * dt;

        if y.abs() > half_width {
            y = y.signum() * (2.0 * half_width - y.abs());
            vy = -vy * physics::WALL_COR;
        }

        if x.abs() > half_length {
            if y.abs() <= goal_half_width {
                // Team 0 attacks +X WCS.
                let scorer = if x > 0.0 { 0 } else { 1 };
                return self.goal(scorer);
            }
            x = x.signum() * (2.0 * half_length - x.abs());
            vx = -vx * physics::WALL_COR;
        }

        self.world.ball_position = Point::<Wcs>::new(x, y);
        self.world.ball_velocity = Velocity::new(vx, vy);
        ScoreEvent::NONE
    }

    fn goal(&mut self, scorer: usize) -> ScoreEvent {
        let event = if scorer < self.world.teams.len() {
            ScoreEvent::for_team(scorer)
        } else {
            // Single-team match: an own goal credits nobody.
            ScoreEvent::NONE
        };
        debug!(scorer, code = event.code(), "ball crossed the goal line, kickoff");
        self.kickoff();
        event
    }
}

impl Simulator for KinematicSimulator {
    fn step(&mut self, actions: &ActionBuffer) -> Result<StepOutcome, SimulatorError> {
        self.check_buffer(actions)?;
        self.move_robots(actions);
        self.resolve_contacts(actions);
        let score_event = self.move_ball();
        Ok(StepOutcome { world: self.world.clone(), score_event })
    }

    fn world(&self) -> WorldState {
        self.world.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rc_core::engine::DriveCommand;

    fn one_robot_match() -> MatchConfig {
        MatchConfig { number_of_teams: 1, number_of_robots: 1, ..MatchConfig::default() }
    }

    fn buffer(teams: usize, commands: Vec<DriveCommand>) -> ActionBuffer {
        let mut buffer = ActionBuffer::new(teams, commands.len());
        for team in 0..teams {
            buffer.write(team, commands.clone()).unwrap();
        }
        buffer
    }

    #[test]
    fn same_seed_same_kickoff() {
        let cfg = MatchConfig::default();
        let a = KinematicSimulator::new(&cfg, 42).world();
        let b = KinematicSimulator::new(&cfg, 42).world();
        let c = KinematicSimulator::new(&cfg, 43).world();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.teams.len(), 2);
        assert!(a.teams.iter().all(|t| t.len() == cfg.number_of_robots));
    }

    #[test]
    fn teams_start_in_their_own_half() {
        let world = KinematicSimulator::new(&MatchConfig::default(), 1).world();
        assert!(world.teams[0].iter().all(|p| p.position.x < 0.0));
        assert!(world.teams[1].iter().all(|p| p.position.x > 0.0));
    }

    #[test]
    fn equal_wheel_rates_drive_straight() {
        let cfg = one_robot_match();
        let mut sim = KinematicSimulator::new(&cfg, 0);
        sim.world.teams[0][0] = Pose::new(-2.0, 1.0, 0.0);

        let out = sim.step(&buffer(1, vec![DriveCommand::new(10.0, 10.0)])).unwrap();
        let pose = out.world.teams[0][0];
        // 10 rad/s * 0.05 m * 0.05 s
        assert!((pose.position.x - (-2.0 + 0.025)).abs() < 1e-9);
        assert!((pose.position.y - 1.0).abs() < 1e-9);
        assert_eq!(pose.heading, 0.0);
    }

    #[test]
    fn opposite_wheel_rates_turn_in_place() {
        let cfg = one_robot_match();
        let mut sim = KinematicSimulator::new(&cfg, 0);
        sim.world.teams[0][0] = Pose::new(-2.0, 1.0, 0.0);

        let out = sim.step(&buffer(1, vec![DriveCommand::new(-10.0, 10.0)])).unwrap();
        let pose = out.world.teams[0][0];
        assert!((pose.position.x + 2.0).abs() < 1e-9);
        assert!(pose.heading > 0.0);
    }

    #[test]
    fn kick_launches_ball_along_heading() {
        let cfg = one_robot_match();
        let mut sim = KinematicSimulator::new(&cfg, 0);
        sim.world.teams[0][0] = Pose::new(-0.1, 0.0, 0.0);

        let kick = DriveCommand::STOP.with_action(ExtraAction::Kick);
        let out = sim.step(&buffer(1, vec![kick])).unwrap();
        assert!(out.world.ball_velocity.vx > 3.0);
        assert!(out.world.ball_velocity.vy.abs() < 1e-9);
        assert!(out.world.ball_position.x > 0.0);
    }

    #[test]
    fn ball_slows_down_and_bounces_off_side_wall() {
        let cfg = one_robot_match();
        let mut sim = KinematicSimulator::new(&cfg, 0);
        sim.world.teams[0][0] = Pose::new(-4.0, -2.5, 0.0);
        sim.world.ball_position = Point::new(0.0, 2.99);
        sim.world.ball_velocity = Velocity::new(0.0, 2.0);

        let out = sim.step(&buffer(1, vec![DriveCommand::STOP])).unwrap();
        assert!(out.world.ball_velocity.vy < 0.0);
        assert!(out.world.ball_velocity.speed() < 2.0);
        assert!(out.world.ball_position.y <= cfg.field.half_width());
    }

    #[test]
    fn ball_in_positive_goal_scores_for_team_zero() {
        let cfg = MatchConfig { number_of_robots: 1, ..MatchConfig::default() };
        let mut sim = KinematicSimulator::new(&cfg, 0);
        sim.world.ball_position = Point::new(4.45, 0.2);
        sim.world.ball_velocity = Velocity::new(3.0, 0.0);

        let out = sim.step(&buffer(2, vec![DriveCommand::STOP])).unwrap();
        assert_eq!(out.score_event, ScoreEvent::for_team(0));
        assert_eq!(out.world.ball_position, Point::origin());
    }

    #[test]
    fn ball_wide_of_goal_bounces_back() {
        let cfg = MatchConfig { number_of_robots: 1, ..MatchConfig::default() };
        let mut sim = KinematicSimulator::new(&cfg, 0);
        sim.world.ball_position = Point::new(-4.45, 2.0);
        sim.world.ball_velocity = Velocity::new(-3.0, 0.0);

        let out = sim.step(&buffer(2, vec![DriveCommand::STOP])).unwrap();
        assert_eq!(out.score_event, ScoreEvent::NONE);
        assert!(out.world.ball_velocity.vx > 0.0);
    }

    #[test]
    fn wrong_buffer_shape_is_an_error() {
        let mut sim = KinematicSimulator::new(&MatchConfig::default(), 0);
        let err = sim.step(&ActionBuffer::new(2, 3)).unwrap_err();
        assert!(matches!(err, SimulatorError::RosterMismatch { expected: 5, found: 3, .. }));
        assert!(sim.step(&ActionBuffer::new(1, 5)).is_err());
    }
}
