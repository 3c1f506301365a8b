//! Geometry, steering and per-tick state shared by players and the game master.

pub mod command;
pub mod coordinates;
pub mod geometry;
pub mod snapshot;
pub mod steering;
pub mod trajectory;

pub use command::{DriveCommand, ExtraAction};
pub use coordinates::{wrap_angle, Efcs, FieldSide, Frame, Point, Pose, Velocity, Wcs};
pub use geometry::{
    arg_closest, arg_closest_excluding, distance, kick_slope, line_intersection_region,
    masked_distances, pursuit_curvature, GeometryError, GoalMouth,
};
pub use snapshot::{GameStateSnapshot, TeamSnapshot, WorldState};
pub use steering::{bearing_to, steer_toward, wheel_rates};
pub use trajectory::{generate_cycloid_path, CYCLOID_WAYPOINTS};
