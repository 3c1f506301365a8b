//! Frame-tagged coordinates
//!
//! ## Coordinate Systems
//!
//! **EFCS** (Ego Field Coordinate System, one per team):
//! - origin at the middle of the field
//! - +X toward the opponent goal
//! - +Y 90° counter-clockwise from +X
//!
//! **WCS** (World Coordinate System, shared):
//! - identical to the EFCS of team 0
//! - team 1's EFCS is WCS rotated by 180°
//!
//! Points carry their frame as a type parameter, so a WCS observation cannot
//! be fed to EFCS math without going through [`FieldSide`].

use std::fmt;
use std::marker::PhantomData;

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Marker trait for coordinate frames.
pub trait Frame: Copy + Clone + fmt::Debug + Default + PartialEq + Send + Sync + 'static {
    const NAME: &'static str;
}

/// Ego Field Coordinate System of the team that owns the value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Efcs;

/// Team-independent world frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wcs;

impl Frame for Efcs {
    const NAME: &'static str = "efcs";
}

impl Frame for Wcs {
    const NAME: &'static str = "wcs";
}

/// A 2D point in frame `F` (meters).
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Point<F: Frame> {
    pub x: f64,
    pub y: f64,
    #[serde(skip)]
    frame: PhantomData<F>,
}

impl<F: Frame> Point<F> {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, frame: PhantomData }
    }

    pub const fn origin() -> Self {
        Self::new(0.0, 0.0)
    }

    #[inline]
    pub fn coords(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    /// Translate by a displacement expressed in the same frame.
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl<F: Frame> Default for Point<F> {
    fn default() -> Self {
        Self::origin()
    }
}

impl<F: Frame> fmt::Debug for Point<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:.3}, {:.3})", F::NAME, self.x, self.y)
    }
}

/// Velocity in frame `F` (m/s).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Velocity<F: Frame> {
    pub vx: f64,
    pub vy: f64,
    #[serde(skip)]
    frame: PhantomData<F>,
}

impl<F: Frame> Velocity<F> {
    pub const fn new(vx: f64, vy: f64) -> Self {
        Self { vx, vy, frame: PhantomData }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn speed(&self) -> f64 {
        self.vx.hypot(self.vy)
    }
}

/// Position plus heading (radians, CCW from +X of the frame).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Pose<F: Frame> {
    pub position: Point<F>,
    pub heading: f64,
}

impl<F: Frame> Pose<F> {
    pub const fn new(x: f64, y: f64, heading: f64) -> Self {
        Self { position: Point::new(x, y), heading }
    }

    /// Unit vector along the heading.
    pub fn forward(&self) -> Vector2<f64> {
        Vector2::new(self.heading.cos(), self.heading.sin())
    }
}

/// Which way a team attacks in world coordinates.
///
/// Team 0 attacks toward +X WCS; team 1 toward -X WCS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldSide {
    AttacksPositiveX,
    AttacksNegativeX,
}

impl FieldSide {
    pub fn for_team(team_id: usize) -> Self {
        if team_id % 2 == 0 {
            FieldSide::AttacksPositiveX
        } else {
            FieldSide::AttacksNegativeX
        }
    }

    #[inline]
    fn sign(self) -> f64 {
        match self {
            FieldSide::AttacksPositiveX => 1.0,
            FieldSide::AttacksNegativeX => -1.0,
        }
    }

    fn heading_offset(self) -> f64 {
        match self {
            FieldSide::AttacksPositiveX => 0.0,
            FieldSide::AttacksNegativeX => std::f64::consts::PI,
        }
    }

    pub fn to_wcs(self, p: Point<Efcs>) -> Point<Wcs> {
        let s = self.sign();
        Point::new(p.x * s, p.y * s)
    }

    pub fn to_efcs(self, p: Point<Wcs>) -> Point<Efcs> {
        // The 180° rotation is its own inverse.
        let s = self.sign();
        Point::new(p.x * s, p.y * s)
    }

    pub fn velocity_to_efcs(self, v: Velocity<Wcs>) -> Velocity<Efcs> {
        let s = self.sign();
        Velocity::new(v.vx * s, v.vy * s)
    }

    pub fn pose_to_efcs(self, pose: Pose<Wcs>) -> Pose<Efcs> {
        Pose {
            position: self.to_efcs(pose.position),
            heading: wrap_angle(pose.heading + self.heading_offset()),
        }
    }

    pub fn pose_to_wcs(self, pose: Pose<Efcs>) -> Pose<Wcs> {
        Pose {
            position: self.to_wcs(pose.position),
            heading: wrap_angle(pose.heading + self.heading_offset()),
        }
    }
}

/// Wrap an angle into (-π, π].
pub fn wrap_angle(angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    let mut a = angle.rem_euclid(TAU);
    if a > PI {
        a -= TAU;
    }
    a
}
