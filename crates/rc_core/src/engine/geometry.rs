//! Geometry helpers for the decision engine
//!
//! Distances, nearest-point selection, pure-pursuit curvature and the
//! kick-line / goal-mouth region used for interception.

use thiserror::Error;

use super::coordinates::{Efcs, Frame, Point, Pose};

/// Below this a length or lateral offset is treated as zero.
pub const GEOMETRY_EPS: f64 = 1e-9;

/// Degenerate geometry. Always recovered by the caller with a fallback.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    #[error("kick line is vertical, slope undefined")]
    UndefinedSlope,

    #[error("line is parallel to the goal line")]
    ParallelToGoalLine,

    #[error("non-finite coordinate in region")]
    NonFinite,
}

/// Defended goal mouth, expressed in the defending team's EFCS.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalMouth {
    /// X of the goal line.
    pub line_x: f64,
    /// Half the distance between the posts.
    pub half_width: f64,
}

impl GoalMouth {
    pub fn center(&self) -> Point<Efcs> {
        Point::new(self.line_x, 0.0)
    }
}

#[inline]
pub fn distance<F: Frame>(a: Point<F>, b: Point<F>) -> f64 {
    (b.coords() - a.coords()).norm()
}

/// Index of the smallest finite value; ties keep the lowest index.
fn arg_min_finite(values: impl IntoIterator<Item = f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, value) in values.into_iter().enumerate() {
        if !value.is_finite() {
            continue;
        }
        match best {
            Some((_, current)) if value >= current => {}
            _ => best = Some((idx, value)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Index of the point closest to `target`.
pub fn arg_closest<F: Frame>(points: &[Point<F>], target: Point<F>) -> Option<usize> {
    arg_min_finite(points.iter().map(|p| distance(*p, target)))
}

/// Distances to `target` with `excluded` masked out as unreachable.
pub fn masked_distances<F: Frame>(
    points: &[Point<F>],
    target: Point<F>,
    excluded: usize,
) -> Vec<f64> {
    points
        .iter()
        .enumerate()
        .map(|(idx, p)| if idx == excluded { f64::INFINITY } else { distance(*p, target) })
        .collect()
}

/// Like [`arg_closest`] but never returns `excluded`.
pub fn arg_closest_excluding<F: Frame>(
    points: &[Point<F>],
    target: Point<F>,
    excluded: usize,
) -> Option<usize> {
    arg_min_finite(masked_distances(points, target, excluded))
}

/// Signed curvature of the arc tangent to `pose` that passes through `lookahead`.
///
/// Positive turns left (CCW). Returns 0 when the lookahead lies on the
/// heading line or coincides with the pose.
pub fn pursuit_curvature<F: Frame>(pose: &Pose<F>, lookahead: Point<F>) -> f64 {
    let d = lookahead.coords() - pose.position.coords();
    let dist_sq = d.norm_squared();
    if dist_sq < GEOMETRY_EPS {
        return 0.0;
    }

    let (sin_h, cos_h) = pose.heading.sin_cos();
    let lateral = -sin_h * d.x + cos_h * d.y;
    if lateral.abs() < GEOMETRY_EPS {
        return 0.0;
    }

    let curvature = 2.0 * lateral / dist_sq;
    if curvature.is_finite() {
        curvature
    } else {
        0.0
    }
}

/// Slope dy/dx of the line `from` → `to`.
pub fn kick_slope<F: Frame>(from: Point<F>, to: Point<F>) -> Result<f64, GeometryError> {
    let dx = to.x - from.x;
    if dx.abs() < GEOMETRY_EPS {
        return Err(GeometryError::UndefinedSlope);
    }
    let slope = (to.y - from.y) / dx;
    if slope.is_finite() {
        Ok(slope)
    } else {
        Err(GeometryError::UndefinedSlope)
    }
}

/// Corners of the region between trajectory `a` → `b` and the goal mouth.
///
/// Order: `a`, `b`, `b'`, `a'`, where `x'` is where the line through `x`
/// with `slope` crosses the goal line, clamped between the posts.
pub fn line_intersection_region(
    a: Point<Efcs>,
    b: Point<Efcs>,
    slope: f64,
    goal: &GoalMouth,
) -> Result<[Point<Efcs>; 4], GeometryError> {
    if !slope.is_finite() {
        return Err(GeometryError::ParallelToGoalLine);
    }

    let to_goal_line = |p: Point<Efcs>| {
        let y = p.y + slope * (goal.line_x - p.x);
        Point::new(goal.line_x, y.clamp(-goal.half_width, goal.half_width))
    };

    let region = [a, b, to_goal_line(b), to_goal_line(a)];
    if region.iter().all(Point::is_finite) {
        Ok(region)
    } else {
        Err(GeometryError::NonFinite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_4;

    fn p(x: f64, y: f64) -> Point<Efcs> {
        Point::new(x, y)
    }

    #[test]
    fn arg_closest_breaks_ties_by_lowest_index() {
        let points = [p(1.0, 0.0), p(-1.0, 0.0), p(0.0, 1.0)];
        assert_eq!(arg_closest(&points, p(0.0, 0.0)), Some(0));
        assert_eq!(arg_closest::<Efcs>(&[], p(0.0, 0.0)), None);
    }

    #[test]
    fn arg_closest_excluding_skips_self() {
        let points = [p(0.0, 0.0), p(3.0, 0.0), p(4.0, 0.0)];
        assert_eq!(arg_closest(&points, p(0.0, 0.0)), Some(0));
        assert_eq!(arg_closest_excluding(&points, p(0.0, 0.0), 0), Some(1));
        assert_eq!(arg_closest_excluding(&[p(1.0, 1.0)], p(0.0, 0.0), 0), None);
    }

    #[test]
    fn masked_distance_is_unreachable() {
        let d = masked_distances(&[p(0.0, 0.0), p(2.0, 0.0)], p(0.0, 0.0), 0);
        assert!(d[0].is_infinite());
        assert_eq!(d[1], 2.0);
    }

    #[test]
    fn curvature_zero_on_heading_ray() {
        let pose = Pose::<Efcs>::new(0.0, 0.0, 0.0);
        assert_eq!(pursuit_curvature(&pose, p(2.0, 0.0)), 0.0);

        let diagonal = Pose::<Efcs>::new(0.0, 0.0, FRAC_PI_4);
        assert_eq!(pursuit_curvature(&diagonal, p(1.0, 1.0)), 0.0);
        assert_eq!(pursuit_curvature(&pose, p(0.0, 0.0)), 0.0);
    }

    #[test]
    fn curvature_sign_flips_when_mirrored() {
        let pose = Pose::<Efcs>::new(1.0, 1.0, 0.0);
        let left = pursuit_curvature(&pose, p(2.0, 2.0));
        let right = pursuit_curvature(&pose, p(2.0, 0.0));
        assert!(left > 0.0);
        assert!((left + right).abs() < 1e-12);
        // Unit circle through (2, 2): lateral 1, distance² 2 → κ = 1.
        assert!((left - 1.0).abs() < 1e-12);
    }

    #[test]
    fn vertical_kick_line_has_no_slope() {
        assert_eq!(kick_slope(p(1.0, 0.0), p(1.0, 3.0)), Err(GeometryError::UndefinedSlope));
        assert_eq!(kick_slope(p(0.0, 0.0), p(2.0, 1.0)), Ok(0.5));
    }

    #[test]
    fn region_corners_follow_slope_to_goal_line() {
        let goal = GoalMouth { line_x: -4.5, half_width: 1.0 };
        let region = line_intersection_region(p(0.0, 0.0), p(-1.0, 0.5), 0.1, &goal).unwrap();
        assert_eq!(region[0], p(0.0, 0.0));
        assert_eq!(region[1], p(-1.0, 0.5));
        assert_eq!(region[2].x, -4.5);
        assert!((region[2].y - (0.5 - 0.35)).abs() < 1e-12);
        assert!((region[3].y + 0.45).abs() < 1e-12);
    }

    #[test]
    fn region_clamps_to_goal_mouth() {
        let goal = GoalMouth { line_x: -4.5, half_width: 1.0 };
        let region = line_intersection_region(p(0.0, 0.0), p(-1.0, 0.0), -5.0, &goal).unwrap();
        assert_eq!(region[2].y, 1.0);
        assert_eq!(region[3].y, 1.0);
    }

    #[test]
    fn region_rejects_parallel_line() {
        let goal = GoalMouth { line_x: -4.5, half_width: 1.0 };
        assert_eq!(
            line_intersection_region(p(0.0, 0.0), p(0.0, 1.0), f64::INFINITY, &goal),
            Err(GeometryError::ParallelToGoalLine)
        );
        assert_eq!(
            line_intersection_region(p(f64::NAN, 0.0), p(0.0, 1.0), 1.0, &goal),
            Err(GeometryError::NonFinite)
        );
    }

    #[cfg(all(test, feature = "proptest"))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_excluded_index_never_selected(
                coords in prop::collection::vec((-10.0f64..10.0, -10.0f64..10.0), 1..12),
                tx in -10.0f64..10.0,
                ty in -10.0f64..10.0,
                pick in 0usize..12,
            ) {
                let points: Vec<Point<Efcs>> = coords.iter().map(|(x, y)| p(*x, *y)).collect();
                let excluded = pick % points.len();
                let chosen = arg_closest_excluding(&points, p(tx, ty), excluded);
                prop_assert_ne!(chosen, Some(excluded));
                if points.len() > 1 {
                    prop_assert!(chosen.is_some());
                }
            }

            #[test]
            fn prop_curvature_mirror_antisymmetric(
                heading in -3.0f64..3.0,
                along in 0.1f64..5.0,
                lateral in 0.01f64..5.0,
            ) {
                let pose = Pose::<Efcs>::new(0.0, 0.0, heading);
                let fwd = pose.forward();
                let left_n = (-fwd.y, fwd.x);
                let l = p(fwd.x * along + left_n.0 * lateral, fwd.y * along + left_n.1 * lateral);
                let r = p(fwd.x * along - left_n.0 * lateral, fwd.y * along - left_n.1 * lateral);
                let kl = pursuit_curvature(&pose, l);
                let kr = pursuit_curvature(&pose, r);
                prop_assert!(kl > 0.0);
                prop_assert!((kl + kr).abs() < 1e-9);
            }
        }
    }
}
