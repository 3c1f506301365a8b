//! Cycloid (brachistochrone) waypoint generation
//!
//! The horizontal run |dx| and the drop |dy| between two points define a
//! cycloid arch `x = R(θ - sin θ)`, `y = R(1 - cos θ)`. The end parameter θ₂
//! solves `(1 - cos θ)/(θ - sin θ) = |dy|/|dx|`; the left side decreases
//! monotonically on (0, 2π], so bisection always converges.

use std::f64::consts::TAU;

use super::coordinates::{Efcs, Point};

/// Number of waypoints in every generated path.
pub const CYCLOID_WAYPOINTS: usize = 8;

const MIN_RUN_M: f64 = 1e-6;
const THETA_MIN: f64 = 1e-3;
const BISECTION_STEPS: usize = 64;

fn drop_ratio(theta: f64) -> f64 {
    (1.0 - theta.cos()) / (theta - theta.sin())
}

/// θ₂ for the given drop/run ratio, `None` when the arch degenerates into a
/// vertical line.
fn solve_end_angle(ratio: f64) -> Option<f64> {
    if ratio <= 0.0 {
        return Some(TAU);
    }
    if ratio >= drop_ratio(THETA_MIN) {
        return None;
    }

    let (mut lo, mut hi) = (THETA_MIN, TAU);
    for _ in 0..BISECTION_STEPS {
        let mid = 0.5 * (lo + hi);
        if drop_ratio(mid) > ratio {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Some(0.5 * (lo + hi))
}

/// Sample a cycloid from `start` to `end` into [`CYCLOID_WAYPOINTS`] points.
///
/// The start point itself is not included; the last waypoint is exactly `end`.
pub fn generate_cycloid_path(start: Point<Efcs>, end: Point<Efcs>) -> Vec<Point<Efcs>> {
    let dx = end.x - start.x;
    let dy = end.y - start.y;

    let theta_end = if dx.abs() < MIN_RUN_M { None } else { solve_end_angle(dy.abs() / dx.abs()) };

    let mut path: Vec<Point<Efcs>> = match theta_end {
        Some(theta_end) => {
            let radius = dx.abs() / (theta_end - theta_end.sin());
            let (sx, sy) = (dx.signum(), dy.signum());
            (1..=CYCLOID_WAYPOINTS)
                .map(|i| {
                    let theta = theta_end * i as f64 / CYCLOID_WAYPOINTS as f64;
                    start.offset(
                        sx * radius * (theta - theta.sin()),
                        sy * radius * (1.0 - theta.cos()),
                    )
                })
                .collect()
        }
        None => (1..=CYCLOID_WAYPOINTS)
            .map(|i| {
                let t = i as f64 / CYCLOID_WAYPOINTS as f64;
                start.offset(dx * t, dy * t)
            })
            .collect(),
    };

    if let Some(last) = path.last_mut() {
        *last = end;
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::geometry::distance;

    fn p(x: f64, y: f64) -> Point<Efcs> {
        Point::new(x, y)
    }

    #[test]
    fn path_has_fixed_length_and_ends_at_target() {
        for (a, b) in [
            (p(0.0, 0.0), p(3.0, -1.0)),
            (p(-4.0, 2.0), p(-3.9, 2.0)),
            (p(1.0, 1.0), p(1.0, -2.0)),
            (p(0.0, 0.0), p(-40.0, 25.0)),
            (p(2.0, 2.0), p(2.0, 2.0)),
        ] {
            let path = generate_cycloid_path(a, b);
            assert_eq!(path.len(), CYCLOID_WAYPOINTS);
            assert_eq!(*path.last().unwrap(), b);
        }
    }

    #[test]
    fn cycloid_reaches_the_drop() {
        let (a, b) = (p(0.0, 0.0), p(2.0, -1.0));
        let path = generate_cycloid_path(a, b);
        // Before the forced end point the arch already lands within rounding error.
        let before_snap = {
            let theta = solve_end_angle(0.5).unwrap();
            let r = 2.0 / (theta - theta.sin());
            p(r * (theta - theta.sin()), -r * (1.0 - theta.cos()))
        };
        assert!(distance(before_snap, b) < 1e-9);
        for pair in path.windows(2) {
            assert!(pair[1].x > pair[0].x);
        }
        // A drop smaller than the run dips below the target before rising to it.
        assert!(path.iter().any(|w| w.y < b.y));
    }

    #[test]
    fn flat_run_bulges_sideways() {
        let path = generate_cycloid_path(p(0.0, 0.0), p(3.0, 0.0));
        let bulge = path.iter().map(|w| w.y.abs()).fold(0.0, f64::max);
        assert!(bulge > 0.5);
    }

    #[test]
    fn vertical_run_is_straight() {
        let path = generate_cycloid_path(p(1.0, 0.0), p(1.0, 4.0));
        assert!(path.iter().all(|w| w.x == 1.0));
        assert!((path[0].y - 0.5).abs() < 1e-12);
    }

    #[cfg(all(test, feature = "proptest"))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_fixed_length_and_finite(
                ax in -5.0f64..5.0, ay in -3.0f64..3.0,
                bx in -5.0f64..5.0, by in -3.0f64..3.0,
            ) {
                let path = generate_cycloid_path(p(ax, ay), p(bx, by));
                prop_assert_eq!(path.len(), CYCLOID_WAYPOINTS);
                prop_assert!(path.iter().all(Point::is_finite));
                prop_assert_eq!(*path.last().unwrap(), p(bx, by));
            }
        }
    }
}
