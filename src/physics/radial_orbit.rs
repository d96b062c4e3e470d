//! General radial two-body motion.
//!
//! A body moving straight up or down above a central mass follows one of
//! three regimes, fixed by `w = 1/h0 - v0^2 / (2 mu)`: elliptic (`w > 0`,
//! rises to the apex `1/w` and falls back), parabolic (`w = 0`, exactly escape
//! speed) and hyperbolic (`w < 0`). Times are measured along the ascending
//! branch from the singular point `h = 0` and shifted to the caller's epoch.
use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, TrajectoryError};
use crate::math::{is_close, point2, Bisection, Point};

use super::path::Path;

/// `|w|` below which an orbit counts as parabolic.
const PARABOLIC_EPSILON: f64 = 1e-14;
/// Slack on `w h <= 1` absorbing rounding at the apex.
const APEX_SLACK: f64 = 1e-9;
/// Offset of launch-velocity brackets from the regime boundaries.
const BRACKET_FUDGE: f64 = 1e-3;
/// Outer bound of unbounded hyperbolic launch-velocity brackets.
const MAX_SPEED: f64 = 1e12;
/// Nudge applied when both events share a time stamp.
const SIMULTANEOUS_NUDGE: f64 = 1e-3;
/// Height span above the floor sampled by [`RadialOrbit::free_fall_path`].
const PATH_REACH: f64 = 1e8;
/// Relative tolerance when comparing a time with a regime boundary.
const BOUNDARY_RTOL: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrbitType {
    Elliptic,
    Parabolic,
    Hyperbolic,
}

impl OrbitType {
    /// Regime of the energy parameter `w`.
    #[must_use]
    pub fn from_energy(w: f64) -> Self {
        if w.abs() < PARABOLIC_EPSILON {
            Self::Parabolic
        } else if w > 0.0 {
            Self::Elliptic
        } else {
            Self::Hyperbolic
        }
    }
}

/// Direction of the velocity at the first event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VelocitySign {
    Positive,
    Zero,
    Negative,
}

impl VelocitySign {
    fn flipped(self) -> Self {
        match self {
            Self::Positive => Self::Negative,
            Self::Zero => Self::Zero,
            Self::Negative => Self::Positive,
        }
    }
}

/// Whether the second event lies on the rising or the falling branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeakPosition {
    Before,
    At,
    After,
}

/// Regime of the trajectory joining two events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub orbit: OrbitType,
    pub launch: VelocitySign,
    pub peak: PeakPosition,
}

/// Times at which a trajectory passes a height.
#[derive(Debug, Clone, PartialEq)]
pub struct Crossing {
    pub orbit: OrbitType,
    /// Sorted crossing times: two for elliptic orbits (equal at the apex),
    /// one otherwise.
    pub times: Vec<f64>,
    /// Apex event `(t, h)` of elliptic orbits.
    pub peak: Option<Point>,
}

impl Crossing {
    /// First crossing time.
    #[must_use]
    pub fn first(&self) -> f64 {
        self.times[0]
    }

    /// Last crossing time.
    #[must_use]
    pub fn last(&self) -> f64 {
        self.times[self.times.len() - 1]
    }

    fn pick(&self, first: bool) -> f64 {
        if first {
            self.first()
        } else {
            self.last()
        }
    }
}

/// Solver for the radial Kepler problem around a mass with parameter `mu`.
#[derive(Debug, Clone, Copy)]
pub struct RadialOrbit {
    mu: f64,
    bisection: Bisection,
}

impl RadialOrbit {
    #[must_use]
    pub fn new(mu: f64) -> Self {
        Self {
            mu,
            bisection: Bisection::default(),
        }
    }

    /// Replaces the root finder used by [`RadialOrbit::launch_velocity`].
    #[must_use]
    pub fn with_bisection(mut self, bisection: Bisection) -> Self {
        self.bisection = bisection;
        self
    }

    #[must_use]
    pub fn mu(&self) -> f64 {
        self.mu
    }

    /// Energy parameter `w = 1/h0 - v0^2 / (2 mu)`. The apex height is `1/w`.
    #[must_use]
    pub fn energy(&self, h0: f64, v0: f64) -> f64 {
        1.0 / h0 - v0 * v0 / (2.0 * self.mu)
    }

    /// Time taken to rise from `h = 0` to `x` on the ascending branch of the
    /// orbit with energy `w`.
    ///
    /// # Errors
    ///
    /// Returns [`TrajectoryError::Domain`] for negative `x` and
    /// [`TrajectoryError::Unreachable`] if `x` lies above the apex.
    pub fn time_of_flight(&self, w: f64, x: f64) -> Result<f64> {
        if x < 0.0 {
            return Err(TrajectoryError::Domain(format!("negative height {x}")).into());
        }
        match OrbitType::from_energy(w) {
            OrbitType::Parabolic => Ok((2.0 * x * x * x / (9.0 * self.mu)).sqrt()),
            OrbitType::Elliptic => {
                let u = w * x;
                if u > 1.0 + APEX_SLACK {
                    return Err(TrajectoryError::Unreachable {
                        height: x,
                        apex: 1.0 / w,
                    }
                    .into());
                }
                let u = u.min(1.0);
                let s = u.sqrt();
                Ok((s.asin() - (u * (1.0 - u)).sqrt()) / (2.0 * self.mu * w * w * w).sqrt())
            }
            OrbitType::Hyperbolic => {
                let a = -w;
                let u = a * x;
                let s = u.sqrt();
                Ok(((u * u + u).sqrt() - (s + (1.0 + u).sqrt()).ln())
                    / (2.0 * self.mu * a * a * a).sqrt())
            }
        }
    }

    /// Escape velocity at height `h`.
    ///
    /// # Errors
    ///
    /// Returns [`TrajectoryError::Domain`] if `h <= 0`.
    pub fn escape_velocity(&self, h: f64) -> Result<f64> {
        if h <= 0.0 {
            return Err(TrajectoryError::Domain(format!("non-positive height {h}")).into());
        }
        Ok((2.0 * self.mu / h).sqrt())
    }

    /// Launch speed at `h0` whose orbit peaks exactly at `h1`.
    ///
    /// # Errors
    ///
    /// Returns [`TrajectoryError::Domain`] if `h0 <= 0` or `h1 < h0`.
    pub fn minimum_speed_elliptic(&self, h0: f64, h1: f64) -> Result<f64> {
        if h0 <= 0.0 || h1 < h0 {
            return Err(TrajectoryError::Domain(format!(
                "cannot rise from {h0} to {h1}"
            ))
            .into());
        }
        Ok((2.0 * self.mu * (1.0 / h0 - 1.0 / h1)).sqrt())
    }

    /// All times at which the trajectory through `(t0, h0)` with velocity `v0`
    /// is at height `h`.
    ///
    /// # Errors
    ///
    /// Returns [`TrajectoryError::Domain`] for non-positive heights and
    /// [`TrajectoryError::Unreachable`] if the orbit never reaches `h`.
    pub fn collision_times(&self, h0: f64, v0: f64, t0: f64, h: f64) -> Result<Crossing> {
        if !(h0 > 0.0 && h > 0.0) {
            return Err(TrajectoryError::Domain(format!(
                "heights must be positive, got {h0} and {h}"
            ))
            .into());
        }
        let w = self.energy(h0, v0);
        let orbit = OrbitType::from_energy(w);
        let origin = t0 - self.time_of_flight(w, h0)?;
        let t_up = origin + self.time_of_flight(w, h)?;

        let (mut times, mut peak) = if orbit == OrbitType::Elliptic {
            let t_peak = origin + FRAC_PI_2 / (2.0 * self.mu * w * w * w).sqrt();
            (vec![t_up, 2.0 * t_peak - t_up], Some(point2(t_peak, 1.0 / w)))
        } else {
            (vec![t_up], None)
        };

        if v0 < 0.0 {
            // A falling body retraces the rising solution backwards in time.
            for t in &mut times {
                *t = 2.0 * t0 - *t;
            }
            times.reverse();
            if let Some(p) = peak.as_mut() {
                p.x = 2.0 * t0 - p.x;
            }
        }
        Ok(Crossing { orbit, times, peak })
    }

    /// Apex event of the trajectory through `(t0, h0)` with velocity `v0`, or
    /// `None` if the orbit is unbound.
    ///
    /// # Errors
    ///
    /// Returns [`TrajectoryError::Domain`] if `h0 <= 0`.
    pub fn peak(&self, h0: f64, v0: f64, t0: f64) -> Result<Option<Point>> {
        Ok(self.collision_times(h0, v0, t0, h0)?.peak)
    }

    fn time_between(&self, w: f64, from: f64, to: f64) -> Result<f64> {
        Ok(self.time_of_flight(w, to)? - self.time_of_flight(w, from)?)
    }

    /// Classifies the trajectory leaving `(t0, h0)` and passing `(t1, h1)`.
    ///
    /// The elapsed time is compared with the regime boundaries: escape speed,
    /// the slowest orbit that still reaches `h1` (target above) and the fall
    /// from rest (target below). An earlier `t1` is handled by time reversal.
    ///
    /// # Errors
    ///
    /// Returns [`TrajectoryError::Domain`] for non-positive heights.
    pub fn classify(&self, h0: f64, t0: f64, h1: f64, t1: f64) -> Result<Classification> {
        if !(h0 > 0.0 && h1 > 0.0) {
            return Err(TrajectoryError::Domain(format!(
                "heights must be positive, got {h0} and {h1}"
            ))
            .into());
        }
        let t1 = if t1 == t0 { t1 + SIMULTANEOUS_NUDGE } else { t1 };
        let reversed = t1 < t0;
        let dt = (t1 - t0).abs();
        let near = |boundary: f64| is_close(dt, boundary, BOUNDARY_RTOL, 0.0);

        let classification = if h1 >= h0 {
            let launch = if reversed {
                VelocitySign::Negative
            } else {
                VelocitySign::Positive
            };
            let (early, late) = if reversed {
                (PeakPosition::After, PeakPosition::Before)
            } else {
                (PeakPosition::Before, PeakPosition::After)
            };
            let escape = self.time_between(0.0, h0, h1)?;
            let slowest = self.time_between(1.0 / h1, h0, h1)?;
            let (orbit, peak) = if near(escape) {
                (OrbitType::Parabolic, PeakPosition::Before)
            } else if dt < escape {
                (OrbitType::Hyperbolic, PeakPosition::Before)
            } else if near(slowest) {
                (OrbitType::Elliptic, PeakPosition::At)
            } else if dt < slowest {
                (OrbitType::Elliptic, early)
            } else {
                (OrbitType::Elliptic, late)
            };
            Classification {
                orbit,
                launch,
                peak,
            }
        } else {
            let escape = self.time_between(0.0, h1, h0)?;
            let from_rest = self.time_between(1.0 / h0, h1, h0)?;
            let forward = if near(escape) {
                Classification {
                    orbit: OrbitType::Parabolic,
                    launch: VelocitySign::Negative,
                    peak: PeakPosition::Before,
                }
            } else if dt < escape {
                Classification {
                    orbit: OrbitType::Hyperbolic,
                    launch: VelocitySign::Negative,
                    peak: PeakPosition::Before,
                }
            } else {
                let launch = if near(from_rest) {
                    VelocitySign::Zero
                } else if dt < from_rest {
                    VelocitySign::Negative
                } else {
                    VelocitySign::Positive
                };
                Classification {
                    orbit: OrbitType::Elliptic,
                    launch,
                    peak: PeakPosition::After,
                }
            };
            if reversed {
                Classification {
                    launch: forward.launch.flipped(),
                    peak: if forward.orbit == OrbitType::Elliptic {
                        PeakPosition::Before
                    } else {
                        forward.peak
                    },
                    ..forward
                }
            } else {
                forward
            }
        };
        debug!(
            h0,
            t0,
            h1,
            t1,
            orbit = ?classification.orbit,
            launch = ?classification.launch,
            peak = ?classification.peak,
            "classified radial trajectory"
        );
        Ok(classification)
    }

    /// Velocity at `(t0, h0)` of the free-fall trajectory passing `(t1, h1)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the events cannot be joined, the velocity bracket
    /// does not straddle `t1`, or the solution misses `t1` by more than the
    /// validation tolerance.
    pub fn launch_velocity(&self, h0: f64, t0: f64, h1: f64, t1: f64) -> Result<f64> {
        let t1 = if t1 == t0 { t1 + SIMULTANEOUS_NUDGE } else { t1 };
        let class = self.classify(h0, t0, h1, t1)?;
        let v_escape = self.escape_velocity(h0)?;

        let sign = match class.launch {
            VelocitySign::Negative => -1.0,
            _ => 1.0,
        };
        let (v_min, v_max, first) = match class.orbit {
            OrbitType::Parabolic => return Ok(sign * v_escape),
            OrbitType::Hyperbolic => (
                sign * (v_escape + BRACKET_FUDGE),
                sign * MAX_SPEED,
                true,
            ),
            OrbitType::Elliptic => {
                let first = class.peak == PeakPosition::Before;
                if t1 < t0 && h1 > h0 {
                    (
                        -v_escape + BRACKET_FUDGE,
                        -self.minimum_speed_elliptic(h0, h1)? - BRACKET_FUDGE,
                        first,
                    )
                } else {
                    let v_min = if h1 > h0 {
                        self.minimum_speed_elliptic(h0, h1)? + BRACKET_FUDGE
                    } else {
                        -v_escape + BRACKET_FUDGE
                    };
                    (v_min, v_escape - BRACKET_FUDGE, first)
                }
            }
        };

        let v = self.bisection.solve(t1, v_min, v_max, |v| {
            Ok(self.collision_times(h0, v, t0, h1)?.pick(first))
        })?;

        let t = self.collision_times(h0, v, t0, h1)?.pick(first);
        if !is_close(t, t1, 1e-1, 1e-1) {
            warn!(v, t, t1, "launch velocity misses the target event");
            return Err(TrajectoryError::Domain(format!(
                "launch velocity {v} reaches height {h1} at t = {t}, expected {t1}"
            ))
            .into());
        }
        Ok(v)
    }

    /// Dense polyline of the free-fall trajectory joining two events.
    ///
    /// Heights from `floor` upwards are sampled in `n` steps on the rising
    /// branch, up to the apex (capped at `floor + 1e8`) for bound orbits or
    /// to `max(floor + 1e8, ceiling)` otherwise. Bound orbits add the falling
    /// branch back down. If no sample falls in range the two events are
    /// returned as is.
    ///
    /// # Errors
    ///
    /// Returns an error if the launch velocity cannot be found.
    #[allow(clippy::cast_precision_loss)]
    pub fn free_fall_path(
        &self,
        start: &Point,
        end: &Point,
        floor: f64,
        ceiling: f64,
        n: usize,
    ) -> Result<(Path, OrbitType)> {
        let (t0, h0) = (start.x, start.y);
        let v = self.launch_velocity(h0, t0, end.y, end.x)?;
        let own = self.collision_times(h0, v, t0, h0)?;

        let h_max = match own.peak {
            Some(peak) if own.orbit == OrbitType::Elliptic => (floor + PATH_REACH).min(peak.y),
            _ => (floor + PATH_REACH).max(ceiling),
        };

        let mut path = Path::new();
        let n = n.max(1);
        if h_max > floor {
            let step = (h_max - floor) / n as f64;
            for i in 0..n {
                let h = floor + step * i as f64;
                path.add(point2(self.collision_times(h0, v, t0, h)?.first(), h));
            }
            if own.orbit == OrbitType::Elliptic {
                for i in 0..n {
                    let h = h_max - step * i as f64;
                    path.add(point2(self.collision_times(h0, v, t0, h)?.last(), h));
                }
            }
        }
        if path.is_empty() {
            path.add(*start);
            path.add(*end);
        }
        Ok((path, own.orbit))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::physics::{CentralBody, FreeFall, PhysicalConstants};
    use approx::assert_relative_eq;

    const R: f64 = 6.371e6;

    fn solver() -> RadialOrbit {
        RadialOrbit::new(CentralBody::earth().mu(&PhysicalConstants::default()))
    }

    #[test]
    fn regimes_from_energy() {
        let s = solver();
        let v_esc = s.escape_velocity(R).unwrap();
        assert_eq!(OrbitType::from_energy(s.energy(R, 0.5 * v_esc)), OrbitType::Elliptic);
        assert_eq!(OrbitType::from_energy(s.energy(R, v_esc)), OrbitType::Parabolic);
        assert_eq!(OrbitType::from_energy(s.energy(R, 2.0 * v_esc)), OrbitType::Hyperbolic);
    }

    #[test]
    fn time_of_flight_continuous_across_regimes() {
        let s = solver();
        let x = 2.0 * R;
        let parabolic = s.time_of_flight(0.0, x).unwrap();
        let elliptic = s.time_of_flight(1e-12, x).unwrap();
        let hyperbolic = s.time_of_flight(-1e-12, x).unwrap();
        assert_relative_eq!(elliptic, parabolic, max_relative = 1e-3);
        assert_relative_eq!(hyperbolic, parabolic, max_relative = 1e-3);
        assert!(hyperbolic < parabolic && parabolic < elliptic);
    }

    #[test]
    fn time_of_flight_matches_fall_from_rest() {
        let s = solver();
        let ff = FreeFall::new(s.mu());
        let (h0, h1) = (R + 5e6, R);
        let w = 1.0 / h0;
        let rising = s.time_of_flight(w, h0).unwrap() - s.time_of_flight(w, h1).unwrap();
        assert_relative_eq!(rising, ff.fall_time(h0, h1).unwrap(), max_relative = 1e-9);
    }

    #[test]
    fn apex_is_unreachable_beyond() {
        let s = solver();
        let err = s.collision_times(R, 0.0, 0.0, R + 5e6).unwrap_err();
        assert!(err.is_domain());
        let v = s.minimum_speed_elliptic(R, R + 5e6).unwrap();
        let c = s.collision_times(R, v, 0.0, R + 5e6).unwrap();
        assert_eq!(c.times.len(), 2);
        assert!((c.times[0] - c.times[1]).abs() < 1e-3 * c.times[0].abs().max(1.0));
    }

    #[test]
    fn elliptic_crossings_mirror_about_peak() {
        let s = solver();
        let c = s.collision_times(R, 5000.0, 10.0, R + 1e5).unwrap();
        assert_eq!(c.orbit, OrbitType::Elliptic);
        let peak = c.peak.unwrap();
        assert!(c.times[0] < peak.x && peak.x < c.times[1]);
        assert_relative_eq!(c.times[0] + c.times[1], 2.0 * peak.x, max_relative = 1e-12);
        // Launch height is crossed at the launch time.
        let own = s.collision_times(R, 5000.0, 10.0, R).unwrap();
        assert!((own.times[0] - 10.0).abs() < 1e-6);
    }

    #[test]
    fn negative_velocity_mirrors_in_time() {
        let s = solver();
        let up = s.collision_times(R + 1e6, 3000.0, 0.0, R).unwrap();
        let down = s.collision_times(R + 1e6, -3000.0, 0.0, R).unwrap();
        assert!((up.times[0] + down.times[1]).abs() < 1e-6);
        assert!((up.times[1] + down.times[0]).abs() < 1e-6);
        assert!(down.times[0] < down.times[1]);
        assert!((up.peak.unwrap().x + down.peak.unwrap().x).abs() < 1e-6);
    }

    #[test]
    fn classify_rise_between_boundaries() {
        let s = solver();
        let c = s.classify(R, 0.0, R + 5e6, 1200.0).unwrap();
        assert_eq!(
            c,
            Classification {
                orbit: OrbitType::Elliptic,
                launch: VelocitySign::Positive,
                peak: PeakPosition::Before,
            }
        );
    }

    #[test]
    fn classify_regimes() {
        let s = solver();
        let fast = s.classify(R, 0.0, R + 5e6, 100.0).unwrap();
        assert_eq!(fast.orbit, OrbitType::Hyperbolic);
        let slow = s.classify(R, 0.0, R + 5e6, 5000.0).unwrap();
        assert_eq!(slow.orbit, OrbitType::Elliptic);
        assert_eq!(slow.peak, PeakPosition::After);
        let reversed = s.classify(R, 0.0, R + 5e6, -1200.0).unwrap();
        assert_eq!(reversed.launch, VelocitySign::Negative);
        assert_eq!(reversed.peak, PeakPosition::After);
    }

    #[test]
    fn classify_drop() {
        let s = solver();
        let ff = FreeFall::new(s.mu());
        let h0 = R + 1e6;
        let rest = ff.fall_time(h0, R).unwrap();
        let thrown_down = s.classify(h0, 0.0, R, 0.5 * rest).unwrap();
        assert_eq!(thrown_down.launch, VelocitySign::Negative);
        assert_eq!(thrown_down.peak, PeakPosition::After);
        let thrown_up = s.classify(h0, 0.0, R, 2.0 * rest).unwrap();
        assert_eq!(thrown_up.orbit, OrbitType::Elliptic);
        assert_eq!(thrown_up.launch, VelocitySign::Positive);
        let from_rest = s.classify(h0, 0.0, R, rest).unwrap();
        assert_eq!(from_rest.launch, VelocitySign::Zero);
        let rising = s.classify(h0, 0.0, R, -2.0 * rest).unwrap();
        assert_eq!(rising.launch, VelocitySign::Negative);
        assert_eq!(rising.peak, PeakPosition::Before);
    }

    #[test]
    fn launch_velocity_hits_target() {
        let s = solver();
        let (h1, t1) = (R + 4.3e6, 1200.0);
        let v = s.launch_velocity(R, 0.0, h1, t1).unwrap();
        assert!(v > s.minimum_speed_elliptic(R, h1).unwrap());
        assert!(v < s.escape_velocity(R).unwrap());
        let c = s.collision_times(R, v, 0.0, h1).unwrap();
        assert!((c.first() - t1).abs() < 1e-3, "t={}", c.first());
    }

    #[test]
    fn launch_velocity_after_peak_and_hyperbolic() {
        let s = solver();
        let (h1, t1) = (R + 1e6, 2000.0);
        let v = s.launch_velocity(R, 0.0, h1, t1).unwrap();
        let c = s.collision_times(R, v, 0.0, h1).unwrap();
        assert!((c.last() - t1).abs() < 1e-3);

        let v = s.launch_velocity(R, 0.0, R + 5e6, 100.0).unwrap();
        assert!(v > s.escape_velocity(R).unwrap());
        let c = s.collision_times(R, v, 0.0, R + 5e6).unwrap();
        assert!((c.first() - 100.0).abs() < 1e-3);
    }

    #[test]
    fn launch_velocity_downward() {
        let s = solver();
        let h0 = R + 1e6;
        let v = s.launch_velocity(h0, 0.0, R, 100.0).unwrap();
        assert!(v < 0.0);
        let c = s.collision_times(h0, v, 0.0, R).unwrap();
        assert!((c.last() - 100.0).abs() < 1e-3);
    }

    #[test]
    fn path_starts_at_launch() {
        let s = solver();
        let start = point2(0.0, R);
        let end = point2(1200.0, R + 4.3e6);
        let (path, orbit) = s.free_fall_path(&start, &end, R, R + 2e7, 200).unwrap();
        assert_eq!(orbit, OrbitType::Elliptic);
        assert_eq!(path.len(), 400);
        let pts = path.points();
        assert!(pts[0].x.abs() < 1e-6);
        assert!(pts.iter().all(|p| p.y >= R - 1e-6));
        assert!(pts.windows(2).all(|w| w[1].x >= w[0].x));
    }

    #[test]
    fn path_unbound_reaches_ceiling() {
        let s = solver();
        let start = point2(0.0, R);
        let end = point2(100.0, R + 5e6);
        let (path, orbit) = s.free_fall_path(&start, &end, R, R + 2e8, 50).unwrap();
        assert_eq!(orbit, OrbitType::Hyperbolic);
        assert_eq!(path.len(), 50);
        let top = path.points()[49].y;
        assert!(top > R + 1e8);
    }
}
