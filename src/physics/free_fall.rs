use crate::error::{Result, TrajectoryError};
use crate::math::{point2, Bisection, Point};

/// Upper search bound above the final height when solving for a drop height.
const INITIAL_HEIGHT_SEARCH_SPAN: f64 = 1e10;

/// Distance covered from rest under constant acceleration: `a t^2 / 2`.
#[must_use]
pub fn distance_travelled_with_constant_acceleration(time: f64, acceleration: f64) -> f64 {
    0.5 * acceleration * time * time
}

/// Radial fall from rest in an inverse-square field.
///
/// Heights are distances from the center of the attracting body.
#[derive(Debug, Clone, Copy)]
pub struct FreeFall {
    mu: f64,
    bisection: Bisection,
}

impl FreeFall {
    /// Creates a solver for the gravitational parameter `mu = G M`.
    #[must_use]
    pub fn new(mu: f64) -> Self {
        Self {
            mu,
            bisection: Bisection::default(),
        }
    }

    /// Replaces the root finder used by the inverse problems.
    #[must_use]
    pub fn with_bisection(mut self, bisection: Bisection) -> Self {
        self.bisection = bisection;
        self
    }

    #[must_use]
    pub fn mu(&self) -> f64 {
        self.mu
    }

    /// Time to fall from rest at `h0` down to `h1`.
    ///
    /// # Errors
    ///
    /// Returns [`TrajectoryError::Domain`] unless `h0 > 0` and `0 <= h1 <= h0`.
    pub fn fall_time(&self, h0: f64, h1: f64) -> Result<f64> {
        if !(h0 > 0.0 && h1 >= 0.0 && h1 <= h0) {
            return Err(TrajectoryError::Domain(format!(
                "cannot fall from {h0} to {h1}"
            ))
            .into());
        }
        // Written in terms of the fallen fraction q, which stays accurate for
        // short drops far from the center.
        let q = (h0 - h1) / h0;
        let r = 1.0 - q;
        let scale = (h0 * h0 * h0 / (2.0 * self.mu)).sqrt();
        Ok(scale * ((r * q).sqrt() + q.sqrt().atan2(r.sqrt())))
    }

    /// Distance fallen from rest at `h0` after `time`.
    ///
    /// # Errors
    ///
    /// Returns [`TrajectoryError::Domain`] if `time` is negative or longer than
    /// the fall to the center, and propagates root-finding failures.
    pub fn fall_distance(&self, time: f64, h0: f64) -> Result<f64> {
        let total = self.fall_time(h0, 0.0)?;
        if !(0.0..=total).contains(&time) {
            return Err(TrajectoryError::Domain(format!(
                "fall time {time} outside [0, {total}] from height {h0}"
            ))
            .into());
        }
        self.bisection
            .solve(time, 0.0, h0, |d| self.fall_time(h0, h0 - d))
    }

    /// Height from which a fall from rest reaches `h1` after `time`.
    ///
    /// # Errors
    ///
    /// Returns an error if `time` is negative, if the height lies more than
    /// `1e10` m above `h1`, or if root finding fails.
    pub fn initial_height(&self, time: f64, h1: f64) -> Result<f64> {
        if time < 0.0 {
            return Err(TrajectoryError::Domain(format!("negative fall time {time}")).into());
        }
        self.bisection.solve(
            time,
            h1,
            h1 + INITIAL_HEIGHT_SEARCH_SPAN,
            |h0| self.fall_time(h0, h1),
        )
    }

    /// Polyline of a body thrown up from `floor` that peaks at the event `peak`
    /// and falls back down.
    ///
    /// Returns `2 n + 1` points `(t, h)`, `n` rising and `n + 1` falling,
    /// heights clamped to `floor`.
    ///
    /// # Errors
    ///
    /// Returns an error if the peak lies below `floor` or a fall distance
    /// cannot be solved.
    #[allow(clippy::cast_precision_loss)]
    pub fn points_from_peak(&self, peak: &Point, floor: f64, n: usize) -> Result<Vec<Point>> {
        let n = n.max(1);
        let fall = self.fall_time(peak.y, floor)?;
        let step = fall / n as f64;
        let mut points = Vec::with_capacity(2 * n + 1);
        for i in 0..n {
            let t = peak.x - fall + step * i as f64;
            let h = peak.y - self.fall_distance((peak.x - t).min(fall), peak.y)?;
            points.push(point2(t, h.max(floor)));
        }
        for i in 0..=n {
            let t = peak.x + step * i as f64;
            let h = peak.y - self.fall_distance((t - peak.x).min(fall), peak.y)?;
            points.push(point2(t, h.max(floor)));
        }
        Ok(points)
    }
}
