use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{NumericsError, Result};

/// Bisection root finder for monotonic objectives.
///
/// Solves `f(x) = target` on `[a, b]`. The search direction is detected from
/// the signs of `target - f(a)` and `target - f(b)`, so both increasing and
/// decreasing objectives work. Iteration stops when
/// `|b - a| <= atol + rtol * max(|a|, |b|)` or after `max_iterations` halvings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bisection {
    pub max_iterations: usize,
    pub rtol: f64,
    pub atol: f64,
}

impl Default for Bisection {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            rtol: 1e-10,
            atol: 1e-12,
        }
    }
}

impl Bisection {
    /// Creates a solver with the default tolerances and the given cap.
    #[must_use]
    pub fn new(max_iterations: usize) -> Self {
        Self {
            max_iterations,
            ..Self::default()
        }
    }

    /// Returns a copy with the given relative and absolute tolerances.
    #[must_use]
    pub fn with_tolerance(mut self, rtol: f64, atol: f64) -> Self {
        self.rtol = rtol;
        self.atol = atol;
        self
    }

    fn converged(&self, a: f64, b: f64) -> bool {
        (b - a).abs() <= self.atol + self.rtol * a.abs().max(b.abs())
    }

    /// Finds `x` in `[a, b]` with `f(x) = target`.
    ///
    /// # Errors
    ///
    /// Returns [`NumericsError::NotBracketed`] if `target` does not lie between
    /// `f(a)` and `f(b)`, [`NumericsError::NoConvergence`] if the interval is
    /// still wider than the tolerance after `max_iterations` steps, and any
    /// error returned by `f`.
    pub fn solve<F>(&self, target: f64, a: f64, b: f64, mut f: F) -> Result<f64>
    where
        F: FnMut(f64) -> Result<f64>,
    {
        let (mut a, mut b) = (a, b);
        let fa = f(a)?;
        let fb = f(b)?;
        let da = target - fa;
        let db = target - fb;

        if da == 0.0 {
            return Ok(a);
        }
        if db == 0.0 {
            return Ok(b);
        }
        if da.is_nan() || db.is_nan() || da.signum() == db.signum() {
            return Err(NumericsError::NotBracketed {
                target,
                value_a: fa,
                value_b: fb,
            }
            .into());
        }

        let sign_a = da.signum();
        for iteration in 0..self.max_iterations {
            if self.converged(a, b) {
                trace!(iteration, x = 0.5 * (a + b), "bisection converged");
                return Ok(0.5 * (a + b));
            }
            let mid = 0.5 * (a + b);
            let dm = target - f(mid)?;
            if dm == 0.0 {
                trace!(iteration, x = mid, "bisection hit target exactly");
                return Ok(mid);
            }
            if dm.signum() == sign_a {
                a = mid;
            } else {
                b = mid;
            }
        }

        if self.converged(a, b) {
            return Ok(0.5 * (a + b));
        }
        Err(NumericsError::NoConvergence {
            iterations: self.max_iterations,
            gap: (b - a).abs(),
        }
        .into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::GeodesicsError;
    use approx::assert_relative_eq;

    #[test]
    fn increasing_square_root() {
        let x = Bisection::default().solve(2.0, 0.0, 2.0, |x| Ok(x * x)).unwrap();
        assert_relative_eq!(x, std::f64::consts::SQRT_2, max_relative = 1e-9);
    }

    #[test]
    fn decreasing_objective() {
        let x = Bisection::default()
            .solve(0.25, 0.0, 10.0, |x| Ok(1.0 / (1.0 + x)))
            .unwrap();
        assert_relative_eq!(x, 3.0, max_relative = 1e-9);
    }

    #[test]
    fn reversed_bounds() {
        let x = Bisection::default().solve(1.0, 3.0, -1.0, |x| Ok(x)).unwrap();
        assert_relative_eq!(x, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn exact_hit_at_bound() {
        let x = Bisection::default().solve(4.0, 0.0, 2.0, |x| Ok(x * x)).unwrap();
        assert!((x - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn not_bracketed() {
        let err = Bisection::default()
            .solve(10.0, 0.0, 2.0, |x| Ok(x * x))
            .unwrap_err();
        assert!(matches!(
            err,
            GeodesicsError::Numerics(NumericsError::NotBracketed { .. })
        ));
        assert!(err.is_domain());
    }

    #[test]
    fn iteration_cap() {
        let err = Bisection::new(5).solve(2.0, 0.0, 2.0, |x| Ok(x * x)).unwrap_err();
        assert!(err.is_convergence());
    }

    #[test]
    fn objective_errors_propagate() {
        let err = Bisection::default()
            .solve(1.0, 0.0, 2.0, |_| {
                Err(NumericsError::InvalidParameters("boom".into()).into())
            })
            .unwrap_err();
        assert!(matches!(
            err,
            GeodesicsError::Numerics(NumericsError::InvalidParameters(_))
        ));
    }
}
