//! Fixed-step quadrature.
use crate::error::{NumericsError, Result};

fn check_points(n: usize) -> Result<()> {
    if n < 2 {
        return Err(NumericsError::InvalidParameters(format!(
            "quadrature needs at least 2 points, got {n}"
        ))
        .into());
    }
    Ok(())
}

/// Composite Simpson's rule over `n` points.
///
/// `n` is bumped by one when even, so the rule always sees an odd number of
/// points. Reversed bounds give the negated integral.
///
/// # Errors
///
/// Returns [`NumericsError::InvalidParameters`] if `n < 2`.
#[allow(clippy::cast_precision_loss)]
pub fn simpson<F>(lower: f64, upper: f64, n: usize, mut f: F) -> Result<f64>
where
    F: FnMut(f64) -> f64,
{
    check_points(n)?;
    let n = if n % 2 == 0 { n + 1 } else { n };
    let h = (upper - lower) / (n - 1) as f64;

    let mut sum = f(lower) + f(upper);
    for i in 1..n - 1 {
        let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
        sum += weight * f(lower + h * i as f64);
    }
    Ok(sum * h / 3.0)
}

/// Composite midpoint rule over `n` subintervals.
///
/// # Errors
///
/// Returns [`NumericsError::InvalidParameters`] if `n < 2`.
#[allow(clippy::cast_precision_loss)]
pub fn midpoint<F>(lower: f64, upper: f64, n: usize, mut f: F) -> Result<f64>
where
    F: FnMut(f64) -> f64,
{
    check_points(n)?;
    let h = (upper - lower) / n as f64;
    let sum: f64 = (0..n).map(|i| f(lower + h * (i as f64 + 0.5))).sum();
    Ok(sum * h)
}
