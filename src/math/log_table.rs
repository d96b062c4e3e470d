use crate::error::{NumericsError, Result};

/// Memoized samples of a non-decreasing function over a log-spaced partition.
///
/// Sample `i` sits at `x_i = min + base^i - 1` with
/// `base = (1 + max - min)^(1 / (n - 1))`, so the partition starts at `min`,
/// ends exactly at `max` and is densest near `min`. Lookups interpolate
/// linearly between neighbouring samples in both directions.
#[derive(Debug, Clone)]
pub struct LogTable {
    min: f64,
    max: f64,
    ln_base: f64,
    values: Vec<f64>,
}

impl LogTable {
    /// Samples `f` at every partition point.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain or size is invalid, if `f` fails, or if
    /// a sample is NaN or the samples decrease anywhere.
    pub fn tabulate<F>(min: f64, max: f64, n: usize, mut f: F) -> Result<Self>
    where
        F: FnMut(f64) -> Result<f64>,
    {
        let ln_base = Self::validate(min, max, n)?;
        let values = (0..n)
            .map(|i| f(Self::partition_point(min, max, ln_base, n, i)))
            .collect::<Result<Vec<_>>>()?;
        Self::from_values(min, max, ln_base, values)
    }

    /// Builds a table by summing per-interval increments from zero at `min`.
    ///
    /// `step(lo, hi)` returns the increase of the tabulated function over
    /// `[lo, hi]`, typically an integral over that interval.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain or size is invalid, if `step` fails, or
    /// if an increment is negative or NaN.
    pub fn accumulate<F>(min: f64, max: f64, n: usize, mut step: F) -> Result<Self>
    where
        F: FnMut(f64, f64) -> Result<f64>,
    {
        let ln_base = Self::validate(min, max, n)?;
        let mut values = Vec::with_capacity(n);
        let mut total = 0.0;
        let mut lo = min;
        values.push(total);
        for i in 1..n {
            let hi = Self::partition_point(min, max, ln_base, n, i);
            total += step(lo, hi)?;
            values.push(total);
            lo = hi;
        }
        Self::from_values(min, max, ln_base, values)
    }

    fn validate(min: f64, max: f64, n: usize) -> Result<f64> {
        if n < 2 {
            return Err(
                NumericsError::InvalidParameters(format!("table needs 2 samples, got {n}")).into(),
            );
        }
        if !(min.is_finite() && max.is_finite() && max > min) {
            return Err(NumericsError::InvalidParameters(format!(
                "invalid table domain [{min}, {max}]"
            ))
            .into());
        }
        #[allow(clippy::cast_precision_loss)]
        let ln_base = (max - min).ln_1p() / (n - 1) as f64;
        Ok(ln_base)
    }

    fn partition_point(min: f64, max: f64, ln_base: f64, n: usize, i: usize) -> f64 {
        if i + 1 == n {
            return max;
        }
        #[allow(clippy::cast_precision_loss)]
        let offset = (ln_base * i as f64).exp_m1();
        min + offset
    }

    fn from_values(min: f64, max: f64, ln_base: f64, values: Vec<f64>) -> Result<Self> {
        if let Some(index) = values.iter().position(|v| v.is_nan()) {
            return Err(
                NumericsError::InvalidParameters(format!("table sample {index} is NaN")).into(),
            );
        }
        if let Some(index) = values.windows(2).position(|w| w[1] < w[0]) {
            return Err(NumericsError::NonMonotonic { index: index + 1 }.into());
        }
        Ok(Self {
            min,
            max,
            ln_base,
            values,
        })
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false: a table holds at least two samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Sample values, non-decreasing.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Smallest and largest tabulated value.
    #[must_use]
    pub fn value_range(&self) -> (f64, f64) {
        (self.values[0], self.values[self.values.len() - 1])
    }

    /// Returns the partition point of sample `i`.
    #[must_use]
    pub fn x_at(&self, i: usize) -> f64 {
        Self::partition_point(self.min, self.max, self.ln_base, self.len(), i)
    }

    fn interval_of(&self, x: f64) -> usize {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let i = ((x - self.min).ln_1p() / self.ln_base).floor().max(0.0) as usize;
        let last = self.len() - 2;
        // Rounding in ln/exp can put x one interval off near a boundary.
        let mut i = i.min(last);
        while i > 0 && x < self.x_at(i) {
            i -= 1;
        }
        while i < last && x >= self.x_at(i + 1) {
            i += 1;
        }
        i
    }

    /// Interpolated value at `x`.
    ///
    /// # Errors
    ///
    /// Returns [`NumericsError::OutOfRange`] if `x` lies outside `[min, max]`.
    pub fn lookup(&self, x: f64) -> Result<f64> {
        if !(x >= self.min && x <= self.max) {
            return Err(NumericsError::OutOfRange {
                parameter: "x",
                value: x,
                min: self.min,
                max: self.max,
            }
            .into());
        }
        let i = self.interval_of(x);
        let (x0, x1) = (self.x_at(i), self.x_at(i + 1));
        let (v0, v1) = (self.values[i], self.values[i + 1]);
        Ok(v0 + (v1 - v0) * (x - x0) / (x1 - x0))
    }

    /// Inverse of [`LogTable::lookup`]: the `x` whose interpolated value is `v`.
    ///
    /// On a flat stretch the first `x` reaching `v` is returned.
    ///
    /// # Errors
    ///
    /// Returns [`NumericsError::OutOfRange`] if `v` lies outside the range of
    /// tabulated values.
    pub fn reverse_lookup(&self, v: f64) -> Result<f64> {
        let (lo, hi) = self.value_range();
        if !(v >= lo && v <= hi) {
            return Err(NumericsError::OutOfRange {
                parameter: "value",
                value: v,
                min: lo,
                max: hi,
            }
            .into());
        }
        let last = self.len() - 2;
        let i = self
            .values
            .partition_point(|&s| s < v)
            .saturating_sub(1)
            .min(last);
        let (v0, v1) = (self.values[i], self.values[i + 1]);
        let x0 = self.x_at(i);
        if v1 <= v0 {
            return Ok(x0);
        }
        let x1 = self.x_at(i + 1);
        Ok(x0 + (x1 - x0) * (v - v0) / (v1 - v0))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::GeodesicsError;
    use approx::assert_relative_eq;

    #[test]
    fn partition_endpoints() {
        let t = LogTable::tabulate(2.0, 1e6, 100, |x| Ok(x)).unwrap();
        assert_eq!(t.len(), 100);
        assert!((t.x_at(0) - 2.0).abs() < 1e-12);
        assert!((t.x_at(99) - 1e6).abs() < f64::EPSILON);
        for i in 1..t.len() {
            assert!(t.x_at(i) > t.x_at(i - 1));
        }
    }

    #[test]
    fn lookup_exact_on_linear() {
        let t = LogTable::tabulate(0.0, 1000.0, 50, |x| Ok(3.0 * x + 1.0)).unwrap();
        for x in [0.0, 0.3, 17.0, 999.9, 1000.0] {
            assert_relative_eq!(t.lookup(x).unwrap(), 3.0 * x + 1.0, max_relative = 1e-9);
        }
    }

    #[test]
    fn reverse_round_trip() {
        let t = LogTable::tabulate(0.0, 1e4, 500, |x| Ok(x.sqrt())).unwrap();
        for x in [0.5, 10.0, 333.0, 9000.0] {
            let v = t.lookup(x).unwrap();
            assert_relative_eq!(t.reverse_lookup(v).unwrap(), x, max_relative = 1e-9);
        }
    }

    #[test]
    fn accumulate_matches_antiderivative() {
        // Increments of x^2 over each interval sum to x^2 at every sample.
        let t = LogTable::accumulate(0.0, 100.0, 200, |lo, hi| Ok(hi * hi - lo * lo)).unwrap();
        assert!(t.values().windows(2).all(|w| w[1] >= w[0]));
        for i in [0, 10, 150, 199] {
            let x = t.x_at(i);
            assert_relative_eq!(t.values()[i], x * x, max_relative = 1e-9, epsilon = 1e-12);
        }
    }

    #[test]
    fn flat_interval_returns_start() {
        let t = LogTable::tabulate(0.0, 10.0, 11, |x| Ok(x.min(3.0))).unwrap();
        // Samples reach 3.0 at index 6 and stay flat afterwards.
        let x = t.reverse_lookup(3.0).unwrap();
        assert!((x - t.x_at(6)).abs() < 1e-12, "x={x}");
        assert!(t.reverse_lookup(0.0).unwrap().abs() < 1e-12);
    }

    #[test]
    fn rejects_decreasing_samples() {
        let err = LogTable::tabulate(0.0, 10.0, 20, |x| Ok(-x)).unwrap_err();
        assert!(matches!(
            err,
            GeodesicsError::Numerics(NumericsError::NonMonotonic { index: 1 })
        ));
    }

    #[test]
    fn rejects_nan_samples() {
        let err = LogTable::tabulate(0.0, 10.0, 20, |x| Ok(if x == 0.0 { f64::NAN } else { x }))
            .unwrap_err();
        assert!(matches!(
            err,
            GeodesicsError::Numerics(NumericsError::InvalidParameters(_))
        ));
        let err = LogTable::accumulate(0.0, 10.0, 20, |lo, _| {
            Ok(if lo > 5.0 { f64::NAN } else { 1.0 })
        })
        .unwrap_err();
        assert!(matches!(
            err,
            GeodesicsError::Numerics(NumericsError::InvalidParameters(_))
        ));
    }

    #[test]
    fn out_of_range() {
        let t = LogTable::tabulate(0.0, 10.0, 20, |x| Ok(x)).unwrap();
        assert!(t.lookup(-0.1).is_err());
        assert!(t.lookup(10.1).is_err());
        assert!(t.reverse_lookup(11.0).is_err());
        assert!(LogTable::tabulate(1.0, 1.0, 20, |x| Ok(x)).is_err());
        assert!(LogTable::tabulate(0.0, 1.0, 1, |x| Ok(x)).is_err());
    }
}
