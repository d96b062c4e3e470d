use std::f64::consts::TAU;

use tracing::debug;

use crate::error::{GeometryError, NumericsError, Result};
use crate::math::integrate::simpson;
use crate::math::vector::{normalize, rotate_xy};
use crate::math::{point2, point3, Bisection, LogTable, Point};
use crate::physics::{CentralBody, PhysicalConstants};

use super::EmbeddingParams;

const MIN_SIN_THETA_ZERO: f64 = 0.001;
const MAX_SIN_THETA_ZERO: f64 = 0.999;
const MIN_DELTA_TAU: f64 = 1e-6;
/// Simpson points for direct height integrals.
const DIRECT_INTEGRATION_POINTS: usize = 1000;
/// Relative slack on the embedded space range.
const SPACE_RTOL: f64 = 1e-12;

/// Shape coefficients `k`, `delta`, `alpha` of the funnel.
#[derive(Debug, Clone, Copy)]
struct Shape {
    sqr_x0: f64,
    k: f64,
    delta: f64,
    alpha: f64,
    sqrt_alpha: f64,
    k2_over_4x04: f64,
}

impl Shape {
    fn new(params: &EmbeddingParams, x0: f64, light_speed: f64, schwarzschild_radius: f64) -> Self {
        let sqr_x0 = x0 * x0;
        let a_e0 = 1.0 - 1.0 / x0;
        let s = params.sin_theta_zero;
        let k = params.delta_tau_real * light_speed / (TAU * a_e0.sqrt() * schwarzschild_radius);
        let delta = (k / (2.0 * s * sqr_x0)).powi(2);
        let alpha = params.bottom_radius.powi(2) / (4.0 * sqr_x0 * sqr_x0 * s * s + k * k);
        Self {
            sqr_x0,
            k,
            delta,
            alpha,
            sqrt_alpha: alpha.sqrt(),
            k2_over_4x04: k * k / (4.0 * sqr_x0 * sqr_x0),
        }
    }

    fn term(&self, delta_x: f64) -> f64 {
        delta_x / self.sqr_x0 + self.delta
    }

    fn radius(&self, delta_x: f64) -> f64 {
        self.k * self.sqrt_alpha / self.term(delta_x).sqrt()
    }

    /// `dz/dx` without the `sqrt(alpha)` factor.
    fn slope(&self, delta_x: f64) -> f64 {
        let t = 1.0 / self.term(delta_x);
        t * (1.0 - self.k2_over_4x04 * t).max(0.0).sqrt()
    }

    fn height_between(&self, from: f64, to: f64, n: usize) -> Result<f64> {
        Ok(self.sqrt_alpha * simpson(from, to, n, |x| self.slope(x))?)
    }
}

/// The Jonsson funnel for a given central body.
///
/// Distances enter as `delta_x = r / r_s - x_0`, the distance above the surface
/// in Schwarzschild radii, so the surface sits at `delta_x = 0`. Heights up
/// the funnel are tabulated once per shape; every shape change rebuilds the
/// coefficients and the table together.
#[derive(Debug, Clone)]
pub struct JonssonEmbedding {
    params: EmbeddingParams,
    light_speed: f64,
    body_radius: f64,
    schwarzschild_radius: f64,
    x0: f64,
    shape: Shape,
    table: LogTable,
    bisection: Bisection,
}

impl JonssonEmbedding {
    /// Builds the funnel for `body`.
    ///
    /// The slope and time-wrap parameters are clamped into their valid ranges.
    ///
    /// # Errors
    ///
    /// Returns an error if the body lies inside its Schwarzschild radius, if a
    /// sampling parameter is out of range, or if the height table cannot be
    /// built.
    pub fn new(
        params: EmbeddingParams,
        constants: &PhysicalConstants,
        body: &CentralBody,
    ) -> Result<Self> {
        Self::build(
            params,
            constants.light_speed,
            body.radius,
            body.schwarzschild_radius(constants),
            Bisection::default(),
        )
    }

    /// Returns a copy that inverts heights with the given solver.
    #[must_use]
    pub fn with_bisection(mut self, bisection: Bisection) -> Self {
        self.bisection = bisection;
        self
    }

    fn build(
        mut params: EmbeddingParams,
        light_speed: f64,
        body_radius: f64,
        schwarzschild_radius: f64,
        bisection: Bisection,
    ) -> Result<Self> {
        params.sin_theta_zero = params
            .sin_theta_zero
            .clamp(MIN_SIN_THETA_ZERO, MAX_SIN_THETA_ZERO);
        params.delta_tau_real = params.delta_tau_real.max(MIN_DELTA_TAU);

        if !(schwarzschild_radius > 0.0 && body_radius > schwarzschild_radius) {
            return Err(GeometryError::Degenerate(format!(
                "body radius {body_radius} must exceed its Schwarzschild radius {schwarzschild_radius}"
            ))
            .into());
        }
        if !(params.bottom_radius > 0.0) {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "bottom_radius",
                value: params.bottom_radius,
                min: 0.0,
                max: f64::INFINITY,
            }
            .into());
        }
        if !(params.max_space_factor > 1.0) {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "max_space_factor",
                value: params.max_space_factor,
                min: 1.0,
                max: f64::INFINITY,
            }
            .into());
        }
        if params.table_subdivisions < 2 {
            return Err(NumericsError::InvalidParameters(format!(
                "table_subdivisions must be at least 2, got {}",
                params.table_subdivisions
            ))
            .into());
        }

        let x0 = body_radius / schwarzschild_radius;
        let shape = Shape::new(&params, x0, light_speed, schwarzschild_radius);
        let delta_x_max = body_radius * params.max_space_factor / schwarzschild_radius - x0;
        let table = LogTable::accumulate(0.0, delta_x_max, params.table_size, |lo, hi| {
            shape.height_between(lo, hi, params.table_subdivisions)
        })?;
        debug!(
            sin_theta_zero = params.sin_theta_zero,
            delta_tau_real = params.delta_tau_real,
            k = shape.k,
            delta = shape.delta,
            alpha = shape.alpha,
            max_delta_z = table.value_range().1,
            "rebuilt embedding table"
        );

        Ok(Self {
            params,
            light_speed,
            body_radius,
            schwarzschild_radius,
            x0,
            shape,
            table,
            bisection,
        })
    }

    fn rebuild(&mut self, params: EmbeddingParams) -> Result<()> {
        *self = Self::build(
            params,
            self.light_speed,
            self.body_radius,
            self.schwarzschild_radius,
            self.bisection,
        )?;
        Ok(())
    }

    /// Changes the slope at the bottom of the funnel, clamped to
    /// `[0.001, 0.999]`, and rebuilds the table.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be rebuilt; the embedding is left
    /// unchanged in that case.
    pub fn set_slope_angle(&mut self, sin_theta_zero: f64) -> Result<()> {
        let params = EmbeddingParams {
            sin_theta_zero,
            ..self.params
        };
        self.rebuild(params)
    }

    /// Changes the proper time per turn, at least `1e-6` s, and rebuilds the
    /// table.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be rebuilt; the embedding is left
    /// unchanged in that case.
    pub fn set_time_wrapping(&mut self, delta_tau_real: f64) -> Result<()> {
        let params = EmbeddingParams {
            delta_tau_real,
            ..self.params
        };
        self.rebuild(params)
    }

    #[must_use]
    pub fn params(&self) -> &EmbeddingParams {
        &self.params
    }

    #[must_use]
    pub fn k(&self) -> f64 {
        self.shape.k
    }

    #[must_use]
    pub fn delta(&self) -> f64 {
        self.shape.delta
    }

    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.shape.alpha
    }

    /// Surface radius of the body and the outermost embedded distance.
    #[must_use]
    pub fn space_range(&self) -> (f64, f64) {
        (self.body_radius, self.body_radius * self.params.max_space_factor)
    }

    #[must_use]
    pub fn delta_x_max(&self) -> f64 {
        self.table.max()
    }

    /// Height of the funnel rim above its bottom.
    #[must_use]
    pub fn max_delta_z(&self) -> f64 {
        self.table.value_range().1
    }

    /// Funnel radius at `delta_x`.
    #[must_use]
    pub fn radius_from_delta_x(&self, delta_x: f64) -> f64 {
        self.shape.radius(delta_x)
    }

    /// Height at `delta_x` by direct integration from a known height
    /// `delta_z0` at `delta_x0`.
    ///
    /// # Errors
    ///
    /// Propagates quadrature errors.
    pub fn integrate_delta_z(&self, delta_x: f64, delta_x0: f64, delta_z0: f64) -> Result<f64> {
        Ok(delta_z0 + self.shape.height_between(delta_x0, delta_x, DIRECT_INTEGRATION_POINTS)?)
    }

    /// Height at `delta_x` from the table.
    ///
    /// # Errors
    ///
    /// Returns [`NumericsError::OutOfRange`] outside `[0, delta_x_max]`.
    pub fn delta_z_from_delta_x(&self, delta_x: f64) -> Result<f64> {
        self.table.lookup(delta_x)
    }

    /// Inverse of [`JonssonEmbedding::delta_z_from_delta_x`] through the table.
    ///
    /// # Errors
    ///
    /// Returns [`NumericsError::OutOfRange`] outside `[0, max_delta_z]`.
    pub fn delta_x_from_delta_z(&self, delta_z: f64) -> Result<f64> {
        self.table.reverse_lookup(delta_z)
    }

    /// Inverse of the direct integral, found by bisection.
    ///
    /// # Errors
    ///
    /// Returns an error if `delta_z` is not reached within the embedded range
    /// or if the bisection does not converge.
    pub fn solve_delta_x_from_delta_z(&self, delta_z: f64) -> Result<f64> {
        self.bisection
            .solve(delta_z, 0.0, self.delta_x_max(), |x| self.integrate_delta_z(x, 0.0, 0.0))
    }

    #[must_use]
    pub fn delta_x_from_space(&self, space: f64) -> f64 {
        space / self.schwarzschild_radius - self.x0
    }

    #[must_use]
    pub fn space_from_delta_x(&self, delta_x: f64) -> f64 {
        (delta_x + self.x0) * self.schwarzschild_radius
    }

    /// Angle around the funnel at time `t`; one turn per wrap period.
    #[must_use]
    pub fn angle_from_time(&self, t: f64) -> f64 {
        TAU * t / self.params.delta_tau_real
    }

    #[must_use]
    pub fn time_delta_from_angle_delta(&self, delta_theta: f64) -> f64 {
        delta_theta * self.params.delta_tau_real / TAU
    }

    /// Angle of an embedding point around the funnel axis, in `(-pi, pi]`.
    #[must_use]
    pub fn angle_from_embedding_point(&self, p: &Point) -> f64 {
        p.y.atan2(p.x)
    }

    fn checked_delta_x(&self, space: f64) -> Result<f64> {
        let (lo, hi) = self.space_range();
        if !(space >= lo * (1.0 - SPACE_RTOL) && space <= hi * (1.0 + SPACE_RTOL)) {
            return Err(NumericsError::OutOfRange {
                parameter: "space",
                value: space,
                min: lo,
                max: hi,
            }
            .into());
        }
        Ok(self.delta_x_from_space(space).clamp(0.0, self.delta_x_max()))
    }

    /// Outward, upward unit normal of the funnel.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroVector`] if the normal degenerates.
    pub fn surface_normal_from_delta_x_and_theta(&self, delta_x: f64, theta: f64) -> Result<Point> {
        let shape = &self.shape;
        let term = shape.term(delta_x);
        let dr_dx = -shape.k * shape.sqrt_alpha / (2.0 * shape.sqr_x0 * term.powf(1.5));
        let dz_dx = shape.sqrt_alpha * shape.slope(delta_x);
        let dz_dr = dz_dx / dr_dx;
        let n = normalize(&point3(-dz_dr, 0.0, 1.0))?;
        Ok(rotate_xy(&n, theta))
    }

    /// Surface normal at the spacetime event `(t, r)`.
    ///
    /// # Errors
    ///
    /// Returns [`NumericsError::OutOfRange`] if `r` is outside the embedded
    /// range.
    pub fn surface_normal_from_spacetime(&self, p: &Point) -> Result<Point> {
        let delta_x = self.checked_delta_x(p.y)?;
        self.surface_normal_from_delta_x_and_theta(delta_x, self.angle_from_time(p.x))
    }

    /// Surface normal below an embedding point, found through its height.
    ///
    /// # Errors
    ///
    /// Returns [`NumericsError::OutOfRange`] if the height is outside the
    /// table.
    pub fn surface_normal_from_embedding_point(&self, p: &Point) -> Result<Point> {
        let delta_x = self.delta_x_from_delta_z(p.z)?;
        self.surface_normal_from_delta_x_and_theta(delta_x, self.angle_from_embedding_point(p))
    }

    /// The funnel point `(r cos theta, r sin theta, z)` at `delta_x`.
    ///
    /// # Errors
    ///
    /// Returns [`NumericsError::OutOfRange`] outside `[0, delta_x_max]`.
    pub fn embedding_point_from_delta_x_and_theta(&self, delta_x: f64, theta: f64) -> Result<Point> {
        let r = self.radius_from_delta_x(delta_x);
        let z = self.delta_z_from_delta_x(delta_x)?;
        Ok(rotate_xy(&point3(r, 0.0, z), theta))
    }

    /// Embeds the spacetime event `(t, r)`.
    ///
    /// # Errors
    ///
    /// Returns [`NumericsError::OutOfRange`] if `r` lies outside
    /// `[R, R * max_space_factor]`.
    pub fn embedding_point_from_spacetime(&self, p: &Point) -> Result<Point> {
        let delta_x = self.checked_delta_x(p.y)?;
        self.embedding_point_from_delta_x_and_theta(delta_x, self.angle_from_time(p.x))
    }

    /// Recovers `(t, r)` from an embedding point, with `t` in `[0, delta_tau)`.
    ///
    /// # Errors
    ///
    /// Returns [`NumericsError::OutOfRange`] if the height is outside the
    /// table.
    pub fn spacetime_from_embedding_point(&self, p: &Point) -> Result<Point> {
        let delta_x = self.delta_x_from_delta_z(p.z)?;
        let t = self
            .time_delta_from_angle_delta(self.angle_from_embedding_point(p))
            .rem_euclid(self.params.delta_tau_real);
        Ok(point2(t, self.space_from_delta_x(delta_x)))
    }

    /// Meridian of the funnel at time `t`, bottom to rim, with `n + 1` points
    /// log-spaced in distance.
    ///
    /// # Errors
    ///
    /// Propagates table lookup errors.
    #[allow(clippy::cast_precision_loss)]
    pub fn spaceline(&self, t: f64, n: usize) -> Result<Vec<Point>> {
        let n = n.max(1);
        let theta = self.angle_from_time(t);
        let ln_span = self.delta_x_max().ln_1p();
        (0..=n)
            .map(|i| {
                let delta_x = if i == n {
                    self.delta_x_max()
                } else {
                    (ln_span * i as f64 / n as f64).exp_m1()
                };
                self.embedding_point_from_delta_x_and_theta(delta_x, theta)
            })
            .collect()
    }

    /// Closed circle of constant distance `space` around the funnel, one full
    /// wrap period in `n` steps.
    ///
    /// # Errors
    ///
    /// Returns [`NumericsError::OutOfRange`] if `space` is not embedded.
    #[allow(clippy::cast_precision_loss)]
    pub fn timeline(&self, space: f64, n: usize) -> Result<Vec<Point>> {
        let n = n.max(1);
        let delta_x = self.checked_delta_x(space)?;
        let base = self.embedding_point_from_delta_x_and_theta(delta_x, 0.0)?;
        Ok((0..=n)
            .map(|i| rotate_xy(&base, TAU * i as f64 / n as f64))
            .collect())
    }
}
