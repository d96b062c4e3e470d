use std::f64::consts::{FRAC_PI_2, PI};

use tracing::debug;

use crate::error::Result;
use crate::math::vector::{cross, normalize, rotate_about_point_and_axis, signed_angle_xy};
use crate::math::{point2, Bisection, Point};

use super::JonssonEmbedding;

/// Why a geodesic walk stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The requested number of points was produced.
    MaxPoints,
    /// The walk reached the bottom of the funnel (the surface of the body).
    InnerEdge,
    /// The walk left through the rim of the funnel.
    OuterEdge,
}

/// A traced geodesic: spacetime events with their embedding points.
#[derive(Debug, Clone)]
pub struct GeodesicTrace {
    /// Events `(t, r)`; time is unwrapped and keeps growing past one period.
    pub points: Vec<Point>,
    /// Embedding points matching `points`.
    pub embedded: Vec<Point>,
    pub termination: Termination,
}

/// Traces geodesics of the funnel by walking its surface.
///
/// Each step rotates the previous point about the current one, around the
/// axis orthogonal to both the incoming segment and the surface normal, until
/// the rotated copy lands back on the funnel. Steps keep the length of the
/// initial segment.
#[derive(Debug, Clone, Copy)]
pub struct GeodesicTracer<'a> {
    embedding: &'a JonssonEmbedding,
    bisection: Bisection,
}

impl<'a> GeodesicTracer<'a> {
    #[must_use]
    pub fn new(embedding: &'a JonssonEmbedding) -> Self {
        Self {
            embedding,
            bisection: Bisection::default(),
        }
    }

    #[must_use]
    pub fn with_bisection(mut self, bisection: Bisection) -> Self {
        self.bisection = bisection;
        self
    }

    /// Signed distance of `p` from the funnel, measured horizontally.
    fn off_surface(&self, p: &Point) -> Result<f64> {
        let e = self.embedding;
        let z = p.z.clamp(0.0, e.max_delta_z());
        let delta_x = e.delta_x_from_delta_z(z)?;
        Ok(e.radius_from_delta_x(delta_x) - p.x.hypot(p.y))
    }

    /// Continues the free-fall worldline through the events `a` then `b`.
    ///
    /// The trace starts with `a` and `b` and holds at most `max_points`
    /// events. Reaching an edge of the funnel ends the walk early; this is a
    /// normal outcome reported through [`GeodesicTrace::termination`]. A step
    /// that cannot land back on the funnel also ends the walk, at the edge
    /// the worldline is heading for.
    ///
    /// # Errors
    ///
    /// Returns an error if `a` or `b` cannot be embedded, if they coincide on
    /// the funnel, or if a step fails to find its rotation angle.
    pub fn trace(&self, a: &Point, b: &Point, max_points: usize) -> Result<GeodesicTrace> {
        let e = self.embedding;
        let mut previous = e.embedding_point_from_spacetime(a)?;
        let mut current = e.embedding_point_from_spacetime(b)?;
        let mut event = *b;
        let mut points = vec![*a, *b];
        let mut embedded = vec![previous, current];

        while points.len() < max_points {
            let normal = e.surface_normal_from_spacetime(&event)?;
            let axis = normalize(&cross(&(current - previous), &normal))?;
            let rotated = |theta: f64| rotate_about_point_and_axis(&previous, &current, &axis, theta);

            // A step longer than the funnel is wide misses the surface on
            // the whole forward half turn.
            let low = self.off_surface(&rotated(FRAC_PI_2))?;
            let high = self.off_surface(&rotated(PI + FRAC_PI_2))?;
            if low * high > 0.0 {
                let termination = if rotated(PI).z > current.z {
                    Termination::OuterEdge
                } else {
                    Termination::InnerEdge
                };
                debug!(
                    points = points.len(),
                    t = event.x,
                    ?termination,
                    "geodesic step left the funnel"
                );
                return Ok(GeodesicTrace {
                    points,
                    embedded,
                    termination,
                });
            }

            let angle = self
                .bisection
                .solve(0.0, FRAC_PI_2, PI + FRAC_PI_2, |theta| self.off_surface(&rotated(theta)))?;
            let next = rotated(angle);

            if next.z < 0.0 {
                debug!(points = points.len(), t = event.x, "geodesic reached inner edge");
                return Ok(GeodesicTrace {
                    points,
                    embedded,
                    termination: Termination::InnerEdge,
                });
            }
            if next.z > e.max_delta_z() {
                debug!(points = points.len(), t = event.x, "geodesic reached outer edge");
                return Ok(GeodesicTrace {
                    points,
                    embedded,
                    termination: Termination::OuterEdge,
                });
            }

            let delta_x = e.delta_x_from_delta_z(next.z)?;
            let delta_t = e.time_delta_from_angle_delta(signed_angle_xy(&current, &next));
            event = point2(event.x + delta_t, e.space_from_delta_x(delta_x));
            points.push(event);
            embedded.push(next);
            previous = current;
            current = next;
        }

        Ok(GeodesicTrace {
            points,
            embedded,
            termination: Termination::MaxPoints,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::embedding::EmbeddingParams;
    use crate::math::vector::distance;
    use crate::physics::{CentralBody, PhysicalConstants};

    const R: f64 = 6.371e6;

    fn earth_funnel() -> JonssonEmbedding {
        let params = EmbeddingParams {
            delta_tau_real: 2000.0,
            ..EmbeddingParams::default()
        };
        JonssonEmbedding::new(params, &PhysicalConstants::default(), &CentralBody::earth()).unwrap()
    }

    #[test]
    fn walks_with_constant_step() {
        let e = earth_funnel();
        let trace = GeodesicTracer::new(&e)
            .trace(&point2(0.0, R + 1e6), &point2(20.0, R + 1e6), 12)
            .unwrap();
        assert_eq!(trace.termination, Termination::MaxPoints);
        assert_eq!(trace.points.len(), 12);
        assert_eq!(trace.embedded.len(), 12);

        let step = distance(&trace.embedded[0], &trace.embedded[1]);
        for w in trace.embedded.windows(2) {
            let d = distance(&w[0], &w[1]);
            assert!((d - step).abs() < 1e-9 * step.max(1.0), "d={d} step={step}");
        }
    }

    #[test]
    fn events_lie_on_the_funnel() {
        let e = earth_funnel();
        let trace = GeodesicTracer::new(&e)
            .trace(&point2(0.0, R + 1e6), &point2(20.0, R + 1e6), 12)
            .unwrap();
        for (event, p) in trace.points.iter().zip(&trace.embedded) {
            let q = e.embedding_point_from_spacetime(event).unwrap();
            assert!((q - p).norm() < 1e-6, "event={event:?}");
        }
    }

    #[test]
    fn body_pulls_the_worldline_down() {
        let e = earth_funnel();
        let trace = GeodesicTracer::new(&e)
            .trace(&point2(0.0, R + 1e6), &point2(20.0, R + 1e6), 12)
            .unwrap();
        assert!(trace.points.windows(2).all(|w| w[1].x > w[0].x));
        let last = trace.points[11];
        assert!(last.y < R + 1e6 - 1e5, "height={}", last.y - R);
    }

    #[test]
    fn falls_into_the_surface() {
        let e = earth_funnel();
        let trace = GeodesicTracer::new(&e)
            .trace(&point2(0.0, R + 1e6), &point2(20.0, R + 1e6), 2000)
            .unwrap();
        assert_eq!(trace.termination, Termination::InnerEdge);
        assert!(trace.points.len() < 2000);
        let last = trace.points[trace.points.len() - 1];
        assert!(last.y >= R * (1.0 - 1e-9) && last.y < R + 1e6);
    }

    #[test]
    fn thrown_up_leaves_through_the_rim() {
        let e = earth_funnel();
        let trace = GeodesicTracer::new(&e)
            .trace(&point2(0.0, R + 1e6), &point2(20.0, R + 3e6), 20_000)
            .unwrap();
        assert_eq!(trace.termination, Termination::OuterEdge);
        assert_eq!(trace.points.len(), 4);
        assert!(trace.points.windows(2).all(|w| w[1].y > w[0].y));
        assert!(trace.embedded.iter().all(|p| p.z <= e.max_delta_z()));
    }

    #[test]
    fn step_past_the_rim_is_outer_edge() {
        let e = earth_funnel();
        let trace = GeodesicTracer::new(&e)
            .trace(&point2(0.0, 90.0 * R), &point2(0.2, 95.0 * R), 100)
            .unwrap();
        assert_eq!(trace.termination, Termination::OuterEdge);
        assert_eq!(trace.points.len(), 2);
    }

    #[test]
    fn coincident_events_fail() {
        let e = earth_funnel();
        let p = point2(0.0, R + 1e6);
        assert!(GeodesicTracer::new(&e).trace(&p, &p, 10).is_err());
    }
}
