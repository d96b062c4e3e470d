//! Componentwise arithmetic, rotations and sampling on [`Point`].
//!
//! Addition, subtraction and scaling use the `nalgebra` operators directly.
//! The helpers here cover what the spacetime diagrams need on top of that.
use std::f64::consts::{PI, TAU};

use crate::error::{GeometryError, Result};

use super::{Point, TOLERANCE};

/// Componentwise (Hadamard) product.
#[must_use]
pub fn hadamard_mul(a: &Point, b: &Point) -> Point {
    a.component_mul(b)
}

/// Componentwise division over all four components.
#[must_use]
pub fn hadamard_div(a: &Point, b: &Point) -> Point {
    a.component_div(b)
}

/// Componentwise division of the `x` and `y` components only.
///
/// `z` and `w` of the result are zero, so 2D sizes with unused trailing
/// components never divide by zero.
#[must_use]
pub fn hadamard_div_2d(a: &Point, b: &Point) -> Point {
    Point::new(a.x / b.x, a.y / b.y, 0.0, 0.0)
}

/// Dot product over all live components.
#[must_use]
pub fn dot(a: &Point, b: &Point) -> f64 {
    a.dot(b)
}

/// Cross product of the first three components. `w` of the result is zero.
#[must_use]
pub fn cross(a: &Point, b: &Point) -> Point {
    let c = a.xyz().cross(&b.xyz());
    Point::new(c.x, c.y, c.z, 0.0)
}

/// Euclidean length.
#[must_use]
pub fn length(a: &Point) -> f64 {
    a.norm()
}

/// Squared distance between two points.
#[must_use]
pub fn distance_squared(a: &Point, b: &Point) -> f64 {
    (a - b).norm_squared()
}

/// Distance between two points.
#[must_use]
pub fn distance(a: &Point, b: &Point) -> f64 {
    (a - b).norm()
}

/// Scales `a` to unit length.
///
/// # Errors
///
/// Returns [`GeometryError::ZeroVector`] if `a` has (near) zero length.
pub fn normalize(a: &Point) -> Result<Point> {
    let len = a.norm();
    if len < TOLERANCE {
        return Err(GeometryError::ZeroVector.into());
    }
    Ok(a / len)
}

/// Linear interpolation `a + u * (b - a)`.
///
/// `u` is not clamped: values outside `[0, 1]` extrapolate along the line.
#[must_use]
pub fn lerp(a: &Point, b: &Point, u: f64) -> Point {
    a + (b - a) * u
}

/// Rotates about the Z axis by `theta`, leaving `z` and `w` unchanged.
#[must_use]
pub fn rotate_xy(p: &Point, theta: f64) -> Point {
    let (s, c) = theta.sin_cos();
    Point::new(p.x * c - p.y * s, p.x * s + p.y * c, p.z, p.w)
}

/// Rotates `v` about the unit axis `k` by `theta` (Rodrigues' formula).
#[must_use]
pub fn rotate_about_axis(v: &Point, k: &Point, theta: f64) -> Point {
    let (s, c) = theta.sin_cos();
    v * c + cross(k, v) * s + k * (k.dot(v) * (1.0 - c))
}

/// Rotates `v` about the unit axis `k` passing through `p`.
#[must_use]
pub fn rotate_about_point_and_axis(v: &Point, p: &Point, k: &Point, theta: f64) -> Point {
    rotate_about_axis(&(v - p), k, theta) + p
}

/// Unsigned angle between two vectors.
///
/// # Errors
///
/// Returns [`GeometryError::ZeroVector`] if either vector has zero length.
pub fn angle_between(a: &Point, b: &Point) -> Result<f64> {
    let denom = a.norm() * b.norm();
    if denom < TOLERANCE {
        return Err(GeometryError::ZeroVector.into());
    }
    Ok((a.dot(b) / denom).clamp(-1.0, 1.0).acos())
}

/// Angle that rotates `a` onto `b` in the XY plane, in `(-pi, pi]`.
#[must_use]
pub fn signed_angle_xy(a: &Point, b: &Point) -> f64 {
    let theta = b.y.atan2(b.x) - a.y.atan2(a.x);
    if theta > PI {
        theta - TAU
    } else if theta <= -PI {
        theta + TAU
    } else {
        theta
    }
}

/// Negates the `y` component (screen coordinates grow downward).
#[must_use]
pub fn invert_y(a: &Point) -> Point {
    Point::new(a.x, -a.y, a.z, a.w)
}

/// Inverts `p` in the sphere with the given center and radius.
///
/// # Errors
///
/// Returns [`GeometryError::ZeroVector`] if `p` coincides with the center.
pub fn invert_in_sphere(p: &Point, center: &Point, radius: f64) -> Result<Point> {
    let d2 = distance_squared(p, center);
    if d2 < TOLERANCE * TOLERANCE {
        return Err(GeometryError::ZeroVector.into());
    }
    Ok(center + (p - center) * (radius * radius / d2))
}

/// Returns `n + 1` evenly spaced points from `a` to `b` inclusive.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn line_points(a: &Point, b: &Point, n: usize) -> Vec<Point> {
    let n = n.max(1);
    (0..=n).map(|i| lerp(a, b, i as f64 / n as f64)).collect()
}

/// Returns points spaced around an ellipse with center `c` and radius vectors
/// `a` and `b`.
///
/// With `repeat_first` the first point is appended again to close the loop.
#[must_use]
pub fn ellipse_points(c: &Point, a: &Point, b: &Point, n: usize, repeat_first: bool) -> Vec<Point> {
    let n = n.max(1);
    let last = if repeat_first { n } else { n - 1 };
    (0..=last)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let theta = TAU * i as f64 / n as f64;
            c + a * theta.cos() + b * theta.sin()
        })
        .collect()
}
