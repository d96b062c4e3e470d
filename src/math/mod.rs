pub mod bisection;
pub mod camera;
pub mod integrate;
pub mod log_table;
pub mod rect;
pub mod vector;

pub use bisection::Bisection;
pub use camera::Camera;
pub use log_table::LogTable;
pub use rect::Rect;

/// Point with up to 4 live components.
///
/// `x` is time (or the first axis), `y`, `z`, `w` are spatial axes depending on
/// context. Unused components are kept at zero.
pub type Point = nalgebra::Vector4<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Returns whether `a` and `b` agree within `atol + rtol * |b|`.
#[must_use]
pub fn is_close(a: f64, b: f64, rtol: f64, atol: f64) -> bool {
    (a - b).abs() <= atol + rtol * b.abs()
}

/// Creates a point with two live components.
#[must_use]
pub fn point2(x: f64, y: f64) -> Point {
    Point::new(x, y, 0.0, 0.0)
}

/// Creates a point with three live components.
#[must_use]
pub fn point3(x: f64, y: f64, z: f64) -> Point {
    Point::new(x, y, z, 0.0)
}

/// Creates a point with all four components live.
#[must_use]
pub fn point4(x: f64, y: f64, z: f64, w: f64) -> Point {
    Point::new(x, y, z, w)
}
