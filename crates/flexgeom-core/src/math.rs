//! Mathematical type definitions and small numeric helpers.

use nalgebra::Vector3;

/// Scalar type used throughout the library (currently `f64`).
pub type Real = f64;

/// 3D vector with [`Real`] components.
pub type Vec3 = Vector3<Real>;

/// `n` evenly spaced values from `start` to `end`, both endpoints included.
///
/// Requires `n >= 2`; with two samples the result is `[start, end]`.
pub fn linspace(start: Real, end: Real, n: usize) -> Vec<Real> {
    debug_assert!(n >= 2, "linspace needs at least two samples");
    let step = (end - start) / (n - 1) as Real;
    (0..n).map(|i| start + step * i as Real).collect()
}
