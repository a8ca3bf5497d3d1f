//! Geometry descriptor types for cone-beam CT acquisitions.
//!
//! This crate contains:
//! - linear algebra type aliases (`Real`, `Vec3`, ...),
//! - the cone-beam projection geometry descriptor ([`ConeBeamGeometry`]),
//! - the reconstruction volume descriptor ([`VolumeGeometry`]) and its
//!   per-angle rotated form ([`RotatedVolume`]),
//! - the inclusive angle-sequence helper ([`math::linspace`]).
//!
//! Coordinate frame convention: the origin sits on the rotation axis at the
//! object centre, the second axis points along the beam (source at negative
//! values, detector at positive values), the first axis is vertical.

/// Linear algebra type aliases and helpers.
pub mod math;
/// Projection and volume geometry descriptors.
pub mod geometry;

pub use geometry::*;
pub use math::*;
