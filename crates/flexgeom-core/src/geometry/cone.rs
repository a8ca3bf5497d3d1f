use serde::{Deserialize, Serialize};

use crate::math::{Real, Vec3};

/// Detector pixel grid shape, `(rows, cols)` after binning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorShape {
    /// Number of pixel rows (vertical).
    pub rows: usize,
    /// Number of pixel columns (horizontal).
    pub cols: usize,
}

/// Cone-beam projection geometry with per-angle-invariant detector basis.
///
/// Positions are expressed in the volume-centred frame: the origin is on the
/// rotation axis at the object centre and the second coordinate runs along
/// the beam, so the source sits at a negative beam coordinate and the
/// detector centre at a positive one. The object rotates under a stationary
/// source/detector pair; the rotation lives in the volume geometry, so a
/// single source/detector placement describes every projection.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConeBeamGeometry {
    /// Detector shape in binned pixels.
    pub det_shape: DetectorShape,
    /// X-ray source (tube focal spot) position.
    pub src_pos: Vec3,
    /// Detector centre position.
    pub det_pos: Vec3,
    /// Detector row step vector (vertical pixel pitch, rolled).
    pub det_v: Vec3,
    /// Detector column step vector (horizontal pixel pitch, rolled).
    pub det_u: Vec3,
}

impl ConeBeamGeometry {
    /// Physical detector extent `(height, width)` in the same units as the
    /// basis vectors (mm for scanner settings input).
    pub fn det_size(&self) -> (Real, Real) {
        (
            self.det_v.norm() * self.det_shape.rows as Real,
            self.det_u.norm() * self.det_shape.cols as Real,
        )
    }

    /// Source-to-detector distance along the straight line between the two.
    pub fn source_detector_distance(&self) -> Real {
        (self.det_pos - self.src_pos).norm()
    }
}
