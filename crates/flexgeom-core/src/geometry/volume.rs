use nalgebra::{Unit, UnitQuaternion};
use serde::{Deserialize, Serialize};

use crate::math::{Real, Vec3};

/// Axis-aligned reconstruction volume: voxel grid shape, physical size and
/// centre position.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VolumeGeometry {
    /// Voxel counts along the three axes.
    pub shape: [usize; 3],
    /// Physical extent along the three axes (mm).
    pub size: [Real; 3],
    /// Centre position of the volume.
    pub pos: Vec3,
}

impl VolumeGeometry {
    /// Edge length of one voxel along each axis.
    pub fn voxel_size(&self) -> [Real; 3] {
        [
            self.size[0] / self.shape[0] as Real,
            self.size[1] / self.shape[1] as Real,
            self.size[2] / self.shape[2] as Real,
        ]
    }

    /// Rotate the volume rigidly about `axis` through `pivot`, once per
    /// angle (radians), yielding one oriented frame per angle.
    pub fn rotated(&self, axis: Vec3, pivot: Vec3, angles: &[Real]) -> RotatedVolume {
        let voxel = self.voxel_size();
        let axis = Unit::new_normalize(axis);
        let frames = angles
            .iter()
            .map(|&angle| {
                let rot = UnitQuaternion::from_axis_angle(&axis, angle);
                VolumeFrame {
                    pos: pivot + rot * (self.pos - pivot),
                    w: rot * Vec3::new(voxel[0], 0.0, 0.0),
                    v: rot * Vec3::new(0.0, voxel[1], 0.0),
                    u: rot * Vec3::new(0.0, 0.0, voxel[2]),
                }
            })
            .collect();
        RotatedVolume {
            shape: self.shape,
            size: self.size,
            angles: angles.to_vec(),
            frames,
        }
    }
}

/// Position and voxel basis of a volume at one rotation angle.
///
/// `w`, `v`, `u` are the voxel step vectors along the three grid axes,
/// scaled by voxel size.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VolumeFrame {
    /// Volume centre position.
    pub pos: Vec3,
    /// Voxel step along grid axis 0.
    pub w: Vec3,
    /// Voxel step along grid axis 1.
    pub v: Vec3,
    /// Voxel step along grid axis 2.
    pub u: Vec3,
}

/// A volume geometry rotated through a sequence of angles: one
/// [`VolumeFrame`] per projection angle, for a stationary projection
/// geometry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RotatedVolume {
    /// Voxel counts along the three axes (shared by all frames).
    pub shape: [usize; 3],
    /// Physical extent along the three axes (shared by all frames).
    pub size: [Real; 3],
    /// Rotation angles in radians, one per frame.
    pub angles: Vec<Real>,
    /// Oriented volume frame per angle.
    pub frames: Vec<VolumeFrame>,
}

impl RotatedVolume {
    /// Number of rotation steps (equals the number of projection angles).
    pub fn num_steps(&self) -> usize {
        self.frames.len()
    }
}
