//! High-level entry crate for the `flexgeom` toolbox.
//!
//! Derives the cone-beam geometry of a FleX-ray CT acquisition (source and
//! detector placement, detector orientation, projection angles and
//! reconstruction-volume placement) from a scanner settings file, optionally
//! corrected by a named calibration profile. The resulting
//! [`GeometryBundle`] feeds a downstream reconstruction engine.
//!
//! ```no_run
//! use flexgeom::{derive_geometries, BuildOptions, Dialect, ProfileRegistry};
//!
//! # fn main() -> Result<(), flexgeom::GeometryError> {
//! let bundle = derive_geometries(
//!     "scan/data settings XRE.txt".as_ref(),
//!     &Dialect::data_settings(),
//!     Some("cwi-flexray-2022-10-28"),
//!     &ProfileRegistry::cwi_flexray(),
//!     &BuildOptions::default(),
//! )?;
//!
//! println!(
//!     "source at {:?}, {} angles",
//!     bundle.projection.src_pos,
//!     bundle.volume.num_steps()
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Module organization
//!
//! - [`core`]: geometry descriptor types and math aliases,
//! - [`pipeline`]: settings parsing, corrections and the geometry builder.

/// Geometry descriptor types and math aliases.
pub mod core {
    pub use flexgeom_core::*;
}

/// Settings parsing, corrections and the geometry builder.
pub mod pipeline {
    pub use flexgeom_pipeline::*;
}

/// Convenient re-exports for common use cases.
///
/// Import with `use flexgeom::prelude::*;` to get started quickly.
pub mod prelude {
    pub use crate::core::{
        ConeBeamGeometry, DetectorShape, Real, RotatedVolume, Vec3, VolumeFrame, VolumeGeometry,
    };
    pub use crate::pipeline::{
        derive_geometries, derive_geometries_from_str, BuildOptions, CalibrationProfile, Dialect,
        GeometryBundle, GeometryError, ParamTable, ProfileRegistry, Roi,
    };
}

pub use flexgeom_core::{
    ConeBeamGeometry, DetectorShape, Real, RotatedVolume, Vec3, VolumeFrame, VolumeGeometry,
};
pub use flexgeom_pipeline::{
    apply_calibration_profile, apply_roi_offset, build_geometries, derive_geometries,
    derive_geometries_from_str, BuildOptions, CalibrationProfile, Dialect, GeometryBundle,
    GeometryError, ParamTable, ProfileRegistry,
};
