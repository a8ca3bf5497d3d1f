//! Cone-beam geometry derivation pipeline for FleX-ray scanner settings.
//!
//! Turns a plain-text scanner settings file into the pair of geometry
//! descriptors a tomographic reconstruction engine consumes. Four components
//! run in strict sequence:
//!
//! 1. settings parser ([`parse_settings_file`]): dialect-driven extraction
//!    into a typed [`ParamTable`],
//! 2. ROI corrector ([`apply_roi_offset`]): folds the region-of-interest
//!    offset into the detector/tube positions,
//! 3. calibration applier ([`apply_calibration_profile`]): optional named
//!    additive correction from a [`ProfileRegistry`],
//! 4. geometry builder ([`build_geometries`]): the trigonometric
//!    construction of projection and rotated-volume geometry.
//!
//! [`derive_geometries`] chains all four. Two settings dialects are
//! supported through [`Dialect`] descriptors; the pipeline itself is shared.
//!
//! ```no_run
//! use flexgeom_pipeline::{derive_geometries, BuildOptions, Dialect, ProfileRegistry};
//!
//! # fn main() -> Result<(), flexgeom_pipeline::GeometryError> {
//! let bundle = derive_geometries(
//!     "scan/data settings XRE.txt".as_ref(),
//!     &Dialect::data_settings(),
//!     Some("cwi-flexray-2022-10-28"),
//!     &ProfileRegistry::cwi_flexray(),
//!     &BuildOptions::default(),
//! )?;
//! println!("{} projection angles", bundle.volume.num_steps());
//! # Ok(())
//! # }
//! ```

mod builder;
mod dialect;
mod error;
/// Canonical parameter-table keys.
pub mod keys;
mod profiles;
mod roi;
mod settings;

pub use builder::{
    build_geometries, derive_geometries, derive_geometries_from_str, BuildOptions, GeometryBundle,
};
pub use dialect::{Dialect, DuplicatePolicy, FieldKind, FieldSpec};
pub use error::GeometryError;
pub use profiles::{apply_calibration_profile, CalibrationProfile, ProfileRegistry};
pub use roi::{apply_roi_offset, DETECTOR_CENTER, DETECTOR_PIXEL_MM};
pub use settings::{parse_settings_file, parse_settings_str, ParamTable, ParamValue, Roi};
