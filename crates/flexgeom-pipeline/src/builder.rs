//! Geometry builder and pipeline entry points.
//!
//! Converts a corrected parameter table into the cone-beam projection
//! geometry and the rotated volume geometry the reconstruction engine
//! consumes. The trigonometry lives here; everything upstream is parsing
//! and additive corrections.

use std::path::Path;

use serde::{Deserialize, Serialize};

use flexgeom_core::{
    linspace, ConeBeamGeometry, DetectorShape, Real, RotatedVolume, Vec3, VolumeGeometry,
};

use crate::dialect::Dialect;
use crate::error::GeometryError;
use crate::keys;
use crate::profiles::{apply_calibration_profile, ProfileRegistry};
use crate::roi::apply_roi_offset;
use crate::settings::parse_settings_str;
use crate::ParamTable;

/// Rotation axis of the object stage: vertical, pointing down in the
/// volume-centred frame.
const ROTATION_AXIS: Vec3 = Vec3::new(-1.0, 0.0, 0.0);

/// Options for the geometry builder.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Drop the final angle of the inclusive start..=last sweep. A full
    /// 0-360 degree scan samples 0 and 360 as the same pose; skipping the
    /// trailing duplicate is the default.
    pub skip_last: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self { skip_last: true }
    }
}

/// Everything the pipeline produces for one acquisition: the two geometry
/// descriptors plus the corrected parameter table for diagnostics.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeometryBundle {
    /// Per-angle rotated reconstruction volume.
    pub volume: RotatedVolume,
    /// Stationary cone-beam projection geometry.
    pub projection: ConeBeamGeometry,
    /// Corrected parameter table (traceability only, no longer mutated).
    pub params: ParamTable,
}

fn invalid(field: &str, reason: impl Into<String>) -> GeometryError {
    GeometryError::InvalidValue {
        field: field.to_owned(),
        reason: reason.into(),
    }
}

/// Check the table invariants the trigonometry depends on.
fn validate(table: &ParamTable) -> Result<(), GeometryError> {
    let roi = table.roi(keys::ROI)?;
    if roi.right <= roi.left {
        return Err(invalid(keys::ROI, "right must exceed left"));
    }
    if roi.bottom <= roi.top {
        return Err(invalid(keys::ROI, "bottom must exceed top"));
    }
    let binning = table.int(keys::BINNING)?;
    if binning < 1 {
        return Err(invalid(keys::BINNING, "binning must be at least 1"));
    }
    let projections = table.int(keys::PROJ_COUNT)?;
    if projections < 2 {
        return Err(invalid(keys::PROJ_COUNT, "need at least two projections"));
    }
    let sod = table.float(keys::SOD)?;
    let sdd = table.float(keys::SDD)?;
    if !(sod > 0.0 && sdd > sod) {
        return Err(invalid(keys::SDD, "require SDD > SOD > 0"));
    }
    let roll = table.float(keys::ROLL_DET)?;
    if !roll.is_finite() {
        return Err(invalid(keys::ROLL_DET, "roll angle must be finite"));
    }
    Ok(())
}

/// Build the projection and rotated-volume geometries from a corrected
/// parameter table.
///
/// The volume vertical position is the SOD/ODD-weighted average of the tube
/// and detector vertical positions, i.e. the beam axis projected onto the
/// rotation axis at the object plane. Both dialects share this formula.
pub fn build_geometries(
    table: &ParamTable,
    options: &BuildOptions,
) -> Result<(RotatedVolume, ConeBeamGeometry), GeometryError> {
    validate(table)?;

    let pixel_size = table.float(keys::PIXEL_SIZE)?;
    let roi = table.roi(keys::ROI)?;
    let binning = table.int(keys::BINNING)?;
    let det_shape = DetectorShape {
        rows: roi.height().div_euclid(binning) as usize,
        cols: roi.width().div_euclid(binning) as usize,
    };

    let roll = table.float(keys::ROLL_DET)?.to_radians();
    let (sin_r, cos_r) = roll.sin_cos();
    let det_v = Vec3::new(cos_r, 0.0, sin_r) * pixel_size;
    let det_u = Vec3::new(-sin_r, 0.0, cos_r) * pixel_size;

    let sod = table.float(keys::SOD)?;
    let sdd = table.float(keys::SDD)?;
    let odd = table.float(keys::ODD)?;
    let ver_tube = table.float(keys::VER_TUBE)?;
    let ver_det = table.float(keys::VER_DET)?;

    let projection = ConeBeamGeometry {
        det_shape,
        src_pos: Vec3::new(ver_tube, -sod, table.float(keys::TRA_TUBE)?),
        det_pos: Vec3::new(ver_det, odd, table.float(keys::TRA_DET)?),
        det_v,
        det_u,
    };

    let mut angles: Vec<Real> = linspace(
        table.float(keys::START_ANGLE)?,
        table.float(keys::LAST_ANGLE)?,
        table.int(keys::PROJ_COUNT)? as usize,
    )
    .into_iter()
    .map(Real::to_radians)
    .collect();
    if options.skip_last {
        angles.pop();
    }

    let vol_ver = (ver_det * sod + ver_tube * odd) / sdd;
    let vol_pos = Vec3::new(vol_ver, 0.0, table.float(keys::TRA_OBJ)?);
    let voxel_size = table.float(keys::VOXEL_SIZE)?;
    let shape = [det_shape.rows, det_shape.cols, det_shape.cols];
    let base = VolumeGeometry {
        shape,
        size: [
            shape[0] as Real * voxel_size,
            shape[1] as Real * voxel_size,
            shape[2] as Real * voxel_size,
        ],
        pos: vol_pos,
    };
    let volume = base.rotated(ROTATION_AXIS, vol_pos, &angles);

    Ok((volume, projection))
}

/// Run the full pipeline on settings text already in memory.
///
/// Parse, apply the ROI offset, optionally apply a named calibration
/// profile from `registry`, then build both geometries.
pub fn derive_geometries_from_str(
    text: &str,
    dialect: &Dialect,
    profile: Option<&str>,
    registry: &ProfileRegistry,
    options: &BuildOptions,
) -> Result<GeometryBundle, GeometryError> {
    let mut table = parse_settings_str(text, dialect)?;
    apply_roi_offset(&mut table, dialect)?;
    if let Some(name) = profile {
        apply_calibration_profile(&mut table, registry.get(name)?)?;
    }
    let (volume, projection) = build_geometries(&table, options)?;
    Ok(GeometryBundle {
        volume,
        projection,
        params: table,
    })
}

/// Run the full pipeline on a settings file.
pub fn derive_geometries(
    path: &Path,
    dialect: &Dialect,
    profile: Option<&str>,
    registry: &ProfileRegistry,
    options: &BuildOptions,
) -> Result<GeometryBundle, GeometryError> {
    let text = std::fs::read_to_string(path)?;
    derive_geometries_from_str(&text, dialect, profile, registry, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Roi;

    const EPS: Real = 1e-12;

    fn scenario_table() -> ParamTable {
        let mut t = ParamTable::default();
        t.insert_float(keys::SOD, 500.0);
        t.insert_float(keys::SDD, 1000.0);
        t.insert_float(keys::ODD, 500.0);
        t.insert_float(keys::VER_TUBE, 3.0);
        t.insert_float(keys::TRA_TUBE, 0.5);
        t.insert_float(keys::VER_DET, -1.0);
        t.insert_float(keys::TRA_DET, 24.0);
        t.insert_float(keys::TRA_OBJ, -0.5);
        t.insert_float(keys::ROLL_DET, 0.0);
        t.insert_float(keys::START_ANGLE, 0.0);
        t.insert_float(keys::LAST_ANGLE, 360.0);
        t.insert_float(keys::PIXEL_SIZE, 0.1);
        t.insert_float(keys::VOXEL_SIZE, 0.1);
        t.insert_int(keys::PROJ_COUNT, 5);
        t.insert_int(keys::BINNING, 2);
        t.insert_roi(
            keys::ROI,
            Roi {
                left: 100,
                top: 100,
                right: 1700,
                bottom: 1600,
            },
        );
        t
    }

    #[test]
    fn end_to_end_scenario_positions_and_shape() {
        let t = scenario_table();
        let (_vg, pg) = build_geometries(&t, &BuildOptions::default()).unwrap();
        assert_eq!(pg.det_shape, DetectorShape { rows: 750, cols: 800 });
        assert!((pg.src_pos - Vec3::new(3.0, -500.0, 0.5)).norm() < EPS);
        assert!((pg.det_pos - Vec3::new(-1.0, 500.0, 24.0)).norm() < EPS);
    }

    #[test]
    fn binning_one_gives_exact_roi_shape() {
        let mut t = scenario_table();
        t.insert_int(keys::BINNING, 1);
        let (_vg, pg) = build_geometries(&t, &BuildOptions::default()).unwrap();
        assert_eq!(
            pg.det_shape,
            DetectorShape {
                rows: 1501,
                cols: 1601
            }
        );
    }

    #[test]
    fn zero_roll_gives_axis_aligned_detector_basis() {
        let t = scenario_table();
        let (_vg, pg) = build_geometries(&t, &BuildOptions::default()).unwrap();
        assert!((pg.det_v - Vec3::new(0.1, 0.0, 0.0)).norm() < EPS);
        assert!((pg.det_u - Vec3::new(0.0, 0.0, 0.1)).norm() < EPS);
    }

    #[test]
    fn roll_rotates_detector_basis_about_beam_axis() {
        let mut t = scenario_table();
        t.insert_float(keys::ROLL_DET, 90.0);
        let (_vg, pg) = build_geometries(&t, &BuildOptions::default()).unwrap();
        assert!((pg.det_v - Vec3::new(0.0, 0.0, 0.1)).norm() < 1e-12);
        assert!((pg.det_u - Vec3::new(-0.1, 0.0, 0.0)).norm() < 1e-12);
        // Roll preserves pixel pitch.
        assert!((pg.det_v.norm() - 0.1).abs() < EPS);
    }

    #[test]
    fn skip_last_drops_the_duplicate_angle() {
        let t = scenario_table();

        let (vg, _) = build_geometries(&t, &BuildOptions { skip_last: false }).unwrap();
        assert_eq!(vg.num_steps(), 5);
        assert!((vg.angles[0] - 0.0).abs() < EPS);
        assert!((vg.angles[4] - 2.0 * std::f64::consts::PI).abs() < 1e-12);

        let (vg, _) = build_geometries(&t, &BuildOptions { skip_last: true }).unwrap();
        assert_eq!(vg.num_steps(), 4);
        assert!((vg.angles[3] - 1.5 * std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn volume_is_cube_on_detector_columns() {
        let t = scenario_table();
        let (vg, pg) = build_geometries(&t, &BuildOptions::default()).unwrap();
        assert_eq!(
            vg.shape,
            [pg.det_shape.rows, pg.det_shape.cols, pg.det_shape.cols]
        );
        assert!((vg.size[0] - 75.0).abs() < EPS);
        assert!((vg.size[1] - 80.0).abs() < EPS);
    }

    #[test]
    fn volume_vertical_is_beam_weighted_average() {
        let t = scenario_table();
        let (vg, _) = build_geometries(&t, &BuildOptions::default()).unwrap();
        // (ver_det * sod + ver_tube * odd) / sdd with equal sod/odd is the
        // plain mean of -1 and 3.
        let expect = (-1.0 * 500.0 + 3.0 * 500.0) / 1000.0;
        for frame in &vg.frames {
            assert!((frame.pos.x - expect).abs() < EPS);
            assert!((frame.pos.z + 0.5).abs() < EPS);
        }
    }

    #[test]
    fn degenerate_roi_is_rejected() {
        let mut t = scenario_table();
        t.insert_roi(
            keys::ROI,
            Roi {
                left: 1700,
                top: 100,
                right: 100,
                bottom: 1600,
            },
        );
        let err = build_geometries(&t, &BuildOptions::default()).unwrap_err();
        assert!(matches!(err, GeometryError::InvalidValue { ref field, .. } if field == keys::ROI));
    }

    #[test]
    fn single_projection_is_rejected() {
        let mut t = scenario_table();
        t.insert_int(keys::PROJ_COUNT, 1);
        let err = build_geometries(&t, &BuildOptions::default()).unwrap_err();
        assert!(
            matches!(err, GeometryError::InvalidValue { ref field, .. } if field == keys::PROJ_COUNT)
        );
    }

    #[test]
    fn sod_must_be_positive_and_below_sdd() {
        let mut t = scenario_table();
        t.insert_float(keys::SOD, 1200.0);
        let err = build_geometries(&t, &BuildOptions::default()).unwrap_err();
        assert!(matches!(err, GeometryError::InvalidValue { ref field, .. } if field == keys::SDD));
    }

    #[test]
    fn missing_field_fails_lazily_at_lookup() {
        // Valid invariants, but no voxel size: the builder only notices when
        // it reaches for the key.
        let mut t = ParamTable::default();
        t.insert_float(keys::SOD, 500.0);
        t.insert_float(keys::SDD, 1000.0);
        t.insert_float(keys::ODD, 500.0);
        t.insert_float(keys::VER_TUBE, 0.0);
        t.insert_float(keys::TRA_TUBE, 0.0);
        t.insert_float(keys::VER_DET, 0.0);
        t.insert_float(keys::TRA_DET, 0.0);
        t.insert_float(keys::TRA_OBJ, 0.0);
        t.insert_float(keys::ROLL_DET, 0.0);
        t.insert_float(keys::START_ANGLE, 0.0);
        t.insert_float(keys::LAST_ANGLE, 360.0);
        t.insert_float(keys::PIXEL_SIZE, 0.1);
        t.insert_int(keys::PROJ_COUNT, 5);
        t.insert_int(keys::BINNING, 1);
        t.insert_roi(
            keys::ROI,
            Roi {
                left: 0,
                top: 0,
                right: 9,
                bottom: 9,
            },
        );
        let err = build_geometries(&t, &BuildOptions::default()).unwrap_err();
        assert!(matches!(err, GeometryError::MissingField(ref k) if k == keys::VOXEL_SIZE));
    }
}
