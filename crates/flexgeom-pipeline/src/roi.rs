//! ROI pixel-offset correction.
//!
//! The ROI is written for 1x1 binning, so the physical detector centre sits
//! at pixel (971, 767) with a 74.8 um pixel pitch. An ROI that is not
//! centred on the physical detector shifts the effective detector (or, in
//! the newer dialect, tube) position; this step folds that shift into the
//! parameter table.

use flexgeom_core::Real;

use crate::dialect::Dialect;
use crate::error::GeometryError;
use crate::keys;
use crate::ParamTable;

/// Physical detector centre in unbinned pixels (horizontal, vertical).
pub const DETECTOR_CENTER: (i64, i64) = (971, 767);
/// Physical detector pixel pitch at 1x1 binning (mm).
pub const DETECTOR_PIXEL_MM: Real = 0.0748;

/// Shift the detector/tube position fields by the ROI's offset from the
/// physical detector centre.
///
/// The horizontal component is added to `tra_det`; the vertical component
/// goes to the dialect's `roi_vertical_target` (`ver_det` for the legacy
/// format, `ver_tube` for the newer one). The correction is additive and
/// therefore cumulative: calling it twice shifts the positions twice.
pub fn apply_roi_offset(table: &mut ParamTable, dialect: &Dialect) -> Result<(), GeometryError> {
    let roi = table.roi(keys::ROI)?;
    let (cx, cy) = roi.center();

    let tra_offset = (cx - DETECTOR_CENTER.0) as Real * DETECTOR_PIXEL_MM;
    let ver_offset = (cy - DETECTOR_CENTER.1) as Real * DETECTOR_PIXEL_MM;

    // Read both targets before writing either, so a missing field cannot
    // leave the table half-corrected.
    let ver = table.float(dialect.roi_vertical_target)?;
    let tra = table.float(keys::TRA_DET)?;
    table.insert_float(dialect.roi_vertical_target, ver + ver_offset);
    table.insert_float(keys::TRA_DET, tra + tra_offset);

    log::debug!(
        "ROI offset: tra {:+.4} mm, ver {:+.4} mm onto {}",
        tra_offset,
        ver_offset,
        dialect.roi_vertical_target
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Roi;
    use crate::ParamTable;

    fn table_with_roi(roi: Roi) -> ParamTable {
        let mut t = ParamTable::default();
        t.insert_roi(keys::ROI, roi);
        t.insert_float(keys::VER_DET, 0.0);
        t.insert_float(keys::VER_TUBE, 0.0);
        t.insert_float(keys::TRA_DET, 0.0);
        t
    }

    #[test]
    fn centred_roi_leaves_positions_unchanged() {
        // Centre (971, 767) exactly.
        let mut t = table_with_roi(Roi {
            left: 871,
            top: 667,
            right: 1071,
            bottom: 867,
        });
        apply_roi_offset(&mut t, &Dialect::data_settings()).unwrap();
        assert!(t.float(keys::VER_DET).unwrap().abs() < 1e-12);
        assert!(t.float(keys::TRA_DET).unwrap().abs() < 1e-12);
    }

    #[test]
    fn offset_roi_shifts_detector_position() {
        let mut t = table_with_roi(Roi {
            left: 100,
            top: 100,
            right: 1700,
            bottom: 1600,
        });
        apply_roi_offset(&mut t, &Dialect::data_settings()).unwrap();
        // cx = 900, cy = 850.
        let expect_tra = (900 - 971) as Real * DETECTOR_PIXEL_MM;
        let expect_ver = (850 - 767) as Real * DETECTOR_PIXEL_MM;
        assert!((t.float(keys::TRA_DET).unwrap() - expect_tra).abs() < 1e-12);
        assert!((t.float(keys::VER_DET).unwrap() - expect_ver).abs() < 1e-12);
        // The tube is untouched in the legacy dialect.
        assert!(t.float(keys::VER_TUBE).unwrap().abs() < 1e-12);
    }

    #[test]
    fn scan_dialect_targets_tube_vertical() {
        let mut t = table_with_roi(Roi {
            left: 100,
            top: 100,
            right: 1700,
            bottom: 1600,
        });
        apply_roi_offset(&mut t, &Dialect::scan_settings()).unwrap();
        let expect_ver = (850 - 767) as Real * DETECTOR_PIXEL_MM;
        assert!((t.float(keys::VER_TUBE).unwrap() - expect_ver).abs() < 1e-12);
        assert!(t.float(keys::VER_DET).unwrap().abs() < 1e-12);
    }

    #[test]
    fn applying_twice_is_cumulative() {
        let mut t = table_with_roi(Roi {
            left: 100,
            top: 100,
            right: 1700,
            bottom: 1600,
        });
        let d = Dialect::data_settings();
        apply_roi_offset(&mut t, &d).unwrap();
        let once = t.float(keys::TRA_DET).unwrap();
        apply_roi_offset(&mut t, &d).unwrap();
        let twice = t.float(keys::TRA_DET).unwrap();
        assert!((twice - 2.0 * once).abs() < 1e-12);
    }

    #[test]
    fn missing_lateral_target_leaves_vertical_untouched() {
        let mut t = ParamTable::default();
        t.insert_roi(
            keys::ROI,
            Roi {
                left: 100,
                top: 100,
                right: 1700,
                bottom: 1600,
            },
        );
        t.insert_float(keys::VER_DET, 1.0);
        // No tra_det in the table.
        let err = apply_roi_offset(&mut t, &Dialect::data_settings()).unwrap_err();
        assert!(matches!(err, GeometryError::MissingField(ref k) if k == keys::TRA_DET));
        assert!((t.float(keys::VER_DET).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn missing_roi_is_reported() {
        let mut t = ParamTable::default();
        t.insert_float(keys::VER_DET, 0.0);
        t.insert_float(keys::TRA_DET, 0.0);
        let err = apply_roi_offset(&mut t, &Dialect::data_settings()).unwrap_err();
        assert!(matches!(err, GeometryError::MissingField(ref k) if k == keys::ROI));
    }
}
