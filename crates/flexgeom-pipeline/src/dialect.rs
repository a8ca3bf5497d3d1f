//! Settings-file dialect descriptors.
//!
//! The two supported scanner export formats differ only in surface syntax:
//! separator character, field labels, value quirks (quoting, embedded unit
//! suffixes), ROI element delimiter and voxel-size unit. A [`Dialect`]
//! captures those differences so one parser and one pipeline serve both
//! formats, instead of two drifting copies.

use flexgeom_core::Real;

use crate::keys;

/// How a recognized field's raw text is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Decimal number.
    Float,
    /// Integer part of a decimal number.
    Int,
    /// Decimal number followed by a `;`-separated unit suffix on the same
    /// line; only the numeral before the `;` is read.
    Position,
    /// Four delimited integers (left, top, right, bottom).
    Roi,
}

/// Policy for a field label occurring more than once in one file.
///
/// Both built-in dialects use [`DuplicatePolicy::FirstWins`]; the policy is
/// an explicit part of the dialect rather than an accident of parse order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Keep the first parsed occurrence, ignore later ones.
    FirstWins,
    /// Let later occurrences overwrite earlier ones.
    LastWins,
}

/// One recognized field: the exact label text in the file, the canonical
/// parameter-table key it maps to, and how its value is read.
#[derive(Clone, Copy, Debug)]
pub struct FieldSpec {
    /// Exact label text on the left of the separator.
    pub label: &'static str,
    /// Canonical table key (see [`crate::keys`]).
    pub key: &'static str,
    /// Value interpretation.
    pub kind: FieldKind,
}

const fn field(label: &'static str, key: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { label, key, kind }
}

/// Descriptor of one settings-file format.
#[derive(Clone, Debug)]
pub struct Dialect {
    /// Dialect name, used in log output.
    pub name: &'static str,
    /// Key/value separator character.
    pub separator: char,
    /// Strip `"` characters from raw values before parsing.
    pub strip_quotes: bool,
    /// Delimiter between the four ROI integers.
    pub roi_delimiter: char,
    /// Factor applied to the parsed voxel size to normalize it to mm.
    pub voxel_size_scale: Real,
    /// Duplicate-label policy.
    pub duplicates: DuplicatePolicy,
    /// Table key receiving the vertical component of the ROI offset.
    pub roi_vertical_target: &'static str,
    /// Recognized fields; anything else is silently ignored.
    pub fields: &'static [FieldSpec],
}

const DATA_SETTINGS_FIELDS: &[FieldSpec] = &[
    field("SOD", keys::SOD, FieldKind::Float),
    field("SDD", keys::SDD, FieldKind::Float),
    field("ver_tube", keys::VER_TUBE, FieldKind::Float),
    field("tra_tube", keys::TRA_TUBE, FieldKind::Float),
    field("ver_det", keys::VER_DET, FieldKind::Float),
    field("tra_det", keys::TRA_DET, FieldKind::Float),
    field("tra_obj", keys::TRA_OBJ, FieldKind::Float),
    field("Start angle", keys::START_ANGLE, FieldKind::Float),
    field("Last angle", keys::LAST_ANGLE, FieldKind::Float),
    field("Voxel size", keys::VOXEL_SIZE, FieldKind::Float),
    field("Binned pixelsize (mm)", keys::PIXEL_SIZE, FieldKind::Float),
    field("total projections", keys::PROJ_COUNT, FieldKind::Int),
    field("Binning value", keys::BINNING, FieldKind::Int),
    field("ROI", keys::ROI, FieldKind::Roi),
];

const SCAN_SETTINGS_FIELDS: &[FieldSpec] = &[
    field("SOD", keys::SOD, FieldKind::Float),
    field("SDD", keys::SDD, FieldKind::Float),
    field("ver_tube", keys::VER_TUBE, FieldKind::Position),
    field("tra_tube", keys::TRA_TUBE, FieldKind::Position),
    field("ver_det", keys::VER_DET, FieldKind::Position),
    field("tra_det", keys::TRA_DET, FieldKind::Position),
    field("tra_obj", keys::TRA_OBJ, FieldKind::Position),
    field("Start angle", keys::START_ANGLE, FieldKind::Float),
    field("Last angle", keys::LAST_ANGLE, FieldKind::Float),
    field("Voxel size", keys::VOXEL_SIZE, FieldKind::Float),
    field("Binned pixel size", keys::PIXEL_SIZE, FieldKind::Float),
    field("Number of projections", keys::PROJ_COUNT, FieldKind::Int),
    field("Binning", keys::BINNING, FieldKind::Int),
    field("ROI (LTRB)", keys::ROI, FieldKind::Roi),
];

impl Dialect {
    /// Legacy `data settings XRE.txt` format: `=`-separated, quoted values,
    /// `;`-delimited ROI, voxel size already in mm. The vertical ROI offset
    /// lands on the detector position.
    pub fn data_settings() -> Self {
        Self {
            name: "data-settings",
            separator: '=',
            strip_quotes: true,
            roi_delimiter: ';',
            voxel_size_scale: 1.0,
            duplicates: DuplicatePolicy::FirstWins,
            roi_vertical_target: keys::VER_DET,
            fields: DATA_SETTINGS_FIELDS,
        }
    }

    /// Newer `scan settings.txt` format: `:`-separated, position values
    /// carry a `; mm` unit suffix, `,`-delimited ROI, voxel size in
    /// micrometers (scaled to mm). The vertical ROI offset lands on the
    /// tube position.
    pub fn scan_settings() -> Self {
        Self {
            name: "scan-settings",
            separator: ':',
            strip_quotes: false,
            roi_delimiter: ',',
            voxel_size_scale: 1e-3,
            duplicates: DuplicatePolicy::FirstWins,
            roi_vertical_target: keys::VER_TUBE,
            fields: SCAN_SETTINGS_FIELDS,
        }
    }

    /// Look up the field spec for an exact label, if recognized.
    pub fn field(&self, label: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.label == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_settings_recognizes_original_labels() {
        let d = Dialect::data_settings();
        assert_eq!(d.separator, '=');
        assert_eq!(d.field("SOD").unwrap().key, keys::SOD);
        assert_eq!(d.field("Binned pixelsize (mm)").unwrap().key, keys::PIXEL_SIZE);
        assert_eq!(d.field("total projections").unwrap().kind, FieldKind::Int);
        assert!(d.field("Exposure time").is_none());
    }

    #[test]
    fn scan_settings_positions_carry_unit_suffix() {
        let d = Dialect::scan_settings();
        assert_eq!(d.separator, ':');
        assert_eq!(d.field("ver_tube").unwrap().kind, FieldKind::Position);
        assert_eq!(d.roi_vertical_target, keys::VER_TUBE);
        assert!((d.voxel_size_scale - 1e-3).abs() < 1e-15);
    }
}
