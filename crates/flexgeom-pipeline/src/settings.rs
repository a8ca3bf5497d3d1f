//! Settings-file parsing into a typed parameter table.
//!
//! The parser reads one `label<sep>value` pair per line, keeps only the
//! labels the dialect recognizes, and stores them under canonical keys.
//! Separator-less lines (headers, comments) and unrecognized labels are
//! skipped silently. After the pass the object-to-detector distance is
//! derived from `sdd - sod` and the voxel size is normalized to mm.
//!
//! Beyond `sod`/`sdd` (needed to derive `odd`) no up-front completeness
//! check is done: the geometry builder fails lazily at key lookup, which is
//! acceptable because parsing and building run in direct sequence within
//! one call.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use flexgeom_core::Real;

use crate::dialect::{Dialect, DuplicatePolicy, FieldKind};
use crate::error::GeometryError;
use crate::keys;

/// Detector region of interest in unbinned pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roi {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl Roi {
    /// Pixel centre `(cx, cy)` using floor division.
    pub fn center(&self) -> (i64, i64) {
        (
            (self.left + self.right).div_euclid(2),
            (self.top + self.bottom).div_euclid(2),
        )
    }

    /// Inclusive pixel width (`right - left + 1`).
    pub fn width(&self) -> i64 {
        self.right - self.left + 1
    }

    /// Inclusive pixel height (`bottom - top + 1`).
    pub fn height(&self) -> i64 {
        self.bottom - self.top + 1
    }
}

/// One parsed parameter value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Float(Real),
    Int(i64),
    Roi(Roi),
}

/// Typed parameter table keyed by the canonical names in [`crate::keys`].
///
/// Built once by the parser, mutated in place by the ROI corrector and the
/// calibration applier (additive deltas on existing keys only), then read by
/// the geometry builder and returned to the caller for diagnostics.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ParamTable(BTreeMap<String, ParamValue>);

impl ParamTable {
    /// Whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Raw value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn insert_float(&mut self, key: &str, value: Real) {
        self.0.insert(key.to_owned(), ParamValue::Float(value));
    }

    pub fn insert_int(&mut self, key: &str, value: i64) {
        self.0.insert(key.to_owned(), ParamValue::Int(value));
    }

    pub fn insert_roi(&mut self, key: &str, value: Roi) {
        self.0.insert(key.to_owned(), ParamValue::Roi(value));
    }

    /// Float value of `key`, or [`GeometryError::MissingField`].
    pub fn float(&self, key: &str) -> Result<Real, GeometryError> {
        match self.0.get(key) {
            Some(ParamValue::Float(v)) => Ok(*v),
            Some(_) => Err(GeometryError::InvalidValue {
                field: key.to_owned(),
                reason: "not a float-valued field".to_owned(),
            }),
            None => Err(GeometryError::MissingField(key.to_owned())),
        }
    }

    /// Integer value of `key`, or [`GeometryError::MissingField`].
    pub fn int(&self, key: &str) -> Result<i64, GeometryError> {
        match self.0.get(key) {
            Some(ParamValue::Int(v)) => Ok(*v),
            Some(_) => Err(GeometryError::InvalidValue {
                field: key.to_owned(),
                reason: "not an integer-valued field".to_owned(),
            }),
            None => Err(GeometryError::MissingField(key.to_owned())),
        }
    }

    /// ROI value of `key`, or [`GeometryError::MissingField`].
    pub fn roi(&self, key: &str) -> Result<Roi, GeometryError> {
        match self.0.get(key) {
            Some(ParamValue::Roi(v)) => Ok(*v),
            Some(_) => Err(GeometryError::InvalidValue {
                field: key.to_owned(),
                reason: "not an ROI-valued field".to_owned(),
            }),
            None => Err(GeometryError::MissingField(key.to_owned())),
        }
    }

    /// Add `delta` to the existing float field `key`.
    ///
    /// The field must already be present: corrections never introduce new
    /// parameters, they only shift parsed ones.
    pub fn add_float(&mut self, key: &str, delta: Real) -> Result<(), GeometryError> {
        let current = self.float(key)?;
        self.insert_float(key, current + delta);
        Ok(())
    }
}

fn parse_float(field: &str, raw: &str) -> Result<Real, GeometryError> {
    raw.trim()
        .parse::<Real>()
        .map_err(|_| GeometryError::MalformedValue {
            field: field.to_owned(),
            raw: raw.trim().to_owned(),
        })
}

fn parse_roi(field: &str, raw: &str, delimiter: char) -> Result<Roi, GeometryError> {
    let malformed = || GeometryError::MalformedValue {
        field: field.to_owned(),
        raw: raw.trim().to_owned(),
    };
    let parts: Vec<i64> = raw
        .split(delimiter)
        .map(|p| p.trim().parse::<i64>())
        .collect::<Result<_, _>>()
        .map_err(|_| malformed())?;
    let [left, top, right, bottom] = parts.try_into().map_err(|_| malformed())?;
    Ok(Roi {
        left,
        top,
        right,
        bottom,
    })
}

/// Parse settings text under the given dialect into a parameter table.
pub fn parse_settings_str(text: &str, dialect: &Dialect) -> Result<ParamTable, GeometryError> {
    let mut table = ParamTable::default();
    // Detector roll is rarely written by the scanner; default to no roll and
    // let calibration profiles shift it.
    table.insert_float(keys::ROLL_DET, 0.0);

    for line in text.lines() {
        let Some((label, raw)) = line.split_once(dialect.separator) else {
            continue;
        };
        let Some(spec) = dialect.field(label.trim()) else {
            continue;
        };
        if table.contains(spec.key) && dialect.duplicates == DuplicatePolicy::FirstWins {
            continue;
        }

        let mut raw = raw.to_owned();
        if dialect.strip_quotes {
            raw.retain(|c| c != '"');
        }

        match spec.kind {
            FieldKind::Float => {
                let v = parse_float(spec.key, &raw)?;
                table.insert_float(spec.key, v);
            }
            FieldKind::Position => {
                // The raw line carries a unit suffix after `;`.
                let numeral = raw.split(';').next().unwrap_or(&raw);
                let v = parse_float(spec.key, numeral)?;
                table.insert_float(spec.key, v);
            }
            FieldKind::Int => {
                let v = parse_float(spec.key, &raw)?;
                table.insert_int(spec.key, v as i64);
            }
            FieldKind::Roi => {
                let v = parse_roi(spec.key, &raw, dialect.roi_delimiter)?;
                table.insert_roi(spec.key, v);
            }
        }
    }

    let sod = table.float(keys::SOD)?;
    let sdd = table.float(keys::SDD)?;
    table.insert_float(keys::ODD, sdd - sod);

    if table.contains(keys::VOXEL_SIZE) {
        let v = table.float(keys::VOXEL_SIZE)?;
        table.insert_float(keys::VOXEL_SIZE, v * dialect.voxel_size_scale);
    }

    log::debug!(
        "parsed {} fields from {} settings",
        table.len(),
        dialect.name
    );
    Ok(table)
}

/// Read and parse a settings file under the given dialect.
pub fn parse_settings_file(path: &Path, dialect: &Dialect) -> Result<ParamTable, GeometryError> {
    let text = fs::read_to_string(path)?;
    parse_settings_str(&text, dialect)
}
