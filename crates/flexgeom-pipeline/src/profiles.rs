//! Named calibration profiles.
//!
//! A profile is a hand-measured additive correction to the acquisition
//! geometry, tied to a specific scanner maintenance or calibration event.
//! Profiles are immutable, versioned by date and never auto-selected: the
//! caller names one explicitly or no correction is applied.
//!
//! The registry is an explicit value passed into the pipeline, so tests can
//! substitute a minimal profile set instead of reaching for global state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use flexgeom_core::Real;

use crate::error::GeometryError;
use crate::keys;
use crate::ParamTable;

/// A named, immutable additive correction to selected parameter fields.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CalibrationProfile {
    /// Registry name, e.g. `cwi-flexray-2022-10-28`.
    pub name: String,
    /// Free-text provenance note; never applied numerically.
    pub description: String,
    /// Field deltas, keyed by canonical parameter name.
    pub deltas: BTreeMap<String, Real>,
}

impl CalibrationProfile {
    pub fn new(
        name: &str,
        description: &str,
        deltas: impl IntoIterator<Item = (&'static str, Real)>,
    ) -> Self {
        Self {
            name: name.to_owned(),
            description: description.trim().to_owned(),
            deltas: deltas
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v))
                .collect(),
        }
    }
}

/// Lookup table of calibration profiles by exact name.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProfileRegistry {
    profiles: BTreeMap<String, CalibrationProfile>,
}

impl ProfileRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the CWI FleX-ray correction profiles, one per
    /// maintenance/calibration event.
    pub fn cwi_flexray() -> Self {
        let mut reg = Self::new();
        reg.insert(CalibrationProfile::new(
            "cwi-flexray-2023-08-21",
            "Correction profile deduced from Acquila hc/vc/cor settings after \
             the exchange of the detector motor.",
            [
                (keys::TRA_DET, 24.1215),
                (keys::VER_TUBE, -6.2917),
                (keys::TRA_OBJ, -0.5405),
            ],
        ));
        reg.insert(CalibrationProfile::new(
            "cwi-flexray-2022-10-28",
            "Correction profile deduced from markers after the October 2022 \
             maintenance.",
            [
                (keys::TRA_DET, 24.0485),
                (keys::VER_TUBE, -5.7730),
                (keys::TRA_OBJ, -0.5010),
            ],
        ));
        reg.insert(CalibrationProfile::new(
            "cwi-flexray-2022-05-31",
            "Correction profile deduced from Acquila hc/vc/cor settings after \
             the 31 May 2022 re-calibration. Includes det_roll determined by \
             Robert using markers.",
            [
                (keys::TRA_DET, 24.4203),
                (keys::VER_TUBE, -6.2281),
                (keys::TRA_OBJ, -0.5010),
                (keys::ROLL_DET, -0.262),
            ],
        ));
        reg.insert(CalibrationProfile::new(
            "cwi-flexray-2022-05-31-norotation",
            "Correction profile deduced from Acquila hc/vc/cor settings after \
             the 31 May 2022 re-calibration.",
            [
                (keys::TRA_DET, 24.4203),
                (keys::VER_TUBE, -6.2281),
                (keys::TRA_OBJ, -0.5010),
            ],
        ));
        reg.insert(CalibrationProfile::new(
            "cwi-flexray-2020-03-26",
            "Correction profile deduced from Acquila HC/VC/COR settings after \
             the March 2020 maintenance. Includes empirically determined \
             det_roll.",
            [
                (keys::TRA_DET, 24.300),
                (keys::VER_TUBE, -6.086),
                (keys::TRA_OBJ, -0.524),
                (keys::ROLL_DET, -0.175),
            ],
        ));
        reg.insert(CalibrationProfile::new(
            "cwi-flexray-2020-03-26-norotation",
            "Correction profile deduced from Acquila HC/VC/COR settings after \
             the March 2020 maintenance.",
            [
                (keys::TRA_DET, 24.300),
                (keys::VER_TUBE, -6.086),
                (keys::TRA_OBJ, -0.524),
            ],
        ));
        // Last updated by Alex Kostenko on 24 April 2019, concurrently with
        // the flexDATA documentation overhaul. Its axs_tan key is not part of
        // either settings dialect, so applying it fails with a field
        // mismatch; kept verbatim for provenance.
        reg.insert(CalibrationProfile::new(
            "cwi-flexray-2019-04-24",
            "Profile last updated by Alex Kostenko on 24 April 2019, \
             concurrently with documentation updates in the flexDATA codebase.",
            [
                (keys::TRA_DET, 24.0),
                (keys::VER_TUBE, -7.0),
                ("axs_tan", -0.5),
            ],
        ));
        reg
    }

    /// Add or replace a profile under its own name.
    pub fn insert(&mut self, profile: CalibrationProfile) {
        self.profiles.insert(profile.name.clone(), profile);
    }

    /// Profile by exact name, or [`GeometryError::UnknownProfile`].
    pub fn get(&self, name: &str) -> Result<&CalibrationProfile, GeometryError> {
        self.profiles
            .get(name)
            .ok_or_else(|| GeometryError::UnknownProfile(name.to_owned()))
    }

    /// Registered profile names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }
}

/// Add the profile's deltas, field by field, to the parameter table.
///
/// Every corrected field must already be present in the table; a profile
/// keyed to an absent field is a usage error surfaced as
/// [`GeometryError::ProfileFieldMismatch`], since silently skipping it
/// would corrupt the geometry invisibly. Applying a profile twice adds its
/// deltas twice.
pub fn apply_calibration_profile(
    table: &mut ParamTable,
    profile: &CalibrationProfile,
) -> Result<(), GeometryError> {
    // Validate every key up front so a mismatch never leaves the table
    // half-corrected.
    for field in profile.deltas.keys() {
        if !table.contains(field) {
            return Err(GeometryError::ProfileFieldMismatch {
                profile: profile.name.clone(),
                field: field.clone(),
            });
        }
    }
    for (field, delta) in &profile.deltas {
        table.add_float(field, *delta)?;
    }
    log::debug!(
        "applied profile {} ({} fields)",
        profile.name,
        profile.deltas.len()
    );
    Ok(())
}
