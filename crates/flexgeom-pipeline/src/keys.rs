//! Canonical parameter-table keys.
//!
//! Both settings-file dialects map their own field labels onto this one set
//! of keys, so the ROI corrector, profile applier and geometry builder are
//! dialect-agnostic. Calibration profiles are keyed by the same names.

/// Source-to-object distance (mm).
pub const SOD: &str = "sod";
/// Source-to-detector distance (mm).
pub const SDD: &str = "sdd";
/// Object-to-detector distance (mm), derived as `sdd - sod` at parse time.
pub const ODD: &str = "odd";

/// Vertical tube (source) position (mm).
pub const VER_TUBE: &str = "ver_tube";
/// Lateral tube (source) position (mm).
pub const TRA_TUBE: &str = "tra_tube";
/// Vertical detector position (mm).
pub const VER_DET: &str = "ver_det";
/// Lateral detector position (mm).
pub const TRA_DET: &str = "tra_det";
/// Lateral object position (mm).
pub const TRA_OBJ: &str = "tra_obj";

/// Detector region of interest, unbinned pixels (left, top, right, bottom).
pub const ROI: &str = "roi";
/// Detector binning factor.
pub const BINNING: &str = "binning";
/// Binned detector pixel size (mm).
pub const PIXEL_SIZE: &str = "pixel_size";
/// Detector roll angle (degrees), pre-seeded to 0.
pub const ROLL_DET: &str = "roll_det";

/// First projection angle (degrees).
pub const START_ANGLE: &str = "start_angle";
/// Last projection angle (degrees).
pub const LAST_ANGLE: &str = "last_angle";
/// Total number of projections.
pub const PROJ_COUNT: &str = "proj_count";
/// Reconstruction voxel size (mm after unit normalization).
pub const VOXEL_SIZE: &str = "voxel_size";
