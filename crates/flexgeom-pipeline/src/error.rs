use thiserror::Error;

/// Errors produced while deriving acquisition geometry from a settings file.
///
/// All failures are local and synchronous; a malformed settings file or a
/// mis-keyed profile is a data problem the caller must fix, so nothing is
/// retried or recovered internally and no partial geometry is ever returned.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing required field `{0}` in settings")]
    MissingField(String),

    #[error("malformed value for field `{field}`: {raw:?}")]
    MalformedValue { field: String, raw: String },

    #[error("invalid value for field `{field}`: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("unknown calibration profile `{0}`")]
    UnknownProfile(String),

    #[error("profile `{profile}` corrects field `{field}` which is not in the parameter table")]
    ProfileFieldMismatch { profile: String, field: String },
}
