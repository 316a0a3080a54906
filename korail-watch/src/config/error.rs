//! Configuration error types.

/// Errors from loading or validating configuration.
///
/// Raised before the reservation loop starts and never retried.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A configuration file could not be read
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A configuration file could not be written
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON or has the wrong shape
    #[error("malformed {path}: {message}")]
    Malformed { path: String, message: String },

    /// A criteria record has an invalid field
    #[error("criteria[{index}].{field}: {message}")]
    InvalidField {
        index: usize,
        field: &'static str,
        message: String,
    },

    /// A criteria record is inconsistent as a whole
    #[error("criteria[{index}]: {message}")]
    InvalidRecord { index: usize, message: String },

    /// No criteria were configured
    #[error("no search criteria configured")]
    EmptyCriteria,

    /// A required setting is missing
    #[error("missing required setting: {0}")]
    MissingSetting(&'static str),

    /// A setting has an invalid value
    #[error("invalid setting {name}: {message}")]
    InvalidSetting { name: &'static str, message: String },
}
