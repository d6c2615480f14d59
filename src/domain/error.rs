//! Domain error types.

/// Top-level error type for matrader.
#[derive(Debug, thiserror::Error)]
pub enum MatraderError {
    #[error("invalid configuration: {reason}")]
    Configuration { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("insufficient data: have {have} observations, need {minimum}")]
    InsufficientData { have: usize, minimum: usize },

    #[error("{parameter} must be positive, got {value}")]
    Domain {
        parameter: &'static str,
        value: f64,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&MatraderError> for std::process::ExitCode {
    fn from(err: &MatraderError) -> Self {
        let code: u8 = match err {
            MatraderError::Io(_) => 1,
            MatraderError::ConfigParse { .. }
            | MatraderError::ConfigMissing { .. }
            | MatraderError::ConfigInvalid { .. } => 2,
            MatraderError::Data { .. } => 3,
            MatraderError::Configuration { .. } => 4,
            MatraderError::InsufficientData { .. } => 5,
            MatraderError::Domain { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
