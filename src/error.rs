use thiserror::Error;

/// Everything that can go wrong between receiving bytes and producing a ratio.
///
/// None of these are fatal to the process; the caller turns them into a
/// structured error response.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no image data supplied")]
    EmptyInput,

    #[error("could not decode image (tried: {})", attempts.join(", "))]
    Decode { attempts: Vec<String> },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to write debug output: {0}")]
    DebugOutput(String),
}

impl AnalysisError {
    /// Stable machine-readable name used in JSON reports.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::EmptyInput => "empty_input",
            AnalysisError::Decode { .. } => "decode_error",
            AnalysisError::InvalidConfig(_) => "invalid_config",
            AnalysisError::DebugOutput(_) => "debug_output",
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
