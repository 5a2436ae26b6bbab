// Analysis error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Analysis error code constants
///
/// Error code range: 1001-1003
pub struct AnalysisErrorCodes {}

impl AnalysisErrorCodes {
    /// Sample buffer, sample rate or frame geometry is unusable
    pub const INVALID_INPUT: i32 = 1001;

    /// A configuration value is outside its accepted range
    pub const INVALID_CONFIG: i32 = 1002;

    /// Audio could not be decoded into mono PCM
    pub const DECODE_FAILED: i32 = 1003;
}

/// Log an analysis error with structured context
///
/// Emits a single `log::error!` line carrying the error code, the component
/// and the caller-supplied context.
pub fn log_analysis_error(err: &AnalysisError, context: &str) {
    error!(
        "Analysis error in {}: code={}, component=FeatureExtractor, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors raised by framing, feature extraction, classification thresholds,
/// configuration validation and decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Empty sample buffer, zero sample rate, non-positive frame duration
    /// or a frame too short to hold one adjacent sample pair
    InvalidInput { reason: String },

    /// Configuration field outside its accepted range
    InvalidConfig { field: String, reason: String },

    /// Decoder failure (unreadable file, unsupported sample format)
    Decode { details: String },
}

impl AnalysisError {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        AnalysisError::InvalidInput {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_config(field: &str, reason: impl Into<String>) -> Self {
        AnalysisError::InvalidConfig {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl ErrorCode for AnalysisError {
    fn code(&self) -> i32 {
        match self {
            AnalysisError::InvalidInput { .. } => AnalysisErrorCodes::INVALID_INPUT,
            AnalysisError::InvalidConfig { .. } => AnalysisErrorCodes::INVALID_CONFIG,
            AnalysisError::Decode { .. } => AnalysisErrorCodes::DECODE_FAILED,
        }
    }

    fn message(&self) -> String {
        match self {
            AnalysisError::InvalidInput { reason } => format!("Invalid input: {}", reason),
            AnalysisError::InvalidConfig { field, reason } => {
                format!("Invalid configuration for '{}': {}", field, reason)
            }
            AnalysisError::Decode { details } => format!("Decode failed: {}", details),
        }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnalysisError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for AnalysisError {}

impl From<hound::Error> for AnalysisError {
    fn from(err: hound::Error) -> Self {
        AnalysisError::Decode {
            details: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_error_codes() {
        assert_eq!(
            AnalysisError::invalid_input("empty").code(),
            AnalysisErrorCodes::INVALID_INPUT
        );
        assert_eq!(
            AnalysisError::invalid_config("top_k", "zero").code(),
            AnalysisErrorCodes::INVALID_CONFIG
        );
        assert_eq!(
            AnalysisError::Decode {
                details: "bad header".to_string()
            }
            .code(),
            AnalysisErrorCodes::DECODE_FAILED
        );
    }

    #[test]
    fn test_analysis_error_messages() {
        let err = AnalysisError::invalid_input("sample buffer is empty");
        assert_eq!(err.message(), "Invalid input: sample buffer is empty");

        let err = AnalysisError::invalid_config("overlap_ratio", "must be below 1.0");
        assert!(err.message().contains("overlap_ratio"));
        assert!(err.message().contains("must be below 1.0"));
    }

    #[test]
    fn test_analysis_error_display() {
        let err = AnalysisError::invalid_input("zero sample rate");
        let display = format!("{}", err);
        assert!(display.contains("AnalysisError"));
        assert!(display.contains("1001"));
    }
}
