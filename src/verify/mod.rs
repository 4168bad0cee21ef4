/// Face verification backends
///
/// The actual detection, embedding and same/different-person decision live
/// in an external model. This module defines the seam the rest of the app
/// talks to, so backends can be swapped without touching the similarity
/// conversion or the report.

pub mod command;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::media::loader::PixelBuffer;
use crate::state::data::VerificationResult;

pub use command::CommandVerifier;

/// Model selection passed through to the backend unchanged
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VerifierConfig {
    /// Embedding model identity (e.g., "ArcFace")
    pub model_name: String,
    /// Face detector identity (e.g., "retinaface")
    pub detector_backend: String,
    /// Fail when no face is found instead of using the whole image
    pub enforce_detection: bool,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            model_name: "ArcFace".to_string(),
            detector_backend: "retinaface".to_string(),
            enforce_detection: false,
        }
    }
}

/// Opaque failure from a verification backend, shown to the user as-is
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VerificationError {
    /// The backend could not be started at all
    #[error("cannot start verifier: {0}")]
    Spawn(String),

    /// The backend ran and reported a failure (no face found, model error, ...)
    #[error("{0}")]
    Backend(String),

    /// The backend answered with something that is not a valid result
    #[error("invalid verifier output: {0}")]
    Protocol(String),

    /// Handing the images over to the backend failed
    #[error("cannot stage images for verifier: {0}")]
    Io(String),
}

/// A capability that decides whether two images show the same person
///
/// Implementations are called from a background thread and may block.
pub trait VerificationClient: Send + Sync {
    fn verify(
        &self,
        first: &PixelBuffer,
        second: &PixelBuffer,
        config: &VerifierConfig,
    ) -> Result<VerificationResult, VerificationError>;
}

/// Reject results that break the similarity conversion's preconditions
pub fn validate(result: VerificationResult) -> Result<VerificationResult, VerificationError> {
    if !result.distance.is_finite() || result.distance < 0.0 {
        return Err(VerificationError::Protocol(format!(
            "distance must be a non-negative number, got {}",
            result.distance
        )));
    }
    if !result.threshold.is_finite() || result.threshold <= 0.0 {
        return Err(VerificationError::Protocol(format!(
            "threshold must be a positive number, got {}",
            result.threshold
        )));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(distance: f64, threshold: f64) -> VerificationResult {
        VerificationResult {
            verified: distance < threshold,
            distance,
            threshold,
        }
    }

    #[test]
    fn test_default_config() {
        let config = VerifierConfig::default();
        assert_eq!(config.model_name, "ArcFace");
        assert_eq!(config.detector_backend, "retinaface");
        assert!(!config.enforce_detection);
    }

    #[test]
    fn test_validate_accepts_normal_results() {
        assert!(validate(result(0.0, 0.68)).is_ok());
        assert!(validate(result(1.7, 0.68)).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_numbers() {
        assert!(matches!(validate(result(-0.1, 0.68)), Err(VerificationError::Protocol(_))));
        assert!(matches!(validate(result(f64::NAN, 0.68)), Err(VerificationError::Protocol(_))));
        assert!(matches!(validate(result(0.3, 0.0)), Err(VerificationError::Protocol(_))));
    }
}
