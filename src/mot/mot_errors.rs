use serde::Serialize;
use thiserror::Error;

/// Mis-specified run. Surfaced once, at engine construction.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("counting line has zero length")]
    DegenerateLine,
    #[error("target class id is not set")]
    MissingTargetClass,
    #[error("IoU threshold must be in (0, 1], got {0}")]
    InvalidIouThreshold(f32),
    #[error("velocity smoothing factor must be in (0, 1], got {0}")]
    InvalidSmoothing(f32),
    #[error("minimum confidence must be in [0, 1], got {0}")]
    InvalidConfidence(f32),
    #[error("overlay queue capacity must be positive")]
    ZeroQueueCapacity,
}

/// Detector could not produce detections for one frame
#[derive(Debug, Error, Clone, PartialEq, Serialize)]
#[error("detector failed on frame {frame_index}: {message}")]
pub struct DetectorFailure {
    pub frame_index: u64,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(ConfigError::DegenerateLine.to_string(), "counting line has zero length");
        assert_eq!(
            ConfigError::InvalidIouThreshold(1.5).to_string(),
            "IoU threshold must be in (0, 1], got 1.5"
        );
        let failure = DetectorFailure {
            frame_index: 7,
            message: "cuda out of memory".to_string(),
        };
        assert_eq!(failure.to_string(), "detector failed on frame 7: cuda out of memory");
    }
}
