use serde::{Deserialize, Serialize};

use crate::mot::crossing::{CountingLine, Orientation};
use crate::mot::mot_errors::ConfigError;

fn default_max_misses() -> usize {
    30
}
fn default_iou_threshold() -> f32 {
    0.3
}
fn default_min_confidence() -> f32 {
    0.25
}
fn default_velocity_smoothing() -> f32 {
    0.5
}

/// Per-stream engine settings. Fixed once the engine is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub line: CountingLine,
    /// Only detections of this class are tracked
    #[serde(default)]
    pub target_class: Option<u32>,
    /// Consecutive frames without a match a track survives. Default is 30 (about 1s at 30fps)
    #[serde(default = "default_max_misses")]
    pub max_misses: usize,
    /// Minimum IoU between predicted box and detection. Default is 0.3
    #[serde(default = "default_iou_threshold")]
    pub iou_threshold: f32,
    /// Detections below this confidence are dropped. Default is 0.25
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,
    /// Weight of the newest displacement in the velocity estimate. Default is 0.5
    #[serde(default = "default_velocity_smoothing")]
    pub velocity_smoothing: f32,
    #[serde(default)]
    pub orientation: Orientation,
    /// Frames after an eviction during which no track is spawned over the evicted one. Default is 0 (off)
    #[serde(default)]
    pub respawn_cooldown: usize,
}

impl EngineConfig {
    /// Creates config with default tuning
    ///
    /// Basic usage:
    ///
    /// ```
    /// use line_counter_rs::mot::{CountingLine, EngineConfig};
    /// let line = CountingLine::vertical_center(640, 480).unwrap();
    /// let bottle_class = 39;
    /// let config = EngineConfig::new(line, bottle_class);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(line: CountingLine, target_class: u32) -> Self {
        EngineConfig {
            line,
            target_class: Some(target_class),
            max_misses: default_max_misses(),
            iou_threshold: default_iou_threshold(),
            min_confidence: default_min_confidence(),
            velocity_smoothing: default_velocity_smoothing(),
            orientation: Orientation::default(),
            respawn_cooldown: 0,
        }
    }
    pub fn with_max_misses(mut self, max_misses: usize) -> Self {
        self.max_misses = max_misses;
        self
    }
    pub fn with_iou_threshold(mut self, iou_threshold: f32) -> Self {
        self.iou_threshold = iou_threshold;
        self
    }
    pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence;
        self
    }
    pub fn with_velocity_smoothing(mut self, alpha: f32) -> Self {
        self.velocity_smoothing = alpha;
        self
    }
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }
    pub fn with_respawn_cooldown(mut self, frames: usize) -> Self {
        self.respawn_cooldown = frames;
        self
    }
    /// Returns the target class or the reason the config is unusable
    pub fn validate(&self) -> Result<u32, ConfigError> {
        self.line.validate()?;
        let target_class = self.target_class.ok_or(ConfigError::MissingTargetClass)?;
        if !(self.iou_threshold > 0.0 && self.iou_threshold <= 1.0) {
            return Err(ConfigError::InvalidIouThreshold(self.iou_threshold));
        }
        if !(self.velocity_smoothing > 0.0 && self.velocity_smoothing <= 1.0) {
            return Err(ConfigError::InvalidSmoothing(self.velocity_smoothing));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ConfigError::InvalidConfidence(self.min_confidence));
        }
        Ok(target_class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Point;

    fn line() -> CountingLine {
        CountingLine::vertical_center(640, 480).unwrap()
    }

    #[test]
    fn test_defaults_from_json() {
        let raw = r#"{
            "line": { "start": { "x": 320.0, "y": 0.0 }, "end": { "x": 320.0, "y": 480.0 } },
            "target_class": 39
        }"#;
        let config: EngineConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config, EngineConfig::new(line(), 39));
        assert_eq!(config.validate(), Ok(39));
    }

    #[test]
    fn test_overrides_from_json() {
        let raw = r#"{
            "line": { "start": { "x": 0.0, "y": 240.0 }, "end": { "x": 640.0, "y": 240.0 } },
            "target_class": 2,
            "max_misses": 5,
            "iou_threshold": 0.5,
            "orientation": "LeftToRightIsIn",
            "respawn_cooldown": 10
        }"#;
        let config: EngineConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.max_misses, 5);
        assert_eq!(config.iou_threshold, 0.5);
        assert_eq!(config.orientation, Orientation::LeftToRightIsIn);
        assert_eq!(config.respawn_cooldown, 10);
        assert_eq!(config.min_confidence, 0.25);
    }

    #[test]
    fn test_validation_errors() {
        let mut missing = EngineConfig::new(line(), 39);
        missing.target_class = None;
        assert_eq!(missing.validate(), Err(ConfigError::MissingTargetClass));

        let mut degenerate = EngineConfig::new(line(), 39);
        degenerate.line = CountingLine {
            start: Point::new(5.0, 5.0),
            end: Point::new(5.0, 5.0),
        };
        assert_eq!(degenerate.validate(), Err(ConfigError::DegenerateLine));

        let bad_iou = EngineConfig::new(line(), 39).with_iou_threshold(0.0);
        assert_eq!(bad_iou.validate(), Err(ConfigError::InvalidIouThreshold(0.0)));

        let bad_alpha = EngineConfig::new(line(), 39).with_velocity_smoothing(1.5);
        assert_eq!(bad_alpha.validate(), Err(ConfigError::InvalidSmoothing(1.5)));

        let bad_conf = EngineConfig::new(line(), 39).with_min_confidence(-0.1);
        assert_eq!(bad_conf.validate(), Err(ConfigError::InvalidConfidence(-0.1)));
    }
}
