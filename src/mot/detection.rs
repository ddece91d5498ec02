use serde::{Deserialize, Serialize};

use crate::utils::BBox;

/// Raw per-frame detection as produced by an external detector.
/// Carries no identity across frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: BBox,
    pub class_id: u32,
    pub confidence: f32,
}

impl Detection {
    /// Creates new detection
    ///
    /// Basic usage:
    ///
    /// ```
    /// use line_counter_rs::mot::Detection;
    /// use line_counter_rs::utils::BBox;
    /// let bottle = Detection::new(BBox::new(100.0, 200.0, 140.0, 280.0), 39, 0.87);
    /// assert!(bottle.is_well_formed());
    /// ```
    pub fn new(bbox: BBox, class_id: u32, confidence: f32) -> Self {
        Detection {
            bbox,
            class_id,
            confidence,
        }
    }
    /// Box has positive extent and confidence lies in [0, 1]
    pub fn is_well_formed(&self) -> bool {
        self.bbox.is_valid() && (0.0..=1.0).contains(&self.confidence)
    }
}

/// Why a detection did not reach association
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Malformed,
    OtherClass,
    LowConfidence,
}

/// Drops detections which must not take part in association.
#[derive(Debug, Clone, Copy)]
pub struct DetectionFilter {
    target_class: u32,
    min_confidence: f32,
}

impl DetectionFilter {
    pub fn new(target_class: u32, min_confidence: f32) -> Self {
        DetectionFilter {
            target_class,
            min_confidence,
        }
    }
    pub fn check(&self, detection: &Detection) -> Result<(), Rejection> {
        if !detection.is_well_formed() {
            return Err(Rejection::Malformed);
        }
        if detection.class_id != self.target_class {
            return Err(Rejection::OtherClass);
        }
        if detection.confidence < self.min_confidence {
            return Err(Rejection::LowConfidence);
        }
        Ok(())
    }
    /// Returns accepted detections, preserving their order
    pub fn apply(&self, detections: &[Detection]) -> Vec<Detection> {
        detections
            .iter()
            .filter(|detection| match self.check(detection) {
                Ok(()) => true,
                Err(reason) => {
                    log::trace!("Discarding detection {:?}: {:?}", detection, reason);
                    false
                }
            })
            .copied()
            .collect()
    }
}
