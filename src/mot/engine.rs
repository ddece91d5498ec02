use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::mot::associator::Associator;
use crate::mot::config::EngineConfig;
use crate::mot::counter::{CountState, CountingAggregator};
use crate::mot::crossing::{CrossingEvaluator, CrossingEvent};
use crate::mot::detection::{Detection, DetectionFilter};
use crate::mot::mot_errors::{ConfigError, DetectorFailure};
use crate::mot::track::TrackSnapshot;
use crate::mot::track_store::TrackStore;

/// Source of raw detections for a frame of type `F`.
/// Must return an empty vector, not an error, when nothing is detected.
pub trait Detector<F> {
    type Error: std::error::Error;
    fn detect(&mut self, frame: &F) -> Result<Vec<Detection>, Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FrameStatus {
    Ok,
    /// Frame was processed as if nothing was detected
    DetectorFailed(DetectorFailure),
}

/// Everything downstream stages need to know about one processed frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameResult {
    pub frame_index: u64,
    pub timestamp: DateTime<Utc>,
    pub tracks: Vec<TrackSnapshot>,
    pub events: Vec<CrossingEvent>,
    pub counts: CountState,
    pub status: FrameStatus,
}

/// Tracks one class of objects through a frame stream and counts line crossings.
pub struct CountingEngine {
    config: EngineConfig,
    filter: DetectionFilter,
    associator: Associator,
    evaluator: CrossingEvaluator,
    store: TrackStore,
    counter: CountingAggregator,
    frame_index: u64,
}

impl CountingEngine {
    /// Creates new engine for a single stream
    ///
    /// Basic usage:
    ///
    /// ```
    /// use line_counter_rs::mot::{CountingEngine, CountingLine, EngineConfig};
    /// let line = CountingLine::vertical_center(640, 480).unwrap();
    /// let mut engine = CountingEngine::new(EngineConfig::new(line, 39)).unwrap();
    /// let result = engine.process_detections(&[], chrono::Utc::now());
    /// assert_eq!(result.counts.total(), 0);
    /// ```
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        let target_class = config.validate()?;
        let store = TrackStore::new(config.max_misses, config.velocity_smoothing)
            .with_respawn_cooldown(config.respawn_cooldown, config.iou_threshold);
        Ok(CountingEngine {
            filter: DetectionFilter::new(target_class, config.min_confidence),
            associator: Associator::new(config.iou_threshold),
            evaluator: CrossingEvaluator::new(config.line, config.orientation),
            store,
            counter: CountingAggregator::new(),
            frame_index: 0,
            config,
        })
    }
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
    /// Index the next processed frame will get
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
    pub fn counts(&self) -> CountState {
        self.counter.snapshot()
    }
    /// Shared handle to the counters, safe to poll from other threads
    pub fn counter(&self) -> CountingAggregator {
        self.counter.clone()
    }
    pub fn live_tracks(&self) -> Vec<TrackSnapshot> {
        self.store.snapshots()
    }
    /// Starts a new stream: drops tracks, zeroes counters and the frame index.
    /// Track ids keep increasing.
    pub fn reset(&mut self) {
        self.store.clear();
        self.counter.reset();
        self.frame_index = 0;
        log::info!("Counting engine reset");
    }
    /// Runs the detector on `frame` and processes its output.
    /// A detector error is reported in the result and the frame counts as empty.
    pub fn process_frame<F, D>(&mut self, detector: &mut D, frame: &F) -> FrameResult
    where
        D: Detector<F>,
    {
        let timestamp = Utc::now();
        match detector.detect(frame) {
            Ok(detections) => self.process_detections(&detections, timestamp),
            Err(err) => {
                let failure = DetectorFailure {
                    frame_index: self.frame_index,
                    message: err.to_string(),
                };
                log::warn!("{}", failure);
                let mut result = self.step(&[], timestamp);
                result.status = FrameStatus::DetectorFailed(failure);
                result
            }
        }
    }
    /// Processes detections already produced for the next frame
    pub fn process_detections(&mut self, detections: &[Detection], timestamp: DateTime<Utc>) -> FrameResult {
        let accepted = self.filter.apply(detections);
        self.step(&accepted, timestamp)
    }
    fn step(&mut self, detections: &[Detection], timestamp: DateTime<Utc>) -> FrameResult {
        let frame_index = self.frame_index;
        let association = self.associator.associate(self.store.tracks(), detections);
        let update = self.store.update(detections, &association);
        log::debug!(
            "Frame {}: {} matched, {} created, {} evicted, {} live",
            frame_index,
            association.matches.len(),
            update.created.len(),
            update.evicted.len(),
            self.store.len()
        );

        let mut events = Vec::new();
        for id in update.touched.iter() {
            if let Some(track) = self.store.get_mut(*id) {
                if let Some(event) = self.evaluator.evaluate(track, frame_index, timestamp) {
                    self.counter.record(&event);
                    events.push(event);
                }
            }
        }

        self.frame_index += 1;
        FrameResult {
            frame_index,
            timestamp,
            tracks: self.store.snapshots(),
            events,
            counts: self.counter.snapshot(),
            status: FrameStatus::Ok,
        }
    }
}
