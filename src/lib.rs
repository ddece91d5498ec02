//! Multi-object tracking with line-crossing counts.
//!
//! Per frame: detections are filtered to one target class, greedily associated with
//! live tracks by IoU against each track's predicted box, tracks are updated/created/evicted,
//! and every touched track is checked against the counting line. A track is counted at
//! most once for its lifetime.
//!
//! ```
//! use line_counter_rs::mot::{CountingEngine, CountingLine, Detection, EngineConfig};
//! use line_counter_rs::utils::BBox;
//!
//! let line = CountingLine::vertical_center(640, 480).unwrap();
//! let mut engine = CountingEngine::new(EngineConfig::new(line, 39)).unwrap();
//! for step in 0..30 {
//!     let x = 100.0 + 10.0 * step as f32;
//!     let bottle = Detection::new(BBox::new(x - 20.0, 200.0, x + 20.0, 280.0), 39, 0.9);
//!     engine.process_detections(&[bottle], chrono::Utc::now());
//! }
//! assert_eq!(engine.counts().out_count, 1);
//! ```
pub mod annotate;
pub mod mot;
pub mod pipeline;
pub mod utils;
