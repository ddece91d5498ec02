//! Overlay rendering of tracks, counting line and counters
mod annotator;

pub use self::annotator::*;
