use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::mot::mot_errors::ConfigError;
use crate::mot::track::{Track, TrackId};
use crate::utils::{cross_product, euclidean_distance, Point};

/// Side of the counting line a track was last seen on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Not evaluated yet
    Unknown,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    In,
    Out,
}

/// Which side change counts as "out"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    /// LEFT -> RIGHT is OUT, RIGHT -> LEFT is IN
    #[default]
    LeftToRightIsOut,
    /// LEFT -> RIGHT is IN, RIGHT -> LEFT is OUT
    LeftToRightIsIn,
}

impl Orientation {
    pub fn direction(&self, from: Side, to: Side) -> Option<Direction> {
        let left_to_right = match (from, to) {
            (Side::Left, Side::Right) => true,
            (Side::Right, Side::Left) => false,
            _ => return None,
        };
        let direction = match (self, left_to_right) {
            (Orientation::LeftToRightIsOut, true) | (Orientation::LeftToRightIsIn, false) => Direction::Out,
            _ => Direction::In,
        };
        Some(direction)
    }
}

/// Directed counting line.
/// "Left" is the side where (end - start) x (p - start) is positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CountingLine {
    pub start: Point,
    pub end: Point,
}

impl CountingLine {
    /// Creates new counting line
    ///
    /// Basic usage:
    ///
    /// ```
    /// use line_counter_rs::mot::{CountingLine, Side};
    /// use line_counter_rs::utils::Point;
    /// let line = CountingLine::new(Point::new(320.0, 0.0), Point::new(320.0, 480.0)).unwrap();
    /// assert_eq!(line.side_of(&Point::new(100.0, 240.0)), Some(Side::Left));
    /// ```
    pub fn new(start: Point, end: Point) -> Result<Self, ConfigError> {
        let line = CountingLine { start, end };
        line.validate()?;
        Ok(line)
    }
    /// Vertical line splitting the frame into two halves, from top to bottom
    pub fn vertical_center(width: u32, height: u32) -> Result<Self, ConfigError> {
        let x = (width / 2) as f32;
        CountingLine::new(Point::new(x, 0.0), Point::new(x, height as f32))
    }
    pub fn validate(&self) -> Result<(), ConfigError> {
        let length = euclidean_distance(&self.start, &self.end);
        if !length.is_finite() || length <= 0.0 {
            return Err(ConfigError::DegenerateLine);
        }
        Ok(())
    }
    /// Returns `None` for points lying exactly on the line
    pub fn side_of(&self, point: &Point) -> Option<Side> {
        let cross = cross_product(&self.start, &self.end, point);
        if cross > 0.0 {
            Some(Side::Left)
        } else if cross < 0.0 {
            Some(Side::Right)
        } else {
            None
        }
    }
}

/// One-time signal that a track passed from one side of the line to the other
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossingEvent {
    pub track_id: TrackId,
    pub direction: Direction,
    pub frame_index: u64,
    pub timestamp: DateTime<Utc>,
}

/// Compares the side of a track's current centroid with the side recorded on its
/// previous evaluation. A track yields at most one event over its lifetime.
#[derive(Debug, Clone)]
pub struct CrossingEvaluator {
    line: CountingLine,
    orientation: Orientation,
}

impl CrossingEvaluator {
    pub fn new(line: CountingLine, orientation: Orientation) -> Self {
        CrossingEvaluator { line, orientation }
    }
    pub fn line(&self) -> &CountingLine {
        &self.line
    }
    pub fn evaluate(
        &self,
        track: &mut Track,
        frame_index: u64,
        timestamp: DateTime<Utc>,
    ) -> Option<CrossingEvent> {
        // Exactly on the line: nothing observed
        let new_side = self.line.side_of(&track.get_centroid())?;
        let old_side = track.get_side();
        if old_side == Side::Unknown {
            track.set_side(new_side);
            return None;
        }
        if old_side == new_side {
            return None;
        }
        track.set_side(new_side);
        if track.is_counted() {
            return None;
        }
        let direction = self.orientation.direction(old_side, new_side)?;
        track.mark_counted();
        log::info!(
            "Track {} crossed the line ({:?}) on frame {}",
            track.get_id(),
            direction,
            frame_index
        );
        Some(CrossingEvent {
            track_id: track.get_id(),
            direction,
            frame_index,
            timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::BBox;

    fn vertical_line() -> CountingLine {
        CountingLine::new(Point::new(320.0, 0.0), Point::new(320.0, 480.0)).unwrap()
    }

    fn bbox_at(cx: f32) -> BBox {
        BBox::from_center(Point::new(cx, 240.0), 40.0, 80.0)
    }

    #[test]
    fn test_degenerate_line() {
        let p = Point::new(10.0, 10.0);
        assert_eq!(CountingLine::new(p, p), Err(ConfigError::DegenerateLine));
        assert!(CountingLine::vertical_center(640, 0).is_err());
        let line = CountingLine::vertical_center(640, 480).unwrap();
        assert_eq!(line.start, Point::new(320.0, 0.0));
        assert_eq!(line.end, Point::new(320.0, 480.0));
    }

    #[test]
    fn test_side_of() {
        let line = vertical_line();
        assert_eq!(line.side_of(&Point::new(100.0, 10.0)), Some(Side::Left));
        assert_eq!(line.side_of(&Point::new(500.0, 10.0)), Some(Side::Right));
        assert_eq!(line.side_of(&Point::new(320.0, 10.0)), None);
    }

    #[test]
    fn test_orientation() {
        let out = Orientation::LeftToRightIsOut;
        assert_eq!(out.direction(Side::Left, Side::Right), Some(Direction::Out));
        assert_eq!(out.direction(Side::Right, Side::Left), Some(Direction::In));
        let inward = Orientation::LeftToRightIsIn;
        assert_eq!(inward.direction(Side::Left, Side::Right), Some(Direction::In));
        assert_eq!(inward.direction(Side::Right, Side::Left), Some(Direction::Out));
        assert_eq!(out.direction(Side::Unknown, Side::Left), None);
        assert_eq!(out.direction(Side::Left, Side::Left), None);
    }

    #[test]
    fn test_baseline_then_crossing() {
        let evaluator = CrossingEvaluator::new(vertical_line(), Orientation::default());
        let now = Utc::now();
        let mut track = Track::new(1, bbox_at(300.0));
        assert_eq!(evaluator.evaluate(&mut track, 0, now), None);
        assert_eq!(track.get_side(), Side::Left);

        track.update(bbox_at(310.0), 0.5);
        assert_eq!(evaluator.evaluate(&mut track, 1, now), None);

        track.update(bbox_at(330.0), 0.5);
        let event = evaluator.evaluate(&mut track, 2, now).unwrap();
        assert_eq!(event.track_id, 1);
        assert_eq!(event.direction, Direction::Out);
        assert_eq!(event.frame_index, 2);
        assert!(track.is_counted());
        assert_eq!(track.get_side(), Side::Right);
    }

    #[test]
    fn test_oscillation_counts_once() {
        let evaluator = CrossingEvaluator::new(vertical_line(), Orientation::default());
        let now = Utc::now();
        let mut track = Track::new(7, bbox_at(315.0));
        evaluator.evaluate(&mut track, 0, now);
        let mut events = 0;
        for frame in 1..50u64 {
            let cx = if frame % 2 == 0 { 315.0 } else { 325.0 };
            track.update(bbox_at(cx), 0.5);
            if evaluator.evaluate(&mut track, frame, now).is_some() {
                events += 1;
            }
        }
        assert_eq!(events, 1);
    }

    #[test]
    fn test_on_line_is_not_an_observation() {
        let evaluator = CrossingEvaluator::new(vertical_line(), Orientation::default());
        let now = Utc::now();
        let mut track = Track::new(3, bbox_at(320.0));
        assert_eq!(evaluator.evaluate(&mut track, 0, now), None);
        assert_eq!(track.get_side(), Side::Unknown);

        track.update(bbox_at(340.0), 0.5);
        assert_eq!(evaluator.evaluate(&mut track, 1, now), None);
        assert_eq!(track.get_side(), Side::Right);

        track.update(bbox_at(320.0), 0.5);
        assert_eq!(evaluator.evaluate(&mut track, 2, now), None);
        assert_eq!(track.get_side(), Side::Right);

        track.update(bbox_at(300.0), 0.5);
        let event = evaluator.evaluate(&mut track, 3, now).unwrap();
        assert_eq!(event.direction, Direction::In);
    }

    #[test]
    fn test_parallel_motion_never_counts() {
        let evaluator = CrossingEvaluator::new(vertical_line(), Orientation::default());
        let now = Utc::now();
        let mut track = Track::new(4, BBox::from_center(Point::new(100.0, 0.0), 20.0, 20.0));
        evaluator.evaluate(&mut track, 0, now);
        for frame in 1..200u64 {
            let y = frame as f32 * 2.0;
            track.update(BBox::from_center(Point::new(100.0, y), 20.0, 20.0), 0.5);
            assert_eq!(evaluator.evaluate(&mut track, frame, now), None);
        }
        assert!(!track.is_counted());
    }
}
