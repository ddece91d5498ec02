use serde::{Deserialize, Serialize};

use crate::mot::crossing::Side;
use crate::utils::{BBox, Point};

/// Stable track identifier. Allocated from 1 upwards, never reused.
pub type TrackId = u64;

/// Object followed across frames. Owned by the `TrackStore`.
#[derive(Debug, Clone)]
pub struct Track {
    id: TrackId,
    bbox: BBox,
    centroid: Point,
    // Centroid displacement per frame, exponentially smoothed
    velocity: Point,
    age: usize,
    misses: usize,
    side: Side,
    counted: bool,
    trail: Vec<Point>,
    max_trail_len: usize,
}

impl Track {
    pub fn new(id: TrackId, bbox: BBox) -> Self {
        let centroid = bbox.center();
        let mut trail = Vec::with_capacity(30);
        trail.push(centroid);
        Track {
            id,
            bbox,
            centroid,
            velocity: Point::default(),
            age: 0,
            misses: 0,
            side: Side::Unknown,
            counted: false,
            trail,
            max_trail_len: 30,
        }
    }
    pub fn get_id(&self) -> TrackId {
        self.id
    }
    pub fn get_bbox(&self) -> BBox {
        self.bbox
    }
    pub fn get_centroid(&self) -> Point {
        self.centroid
    }
    pub fn get_velocity(&self) -> Point {
        self.velocity
    }
    pub fn get_age(&self) -> usize {
        self.age
    }
    pub fn get_misses(&self) -> usize {
        self.misses
    }
    pub fn get_side(&self) -> Side {
        self.side
    }
    pub fn set_side(&mut self, side: Side) {
        self.side = side
    }
    pub fn is_counted(&self) -> bool {
        self.counted
    }
    pub fn mark_counted(&mut self) {
        self.counted = true
    }
    pub fn get_trail(&self) -> &[Point] {
        &self.trail
    }
    pub fn inc_misses(&mut self) {
        self.misses += 1;
        self.age += 1;
    }
    /// Box expected at the next frame: last box moved by velocity for every frame
    /// elapsed since the last match.
    pub fn predicted_bbox(&self) -> BBox {
        let steps = (self.misses + 1) as f32;
        self.bbox
            .translated(self.velocity.x * steps, self.velocity.y * steps)
    }
    /// Applies matched measurement.
    /// `alpha` weights the newest displacement against the running velocity.
    pub fn update(&mut self, bbox: BBox, alpha: f32) {
        let new_centroid = bbox.center();
        // Displacement accumulated over coasted frames is spread evenly over them
        let steps = (self.misses + 1) as f32;
        let raw_vx = (new_centroid.x - self.centroid.x) / steps;
        let raw_vy = (new_centroid.y - self.centroid.y) / steps;
        self.velocity = Point::new(
            alpha * raw_vx + (1.0 - alpha) * self.velocity.x,
            alpha * raw_vy + (1.0 - alpha) * self.velocity.y,
        );
        self.bbox = bbox;
        self.centroid = new_centroid;
        self.misses = 0;
        self.age += 1;

        self.trail.push(new_centroid);
        if self.trail.len() > self.max_trail_len {
            self.trail.remove(0);
        }
    }
    pub fn snapshot(&self) -> TrackSnapshot {
        TrackSnapshot {
            id: self.id,
            bbox: self.bbox,
            centroid: self.centroid,
            velocity: self.velocity,
            age: self.age,
            misses: self.misses,
            side: self.side,
            counted: self.counted,
            trail: self.trail.clone(),
        }
    }
}

/// Immutable copy of a track handed to downstream stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSnapshot {
    pub id: TrackId,
    pub bbox: BBox,
    pub centroid: Point,
    pub velocity: Point,
    pub age: usize,
    pub misses: usize,
    pub side: Side,
    pub counted: bool,
    pub trail: Vec<Point>,
}
