//! Synthetic detections for tests
use crate::mot::Detection;
use crate::utils::{BBox, Point};

/// COCO class id of "bottle"
pub const TARGET_CLASS: u32 = 39;

const WIDTH: f32 = 40.0;
const HEIGHT: f32 = 80.0;

fn detection_at(cx: f32, cy: f32) -> Detection {
    Detection::new(BBox::from_center(Point::new(cx, cy), WIDTH, HEIGHT), TARGET_CLASS, 0.9)
}

/// One detection per frame moving with constant velocity
pub fn linear_trajectory(x0: f32, y0: f32, vx: f32, vy: f32, frames: usize) -> Vec<Detection> {
    (0..frames)
        .map(|i| detection_at(x0 + vx * i as f32, y0 + vy * i as f32))
        .collect()
}

/// Object jittering horizontally around `cx`, starting on the lower-x side
pub fn oscillating_trajectory(cx: f32, cy: f32, amplitude: f32, frames: usize) -> Vec<Detection> {
    (0..frames)
        .map(|i| {
            let offset = if i % 2 == 0 { -amplitude } else { amplitude };
            detection_at(cx + offset, cy)
        })
        .collect()
}
