use serde::{Deserialize, Serialize};

/// Axis-aligned box in frame pixel coordinates: top-left (x1, y1), bottom-right (x2, y2)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BBox {
    pub fn new(_x1: f32, _y1: f32, _x2: f32, _y2: f32) -> Self {
        BBox {
            x1: _x1,
            y1: _y1,
            x2: _x2,
            y2: _y2,
        }
    }
    /// Creates box from its center and size
    pub fn from_center(center: Point, width: f32, height: f32) -> Self {
        BBox {
            x1: center.x - width / 2.0,
            y1: center.y - height / 2.0,
            x2: center.x + width / 2.0,
            y2: center.y + height / 2.0,
        }
    }
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }
    pub fn area(&self) -> f32 {
        f32::max(self.width(), 0.0) * f32::max(self.height(), 0.0)
    }
    pub fn center(&self) -> Point {
        Point::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }
    /// Strictly positive width and height, finite corners
    pub fn is_valid(&self) -> bool {
        let finite = self.x1.is_finite() && self.y1.is_finite() && self.x2.is_finite() && self.y2.is_finite();
        finite && self.x1 < self.x2 && self.y1 < self.y2
    }
    /// Returns copy of the box shifted by (dx, dy)
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        BBox {
            x1: self.x1 + dx,
            y1: self.y1 + dy,
            x2: self.x2 + dx,
            y2: self.y2 + dy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(_x: f32, _y: f32) -> Self {
        Point { x: _x, y: _y }
    }
}

pub fn euclidean_distance(p1: &Point, p2: &Point) -> f32 {
    let x_squared = f32::powi(p1.x - p2.x, 2);
    let y_squared = f32::powi(p1.y - p2.y, 2);
    f32::sqrt(x_squared + y_squared)
}

/// Intersection-over-Union of two boxes. Zero when either box has no area.
pub fn iou(b1: &BBox, b2: &BBox) -> f32 {
    let ix1 = f32::max(b1.x1, b2.x1);
    let iy1 = f32::max(b1.y1, b2.y1);
    let ix2 = f32::min(b1.x2, b2.x2);
    let iy2 = f32::min(b1.y2, b2.y2);
    let intersection = f32::max(ix2 - ix1, 0.0) * f32::max(iy2 - iy1, 0.0);
    let union = b1.area() + b2.area() - intersection;
    if union <= 0.0 {
        return 0.0;
    }
    intersection / union
}

/// Z-component of (b - a) x (p - a).
/// Positive when `p` lies to the left of the directed segment a->b in a y-up frame.
pub fn cross_product(a: &Point, b: &Point, p: &Point) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}
