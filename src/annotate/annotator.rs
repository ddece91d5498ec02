use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut,
    draw_text_mut, text_size,
};
use imageproc::rect::Rect;
use std::sync::Once;

use crate::mot::{CountState, CountingLine, FrameResult, TrackSnapshot};
use crate::utils::Point;

static NO_FONT: Once = Once::new();

/// Colors and switches for the overlay
#[derive(Debug, Clone)]
pub struct AnnotatorStyle {
    pub line_color: Rgb<u8>,
    pub box_color: Rgb<u8>,
    pub counted_box_color: Rgb<u8>,
    pub centroid_color: Rgb<u8>,
    pub text_color: Rgb<u8>,
    pub label_background: Rgb<u8>,
    /// Thickness of the counting line and boxes in pixels. Default is 2
    pub line_width: u32,
    /// Radius of the dot drawn at each centroid. Default is 6
    pub centroid_radius: i32,
    pub font_scale: f32,
    pub show_in: bool,
    pub show_out: bool,
    pub show_ids: bool,
    pub show_trails: bool,
}

impl Default for AnnotatorStyle {
    fn default() -> Self {
        AnnotatorStyle {
            line_color: Rgb([255, 0, 255]),
            box_color: Rgb([0, 255, 0]),
            counted_box_color: Rgb([255, 200, 0]),
            centroid_color: Rgb([255, 0, 0]),
            text_color: Rgb([255, 255, 255]),
            label_background: Rgb([0, 0, 0]),
            line_width: 2,
            centroid_radius: 6,
            font_scale: 20.0,
            show_in: true,
            show_out: true,
            show_ids: true,
            show_trails: false,
        }
    }
}

/// Draws engine output over a frame. Reads the `FrameResult` only.
#[derive(Clone)]
pub struct Annotator {
    line: CountingLine,
    style: AnnotatorStyle,
    // Text is skipped without a font
    font: Option<FontArc>,
}

impl Annotator {
    pub fn new(line: CountingLine, style: AnnotatorStyle) -> Self {
        Annotator {
            line,
            style,
            font: None,
        }
    }
    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }
    pub fn style(&self) -> &AnnotatorStyle {
        &self.style
    }
    /// Running counter text honoring `show_in` / `show_out`
    pub fn count_label(&self, counts: &CountState) -> Option<String> {
        match (self.style.show_in, self.style.show_out) {
            (true, true) => Some(counts.label()),
            (true, false) => Some(format!("IN: {}", counts.in_count)),
            (false, true) => Some(format!("OUT: {}", counts.out_count)),
            (false, false) => None,
        }
    }
    pub fn render(&self, image: &mut RgbImage, result: &FrameResult) {
        if self.font.is_none() {
            NO_FONT.call_once(|| log::debug!("Annotator has no font, counter and id labels are not drawn"));
        }
        self.draw_line(image);
        for track in result.tracks.iter() {
            self.draw_track(image, track);
        }
        if let Some(label) = self.count_label(&result.counts) {
            self.draw_label(image, 10, 10, &label);
        }
    }
    fn draw_line(&self, image: &mut RgbImage) {
        let (start, end) = (self.line.start, self.line.end);
        let length = crate::utils::euclidean_distance(&start, &end);
        if length <= 0.0 {
            return;
        }
        // Unit normal used to thicken the segment
        let (nx, ny) = (-(end.y - start.y) / length, (end.x - start.x) / length);
        for offset in thickness_offsets(self.style.line_width) {
            let (dx, dy) = (nx * offset, ny * offset);
            draw_line_segment_mut(
                image,
                (start.x + dx, start.y + dy),
                (end.x + dx, end.y + dy),
                self.style.line_color,
            );
        }
    }
    fn draw_track(&self, image: &mut RgbImage, track: &TrackSnapshot) {
        let color = if track.counted {
            self.style.counted_box_color
        } else {
            self.style.box_color
        };
        let x = track.bbox.x1.round() as i32;
        let y = track.bbox.y1.round() as i32;
        let width = track.bbox.width().round().max(1.0) as u32;
        let height = track.bbox.height().round().max(1.0) as u32;
        for inset in 0..self.style.line_width.max(1) {
            if width <= 2 * inset || height <= 2 * inset {
                break;
            }
            let rect = Rect::at(x + inset as i32, y + inset as i32).of_size(width - 2 * inset, height - 2 * inset);
            draw_hollow_rect_mut(image, rect, color);
        }
        if self.style.show_trails {
            for pair in track.trail.windows(2) {
                draw_line_segment_mut(image, as_tuple(&pair[0]), as_tuple(&pair[1]), color);
            }
        }
        draw_filled_circle_mut(
            image,
            (track.centroid.x.round() as i32, track.centroid.y.round() as i32),
            self.style.centroid_radius,
            self.style.centroid_color,
        );
        if self.style.show_ids {
            let text_y = y - self.style.font_scale.ceil() as i32 - 2;
            self.draw_label(image, x, text_y.max(0), &format!("#{}", track.id));
        }
    }
    fn draw_label(&self, image: &mut RgbImage, x: i32, y: i32, text: &str) {
        let font = match &self.font {
            Some(font) => font,
            None => return,
        };
        let scale = PxScale::from(self.style.font_scale);
        let (text_width, text_height) = text_size(scale, font, text);
        if text_width > 0 && text_height > 0 {
            let background = Rect::at(x - 2, y - 2).of_size(text_width + 4, text_height + 4);
            draw_filled_rect_mut(image, background, self.style.label_background);
        }
        draw_text_mut(image, self.style.text_color, x, y, scale, font, text);
    }
}

fn as_tuple(point: &Point) -> (f32, f32) {
    (point.x, point.y)
}

// Offsets (in pixels) of the parallel segments making up a thick line, centered on zero
fn thickness_offsets(width: u32) -> Vec<f32> {
    let width = width.max(1);
    let half = (width - 1) as f32 / 2.0;
    (0..width).map(|i| i as f32 - half).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mot::{FrameStatus, Side};
    use crate::utils::BBox;
    use chrono::Utc;

    fn result_with_track(counted: bool) -> FrameResult {
        let bbox = BBox::new(100.0, 100.0, 140.0, 180.0);
        FrameResult {
            frame_index: 0,
            timestamp: Utc::now(),
            tracks: vec![TrackSnapshot {
                id: 1,
                bbox,
                centroid: bbox.center(),
                velocity: Point::default(),
                age: 3,
                misses: 0,
                side: Side::Left,
                counted,
                trail: vec![bbox.center()],
            }],
            events: vec![],
            counts: CountState { in_count: 2, out_count: 5 },
            status: FrameStatus::Ok,
        }
    }

    #[test]
    fn test_render_primitives() {
        let line = CountingLine::vertical_center(640, 480).unwrap();
        let style = AnnotatorStyle::default();
        let annotator = Annotator::new(line, style.clone());
        let mut image = RgbImage::new(640, 480);
        let result = result_with_track(false);
        annotator.render(&mut image, &result);

        let line_pixels = (318..=322)
            .filter(|x| *image.get_pixel(*x, 240) == style.line_color)
            .count();
        assert!(line_pixels >= 1 && line_pixels <= 3, "line drawn {} px wide", line_pixels);
        assert_eq!(*image.get_pixel(100, 140), style.box_color);
        assert_eq!(*image.get_pixel(120, 140), style.centroid_color);
        // Untouched background
        assert_eq!(*image.get_pixel(500, 400), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_counted_track_color() {
        let line = CountingLine::vertical_center(640, 480).unwrap();
        let style = AnnotatorStyle::default();
        let annotator = Annotator::new(line, style.clone());
        let mut image = RgbImage::new(640, 480);
        annotator.render(&mut image, &result_with_track(true));
        assert_eq!(*image.get_pixel(100, 140), style.counted_box_color);
    }

    #[test]
    fn test_count_label() {
        let line = CountingLine::vertical_center(640, 480).unwrap();
        let counts = CountState { in_count: 2, out_count: 5 };
        let both = Annotator::new(line, AnnotatorStyle::default());
        assert_eq!(both.count_label(&counts), Some("IN: 2  OUT: 5".to_string()));
        let only_out = Annotator::new(
            line,
            AnnotatorStyle {
                show_in: false,
                ..AnnotatorStyle::default()
            },
        );
        assert_eq!(only_out.count_label(&counts), Some("OUT: 5".to_string()));
        let hidden = Annotator::new(
            line,
            AnnotatorStyle {
                show_in: false,
                show_out: false,
                ..AnnotatorStyle::default()
            },
        );
        assert_eq!(hidden.count_label(&counts), None);
    }

    fn lit_pixels(image: &RgbImage, xs: std::ops::Range<u32>, ys: std::ops::Range<u32>) -> usize {
        let mut count = 0;
        for y in ys {
            for x in xs.clone() {
                if *image.get_pixel(x, y) != Rgb([0, 0, 0]) {
                    count += 1;
                }
            }
        }
        count
    }

    #[test]
    fn test_labels_need_font() {
        let line = CountingLine::vertical_center(640, 480).unwrap();
        let result = result_with_track(false);

        let mut plain = RgbImage::new(640, 480);
        Annotator::new(line, AnnotatorStyle::default()).render(&mut plain, &result);
        assert_eq!(lit_pixels(&plain, 10..200, 10..40), 0);

        let font = FontArc::try_from_slice(include_bytes!("../../assets/fonts/DejaVuSans.ttf")).unwrap();
        let annotator = Annotator::new(line, AnnotatorStyle::default()).with_font(font);
        let mut labeled = RgbImage::new(640, 480);
        annotator.render(&mut labeled, &result);
        // Counter in the top-left corner
        assert!(lit_pixels(&labeled, 10..200, 10..40) > 0);
        // Track id above its box
        assert!(lit_pixels(&labeled, 100..140, 78..98) > 0);
        assert_eq!(lit_pixels(&plain, 100..140, 78..98), 0);
    }

    #[test]
    fn test_thickness_offsets() {
        assert_eq!(thickness_offsets(1), vec![0.0]);
        assert_eq!(thickness_offsets(2), vec![-0.5, 0.5]);
        assert_eq!(thickness_offsets(3), vec![-1.0, 0.0, 1.0]);
    }
}
