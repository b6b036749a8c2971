//! Box types.
//!
//! - [`Rect`]: floating-point box as produced by a face detector, with the
//!   same TLWH/TLBR/XYWH conversions a detection box usually needs.
//! - [`PixelRect`]: integer box used to address image pixels (canvases,
//!   sub-image extraction, region checks).

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Bounding box in TLWH format.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left x coordinate
    pub x: f32,
    /// Top-left y coordinate
    pub y: f32,
    /// Width of the bounding box
    pub width: f32,
    /// Height of the bounding box
    pub height: f32,
}

impl Rect {
    /// Create a new Rect from top-left coordinates and dimensions (TLWH format).
    #[inline]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a Rect from TLBR format (top-left x, top-left y, bottom-right x, bottom-right y).
    #[inline]
    pub fn from_tlbr(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
        }
    }

    /// Create a Rect from its center and dimensions.
    #[inline]
    pub fn from_xywh(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self {
            x: cx - width / 2.0,
            y: cy - height / 2.0,
            width,
            height,
        }
    }

    /// Convert to TLBR format: (x1, y1, x2, y2).
    #[inline]
    pub fn to_tlbr(&self) -> [f32; 4] {
        [self.x, self.y, self.x + self.width, self.y + self.height]
    }

    /// Convert to TLWH format: (x, y, width, height).
    #[inline]
    pub fn to_tlwh(&self) -> [f32; 4] {
        [self.x, self.y, self.width, self.height]
    }

    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Corner points, clockwise from the top-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.x + self.width, self.y),
            Point::new(self.x + self.width, self.y + self.height),
            Point::new(self.x, self.y + self.height),
        ]
    }
}

/// Integer pixel box. `contains` is half-open: `x <= px < x + width`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    #[inline]
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The full extent of a `width` x `height` image.
    #[inline]
    pub fn of_image(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Smallest pixel box containing every point.
    ///
    /// Coordinates are floored, and the far edge is inclusive of the pixel
    /// holding the maximum, so a single point yields a 1x1 box. Returns
    /// `None` when the box cannot be addressed in `i32` pixel space.
    pub fn bounding(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        if !(min_x.is_finite() && min_y.is_finite() && max_x.is_finite() && max_y.is_finite()) {
            return None;
        }
        let (x, width) = pixel_span(min_x, max_x)?;
        let (y, height) = pixel_span(min_y, max_y)?;
        Some(Self::new(x, y, width, height))
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Overlap of two boxes, `None` when they do not overlap.
    pub fn intersect(&self, other: &PixelRect) -> Option<PixelRect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= x || bottom <= y {
            return None;
        }
        Some(PixelRect::new(
            x,
            y,
            (right - x) as u32,
            (bottom - y) as u32,
        ))
    }

    #[inline]
    pub fn origin(&self) -> Point {
        Point::new(self.x as f32, self.y as f32)
    }

    /// Corner points, clockwise from the top-left.
    pub fn corners(&self) -> [Point; 4] {
        let (l, t) = (self.x as f32, self.y as f32);
        let (r, b) = (self.right() as f32, self.bottom() as f32);
        [
            Point::new(l, t),
            Point::new(r, t),
            Point::new(r, b),
            Point::new(l, b),
        ]
    }
}

/// Floored start and pixel extent of `[min, max]`, `None` if the start,
/// the far edge or the extent leaves the `i32` range.
fn pixel_span(min: f32, max: f32) -> Option<(i32, u32)> {
    let start = min.floor() as f64;
    let end = max.floor() as f64 + 1.0;
    if start < i32::MIN as f64 || end > i32::MAX as f64 {
        return None;
    }
    let start = start as i64;
    let extent = end as i64 - start;
    let extent = i32::try_from(extent).ok()?;
    Some((i32::try_from(start).ok()?, extent as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_conversions() {
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(rect.to_tlwh(), [10.0, 20.0, 30.0, 40.0]);
        assert_eq!(rect.to_tlbr(), [10.0, 20.0, 40.0, 60.0]);
        assert_eq!(Rect::from_tlbr(10.0, 20.0, 40.0, 60.0), rect);
        assert_eq!(Rect::from_xywh(25.0, 40.0, 30.0, 40.0), rect);
        assert_eq!(rect.center(), Point::new(25.0, 40.0));
    }

    #[test]
    fn test_rect_corners() {
        let rect = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(
            rect.corners(),
            [
                Point::new(1.0, 2.0),
                Point::new(4.0, 2.0),
                Point::new(4.0, 6.0),
                Point::new(1.0, 6.0),
            ]
        );
    }

    #[test]
    fn test_pixel_rect_bounding() {
        let pts = [
            Point::new(10.2, 20.7),
            Point::new(15.9, 22.0),
            Point::new(12.0, 30.0),
        ];
        let rect = PixelRect::bounding(&pts).unwrap();
        assert_eq!(rect, PixelRect::new(10, 20, 6, 11));

        let single = PixelRect::bounding(&[Point::new(3.5, 4.5)]).unwrap();
        assert_eq!(single, PixelRect::new(3, 4, 1, 1));

        assert!(PixelRect::bounding(&[]).is_none());
    }

    #[test]
    fn test_pixel_rect_bounding_out_of_range() {
        let far = [Point::new(0.0, 0.0), Point::new(3e9, 5.0)];
        assert!(PixelRect::bounding(&far).is_none());

        let below = [Point::new(-3e9, 0.0), Point::new(1.0, 1.0)];
        assert!(PixelRect::bounding(&below).is_none());

        // Both edges in range, extent is not
        let wide = [Point::new(-2e9, 0.0), Point::new(2e9, 1.0)];
        assert!(PixelRect::bounding(&wide).is_none());

        let large = [Point::new(1e6, 1e6), Point::new(1e6 + 4.0, 1e6 + 2.0)];
        let rect = PixelRect::bounding(&large).unwrap();
        assert_eq!(rect, PixelRect::new(1_000_000, 1_000_000, 5, 3));
        assert_eq!(rect.right(), 1_000_005);
    }

    #[test]
    fn test_pixel_rect_contains_is_half_open() {
        let rect = PixelRect::of_image(100, 50);
        assert!(rect.contains(0, 0));
        assert!(rect.contains(99, 49));
        assert!(!rect.contains(100, 10));
        assert!(!rect.contains(10, 50));
        assert!(!rect.contains(-1, 10));
    }

    #[test]
    fn test_pixel_rect_intersect() {
        let a = PixelRect::new(0, 0, 10, 10);
        let b = PixelRect::new(5, 5, 10, 10);
        assert_eq!(a.intersect(&b), Some(PixelRect::new(5, 5, 5, 5)));

        let c = PixelRect::new(20, 20, 5, 5);
        assert_eq!(a.intersect(&c), None);
    }
}
