//! Coordinate-space helpers shared by the compositor and the pipeline.

use crate::geometry::{PixelRect, Point};

/// Pixel bounding box of a point set.
#[inline]
pub fn bounding_box(points: &[Point]) -> Option<PixelRect> {
    PixelRect::bounding(points)
}

/// Midpoint of the extremes of a point set (the center of its bounding box).
pub fn centroid(points: &[Point]) -> Option<Point> {
    let first = points.first()?;
    let (mut min, mut max) = (*first, *first);
    for p in &points[1..] {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    Some(Point::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0))
}

/// Translate points so that `origin` becomes (0, 0).
pub fn shift_to_local(points: &[Point], origin: Point) -> Vec<Point> {
    points.iter().map(|&p| p - origin).collect()
}

#[inline]
pub fn corner_points(rect: &PixelRect) -> [Point; 4] {
    rect.corners()
}

/// Twice the signed area of a triangle. Zero for collinear vertices.
#[inline]
pub fn signed_area2(tri: &[Point; 3]) -> f32 {
    (tri[1].x - tri[0].x) * (tri[2].y - tri[0].y) - (tri[2].x - tri[0].x) * (tri[1].y - tri[0].y)
}
