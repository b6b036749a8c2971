use imageproc::geometry::convex_hull;
use imageproc::point::Point as PixelPoint;

use crate::geometry::Point;

/// Pixel coordinates are clamped to this magnitude so `convex_hull`'s `i32`
/// orientation products stay in range.
const COORD_LIMIT: i32 = 16_000;

/// Convex hull of a landmark set, as indices into `points`.
///
/// The hull is computed over the rounded pixel positions, so coincident
/// landmarks collapse onto the lowest index carrying that pixel. Points more
/// than `COORD_LIMIT` pixels from the origin are pulled onto that limit.
pub fn hull_indices(points: &[Point]) -> Vec<usize> {
    if points.is_empty() {
        return Vec::new();
    }
    let pixels: Vec<PixelPoint<i32>> = points
        .iter()
        .map(|p| {
            let (x, y) = p.to_pixel();
            PixelPoint::new(
                x.clamp(-COORD_LIMIT, COORD_LIMIT),
                y.clamp(-COORD_LIMIT, COORD_LIMIT),
            )
        })
        .collect();

    convex_hull(pixels.as_slice())
        .into_iter()
        .filter_map(|h| pixels.iter().position(|p| *p == h))
        .collect()
}
