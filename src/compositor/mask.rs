//! Binary masks and masked copies.

use image::{GrayImage, Luma, RgbImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point as PixelPoint;

use crate::geometry::Point;

pub const MASK_ON: Luma<u8> = Luma([255]);

/// Fill the convex polygon `points` (rounded to pixels) into a new
/// `width` x `height` mask.
///
/// The polygon is first clipped to a one-pixel margin around the mask, so
/// vertices far outside it are harmless. Returns `None` when the clipped,
/// rounded polygon has fewer than three distinct vertices.
pub fn polygon_mask(width: u32, height: u32, points: &[Point]) -> Option<GrayImage> {
    let clipped = clip_polygon(points, width, height);
    let mut poly: Vec<PixelPoint<i32>> = Vec::with_capacity(clipped.len());
    for (x, y) in clipped {
        let px = PixelPoint::new(x.round() as i32, y.round() as i32);
        if poly.last() != Some(&px) {
            poly.push(px);
        }
    }
    while poly.len() > 1 && poly.first() == poly.last() {
        poly.pop();
    }
    if poly.len() < 3 {
        return None;
    }

    let mut mask = GrayImage::new(width, height);
    draw_polygon_mut(&mut mask, &poly, MASK_ON);
    Some(mask)
}

/// Number of set pixels.
/// Sutherland-Hodgman clip of `points` against `[-1, width] x [-1, height]`.
///
/// Runs in `f64`: intersections of far-away edges lose whole pixels in `f32`.
fn clip_polygon(points: &[Point], width: u32, height: u32) -> Vec<(f64, f64)> {
    let (lo, hi_x, hi_y) = (-1.0, width as f64, height as f64);
    let mut out: Vec<(f64, f64)> = points.iter().map(|p| (p.x as f64, p.y as f64)).collect();
    for edge in 0..4 {
        let input = std::mem::take(&mut out);
        let Some(&last) = input.last() else {
            break;
        };
        let inside = |(x, y): (f64, f64)| match edge {
            0 => x >= lo,
            1 => x <= hi_x,
            2 => y >= lo,
            _ => y <= hi_y,
        };
        // a and b lie on opposite sides of the edge, so the divisor is non-zero
        let cross = |(ax, ay): (f64, f64), (bx, by): (f64, f64)| {
            let t = match edge {
                0 => (lo - ax) / (bx - ax),
                1 => (hi_x - ax) / (bx - ax),
                2 => (lo - ay) / (by - ay),
                _ => (hi_y - ay) / (by - ay),
            };
            (ax + t * (bx - ax), ay + t * (by - ay))
        };

        let mut prev = last;
        for &p in &input {
            match (inside(prev), inside(p)) {
                (true, true) => out.push(p),
                (false, true) => {
                    out.push(cross(prev, p));
                    out.push(p);
                }
                (true, false) => out.push(cross(prev, p)),
                (false, false) => {}
            }
            prev = p;
        }
    }
    out
}

pub fn mask_area(mask: &GrayImage) -> usize {
    mask.pixels().filter(|p| p[0] > 0).count()
}

/// Copy pixels of `src` where `mask` is set into `dst` at offset
/// (`x`, `y`). Pixels landing outside `dst` are clipped.
pub fn copy_masked(src: &RgbImage, mask: &GrayImage, dst: &mut RgbImage, x: i32, y: i32) {
    let width = src.width().min(mask.width());
    let height = src.height().min(mask.height());
    for my in 0..height {
        let dy = y + my as i32;
        if dy < 0 || dy >= dst.height() as i32 {
            continue;
        }
        for mx in 0..width {
            let dx = x + mx as i32;
            if dx < 0 || dx >= dst.width() as i32 {
                continue;
            }
            if mask.get_pixel(mx, my)[0] > 0 {
                dst.put_pixel(dx as u32, dy as u32, *src.get_pixel(mx, my));
            }
        }
    }
}
