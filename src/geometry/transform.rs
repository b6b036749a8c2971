//! Affine and perspective solvers.
//!
//! Both solve in `f64` with nalgebra and hand out row-major 3x3 matrices
//! that convert directly into an `imageproc` projection for warping.

use imageproc::geometric_transformations::Projection;
use nalgebra::{DMatrix, DVector, Matrix3, Vector3};

use crate::geometry::Point;

/// Determinant magnitude below which three correspondences are treated as collinear.
const DEGENERATE_EPS: f64 = 1e-6;

/// Ratio of smallest to largest singular value below which a homography
/// system is treated as rank deficient.
const RANK_EPS: f64 = 1e-9;

/// 2x3 affine map `[a b c; d e f]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    m: [f64; 6],
}

impl AffineTransform {
    pub fn identity() -> Self {
        Self {
            m: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        }
    }

    /// The unique affine map taking each `src[i]` to `dst[i]`.
    ///
    /// Returns `None` when the source triangle is degenerate (collinear or
    /// coincident vertices).
    pub fn from_triangles(src: &[Point; 3], dst: &[Point; 3]) -> Option<Self> {
        #[rustfmt::skip]
        let m = Matrix3::new(
            src[0].x as f64, src[0].y as f64, 1.0,
            src[1].x as f64, src[1].y as f64, 1.0,
            src[2].x as f64, src[2].y as f64, 1.0,
        );
        if m.determinant().abs() < DEGENERATE_EPS {
            return None;
        }

        let lu = m.lu();
        let dx = Vector3::new(dst[0].x as f64, dst[1].x as f64, dst[2].x as f64);
        let dy = Vector3::new(dst[0].y as f64, dst[1].y as f64, dst[2].y as f64);
        let xs = lu.solve(&dx)?;
        let ys = lu.solve(&dy)?;

        let m = [xs[0], xs[1], xs[2], ys[0], ys[1], ys[2]];
        m.iter().all(|v| v.is_finite()).then_some(Self { m })
    }

    pub fn transform_point(&self, p: Point) -> Point {
        let (x, y) = (p.x as f64, p.y as f64);
        Point::new(
            (self.m[0] * x + self.m[1] * y + self.m[2]) as f32,
            (self.m[3] * x + self.m[4] * y + self.m[5]) as f32,
        )
    }

    /// Row-major 3x3 form.
    pub fn to_matrix(&self) -> [f64; 9] {
        let m = &self.m;
        [m[0], m[1], m[2], m[3], m[4], m[5], 0.0, 0.0, 1.0]
    }

    /// Projection mapping source coordinates to destination coordinates.
    pub fn to_projection(&self) -> Option<Projection> {
        projection_from(&self.to_matrix())
    }
}

/// 3x3 perspective map, normalised so that `h[8] == 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography {
    h: [f64; 9],
}

impl Homography {
    /// Least-squares homography from at least four correspondences.
    ///
    /// Points are conditioned (centred, scaled to mean distance sqrt(2))
    /// before solving. Returns `None` for mismatched or too few
    /// correspondences and for rank-deficient layouts such as three
    /// collinear points out of four.
    pub fn from_correspondences(src: &[Point], dst: &[Point]) -> Option<Self> {
        if src.len() != dst.len() || src.len() < 4 {
            return None;
        }

        let ts = conditioning(src)?;
        let td = conditioning(dst)?;

        let n = src.len();
        let mut a = DMatrix::<f64>::zeros(2 * n, 8);
        let mut b = DVector::<f64>::zeros(2 * n);
        for (i, (s, d)) in src.iter().zip(dst).enumerate() {
            let s = apply(&ts, s.x as f64, s.y as f64);
            let d = apply(&td, d.x as f64, d.y as f64);
            let (x, y, u, v) = (s.0, s.1, d.0, d.1);

            let r = 2 * i;
            a[(r, 0)] = x;
            a[(r, 1)] = y;
            a[(r, 2)] = 1.0;
            a[(r, 6)] = -u * x;
            a[(r, 7)] = -u * y;
            b[r] = u;

            a[(r + 1, 3)] = x;
            a[(r + 1, 4)] = y;
            a[(r + 1, 5)] = 1.0;
            a[(r + 1, 6)] = -v * x;
            a[(r + 1, 7)] = -v * y;
            b[r + 1] = v;
        }

        let svd = a.svd(true, true);
        let max_sv = svd.singular_values.max();
        if max_sv <= 0.0 || svd.singular_values.min() < RANK_EPS * max_sv {
            return None;
        }
        let sol = svd.solve(&b, RANK_EPS * max_sv).ok()?;

        #[rustfmt::skip]
        let hn = Matrix3::new(
            sol[0], sol[1], sol[2],
            sol[3], sol[4], sol[5],
            sol[6], sol[7], 1.0,
        );
        let h = td.try_inverse()? * hn * ts;
        let scale = h[(2, 2)];
        if scale.abs() < DEGENERATE_EPS {
            return None;
        }
        let h = h / scale;

        let mut out = [0.0; 9];
        for r in 0..3 {
            for c in 0..3 {
                out[r * 3 + c] = h[(r, c)];
            }
        }
        out.iter().all(|v| v.is_finite()).then_some(Self { h: out })
    }

    pub fn transform_point(&self, p: Point) -> Option<Point> {
        let h = &self.h;
        let (x, y) = (p.x as f64, p.y as f64);
        let w = h[6] * x + h[7] * y + h[8];
        if w.abs() < f64::EPSILON {
            return None;
        }
        Some(Point::new(
            ((h[0] * x + h[1] * y + h[2]) / w) as f32,
            ((h[3] * x + h[4] * y + h[5]) / w) as f32,
        ))
    }

    pub fn to_matrix(&self) -> [f64; 9] {
        self.h
    }

    pub fn to_projection(&self) -> Option<Projection> {
        projection_from(&self.h)
    }
}

fn projection_from(m: &[f64; 9]) -> Option<Projection> {
    let mut f = [0f32; 9];
    for (dst, src) in f.iter_mut().zip(m) {
        *dst = *src as f32;
    }
    Projection::from_matrix(f)
}

/// Similarity that centres `points` and scales their mean distance to sqrt(2).
fn conditioning(points: &[Point]) -> Option<Matrix3<f64>> {
    let n = points.len() as f64;
    let cx = points.iter().map(|p| p.x as f64).sum::<f64>() / n;
    let cy = points.iter().map(|p| p.y as f64).sum::<f64>() / n;
    let mean_dist = points
        .iter()
        .map(|p| ((p.x as f64 - cx).powi(2) + (p.y as f64 - cy).powi(2)).sqrt())
        .sum::<f64>()
        / n;
    if mean_dist < DEGENERATE_EPS {
        return None;
    }
    let s = std::f64::consts::SQRT_2 / mean_dist;
    #[rustfmt::skip]
    let t = Matrix3::new(
        s, 0.0, -s * cx,
        0.0, s, -s * cy,
        0.0, 0.0, 1.0,
    );
    Some(t)
}

fn apply(t: &Matrix3<f64>, x: f64, y: f64) -> (f64, f64) {
    (t[(0, 0)] * x + t[(0, 2)], t[(1, 1)] * y + t[(1, 2)])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Point, b: Point, tol: f32) {
        assert!(
            (a.x - b.x).abs() < tol && (a.y - b.y).abs() < tol,
            "{a:?} != {b:?}"
        );
    }

    #[test]
    fn test_affine_maps_each_correspondence_exactly() {
        let src = [
            Point::new(3.0, 4.0),
            Point::new(40.5, 7.25),
            Point::new(12.0, 33.0),
        ];
        let dst = [
            Point::new(100.0, 80.0),
            Point::new(131.0, 95.5),
            Point::new(97.25, 118.0),
        ];
        let affine = AffineTransform::from_triangles(&src, &dst).unwrap();
        for (s, d) in src.iter().zip(&dst) {
            assert_close(affine.transform_point(*s), *d, 1e-3);
        }
    }

    #[test]
    fn test_affine_identity_for_equal_triangles() {
        let tri = [
            Point::new(0.0, 0.0),
            Point::new(20.0, 0.0),
            Point::new(20.0, 20.0),
        ];
        let affine = AffineTransform::from_triangles(&tri, &tri).unwrap();
        let m = affine.to_matrix();
        let id = AffineTransform::identity().to_matrix();
        for (a, b) in m.iter().zip(&id) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_affine_rejects_collinear_source() {
        let src = [
            Point::new(0.0, 0.0),
            Point::new(5.0, 5.0),
            Point::new(10.0, 10.0),
        ];
        let dst = [
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(0.0, 5.0),
        ];
        assert!(AffineTransform::from_triangles(&src, &dst).is_none());

        let point = [Point::new(1.0, 1.0); 3];
        assert!(AffineTransform::from_triangles(&point, &dst).is_none());
    }

    #[test]
    fn test_homography_maps_square_to_quad() {
        let src = [
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        ];
        let dst = [
            Point::new(10.0, 5.0),
            Point::new(90.0, 15.0),
            Point::new(110.0, 120.0),
            Point::new(-5.0, 95.0),
        ];
        let h = Homography::from_correspondences(&src, &dst).unwrap();
        for (s, d) in src.iter().zip(&dst) {
            assert_close(h.transform_point(*s).unwrap(), *d, 1e-2);
        }
    }

    #[test]
    fn test_homography_rejects_degenerate_layouts() {
        let line = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 2.0),
            Point::new(3.0, 3.0),
        ];
        assert!(Homography::from_correspondences(&line, &line).is_none());

        let three = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
        ];
        assert!(Homography::from_correspondences(&three, &three).is_none());

        let edge = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(20.0, 0.0),
            Point::new(0.0, 20.0),
        ];
        let moved: Vec<Point> = edge.iter().map(|&p| p + Point::new(40.0, 0.0)).collect();
        assert!(Homography::from_correspondences(&edge, &moved).is_none());
    }

    #[test]
    fn test_projection_conversion() {
        let affine = AffineTransform::from_triangles(
            &[
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(0.0, 1.0),
            ],
            &[
                Point::new(2.0, 3.0),
                Point::new(4.0, 3.0),
                Point::new(2.0, 5.0),
            ],
        )
        .unwrap();
        assert!(affine.to_projection().is_some());
    }
}
