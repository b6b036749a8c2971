//! The Face record: one detected or tracked face.

use crate::geometry::{self, PixelRect, Point, Rect};

/// Geometry of one face.
///
/// `hull` and `triangles` are derived from `landmarks` and are never edited
/// on their own: replacing the landmarks recomputes the hull and drops the
/// cached mesh, which is rebuilt on demand by the mesher.
#[derive(Debug, Clone)]
pub struct Face {
    rect: Rect,
    landmarks: Vec<Point>,
    hull: Vec<usize>,
    triangles: Option<Vec<[usize; 3]>>,
    age: u32,
}

impl Face {
    /// Create a freshly detected face (age 0).
    pub fn new(rect: Rect, landmarks: Vec<Point>) -> Self {
        let hull = geometry::hull_indices(&landmarks);
        Self {
            rect,
            landmarks,
            hull,
            triangles: None,
            age: 0,
        }
    }

    /// Detector box.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Index-stable landmark points.
    pub fn landmarks(&self) -> &[Point] {
        &self.landmarks
    }

    pub fn num_landmarks(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    /// Hull as indices into [`Face::landmarks`].
    pub fn hull_indices(&self) -> &[usize] {
        &self.hull
    }

    pub fn hull_points(&self) -> Vec<Point> {
        self.hull.iter().map(|&i| self.landmarks[i]).collect()
    }

    /// Cached mesh, empty until the face has been meshed.
    pub fn triangles(&self) -> &[[usize; 3]] {
        self.triangles.as_deref().unwrap_or(&[])
    }

    pub fn is_meshed(&self) -> bool {
        self.triangles.is_some()
    }

    /// Resolve a mesh triangle to its landmark coordinates.
    pub fn triangle_points(&self, tri: &[usize; 3]) -> Option<[Point; 3]> {
        Some([
            *self.landmarks.get(tri[0])?,
            *self.landmarks.get(tri[1])?,
            *self.landmarks.get(tri[2])?,
        ])
    }

    /// Frames elapsed since the last full detection.
    pub fn age(&self) -> u32 {
        self.age
    }

    /// Pixel box covering every landmark (and therefore the hull).
    pub fn pixel_bounds(&self) -> Option<PixelRect> {
        geometry::bounding_box(&self.landmarks)
    }

    /// Replace landmarks after propagation, re-deriving the hull.
    pub(crate) fn set_landmarks(&mut self, landmarks: Vec<Point>) {
        self.hull = geometry::hull_indices(&landmarks);
        self.landmarks = landmarks;
        self.triangles = None;
    }

    pub(crate) fn set_triangles(&mut self, triangles: Vec<[usize; 3]>) {
        self.triangles = Some(triangles);
    }

    pub(crate) fn mark_tracked(&mut self) {
        self.age += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f32, y: f32, side: f32) -> Face {
        let rect = Rect::new(x, y, side, side);
        Face::new(rect, rect.corners().to_vec())
    }

    #[test]
    fn test_new_face_derives_hull() {
        let face = square(10.0, 10.0, 20.0);
        assert_eq!(face.age(), 0);
        assert_eq!(face.hull_indices().len(), 4);
        assert!(!face.is_meshed());
        assert!(face.triangles().is_empty());
    }

    #[test]
    fn test_set_landmarks_recomputes_hull_and_drops_mesh() {
        let mut face = square(0.0, 0.0, 10.0);
        face.set_triangles(vec![[0, 1, 2], [0, 2, 3]]);
        assert!(face.is_meshed());

        let mut pts = face.landmarks().to_vec();
        pts.push(Point::new(5.0, 5.0));
        pts.push(Point::new(5.0, -10.0));
        face.set_landmarks(pts);

        assert!(!face.is_meshed());
        let mut hull = face.hull_indices().to_vec();
        hull.sort_unstable();
        assert_eq!(hull, vec![0, 1, 2, 3, 5]);
    }

    #[test]
    fn test_triangle_points_rejects_bad_index() {
        let face = square(0.0, 0.0, 10.0);
        assert!(face.triangle_points(&[0, 1, 2]).is_some());
        assert!(face.triangle_points(&[0, 1, 9]).is_none());
    }

    #[test]
    fn test_pixel_bounds_covers_landmarks() {
        let face = square(10.0, 10.0, 20.0);
        assert_eq!(face.pixel_bounds(), Some(PixelRect::new(10, 10, 21, 21)));
    }
}
