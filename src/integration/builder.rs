//! Builder for creating Face records from various input formats.

use crate::geometry::{Point, Rect};
use crate::tracker::Face;

/// Builder for creating `Face` records from a detector box and landmarks.
#[derive(Debug, Clone, Default)]
pub struct FaceBuilder {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    landmarks: Vec<Point>,
}

impl FaceBuilder {
    /// Create a new face builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bounding box in TLBR format (x1, y1, x2, y2).
    pub fn tlbr(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.x1 = x1;
        self.y1 = y1;
        self.x2 = x2;
        self.y2 = y2;
        self
    }

    /// Set bounding box in XYWH format (center_x, center_y, width, height).
    pub fn xywh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.x1 = cx - w / 2.0;
        self.y1 = cy - h / 2.0;
        self.x2 = cx + w / 2.0;
        self.y2 = cy + h / 2.0;
        self
    }

    /// Set bounding box from a detector `Rect`.
    pub fn rect(self, rect: Rect) -> Self {
        let [x1, y1, x2, y2] = rect.to_tlbr();
        self.tlbr(x1, y1, x2, y2)
    }

    /// Set the landmark points.
    pub fn landmarks(mut self, landmarks: impl IntoIterator<Item = Point>) -> Self {
        self.landmarks = landmarks.into_iter().collect();
        self
    }

    /// Use the four box corners as landmarks.
    pub fn corner_landmarks(mut self) -> Self {
        self.landmarks = self.bbox().corners().to_vec();
        self
    }

    fn bbox(&self) -> Rect {
        Rect::from_tlbr(self.x1, self.y1, self.x2, self.y2)
    }

    /// Build the final `Face`.
    pub fn build(self) -> Face {
        Face::new(self.bbox(), self.landmarks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_builder() {
        let face = FaceBuilder::new()
            .tlbr(10.0, 20.0, 50.0, 80.0)
            .corner_landmarks()
            .build();

        assert_eq!(face.rect(), Rect::new(10.0, 20.0, 40.0, 60.0));
        assert_eq!(face.num_landmarks(), 4);
        assert_eq!(face.landmarks()[2], Point::new(50.0, 80.0));
        assert_eq!(face.age(), 0);
    }

    #[test]
    fn test_face_builder_xywh() {
        let face = FaceBuilder::new()
            .xywh(30.0, 30.0, 20.0, 10.0)
            .landmarks([Point::new(1.0, 2.0)])
            .build();

        assert_eq!(face.rect(), Rect::new(20.0, 25.0, 20.0, 10.0));
        assert_eq!(face.landmarks(), &[Point::new(1.0, 2.0)]);
    }
}
