//! Optical-flow capability consumed by the tracker.

use image::GrayImage;

use crate::geometry::Point;

/// Output of one optical-flow step.
#[derive(Debug, Clone, Default)]
pub struct FlowOutput {
    /// Propagated point positions, index-aligned with the input points
    pub points: Vec<Point>,
    /// Per-point status reported by the backend (`true` = found)
    pub status: Vec<bool>,
}

/// Sparse optical-flow tracker.
///
/// Implement this to connect any point tracker (pyramidal Lucas-Kanade or
/// similar). The tracker treats any difference between the number of
/// points passed in and the number returned as a total failure.
pub trait OpticalFlow {
    /// Error type for tracker failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Find `points` (positions in `prev`) in `curr`.
    fn track(
        &mut self,
        prev: &GrayImage,
        curr: &GrayImage,
        points: &[Point],
    ) -> Result<FlowOutput, Self::Error>;
}
