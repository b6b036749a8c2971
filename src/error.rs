//! Error taxonomy for the swap pipeline.
//!
//! None of these are fatal: the pipeline absorbs them per frame and returns
//! the frame unmodified (or partially composited).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SwapError {
    /// The detector or landmark predictor found nothing usable.
    #[error("no usable face found")]
    DetectionEmpty,

    /// Optical flow returned a different number of points than it was given.
    #[error("tracking broken: expected {expected} points, optical flow returned {found}")]
    TrackingBroken { expected: usize, found: usize },

    /// An affine or perspective solve had no unique solution.
    #[error("transform is degenerate")]
    TransformDegenerate,

    /// Source and destination meshes differ in triangle count.
    #[error("mesh count mismatch: source has {src_count} triangles, destination has {dst_count}")]
    MeshCountMismatch { src_count: usize, dst_count: usize },

    /// A face's geometry covers no pixels (empty box, empty mesh or empty hull).
    #[error("face geometry is empty")]
    EmptyGeometry,

    /// Blend preconditions were not met.
    #[error("invalid blend: {0}")]
    InvalidBlend(String),

    /// An external capability (detector, predictor, flow, triangulator, blender) failed.
    #[error("backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl SwapError {
    /// Wrap a collaborator's error.
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, SwapError>;
