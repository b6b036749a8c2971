//! # faceswap-rs
//!
//! Real-time face swapping on a live video stream.
//!
//! Per frame the swapper:
//!
//! 1. Locates faces with a pluggable detector and landmark predictor, or
//!    propagates the previous landmarks with optical flow and only re-detects
//!    when tracking breaks or the geometry has been propagated for too long.
//! 2. Triangulates the landmark sets of the source and destination faces.
//! 3. Warps the source face onto the destination shape triangle by triangle
//!    into an intermediate canvas.
//! 4. Blends the canvas into the frame inside the destination face's hull.
//!
//! Detection, landmark prediction, optical flow, triangulation and seamless
//! blending are consumed through traits ([`FaceDetector`],
//! [`LandmarkPredictor`], [`OpticalFlow`], [`Triangulator`],
//! [`SeamlessBlend`]); the crate owns the tracking state machine, the
//! coordinate bookkeeping and the warp/composite logic.
//!
//! ## Quick Start
//!
//! ```ignore
//! use faceswap_rs::{BoxCorners, FaceLocator, FaceSwapper, MaskedCopy, SwapConfig};
//!
//! let locator = FaceLocator::new(my_detector, BoxCorners);
//! let config = SwapConfig::default();
//! let mut swapper = FaceSwapper::new(locator, my_flow, my_triangulator, MaskedCopy, config);
//!
//! for frame in camera {
//!     let swapped = swapper.process_frame(&frame);
//!     show(&swapped.image);
//! }
//! ```

pub mod compositor;
pub mod config;
mod error;
pub mod geometry;
pub mod integration;
pub mod tracker;

pub use compositor::{FaceBlender, MaskedCopy, SeamlessBlend, TriangleMesher, Triangulator};
pub use config::{SwapConfig, SwapMode, TrianglePairing, WarpMode};
pub use error::{Result, SwapError};
pub use geometry::{AffineTransform, Homography, PixelRect, Point, Rect};
pub use integration::{
    BoxCorners, FaceBuilder, FaceDetector, FaceLocator, FaceSwapper, LandmarkPredictor,
    LocateFaces, NoSecondary, SecondaryDetector, SwappedFrame,
};
pub use tracker::{Face, FlowOutput, OpticalFlow, TrackOutcome, TrackPhase, TrackingState};
