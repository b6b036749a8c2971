//! Integration module connecting face detection backends with tracking and
//! compositing.
//!
//! This module provides the traits for detector and landmark backends, the
//! [`FaceLocator`] built on them, and the per-frame [`FaceSwapper`].

mod builder;
mod detector;
mod locator;
mod pipeline;

pub use builder::FaceBuilder;
pub use detector::{
    BoxCorners, FaceDetector, LandmarkPredictor, LocateFaces, NoSecondary, SecondaryDetector,
};
pub use locator::{DEFAULT_SECONDARY_RANGE, FaceLocator};
pub use pipeline::{FaceSwapper, SwappedFrame, cyclic_pairs};
