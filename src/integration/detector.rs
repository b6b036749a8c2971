//! Traits for the face detection backends.

use std::convert::Infallible;

use image::RgbImage;

use crate::error::Result;
use crate::geometry::{Point, Rect};
use crate::tracker::Face;

/// Trait for face detection backends.
///
/// Implement this trait to connect any face detector (HOG, Haar cascade,
/// a neural detector) to the swapper.
///
/// # Example
///
/// ```ignore
/// use faceswap_rs::{FaceDetector, Rect};
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl FaceDetector for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, frame: &image::RgbImage) -> Result<Vec<Rect>, Self::Error> {
///         // Run inference and return face boxes
///         Ok(vec![])
///     }
/// }
/// ```
pub trait FaceDetector {
    /// Error type for detection failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Return candidate face boxes. Zero, one or many; order is not assumed.
    fn detect(&mut self, frame: &RgbImage) -> std::result::Result<Vec<Rect>, Self::Error>;
}

/// Trait for landmark predictors.
///
/// A predictor returns a fixed number of points per model, and index `k`
/// must denote the same facial feature on every call.
pub trait LandmarkPredictor {
    /// Error type for prediction failures.
    type Error: std::error::Error + Send + Sync + 'static;

    fn predict(
        &mut self,
        frame: &RgbImage,
        face: &Rect,
    ) -> std::result::Result<Vec<Point>, Self::Error>;
}

/// Predictor that uses the four corners of the detector box as landmarks.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxCorners;

impl LandmarkPredictor for BoxCorners {
    type Error = Infallible;

    fn predict(
        &mut self,
        _frame: &RgbImage,
        face: &Rect,
    ) -> std::result::Result<Vec<Point>, Infallible> {
        Ok(face.corners().to_vec())
    }
}

/// Secondary (eye-style) check run on each candidate box.
pub trait SecondaryDetector {
    /// Error type for detection failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Number of secondary features found inside `face`, or `None` when the
    /// check does not apply and the candidate should be accepted.
    fn count(
        &mut self,
        frame: &RgbImage,
        face: &Rect,
    ) -> std::result::Result<Option<usize>, Self::Error>;
}

/// No secondary check: every candidate is accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSecondary;

impl SecondaryDetector for NoSecondary {
    type Error = Infallible;

    fn count(
        &mut self,
        _frame: &RgbImage,
        _face: &Rect,
    ) -> std::result::Result<Option<usize>, Infallible> {
        Ok(None)
    }
}

/// Source of complete face records for a frame.
pub trait LocateFaces {
    /// The first accepted face, if any.
    fn locate(&mut self, frame: &RgbImage) -> Result<Option<Face>>;

    /// Every accepted face, in detector order.
    fn locate_all(&mut self, frame: &RgbImage) -> Result<Vec<Face>>;
}
