//! FaceLocator: detector + landmark predictor producing Face records.

use std::ops::RangeInclusive;

use image::RgbImage;
use tracing::trace;

use crate::error::{Result, SwapError};
use crate::geometry::Rect;
use crate::integration::FaceBuilder;
use crate::integration::detector::{
    FaceDetector, LandmarkPredictor, LocateFaces, NoSecondary, SecondaryDetector,
};
use crate::tracker::Face;

/// Secondary feature counts accepted by default (one to three eyes).
pub const DEFAULT_SECONDARY_RANGE: RangeInclusive<usize> = 1..=3;

/// Runs the detector, filters candidates through the optional secondary
/// check, and predicts landmarks for the accepted ones.
pub struct FaceLocator<D, P, S = NoSecondary> {
    detector: D,
    predictor: P,
    secondary: S,
    accepted: RangeInclusive<usize>,
}

impl<D: FaceDetector, P: LandmarkPredictor> FaceLocator<D, P> {
    /// Create a locator without a secondary check.
    pub fn new(detector: D, predictor: P) -> Self {
        Self {
            detector,
            predictor,
            secondary: NoSecondary,
            accepted: DEFAULT_SECONDARY_RANGE,
        }
    }
}

impl<D, P, S> FaceLocator<D, P, S>
where
    D: FaceDetector,
    P: LandmarkPredictor,
    S: SecondaryDetector,
{
    /// Require each candidate's secondary count to fall in `accepted`.
    pub fn with_secondary<S2: SecondaryDetector>(
        self,
        secondary: S2,
        accepted: RangeInclusive<usize>,
    ) -> FaceLocator<D, P, S2> {
        FaceLocator {
            detector: self.detector,
            predictor: self.predictor,
            secondary,
            accepted,
        }
    }

    /// Build a face for one candidate box, or `None` if it is rejected.
    fn accept(&mut self, frame: &RgbImage, rect: &Rect) -> Result<Option<Face>> {
        let count = self
            .secondary
            .count(frame, rect)
            .map_err(SwapError::backend)?;
        if let Some(count) = count {
            if !self.accepted.contains(&count) {
                trace!(?rect, count, "candidate rejected by secondary check");
                return Ok(None);
            }
        }

        let landmarks = self
            .predictor
            .predict(frame, rect)
            .map_err(SwapError::backend)?;
        if landmarks.is_empty() {
            trace!(?rect, "candidate has no landmarks");
            return Ok(None);
        }

        Ok(Some(FaceBuilder::new().rect(*rect).landmarks(landmarks).build()))
    }

    fn candidates(&mut self, frame: &RgbImage) -> Result<Vec<Rect>> {
        let rects = self.detector.detect(frame).map_err(SwapError::backend)?;
        trace!(count = rects.len(), "detector candidates");
        Ok(rects)
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    pub fn predictor(&self) -> &P {
        &self.predictor
    }

    pub fn predictor_mut(&mut self) -> &mut P {
        &mut self.predictor
    }

    pub fn accepted_range(&self) -> &RangeInclusive<usize> {
        &self.accepted
    }
}

impl<D, P, S> LocateFaces for FaceLocator<D, P, S>
where
    D: FaceDetector,
    P: LandmarkPredictor,
    S: SecondaryDetector,
{
    fn locate(&mut self, frame: &RgbImage) -> Result<Option<Face>> {
        for rect in self.candidates(frame)? {
            if let Some(face) = self.accept(frame, &rect)? {
                return Ok(Some(face));
            }
        }
        Ok(None)
    }

    fn locate_all(&mut self, frame: &RgbImage) -> Result<Vec<Face>> {
        let mut faces = Vec::new();
        for rect in self.candidates(frame)? {
            if let Some(face) = self.accept(frame, &rect)? {
                faces.push(face);
            }
        }
        Ok(faces)
    }
}
