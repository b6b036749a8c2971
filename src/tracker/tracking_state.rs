//! Per-subject detect-or-track state machine.

use image::{GrayImage, RgbImage};
use tracing::{debug, trace, warn};

use crate::error::{Result, SwapError};
use crate::geometry::Point;
use crate::integration::LocateFaces;
use crate::tracker::face::Face;
use crate::tracker::flow::OpticalFlow;
use crate::tracker::track_state::{TrackOutcome, TrackPhase};

/// Tracking state of one subject (for example the camera face).
///
/// Each frame either runs full detection or propagates the previous
/// landmarks with optical flow. Propagation is abandoned as soon as the
/// flow loses points, and a fresh detection is forced once the face has
/// been propagated `refresh_threshold` times in a row.
#[derive(Debug, Clone)]
pub struct TrackingState {
    phase: TrackPhase,
    face: Option<Face>,
    last_gray: Option<GrayImage>,
    tracked_points: Vec<Point>,
    refresh_threshold: u32,
}

impl TrackingState {
    pub fn new(refresh_threshold: u32) -> Self {
        Self {
            phase: TrackPhase::NeedsDetect,
            face: None,
            last_gray: None,
            tracked_points: Vec::new(),
            refresh_threshold,
        }
    }

    pub fn phase(&self) -> TrackPhase {
        self.phase
    }

    /// Most recent face geometry, kept across failed detections.
    pub fn face(&self) -> Option<&Face> {
        self.face.as_ref()
    }

    pub fn face_mut(&mut self) -> Option<&mut Face> {
        self.face.as_mut()
    }

    /// Points fed to the next optical-flow step.
    pub fn tracked_points(&self) -> &[Point] {
        &self.tracked_points
    }

    /// Grayscale frame the next optical-flow step starts from.
    pub fn last_gray(&self) -> Option<&GrayImage> {
        self.last_gray.as_ref()
    }

    pub fn refresh_threshold(&self) -> u32 {
        self.refresh_threshold
    }

    /// Drop all geometry and start over with a detection.
    pub fn reset(&mut self) {
        self.phase = TrackPhase::NeedsDetect;
        self.face = None;
        self.last_gray = None;
        self.tracked_points.clear();
    }

    /// Process one frame.
    ///
    /// `gray` is the grayscale version of `frame`; it becomes the optical
    /// flow reference for the next call whatever the outcome.
    pub fn advance<L, F>(
        &mut self,
        frame: &RgbImage,
        gray: GrayImage,
        locator: &mut L,
        flow: &mut F,
    ) -> TrackOutcome
    where
        L: LocateFaces,
        F: OpticalFlow,
    {
        let outcome = match self.phase {
            TrackPhase::NeedsDetect => self.detect(frame, locator),
            TrackPhase::Tracking => match self.propagate(&gray, flow) {
                Ok(()) => TrackOutcome::Tracked,
                Err(err) => {
                    debug!(%err, "tracking lost, re-detecting next frame");
                    self.phase = TrackPhase::NeedsDetect;
                    TrackOutcome::Skipped(err)
                }
            },
        };
        self.last_gray = Some(gray);
        outcome
    }

    fn detect<L: LocateFaces>(&mut self, frame: &RgbImage, locator: &mut L) -> TrackOutcome {
        match locator.locate(frame) {
            Ok(Some(face)) => {
                debug!(landmarks = face.num_landmarks(), "face detected");
                self.tracked_points = face.landmarks().to_vec();
                self.face = Some(face);
                self.phase = TrackPhase::Tracking;
                self.settle();
                TrackOutcome::Detected
            }
            Ok(None) => {
                trace!("no face detected");
                TrackOutcome::Skipped(SwapError::DetectionEmpty)
            }
            Err(err) => {
                warn!(%err, "face location failed");
                TrackOutcome::Skipped(err)
            }
        }
    }

    fn propagate<F: OpticalFlow>(&mut self, gray: &GrayImage, flow: &mut F) -> Result<()> {
        let face = self.face.as_mut().ok_or(SwapError::DetectionEmpty)?;
        let expected = face.num_landmarks();
        if expected == 0 || self.tracked_points.len() != expected {
            return Err(SwapError::TrackingBroken {
                expected,
                found: self.tracked_points.len(),
            });
        }

        let prev = self.last_gray.as_ref().ok_or(SwapError::TrackingBroken {
            expected,
            found: 0,
        })?;
        let output = flow
            .track(prev, gray, &self.tracked_points)
            .map_err(SwapError::backend)?;
        if output.points.len() != expected {
            return Err(SwapError::TrackingBroken {
                expected,
                found: output.points.len(),
            });
        }

        face.set_landmarks(output.points.clone());
        face.mark_tracked();
        self.tracked_points = output.points;
        self.settle();
        Ok(())
    }

    /// Schedule a detection once the face is too old to keep propagating.
    fn settle(&mut self) {
        if let Some(face) = &self.face {
            if face.age() >= self.refresh_threshold {
                debug!(age = face.age(), "refresh threshold reached");
                self.phase = TrackPhase::NeedsDetect;
            }
        }
    }
}
