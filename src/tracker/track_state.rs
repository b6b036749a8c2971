/// Tracking phase of one subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackPhase {
    /// The next frame runs full detection
    #[default]
    NeedsDetect,
    /// The next frame propagates the previous geometry with optical flow
    Tracking,
}

/// What a single [`TrackingState::advance`](super::TrackingState::advance) call did.
#[derive(Debug)]
pub enum TrackOutcome {
    /// Full detection produced a fresh face
    Detected,
    /// Optical flow propagated the previous face
    Tracked,
    /// No usable geometry this frame; compositing is skipped
    Skipped(crate::SwapError),
}

impl TrackOutcome {
    /// Whether the frame has geometry to composite onto.
    pub fn has_face(&self) -> bool {
        matches!(self, Self::Detected | Self::Tracked)
    }
}
