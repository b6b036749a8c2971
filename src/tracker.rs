mod face;
mod flow;
mod track_state;
mod tracking_state;

pub use face::Face;
pub use flow::{FlowOutput, OpticalFlow};
pub use track_state::{TrackOutcome, TrackPhase};
pub use tracking_state::TrackingState;
