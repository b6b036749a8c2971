//! Pipeline configuration.

use serde::{Deserialize, Serialize};

/// Which faces are swapped onto which.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapMode {
    /// Every face found in the frame takes the appearance of the previous
    /// one: face `i` is drawn onto face `(i + 1) mod n`.
    #[default]
    Cyclic,
    /// A reference face, located once in a still image, is drawn onto the
    /// tracked camera face.
    Reference,
}

/// How source triangles are matched to destination triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrianglePairing {
    /// Both faces are triangulated independently and triangle `i` of one is
    /// paired with triangle `i` of the other, up to the shorter mesh.
    #[default]
    ByPosition,
    /// Only the destination is triangulated; each source triangle is built
    /// from the same landmark indices.
    ByLandmarkIndex,
}

/// How the source face is resampled into the destination shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarpMode {
    /// One affine map per mesh triangle.
    #[default]
    Triangulated,
    /// One perspective map for the whole face.
    Homography,
}

/// Configuration for the face swapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwapConfig {
    /// Consecutive optical-flow frames before a fresh detection is forced.
    pub refresh_threshold: u32,
    pub mode: SwapMode,
    pub pairing: TrianglePairing,
    pub warp: WarpMode,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            refresh_threshold: 30,
            mode: SwapMode::Cyclic,
            pairing: TrianglePairing::ByPosition,
            warp: WarpMode::Triangulated,
        }
    }
}
