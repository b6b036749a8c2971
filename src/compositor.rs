//! Mesh, warp and blend stages of a single face swap.

mod blend;
mod mask;
mod mesh;
mod warp;

pub use blend::{FaceBlender, MaskedCopy, SeamlessBlend};
pub use mask::{copy_masked, mask_area, polygon_mask};
pub use mesh::{TriangleMesher, Triangulator};
pub use warp::{extract_face, warp_perspective, warp_triangle};
