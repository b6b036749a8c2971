mod hull;
mod point;
mod rect;
mod transform;
mod util;

pub use hull::hull_indices;
pub use point::Point;
pub use rect::{PixelRect, Rect};
pub use transform::{AffineTransform, Homography};
pub use util::{bounding_box, centroid, corner_points, shift_to_local, signed_area2};
