//! Triangle mesh over a face's landmarks.

use tracing::trace;

use crate::error::{Result, SwapError};
use crate::geometry::{PixelRect, Point};
use crate::tracker::Face;

/// Squared distance within which a triangle vertex is matched to a landmark.
const VERTEX_SNAP_SQ: f32 = 0.25;

/// Delaunay-style triangulation capability.
///
/// Implementations return triangles as vertex coordinates. Count and
/// order are a function of the point layout only. Vertices that are not
/// input points (such as the corners of an enclosing super-triangle) are
/// allowed; the mesher discards them.
pub trait Triangulator {
    /// Error type for triangulation failures.
    type Error: std::error::Error + Send + Sync + 'static;

    fn triangulate(
        &mut self,
        points: &[Point],
        region: &PixelRect,
    ) -> std::result::Result<Vec<[Point; 3]>, Self::Error>;
}

/// Builds index-triple meshes over landmark sets.
#[derive(Debug, Clone)]
pub struct TriangleMesher<T: Triangulator> {
    triangulator: T,
}

impl<T: Triangulator> TriangleMesher<T> {
    pub fn new(triangulator: T) -> Self {
        Self { triangulator }
    }

    /// Triangulate `points` and keep the triangles lying inside `region`.
    ///
    /// A triangle is dropped if any vertex, rounded to the nearest pixel, is
    /// outside `region`, or if a vertex does not coincide with one of
    /// `points`. Surviving triangles are returned as indices into `points`.
    pub fn mesh(&mut self, points: &[Point], region: &PixelRect) -> Result<Vec<[usize; 3]>> {
        let raw = self
            .triangulator
            .triangulate(points, region)
            .map_err(SwapError::backend)?;

        let mut triangles = Vec::with_capacity(raw.len());
        for tri in raw {
            let inside = tri.iter().all(|p| {
                let (x, y) = p.to_pixel();
                region.contains(x, y)
            });
            if !inside {
                trace!(?tri, "triangle outside valid region");
                continue;
            }
            match resolve_indices(points, &tri) {
                Some(indices) => triangles.push(indices),
                None => trace!(?tri, "triangle vertex is not a landmark"),
            }
        }
        Ok(triangles)
    }

    /// Mesh a face unless its cached mesh is still valid.
    pub fn mesh_face(&mut self, face: &mut Face, region: &PixelRect) -> Result<()> {
        if face.is_meshed() {
            return Ok(());
        }
        let triangles = self.mesh(face.landmarks(), region)?;
        trace!(count = triangles.len(), "face meshed");
        face.set_triangles(triangles);
        Ok(())
    }

    pub fn triangulator_mut(&mut self) -> &mut T {
        &mut self.triangulator
    }
}

fn resolve_indices(points: &[Point], tri: &[Point; 3]) -> Option<[usize; 3]> {
    let mut out = [0; 3];
    for (slot, vertex) in out.iter_mut().zip(tri) {
        let (idx, dist) = points
            .iter()
            .enumerate()
            .map(|(i, p)| (i, p.distance_squared(vertex)))
            .min_by(|a, b| a.1.total_cmp(&b.1))?;
        if dist > VERTEX_SNAP_SQ {
            return None;
        }
        *slot = idx;
    }
    Some(out)
}
