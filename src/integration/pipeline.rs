//! FaceSwapper: the per-frame driver combining location, tracking and compositing.

use image::{RgbImage, imageops};
use tracing::{Level, debug, span, trace, warn};

use crate::compositor::{
    FaceBlender, SeamlessBlend, TriangleMesher, Triangulator, extract_face, polygon_mask,
    warp_perspective, warp_triangle,
};
use crate::config::{SwapConfig, SwapMode, TrianglePairing, WarpMode};
use crate::error::{Result, SwapError};
use crate::geometry::{self, Homography, PixelRect, Point};
use crate::integration::LocateFaces;
use crate::tracker::{Face, OpticalFlow, TrackingState};

/// Result of processing one frame.
#[derive(Debug, Clone)]
pub struct SwappedFrame {
    /// The output frame, possibly uncomposited
    pub image: RgbImage,
    /// Attempted (source, destination) face pairs
    pub pairs: Vec<(usize, usize)>,
    /// Number of pairs blended into `image`
    pub composited: usize,
}

/// Cyclic pairing: face `i` is drawn onto face `(i + 1) mod n`.
///
/// Fewer than two faces yield no pairs.
pub fn cyclic_pairs(n: usize) -> Vec<(usize, usize)> {
    (0..n)
        .filter_map(|i| {
            let j = (i + 1) % n;
            (i != j).then_some((i, j))
        })
        .collect()
}

struct ReferenceFace {
    image: RgbImage,
    face: Face,
}

/// Mesh, warp and blend for one (source, destination) pair.
struct PairCompositor<T: Triangulator, B: SeamlessBlend> {
    mesher: TriangleMesher<T>,
    blender: FaceBlender<B>,
}

impl<T: Triangulator, B: SeamlessBlend> PairCompositor<T, B> {
    /// Mesh a face against the bounds of the image it lives in. Failures
    /// leave the face unmeshed, which makes its swaps fail later.
    fn prepare(&mut self, face: &mut Face, image: &RgbImage) {
        let region = PixelRect::of_image(image.width(), image.height());
        if let Err(err) = self.mesher.mesh_face(face, &region) {
            warn!(%err, "triangulation failed");
        }
    }

    /// Draw `src_face` from `src` onto `dst_face` in `dst`.
    fn swap(
        &mut self,
        config: &SwapConfig,
        src: &RgbImage,
        src_face: &Face,
        dst: &mut RgbImage,
        dst_face: &Face,
    ) -> Result<()> {
        // Only the on-frame part of the face gets a canvas
        let frame = PixelRect::of_image(dst.width(), dst.height());
        let dst_box = dst_face
            .pixel_bounds()
            .and_then(|b| b.intersect(&frame))
            .ok_or(SwapError::EmptyGeometry)?;

        // Intermediate face canvas in dst_box coordinates
        let mut canvas = RgbImage::new(dst_box.width, dst_box.height);
        match config.warp {
            WarpMode::Triangulated => {
                self.warp_triangles(
                    config.pairing,
                    src,
                    src_face,
                    &mut canvas,
                    dst_face,
                    &dst_box,
                )?
            }
            WarpMode::Homography => {
                warp_whole_face(src, src_face, &mut canvas, dst_face, &dst_box)?
            }
        }

        let hull = geometry::shift_to_local(&dst_face.hull_points(), dst_box.origin());
        let mask =
            polygon_mask(dst_box.width, dst_box.height, &hull).ok_or(SwapError::EmptyGeometry)?;
        let center = geometry::centroid(&geometry::corner_points(&dst_box))
            .ok_or(SwapError::EmptyGeometry)?;
        let anchor = (center.x.floor() as i32, center.y.floor() as i32);

        self.blender.blend(&canvas, &mask, dst, anchor)
    }

    fn warp_triangles(
        &mut self,
        pairing: TrianglePairing,
        src: &RgbImage,
        src_face: &Face,
        canvas: &mut RgbImage,
        dst_face: &Face,
        dst_box: &PixelRect,
    ) -> Result<()> {
        let pairs: Vec<([Point; 3], [Point; 3])> = match pairing {
            TrianglePairing::ByLandmarkIndex
                if src_face.num_landmarks() == dst_face.num_landmarks() =>
            {
                dst_face
                    .triangles()
                    .iter()
                    .filter_map(|t| {
                        Some((src_face.triangle_points(t)?, dst_face.triangle_points(t)?))
                    })
                    .collect()
            }
            TrianglePairing::ByLandmarkIndex => {
                debug!(
                    src = src_face.num_landmarks(),
                    dst = dst_face.num_landmarks(),
                    "landmark counts differ, pairing triangles by position"
                );
                pair_by_position(src_face, dst_face)
            }
            TrianglePairing::ByPosition => pair_by_position(src_face, dst_face),
        };
        if pairs.is_empty() {
            return Err(SwapError::EmptyGeometry);
        }

        let origin = dst_box.origin();
        let mut warped = 0;
        for (src_tri, dst_tri) in &pairs {
            let local = [
                dst_tri[0] - origin,
                dst_tri[1] - origin,
                dst_tri[2] - origin,
            ];
            match warp_triangle(src, src_tri, canvas, &local) {
                Ok(()) => warped += 1,
                Err(err) => trace!(%err, "triangle skipped"),
            }
        }
        trace!(warped, total = pairs.len(), "triangles warped");

        if warped == 0 {
            return Err(SwapError::TransformDegenerate);
        }
        Ok(())
    }
}

/// Pair triangle `i` of the source mesh with triangle `i` of the
/// destination mesh, truncating to the shorter mesh.
fn pair_by_position(src_face: &Face, dst_face: &Face) -> Vec<([Point; 3], [Point; 3])> {
    let (src_count, dst_count) = (src_face.triangles().len(), dst_face.triangles().len());
    if src_count != dst_count {
        let err = SwapError::MeshCountMismatch { src_count, dst_count };
        debug!(%err, "truncating to the shorter mesh");
    }
    src_face
        .triangles()
        .iter()
        .zip(dst_face.triangles())
        .filter_map(|(s, d)| {
            Some((src_face.triangle_points(s)?, dst_face.triangle_points(d)?))
        })
        .collect()
}

/// Warp the hull-masked source face into `canvas` with one perspective map
/// fitted to the landmarks. Falls back to mapping box onto box when the
/// landmark fit is degenerate.
fn warp_whole_face(
    src: &RgbImage,
    src_face: &Face,
    canvas: &mut RgbImage,
    dst_face: &Face,
    dst_box: &PixelRect,
) -> Result<()> {
    let (patch, src_box) = extract_face(src, src_face)?;
    let src_local = geometry::shift_to_local(src_face.landmarks(), src_box.origin());
    let dst_local = geometry::shift_to_local(dst_face.landmarks(), dst_box.origin());

    let homography = Homography::from_correspondences(&src_local, &dst_local)
        .or_else(|| {
            debug!("landmark homography degenerate, mapping box onto box");
            Homography::from_correspondences(
                &PixelRect::new(0, 0, src_box.width, src_box.height).corners(),
                &PixelRect::new(0, 0, dst_box.width, dst_box.height).corners(),
            )
        })
        .ok_or(SwapError::TransformDegenerate)?;

    warp_perspective(&patch, &homography, canvas)
}

/// Per-frame face swap driver.
///
/// In [`SwapMode::Cyclic`] every frame is searched for faces and each face
/// takes the appearance of the previous one. In [`SwapMode::Reference`] the
/// camera face is tracked across frames and the reference face set with
/// [`FaceSwapper::set_reference`] is drawn onto it.
///
/// Failures never escape a frame: `process_frame` always returns a frame,
/// uncomposited when a stage could not produce a usable result.
pub struct FaceSwapper<L, F, T, B>
where
    L: LocateFaces,
    F: OpticalFlow,
    T: Triangulator,
    B: SeamlessBlend,
{
    locator: L,
    flow: F,
    compositor: PairCompositor<T, B>,
    camera: TrackingState,
    reference: Option<ReferenceFace>,
    config: SwapConfig,
    frame_id: u64,
}

impl<L, F, T, B> FaceSwapper<L, F, T, B>
where
    L: LocateFaces,
    F: OpticalFlow,
    T: Triangulator,
    B: SeamlessBlend,
{
    /// Create a new face swapper from its collaborators and configuration.
    pub fn new(locator: L, flow: F, triangulator: T, blend: B, config: SwapConfig) -> Self {
        Self {
            locator,
            flow,
            compositor: PairCompositor {
                mesher: TriangleMesher::new(triangulator),
                blender: FaceBlender::new(blend),
            },
            camera: TrackingState::new(config.refresh_threshold),
            reference: None,
            config,
            frame_id: 0,
        }
    }

    /// Create a new face swapper with the default configuration.
    pub fn with_default_config(locator: L, flow: F, triangulator: T, blend: B) -> Self {
        Self::new(locator, flow, triangulator, blend, SwapConfig::default())
    }

    /// Locate the face in `image` and use it as the reference face.
    ///
    /// The previous reference is kept if no face is found.
    pub fn set_reference(&mut self, image: RgbImage) -> Result<()> {
        let mut face = self.locator.locate(&image)?.ok_or(SwapError::DetectionEmpty)?;
        self.compositor.prepare(&mut face, &image);
        debug!(landmarks = face.num_landmarks(), "reference face set");
        self.reference = Some(ReferenceFace { image, face });
        Ok(())
    }

    pub fn clear_reference(&mut self) {
        self.reference = None;
    }

    pub fn reference_face(&self) -> Option<&Face> {
        self.reference.as_ref().map(|r| &r.face)
    }

    pub fn set_mode(&mut self, mode: SwapMode) {
        self.config.mode = mode;
    }

    /// Process a single frame.
    pub fn process_frame(&mut self, frame: &RgbImage) -> SwappedFrame {
        self.frame_id += 1;
        let span = span!(Level::DEBUG, "frame", id = self.frame_id);
        let _guard = span.enter();

        let mut out = SwappedFrame {
            image: frame.clone(),
            pairs: Vec::new(),
            composited: 0,
        };
        match self.config.mode {
            SwapMode::Cyclic => self.swap_cyclic(frame, &mut out),
            SwapMode::Reference => self.swap_reference(frame, &mut out),
        }
        out
    }

    fn swap_cyclic(&mut self, frame: &RgbImage, out: &mut SwappedFrame) {
        let mut faces = match self.locator.locate_all(frame) {
            Ok(faces) => faces,
            Err(err) => {
                warn!(%err, "face location failed");
                return;
            }
        };
        if self.config.warp == WarpMode::Triangulated {
            for face in &mut faces {
                self.compositor.prepare(face, frame);
            }
        }

        out.pairs = cyclic_pairs(faces.len());
        for &(i, j) in &out.pairs {
            // Read from the untouched input so every face is sourced from the
            // original frame, not from an earlier swap.
            match self
                .compositor
                .swap(&self.config, frame, &faces[i], &mut out.image, &faces[j])
            {
                Ok(()) => out.composited += 1,
                Err(err) => debug!(%err, src = i, dst = j, "pair skipped"),
            }
        }
    }

    fn swap_reference(&mut self, frame: &RgbImage, out: &mut SwappedFrame) {
        let gray = imageops::grayscale(frame);
        let outcome = self
            .camera
            .advance(frame, gray, &mut self.locator, &mut self.flow);
        if !outcome.has_face() {
            debug!(?outcome, "no camera face this frame");
            return;
        }

        let Some(reference) = self.reference.as_mut() else {
            trace!("no reference face set");
            return;
        };
        let Some(face) = self.camera.face_mut() else {
            return;
        };
        if face.is_empty() || reference.face.is_empty() {
            return;
        }
        if self.config.warp == WarpMode::Triangulated {
            self.compositor.prepare(face, frame);
            self.compositor.prepare(&mut reference.face, &reference.image);
        }

        out.pairs.push((0, 0));
        match self.compositor.swap(
            &self.config,
            &reference.image,
            &reference.face,
            &mut out.image,
            face,
        ) {
            Ok(()) => out.composited += 1,
            Err(err) => debug!(%err, "reference swap skipped"),
        }
    }

    pub fn config(&self) -> &SwapConfig {
        &self.config
    }

    /// Tracking state of the camera face.
    pub fn tracking(&self) -> &TrackingState {
        &self.camera
    }

    pub fn tracking_mut(&mut self) -> &mut TrackingState {
        &mut self.camera
    }

    pub fn locator(&self) -> &L {
        &self.locator
    }

    pub fn locator_mut(&mut self) -> &mut L {
        &mut self.locator
    }

    pub fn flow(&self) -> &F {
        &self.flow
    }

    pub fn flow_mut(&mut self) -> &mut F {
        &mut self.flow
    }

    pub fn mesher(&self) -> &TriangleMesher<T> {
        &self.compositor.mesher
    }

    pub fn blender(&self) -> &FaceBlender<B> {
        &self.compositor.blender
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use image::Rgb;

    fn face_with_mesh(points: Vec<Point>, triangles: Vec<[usize; 3]>) -> Face {
        let mut face = Face::new(Rect::new(0.0, 0.0, 1.0, 1.0), points);
        face.set_triangles(triangles);
        face
    }

    #[test]
    fn test_pair_by_position_truncates_to_shorter_mesh() {
        let square = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        let mut pentagon = square.clone();
        pentagon.insert(3, Point::new(5.0, 15.0));

        let src = face_with_mesh(square, vec![[0, 1, 2], [0, 2, 3]]);
        let dst = face_with_mesh(pentagon, vec![[0, 1, 2], [0, 2, 3], [0, 3, 4]]);

        let pairs = pair_by_position(&src, &dst);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].0, src.triangle_points(&[0, 2, 3]).unwrap());
        assert_eq!(pairs[1].1, dst.triangle_points(&[0, 2, 3]).unwrap());

        let reversed = pair_by_position(&dst, &src);
        assert_eq!(reversed.len(), 2);
    }

    #[test]
    fn test_warp_whole_face_uses_box_map_when_landmarks_are_degenerate() {
        let src = RgbImage::from_pixel(40, 40, Rgb([200, 30, 30]));
        // Three of four landmarks on the top edge
        let landmarks = |x: f32, y: f32| {
            vec![
                Point::new(x, y),
                Point::new(x + 10.0, y),
                Point::new(x + 20.0, y),
                Point::new(x, y + 20.0),
            ]
        };
        let src_face = Face::new(Rect::new(10.0, 10.0, 20.0, 20.0), landmarks(10.0, 10.0));
        let dst_face = Face::new(Rect::new(0.0, 0.0, 20.0, 20.0), landmarks(0.0, 0.0));
        let src_local = geometry::shift_to_local(src_face.landmarks(), Point::new(10.0, 10.0));
        let landmark_fit = Homography::from_correspondences(&src_local, dst_face.landmarks());
        assert!(landmark_fit.is_none());

        let dst_box = dst_face.pixel_bounds().unwrap();
        let mut canvas = RgbImage::new(dst_box.width, dst_box.height);
        warp_whole_face(&src, &src_face, &mut canvas, &dst_face, &dst_box).unwrap();

        assert_eq!(*canvas.get_pixel(5, 5), Rgb([200, 30, 30]));
        // Outside the source hull the patch is black
        assert_eq!(*canvas.get_pixel(18, 18), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_cyclic_pairs() {
        assert!(cyclic_pairs(0).is_empty());
        assert!(cyclic_pairs(1).is_empty());
        assert_eq!(cyclic_pairs(2), vec![(0, 1), (1, 0)]);
        assert_eq!(cyclic_pairs(3), vec![(0, 1), (1, 2), (2, 0)]);
    }

    #[test]
    fn test_cyclic_pairs_count_matches_face_count() {
        for n in 2..8 {
            let pairs = cyclic_pairs(n);
            assert_eq!(pairs.len(), n);
            for (i, &(s, d)) in pairs.iter().enumerate() {
                assert_eq!(s, i);
                assert_eq!(d, (i + 1) % n);
            }
        }
    }
}
