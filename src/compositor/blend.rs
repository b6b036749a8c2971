//! Compositing a finished face canvas into the destination frame.

use std::convert::Infallible;

use image::{GrayImage, RgbImage};

use crate::compositor::mask::{copy_masked, mask_area};
use crate::error::{Result, SwapError};

/// Gradient-domain ("seamless") blending capability.
///
/// `patch` and `mask` have the same size. The patch is placed so that its
/// center (`width / 2`, `height / 2`) lands on `anchor` in `dest`.
pub trait SeamlessBlend {
    /// Error type for blending failures.
    type Error: std::error::Error + Send + Sync + 'static;

    fn blend(
        &mut self,
        patch: &RgbImage,
        mask: &GrayImage,
        dest: &mut RgbImage,
        anchor: (i32, i32),
    ) -> std::result::Result<(), Self::Error>;
}

/// Naive blend: copies masked patch pixels as they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaskedCopy;

impl SeamlessBlend for MaskedCopy {
    type Error = Infallible;

    fn blend(
        &mut self,
        patch: &RgbImage,
        mask: &GrayImage,
        dest: &mut RgbImage,
        anchor: (i32, i32),
    ) -> std::result::Result<(), Infallible> {
        let x = anchor.0 - (patch.width() / 2) as i32;
        let y = anchor.1 - (patch.height() / 2) as i32;
        copy_masked(patch, mask, dest, x, y);
        Ok(())
    }
}

/// Checks blend preconditions and hands the canvas to the blend backend.
#[derive(Debug, Clone)]
pub struct FaceBlender<B: SeamlessBlend> {
    backend: B,
}

impl<B: SeamlessBlend> FaceBlender<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Blend `canvas` into `dest` at `anchor`, restricted to `mask`.
    ///
    /// Fails without touching `dest` when the mask is empty, differs in
    /// size from the canvas, or the anchor lies outside `dest`.
    pub fn blend(
        &mut self,
        canvas: &RgbImage,
        mask: &GrayImage,
        dest: &mut RgbImage,
        anchor: (i32, i32),
    ) -> Result<()> {
        if canvas.dimensions() != mask.dimensions() {
            return Err(SwapError::InvalidBlend(format!(
                "canvas is {:?} but mask is {:?}",
                canvas.dimensions(),
                mask.dimensions()
            )));
        }
        if mask_area(mask) == 0 {
            return Err(SwapError::InvalidBlend("mask is empty".into()));
        }
        let (x, y) = anchor;
        if x < 0 || y < 0 || x >= dest.width() as i32 || y >= dest.height() as i32 {
            return Err(SwapError::InvalidBlend(format!(
                "anchor ({x}, {y}) outside {}x{} frame",
                dest.width(),
                dest.height()
            )));
        }
        self.backend
            .blend(canvas, mask, dest, anchor)
            .map_err(SwapError::backend)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::mask::MASK_ON;
    use image::Rgb;

    #[test]
    fn test_masked_copy_centers_patch_on_anchor() {
        let patch = RgbImage::from_pixel(5, 5, Rgb([1, 2, 3]));
        let mask = GrayImage::from_pixel(5, 5, MASK_ON);
        let mut dest = RgbImage::new(20, 20);

        FaceBlender::new(MaskedCopy)
            .blend(&patch, &mask, &mut dest, (10, 10))
            .unwrap();

        assert_eq!(*dest.get_pixel(8, 8), Rgb([1, 2, 3]));
        assert_eq!(*dest.get_pixel(12, 12), Rgb([1, 2, 3]));
        assert_eq!(*dest.get_pixel(7, 7), Rgb([0, 0, 0]));
        assert_eq!(*dest.get_pixel(13, 13), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_blend_rejects_empty_mask() {
        let patch = RgbImage::new(4, 4);
        let mask = GrayImage::new(4, 4);
        let mut dest = RgbImage::new(10, 10);
        let err = FaceBlender::new(MaskedCopy)
            .blend(&patch, &mask, &mut dest, (5, 5))
            .unwrap_err();
        assert!(matches!(err, SwapError::InvalidBlend(_)));
    }

    #[test]
    fn test_blend_rejects_anchor_outside_frame() {
        let patch = RgbImage::from_pixel(4, 4, Rgb([7, 7, 7]));
        let mask = GrayImage::from_pixel(4, 4, MASK_ON);
        let mut dest = RgbImage::new(10, 10);
        let mut blender = FaceBlender::new(MaskedCopy);

        assert!(blender.blend(&patch, &mask, &mut dest, (10, 5)).is_err());
        assert!(blender.blend(&patch, &mask, &mut dest, (-1, 5)).is_err());
        assert!(dest.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }
}
