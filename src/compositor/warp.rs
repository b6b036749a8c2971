//! Per-triangle affine warping and whole-face perspective warping.

use image::{Rgb, RgbImage, imageops};
use imageproc::geometric_transformations::{Interpolation, warp_into};

use crate::compositor::mask::{copy_masked, polygon_mask};
use crate::error::{Result, SwapError};
use crate::geometry::{self, AffineTransform, Homography, PixelRect, Point};
use crate::tracker::Face;

const BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);

/// Warp the content of `src_tri` in `src` onto `dst_tri` in `canvas`.
///
/// Both triangles are moved into the local coordinates of their own
/// bounding boxes, the source box is cut out, resampled through the affine
/// map taking the source vertices to the destination vertices, and only
/// the pixels inside the destination triangle are written back. Nothing
/// outside the destination triangle's footprint is touched, and the part of
/// the footprint beyond `canvas` is never rasterised.
pub fn warp_triangle(
    src: &RgbImage,
    src_tri: &[Point; 3],
    canvas: &mut RgbImage,
    dst_tri: &[Point; 3],
) -> Result<()> {
    if geometry::signed_area2(dst_tri).abs() < f32::EPSILON {
        return Err(SwapError::TransformDegenerate);
    }

    let src_bounds = PixelRect::of_image(src.width(), src.height());
    let canvas_bounds = PixelRect::of_image(canvas.width(), canvas.height());
    let src_box = PixelRect::bounding(src_tri)
        .and_then(|b| b.intersect(&src_bounds))
        .ok_or(SwapError::EmptyGeometry)?;
    let dst_box = PixelRect::bounding(dst_tri)
        .and_then(|b| b.intersect(&canvas_bounds))
        .ok_or(SwapError::EmptyGeometry)?;

    let src_local = local_triangle(src_tri, src_box.origin());
    let dst_local = local_triangle(dst_tri, dst_box.origin());

    let affine = AffineTransform::from_triangles(&src_local, &dst_local)
        .ok_or(SwapError::TransformDegenerate)?;
    let projection = affine.to_projection().ok_or(SwapError::TransformDegenerate)?;

    let patch = imageops::crop_imm(
        src,
        src_box.x as u32,
        src_box.y as u32,
        src_box.width,
        src_box.height,
    )
    .to_image();
    let mut warped = RgbImage::new(dst_box.width, dst_box.height);
    warp_into(
        &patch,
        &projection,
        Interpolation::Bilinear,
        BACKGROUND,
        &mut warped,
    );

    let mask = polygon_mask(dst_box.width, dst_box.height, &dst_local)
        .ok_or(SwapError::EmptyGeometry)?;
    copy_masked(&warped, &mask, canvas, dst_box.x, dst_box.y);
    Ok(())
}

/// Cut a face out of `src`: the pixels of its hull inside the hull's
/// bounding box, everything else black. Returns the patch and the box it
/// was taken from.
pub fn extract_face(src: &RgbImage, face: &Face) -> Result<(RgbImage, PixelRect)> {
    let hull = face.hull_points();
    let src_bounds = PixelRect::of_image(src.width(), src.height());
    let rect = PixelRect::bounding(&hull)
        .and_then(|b| b.intersect(&src_bounds))
        .ok_or(SwapError::EmptyGeometry)?;

    let local = geometry::shift_to_local(&hull, rect.origin());
    let mask = polygon_mask(rect.width, rect.height, &local).ok_or(SwapError::EmptyGeometry)?;

    let crop = imageops::crop_imm(src, rect.x as u32, rect.y as u32, rect.width, rect.height)
        .to_image();
    let mut patch = RgbImage::new(rect.width, rect.height);
    copy_masked(&crop, &mask, &mut patch, 0, 0);
    Ok((patch, rect))
}

/// Resample `patch` through `homography` into `canvas`, overwriting it.
pub fn warp_perspective(
    patch: &RgbImage,
    homography: &Homography,
    canvas: &mut RgbImage,
) -> Result<()> {
    let projection = homography
        .to_projection()
        .ok_or(SwapError::TransformDegenerate)?;
    warp_into(
        patch,
        &projection,
        Interpolation::Bilinear,
        BACKGROUND,
        canvas,
    );
    Ok(())
}

fn local_triangle(tri: &[Point; 3], origin: Point) -> [Point; 3] {
    [tri[0] - origin, tri[1] - origin, tri[2] - origin]
}
