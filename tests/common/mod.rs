//! Scripted collaborators shared by the integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::convert::Infallible;

use faceswap_rs::{FaceDetector, FlowOutput, OpticalFlow, PixelRect, Point, Rect, Triangulator};
use image::{GrayImage, Rgb, RgbImage};

pub const BACKGROUND: Rgb<u8> = Rgb([50, 50, 50]);
pub const RED: Rgb<u8> = Rgb([220, 20, 20]);
pub const BLUE: Rgb<u8> = Rgb([20, 20, 220]);
pub const GREEN: Rgb<u8> = Rgb([20, 220, 20]);

/// Returns one scripted detection list per call, then `repeat` forever.
pub struct ScriptedDetector {
    script: VecDeque<Vec<Rect>>,
    repeat: Vec<Rect>,
    pub calls: usize,
}

impl ScriptedDetector {
    pub fn always(rects: Vec<Rect>) -> Self {
        Self {
            script: VecDeque::new(),
            repeat: rects,
            calls: 0,
        }
    }

    pub fn script(frames: Vec<Vec<Rect>>, repeat: Vec<Rect>) -> Self {
        Self {
            script: frames.into(),
            repeat,
            calls: 0,
        }
    }
}

impl FaceDetector for ScriptedDetector {
    type Error = Infallible;

    fn detect(&mut self, _frame: &RgbImage) -> Result<Vec<Rect>, Infallible> {
        self.calls += 1;
        Ok(self
            .script
            .pop_front()
            .unwrap_or_else(|| self.repeat.clone()))
    }
}

/// Moves every point by `shift`; drops the last point when `drop_last` is set.
#[derive(Default)]
pub struct MockFlow {
    pub shift: Point,
    pub drop_last: bool,
    pub calls: usize,
}

impl OpticalFlow for MockFlow {
    type Error = Infallible;

    fn track(
        &mut self,
        _prev: &GrayImage,
        _curr: &GrayImage,
        points: &[Point],
    ) -> Result<FlowOutput, Infallible> {
        self.calls += 1;
        let mut moved: Vec<Point> = points.iter().map(|&p| p + self.shift).collect();
        if self.drop_last {
            moved.pop();
        }
        let status = vec![true; moved.len()];
        Ok(FlowOutput {
            points: moved,
            status,
        })
    }
}

/// Fans triangles out from the first point; exact for convex point lists
/// given in boundary order.
pub struct FanTriangulator;

impl Triangulator for FanTriangulator {
    type Error = Infallible;

    fn triangulate(
        &mut self,
        points: &[Point],
        _region: &PixelRect,
    ) -> Result<Vec<[Point; 3]>, Infallible> {
        if points.len() < 3 {
            return Ok(Vec::new());
        }
        Ok((1..points.len() - 1)
            .map(|i| [points[0], points[i], points[i + 1]])
            .collect())
    }
}

/// A `width` x `height` frame with solid squares painted at `squares`.
pub fn frame_with_squares(width: u32, height: u32, squares: &[(Rect, Rgb<u8>)]) -> RgbImage {
    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);
    for (rect, color) in squares {
        for y in rect.y as u32..(rect.y + rect.height) as u32 {
            for x in rect.x as u32..(rect.x + rect.width) as u32 {
                img.put_pixel(x, y, *color);
            }
        }
    }
    img
}

pub fn square(x: f32, y: f32) -> Rect {
    Rect::new(x, y, 20.0, 20.0)
}
