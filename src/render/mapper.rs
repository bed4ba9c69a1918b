use std::ops::Range;

use rayon::prelude::*;

use crate::audio::decode::StereoSignal;

/// A sample pair in canvas pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<ScreenPoint> for kurbo::Point {
    fn from(p: ScreenPoint) -> Self {
        kurbo::Point::new(p.x, p.y)
    }
}

/// Left channel drives x, right channel drives y (positive is up).
pub fn map_sample(left: f32, right: f32, width: u32, height: u32) -> ScreenPoint {
    let half_w = width as f64 / 2.0;
    let half_h = height as f64 / 2.0;
    ScreenPoint::new(half_w + left as f64 * half_w, half_h - right as f64 * half_h)
}

/// Map the samples in `window` into `out`, replacing its contents.
///
/// Only one frame's points are alive at a time; `out` keeps its allocation
/// across frames.
pub fn map_window(
    signal: &StereoSignal,
    window: Range<usize>,
    width: u32,
    height: u32,
    out: &mut Vec<ScreenPoint>,
) {
    signal.left[window.clone()]
        .par_iter()
        .zip(signal.right[window].par_iter())
        .map(|(&l, &r)| map_sample(l, r, width, height))
        .collect_into_vec(out);
}
