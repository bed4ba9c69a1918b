//! Per-frame curve construction: how consecutive screen points are joined and
//! how bright each joining segment is drawn.

use kurbo::{CubicBez, Line, PathSeg, Point};

use super::mapper::ScreenPoint;

/// Cardinal spline tension used for every frame.
pub const TENSION: f64 = 1.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Interpolation {
    /// Cubic cardinal spline through every point.
    #[default]
    Spline,
    /// Straight segments between consecutive points.
    Lines,
}

/// One stroked piece of the frame curve, from `points[i]` to `points[i + 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub path: PathSeg,
    pub alpha: f32,
}

/// Bézier control points of the cardinal spline segment `p1 -> p2`.
pub fn control_points(p0: Point, p1: Point, p2: Point, p3: Point, tension: f64) -> (Point, Point) {
    let k = tension / 6.0;
    let cp1 = p1 + (p2 - p0) * k;
    let cp2 = p2 - (p3 - p1) * k;
    (cp1, cp2)
}

/// Beam intensity for a segment: fast sweeps (long jumps) are dimmer.
///
/// `min(1, K / (|dx| + |dy|))` with `K = (width + height) / 4`; a zero-length
/// segment is fully opaque.
pub fn segment_alpha(p1: Point, p2: Point, width: u32, height: u32) -> f32 {
    let manhattan = (p2.x - p1.x).abs() + (p2.y - p1.y).abs();
    if manhattan <= 0.0 {
        return 1.0;
    }
    let k = (width as f64 + height as f64) / 4.0;
    (k / manhattan).min(1.0) as f32
}

/// Join `points` into segments. Fewer than two points yields nothing.
///
/// Neighbours outside the slice are clamped to the first/last point, so the
/// spline formula needs no special case at either end.
pub fn build_segments(
    points: &[ScreenPoint],
    mode: Interpolation,
    tension: f64,
    width: u32,
    height: u32,
) -> Vec<Segment> {
    if points.len() < 2 {
        return Vec::new();
    }
    let last = points.len() - 1;
    let at = |i: usize| -> Point { points[i].into() };

    (0..last)
        .map(|i| {
            let p1 = at(i);
            let p2 = at(i + 1);
            let path = match mode {
                Interpolation::Lines => PathSeg::Line(Line::new(p1, p2)),
                Interpolation::Spline => {
                    let p0 = at(i.saturating_sub(1));
                    let p3 = at((i + 2).min(last));
                    let (cp1, cp2) = control_points(p0, p1, p2, p3, tension);
                    PathSeg::Cubic(CubicBez::new(p1, cp1, cp2, p2))
                }
            };
            Segment {
                path,
                alpha: segment_alpha(p1, p2, width, height),
            }
        })
        .collect()
}
