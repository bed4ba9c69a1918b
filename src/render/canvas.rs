use image::RgbaImage;
use kurbo::PathSeg;
use thiserror::Error;
use vello_cpu::kurbo::{Cap, Stroke};
use vello_cpu::peniko::{BlendMode, Compose, Mix};

use super::curve::Segment;
use crate::color::Rgba;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("canvas {width}x{height} exceeds the 65535 pixel limit per side")]
pub struct CanvasSizeError {
    pub width: u32,
    pub height: u32,
}

/// Persistent raster the whole run draws into.
///
/// Pixels are premultiplied RGBA in 0.0-1.0, row-major. Float storage keeps
/// slow fades from stalling on 8-bit rounding. Strokes are rasterized by
/// vello_cpu into a scratch pixmap and then added onto the float pixels.
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<[f32; 4]>,
    strokes: vello_cpu::Pixmap,
}

impl Canvas {
    /// Fully transparent canvas.
    pub fn new(width: u32, height: u32) -> Result<Self, CanvasSizeError> {
        let too_large = || CanvasSizeError { width, height };
        let w: u16 = width.try_into().map_err(|_| too_large())?;
        let h: u16 = height.try_into().map_err(|_| too_large())?;
        Ok(Self {
            width,
            height,
            pixels: vec![[0.0; 4]; width as usize * height as usize],
            strokes: vello_cpu::Pixmap::new(w, h),
        })
    }

    #[cfg(test)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[cfg(test)]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> [f32; 4] {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Source-over fill of the whole canvas with `color`'s RGB at `alpha`.
    ///
    /// `alpha = 1` replaces every pixel, `alpha = 0` leaves the canvas untouched.
    pub fn fill_over(&mut self, color: Rgba, alpha: f32) {
        let src = color.premultiplied_with_alpha(alpha);
        if src[3] <= 0.0 {
            return;
        }
        let inv = 1.0 - src[3];
        for px in &mut self.pixels {
            for c in 0..4 {
                px[c] = src[c] + px[c] * inv;
            }
        }
    }

    /// Additively stroke `segments` with `color`, each at its own alpha times
    /// the color's alpha.
    ///
    /// Every segment is its own `plus` layer, so overlapping segments brighten
    /// like canvas `lighter` while a single segment never adds onto itself.
    pub fn stroke_additive(&mut self, segments: &[Segment], line_width: f64, color: Rgba) {
        if segments.is_empty() || line_width <= 0.0 || color.a == 0 {
            return;
        }
        self.strokes.data_as_u8_slice_mut().fill(0);

        let mut ctx = vello_cpu::RenderContext::new(self.strokes.width(), self.strokes.height());
        ctx.set_stroke(Stroke::new(line_width).with_caps(Cap::Butt));
        let plus = BlendMode::new(Mix::Normal, Compose::Plus);
        let paint = vello_cpu::peniko::Color::from_rgba8(color.r, color.g, color.b, 255);
        let own_alpha = color.alpha();

        for segment in segments {
            let alpha = segment.alpha * own_alpha;
            if alpha <= 0.0 {
                continue;
            }
            ctx.set_paint(paint.with_alpha(alpha));
            ctx.push_blend_layer(plus);
            ctx.stroke_path(&segment_to_cpu(&segment.path));
            ctx.pop_layer();
        }
        ctx.flush();
        ctx.render_to_pixmap(&mut self.strokes);

        for (px, src) in self
            .pixels
            .iter_mut()
            .zip(self.strokes.data_as_u8_slice().chunks_exact(4))
        {
            if src[3] == 0 {
                continue;
            }
            for c in 0..4 {
                px[c] = (px[c] + src[c] as f32 / 255.0).min(1.0);
            }
        }
    }

    /// Straight-alpha 8-bit snapshot of the current raster.
    pub fn to_image(&self) -> RgbaImage {
        let mut img = RgbaImage::new(self.width, self.height);
        for (dst, src) in img.pixels_mut().zip(&self.pixels) {
            let a = src[3];
            let unpremul = |v: f32| if a > 0.0 { (v / a).clamp(0.0, 1.0) } else { 0.0 };
            dst.0 = [
                to_u8(unpremul(src[0])),
                to_u8(unpremul(src[1])),
                to_u8(unpremul(src[2])),
                to_u8(a),
            ];
        }
        img
    }
}

fn point_to_cpu(p: kurbo::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn segment_to_cpu(seg: &PathSeg) -> vello_cpu::kurbo::BezPath {
    let mut out = vello_cpu::kurbo::BezPath::new();
    match *seg {
        PathSeg::Line(l) => {
            out.move_to(point_to_cpu(l.p0));
            out.line_to(point_to_cpu(l.p1));
        }
        PathSeg::Quad(q) => {
            out.move_to(point_to_cpu(q.p0));
            out.quad_to(point_to_cpu(q.p1), point_to_cpu(q.p2));
        }
        PathSeg::Cubic(c) => {
            out.move_to(point_to_cpu(c.p0));
            out.curve_to(point_to_cpu(c.p1), point_to_cpu(c.p2), point_to_cpu(c.p3));
        }
    }
    out
}

fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{CubicBez, Line};

    const GREY: Rgba = Rgba::new(128, 128, 128, 255);

    fn canvas(width: u32, height: u32) -> Canvas {
        Canvas::new(width, height).unwrap()
    }

    fn line(x0: f64, y0: f64, x1: f64, y1: f64, alpha: f32) -> Segment {
        Segment {
            path: PathSeg::Line(Line::new((x0, y0), (x1, y1))),
            alpha,
        }
    }

    fn lit(canvas: &Canvas) -> usize {
        (0..canvas.height())
            .flat_map(|y| (0..canvas.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| canvas.pixel(x, y)[0] > 0.0)
            .count()
    }

    #[test]
    fn rejects_sizes_beyond_pixmap_limit() {
        assert_eq!(
            Canvas::new(70_000, 10).err(),
            Some(CanvasSizeError { width: 70_000, height: 10 })
        );
        assert!(Canvas::new(10, 65_536).is_err());
    }

    #[test]
    fn opaque_fill_replaces_everything() {
        let mut canvas = canvas(4, 4);
        canvas.fill_over(Rgba::WHITE, 1.0);
        canvas.fill_over(Rgba::BLACK, 1.0);
        assert_eq!(canvas.pixel(2, 2), [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn zero_alpha_fill_is_noop() {
        let mut canvas = canvas(4, 4);
        canvas.fill_over(Rgba::WHITE, 1.0);
        canvas.fill_over(Rgba::BLACK, 0.0);
        assert_eq!(canvas.pixel(0, 0), [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn partial_fill_fades_toward_color() {
        let mut canvas = canvas(2, 2);
        canvas.fill_over(Rgba::WHITE, 1.0);
        canvas.fill_over(Rgba::BLACK, 0.25);
        let [r, _, _, a] = canvas.pixel(1, 1);
        assert!((r - 0.75).abs() < 1e-6);
        assert!((a - 1.0).abs() < 1e-6);
    }

    #[test]
    fn stroke_lights_pixels_along_the_line_only() {
        let mut canvas = canvas(20, 20);
        canvas.fill_over(Rgba::BLACK, 1.0);
        canvas.stroke_additive(&[line(2.0, 10.5, 18.0, 10.5, 1.0)], 1.0, Rgba::WHITE);
        assert!(canvas.pixel(10, 10)[0] > 0.9);
        assert_eq!(canvas.pixel(10, 2)[0], 0.0);
        assert_eq!(canvas.pixel(10, 18)[0], 0.0);
    }

    #[test]
    fn curved_segment_follows_its_bulge() {
        let arch = Segment {
            path: PathSeg::Cubic(CubicBez::new((2.0, 30.0), (10.0, 2.0), (30.0, 2.0), (38.0, 30.0))),
            alpha: 1.0,
        };
        let mut canvas = canvas(40, 40);
        canvas.stroke_additive(&[arch], 1.0, Rgba::WHITE);
        // apex sits at y = 9, well above the chord at y = 30
        let apex: f32 = (6..12).map(|y| canvas.pixel(20, y)[0]).sum();
        assert!(apex > 0.8, "apex coverage {apex}");
        assert_eq!(canvas.pixel(20, 30)[0], 0.0);
    }

    #[test]
    fn separate_calls_accumulate_additively() {
        let seg = [line(0.0, 5.5, 10.0, 5.5, 0.25)];
        let mut canvas = canvas(10, 10);
        canvas.fill_over(Rgba::BLACK, 1.0);
        canvas.stroke_additive(&seg, 1.0, GREY);
        let once = canvas.pixel(5, 5)[0];
        canvas.stroke_additive(&seg, 1.0, GREY);
        let twice = canvas.pixel(5, 5)[0];
        assert!(once > 0.0);
        assert!((twice - 2.0 * once).abs() < 1e-5);
    }

    #[test]
    fn crossing_segments_add_instead_of_covering() {
        let mut canvas = canvas(12, 12);
        canvas.fill_over(Rgba::BLACK, 1.0);
        let cross = [line(0.0, 5.5, 12.0, 5.5, 0.5), line(5.5, 0.0, 5.5, 12.0, 0.5)];
        canvas.stroke_additive(&cross, 1.0, GREY);
        let single = canvas.pixel(2, 5)[0];
        let both = canvas.pixel(5, 5)[0];
        assert!(single > 0.2);
        // source-over would give 1.5x here
        assert!((both - 2.0 * single).abs() < 2.0 / 255.0, "{both} vs {single}");
    }

    #[test]
    fn foreground_alpha_scales_segment_alpha() {
        let seg = [line(0.0, 3.5, 8.0, 3.5, 1.0)];
        let mut full = canvas(8, 8);
        full.stroke_additive(&seg, 1.0, Rgba::WHITE);
        let mut half = canvas(8, 8);
        half.stroke_additive(&seg, 1.0, Rgba::new(255, 255, 255, 128));
        let ratio = half.pixel(4, 3)[3] / full.pixel(4, 3)[3];
        assert!((ratio - 0.5).abs() < 0.02, "ratio {ratio}");
    }

    #[test]
    fn additive_result_saturates() {
        let mut canvas = canvas(4, 4);
        canvas.fill_over(Rgba::WHITE, 1.0);
        canvas.stroke_additive(&[line(0.0, 1.5, 4.0, 1.5, 1.0)], 1.0, Rgba::WHITE);
        assert_eq!(canvas.pixel(2, 1), [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn wider_lines_cover_more_pixels() {
        let seg = [line(5.0, 20.0, 35.0, 20.0, 1.0)];
        let mut thin = canvas(40, 40);
        thin.stroke_additive(&seg, 1.0, Rgba::WHITE);
        let mut thick = canvas(40, 40);
        thick.stroke_additive(&seg, 6.0, Rgba::WHITE);
        assert!(lit(&thick) > lit(&thin) * 2);
    }

    #[test]
    fn off_canvas_stroke_is_ignored() {
        let mut canvas = canvas(8, 8);
        canvas.stroke_additive(&[line(-50.0, -50.0, -20.0, -40.0, 1.0)], 2.0, Rgba::WHITE);
        assert_eq!(lit(&canvas), 0);
    }

    #[test]
    fn image_export_unpremultiplies() {
        let mut canvas = canvas(1, 1);
        canvas.fill_over(Rgba::new(255, 0, 0, 255), 0.5);
        let img = canvas.to_image();
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 128]);
    }
}
