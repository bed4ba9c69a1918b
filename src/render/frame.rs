use image::RgbaImage;

use super::canvas::{Canvas, CanvasSizeError};
use super::curve::{build_segments, TENSION};
use super::mapper::ScreenPoint;
use super::RenderSettings;

/// Owns the persistent canvas and draws one frame at a time onto it.
///
/// The canvas is never cleared between frames: each frame first fades the
/// previous content toward the background, then adds its own curve.
pub struct FrameRenderer {
    settings: RenderSettings,
    canvas: Canvas,
}

impl FrameRenderer {
    pub fn new(settings: RenderSettings) -> Result<Self, CanvasSizeError> {
        let mut canvas = Canvas::new(settings.width, settings.height)?;
        canvas.fill_over(settings.bg_color, settings.bg_color.alpha());
        Ok(Self { settings, canvas })
    }

    /// Fade, then stroke the curve through `points`.
    ///
    /// Fewer than two points still fades the canvas.
    pub fn render(&mut self, points: &[ScreenPoint]) {
        let s = &self.settings;
        self.canvas.fill_over(s.bg_color, s.fade);

        let segments = build_segments(points, s.interpolation, TENSION, s.width, s.height);
        self.canvas.stroke_additive(&segments, s.line_width, s.fg_color);
    }

    #[cfg(test)]
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn snapshot(&self) -> RgbaImage {
        self.canvas.to_image()
    }
}
