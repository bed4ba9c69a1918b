pub mod canvas;
pub mod curve;
pub mod frame;
pub mod mapper;
pub mod sequencer;

use crate::color::Rgba;
use curve::Interpolation;

/// Validated per-run drawing parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub line_width: f64,
    pub fg_color: Rgba,
    pub bg_color: Rgba,
    /// Background overdraw opacity applied once per frame, 0.0-1.0.
    pub fade: f32,
    pub interpolation: Interpolation,
}
