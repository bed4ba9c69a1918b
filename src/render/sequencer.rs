use anyhow::{Context, Result};
use image::RgbaImage;
use indicatif::{ProgressBar, ProgressStyle};

use super::frame::FrameRenderer;
use super::mapper::map_window;
use super::RenderSettings;
use crate::audio::decode::StereoSignal;
use crate::audio::window::{frame_count, sample_window};

/// Destination for rendered frames, called in strictly increasing index order.
pub trait FrameSink {
    fn write_frame(&mut self, index: usize, image: &RgbaImage) -> Result<()>;
}

/// Render every frame of `signal` in order and hand each one to `sink`.
///
/// Returns the number of frames written. Any sink error aborts the run.
pub fn render_sequence(
    signal: &StereoSignal,
    settings: &RenderSettings,
    sink: &mut dyn FrameSink,
) -> Result<usize> {
    let total_frames = frame_count(signal.total_samples(), signal.sample_rate, settings.fps);

    let mut renderer = FrameRenderer::new(settings.clone())?;
    let mut points = Vec::new();

    let pb = ProgressBar::new(total_frames as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} frames ({eta} remaining)")
            .context("Invalid progress bar template")?
            .progress_chars("=>-"),
    );

    log::info!("Rendering {} frames...", total_frames);
    for frame_idx in 0..total_frames {
        let window = sample_window(frame_idx, signal.sample_rate, settings.fps, signal.total_samples());
        log::debug!("Frame {}: samples {}..{}", frame_idx, window.start, window.end);

        map_window(signal, window, settings.width, settings.height, &mut points);
        renderer.render(&points);
        sink.write_frame(frame_idx, &renderer.snapshot())
            .with_context(|| format!("Failed to write frame {}", frame_idx))?;

        pb.set_position(frame_idx as u64 + 1);
    }

    pb.finish_with_message("Rendering complete");
    Ok(total_frames)
}
