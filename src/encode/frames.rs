use anyhow::{Context, Result};
use image::{ImageFormat, RgbaImage};
use std::path::{Path, PathBuf};

use crate::audio::window::{frame_file_name, frame_glob_pattern};
use crate::render::sequencer::FrameSink;

/// Scratch directory name derived from the output path, e.g.
/// `out/video.mp4` -> `frames_out_video_mp4`.
pub fn default_frames_dir(output: &Path) -> PathBuf {
    let flattened: String = output
        .to_string_lossy()
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '.') { '_' } else { c })
        .collect();
    PathBuf::from(format!("frames_{}", flattened))
}

/// Numbered PNG files in a freshly prepared directory.
pub struct PngSequence {
    dir: PathBuf,
    pad: usize,
}

impl PngSequence {
    /// Create `dir`, removing any previous contents first.
    pub fn prepare(dir: &Path, pad: usize) -> Result<Self> {
        if dir.exists() {
            log::info!("Cleaning frames directory {}", dir.display());
            std::fs::remove_dir_all(dir)
                .with_context(|| format!("Failed to clear frames directory: {}", dir.display()))?;
        } else {
            log::info!("Creating frames directory {}", dir.display());
        }
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create frames directory: {}", dir.display()))?;

        Ok(Self {
            dir: dir.to_path_buf(),
            pad,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.dir.join(frame_file_name(index, self.pad))
    }

    /// Input pattern for the encoder covering every frame in this sequence.
    pub fn pattern(&self) -> PathBuf {
        self.dir.join(frame_glob_pattern(self.pad))
    }
}

impl FrameSink for PngSequence {
    fn write_frame(&mut self, index: usize, image: &RgbaImage) -> Result<()> {
        let path = self.frame_path(index);
        image
            .save_with_format(&path, ImageFormat::Png)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}
