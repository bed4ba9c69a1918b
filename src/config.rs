use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::cli::Cli;
use crate::color::{ColorParseError, Rgba};
use crate::render::curve::Interpolation;
use crate::render::RenderSettings;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub style: StyleConfig,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_resolution")]
    pub resolution: String,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_video_codec")]
    pub video_codec: String,
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,
}

#[derive(Debug, Deserialize)]
pub struct StyleConfig {
    #[serde(default = "default_line_width")]
    pub line_width: f64,
    #[serde(default = "default_bg_color")]
    pub bg_color: String,
    #[serde(default = "default_fg_color")]
    pub fg_color: String,
    #[serde(default = "default_fade")]
    pub fade: f32,
    #[serde(default)]
    pub lineto: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            resolution: default_resolution(),
            fps: default_fps(),
            video_codec: default_video_codec(),
            audio_codec: default_audio_codec(),
        }
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            line_width: default_line_width(),
            bg_color: default_bg_color(),
            fg_color: default_fg_color(),
            fade: default_fade(),
            lineto: false,
        }
    }
}

fn default_resolution() -> String { "800x800".into() }
fn default_fps() -> u32 { 24 }
fn default_video_codec() -> String { "libx264".into() }
fn default_audio_codec() -> String { "aac".into() }
fn default_line_width() -> f64 { 1.0 }
fn default_bg_color() -> String { Rgba::BLACK.to_string() }
fn default_fg_color() -> String { Rgba::WHITE.to_string() }
fn default_fade() -> f32 { 0.3 }

#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("Invalid resolution \"{0}\": expected <width>x<height> with integers in 1-65535")]
    Resolution(String),
    #[error("Frame rate must be a positive integer")]
    FrameRate,
    #[error("Line width must be positive, got {0}")]
    LineWidth(f64),
    #[error("Fade must be within 0.0-1.0, got {0}")]
    Fade(f32),
    #[error("Invalid {field} color: {source}")]
    Color {
        field: &'static str,
        #[source]
        source: ColorParseError,
    },
}

/// Everything the run needs after CLI and file configuration are merged and checked.
#[derive(Debug, Clone)]
pub struct Settings {
    pub render: RenderSettings,
    pub video_codec: String,
    pub audio_codec: String,
}

impl Config {
    /// Overlay explicitly given CLI values; CLI wins over the file.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(ref r) = cli.resolution { self.output.resolution = r.clone(); }
        if let Some(fps) = cli.frame_rate { self.output.fps = fps; }
        if let Some(ref c) = cli.video_codec { self.output.video_codec = c.clone(); }
        if let Some(ref c) = cli.audio_codec { self.output.audio_codec = c.clone(); }
        if let Some(w) = cli.line_width { self.style.line_width = w; }
        if let Some(ref c) = cli.bg_color { self.style.bg_color = c.clone(); }
        if let Some(ref c) = cli.fg_color { self.style.fg_color = c.clone(); }
        if let Some(f) = cli.fade { self.style.fade = f; }
        if cli.lineto { self.style.lineto = true; }
    }

    pub fn validate(&self) -> Result<Settings, SettingsError> {
        let (width, height) = parse_resolution(&self.output.resolution)?;
        if self.output.fps == 0 {
            return Err(SettingsError::FrameRate);
        }
        let line_width = self.style.line_width;
        if !(line_width.is_finite() && line_width > 0.0) {
            return Err(SettingsError::LineWidth(line_width));
        }
        let fade = self.style.fade;
        if !(0.0..=1.0).contains(&fade) {
            return Err(SettingsError::Fade(fade));
        }
        let color = |field: &'static str, value: &str| {
            value
                .parse::<Rgba>()
                .map_err(|source| SettingsError::Color { field, source })
        };

        Ok(Settings {
            render: RenderSettings {
                width,
                height,
                fps: self.output.fps,
                line_width,
                fg_color: color("foreground", &self.style.fg_color)?,
                bg_color: color("background", &self.style.bg_color)?,
                fade,
                interpolation: if self.style.lineto {
                    Interpolation::Lines
                } else {
                    Interpolation::Spline
                },
            },
            video_codec: self.output.video_codec.clone(),
            audio_codec: self.output.audio_codec.clone(),
        })
    }
}

/// Parse `<width>x<height>`, both within 1-65535.
pub fn parse_resolution(s: &str) -> Result<(u32, u32), SettingsError> {
    let err = || SettingsError::Resolution(s.to_string());
    let (w, h) = s.trim().split_once(['x', 'X']).ok_or_else(err)?;
    let w: u16 = w.parse().map_err(|_| err())?;
    let h: u16 = h.parse().map_err(|_| err())?;
    if w == 0 || h == 0 {
        return Err(err());
    }
    Ok((w.into(), h.into()))
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse config: {}", path.display()))
}

/// Explicit path, else `ravscope.toml` in the working directory, else the user config dirs.
pub fn discover(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from("ravscope.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("ravscope").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("ravscope").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}
