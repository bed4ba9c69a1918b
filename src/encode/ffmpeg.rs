use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Muxes a numbered frame sequence with the original audio.
#[derive(Clone, Debug)]
pub struct FfmpegEncoder {
    pub frames_pattern: PathBuf,
    pub input_audio: PathBuf,
    pub output: PathBuf,
    pub fps: u32,
    pub video_codec: String,
    pub audio_codec: String,
    /// Passed through verbatim, just before the output path.
    pub extra_args: Vec<String>,
}

impl FfmpegEncoder {
    pub fn args(&self) -> Vec<OsString> {
        let fps = self.fps.to_string();
        let mut args: Vec<OsString> = vec![
            "-y".into(),
            "-r".into(), fps.clone().into(),
            "-i".into(), self.frames_pattern.clone().into(),
            "-i".into(), self.input_audio.clone().into(),
            "-c:v".into(), self.video_codec.clone().into(),
            "-c:a".into(), self.audio_codec.clone().into(),
            "-r".into(), fps.into(),
            "-pix_fmt".into(), "yuv420p".into(),
            "-map".into(), "0:v".into(),
            "-map".into(), "1:a".into(),
        ];
        args.extend(self.extra_args.iter().map(OsString::from));
        args.push(self.output.clone().into());
        args
    }

    /// Run ffmpeg to completion; a non-zero exit is an error carrying its stderr.
    pub fn run(&self) -> Result<()> {
        log::info!(
            "FFmpeg encoding: {} + {} -> {} @ {}fps, video={}, audio={}",
            self.frames_pattern.display(),
            self.input_audio.display(),
            self.output.display(),
            self.fps,
            self.video_codec,
            self.audio_codec
        );
        log::debug!("ffmpeg {:?}", self.args());

        let output = Command::new("ffmpeg")
            .args(self.args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .context("Failed to spawn ffmpeg. Is ffmpeg installed?")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("FFmpeg exited with {}:\n{}", output.status, stderr);
        }

        log::info!("FFmpeg encoding complete");
        Ok(())
    }
}

/// Open the finished video in ffplay without waiting for it.
pub fn launch_player(video: &Path) {
    match Command::new("ffplay")
        .arg(video)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(_) => log::info!("Launched ffplay for {}", video.display()),
        Err(err) => log::warn!("Failed to launch ffplay: {}", err),
    }
}
