mod audio;
mod cli;
mod color;
mod config;
mod encode;
mod render;

use anyhow::{Context, Result};
use clap::Parser;

use audio::window::{frame_count, pad_width};
use cli::Cli;
use config::Config;
use encode::ffmpeg::{launch_player, FfmpegEncoder};
use encode::frames::{default_frames_dir, PngSequence};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    let mut cfg = Config::default();
    if let Some(path) = config::discover(cli.config.as_deref()) {
        match config::load_config(&path) {
            Ok(loaded) => {
                log::info!("Loaded config from {}", path.display());
                cfg = loaded;
            }
            Err(err) => log::warn!("Ignoring config: {:#}", err),
        }
    }
    cfg.apply_cli(&cli);
    let settings = cfg.validate().context("Invalid configuration")?;

    let input = cli
        .input_path()
        .context("No input file given (pass it as an argument or with --input)")?;
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let r = &settings.render;
    log::info!("ravscope - audio oscilloscope renderer");
    log::info!("Input: {}", input.display());
    log::info!("Output: {}", cli.output.display());
    log::info!("Resolution: {}x{} @ {}fps", r.width, r.height, r.fps);
    log::info!(
        "Style: line={} fg={} bg={} fade={} interpolation={:?}",
        r.line_width, r.fg_color, r.bg_color, r.fade, r.interpolation
    );

    // 1. Decode audio
    log::info!("Decoding audio...");
    let signal = audio::decode::decode_stereo(input)?;

    // 2. Prepare the frames directory
    let total_frames = frame_count(signal.total_samples(), signal.sample_rate, r.fps);
    let frames_dir = cli
        .frames_dir
        .clone()
        .unwrap_or_else(|| default_frames_dir(&cli.output));
    let mut frames = PngSequence::prepare(&frames_dir, pad_width(total_frames))?;

    // 3. Render loop
    let written = render::sequencer::render_sequence(&signal, r, &mut frames)?;
    log::info!("Wrote {} frames to {}", written, frames.dir().display());

    if cli.no_video {
        log::info!("Skipping video encoding (--no-video)");
        return Ok(());
    }

    // 4. Encode
    let encoder = FfmpegEncoder {
        frames_pattern: frames.pattern(),
        input_audio: input.to_path_buf(),
        output: cli.output.clone(),
        fps: r.fps,
        video_codec: settings.video_codec.clone(),
        audio_codec: settings.audio_codec.clone(),
        extra_args: cli.ffmpeg_args.clone(),
    };
    encoder.run()?;

    if cli.show_after {
        launch_player(&cli.output);
    }

    log::info!("Done! Output: {}", cli.output.display());
    Ok(())
}
