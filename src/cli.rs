use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "ravscope",
    about = "Render stereo audio as an X-Y oscilloscope video",
    after_help = "Arguments after `--` are passed to ffmpeg verbatim, before the output path:\n  \
        ffmpeg -y -r <fps> -i <frames> -i <input> -c:v <video_codec> -c:a <audio_codec> \\\n    \
        -r <fps> -pix_fmt yuv420p -map 0:v -map 1:a [FFMPEG_OPTIONS] <output>"
)]
pub struct Cli {
    /// Input audio file (must have exactly 2 channels)
    #[arg(value_name = "INPUT", conflicts_with = "input")]
    pub input_pos: Option<PathBuf>,

    /// Input audio file, as an alternative to the positional argument
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output video file; the extension selects the container
    #[arg(short, long, default_value = "output.mp4")]
    pub output: PathBuf,

    /// Resolution as <width>x<height> [default: 800x800]
    #[arg(short = 's', long)]
    pub resolution: Option<String>,

    /// Frames per second [default: 24]
    #[arg(short = 'r', long)]
    pub frame_rate: Option<u32>,

    /// Stroke width in pixels [default: 1]
    #[arg(short, long)]
    pub line_width: Option<f64>,

    /// Background color as #rrggbb or #rrggbbaa [default: #000000]
    #[arg(short, long)]
    pub bg_color: Option<String>,

    /// Stroke color as #rrggbb or #rrggbbaa [default: #ffffff]
    #[arg(short, long)]
    pub fg_color: Option<String>,

    /// Background overdraw per frame, 0.0 (endless trail) to 1.0 (no trail) [default: 0.3]
    #[arg(short = 'd', long)]
    pub fade: Option<f32>,

    /// Connect points with straight lines instead of splines
    #[arg(short = 'p', long)]
    pub lineto: bool,

    /// FFmpeg video codec [default: libx264]
    #[arg(short, long)]
    pub video_codec: Option<String>,

    /// FFmpeg audio codec [default: aac]
    #[arg(short, long)]
    pub audio_codec: Option<String>,

    /// Only render frames; do not run ffmpeg
    #[arg(short, long)]
    pub no_video: bool,

    /// Open the result in ffplay after encoding
    #[arg(short = 'w', long)]
    pub show_after: bool,

    /// Directory for rendered frames [default: frames_<output with / \ . replaced by _>]
    #[arg(long)]
    pub frames_dir: Option<PathBuf>,

    /// Config file (defaults to ravscope.toml or ~/.config/ravscope/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Extra ffmpeg options
    #[arg(last = true)]
    pub ffmpeg_args: Vec<String>,
}

impl Cli {
    /// The input file, whichever form it was given in.
    pub fn input_path(&self) -> Option<&Path> {
        self.input_pos.as_deref().or(self.input.as_deref())
    }
}
