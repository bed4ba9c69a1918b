use anyhow::{bail, Context, Result};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Decoded two-channel signal with de-interleaved, normalized samples.
pub struct StereoSignal {
    pub left: Vec<f32>,
    pub right: Vec<f32>,
    pub sample_rate: u32,
}

impl StereoSignal {
    pub fn new(left: Vec<f32>, right: Vec<f32>, sample_rate: u32) -> Result<Self> {
        if left.len() != right.len() {
            bail!(
                "Channel length mismatch: left has {} samples, right has {}",
                left.len(),
                right.len()
            );
        }
        if sample_rate == 0 {
            bail!("Sample rate must be non-zero");
        }
        Ok(Self { left, right, sample_rate })
    }

    pub fn total_samples(&self) -> usize {
        self.left.len()
    }

    pub fn duration(&self) -> f64 {
        self.total_samples() as f64 / self.sample_rate as f64
    }
}

pub fn decode_stereo(path: &Path) -> Result<StereoSignal> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open audio file: {}", path.display()))?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .context("Failed to probe audio format")?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .context("No audio tracks found")?;

    let track_id = track.id;
    let mut channels = track.codec_params.channels.map(|c| c.count());
    let sample_rate = track.codec_params.sample_rate.context("Unknown sample rate")?;

    // Reject before decoding anything when the container already tells us.
    if let Some(count) = channels {
        ensure_stereo(count)?;
    }

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Failed to create audio decoder")?;

    let mut left: Vec<f32> = Vec::new();
    let mut right: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
            Err(e) => return Err(e.into()),
        };

        let spec = *decoded.spec();
        if channels.is_none() {
            let count = spec.channels.count();
            ensure_stereo(count)?;
            channels = Some(count);
        }

        let num_frames = decoded.frames();
        let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);

        for frame in sample_buf.samples().chunks_exact(2) {
            left.push(frame[0]);
            right.push(frame[1]);
        }
    }

    let signal = StereoSignal::new(left, right, sample_rate)?;

    log::info!(
        "Decoded audio: {:.2}s, {}Hz, {} channels, {} samples",
        signal.duration(),
        signal.sample_rate,
        channels.unwrap_or(2),
        signal.total_samples()
    );

    Ok(signal)
}

fn ensure_stereo(channels: usize) -> Result<()> {
    if channels != 2 {
        bail!("Audio must have exactly 2 channels, found {}", channels);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_wav(name: &str, channels: u16, frames: &[i16]) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ravscope-decode-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let spec = hound::WavSpec {
            channels,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for &s in frames {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        path
    }

    #[test]
    fn decodes_and_splits_stereo_channels() {
        let interleaved: Vec<i16> = (0..200)
            .flat_map(|_| [16384i16, -16384i16])
            .collect();
        let path = write_wav("stereo.wav", 2, &interleaved);

        let signal = decode_stereo(&path).unwrap();
        assert_eq!(signal.sample_rate, 8000);
        assert_eq!(signal.total_samples(), 200);
        assert_eq!(signal.left.len(), signal.right.len());
        assert!(signal.left.iter().all(|&s| (s - 0.5).abs() < 1e-3));
        assert!(signal.right.iter().all(|&s| (s + 0.5).abs() < 1e-3));
        assert!((signal.duration() - 0.025).abs() < 1e-9);
    }

    #[test]
    fn rejects_mono() {
        let path = write_wav("mono.wav", 1, &[0i16; 100]);
        let err = decode_stereo(&path).err().unwrap();
        assert!(err.to_string().contains("exactly 2 channels"));
    }

    #[test]
    fn rejects_more_than_two_channels() {
        let path = write_wav("quad.wav", 4, &[0i16; 400]);
        assert!(decode_stereo(&path).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = decode_stereo(Path::new("/nonexistent/ravscope.wav")).err().unwrap();
        assert!(err.to_string().contains("Failed to open audio file"));
    }

    #[test]
    fn signal_requires_equal_channel_lengths() {
        assert!(StereoSignal::new(vec![0.0; 3], vec![0.0; 2], 44100).is_err());
        assert!(StereoSignal::new(vec![0.0; 3], vec![0.0; 3], 0).is_err());
    }
}
