//! Frame timing: which samples belong to which output frame, and how frame
//! artifacts are named so that lexical order equals frame order.

use std::ops::Range;

/// Number of frames needed to cover the signal, `ceil(duration * fps)`.
pub fn frame_count(total_samples: usize, sample_rate: u32, fps: u32) -> usize {
    if sample_rate == 0 {
        return 0;
    }
    let numerator = total_samples as u64 * fps as u64;
    numerator.div_ceil(sample_rate as u64) as usize
}

/// Sample range `[start, end)` for `frame_index`, clamped to the signal length.
///
/// The range may be empty (degenerate windows at very low sample rates, or
/// past the end of the signal); callers draw nothing for those frames.
pub fn sample_window(
    frame_index: usize,
    sample_rate: u32,
    fps: u32,
    total_samples: usize,
) -> Range<usize> {
    let boundary = |i: usize| -> usize {
        let at = i as u64 * sample_rate as u64 / fps.max(1) as u64;
        at.min(total_samples as u64) as usize
    };
    let start = boundary(frame_index);
    let end = boundary(frame_index + 1);
    start..end.max(start)
}

/// Digits needed to zero-pad frame indices `0..frames`, `ceil(log10(frames))`.
pub fn pad_width(frames: usize) -> usize {
    if frames <= 1 {
        0
    } else {
        ((frames - 1).ilog10() + 1) as usize
    }
}

pub fn frame_file_name(index: usize, pad: usize) -> String {
    format!("frame{:0width$}.png", index, width = pad)
}

/// printf-style pattern matching [`frame_file_name`], as consumed by ffmpeg's image2 demuxer.
pub fn frame_glob_pattern(pad: usize) -> String {
    format!("frame%0{}d.png", pad.max(1))
}
