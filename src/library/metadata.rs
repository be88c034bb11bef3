use std::fs;
use std::path::Path;
use std::time::Duration;

use lofty::file::{AudioFile, FileType, TaggedFileExt};

use crate::error::{Result, ShelfError};

use super::model::AudioMetadata;
use super::mpeg;

/// Size of `path` in bytes, straight from the filesystem.
pub fn file_size(path: &Path) -> Result<u64> {
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| ShelfError::from_io(format!("stat {}", path.display()), path, e))
}

/// Playback duration parsed from the audio container header.
///
/// Empty, truncated or unrecognized files fail with [`ShelfError::Metadata`].
/// Truncation is only detected for MPEG streams, by walking their frames.
pub fn read_duration(path: &Path) -> Result<Duration> {
    if file_size(path)? == 0 {
        return Err(ShelfError::metadata(path, "file is empty"));
    }

    let tagged = lofty::read_from_path(path).map_err(|e| ShelfError::metadata(path, e.to_string()))?;
    if tagged.file_type() == FileType::Mpeg {
        let bytes = fs::read(path)
            .map_err(|e| ShelfError::from_io(format!("reading {}", path.display()), path, e))?;
        mpeg::check_complete(&bytes).map_err(|reason| ShelfError::metadata(path, reason))?;
    }
    Ok(tagged.properties().duration())
}

/// Read both size and duration of `path`.
pub fn read_metadata(path: &Path) -> Result<AudioMetadata> {
    let size_bytes = file_size(path)?;
    let duration = read_duration(path)?;
    Ok(AudioMetadata {
        duration,
        size_bytes,
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// MPEG-1 Layer III, 128 kbit/s, 44.1 kHz, joint stereo, no padding.
    const FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0x64];
    /// 144 * 128_000 / 44_100
    const FRAME_LEN: usize = 417;
    const SAMPLES_PER_FRAME: f64 = 1152.0;
    const SAMPLE_RATE: f64 = 44_100.0;

    /// A silent constant-bitrate MP3 stream made of `frames` frames.
    pub fn mp3_frames(frames: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(frames * FRAME_LEN);
        for _ in 0..frames {
            out.extend_from_slice(&FRAME_HEADER);
            out.resize(out.len() + FRAME_LEN - FRAME_HEADER.len(), 0);
        }
        out
    }

    pub fn mp3_seconds(frames: usize) -> f64 {
        frames as f64 * SAMPLES_PER_FRAME / SAMPLE_RATE
    }
}
