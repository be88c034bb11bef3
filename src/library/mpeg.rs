//! MPEG audio frame walk.
//!
//! `lofty` estimates a constant-bitrate duration from the stream length, so a
//! file cut in the middle of a frame still reports a full duration. Walking
//! the frame headers catches that: the last frame must end exactly where the
//! audio data does (end of file, or the start of a trailing ID3v1/APEv2 tag).

const ID3V2_HEADER_LEN: usize = 10;
const ID3V1_LEN: usize = 128;
const APE_FOOTER_LEN: usize = 32;

/// Bitrates in kbit/s, indexed by the 4-bit header field (0 = free, 15 = bad).
const MPEG1_L1: [u32; 15] = [0, 32, 64, 96, 128, 160, 192, 224, 256, 288, 320, 352, 384, 416, 448];
const MPEG1_L2: [u32; 15] = [0, 32, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 384];
const MPEG1_L3: [u32; 15] = [0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320];
const MPEG2_L1: [u32; 15] = [0, 32, 48, 56, 64, 80, 96, 112, 128, 144, 160, 176, 192, 224, 256];
const MPEG2_L23: [u32; 15] = [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160];

#[derive(Debug, PartialEq, Eq)]
enum Header {
    /// A frame of the given length in bytes.
    Frame(usize),
    /// Free-format bitrate: the frame length cannot be derived from the header.
    FreeFormat,
}

fn is_sync(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[0] == 0xFF && bytes[1] & 0xE0 == 0xE0
}

fn parse_header(bytes: &[u8]) -> Option<Header> {
    if bytes.len() < 4 || !is_sync(bytes) {
        return None;
    }
    let version = (bytes[1] >> 3) & 0b11; // 0 = 2.5, 1 = reserved, 2 = 2, 3 = 1
    let layer = (bytes[1] >> 1) & 0b11; // 1 = III, 2 = II, 3 = I
    let bitrate_index = (bytes[2] >> 4) as usize;
    let rate_index = ((bytes[2] >> 2) & 0b11) as usize;
    let padding = ((bytes[2] >> 1) & 1) as usize;

    if version == 1 || layer == 0 || bitrate_index == 15 || rate_index == 3 {
        return None;
    }
    if bitrate_index == 0 {
        return Some(Header::FreeFormat);
    }

    let mpeg1 = version == 3;
    let table = match (mpeg1, layer) {
        (true, 3) => &MPEG1_L1,
        (true, 2) => &MPEG1_L2,
        (true, _) => &MPEG1_L3,
        (false, 3) => &MPEG2_L1,
        (false, _) => &MPEG2_L23,
    };
    let bitrate = table[bitrate_index] as usize * 1000;
    let sample_rate = match version {
        3 => [44_100, 48_000, 32_000][rate_index],
        2 => [22_050, 24_000, 16_000][rate_index],
        _ => [11_025, 12_000, 8_000][rate_index],
    };

    let len = match layer {
        3 => (12 * bitrate / sample_rate + padding) * 4,
        1 if !mpeg1 => 72 * bitrate / sample_rate + padding,
        _ => 144 * bitrate / sample_rate + padding,
    };
    Some(Header::Frame(len))
}

/// Offset where the audio data starts, after any ID3v2 tag.
fn audio_start(bytes: &[u8]) -> usize {
    if bytes.len() < ID3V2_HEADER_LEN || &bytes[..3] != b"ID3" {
        return 0;
    }
    let size = bytes[6..10]
        .iter()
        .fold(0usize, |acc, b| (acc << 7) | (*b & 0x7F) as usize);
    let footer = if bytes[5] & 0x10 != 0 { ID3V2_HEADER_LEN } else { 0 };
    (ID3V2_HEADER_LEN + size + footer).min(bytes.len())
}

/// Offset where the audio data ends, before any ID3v1 and APEv2 tags.
fn audio_end(bytes: &[u8]) -> usize {
    let mut end = bytes.len();
    if end >= ID3V1_LEN && &bytes[end - ID3V1_LEN..end - ID3V1_LEN + 3] == b"TAG" {
        end -= ID3V1_LEN;
    }
    if end >= APE_FOOTER_LEN {
        let footer = &bytes[end - APE_FOOTER_LEN..end];
        if &footer[..8] == b"APETAGEX" {
            let size = u32::from_le_bytes([footer[12], footer[13], footer[14], footer[15]]) as usize;
            let flags = u32::from_le_bytes([footer[20], footer[21], footer[22], footer[23]]);
            let header = if flags & 0x8000_0000 != 0 { APE_FOOTER_LEN } else { 0 };
            end = end.saturating_sub(size + header);
        }
    }
    end
}

/// Check that the MPEG stream in `bytes` is not cut inside its last frame.
///
/// Data after the last complete frame that does not look like a frame header
/// is accepted as trailing junk. Free-format streams are not checked.
pub fn check_complete(bytes: &[u8]) -> Result<(), String> {
    let start = audio_start(bytes);
    let end = audio_end(bytes).max(start);
    let data = &bytes[start..end];

    let Some(mut pos) = (0..data.len()).find(|&i| parse_header(&data[i..]).is_some()) else {
        return Err("no MPEG frame header found".to_string());
    };

    while pos < data.len() {
        let rest = &data[pos..];
        match parse_header(rest) {
            Some(Header::Frame(len)) if len > rest.len() => {
                return Err(format!(
                    "truncated: frame at byte {} needs {len} bytes, {} left",
                    start + pos,
                    rest.len()
                ));
            }
            Some(Header::Frame(len)) if len > 0 => pos += len,
            Some(_) => return Ok(()),
            None if rest.len() < 4 && is_sync(rest) => {
                return Err(format!("truncated: partial frame header at byte {}", start + pos));
            }
            None => return Ok(()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::metadata::fixtures::mp3_frames;

    #[test]
    fn parses_mpeg1_layer3_frame_length() {
        assert_eq!(parse_header(&[0xFF, 0xFB, 0x90, 0x64]), Some(Header::Frame(417)));
        // Same header with the padding bit set.
        assert_eq!(parse_header(&[0xFF, 0xFB, 0x92, 0x64]), Some(Header::Frame(418)));
        assert_eq!(parse_header(&[0xFF, 0xFB, 0xF0, 0x64]), None);
        assert_eq!(parse_header(b"TAG!"), None);
    }

    #[test]
    fn whole_stream_is_complete() {
        assert!(check_complete(&mp3_frames(20)).is_ok());
    }

    #[test]
    fn stream_cut_inside_a_frame_is_rejected() {
        let mut bytes = mp3_frames(20);
        bytes.truncate(bytes.len() - 200);
        let err = check_complete(&bytes).unwrap_err();
        assert!(err.starts_with("truncated"), "{err}");

        let mut bytes = mp3_frames(20);
        bytes.truncate(417 * 19 + 2);
        assert!(check_complete(&bytes).is_err());
    }

    #[test]
    fn trailing_tags_do_not_count_as_audio() {
        let mut bytes = b"ID3\x03\x00\x00\x00\x00\x00\x05hello".to_vec();
        bytes.extend(mp3_frames(5));
        let mut id3v1 = vec![0u8; 128];
        id3v1[..3].copy_from_slice(b"TAG");
        bytes.extend(&id3v1);
        assert!(check_complete(&bytes).is_ok());

        // Cut the last frame, keep the ID3v1 tag.
        let mut cut = b"ID3\x03\x00\x00\x00\x00\x00\x05hello".to_vec();
        let frames = mp3_frames(5);
        cut.extend(&frames[..frames.len() - 10]);
        cut.extend(&id3v1);
        assert!(check_complete(&cut).is_err());
    }

    #[test]
    fn data_without_frames_is_rejected() {
        assert!(check_complete(b"not really audio").is_err());
    }
}
