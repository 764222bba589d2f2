//! Joining per-chunk audio into one playable stream.
//!
//! Each TTS request returns a complete file: a WAV with its own RIFF header,
//! an MP3 possibly led by an ID3 tag, or an Ogg stream. Byte-appending WAV
//! files produces a header that lies about the data length, so each
//! container is handled on its own terms:
//!
//! * **WAV** (`LINEAR16`, `MULAW`, `ALAW`): parse every header, require
//!   identical `fmt ` parameters, write one new header over the joined data.
//! * **MP3**: frames are self-delimiting; require the same sample rate and
//!   drop the ID3v2 tags of every part after the first.
//! * **Ogg Opus**: each part is a complete logical stream; chained streams
//!   are valid Ogg, so the parts are appended after a magic check.

use crate::config::AudioEncoding;
use crate::error::SynthesisError;

/// Join audio parts produced for consecutive chunks of one text.
pub fn concat(encoding: AudioEncoding, parts: Vec<Vec<u8>>) -> Result<Vec<u8>, SynthesisError> {
    if parts.is_empty() {
        return Err(SynthesisError::AudioMismatch("no audio parts to join".into()));
    }
    if parts.len() == 1 {
        return Ok(parts.into_iter().next().unwrap_or_default());
    }

    match encoding {
        AudioEncoding::Linear16 | AudioEncoding::Mulaw | AudioEncoding::Alaw => concat_wav(&parts),
        AudioEncoding::Mp3 => concat_mp3(&parts),
        AudioEncoding::OggOpus => concat_ogg(&parts),
    }
}

// ── WAV ──────────────────────────────────────────────────────────────────

/// The `fmt ` fields that must agree for data sections to be joinable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavFormat {
    pub format_tag: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

struct WavParts<'a> {
    format: WavFormat,
    fmt_chunk: &'a [u8],
    data: &'a [u8],
}

fn read_u16(b: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([b[at], b[at + 1]])
}

fn read_u32(b: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
}

fn parse_wav(bytes: &[u8]) -> Result<WavParts<'_>, String> {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err("not a RIFF/WAVE file".into());
    }

    let mut pos = 12;
    let mut fmt: Option<(WavFormat, &[u8])> = None;
    let mut data: Option<&[u8]> = None;

    while pos + 8 <= bytes.len() {
        let id = &bytes[pos..pos + 4];
        let size = read_u32(bytes, pos + 4) as usize;
        let body_start = pos + 8;
        let body_end = body_start.saturating_add(size);

        match id {
            b"fmt " => {
                if size < 16 || body_end > bytes.len() {
                    return Err("truncated fmt chunk".into());
                }
                let body = &bytes[body_start..body_end];
                let format = WavFormat {
                    format_tag: read_u16(body, 0),
                    channels: read_u16(body, 2),
                    sample_rate: read_u32(body, 4),
                    bits_per_sample: read_u16(body, 14),
                };
                fmt = Some((format, body));
            }
            b"data" => {
                // Streaming encoders may write a placeholder size; trust the buffer.
                let end = body_end.min(bytes.len());
                data = Some(&bytes[body_start..end]);
                break;
            }
            _ => {}
        }

        pos = body_end.saturating_add(size & 1);
    }

    match (fmt, data) {
        (Some((format, fmt_chunk)), Some(data)) => Ok(WavParts {
            format,
            fmt_chunk,
            data,
        }),
        (None, _) => Err("missing fmt chunk".into()),
        (_, None) => Err("missing data chunk".into()),
    }
}

/// Read the `fmt ` parameters of a WAV buffer.
pub fn wav_format(bytes: &[u8]) -> Result<WavFormat, SynthesisError> {
    parse_wav(bytes)
        .map(|p| p.format)
        .map_err(SynthesisError::AudioMismatch)
}

fn concat_wav(parts: &[Vec<u8>]) -> Result<Vec<u8>, SynthesisError> {
    let parsed = parts
        .iter()
        .enumerate()
        .map(|(i, p)| {
            parse_wav(p).map_err(|e| SynthesisError::AudioMismatch(format!("part {}: {e}", i + 1)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let first = &parsed[0];
    for (i, part) in parsed.iter().enumerate().skip(1) {
        if part.format != first.format {
            return Err(SynthesisError::AudioMismatch(format!(
                "part {} has format {:?}, expected {:?}",
                i + 1,
                part.format,
                first.format
            )));
        }
    }

    let data_len: usize = parsed.iter().map(|p| p.data.len()).sum();
    let fmt_len = first.fmt_chunk.len();
    let pad = data_len & 1;
    let riff_len = 4 + (8 + fmt_len + (fmt_len & 1)) + (8 + data_len + pad);
    if riff_len > u32::MAX as usize {
        return Err(SynthesisError::AudioMismatch(
            "joined audio exceeds the 4 GiB WAV limit".into(),
        ));
    }

    let mut out = Vec::with_capacity(8 + riff_len);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(riff_len as u32).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&(fmt_len as u32).to_le_bytes());
    out.extend_from_slice(first.fmt_chunk);
    if fmt_len & 1 == 1 {
        out.push(0);
    }
    out.extend_from_slice(b"data");
    out.extend_from_slice(&(data_len as u32).to_le_bytes());
    for part in &parsed {
        out.extend_from_slice(part.data);
    }
    if pad == 1 {
        out.push(0);
    }
    Ok(out)
}

// ── MP3 ──────────────────────────────────────────────────────────────────

/// Bytes after a leading ID3v2 tag, or the whole buffer when there is none.
pub fn skip_id3v2(bytes: &[u8]) -> &[u8] {
    if bytes.len() < 10 || &bytes[0..3] != b"ID3" {
        return bytes;
    }
    let size = ((bytes[6] as usize & 0x7F) << 21)
        | ((bytes[7] as usize & 0x7F) << 14)
        | ((bytes[8] as usize & 0x7F) << 7)
        | (bytes[9] as usize & 0x7F);
    let footer = if bytes[5] & 0x10 != 0 { 10 } else { 0 };
    let end = (10 + size + footer).min(bytes.len());
    &bytes[end..]
}

/// Sample rate of the first valid MPEG audio frame header.
pub fn mp3_sample_rate(bytes: &[u8]) -> Option<u32> {
    let body = skip_id3v2(bytes);
    body.windows(4).find_map(|h| {
        if h[0] != 0xFF || h[1] & 0xE0 != 0xE0 {
            return None;
        }
        let version = (h[1] >> 3) & 0x03;
        let layer = (h[1] >> 1) & 0x03;
        let bitrate = h[2] >> 4;
        let rate_idx = ((h[2] >> 2) & 0x03) as usize;
        if version == 0b01 || layer == 0 || bitrate == 0x0F || rate_idx == 3 {
            return None;
        }
        let table: [u32; 3] = match version {
            0b11 => [44100, 48000, 32000],
            0b10 => [22050, 24000, 16000],
            _ => [11025, 12000, 8000],
        };
        Some(table[rate_idx])
    })
}

fn concat_mp3(parts: &[Vec<u8>]) -> Result<Vec<u8>, SynthesisError> {
    let mut expected: Option<u32> = None;
    for (i, part) in parts.iter().enumerate() {
        let rate = mp3_sample_rate(part).ok_or_else(|| {
            SynthesisError::AudioMismatch(format!("part {} contains no MPEG audio frame", i + 1))
        })?;
        match expected {
            None => expected = Some(rate),
            Some(r) if r != rate => {
                return Err(SynthesisError::AudioMismatch(format!(
                    "part {} is {rate} Hz, expected {r} Hz",
                    i + 1
                )));
            }
            Some(_) => {}
        }
    }

    let mut out = Vec::with_capacity(parts.iter().map(Vec::len).sum());
    out.extend_from_slice(&parts[0]);
    for part in &parts[1..] {
        out.extend_from_slice(skip_id3v2(part));
    }
    Ok(out)
}

// ── Ogg ──────────────────────────────────────────────────────────────────

fn concat_ogg(parts: &[Vec<u8>]) -> Result<Vec<u8>, SynthesisError> {
    for (i, part) in parts.iter().enumerate() {
        if !part.starts_with(b"OggS") {
            return Err(SynthesisError::AudioMismatch(format!(
                "part {} is not an Ogg stream",
                i + 1
            )));
        }
    }
    Ok(parts.concat())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav(format_tag: u16, channels: u16, rate: u32, bits: u16, data: &[u8]) -> Vec<u8> {
        let block_align = channels * bits / 8;
        let mut fmt = Vec::new();
        fmt.extend_from_slice(&format_tag.to_le_bytes());
        fmt.extend_from_slice(&channels.to_le_bytes());
        fmt.extend_from_slice(&rate.to_le_bytes());
        fmt.extend_from_slice(&(rate * block_align as u32).to_le_bytes());
        fmt.extend_from_slice(&block_align.to_le_bytes());
        fmt.extend_from_slice(&bits.to_le_bytes());

        let mut out = Vec::new();
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&((4 + 8 + fmt.len() + 8 + data.len()) as u32).to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&(fmt.len() as u32).to_le_bytes());
        out.extend_from_slice(&fmt);
        out.extend_from_slice(b"data");
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(data);
        out
    }

    // MPEG-1 Layer III, 128 kbit/s, 44.1 kHz
    const FRAME_44K: [u8; 4] = [0xFF, 0xFB, 0x90, 0x64];
    // MPEG-2 Layer III, 24 kHz
    const FRAME_24K: [u8; 4] = [0xFF, 0xF3, 0x94, 0x64];

    #[test]
    fn single_part_is_returned_untouched() {
        let part = b"anything".to_vec();
        assert_eq!(concat(AudioEncoding::Mp3, vec![part.clone()]).unwrap(), part);
    }

    #[test]
    fn no_parts_is_an_error() {
        assert!(concat(AudioEncoding::Mp3, vec![]).is_err());
    }

    #[test]
    fn wav_parts_share_one_header() {
        let a = wav(1, 1, 24000, 16, &[1, 2, 3, 4]);
        let b = wav(1, 1, 24000, 16, &[5, 6]);
        let joined = concat(AudioEncoding::Linear16, vec![a, b]).unwrap();

        let parsed = parse_wav(&joined).unwrap();
        assert_eq!(parsed.data, &[1, 2, 3, 4, 5, 6]);
        assert_eq!(parsed.format.sample_rate, 24000);
        assert_eq!(read_u32(&joined, 4) as usize, joined.len() - 8);
        assert_eq!(wav_format(&joined).unwrap().channels, 1);
    }

    #[test]
    fn wav_odd_data_is_padded() {
        let a = wav(7, 1, 8000, 8, &[1]);
        let b = wav(7, 1, 8000, 8, &[2, 3, 4, 5]);
        let joined = concat(AudioEncoding::Mulaw, vec![a, b]).unwrap();
        let parsed = parse_wav(&joined).unwrap();
        assert_eq!(parsed.data, &[1, 2, 3, 4, 5]);
        assert_eq!(joined.len() % 2, 0);
        assert_eq!(read_u32(&joined, 4) as usize, joined.len() - 8);
    }

    #[test]
    fn wav_format_mismatch_is_rejected() {
        let a = wav(1, 1, 24000, 16, &[0, 0]);
        let b = wav(1, 1, 16000, 16, &[0, 0]);
        let err = concat(AudioEncoding::Linear16, vec![a, b]).unwrap_err();
        assert!(matches!(err, SynthesisError::AudioMismatch(_)), "{err:?}");
        assert!(err.to_string().contains("part 2"), "{err}");
    }

    #[test]
    fn malformed_wav_is_rejected() {
        let a = wav(1, 1, 24000, 16, &[0, 0]);
        let err = concat(AudioEncoding::Linear16, vec![a, b"RIFFjunk".to_vec()]).unwrap_err();
        assert!(err.to_string().contains("not a RIFF/WAVE"), "{err}");
    }

    #[test]
    fn mp3_sample_rate_detection() {
        assert_eq!(mp3_sample_rate(&FRAME_44K), Some(44100));
        assert_eq!(mp3_sample_rate(&FRAME_24K), Some(24000));
        assert_eq!(mp3_sample_rate(b"no frames here"), None);
    }

    #[test]
    fn mp3_later_id3_tags_are_dropped() {
        let mut tagged = b"ID3\x04\x00\x00\x00\x00\x00\x05".to_vec();
        tagged.extend_from_slice(b"TAGGY");
        tagged.extend_from_slice(&FRAME_24K);
        tagged.extend_from_slice(&[0xAA; 4]);

        let joined = concat(AudioEncoding::Mp3, vec![tagged.clone(), tagged]).unwrap();
        // first tag kept, second dropped
        assert_eq!(joined.len(), 23 + 8);
        assert!(joined.starts_with(b"ID3"));
        assert_eq!(&joined[23..27], &FRAME_24K);
    }

    #[test]
    fn mp3_rate_mismatch_is_rejected() {
        let err = concat(
            AudioEncoding::Mp3,
            vec![FRAME_44K.to_vec(), FRAME_24K.to_vec()],
        )
        .unwrap_err();
        assert!(err.to_string().contains("24000 Hz"), "{err}");
    }

    #[test]
    fn ogg_parts_are_chained() {
        let joined = concat(
            AudioEncoding::OggOpus,
            vec![b"OggS-one".to_vec(), b"OggS-two".to_vec()],
        )
        .unwrap();
        assert_eq!(joined, b"OggS-oneOggS-two");
        assert!(concat(AudioEncoding::OggOpus, vec![b"OggS".to_vec(), b"nope".to_vec()]).is_err());
    }
}
