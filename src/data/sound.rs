use anyhow::{bail, ensure, Context, Result};
use std::fs;
use std::path::Path;

/// Cap on decoded frames, enough for a few minutes of audio.
pub const MAX_FRAMES: usize = 8_000_000;

/// Read a RIFF/WAVE file and return the de-interleaved left and right
/// channels. Only 16-bit two-channel PCM is supported; anything else is a
/// hard error, not a fallback.
pub fn read_stereo_wav(path: &Path) -> Result<(Vec<i16>, Vec<i16>)> {
    let bytes = fs::read(path)
        .with_context(|| format!("reading audio file {}", path.display()))?;
    decode_stereo_wav(&bytes)
}

/// Decode an in-memory RIFF/WAVE byte stream.
pub fn decode_stereo_wav(bytes: &[u8]) -> Result<(Vec<i16>, Vec<i16>)> {
    ensure!(
        bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE",
        "not a RIFF/WAVE file"
    );

    let mut format: Option<(u16, u16, u16)> = None;
    let mut data: Option<&[u8]> = None;

    let mut pos = 12;
    while pos + 8 <= bytes.len() {
        let id = &bytes[pos..pos + 4];
        let size =
            u32::from_le_bytes(bytes[pos + 4..pos + 8].try_into().expect("chunk of 4")) as usize;
        let body = bytes
            .get(pos + 8..pos + 8 + size)
            .context("truncated WAVE chunk")?;

        match id {
            b"fmt " => {
                ensure!(size >= 16, "fmt chunk too short");
                let field = |at: usize| {
                    u16::from_le_bytes(body[at..at + 2].try_into().expect("chunk of 2"))
                };
                // audio format tag, channel count, bits per sample
                format = Some((field(0), field(2), field(14)));
            }
            b"data" => data = Some(body),
            _ => {}
        }

        // Chunks are word-aligned; odd sizes carry a pad byte.
        pos += 8 + size + (size & 1);
    }

    let (audio_format, channels, bits) = format.context("missing fmt chunk")?;
    if audio_format != 1 || channels != 2 || bits != 16 {
        bail!(
            "only 16-bit stereo PCM supported (format {audio_format}, \
             {channels} channels, {bits} bits per sample)"
        );
    }
    let body = data.context("missing data chunk")?;

    let frames = (body.len() / 4).min(MAX_FRAMES);
    let mut left = Vec::with_capacity(frames);
    let mut right = Vec::with_capacity(frames);
    for frame in body.chunks_exact(4).take(frames) {
        left.push(i16::from_le_bytes([frame[0], frame[1]]));
        right.push(i16::from_le_bytes([frame[2], frame[3]]));
    }
    Ok((left, right))
}
