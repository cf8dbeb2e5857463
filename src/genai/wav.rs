//! Minimal WAV container for TTS output.
//!
//! The speech endpoints return raw little-endian PCM; the media host wants
//! a playable file, so the PCM is wrapped in a RIFF/WAVE header before
//! upload.

/// Default TTS output format: 24 kHz, mono, 16-bit samples.
pub const DEFAULT_CHANNELS: u16 = 1;
pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;
pub const DEFAULT_BITS_PER_SAMPLE: u16 = 16;

/// Wrap raw PCM bytes in a WAV container.
pub fn wrap_pcm(pcm: &[u8], channels: u16, sample_rate: u32, bits_per_sample: u16) -> Vec<u8> {
    let byte_rate = sample_rate * u32::from(channels) * u32::from(bits_per_sample) / 8;
    let block_align = channels * bits_per_sample / 8;
    let data_len = pcm.len() as u32;

    let mut out = Vec::with_capacity(44 + pcm.len());
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes()); // PCM chunk size
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM format tag
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&bits_per_sample.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.extend_from_slice(pcm);
    out
}

/// Wrap PCM using the default TTS format.
pub fn wrap_pcm_default(pcm: &[u8]) -> Vec<u8> {
    wrap_pcm(pcm, DEFAULT_CHANNELS, DEFAULT_SAMPLE_RATE, DEFAULT_BITS_PER_SAMPLE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let pcm = [0u8; 8];
        let wav = wrap_pcm_default(&pcm);

        assert_eq!(wav.len(), 44 + 8);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(&wav[36..40], b"data");
        // data chunk length
        assert_eq!(u32::from_le_bytes(wav[40..44].try_into().unwrap()), 8);
    }

    #[test]
    fn test_byte_rate_and_block_align() {
        let wav = wrap_pcm(&[], 2, 44_100, 16);
        // byte rate at offset 28: 44100 * 2 * 2
        assert_eq!(
            u32::from_le_bytes(wav[28..32].try_into().unwrap()),
            176_400
        );
        // block align at offset 32
        assert_eq!(u16::from_le_bytes(wav[32..34].try_into().unwrap()), 4);
    }
}
