//! Audio file decoding for the host driver.
//!
//! Decodes WAV/FLAC (anything symphonia probes) to mono f32 in [-1, 1];
//! multi-channel material is averaged down to one channel.

use std::fs::File;
use std::path::Path;

use symphonia::core::{
    audio::SampleBuffer, codecs::DecoderOptions, formats::FormatOptions, io::MediaSourceStream,
    meta::MetadataOptions, probe::Hint,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("decode error: {0}")]
    Decode(String),
    #[error("invalid-data: {0}")]
    InvalidData(String),
}

pub struct Decoded {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Decode `path` to mono f32 samples plus the stream's sample rate.
pub fn decode_to_mono<P: AsRef<Path>>(path: P) -> Result<Decoded, AudioError> {
    let file = File::open(&path).map_err(|e| AudioError::Decode(e.to_string()))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.as_ref().extension().and_then(|s| s.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::Decode(e.to_string()))?;
    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| AudioError::InvalidData("no default audio track".into()))?;
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::Decode(e.to_string()))?;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| AudioError::InvalidData("missing sample rate".into()))?;

    let mut samples = Vec::<f32>::new();
    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::ResetRequired) => {
                return Err(AudioError::Decode(
                    "decoder requires a reset (unsupported midstream change)".into(),
                ));
            }
            Err(_) => break, // end of stream
        };

        let decoded = decoder
            .decode(&packet)
            .map_err(|e| AudioError::Decode(e.to_string()))?;
        let spec = *decoded.spec();
        let channels = spec.channels.count();
        let mut sbuf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        sbuf.copy_interleaved_ref(decoded);
        downmix_into(sbuf.samples(), channels, &mut samples);
    }

    Ok(Decoded {
        samples,
        sample_rate,
    })
}

fn downmix_into(interleaved: &[f32], channels: usize, out: &mut Vec<f32>) {
    if channels <= 1 {
        out.extend_from_slice(interleaved);
        return;
    }
    for frame in interleaved.chunks_exact(channels) {
        out.push(frame.iter().sum::<f32>() / channels as f32);
    }
}

// --------------------------- Tests -----------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downmix_averages_channels() {
        let mut out = Vec::new();
        downmix_into(&[1.0, -1.0, 0.5, 0.5], 2, &mut out);
        assert_eq!(out, vec![0.0, 0.5]);
    }

    #[test]
    fn mono_passes_through() {
        let mut out = Vec::new();
        downmix_into(&[0.25, -0.25], 1, &mut out);
        assert_eq!(out, vec![0.25, -0.25]);
    }
}
