//! Magnitude spectrum extraction from one frequency-domain block.
//!
//! The host hands over interleaved (re, im) singles for bins 0..=M/2 of a
//! block of size M. Bin 0 carries no interval information and is ignored;
//! bins 1..=M/2 are converted to normalized magnitudes with their center
//! frequencies. Frames are local to one block and never retained.

/// Magnitudes and center frequencies for bins 1..=M/2 of one block.
///
/// Slot `k` of both vectors corresponds to FFT bin `k + 1`:
/// `freqs_hz[k] = (k + 1) * fs / m` and `mags[k]` is the bin magnitude
/// scaled by `2 / m`.
#[derive(Clone, Debug)]
pub struct SpectrumFrame {
    pub freqs_hz: Vec<f32>,
    pub mags: Vec<f32>,
}

impl SpectrumFrame {
    /// Extract a frame from `block`, which must hold at least `m + 2`
    /// interleaved singles (bins 0..=m/2 as re, im pairs).
    pub fn from_interleaved(block: &[f32], block_size: usize, sample_rate: f32) -> Self {
        let half = block_size / 2;
        assert!(
            block.len() >= block_size + 2,
            "block holds {} singles, need {}",
            block.len(),
            block_size + 2
        );

        let mut freqs_hz = Vec::with_capacity(half);
        let mut mags = Vec::with_capacity(half);
        for i in 1..=half {
            let re = f64::from(block[2 * i]);
            let im = f64::from(block[2 * i + 1]);
            mags.push(((re * re + im * im).sqrt() / half as f64) as f32);
            freqs_hz.push((i as f64 * f64::from(sample_rate) / block_size as f64) as f32);
        }
        Self { freqs_hz, mags }
    }

    pub fn len(&self) -> usize {
        self.mags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mags.is_empty()
    }
}

// --------------------------- Tests -----------------------------
