//! Dissonance kernel and per-block evaluator.
//!
//! The roughness of a pair of partials follows the Sethares parameterization
//! of the Plomp–Levelt curve: with the lower partial at frequency f and the
//! pair separated by Δf,
//!
//! ```text
//! S = Dstar / (s1 * f + s2)
//! d = a1 * a2 * (c1 * exp(b1 * S * Δf) + c2 * exp(b2 * S * Δf))
//! ```
//!
//! and the block dissonance is the sum of d over every unordered pair of the
//! selected partials, the lower-frequency partial serving as the reference
//! for the critical-band term S.
//!
//! References:
//! - Plomp & Levelt, "Tonal Consonance and Critical Bandwidth" (1965).
//! - Sethares, "Local consonance and the relationship between timbre and
//!   scale" (1993).

use log::{debug, warn};

use crate::filter::{Filter, FilterError, FilterSpec};
use crate::partials::{
    MAX_PARTIALS, PEAK_THRESHOLD, Partial, detect_peaks, first_difference, select_partials,
};
use crate::spectrum::SpectrumFrame;

// Plomp–Levelt kernel parameters.
const B1: f32 = -3.51;
const B2: f32 = -5.75;
const S1: f32 = 0.0207;
const S2: f32 = 19.96;
const C1: f32 = 5.0;
const C2: f32 = -5.0;
const D_STAR: f32 = 0.24;

/// Butterworth low-pass, cutoff at a quarter of Nyquist (from scipy).
const LPF_B: [f32; 11] = [
    1.10559099e-5,
    1.10559099e-4,
    4.97515946e-4,
    1.32670919e-3,
    2.32174108e-3,
    2.78608930e-3,
    2.32174108e-3,
    1.32670919e-3,
    4.97515946e-4,
    1.10559099e-4,
    1.10559099e-5,
];
const LPF_A: [f32; 11] = [
    1.0,
    -4.98698526,
    11.9364368,
    -17.7423718,
    17.9732280,
    -12.8862417,
    6.59320221,
    -2.36909169,
    0.570632706,
    -0.0830176785,
    0.00552971437,
];

/// Pairwise dissonance accumulated over `partials`, which must be sorted by
/// ascending frequency. A single partial has no pair and yields zero.
pub fn dissonance_total(partials: &[Partial]) -> f32 {
    let n = partials.len();
    let mut total = 0.0_f32;
    for i in 1..n {
        for j in 0..n - i {
            let s = D_STAR / (S1 * partials[j].freq_hz + S2);
            let fdif = partials[j + i].freq_hz - partials[j].freq_hz;
            let am = partials[j + i].mag * partials[j].mag;
            total += am * (C1 * (B1 * s * fdif).exp() + C2 * (B2 * s * fdif).exp());
        }
    }
    total
}

/// Outcome of evaluating one block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BlockOutcome {
    /// No spectral peaks were detected; the block carries no roughness.
    NoPeaks,
    /// Accumulated dissonance of the block's partials.
    Dissonance(f32),
}

/// Per-block dissonance evaluator.
///
/// Holds the one piece of state that outlives a block: the low-pass filter
/// used for zero-phase smoothing of the magnitude spectrum. Everything else
/// is scratch allocated per block.
pub struct Evaluator {
    sample_rate: f32,
    lpf: Filter,
}

impl Evaluator {
    pub fn new(sample_rate: f32) -> Result<Self, FilterError> {
        let lpf = Filter::new(FilterSpec {
            b: LPF_B.to_vec(),
            a: LPF_A[1..].to_vec(),
        })?;
        Ok(Self { sample_rate, lpf })
    }

    /// Evaluate one frequency-domain block of `block_size` samples given as
    /// interleaved (re, im) singles.
    pub fn process_block(&mut self, block: &[f32], block_size: usize) -> BlockOutcome {
        let frame = SpectrumFrame::from_interleaved(block, block_size, self.sample_rate);

        // Backward-forward smoothing advances the low-pass state; the peak
        // detector below reads the unsmoothed magnitudes.
        self.smooth_magnitudes(&frame.mags);

        let diffs = first_difference(&frame.mags);
        let peak_idx = detect_peaks(&diffs, PEAK_THRESHOLD);
        if peak_idx.is_empty() {
            warn!("zero-length peak list");
            return BlockOutcome::NoPeaks;
        }
        for &k in &peak_idx {
            debug!("peak ({},{})", frame.mags[k], k);
        }

        let partials = select_partials(&frame, &peak_idx, MAX_PARTIALS);
        BlockOutcome::Dissonance(dissonance_total(&partials))
    }

    /// Zero-phase low-pass over the magnitudes: filter the reversed
    /// spectrum, reverse the result in place, and filter again on the same
    /// delay-line state, then half-wave rectify.
    ///
    /// The working buffer is one slot longer than the spectrum; slot 0
    /// mirrors the position one past the highest bin. It rides through the
    /// copies and the rectification but only the first `half` samples of
    /// each pass are filtered.
    fn smooth_magnitudes(&mut self, mags: &[f32]) -> Vec<f32> {
        let half = mags.len();
        let mut buf = vec![0.0_f32; half + 1];
        for i in 1..=half {
            buf[i] = mags[half - i];
        }
        let mut out = vec![0.0_f32; half];
        self.lpf.run(&buf[..half], &mut out); // backward pass
        for i in 1..=half {
            buf[i] = out[half - i];
        }
        self.lpf.run(&buf[..half], &mut out); // forward pass
        for v in buf.iter_mut() {
            if *v < 0.0 {
                *v = 0.0; // half-wave rectify
            }
        }
        buf
    }

    /// Zero the smoothing filter's delay line.
    pub fn reset(&mut self) {
        self.lpf.reset();
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

// --------------------------- Tests -----------------------------
