//! Partial selection: differentiate the magnitude spectrum, detect peaks at
//! sign changes of the derivative, keep the strongest few, and order them by
//! frequency for pairwise accumulation.

use std::cmp::Ordering;

use crate::spectrum::SpectrumFrame;

/// How many partials feed the dissonance accumulation at most.
pub const MAX_PARTIALS: usize = 20;

/// Derivative magnitude below which a sign change is treated as noise.
pub const PEAK_THRESHOLD: f32 = 1e-9;

/// A detected spectral peak.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Partial {
    pub freq_hz: f32,
    pub mag: f32,
}

/// First difference of the magnitudes with respect to bin index;
/// slot 0 is defined as zero.
pub fn first_difference(mags: &[f32]) -> Vec<f32> {
    let mut diffs = Vec::with_capacity(mags.len());
    diffs.push(0.0);
    for i in 1..mags.len() {
        diffs.push(mags[i] - mags[i - 1]);
    }
    diffs
}

/// Indices where the derivative crosses from above `thresh` to below
/// `-thresh`, in ascending order.
pub fn detect_peaks(diffs: &[f32], thresh: f32) -> Vec<usize> {
    let mut peak_idx = Vec::new();
    for i in 1..diffs.len() {
        if diffs[i - 1] > thresh && diffs[i] < -thresh {
            peak_idx.push(i);
        }
    }
    peak_idx
}

/// Keep the `max_partials` strongest peaks by magnitude and return them as
/// (frequency, magnitude) pairs sorted by ascending frequency.
pub fn select_partials(
    frame: &SpectrumFrame,
    peak_idx: &[usize],
    max_partials: usize,
) -> Vec<Partial> {
    let mut by_mag: Vec<usize> = peak_idx.to_vec();
    by_mag.sort_by(|&l, &r| {
        frame.mags[r]
            .partial_cmp(&frame.mags[l])
            .unwrap_or(Ordering::Equal)
    });

    let mut partials: Vec<Partial> = by_mag
        .iter()
        .take(max_partials)
        .map(|&k| Partial {
            freq_hz: frame.freqs_hz[k],
            mag: frame.mags[k],
        })
        .collect();
    partials.sort_by(|l, r| l.freq_hz.partial_cmp(&r.freq_hz).unwrap());
    partials
}

// --------------------------- Tests -----------------------------
