//! Per-frame spectral dissonance estimation.
//!
//! Given the complex STFT of one audio block, the evaluator extracts a small
//! set of salient sinusoidal partials from the magnitude spectrum and sums a
//! pairwise Sethares/Plomp–Levelt roughness kernel over them, yielding one
//! scalar per block.
//!
//! Module map:
//! - [`complex`], [`roots`]: complex scalar arithmetic and a Laguerre
//!   polynomial root finder (used by the z-plane filter variant).
//! - [`filter`]: general IIR filter engine (Direct-Form-II transposed,
//!   circular delay line); [`zfilter`]: pole-controllable variant.
//! - [`spectrum`], [`partials`], [`dissonance`]: the per-block pipeline.
//! - [`plugin`]: push-style processing façade and feature/metadata types.

pub mod complex;
pub mod dissonance;
pub mod filter;
pub mod partials;
pub mod plugin;
pub mod roots;
pub mod spectrum;
pub mod zfilter;
