//! Push-style processing façade.
//!
//! The host owns windowing, FFT, and timing; it pushes one frequency-domain
//! block at a time and receives per-block features back. The façade is a
//! pure function of (low-pass filter state, block) → features, mutating the
//! filter state in place; it never buffers or reorders blocks, and it never
//! panics into the host.

use std::collections::BTreeMap;

use log::error;
use thiserror::Error;

use crate::dissonance::{BlockOutcome, Evaluator};
use crate::filter::FilterError;

pub const IDENTIFIER: &str = "dissonance";
pub const NAME: &str = "Dissonance";
pub const DESCRIPTION: &str =
    "Calculate the dissonance function of the spectrum of the input signal";
pub const MAKER: &str = "Bregman Media Labs";
pub const VERSION: u32 = 2;
pub const COPYRIGHT: &str = "Freely redistributable (BSD license)";

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("unsupported channel count: {0} (mono input only)")]
    ChannelCount(usize),
}

/// One emitted feature value set. An empty `values` means the output is
/// defined for the block but carries no value (e.g. a non-finite result).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Feature {
    pub values: Vec<f32>,
}

/// Features per block, keyed by output index. Output 0 is the linear
/// dissonance, output 1 its base-10 logarithm.
pub type FeatureSet = BTreeMap<usize, Vec<Feature>>;

/// Static description of one plugin output.
#[derive(Clone, Debug)]
pub struct OutputDescriptor {
    pub identifier: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub unit: &'static str,
    pub bin_count: usize,
}

pub fn output_descriptors() -> Vec<OutputDescriptor> {
    vec![
        OutputDescriptor {
            identifier: "lineardissonance",
            name: "Dissonance",
            description: "Dissonance function of the linear frequency spectrum",
            unit: "Diss",
            bin_count: 1,
        },
        OutputDescriptor {
            identifier: "logdissonance",
            name: "Log Dissonance",
            description: "Dissonance function of the log weighted frequency spectrum",
            unit: "",
            bin_count: 1,
        },
    ]
}

/// The dissonance plugin façade.
pub struct Dissonance {
    step_size: usize,
    block_size: usize,
    evaluator: Evaluator,
}

impl Dissonance {
    pub fn new(sample_rate: f32) -> Result<Self, FilterError> {
        Ok(Self {
            step_size: 0,
            block_size: 0,
            evaluator: Evaluator::new(sample_rate)?,
        })
    }

    /// Record the processing geometry. Only mono input is accepted.
    pub fn initialise(
        &mut self,
        channels: usize,
        step_size: usize,
        block_size: usize,
    ) -> Result<(), PluginError> {
        if channels != 1 {
            return Err(PluginError::ChannelCount(channels));
        }
        self.step_size = step_size;
        self.block_size = block_size;
        Ok(())
    }

    /// Clear state carried between blocks.
    pub fn reset(&mut self) {
        self.evaluator.reset();
    }

    /// Process one block of interleaved frequency-domain data per channel;
    /// only channel 0 is consumed. The timestamp is opaque: features are
    /// emitted one per step and carry no timestamp of their own.
    pub fn process(&mut self, input_buffers: &[&[f32]], _timestamp: f64) -> FeatureSet {
        let mut features = FeatureSet::new();
        if self.step_size == 0 {
            error!("process called before initialise");
            return features;
        }
        let Some(channel) = input_buffers.first() else {
            error!("process called without input channels");
            return features;
        };
        if channel.len() < self.block_size + 2 {
            error!(
                "input block holds {} singles, need {}",
                channel.len(),
                self.block_size + 2
            );
            return features;
        }

        match self.evaluator.process_block(channel, self.block_size) {
            BlockOutcome::NoPeaks => {
                let zero = Feature { values: vec![0.0] };
                features.entry(0).or_default().push(zero.clone());
                features.entry(1).or_default().push(zero);
            }
            BlockOutcome::Dissonance(diss) => {
                let mut linear = Feature::default();
                if diss.is_finite() {
                    linear.values.push(diss);
                }
                features.entry(0).or_default().push(linear);

                let mut log10 = Feature::default();
                if diss.is_finite() && diss > 0.0 {
                    log10.values.push(diss.log10());
                }
                features.entry(1).or_default().push(log10);
            }
        }
        features
    }

    /// Nothing is held back at the end of a run.
    pub fn remaining_features(&self) -> FeatureSet {
        FeatureSet::new()
    }

    pub fn sample_rate(&self) -> f32 {
        self.evaluator.sample_rate()
    }

    pub fn step_size(&self) -> usize {
        self.step_size
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }
}

// --------------------------- Tests -----------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const FS: f32 = 44_100.0;
    const M: usize = 1024;

    fn initialised() -> Dissonance {
        let mut plugin = Dissonance::new(FS).unwrap();
        plugin.initialise(1, M / 2, M).unwrap();
        plugin
    }

    fn bump(block: &mut [f32], center_bin: usize, amp: f32) {
        block[2 * (center_bin - 1)] = 0.5 * amp;
        block[2 * center_bin] = amp;
        block[2 * (center_bin + 1)] = 0.5 * amp;
    }

    #[test]
    fn rejects_non_mono_input() {
        let mut plugin = Dissonance::new(FS).unwrap();
        assert!(matches!(
            plugin.initialise(2, M / 2, M),
            Err(PluginError::ChannelCount(2))
        ));
        assert!(plugin.initialise(1, M / 2, M).is_ok());
    }

    #[test]
    fn process_before_initialise_is_empty() {
        let mut plugin = Dissonance::new(FS).unwrap();
        let block = vec![0.0_f32; M + 2];
        let features = plugin.process(&[block.as_slice()], 0.0);
        assert!(features.is_empty());
    }

    #[test]
    fn silence_yields_zero_on_both_outputs() {
        let mut plugin = initialised();
        let block = vec![0.0_f32; M + 2];
        let features = plugin.process(&[block.as_slice()], 0.0);
        for output in [0, 1] {
            let list = &features[&output];
            assert_eq!(list.len(), 1);
            assert_eq!(list[0].values, vec![0.0]);
        }
    }

    #[test]
    fn lone_peak_has_zero_dissonance_and_no_log() {
        let mut plugin = initialised();
        let mut block = vec![0.0_f32; M + 2];
        bump(&mut block, 100, 1.0);
        let features = plugin.process(&[block.as_slice()], 0.0);
        assert_eq!(features[&0][0].values, vec![0.0]);
        // log10 of zero dissonance is undefined; the feature stays empty
        assert!(features[&1][0].values.is_empty());
    }

    #[test]
    fn two_peaks_emit_linear_and_log_dissonance() {
        let mut plugin = initialised();
        let mut block = vec![0.0_f32; M + 2];
        bump(&mut block, 100, 1.0);
        bump(&mut block, 107, 1.0);
        let features = plugin.process(&[block.as_slice()], 0.0);

        let linear = &features[&0][0].values;
        assert_eq!(linear.len(), 1);
        assert!(linear[0] > 0.0 && linear[0].is_finite());

        let log = &features[&1][0].values;
        assert_eq!(log.len(), 1);
        assert!((log[0] - linear[0].log10()).abs() < 1e-6);
    }

    #[test]
    fn blocks_are_processed_independently() {
        let mut plugin = initialised();
        let mut block = vec![0.0_f32; M + 2];
        bump(&mut block, 100, 1.0);
        bump(&mut block, 107, 1.0);

        let first = plugin.process(&[block.as_slice()], 0.0);
        // an interposed silent block must not disturb the next result
        let silent = vec![0.0_f32; M + 2];
        plugin.process(&[silent.as_slice()], 1.0);
        let second = plugin.process(&[block.as_slice()], 2.0);
        assert_eq!(first[&0][0].values, second[&0][0].values);
    }

    #[test]
    fn metadata_is_stable() {
        assert_eq!(IDENTIFIER, "dissonance");
        assert_eq!(VERSION, 2);
        let outputs = output_descriptors();
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].identifier, "lineardissonance");
        assert_eq!(outputs[0].unit, "Diss");
    }
}
