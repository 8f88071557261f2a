//! Host driver: decode an audio file, frame it into Hann-windowed FFT
//! blocks, push each block through the dissonance plugin, and print one
//! feature row per block.

mod audio;
mod util;

use std::path::PathBuf;

use clap::Parser;
use dissonance_core::plugin::{self, Dissonance, Feature};
use realfft::RealFftPlanner;

use crate::util::{summary_min_median_max, write_csv};

#[derive(Parser)]
#[command(about = "Per-block spectral dissonance of an audio file")]
struct Args {
    /// Audio file to analyze (WAV/FLAC).
    input: PathBuf,
    /// FFT block size in samples (power of two).
    #[arg(long, default_value_t = 1024)]
    block_size: usize,
    /// Hop between successive blocks in samples.
    #[arg(long, default_value_t = 512)]
    step_size: usize,
    /// Also write per-block rows to this CSV file.
    #[arg(long)]
    csv: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    if !args.block_size.is_power_of_two() {
        return Err(format!("block size {} is not a power of two", args.block_size).into());
    }
    if args.step_size == 0 {
        return Err("step size must be positive".into());
    }

    let decoded = audio::decode_to_mono(&args.input)?;
    let sr = decoded.sample_rate;
    println!(
        "{} v{}: {}",
        plugin::NAME,
        plugin::VERSION,
        args.input.display()
    );
    println!(
        "Sample rate: {} Hz | block {} | step {} | {} samples",
        sr,
        args.block_size,
        args.step_size,
        decoded.samples.len()
    );

    let mut diss = Dissonance::new(sr as f32)?;
    diss.initialise(1, args.step_size, args.block_size)?;

    let n = args.block_size;
    let half = n / 2;
    let hann: Vec<f32> = (0..n)
        .map(|i| 0.5 - 0.5 * ((2.0 * std::f32::consts::PI * i as f32) / (n as f32 - 1.0)).cos())
        .collect();

    let mut planner = RealFftPlanner::<f32>::new();
    let r2c = planner.plan_fft_forward(n);
    let mut in_buf = r2c.make_input_vec();
    let mut spec_buf = r2c.make_output_vec();
    let mut block = vec![0.0_f32; 2 * (half + 1)];

    let mut rows: Vec<String> = Vec::new();
    let mut linear_values: Vec<f32> = Vec::new();

    let mut start = 0usize;
    let mut block_idx = 0usize;
    while start + n <= decoded.samples.len() {
        for (j, w) in hann.iter().enumerate() {
            in_buf[j] = decoded.samples[start + j] * w;
        }
        r2c.process(&mut in_buf, &mut spec_buf)
            .map_err(|e| format!("FFT error: {e}"))?;
        for (k, c) in spec_buf.iter().enumerate() {
            block[2 * k] = c.re;
            block[2 * k + 1] = c.im;
        }

        let time_s = start as f64 / sr as f64;
        let features = diss.process(&[block.as_slice()], time_s);
        let linear = feature_value(features.get(&0));
        let log10 = feature_value(features.get(&1));

        println!(
            "block {:>5}  t={:>8.3}s  D={}  log10={}",
            block_idx,
            time_s,
            fmt_opt(linear),
            fmt_opt(log10)
        );
        rows.push(format!(
            "{},{:.6},{},{}",
            block_idx,
            time_s,
            fmt_opt(linear),
            fmt_opt(log10)
        ));
        if let Some(d) = linear {
            linear_values.push(d);
        }

        start += args.step_size;
        block_idx += 1;
    }

    if linear_values.is_empty() {
        println!("No dissonance values produced.");
    } else {
        let (min, med, max) = summary_min_median_max(&linear_values);
        println!(
            "D over {} blocks: min={:.6}  med={:.6}  max={:.6}",
            linear_values.len(),
            min,
            med,
            max
        );
    }

    if let Some(path) = &args.csv {
        let mut all = vec!["block,time_s,dissonance,log10_dissonance".to_string()];
        all.extend(rows);
        write_csv(path, &all)?;
        println!("Wrote {} ({} rows)", path.display(), block_idx);
    }

    Ok(())
}

fn feature_value(list: Option<&Vec<Feature>>) -> Option<f32> {
    list.and_then(|l| l.first())
        .and_then(|f| f.values.first())
        .copied()
}

fn fmt_opt(v: Option<f32>) -> String {
    match v {
        Some(x) => format!("{x:.6}"),
        None => "-".to_string(),
    }
}
