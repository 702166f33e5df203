//! Paired-channel timing jitter from constant-fraction timestamps.

use crate::{
    crossing::first_crossing,
    error::{AnalysisError, AnalysisResult, Feature},
    features::peak_index,
    polarity::Polarity,
    stats::Accumulator,
    waveform::WaveformSet,
    Real,
};
use rayon::prelude::*;
use tracing::debug;

/// Fraction of a pulse's own peak at which its timestamp is taken.
/// Normalising to each pulse keeps the timing independent of
/// pulse-to-pulse amplitude variation.
const TIMING_FRACTION: Real = 0.1;

/// Timing separation statistics between two correlated channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JitterSummary {
    /// Mean of the per-pair timestamp differences, seconds.
    pub mean_separation: Real,
    /// Population deviation of the differences: the jitter.
    pub std_dev: Real,
    /// `std_dev / sqrt(2N)`, two timing estimates per pulse pair.
    pub std_error: Real,
}

fn constant_fraction_timestamp(
    time: &[Real],
    samples: &[Real],
    polarity: Polarity,
    pulse: usize,
) -> AnalysisResult<Real> {
    let peak = samples[peak_index(samples, polarity)];
    first_crossing(time, samples, TIMING_FRACTION * peak, polarity, 0).ok_or(
        AnalysisError::NoCrossing {
            pulse,
            feature: Feature::Timestamp,
        },
    )
}

/// Pairs the two sets pulse by pulse and reduces the timestamp
/// differences `t_a[i] - t_b[i]` to mean, deviation and standard error.
///
/// Each channel's polarity is detected once for the whole set, not per
/// pulse. Pulse counts must match exactly.
pub fn compute_jitter(set_a: &WaveformSet, set_b: &WaveformSet) -> AnalysisResult<JitterSummary> {
    if set_a.num_pulses() != set_b.num_pulses() {
        return Err(AnalysisError::LengthMismatch(
            set_a.num_pulses(),
            set_b.num_pulses(),
        ));
    }
    let polarity_a = Polarity::detect(set_a)?;
    let polarity_b = Polarity::detect(set_b)?;
    debug!("pairing {} pulses for timing jitter", set_a.num_pulses());

    let separations: Vec<AnalysisResult<Real>> = set_a
        .pulses()
        .par_iter()
        .zip(set_b.pulses().par_iter())
        .enumerate()
        .map(|(pulse, (samples_a, samples_b))| {
            let stamp_a = constant_fraction_timestamp(set_a.time(), samples_a, polarity_a, pulse)?;
            let stamp_b = constant_fraction_timestamp(set_b.time(), samples_b, polarity_b, pulse)?;
            Ok(stamp_a - stamp_b)
        })
        .collect();

    // Errors surface in capture order, independent of worker scheduling.
    let mut accumulator = Accumulator::default();
    for separation in separations {
        accumulator.push(separation?);
    }

    let stats = accumulator.stats();
    Ok(JitterSummary {
        mean_separation: stats.mean,
        std_dev: stats.std_dev,
        std_error: stats.std_dev / (2.0 * accumulator.count() as Real).sqrt(),
    })
}
