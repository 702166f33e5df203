//! Per-pulse shape measurements and their ensemble reduction.

use crate::{
    crossing::{first_crossing, last_crossing},
    error::{AnalysisError, AnalysisResult, Feature},
    polarity::Polarity,
    stats::{Accumulator, SummaryStats},
    waveform::WaveformSet,
    Real,
};
use itertools::Itertools;
use rayon::prelude::*;
use tracing::debug;

/// Scalar shape measurements for a single pulse.
///
/// The peak keeps its sign; areas of negative-going pulses are negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseFeatures {
    /// Trapezoidal integral over the full time axis, volt-seconds.
    pub area: Real,
    /// Extreme sample in the polarity direction, volts.
    pub peak: Real,
    /// Time from the first 10%-of-peak crossing to the first 90% crossing.
    pub rise_time: Real,
    /// Time from falling below 90% of peak to falling below 10%, measured
    /// strictly after the peak sample.
    pub fall_time: Real,
    /// Full width at half maximum, first to last 50% crossing over the
    /// whole trace.
    pub width: Real,
}

/// Ensemble mean and deviation of each measurement across a whole set.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FeatureSummary {
    pub area: SummaryStats,
    pub peak: SummaryStats,
    pub rise_time: SummaryStats,
    pub fall_time: SummaryStats,
    pub width: SummaryStats,
}

/// Index of the extreme sample in the polarity direction. Ties keep the
/// earliest sample.
pub(crate) fn peak_index(samples: &[Real], polarity: Polarity) -> usize {
    let mut peak = 0;
    for (index, &value) in samples.iter().enumerate() {
        if polarity.exceeds(value, samples[peak]) {
            peak = index;
        }
    }
    peak
}

fn trapezoid_area(time: &[Real], samples: &[Real]) -> Real {
    time.iter()
        .zip(samples)
        .tuple_windows()
        .map(|((&t0, &y0), (&t1, &y1))| 0.5 * (y0 + y1) * (t1 - t0))
        .sum()
}

impl PulseFeatures {
    /// Computes the five shape measurements of one pulse.
    ///
    /// Thresholds are fractions of this pulse's own peak, so the timing
    /// measurements are independent of pulse-to-pulse amplitude
    /// variation. `pulse` only labels the record in any [`NoCrossing`]
    /// error.
    ///
    /// [`NoCrossing`]: AnalysisError::NoCrossing
    pub fn measure(
        time: &[Real],
        samples: &[Real],
        polarity: Polarity,
        pulse: usize,
    ) -> AnalysisResult<PulseFeatures> {
        let peak_index = peak_index(samples, polarity);
        let peak = samples[peak_index];

        let no_crossing = |feature| AnalysisError::NoCrossing { pulse, feature };

        let rise_low = first_crossing(time, samples, 0.1 * peak, polarity, 0)
            .ok_or(no_crossing(Feature::RiseTime))?;
        let rise_high = first_crossing(time, samples, 0.9 * peak, polarity, 0)
            .ok_or(no_crossing(Feature::RiseTime))?;

        // After the peak the signal heads back to baseline, so the
        // falling searches run with the inverted comparison from the
        // peak sample on.
        let falling = polarity.invert();
        let fall_high = first_crossing(time, samples, 0.9 * peak, falling, peak_index)
            .ok_or(no_crossing(Feature::FallTime))?;
        let fall_low = first_crossing(time, samples, 0.1 * peak, falling, peak_index)
            .ok_or(no_crossing(Feature::FallTime))?;

        let half_first = first_crossing(time, samples, 0.5 * peak, polarity, 0)
            .ok_or(no_crossing(Feature::Width))?;
        let half_last = last_crossing(time, samples, 0.5 * peak, polarity)
            .ok_or(no_crossing(Feature::Width))?;

        Ok(PulseFeatures {
            area: trapezoid_area(time, samples),
            peak,
            rise_time: rise_high - rise_low,
            fall_time: fall_low - fall_high,
            width: half_last - half_first,
        })
    }
}

#[derive(Default, Clone)]
struct FeatureAccumulator {
    area: Accumulator,
    peak: Accumulator,
    rise_time: Accumulator,
    fall_time: Accumulator,
    width: Accumulator,
}

impl FeatureAccumulator {
    fn push(&mut self, features: &PulseFeatures) {
        self.area.push(features.area);
        self.peak.push(features.peak);
        self.rise_time.push(features.rise_time);
        self.fall_time.push(features.fall_time);
        self.width.push(features.width);
    }

    fn merge(self, other: Self) -> Self {
        FeatureAccumulator {
            area: self.area.merge(other.area),
            peak: self.peak.merge(other.peak),
            rise_time: self.rise_time.merge(other.rise_time),
            fall_time: self.fall_time.merge(other.fall_time),
            width: self.width.merge(other.width),
        }
    }

    fn into_summary(self) -> FeatureSummary {
        FeatureSummary {
            area: self.area.stats(),
            peak: self.peak.stats(),
            rise_time: self.rise_time.stats(),
            fall_time: self.fall_time.stats(),
            width: self.width.stats(),
        }
    }
}

/// Computes every pulse's shape measurements and reduces them to ensemble
/// statistics.
///
/// The set's polarity is detected once and applied to every pulse. A
/// failed threshold search in any pulse aborts the whole extraction with
/// the first offence in capture order; callers wanting partial tolerance
/// pre-filter malformed captures and re-invoke.
pub fn extract_features(set: &WaveformSet) -> AnalysisResult<FeatureSummary> {
    let polarity = Polarity::detect(set)?;
    debug!(
        "extracting shape features from {} pulses ({polarity:?})",
        set.num_pulses()
    );

    let per_pulse: Vec<AnalysisResult<PulseFeatures>> = set
        .pulses()
        .par_iter()
        .enumerate()
        .map(|(pulse, samples)| PulseFeatures::measure(set.time(), samples, polarity, pulse))
        .collect();
    // Errors surface in capture order, so a bad batch fails identically
    // every run regardless of worker scheduling.
    let features = per_pulse
        .into_iter()
        .collect::<AnalysisResult<Vec<PulseFeatures>>>()?;

    Ok(features
        .par_iter()
        .fold(FeatureAccumulator::default, |mut accumulator, features| {
            accumulator.push(features);
            accumulator
        })
        .reduce(FeatureAccumulator::default, FeatureAccumulator::merge)
        .into_summary())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    const SAMPLE_INTERVAL: Real = 1e-9;

    // Triangle rising over samples 20..60 and falling over 60..80,
    // peaking at 1 V.
    fn triangle_sample(index: usize) -> Real {
        match index {
            0..=20 => 0.0,
            21..=60 => (index as Real - 20.0) / 40.0,
            61..=80 => (80.0 - index as Real) / 20.0,
            _ => 0.0,
        }
    }

    fn triangle_set(scales: &[Real]) -> WaveformSet {
        let pulses = scales
            .iter()
            .map(|scale| (0..101).map(|i| scale * triangle_sample(i)).collect())
            .collect();
        WaveformSet::from_sample_interval(SAMPLE_INTERVAL, pulses).expect("set should build")
    }

    #[test]
    fn analytic_positive_triangle() {
        let summary =
            extract_features(&triangle_set(&[1.0, 1.0, 1.0])).expect("extraction should succeed");

        // Discrete crossings: 10% at sample 25, 90% at 57, post-peak 90%
        // at 63 and 10% at 79, half maximum from 41 to 69.
        assert_approx_eq!(summary.peak.mean, 1.0, 1e-15);
        assert_approx_eq!(summary.area.mean, 30e-9, 1e-18);
        assert_approx_eq!(summary.rise_time.mean, 32e-9, 1e-15);
        assert_approx_eq!(summary.fall_time.mean, 16e-9, 1e-15);
        assert_approx_eq!(summary.width.mean, 28e-9, 1e-15);

        assert_approx_eq!(summary.peak.std_dev, 0.0, 1e-15);
        assert_approx_eq!(summary.rise_time.std_dev, 0.0, 1e-15);
    }

    #[test]
    fn negative_triangle_mirrors_timings() {
        let summary =
            extract_features(&triangle_set(&[-1.0, -1.0, -1.0])).expect("extraction should succeed");

        assert_approx_eq!(summary.peak.mean, -1.0, 1e-15);
        assert_approx_eq!(summary.area.mean, -30e-9, 1e-18);
        assert_approx_eq!(summary.rise_time.mean, 32e-9, 1e-15);
        assert_approx_eq!(summary.fall_time.mean, 16e-9, 1e-15);
        assert_approx_eq!(summary.width.mean, 28e-9, 1e-15);
    }

    #[test]
    fn timings_independent_of_amplitude() {
        let summary =
            extract_features(&triangle_set(&[1.0, 3.0])).expect("extraction should succeed");

        // Thresholds are fractions of each pulse's own peak, so timing
        // measurements agree while amplitude-linked ones scale.
        assert_approx_eq!(summary.rise_time.std_dev, 0.0, 1e-15);
        assert_approx_eq!(summary.width.std_dev, 0.0, 1e-15);
        assert_approx_eq!(summary.peak.mean, 2.0, 1e-15);
        assert_approx_eq!(summary.peak.std_dev, 1.0, 1e-15);
        assert_approx_eq!(summary.area.mean, 60e-9, 1e-18);
        assert_approx_eq!(summary.area.std_dev, 30e-9, 1e-18);
    }

    #[test]
    fn all_zero_pulse_aborts_extraction() {
        let mut pulses: Vec<Vec<Real>> = (0..2)
            .map(|_| (0..101).map(triangle_sample).collect())
            .collect();
        pulses.push(vec![0.0; 101]);
        let set =
            WaveformSet::from_sample_interval(SAMPLE_INTERVAL, pulses).expect("set should build");

        assert_eq!(
            extract_features(&set),
            Err(AnalysisError::NoCrossing {
                pulse: 2,
                feature: Feature::RiseTime,
            })
        );
    }

    #[test]
    fn extraction_is_deterministic() {
        let set = triangle_set(&[1.0, 0.8, 1.2, 0.9, 1.1]);
        let first = extract_features(&set).expect("extraction should succeed");
        let second = extract_features(&set).expect("extraction should succeed");
        assert_eq!(first, second);
    }
}
