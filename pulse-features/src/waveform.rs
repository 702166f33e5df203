use crate::{
    error::{AnalysisError, AnalysisResult, Record},
    Real,
};

/// One channel's batch of captured pulses, aligned to a shared time axis.
///
/// The time axis is zero-referenced to the first sample and monotonically
/// increasing; every pulse holds one amplitude sample per time point.
/// A set is immutable once constructed, so every downstream computation
/// reads the same data.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformSet {
    time: Vec<Real>,
    pulses: Vec<Vec<Real>>,
}

impl WaveformSet {
    pub fn new(time: Vec<Real>, pulses: Vec<Vec<Real>>) -> AnalysisResult<Self> {
        if time.len() < 2 {
            return Err(AnalysisError::InsufficientData {
                kind: Record::Samples,
                needed: 2,
                found: time.len(),
            });
        }
        if pulses.is_empty() {
            return Err(AnalysisError::InsufficientData {
                kind: Record::Pulses,
                needed: 1,
                found: 0,
            });
        }
        for (pulse, samples) in pulses.iter().enumerate() {
            if samples.len() != time.len() {
                return Err(AnalysisError::ShapeMismatch {
                    pulse,
                    actual: samples.len(),
                    expected: time.len(),
                });
            }
        }
        Ok(WaveformSet { time, pulses })
    }

    /// Builds the time axis from a uniform sample interval, zero-referenced
    /// to the first sample.
    pub fn from_sample_interval(
        sample_interval: Real,
        pulses: Vec<Vec<Real>>,
    ) -> AnalysisResult<Self> {
        let samples = pulses.first().map(Vec::len).unwrap_or_default();
        let time = (0..samples).map(|i| i as Real * sample_interval).collect();
        Self::new(time, pulses)
    }

    pub fn time(&self) -> &[Real] {
        &self.time
    }

    pub fn pulses(&self) -> &[Vec<Real>] {
        &self.pulses
    }

    pub fn num_pulses(&self) -> usize {
        self.pulses.len()
    }

    pub fn num_samples(&self) -> usize {
        self.time.len()
    }

    /// Time-axis step, the resolution floor of every timing measurement.
    pub fn sample_interval(&self) -> Real {
        self.time[1] - self.time[0]
    }
}
