use crate::{
    error::{AnalysisError, AnalysisResult, Record},
    waveform::WaveformSet,
    Real,
};

/// Whether a channel's pulses are predominantly positive- or
/// negative-going excursions from baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    /// Classifies a whole set from the mean of its second pulse.
    ///
    /// The first capture is skipped as the instrument often misfires on
    /// it. The classification is a per-set property, detected once and
    /// reused by every measurement on that set; a set with mixed-polarity
    /// pulses is treated as having the polarity of the sampled pulse.
    pub fn detect(set: &WaveformSet) -> AnalysisResult<Self> {
        let reference = set
            .pulses()
            .get(1)
            .ok_or(AnalysisError::InsufficientData {
                kind: Record::Pulses,
                needed: 2,
                found: set.num_pulses(),
            })?;
        let mean = reference.iter().sum::<Real>() / reference.len() as Real;
        if mean > 0.0 {
            Ok(Polarity::Positive)
        } else {
            Ok(Polarity::Negative)
        }
    }

    /// True when `value` lies on the peak side of `threshold`.
    pub fn exceeds(self, value: Real, threshold: Real) -> bool {
        match self {
            Polarity::Positive => value > threshold,
            Polarity::Negative => value < threshold,
        }
    }

    /// The opposite comparison direction, used for searches after the
    /// peak where the signal heads back towards baseline.
    pub fn invert(self) -> Self {
        match self {
            Polarity::Positive => Polarity::Negative,
            Polarity::Negative => Polarity::Positive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_with_second_pulse(second: Vec<Real>) -> WaveformSet {
        let time = (0..second.len()).map(|i| i as Real).collect();
        let first = vec![0.0; second.len()];
        WaveformSet::new(time, vec![first, second]).expect("set should build")
    }

    #[test]
    fn positive_second_pulse() {
        let set = set_with_second_pulse(vec![0.0, 1.0, 2.0, 1.0]);
        assert_eq!(Polarity::detect(&set), Ok(Polarity::Positive));
    }

    #[test]
    fn invariant_under_positive_scaling() {
        let samples = vec![0.0, 0.5, 1.0, 0.5];
        let scaled = samples.iter().map(|v| v * 250.0).collect();
        assert_eq!(
            Polarity::detect(&set_with_second_pulse(samples)),
            Polarity::detect(&set_with_second_pulse(scaled)),
        );
    }

    #[test]
    fn flips_when_second_pulse_negated() {
        let set = set_with_second_pulse(vec![0.0, -0.5, -1.0, -0.5]);
        assert_eq!(Polarity::detect(&set), Ok(Polarity::Negative));
    }

    #[test]
    fn single_pulse_is_insufficient() {
        let set = WaveformSet::new(vec![0.0, 1.0], vec![vec![0.0, 1.0]])
            .expect("set should build");
        assert_eq!(
            Polarity::detect(&set),
            Err(AnalysisError::InsufficientData {
                kind: Record::Pulses,
                needed: 2,
                found: 1,
            })
        );
    }

    #[test]
    fn comparison_direction() {
        assert!(Polarity::Positive.exceeds(0.6, 0.5));
        assert!(!Polarity::Positive.exceeds(0.5, 0.5));
        assert!(Polarity::Negative.exceeds(-0.6, -0.5));
        assert!(!Polarity::Negative.exceeds(-0.4, -0.5));
        assert_eq!(Polarity::Positive.invert(), Polarity::Negative);
        assert_eq!(Polarity::Negative.invert(), Polarity::Positive);
    }
}
