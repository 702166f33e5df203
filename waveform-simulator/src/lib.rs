//! Synthetic generation of correlated pulse pairs, for exercising the
//! analysis pipeline without a pulser or scope attached.
//!
//! Each simulated trigger event shares one fire-time offset between the
//! two channels; on top of that every channel adds its own timing jitter,
//! amplitude scale and sample noise. Generation is driven by a seeded RNG
//! so runs are reproducible.

use pulse_features::{AnalysisError, Real, WaveformSet};
use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, Normal, NormalError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid spread parameter: {0}")]
    BadSpread(#[from] NormalError),
    #[error("{0}")]
    Analysis(#[from] AnalysisError),
}

/// Analytic pulse shapes, evaluable at any time point. A negative
/// amplitude produces a negative-going pulse.
#[derive(Debug, Clone, Copy)]
pub enum PulseTemplate {
    Triangular {
        start: Real,
        peak_time: Real,
        stop: Real,
        amplitude: Real,
    },
    Gaussian {
        mean: Real,
        sd: Real,
        peak_amplitude: Real,
    },
}

impl PulseTemplate {
    pub fn value(&self, time: Real) -> Real {
        match *self {
            Self::Triangular {
                start,
                peak_time,
                stop,
                amplitude,
            } => {
                if start <= time && time < peak_time {
                    amplitude * (time - start) / (peak_time - start)
                } else if peak_time <= time && time < stop {
                    amplitude * (stop - time) / (stop - peak_time)
                } else {
                    Real::default()
                }
            }
            Self::Gaussian {
                mean,
                sd,
                peak_amplitude,
            } => peak_amplitude * f64::exp(-0.5 * f64::powi((time - mean) / sd, 2)),
        }
    }
}

/// Per-channel shape and spread parameters.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    pub template: PulseTemplate,
    /// Fractional pulse-to-pulse amplitude spread.
    pub amplitude_spread: Real,
    /// Standard deviation of this channel's own timing jitter, seconds.
    pub timing_jitter: Real,
    /// Standard deviation of additive sample noise, volts.
    pub noise: Real,
}

#[derive(Debug, Clone)]
pub struct PulsePairConfig {
    pub num_pulses: usize,
    pub num_samples: usize,
    /// Uniform time-axis step, seconds.
    pub sample_interval: Real,
    /// Spread of the fire-time offset shared by both channels of an
    /// event. Common to the pair, so it cancels in the jitter statistic.
    pub fire_spread: Real,
    pub trigger: ChannelConfig,
    pub signal: ChannelConfig,
    pub seed: u64,
}

struct RecordSampler<'a> {
    channel: &'a ChannelConfig,
    shift: Normal<Real>,
    scale: Normal<Real>,
    noise: Normal<Real>,
}

impl<'a> RecordSampler<'a> {
    fn new(channel: &'a ChannelConfig) -> Result<Self, SimulationError> {
        Ok(RecordSampler {
            channel,
            shift: Normal::new(0.0, channel.timing_jitter)?,
            scale: Normal::new(1.0, channel.amplitude_spread)?,
            noise: Normal::new(0.0, channel.noise)?,
        })
    }

    fn synthesise(
        &self,
        fire_time: Real,
        num_samples: usize,
        sample_interval: Real,
        rng: &mut StdRng,
    ) -> Vec<Real> {
        let shift = fire_time + self.shift.sample(rng);
        let scale = self.scale.sample(rng);
        (0..num_samples)
            .map(|index| {
                let time = index as Real * sample_interval;
                scale * self.channel.template.value(time - shift) + self.noise.sample(rng)
            })
            .collect()
    }
}

/// Generates one capture run of correlated trigger/signal pulse pairs.
pub fn simulate_pair(
    config: &PulsePairConfig,
) -> Result<(WaveformSet, WaveformSet), SimulationError> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let fire = Normal::new(0.0, config.fire_spread)?;
    let trigger = RecordSampler::new(&config.trigger)?;
    let signal = RecordSampler::new(&config.signal)?;

    let mut trigger_pulses = Vec::with_capacity(config.num_pulses);
    let mut signal_pulses = Vec::with_capacity(config.num_pulses);
    for _ in 0..config.num_pulses {
        let fire_time = fire.sample(&mut rng);
        trigger_pulses.push(trigger.synthesise(
            fire_time,
            config.num_samples,
            config.sample_interval,
            &mut rng,
        ));
        signal_pulses.push(signal.synthesise(
            fire_time,
            config.num_samples,
            config.sample_interval,
            &mut rng,
        ));
    }

    Ok((
        WaveformSet::from_sample_interval(config.sample_interval, trigger_pulses)?,
        WaveformSet::from_sample_interval(config.sample_interval, signal_pulses)?,
    ))
}
