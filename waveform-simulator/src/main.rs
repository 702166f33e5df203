use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use pulse_features::Real;
use std::path::PathBuf;
use tracing::info;
use waveform_reader::loader::{CaptureHeader, CaptureWriter};
use waveform_simulator::{simulate_pair, ChannelConfig, PulsePairConfig, PulseTemplate};

#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Capture container to write.
    #[clap(short, long)]
    output: PathBuf,

    #[clap(long, default_value = "1000")]
    num_pulses: usize,

    #[clap(long, default_value = "500")]
    num_samples: usize,

    /// Sample interval in seconds.
    #[clap(long, default_value = "4e-10")]
    sample_interval: Real,

    /// Trigger pulse amplitude in volts.
    #[clap(long, default_value = "1.0", allow_hyphen_values = true)]
    trigger_amplitude: Real,

    /// Signal pulse amplitude in volts. Negative for a PMT-like pulse.
    #[clap(long, default_value = "-0.8", allow_hyphen_values = true)]
    signal_amplitude: Real,

    /// Fractional pulse-to-pulse amplitude spread.
    #[clap(long, default_value = "0.05")]
    amplitude_spread: Real,

    /// Per-channel timing jitter standard deviation in seconds.
    #[clap(long, default_value = "5e-11")]
    timing_jitter: Real,

    /// Spread of the fire time shared by both channels, in seconds.
    #[clap(long, default_value = "1e-9")]
    fire_spread: Real,

    /// Additive sample noise standard deviation in volts.
    #[clap(long, default_value = "2e-3")]
    noise: Real,

    #[clap(long, default_value = "0")]
    seed: u64,

    /// Run description stored in the container header.
    #[clap(long, default_value = "simulated correlated pulse pair")]
    description: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Cli::parse();

    let record_length = args.num_samples as Real * args.sample_interval;
    let channel = |mean: Real, sd: Real, amplitude: Real| ChannelConfig {
        template: PulseTemplate::Gaussian {
            mean,
            sd,
            peak_amplitude: amplitude,
        },
        amplitude_spread: args.amplitude_spread,
        timing_jitter: args.timing_jitter,
        noise: args.noise,
    };
    let config = PulsePairConfig {
        num_pulses: args.num_pulses,
        num_samples: args.num_samples,
        sample_interval: args.sample_interval,
        fire_spread: args.fire_spread,
        trigger: channel(
            0.3 * record_length,
            0.02 * record_length,
            args.trigger_amplitude,
        ),
        signal: channel(
            0.5 * record_length,
            0.03 * record_length,
            args.signal_amplitude,
        ),
        seed: args.seed,
    };

    let (trigger, signal) = simulate_pair(&config)?;

    let header = CaptureHeader {
        prog_version: format!("waveform-simulator {}", env!("CARGO_PKG_VERSION")),
        run_descript: args.description,
        timestamp: Utc::now(),
        channels: 2,
        samples: args.num_samples,
        sample_interval: args.sample_interval,
    };
    let mut writer = CaptureWriter::create(&args.output, header)?;
    for (a, b) in trigger.pulses().iter().zip(signal.pulses()) {
        writer.write_event(&[a.as_slice(), b.as_slice()])?;
    }
    info!(
        "wrote {} simulated events to {}",
        args.num_pulses,
        args.output.display()
    );
    Ok(())
}
