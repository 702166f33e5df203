use anyhow::Result;
use clap::Parser;
use pulse_features::{compute_jitter, extract_features};
use std::path::PathBuf;
use tracing::info;
use waveform_reader::{loader::CaptureFile, report};

#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Capture container to analyse.
    #[clap(short, long)]
    file_name: PathBuf,

    /// Zero-based channel holding the trigger reference.
    #[clap(long, default_value = "0")]
    trigger_channel: usize,

    /// Zero-based channel holding the measured signal.
    #[clap(long, default_value = "1")]
    signal_channel: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Cli::parse();

    let mut capture = CaptureFile::open(&args.file_name)?;
    info!(
        "loaded {}: {} events of {} channels, {} samples at {:e} s",
        args.file_name.display(),
        capture.num_events(),
        capture.header().channels,
        capture.header().samples,
        capture.header().sample_interval,
    );

    let trigger = capture.channel_waveforms(args.trigger_channel)?;
    let signal = capture.channel_waveforms(args.signal_channel)?;

    let num_pulses = trigger.num_pulses();
    println!(
        "{}",
        report::feature_report("Trigger", num_pulses, &extract_features(&trigger)?)
    );
    println!(
        "{}",
        report::feature_report("Signal", num_pulses, &extract_features(&signal)?)
    );
    println!("{}", report::jitter_report(&compute_jitter(&trigger, &signal)?));
    Ok(())
}
