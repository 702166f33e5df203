//! Text summaries of analysis results, in display units (ns, ps, mV).
//! The analysis itself works in seconds and volts throughout; unit
//! conversion happens only here.

use pulse_features::{FeatureSummary, JitterSummary, SummaryStats};
use std::fmt::Write;

fn stat_line(name: &str, stats: &SummaryStats, scale: f64, unit: &str) -> String {
    format!(
        "  {name:<9} = {0:>9.3} +/- {1:.3} {unit}",
        stats.mean * scale,
        stats.std_dev * scale,
    )
}

/// One channel's feature report, in the style of the acquisition run
/// logs: one line per measurement with its ensemble spread.
pub fn feature_report(label: &str, num_pulses: usize, summary: &FeatureSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{label} channel ({num_pulses} pulses):");
    let _ = writeln!(out, "{}", stat_line("Area", &summary.area, 1e9, "nVs"));
    let _ = writeln!(out, "{}", stat_line("Peak", &summary.peak, 1e3, "mV"));
    let _ = writeln!(
        out,
        "{}",
        stat_line("Rise time", &summary.rise_time, 1e9, "ns")
    );
    let _ = writeln!(
        out,
        "{}",
        stat_line("Fall time", &summary.fall_time, 1e9, "ns")
    );
    let _ = writeln!(out, "{}", stat_line("Width", &summary.width, 1e9, "ns"));
    out
}

pub fn jitter_report(summary: &JitterSummary) -> String {
    format!(
        "Jitter = {0:.2} +/- {1:.2} ps (mean separation {2:.3} ns)",
        summary.std_dev * 1e12,
        summary.std_error * 1e12,
        summary.mean_separation * 1e9,
    )
}
