//! This crate provides pulse-shape measurements for digitised scope
//! captures.
//!
//! A capture takes the form of a shared time axis and one amplitude
//! record per trigger event, wrapped in a [`WaveformSet`]. Typical usage
//! of this crate may look like:
//! ```rust
//! use pulse_features::{extract_features, WaveformSet};
//!
//! let time: Vec<f64> = (0..8).map(|i| i as f64 * 1e-9).collect();
//! let pulse = vec![0.0, 0.2, 0.8, 1.0, 0.8, 0.4, 0.2, 0.0];
//! let set = WaveformSet::new(time, vec![pulse.clone(), pulse])?;
//!
//! let summary = extract_features(&set)?;
//! assert_eq!(summary.peak.mean, 1.0);
//! # Ok::<(), pulse_features::AnalysisError>(())
//! ```
//!
//! All time values are seconds, all amplitudes are volts, areas are
//! volt-seconds. Conversion to display units is a presentation concern.

pub mod crossing;
pub mod error;
pub mod features;
pub mod jitter;
pub mod polarity;
pub mod stats;
pub mod waveform;

pub use crossing::{first_crossing, last_crossing};
pub use error::{AnalysisError, AnalysisResult, Feature};
pub use features::{extract_features, FeatureSummary, PulseFeatures};
pub use jitter::{compute_jitter, JitterSummary};
pub use polarity::Polarity;
pub use stats::SummaryStats;
pub use waveform::WaveformSet;

pub type Real = f64;
