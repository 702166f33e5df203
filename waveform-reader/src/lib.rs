//! This crate reads persisted scope captures and rebuilds the per-channel
//! waveform sets consumed by the analysis routines, plus the text
//! reporting used by the command-line tool.

pub mod loader;
pub mod report;

pub use loader::{CaptureFile, CaptureHeader, CaptureWriter, LoaderError};
