use thiserror::Error;

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// The measurement a threshold search was serving when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Feature {
    #[strum(to_string = "area")]
    Area,
    #[strum(to_string = "rise time")]
    RiseTime,
    #[strum(to_string = "fall time")]
    FallTime,
    #[strum(to_string = "width")]
    Width,
    #[strum(to_string = "peak")]
    Peak,
    #[strum(to_string = "constant-fraction timestamp")]
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Record {
    #[strum(to_string = "pulses")]
    Pulses,
    #[strum(to_string = "samples")]
    Samples,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("pulse {pulse} has {actual} samples, time axis has {expected}")]
    ShapeMismatch {
        pulse: usize,
        actual: usize,
        expected: usize,
    },
    #[error("at least {needed} {kind} required, found {found}")]
    InsufficientData {
        kind: Record,
        needed: usize,
        found: usize,
    },
    #[error("no {feature} threshold crossing in pulse {pulse}")]
    NoCrossing { pulse: usize, feature: Feature },
    #[error("channel pulse counts differ: {0} and {1}")]
    LengthMismatch(usize, usize),
}
