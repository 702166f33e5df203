//! Discrete threshold-crossing searches.
//!
//! No interpolation is applied between samples: a crossing is the first
//! (or last) sample already lying on the peak side of the threshold, so
//! every timing measurement built on these searches carries a resolution
//! floor of one sample interval.

use crate::{polarity::Polarity, Real};

/// Index of the first sample at or after `search_from` lying on the peak
/// side of `threshold`, or `None` when no sample in the window qualifies.
pub fn first_crossing_index(
    samples: &[Real],
    threshold: Real,
    polarity: Polarity,
    search_from: usize,
) -> Option<usize> {
    samples
        .iter()
        .enumerate()
        .skip(search_from)
        .find(|&(_, &value)| polarity.exceeds(value, threshold))
        .map(|(index, _)| index)
}

/// Time of the first threshold crossing at or after `search_from`.
///
/// A `None` here indicates a malformed or clipped pulse; callers surface
/// it as a [`NoCrossing`](crate::AnalysisError::NoCrossing) error rather
/// than defaulting the timing.
pub fn first_crossing(
    time: &[Real],
    samples: &[Real],
    threshold: Real,
    polarity: Polarity,
    search_from: usize,
) -> Option<Real> {
    first_crossing_index(samples, threshold, polarity, search_from).map(|index| time[index])
}

/// Time of the last sample in the whole trace lying on the peak side of
/// `threshold`.
pub fn last_crossing(
    time: &[Real],
    samples: &[Real],
    threshold: Real,
    polarity: Polarity,
) -> Option<Real> {
    samples
        .iter()
        .rposition(|&value| polarity.exceeds(value, threshold))
        .map(|index| time[index])
}
