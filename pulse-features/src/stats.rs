use crate::Real;

/// Ensemble `(mean, standard deviation)` of one scalar measurement.
///
/// The deviation is the population deviation over the whole ensemble.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SummaryStats {
    pub mean: Real,
    pub std_dev: Real,
}

/// Welford running accumulator with an exact merge, so partial
/// accumulators built by parallel workers combine into the same result as
/// a single sequential pass.
#[derive(Debug, Default, Clone)]
pub struct Accumulator {
    count: usize,
    mean: Real,
    sum_sq: Real,
}

impl Accumulator {
    pub fn push(&mut self, value: Real) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as Real;
        self.sum_sq += delta * (value - self.mean);
    }

    pub fn merge(self, other: Self) -> Self {
        if self.count == 0 {
            return other;
        }
        if other.count == 0 {
            return self;
        }
        let count = self.count + other.count;
        let delta = other.mean - self.mean;
        Accumulator {
            count,
            mean: self.mean + delta * other.count as Real / count as Real,
            sum_sq: self.sum_sq
                + other.sum_sq
                + delta * delta * (self.count as Real * other.count as Real) / count as Real,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn stats(&self) -> SummaryStats {
        if self.count == 0 {
            return SummaryStats::default();
        }
        SummaryStats {
            mean: self.mean,
            std_dev: (self.sum_sq / self.count as Real).sqrt(),
        }
    }
}

impl FromIterator<Real> for Accumulator {
    fn from_iter<I: IntoIterator<Item = Real>>(values: I) -> Self {
        let mut accumulator = Accumulator::default();
        for value in values {
            accumulator.push(value);
        }
        accumulator
    }
}
