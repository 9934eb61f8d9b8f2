//! Envelope detection and baseband conditioning

#[cfg(not(test))]
use log::debug;

#[cfg(test)]
use std::println as debug;

use crate::filter::FirFilter;
use crate::notch::Notch;

/// Global statistics over one conditioned stream
///
/// Computed in the same forward pass as the filtering. The extrema
/// bound every conditioned sample and feed pixel normalization; the
/// average is the decision threshold for sync correlation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SignalStats {
    /// Smallest conditioned sample
    pub min: f32,

    /// Largest conditioned sample
    pub max: f32,

    /// Mean conditioned level
    pub average: f32,
}

impl SignalStats {
    /// True when the stream carried no amplitude variation at all
    ///
    /// A silent or constant recording conditions to a flat stream.
    /// Normalization must special-case this instead of dividing by
    /// the zero range.
    #[inline]
    pub fn is_flat(&self) -> bool {
        self.max == self.min
    }
}

/// Envelope detector and baseband chain
///
/// Converts raw audio into the demodulated video baseband in one
/// forward pass per stream:
///
/// 1. Envelope detection: the magnitude of each sample, which
///    recovers the AM envelope of the subcarrier.
/// 2. Low-pass FIR filtering down to the pixel-clock bandwidth.
/// 3. A narrow notch on the subcarrier frequency to suppress
///    residual leakage.
///
/// Both filters are causal and keep their state across samples within
/// one run. [`reset()`](SignalConditioner::reset) returns them to
/// zero initial conditions for the next stream.
#[derive(Clone, Debug)]
pub struct SignalConditioner {
    lowpass: FirFilter,
    carrier_reject: Notch,
}

impl SignalConditioner {
    /// Create from the two filter stages
    pub fn new(lowpass: FirFilter, carrier_reject: Notch) -> Self {
        Self {
            lowpass,
            carrier_reject,
        }
    }

    /// Reset both filters to zero initial conditions
    pub fn reset(&mut self) {
        self.lowpass.reset();
        self.carrier_reject.reset();
    }

    /// Condition a sample stream
    ///
    /// Returns the conditioned stream, the same length as `samples`,
    /// together with its [`SignalStats`]. Output is a pure
    /// deterministic function of the input order.
    ///
    /// The average accumulates incrementally as `sum += sample / len`
    /// rather than summing first and dividing once. The two are not
    /// numerically identical; the incremental form is the reference
    /// behavior and is kept as-is.
    pub fn condition(&mut self, samples: &[f32]) -> (Vec<f32>, SignalStats) {
        if samples.is_empty() {
            return (Vec::new(), SignalStats::default());
        }

        let len = samples.len() as f32;
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        let mut average = 0.0f32;
        let mut out = Vec::with_capacity(samples.len());

        for &raw in samples {
            let mut sa = raw.abs();
            sa = self.lowpass.process(sa);
            sa = self.carrier_reject.process(sa);

            average += sa / len;
            min = min.min(sa);
            max = max.max(sa);
            out.push(sa);
        }

        let stats = SignalStats { min, max, average };
        debug!(
            "conditioned {} samples: min {:.4} max {:.4} avg {:.4}",
            out.len(),
            stats.min,
            stats.max,
            stats.average
        );
        (out, stats)
    }
}
