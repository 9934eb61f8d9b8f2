//! Sync-marker correlation
//!
//! Every APT scan line opens with one of two telemetry markers: a
//! square-wave pulse train bracketed by quiet zones. The
//! [`SyncDetector`] tests whether a marker begins at a given position
//! in the conditioned stream by thresholding samples against the
//! stream's own mean level and counting agreements with the expected
//! pattern. Majority-vote correlation, rather than exact match,
//! tolerates demodulation jitter and additive noise; thresholding
//! against the running average adapts to amplitude drift.

#[cfg(not(test))]
use log::{debug, warn};

#[cfg(test)]
use std::println as debug;
#[cfg(test)]
use std::println as warn;

use crate::decoder::DecodeError;

/// Nominal APT word rate, in symbols per second
pub const WORD_RATE: u32 = 4160;

/// Symbols spanned by one correlation window
pub const SYNC_LENGTH: usize = 40;

/// Sync-A marker: a quiet zone, seven 2-on/2-off pulses, a quiet zone
pub const SYNC_A: [bool; 40] = [
    false, false, false, false,
    true, true, false, false,
    true, true, false, false,
    true, true, false, false,
    true, true, false, false,
    true, true, false, false,
    true, true, false, false,
    true, true, false, false,
    false, false, false, false,
    false, false, false, false,
];

/// Sync-B marker: a quiet zone, seven 3-on/2-off pulses, one quiet symbol
pub const SYNC_B: [bool; 40] = [
    false, false, false, false,
    true, true, true, false, false,
    true, true, true, false, false,
    true, true, true, false, false,
    true, true, true, false, false,
    true, true, true, false, false,
    true, true, true, false, false,
    true, true, true, false, false,
    false,
];

/// Outcome of one correlation test
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncDetect {
    /// A sync-A marker begins at the tested position
    pub sync_a: bool,

    /// A sync-B marker begins at the tested position
    pub sync_b: bool,
}

/// Correlates the conditioned stream against the line-start markers
///
/// The detector is sized once from the sampling rate:
/// oversampling by two within each symbol gives phase tolerance, and
/// the match threshold admits noisy streams that still agree with the
/// pattern by a strong majority.
#[derive(Clone, Debug)]
pub struct SyncDetector {
    samples_per_symbol: usize,
    step: usize,
    window: usize,
    required_matches: usize,
}

impl SyncDetector {
    /// Create a detector for the given sampling rate
    ///
    /// Fails with [`DecodeError::UnsupportedRate`] when the rate is
    /// too low to resolve individual symbols, or when the derived
    /// scan window would index past the marker tables.
    pub fn new(sample_rate: u32) -> Result<Self, DecodeError> {
        let samples_per_symbol =
            (sample_rate as f32 / WORD_RATE as f32).round() as usize;
        if samples_per_symbol == 0 {
            return Err(DecodeError::UnsupportedRate(sample_rate));
        }

        let step = samples_per_symbol / 2;
        if step == 0 {
            return Err(DecodeError::UnsupportedRate(sample_rate));
        }

        let window = samples_per_symbol * SYNC_LENGTH;

        // every symbol index the scan loop can reach must stay inside
        // both marker tables
        let last_symbol = (window - 1) / samples_per_symbol;
        if last_symbol >= SYNC_A.len() || last_symbol >= SYNC_B.len() {
            return Err(DecodeError::UnsupportedRate(sample_rate));
        }

        let required_matches = 370 / step;
        let comparisons = window.div_ceil(step);
        if required_matches >= comparisons {
            warn!(
                "sync detection cannot fire at {} Hz: \
                 threshold {} of {} comparisons; image will not be phase-locked",
                sample_rate, required_matches, comparisons
            );
        } else {
            debug!(
                "sync detector: {} samples/symbol, window {}, threshold {}/{}",
                samples_per_symbol, window, required_matches, comparisons
            );
        }

        Ok(Self {
            samples_per_symbol,
            step,
            window,
            required_matches,
        })
    }

    /// Samples spanned by one correlation window
    pub fn window(&self) -> usize {
        self.window
    }

    /// Test for markers beginning at `start`
    ///
    /// `average` is the decision threshold: samples above it read as
    /// "high". Positions too close to the end of the stream for a
    /// full window never match.
    pub fn detect(&self, signal: &[f32], start: usize, average: f32) -> SyncDetect {
        if start + self.window >= signal.len() {
            return SyncDetect::default();
        }

        let mut matches_a = 0usize;
        let mut matches_b = 0usize;

        let mut p = 0;
        while p < self.window {
            let high = signal[start + p] > average;
            let symbol = p / self.samples_per_symbol;
            matches_a += (high == SYNC_A[symbol]) as usize;
            matches_b += (high == SYNC_B[symbol]) as usize;
            p += self.step;
        }

        SyncDetect {
            sync_a: matches_a > self.required_matches,
            sync_b: matches_b > self.required_matches,
        }
    }
}
