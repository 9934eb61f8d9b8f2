//! Full decode pipeline

#[cfg(not(test))]
use log::info;

#[cfg(test)]
use std::println as info;

use thiserror::Error;

use crate::builder::AptDecoderBuilder;
use crate::conditioner::SignalConditioner;
use crate::filter::FirFilter;
use crate::notch::Notch;
use crate::raster::{LineAssembler, PixelGrid};
use crate::sync::SyncDetector;

/// Decode failure
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The sampling rate cannot support the decoder
    ///
    /// Either the rate is too low to resolve the transmitted symbols
    /// for sync correlation, or it yields a zero-width scan line.
    #[error("unsupported sampling rate: {0} Hz cannot resolve symbol or line timing")]
    UnsupportedRate(u32),

    /// The input stream held no samples
    #[error("input stream is empty")]
    EmptyInput,
}

/// A complete APT decoder
///
/// The decoder takes `f32` audio samples of a received APT broadcast
/// and performs, in two sequential passes:
///
/// 1. Envelope detection, low-pass filtering, and subcarrier
///    rejection, with global statistics gathered along the way.
/// 2. Scan-line assembly: per-sample normalization, sync-marker
///    correlation, and phase-locked pixel placement.
///
/// Create it through [`AptDecoderBuilder`]. One decoder may be reused
/// for several recordings at the same sampling rate; every
/// [`decode()`](AptDecoder::decode) call starts from clean filter
/// state.
///
/// ```
/// use aptdemod::AptDecoderBuilder;
///
/// let mut decoder = AptDecoderBuilder::new(48000).build().expect("rate");
///
/// let audio = vec![0.0f32; 48000];
/// let image = decoder.decode(&audio).expect("decode");
/// assert_eq!(24000, image.width());
/// assert_eq!(2, image.height());
/// ```
#[derive(Clone, Debug)]
pub struct AptDecoder {
    conditioner: SignalConditioner,
    sync: SyncDetector,
    sample_rate: u32,
    line_width: usize,
    sync_debounce: u32,
}

impl AptDecoder {
    pub(crate) fn from_builder(cfg: &AptDecoderBuilder) -> Result<Self, DecodeError> {
        let sample_rate = cfg.sample_rate();
        let sync = SyncDetector::new(sample_rate)?;

        let line_width = (sample_rate as f32 * cfg.seconds_per_line()) as usize;
        if line_width == 0 {
            return Err(DecodeError::UnsupportedRate(sample_rate));
        }

        let rate = sample_rate as f32;
        let lowpass = FirFilter::lowpass(
            cfg.fir_length(),
            (cfg.lowpass_cutoff() / rate).clamp(1.0e-5, 0.4999),
        );
        let carrier_reject = Notch::new(
            (cfg.notch_freq() / rate).clamp(1.0e-5, 0.4999),
            cfg.notch_q(),
        );

        Ok(Self {
            conditioner: SignalConditioner::new(lowpass, carrier_reject),
            sync,
            sample_rate,
            line_width,
            sync_debounce: cfg.sync_debounce(),
        })
    }

    /// Input sampling rate, in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Raster width, in samples per scan line
    pub fn line_width(&self) -> usize {
        self.line_width
    }

    /// Clear all filter state back to zero initial conditions
    pub fn reset(&mut self) {
        self.conditioner.reset();
    }

    /// Decode one recording into a raster
    ///
    /// Runs both forward passes over `samples` and returns the
    /// assembled grid. The whole run is all-or-nothing: on error
    /// no partial raster is returned. Identical input at an identical
    /// rate produces a bit-identical grid.
    pub fn decode(&mut self, samples: &[f32]) -> Result<PixelGrid, DecodeError> {
        if samples.is_empty() {
            return Err(DecodeError::EmptyInput);
        }

        self.reset();

        info!(
            "decoding {} samples at {} Hz ({:.1} s of signal)",
            samples.len(),
            self.sample_rate,
            samples.len() as f32 / self.sample_rate as f32
        );

        let (conditioned, stats) = self.conditioner.condition(samples);

        let mut assembler = LineAssembler::new(self.line_width, self.sync_debounce);
        Ok(assembler.assemble(&conditioned, &stats, &self.sync))
    }
}
