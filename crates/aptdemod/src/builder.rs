//! Decoder configuration

use crate::decoder::{AptDecoder, DecodeError};

/// Builds an APT decoder
///
/// The builder comes with the defaults the decoder was designed
/// around; all you really need to provide is the input sampling
/// rate. The API specified by the builder is part of this crate's
/// API. The actual default values are *not*, and are subject to
/// revision in any minor release. If you care very strongly about a
/// setting, configure it here.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AptDecoderBuilder {
    sample_rate: u32,
    fir_length: usize,
    lowpass_cutoff: f32,
    notch_freq: f32,
    notch_q: f32,
    seconds_per_line: f32,
    sync_debounce: u32,
}

impl AptDecoderBuilder {
    /// New decoder configuration
    ///
    /// The only mandatory parameter is the input sampling rate, in
    /// Hz. Sync correlation needs enough samples to oversample each
    /// transmitted symbol, so very low rates are rejected at
    /// [`build()`](AptDecoderBuilder::build) time. Soundcard rates
    /// like 44100 or 48000 work well.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            fir_length: 50,
            lowpass_cutoff: 2080.0,
            notch_freq: 2400.0,
            notch_q: 10.0,
            seconds_per_line: 0.5,
            sync_debounce: 500,
        }
    }

    /// Low-pass filter order and cutoff (Hz)
    ///
    /// The cutoff should sit near the pixel-clock bandwidth: content
    /// above it is carrier harmonics and noise, not video. The cutoff
    /// is clamped below the Nyquist frequency.
    pub fn with_lowpass(&mut self, taps: usize, cutoff_hz: f32) -> &mut Self {
        self.fir_length = taps.max(1);
        self.lowpass_cutoff = cutoff_hz.max(1.0);
        self
    }

    /// Subcarrier notch center (Hz) and Q factor
    ///
    /// The notch suppresses residual subcarrier leakage that makes it
    /// through the low-pass stage. Q sets the notch width relative to
    /// its center.
    pub fn with_carrier_reject(&mut self, center_hz: f32, q: f32) -> &mut Self {
        self.notch_freq = center_hz.max(1.0);
        self.notch_q = q.max(0.1);
        self
    }

    /// Transmitted line period, in seconds
    ///
    /// The nominal APT line rate is two lines per second. The line
    /// period fixes the raster width: `sample_rate × seconds`.
    pub fn with_line_period(&mut self, seconds: f32) -> &mut Self {
        self.seconds_per_line = seconds.clamp(0.001, 10.0);
        self
    }

    /// Minimum interval between accepted sync markers, in samples
    ///
    /// The correlator tolerates phase offsets, so a single marker
    /// matches at several adjacent positions. The debounce interval
    /// keeps those echoes from re-anchoring the line repeatedly.
    pub fn with_sync_debounce(&mut self, samples: u32) -> &mut Self {
        self.sync_debounce = samples;
        self
    }

    /// Build the decoder
    ///
    /// Validates the configuration against the sampling rate and
    /// fails fast with [`DecodeError::UnsupportedRate`] rather than
    /// letting a bad rate surface as out-of-bounds indexing or a
    /// zero-width raster deep inside a decode run.
    pub fn build(&self) -> Result<AptDecoder, DecodeError> {
        AptDecoder::from_builder(self)
    }

    pub(crate) fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub(crate) fn fir_length(&self) -> usize {
        self.fir_length
    }

    pub(crate) fn lowpass_cutoff(&self) -> f32 {
        self.lowpass_cutoff
    }

    pub(crate) fn notch_freq(&self) -> f32 {
        self.notch_freq
    }

    pub(crate) fn notch_q(&self) -> f32 {
        self.notch_q
    }

    pub(crate) fn seconds_per_line(&self) -> f32 {
        self.seconds_per_line
    }

    pub(crate) fn sync_debounce(&self) -> u32 {
        self.sync_debounce
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_build() {
        let decoder = AptDecoderBuilder::new(48000).build().unwrap();
        assert_eq!(48000, decoder.sample_rate());
        assert_eq!(24000, decoder.line_width());
    }

    #[test]
    fn test_setters_clamp() {
        let mut builder = AptDecoderBuilder::new(48000);
        builder
            .with_lowpass(0, -5.0)
            .with_carrier_reject(-1.0, 0.0)
            .with_line_period(0.0);

        // clamped values still build
        assert!(builder.build().is_ok());
    }

    #[test]
    fn test_low_rate_rejected() {
        assert!(matches!(
            AptDecoderBuilder::new(4000).build(),
            Err(DecodeError::UnsupportedRate(4000))
        ));
    }
}
