//! # FIR low-pass filtering
//!
//! The video signal rides on a 2400 Hz AM subcarrier. After envelope
//! detection, everything above the pixel-clock bandwidth is noise and
//! harmonic residue, and a low-pass FIR filter removes it.
//!
//! FIR filtering is a convolution with an impulse response `h`, split
//! into two operations:
//!
//! 1. Multiply-accumulate: a window holding the previous `h.len()`
//!    input samples is multiplied element-wise with `h` and summed.
//! 2. Sliding window: each new input sample is shifted onto the
//!    window and the oldest sample is aged off.
//!
//! [`FirCoeff`] implements (1) and [`Window`] implements (2).
//! [`FirFilter`] owns one of each and exposes the per-sample
//! [`process()`](FirFilter::process) operation the conditioning chain
//! runs on. Coefficients come either from an explicit impulse
//! response or from the windowed-sinc designer in
//! [`FirFilter::lowpass`].

use nalgebra::DVector;
use slice_ring_buffer::SliceRingBuffer;

/// FIR filter coefficients
///
/// Holds the impulse response `h`, in the same representation as GNU
/// Octave's `filter()` function. Internally the coefficients are
/// stored reversed, which lets the multiply-accumulate run directly
/// against an oldest-first sample history.
#[derive(Clone, Debug, PartialEq)]
pub struct FirCoeff(DVector<f32>);

impl FirCoeff {
    /// Create from an impulse response
    pub fn from_slice<S>(h: S) -> Self
    where
        S: AsRef<[f32]>,
    {
        let inp = h.as_ref();
        FirCoeff(DVector::from_iterator(
            inp.len(),
            inp.iter().rev().copied(),
        ))
    }

    /// Number of filter taps
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if there are no taps at all
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Perform FIR filtering with the given sample history
    ///
    /// `history` must be ordered oldest-first: `history[0]` is the
    /// least recent sample and `history[N-1]` the most recent. The
    /// history *should* contain `self.len()` samples. If it is
    /// shorter, the missing past is treated as zeros; if longer, the
    /// excess oldest samples are ignored.
    pub fn filter<S>(&self, history: S) -> f32
    where
        S: AsRef<[f32]>,
    {
        multiply_accumulate(history.as_ref(), self.0.as_slice())
    }

    /// Coefficients, in *reverse* order from their Octave representation
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        self.0.as_slice()
    }
}

impl AsRef<[f32]> for FirCoeff {
    #[inline]
    fn as_ref(&self) -> &[f32] {
        self.as_slice()
    }
}

/// Sliding sample window
///
/// Fixed-length lookback window for FIR filtering. The window starts
/// zero-filled, so the filter is causal with zero initial conditions.
#[derive(Clone, Debug)]
pub struct Window(SliceRingBuffer<f32>);

impl Window {
    /// Create a zero-filled window of length `len`
    pub fn new(len: usize) -> Self {
        let mut out = Self(SliceRingBuffer::with_capacity(len));
        for _ in 0..len {
            out.0.push_back(0.0f32);
        }
        out
    }

    /// Reset to zero initial conditions
    pub fn reset(&mut self) {
        let len = self.0.len();
        self.0.clear();
        for _ in 0..len {
            self.0.push_back(0.0f32);
        }
    }

    /// Window length
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for a zero-length window
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Shift one sample onto the window
    ///
    /// The `input` becomes the most recent sample. Returns the sample
    /// that aged off the far end.
    pub fn push(&mut self, input: f32) -> f32 {
        let aged = self.0.pop_front().unwrap_or(0.0f32);
        self.0.push_back(input);
        aged
    }

    /// Current contents, oldest sample first
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        self.0.as_slice()
    }
}

impl AsRef<[f32]> for Window {
    fn as_ref(&self) -> &[f32] {
        self.as_slice()
    }
}

/// Causal FIR filter with owned delay-line state
///
/// One `process()` call consumes one input sample and produces one
/// output sample. State persists across calls until
/// [`reset()`](FirFilter::reset).
#[derive(Clone, Debug)]
pub struct FirFilter {
    coeff: FirCoeff,
    window: Window,
}

impl FirFilter {
    /// Create from explicit coefficients
    pub fn new(coeff: FirCoeff) -> Self {
        let window = Window::new(coeff.len());
        Self { coeff, window }
    }

    /// Design a windowed-sinc low-pass filter
    ///
    /// Builds a Hamming-windowed sinc impulse response of `len` taps
    /// with the cutoff at `cutoff` cycles per sample,
    /// `0.0 < cutoff < 0.5`. The taps are normalized to unity gain at
    /// DC, so a constant input settles to the same constant output.
    pub fn lowpass(len: usize, cutoff: f32) -> Self {
        assert!(len > 0);
        assert!(cutoff > 0.0 && cutoff < 0.5);

        // a single tap degenerates to the identity filter
        if len == 1 {
            return Self::new(FirCoeff::from_slice([1.0f32]));
        }

        let center = (len as f32 - 1.0) / 2.0;
        let mut taps: Vec<f32> = (0..len)
            .map(|n| {
                let t = n as f32 - center;
                let hamming = 0.54
                    - 0.46 * (std::f32::consts::TAU * n as f32 / (len as f32 - 1.0)).cos();
                2.0 * cutoff * sinc(2.0 * cutoff * t) * hamming
            })
            .collect();

        let sum: f32 = taps.iter().sum();
        for tap in taps.iter_mut() {
            *tap /= sum;
        }

        Self::new(FirCoeff::from_slice(taps))
    }

    /// Filter order (number of taps)
    pub fn len(&self) -> usize {
        self.coeff.len()
    }

    /// True if the filter has no taps
    pub fn is_empty(&self) -> bool {
        self.coeff.is_empty()
    }

    /// Reset the delay line to zero initial conditions
    pub fn reset(&mut self) {
        self.window.reset();
    }

    /// Process one sample, return one sample
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.window.push(input);
        self.coeff.filter(&self.window)
    }
}

#[inline]
fn sinc(x: f32) -> f32 {
    if x.abs() < 1.0e-6 {
        1.0
    } else {
        let px = std::f32::consts::PI * x;
        px.sin() / px
    }
}

// Multiply-accumulate operation
//
// Computes `out = Σ history[i] * rev_coeff[i]`, the core of FIR
// filtering. `history` is oldest-first and `rev_coeff` holds the taps
// reversed, so the zeroth tap lands on the newest sample. If the
// slices differ in length, the shorter one wins and the excess of the
// other is ignored from its old end.
fn multiply_accumulate(history: &[f32], rev_coeff: &[f32]) -> f32 {
    let mul_len = usize::min(history.len(), rev_coeff.len());
    let history = &history[history.len() - mul_len..];
    let rev_coeff = &rev_coeff[rev_coeff.len() - mul_len..];

    let mut out = 0.0f32;
    for (hi, co) in history.iter().zip(rev_coeff.iter()) {
        out += *hi * *co;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_multiply_accumulate() {
        let out = multiply_accumulate(&[0.0f32; 0], &[0.0f32; 0]);
        assert_eq!(0.0f32, out);

        // length mismatch clips to the newest end
        let out = multiply_accumulate(&[20.0f32, 1.0f32], &[1.0f32]);
        assert_eq!(1.0f32, out);
        let out = multiply_accumulate(&[1.0f32], &[20.0f32, 1.0f32]);
        assert_eq!(1.0f32, out);

        let out = multiply_accumulate(&[20.0f32, 20.0f32], &[-1.0f32, 1.0f32]);
        assert_approx_eq!(0.0f32, out);
    }

    #[test]
    fn test_window() {
        let mut wind = Window::new(4);
        assert_eq!(4, wind.len());
        assert_eq!(&[0.0f32, 0.0f32, 0.0f32, 0.0f32], wind.as_slice());

        assert_eq!(0.0f32, wind.push(1.0f32));
        assert_eq!(&[0.0f32, 0.0f32, 0.0f32, 1.0f32], wind.as_slice());

        wind.push(2.0f32);
        wind.push(3.0f32);
        wind.push(4.0f32);
        assert_eq!(&[1.0f32, 2.0f32, 3.0f32, 4.0f32], wind.as_slice());

        // oldest sample ages off
        assert_eq!(1.0f32, wind.push(5.0f32));

        wind.reset();
        assert_eq!(4, wind.len());
        assert_eq!(&[0.0f32, 0.0f32, 0.0f32, 0.0f32], wind.as_slice());
    }

    #[test]
    fn test_identity_passthrough() {
        let mut filter = FirFilter::new(FirCoeff::from_slice([1.0f32]));
        assert_eq!(5.0f32, filter.process(5.0f32));
        assert_eq!(-3.0f32, filter.process(-3.0f32));
    }

    #[test]
    fn test_lowpass_design() {
        let filter = FirFilter::lowpass(50, 0.19);
        assert_eq!(50, filter.len());

        // unity DC gain and even symmetry
        let taps = filter.coeff.as_slice();
        let sum: f32 = taps.iter().sum();
        assert_approx_eq!(1.0f32, sum, 1.0e-5);
        for i in 0..taps.len() / 2 {
            assert_approx_eq!(taps[i], taps[taps.len() - 1 - i], 1.0e-6);
        }
    }

    #[test]
    fn test_lowpass_dc_settles() {
        let mut filter = FirFilter::lowpass(50, 0.2);
        let mut out = 0.0f32;
        for _ in 0..200 {
            out = filter.process(1.0f32);
        }
        assert_approx_eq!(1.0f32, out, 1.0e-4);
    }

    #[test]
    fn test_lowpass_rejects_stopband_tone() {
        let mut filter = FirFilter::lowpass(50, 0.19);
        let mut worst = 0.0f32;
        for n in 0..400 {
            let tone = (std::f32::consts::TAU * 0.45f32 * n as f32).sin();
            let out = filter.process(tone);
            if n >= 100 {
                worst = worst.max(out.abs());
            }
        }
        assert!(worst < 0.05, "stopband leakage {}", worst);
    }
}
