//! # aptdemod: weather-satellite APT image decoding
//!
//! This crate demodulates an audio recording of a weather-satellite
//! [Automatic Picture Transmission](https://en.wikipedia.org/wiki/Automatic_picture_transmission)
//! (APT) broadcast into a grayscale raster image. APT satellites
//! transmit two scan lines per second as amplitude modulation of a
//! 2400 Hz audio subcarrier; each line opens with a fixed sync marker
//! that lets the receiver keep lines horizontally aligned.
//!
//! ## Example
//!
//! You will first need baseband audio of an APT pass: a recording of
//! the FM-demodulated downlink, or of a radio's line output, as mono
//! `f32` samples. Obtaining and container-parsing the audio is beyond
//! the scope of this crate, as is encoding the finished raster to an
//! image file.
//!
//! ```
//! use aptdemod::AptDecoderBuilder;
//!
//! // create a decoder for your audio sampling rate
//! let mut decoder = AptDecoderBuilder::new(48000)
//!     .with_sync_debounce(500)
//!     .build()
//!     .expect("unsupported sampling rate");
//!
//! // four seconds of audio is eight scan lines
//! let audio = vec![0.0f32; 48000 * 4];
//! let image = decoder.decode(&audio).expect("decode failed");
//!
//! assert_eq!(24000, image.width());
//! assert_eq!(8, image.height());
//! ```
//!
//! The decode runs two sequential forward passes over the samples:
//!
//! 1. **Conditioning** — envelope detection, FIR low-pass filtering
//!    to the pixel-clock bandwidth, a notch on the residual
//!    subcarrier, and global min/max/average statistics.
//! 2. **Assembly** — per-sample normalization to 8-bit intensity,
//!    sync-marker correlation against the stream average, and
//!    phase-locked placement into the output grid: every accepted
//!    sync-A marker re-anchors the horizontal origin, so lines stay
//!    aligned even as the true line period drifts against the
//!    nominal one.
//!
//! The raster is `sample_rate / 2` pixels wide (one half-second line
//! period); resizing to the canonical 2080-column APT width is left
//! to the caller.

#![allow(dead_code)]

mod builder;
mod conditioner;
mod decoder;
mod filter;
mod notch;
mod raster;
mod sync;

pub use builder::AptDecoderBuilder;
pub use conditioner::SignalStats;
pub use decoder::{AptDecoder, DecodeError};
pub use raster::PixelGrid;
pub use sync::{SyncDetect, SyncDetector};
