//! Scan-line assembly and the output raster
//!
//! The second forward pass turns the conditioned 1-D stream into a
//! 2-D image. Column position is nominally `index mod width`, but the
//! true line period drifts against the assumed one, so the assembler
//! behaves as a software phase-locked loop: each accepted sync-A
//! marker re-anchors the horizontal origin of the current line, and a
//! debounce interval keeps the oversampled correlator from
//! re-triggering on the same marker.

#[cfg(not(test))]
use log::{debug, info};

#[cfg(test)]
use std::println as debug;
#[cfg(test)]
use std::println as info;

use crate::conditioner::SignalStats;
use crate::sync::SyncDetector;

/// Mid-gray intensity for streams with no amplitude range
const FLAT_LEVEL: u8 = 128;

/// Grayscale output raster
///
/// Row-major 8-bit intensity grid. Cells may be overwritten when a
/// phase reset wraps column indices; the last write for a cell wins.
/// Cells the stream never reaches (the tail of a partial final line)
/// keep their initial black.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelGrid {
    /// Size a grid for a stream of `len` samples at `width` samples
    /// per line
    ///
    /// The height is the number of lines needed to hold every sample,
    /// so a partial trailing line still gets a row.
    pub fn for_stream(len: usize, width: usize) -> Self {
        assert!(width > 0);
        let height = len.div_ceil(width);
        Self {
            width,
            height,
            data: vec![0u8; width * height],
        }
    }

    /// Grid width, in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height, in lines
    pub fn height(&self) -> usize {
        self.height
    }

    /// Intensity at `(x, y)`
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    /// Raw row-major pixels
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the grid, returning the row-major pixels
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    fn set(&mut self, x: usize, y: usize, value: u8) {
        self.data[y * self.width + x] = value;
    }
}

/// Horizontal phase state
///
/// Carries the current line-start offset (`sync_x`) and the debounce
/// counter across the assembly pass. Only an accepted sync-A marker
/// mutates the phase.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SyncTracker {
    sync_x: usize,
    samples_since_marker: u32,
    debounce: u32,
}

impl SyncTracker {
    pub(crate) fn new(debounce: u32) -> Self {
        Self {
            sync_x: 0,
            samples_since_marker: 0,
            debounce,
        }
    }

    /// Current horizontal origin
    #[inline]
    pub(crate) fn sync_x(&self) -> usize {
        self.sync_x
    }

    /// Advance one sample
    ///
    /// `sync_a` is the correlator's verdict at this sample and `x`
    /// the raw column. Returns true when the marker is accepted and
    /// the phase re-anchored. The counter advances on every call, so
    /// the debounce window is measured in samples regardless of
    /// outcome.
    pub(crate) fn observe(&mut self, sync_a: bool, x: usize) -> bool {
        let accepted = sync_a && self.samples_since_marker > self.debounce;
        if accepted {
            self.sync_x = x;
            self.samples_since_marker = 0;
        }
        self.samples_since_marker += 1;
        accepted
    }
}

/// Second-pass state machine: normalization and phase-locked placement
///
/// Consumes the conditioned stream strictly in index order, querying
/// the [`SyncDetector`] at every sample, and writes normalized
/// intensities into a [`PixelGrid`].
#[derive(Clone, Debug)]
pub struct LineAssembler {
    width: usize,
    tracker: SyncTracker,
}

impl LineAssembler {
    /// Create an assembler for `width` samples per line
    ///
    /// `debounce` is the minimum number of samples between two
    /// accepted sync-A markers.
    pub fn new(width: usize, debounce: u32) -> Self {
        assert!(width > 0);
        Self {
            width,
            tracker: SyncTracker::new(debounce),
        }
    }

    /// Assemble the conditioned stream into a raster
    ///
    /// Intensities are scaled to the full 8-bit range from the stream
    /// extrema. A flat stream (no range at all) maps to mid-gray
    /// rather than dividing by zero.
    pub fn assemble(
        &mut self,
        signal: &[f32],
        stats: &SignalStats,
        detector: &SyncDetector,
    ) -> PixelGrid {
        let mut grid = PixelGrid::for_stream(signal.len(), self.width);

        let flat = stats.is_flat();
        let scale = if flat {
            0.0
        } else {
            255.0 / (stats.max - stats.min)
        };

        let mut resets = 0u32;
        for (i, &sa) in signal.iter().enumerate() {
            let pixel = if flat {
                FLAT_LEVEL
            } else {
                ((sa - stats.min) * scale).round().clamp(0.0, 255.0) as u8
            };

            let x = i % self.width;
            let y = i / self.width;

            let found = detector.detect(signal, i, stats.average);
            if self.tracker.observe(found.sync_a, x) {
                resets += 1;
                debug!("line {}: phase re-anchored to column {}", y, x);
            }

            let column = (x + self.width - self.tracker.sync_x()) % self.width;
            grid.set(column, y, pixel);
        }

        info!(
            "assembled {}x{} raster, {} phase resets",
            grid.width(),
            grid.height(),
            resets
        );
        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::sync::SyncDetector;

    #[test]
    fn test_grid_sizing() {
        let grid = PixelGrid::for_stream(5512 * 100 + 10, 5512);
        assert_eq!(5512, grid.width());
        assert_eq!(101, grid.height());

        // an exact multiple needs no extra line
        let grid = PixelGrid::for_stream(5512 * 100, 5512);
        assert_eq!(100, grid.height());
    }

    #[test]
    fn test_tracker_debounce() {
        let mut uut = SyncTracker::new(500);

        // a marker inside the initial holdoff is ignored
        assert!(!uut.observe(true, 3));

        for _ in 0..600 {
            assert!(!uut.observe(false, 0));
        }
        assert!(uut.observe(true, 7));
        assert_eq!(7, uut.sync_x());

        // correlator re-fires on nearby offsets of the same marker
        for x in 8..100 {
            assert!(!uut.observe(true, x));
        }
        assert_eq!(7, uut.sync_x());

        // one full line later the next marker is accepted
        for _ in 0..500 {
            uut.observe(false, 0);
        }
        assert!(uut.observe(true, 9));
        assert_eq!(9, uut.sync_x());
    }

    #[test]
    fn test_tracker_column_wrap() {
        let width = 10usize;
        let mut uut = SyncTracker::new(0);
        for _ in 0..10 {
            uut.observe(false, 0);
        }
        uut.observe(true, 7);

        let columns: Vec<usize> = (0..width)
            .map(|x| (x + width - uut.sync_x()) % width)
            .collect();
        assert_eq!(vec![3, 4, 5, 6, 7, 8, 9, 0, 1, 2], columns);
        assert!(columns.iter().all(|&c| c < width));
    }

    #[test]
    fn test_flat_stream_is_mid_gray() {
        let detector = SyncDetector::new(48000).unwrap();
        let stats = SignalStats {
            min: 0.3,
            max: 0.3,
            average: 0.3,
        };
        let signal = vec![0.3f32; 100];

        let mut uut = LineAssembler::new(10, 500);
        let grid = uut.assemble(&signal, &stats, &detector);

        assert_eq!(10, grid.width());
        assert_eq!(10, grid.height());
        assert!(grid.as_bytes().iter().all(|&px| px == FLAT_LEVEL));
    }

    #[test]
    fn test_normalization_spans_range() {
        let detector = SyncDetector::new(48000).unwrap();
        let stats = SignalStats {
            min: 0.0,
            max: 1.0,
            average: 0.5,
        };
        // too short for any sync window, so placement is unwrapped
        let signal = vec![0.0f32, 0.25, 0.5, 0.75, 1.0, 0.0];

        let mut uut = LineAssembler::new(3, 500);
        let grid = uut.assemble(&signal, &stats, &detector);

        assert_eq!(0, grid.get(0, 0));
        assert_eq!(64, grid.get(1, 0));
        assert_eq!(128, grid.get(2, 0));
        assert_eq!(191, grid.get(0, 1));
        assert_eq!(255, grid.get(1, 1));
    }
}
