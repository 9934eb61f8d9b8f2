//! Image output boundary

use anyhow::Context;
use image::imageops::{self, FilterType};
use image::GrayImage;

use aptdemod::PixelGrid;

/// Canonical APT image width, in pixels
pub const APT_IMAGE_WIDTH: u32 = 2080;

/// Resize the raster to the canonical width and write it out
///
/// The raster arrives one pixel per sample, so its width depends on
/// the recording's sampling rate. It is resampled horizontally to the
/// standard 2080-column APT line; the line count is preserved.
pub fn write_image(grid: PixelGrid, path: &str) -> Result<(), anyhow::Error> {
    let width = grid.width() as u32;
    let height = grid.height() as u32;

    let image = GrayImage::from_raw(width, height, grid.into_bytes())
        .context("raster dimensions disagree with pixel data")?;

    let resized = imageops::resize(&image, APT_IMAGE_WIDTH, height, FilterType::CatmullRom);
    resized
        .save(path)
        .with_context(|| format!("unable to write image \"{}\"", path))?;
    Ok(())
}
