use std::borrow::Cow;
use std::path::Path;

use anyhow::{Context, Result};

/// Image dimensions: width, height, and number of channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageDimensions {
    /// Image width in pixels
    pub width: usize,
    /// Image height in pixels
    pub height: usize,
    /// Number of channels (1 for grayscale, 3 for RGB)
    pub channels: usize,
}

impl ImageDimensions {
    pub fn new(width: usize, height: usize, channels: usize) -> Self {
        assert!(width > 0, "Width must be positive");
        assert!(height > 0, "Height must be positive");
        assert!(
            channels == 1 || channels == 3,
            "Channels must be 1 or 3, got {}",
            channels
        );
        Self {
            width,
            height,
            channels,
        }
    }

    /// Number of pixel locations (width * height).
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Total number of samples (width * height * channels).
    pub fn sample_count(&self) -> usize {
        self.width * self.height * self.channels
    }

    /// Check if this is a grayscale image (1 channel).
    pub fn is_grayscale(&self) -> bool {
        self.channels == 1
    }

    /// Check if this is an RGB image (3 channels).
    pub fn is_rgb(&self) -> bool {
        self.channels == 3
    }
}

/// An 8-bit night-sky frame, grayscale or interleaved RGB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkyImage {
    /// Interleaved sample data, `dimensions.sample_count()` long
    pub pixels: Vec<u8>,
    /// Image dimensions
    pub dimensions: ImageDimensions,
}

impl SkyImage {
    /// Create an image from raw interleaved samples.
    /// Panics if the sample count does not match the dimensions.
    pub fn new(dimensions: ImageDimensions, pixels: Vec<u8>) -> Self {
        assert!(
            pixels.len() == dimensions.sample_count(),
            "Sample count mismatch: expected {}, got {}",
            dimensions.sample_count(),
            pixels.len()
        );
        Self { pixels, dimensions }
    }

    /// Create an all-black image.
    pub fn zeros(dimensions: ImageDimensions) -> Self {
        Self {
            pixels: vec![0; dimensions.sample_count()],
            dimensions,
        }
    }

    /// Load a sky frame from an image file.
    ///
    /// 8-bit grayscale files stay single-channel; everything else is
    /// converted to 8-bit RGB.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let decoded = image::open(path)
            .with_context(|| format!("Failed to decode image: {}", path.display()))?;

        Ok(match decoded {
            image::DynamicImage::ImageLuma8(gray) => {
                let (width, height) = gray.dimensions();
                Self::new(
                    ImageDimensions::new(width as usize, height as usize, 1),
                    gray.into_raw(),
                )
            }
            other => {
                let rgb = other.to_rgb8();
                let (width, height) = rgb.dimensions();
                Self::new(
                    ImageDimensions::new(width as usize, height as usize, 3),
                    rgb.into_raw(),
                )
            }
        })
    }

    /// Write the image to a file; the format follows the extension.
    pub fn save_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let width = self.dimensions.width as u32;
        let height = self.dimensions.height as u32;

        if self.dimensions.is_grayscale() {
            image::GrayImage::from_raw(width, height, self.pixels.clone())
                .context("Pixel buffer does not match dimensions")?
                .save(path)
        } else {
            image::RgbImage::from_raw(width, height, self.pixels.clone())
                .context("Pixel buffer does not match dimensions")?
                .save(path)
        }
        .with_context(|| format!("Failed to save image: {}", path.display()))
    }

    /// Single-channel luminance view of the image.
    ///
    /// Borrows the sample buffer for grayscale input; RGB input is reduced
    /// with the fixed-point Rec.601 weights (0.299 R + 0.587 G + 0.114 B).
    pub fn luminance(&self) -> Cow<'_, [u8]> {
        if self.dimensions.is_grayscale() {
            return Cow::Borrowed(&self.pixels);
        }

        let luma = self
            .pixels
            .chunks_exact(3)
            .map(|px| rec601_luma(px[0], px[1], px[2]))
            .collect();
        Cow::Owned(luma)
    }

    /// Mean luminance over all pixel locations.
    pub fn mean_luminance(&self) -> f32 {
        mean_luma(&self.luminance())
    }
}

/// Mean of a luminance slice.
pub(crate) fn mean_luma(luma: &[u8]) -> f32 {
    debug_assert!(!luma.is_empty());
    let sum: u64 = luma.iter().map(|&v| u64::from(v)).sum();
    sum as f32 / luma.len() as f32
}

/// Fixed-point Rec.601 luma with rounding.
fn rec601_luma(r: u8, g: u8, b: u8) -> u8 {
    ((299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b) + 500) / 1000) as u8
}
