//! Testing utilities for startrail.

#![allow(dead_code)]

use std::path::PathBuf;

use crate::{Frame, ImageDimensions, SkyImage};

/// Initialize tracing subscriber for tests.
/// Safe to call multiple times - will only initialize once.
/// Respects RUST_LOG env var, defaults to "info".
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Uniform single-channel frame with every sample set to `value`.
pub fn flat_frame(name: &str, width: usize, height: usize, value: u8) -> Frame {
    let dimensions = ImageDimensions::new(width, height, 1);
    Frame {
        path: PathBuf::from(name),
        image: SkyImage::new(dimensions, vec![value; dimensions.sample_count()]),
    }
}

/// Uniform RGB frame with every pixel set to `rgb`.
pub fn flat_rgb_frame(name: &str, width: usize, height: usize, rgb: [u8; 3]) -> Frame {
    let dimensions = ImageDimensions::new(width, height, 3);
    let mut pixels = Vec::with_capacity(dimensions.sample_count());
    for _ in 0..dimensions.pixel_count() {
        pixels.extend_from_slice(&rgb);
    }
    Frame {
        path: PathBuf::from(name),
        image: SkyImage::new(dimensions, pixels),
    }
}

/// Single-channel frame with a flat `base` sky and explicit
/// `(x, y, value)` star spots.
pub fn spot_frame(
    name: &str,
    width: usize,
    height: usize,
    base: u8,
    spots: &[(usize, usize, u8)],
) -> Frame {
    let mut frame = flat_frame(name, width, height, base);
    for &(x, y, value) in spots {
        frame.image.pixels[y * width + x] = value;
    }
    frame
}
