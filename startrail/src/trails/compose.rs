//! Pixel-level masking and merge primitives for trail compositing.

use rayon::prelude::*;

use crate::SkyImage;

/// Binary star mask over pixel locations: true where the luminance sample is
/// strictly above `threshold`.
pub(crate) fn star_mask(luma: &[u8], threshold: u8) -> Vec<bool> {
    luma.iter().map(|&v| v > threshold).collect()
}

/// Count of luminance samples strictly above `threshold`.
pub(crate) fn count_above(luma: &[u8], threshold: u8) -> usize {
    luma.iter().filter(|&&v| v > threshold).count()
}

/// Write `src`'s masked pixels into `dst`, all channels, leaving the rest of
/// `dst` untouched.
///
/// This is the classic mask / inverse-mask / saturating-add merge: the two
/// masked regions are disjoint, so the sum at every location reduces to
/// selecting one side. Rows are processed in parallel.
pub(crate) fn overlay_masked(dst: &mut SkyImage, src: &SkyImage, mask: &[bool]) {
    debug_assert_eq!(dst.dimensions, src.dimensions);
    debug_assert_eq!(mask.len(), dst.dimensions.pixel_count());

    let width = dst.dimensions.width;
    let channels = dst.dimensions.channels;
    let row_samples = width * channels;

    dst.pixels
        .par_chunks_mut(row_samples)
        .zip(src.pixels.par_chunks(row_samples))
        .zip(mask.par_chunks(width))
        .for_each(|((dst_row, src_row), mask_row)| {
            for (x, &selected) in mask_row.iter().enumerate() {
                if selected {
                    let i = x * channels;
                    dst_row[i..i + channels].copy_from_slice(&src_row[i..i + channels]);
                }
            }
        });
}
