//! The per-frame trail accumulator.

use std::fmt;
use std::time::{Duration, Instant};

use strum_macros::Display;

use crate::sky_image::mean_luma;
use crate::{Frame, ImageDimensions, SkyImage};

use super::compose;
use super::error::{Error, InsufficientDataReason};
use super::TrailConfig;

/// Luminance threshold separating accumulated trail content from untouched
/// black during finalization.
///
/// Deliberately independent of [`TrailConfig::mask_threshold`]: accumulated
/// star pixels are far brighter than the all-zero base, so a low fixed cut
/// finds them, and raising it to the star threshold would alter the output.
const FINAL_TRAIL_THRESHOLD: u8 = 10;

/// Classification of a processed frame.
#[derive(Debug, Clone, Copy, PartialEq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum FrameOutcome {
    /// Frame passed both filters and painted its star pixels into the trail.
    Accepted,
    /// Mean luminance above the configured limit; nothing was recorded.
    ExcludedOverbright { mean: f32 },
    /// Too many star pixels (clouds, the moon, a flare); counted as excluded.
    ExcludedSaturated { bright_pixels: usize },
}

/// Counters and scores accumulated over a run.
#[derive(Debug, Clone, Default)]
pub struct TrailStats {
    /// Frames that passed both filters.
    pub accepted_frames: usize,
    /// Frames excluded for star/pixel saturation. Overbright exclusions are
    /// logged but not counted here.
    pub excluded_frames: usize,
    /// Mean luminance of the current background candidate, if any.
    pub background_score: Option<f32>,
    /// Wall-clock time spent inside `process_frame` and `finalize`.
    pub processing_elapsed: Duration,
}

impl fmt::Display for TrailStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TrailStats {{ accepted: {}, excluded: {}, background: {}, elapsed: {:?} }}",
            self.accepted_frames,
            self.excluded_frames,
            match self.background_score {
                Some(score) => format!("{:.2}", score),
                None => "none".to_string(),
            },
            self.processing_elapsed,
        )
    }
}

#[derive(Debug)]
struct BackgroundCandidate {
    image: SkyImage,
    score: f32,
}

/// Incremental star-trail accumulator.
///
/// Frames must be fed in ascending capture-time order: the background
/// candidate keeps the first of equally-dim frames, and later star pixels
/// overwrite earlier ones at the same location. The accumulator is strictly
/// sequential; feeding it from several threads requires external
/// serialization of the calls.
#[derive(Debug)]
pub struct TrailAccumulator {
    config: TrailConfig,
    /// Running composite; allocated by the first processed frame and never
    /// resized afterwards.
    trail: Option<SkyImage>,
    /// Saturation limit in pixels, derived once from the first frame.
    pixel_cutoff: f64,
    background: Option<BackgroundCandidate>,
    stats: TrailStats,
}

impl TrailAccumulator {
    /// Create an accumulator. Pure construction, no I/O.
    pub fn new(config: TrailConfig) -> Self {
        Self {
            config,
            trail: None,
            pixel_cutoff: 0.0,
            background: None,
            stats: TrailStats::default(),
        }
    }

    /// Counters for the run so far.
    pub fn stats(&self) -> &TrailStats {
        &self.stats
    }

    /// Dimensions established by the first processed frame, if any.
    pub fn dimensions(&self) -> Option<ImageDimensions> {
        self.trail.as_ref().map(|trail| trail.dimensions)
    }

    /// Classify `frame` and, if accepted, composite it into the trail.
    ///
    /// The first frame establishes the canvas dimensions; every later frame
    /// must match them or the call fails with
    /// [`Error::DimensionMismatch`] and the state is left untouched.
    pub fn process_frame(&mut self, frame: Frame) -> Result<FrameOutcome, Error> {
        let started = Instant::now();

        match &self.trail {
            Some(trail) if trail.dimensions != frame.image.dimensions => {
                return Err(Error::DimensionMismatch {
                    expected: trail.dimensions,
                    actual: frame.image.dimensions,
                });
            }
            Some(_) => {}
            None => {
                // The first frame establishes the canvas whether or not it
                // survives the filters below.
                self.pixel_cutoff = frame.image.dimensions.pixel_count() as f64
                    * f64::from(self.config.pixel_cutoff_percent)
                    / 100.0;
                self.trail = Some(SkyImage::zeros(frame.image.dimensions));
            }
        }

        let luma = frame.image.luminance();
        let mean = mean_luma(&luma);

        if mean > self.config.max_mean_brightness {
            tracing::warn!(
                "Excluding {}: mean luminance {:.2} above limit",
                frame.path.display(),
                mean
            );
            self.stats.processing_elapsed += started.elapsed();
            return Ok(FrameOutcome::ExcludedOverbright { mean });
        }

        let bright_pixels = compose::count_above(&luma, self.config.mask_threshold);
        if bright_pixels as f64 > self.pixel_cutoff {
            tracing::warn!(
                "Excluding {}: {} pixels above mask threshold",
                frame.path.display(),
                bright_pixels
            );
            self.stats.excluded_frames += 1;
            self.stats.processing_elapsed += started.elapsed();
            return Ok(FrameOutcome::ExcludedSaturated { bright_pixels });
        }

        self.stats.accepted_frames += 1;

        // Dimmest usable frame wins; frames at or below the floor are too
        // noise-dominated to serve as the sky background.
        let new_background = mean > self.config.background_min_brightness
            && self.background.as_ref().map_or(true, |bg| mean < bg.score);

        let mask = compose::star_mask(&luma, self.config.mask_threshold);
        let trail = self
            .trail
            .as_mut()
            .expect("trail buffer allocated on first frame");
        compose::overlay_masked(trail, &frame.image, &mask);

        if new_background {
            tracing::info!(
                "New background candidate: {} (score {:.2})",
                frame.path.display(),
                mean
            );
            self.stats.background_score = Some(mean);
            self.background = Some(BackgroundCandidate {
                image: frame.image,
                score: mean,
            });
        }

        self.stats.processing_elapsed += started.elapsed();
        Ok(FrameOutcome::Accepted)
    }

    /// Merge the accumulated trail onto the background candidate.
    ///
    /// Consumes the accumulator. Fails with [`Error::InsufficientData`] when
    /// no background candidate was found or fewer than the configured
    /// minimum of frames were accepted.
    pub fn finalize(mut self) -> Result<TrailResult, Error> {
        let started = Instant::now();

        tracing::info!(
            "Processed frames in {:?}, {} excluded",
            self.stats.processing_elapsed,
            self.stats.excluded_frames
        );

        let Some(background) = self.background.take() else {
            return Err(Error::InsufficientData {
                reason: InsufficientDataReason::NoBackground,
            });
        };

        if self.stats.accepted_frames < self.config.min_accepted_frames {
            return Err(Error::InsufficientData {
                reason: InsufficientDataReason::TooFewFrames {
                    accepted: self.stats.accepted_frames,
                    required: self.config.min_accepted_frames,
                },
            });
        }

        let trail = self
            .trail
            .expect("accepted frames imply an allocated trail buffer");

        // Everything the trail has touched keeps its accumulated value; the
        // untouched remainder comes from the background candidate.
        let luma = trail.luminance();
        let mask = compose::star_mask(&luma, FINAL_TRAIL_THRESHOLD);

        let mut image = background.image;
        compose::overlay_masked(&mut image, &trail, &mask);

        self.stats.processing_elapsed += started.elapsed();
        Ok(TrailResult {
            image,
            stats: self.stats,
        })
    }
}

/// Result of a trail run.
#[derive(Debug, Clone)]
pub struct TrailResult {
    /// The composite image, same dimensions and channel count as the input
    /// frames
    pub image: SkyImage,
    /// Counters accumulated over the run
    pub stats: TrailStats,
}

impl fmt::Display for TrailResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TrailResult {{ {}×{}, {} frames, {} excluded }}",
            self.image.dimensions.width,
            self.image.dimensions.height,
            self.stats.accepted_frames,
            self.stats.excluded_frames
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{flat_frame, flat_rgb_frame, spot_frame};

    use super::*;

    fn permissive_config() -> TrailConfig {
        TrailConfig {
            min_accepted_frames: 1,
            ..TrailConfig::default()
        }
    }

    #[test]
    fn test_first_frame_establishes_dimensions() {
        let mut acc = TrailAccumulator::new(TrailConfig::default());
        assert!(acc.dimensions().is_none());

        acc.process_frame(flat_frame("f0.jpg", 10, 10, 20)).unwrap();
        assert_eq!(acc.dimensions(), Some(ImageDimensions::new(10, 10, 1)));

        let err = acc
            .process_frame(flat_frame("f1.jpg", 20, 20, 20))
            .unwrap_err();
        assert_eq!(
            err,
            Error::DimensionMismatch {
                expected: ImageDimensions::new(10, 10, 1),
                actual: ImageDimensions::new(20, 20, 1),
            }
        );
    }

    #[test]
    fn test_channel_count_mismatch_is_an_error() {
        let mut acc = TrailAccumulator::new(TrailConfig::default());
        acc.process_frame(flat_frame("gray.jpg", 10, 10, 20)).unwrap();

        let err = acc
            .process_frame(flat_rgb_frame("rgb.jpg", 10, 10, [20, 20, 20]))
            .unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
    }

    #[test]
    fn test_excluded_frame_still_establishes_dimensions() {
        let mut acc = TrailAccumulator::new(TrailConfig::default());
        let outcome = acc
            .process_frame(flat_frame("bright.jpg", 10, 10, 60))
            .unwrap();
        assert!(matches!(outcome, FrameOutcome::ExcludedOverbright { .. }));
        assert_eq!(acc.dimensions(), Some(ImageDimensions::new(10, 10, 1)));
    }

    #[test]
    fn test_overbright_frame_changes_nothing() {
        let mut acc = TrailAccumulator::new(TrailConfig::default());

        let outcome = acc
            .process_frame(flat_frame("bright.jpg", 10, 10, 60))
            .unwrap();
        let FrameOutcome::ExcludedOverbright { mean } = outcome else {
            panic!("expected overbright exclusion, got {:?}", outcome);
        };
        assert!((mean - 60.0).abs() < 0.01);

        assert_eq!(acc.stats().accepted_frames, 0);
        assert_eq!(acc.stats().excluded_frames, 0);
        assert!(acc.stats().background_score.is_none());
        assert!(acc.trail.as_ref().unwrap().pixels.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_saturated_frame_increments_excluded_only() {
        let config = TrailConfig {
            max_mean_brightness: 255.0,
            ..TrailConfig::default()
        };
        let mut acc = TrailAccumulator::new(config);

        // Every pixel above the mask threshold; cutoff for 10x10 at 0.1% is
        // a tenth of a pixel.
        let outcome = acc
            .process_frame(flat_frame("cloudy.jpg", 10, 10, 200))
            .unwrap();
        assert_eq!(
            outcome,
            FrameOutcome::ExcludedSaturated { bright_pixels: 100 }
        );

        assert_eq!(acc.stats().accepted_frames, 0);
        assert_eq!(acc.stats().excluded_frames, 1);
        assert!(acc.stats().background_score.is_none());
        assert!(acc.trail.as_ref().unwrap().pixels.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_background_replacement_is_monotonic() {
        let mut acc = TrailAccumulator::new(permissive_config());

        acc.process_frame(flat_frame("f0.jpg", 10, 10, 30)).unwrap();
        assert_eq!(acc.stats().background_score, Some(30.0));

        // Brighter frame does not displace the candidate.
        acc.process_frame(flat_frame("f1.jpg", 10, 10, 35)).unwrap();
        assert_eq!(acc.stats().background_score, Some(30.0));

        acc.process_frame(flat_frame("f2.jpg", 10, 10, 25)).unwrap();
        assert_eq!(acc.stats().background_score, Some(25.0));

        // Equal score does not displace either (strictly dimmer wins).
        acc.process_frame(flat_frame("f3.jpg", 10, 10, 25)).unwrap();
        assert_eq!(acc.stats().background_score, Some(25.0));

        // Below the noise floor, dimmer never qualifies.
        acc.process_frame(flat_frame("f4.jpg", 10, 10, 5)).unwrap();
        assert_eq!(acc.stats().background_score, Some(25.0));
    }

    #[test]
    fn test_too_dim_frame_is_accepted_but_never_background() {
        let mut acc = TrailAccumulator::new(permissive_config());

        acc.process_frame(flat_frame("dim.jpg", 10, 10, 5)).unwrap();
        assert_eq!(acc.stats().accepted_frames, 1);
        assert!(acc.stats().background_score.is_none());
    }

    #[test]
    fn test_star_pixels_accumulate_and_overwrite() {
        let mut acc = TrailAccumulator::new(permissive_config());

        acc.process_frame(spot_frame("f0.jpg", 10, 10, 20, &[(1, 1, 200)]))
            .unwrap();
        acc.process_frame(spot_frame("f1.jpg", 10, 10, 20, &[(5, 5, 255)]))
            .unwrap();

        let trail = acc.trail.as_ref().unwrap();
        assert_eq!(trail.pixels[11], 200);
        assert_eq!(trail.pixels[55], 255);
        // Background region of the frames never reaches the trail.
        assert_eq!(trail.pixels[0], 0);

        // A later star at the same location overwrites the earlier sample.
        acc.process_frame(spot_frame("f2.jpg", 10, 10, 20, &[(1, 1, 230)]))
            .unwrap();
        let trail = acc.trail.as_ref().unwrap();
        assert_eq!(trail.pixels[11], 230);
    }

    #[test]
    fn test_outcome_display_names() {
        assert_eq!(FrameOutcome::Accepted.to_string(), "accepted");
        assert_eq!(
            FrameOutcome::ExcludedOverbright { mean: 60.0 }.to_string(),
            "excluded_overbright"
        );
        assert_eq!(
            FrameOutcome::ExcludedSaturated { bright_pixels: 9 }.to_string(),
            "excluded_saturated"
        );
    }

    #[test]
    fn test_stats_display() {
        let stats = TrailStats {
            accepted_frames: 25,
            excluded_frames: 2,
            background_score: Some(19.5),
            processing_elapsed: Duration::from_millis(12),
        };
        let text = stats.to_string();
        assert!(text.contains("accepted: 25"));
        assert!(text.contains("excluded: 2"));
        assert!(text.contains("19.50"));
    }
}
