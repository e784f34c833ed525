//! Incremental star-trail compositing.
//!
//! Frames are fed one at a time in capture order. Each frame is classified
//! (accepted / excluded), accepted frames paint their star pixels into a
//! running trail buffer, and the dimmest usable frame is kept as the sky
//! background. Finalization merges the accumulated trail onto that
//! background.
//!
//! # Example
//!
//! ```rust,ignore
//! use startrail::{FrameSource, TrailAccumulator, TrailConfig, DEFAULT_EXTENSIONS};
//!
//! let source = FrameSource::scan("captures".as_ref(), DEFAULT_EXTENSIONS);
//! let mut acc = TrailAccumulator::new(TrailConfig::default());
//! for frame in source.frames() {
//!     acc.process_frame(frame?)?;
//! }
//! let result = acc.finalize()?;
//! result.image.save_file("trail.jpg")?;
//! ```

mod accumulator;
mod compose;
mod error;


use std::path::Path;

use crate::frame_source::{FrameSource, DEFAULT_EXTENSIONS};

pub use accumulator::{FrameOutcome, TrailAccumulator, TrailResult, TrailStats};
pub use error::{Error, InsufficientDataReason};

/// Configuration for trail accumulation.
///
/// Immutable once handed to [`TrailAccumulator::new`]; a new run takes a new
/// config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailConfig {
    /// Frames with mean luminance above this are excluded outright
    /// (twilight, heavy moonlight).
    pub max_mean_brightness: f32,

    /// Per-pixel luminance split between star and background samples.
    pub mask_threshold: u8,

    /// Maximum tolerated share of star pixels per frame, in percent of the
    /// frame's pixel count; frames above it count as saturated.
    pub pixel_cutoff_percent: f32,

    /// Minimum number of accepted frames required to finalize.
    pub min_accepted_frames: usize,

    /// Frames at or below this mean luminance never become the background
    /// candidate.
    pub background_min_brightness: f32,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            max_mean_brightness: 50.0,
            mask_threshold: 190,
            pixel_cutoff_percent: 0.1,
            min_accepted_frames: 20,
            background_min_brightness: 10.0,
        }
    }
}

impl TrailConfig {
    /// Create a new builder for `TrailConfig`.
    ///
    /// # Example
    /// ```rust,ignore
    /// use startrail::TrailConfig;
    ///
    /// let config = TrailConfig::builder()
    ///     .max_mean_brightness(80.0)
    ///     .min_accepted_frames(10)
    ///     .build();
    /// ```
    pub fn builder() -> TrailConfigBuilder {
        TrailConfigBuilder::new()
    }
}

/// Builder for [`TrailConfig`].
#[derive(Debug, Clone, Default)]
pub struct TrailConfigBuilder {
    config: TrailConfig,
}

impl TrailConfigBuilder {
    /// Create a builder seeded with the default configuration.
    pub fn new() -> Self {
        Self {
            config: TrailConfig::default(),
        }
    }

    /// Frame-level mean-luminance exclusion limit.
    pub fn max_mean_brightness(mut self, limit: f32) -> Self {
        self.config.max_mean_brightness = limit;
        self
    }

    /// Per-pixel star/background luminance split.
    pub fn mask_threshold(mut self, threshold: u8) -> Self {
        self.config.mask_threshold = threshold;
        self
    }

    /// Saturation limit as a percentage of the frame's pixel count.
    pub fn pixel_cutoff_percent(mut self, percent: f32) -> Self {
        self.config.pixel_cutoff_percent = percent;
        self
    }

    /// Minimum accepted frames required for finalization to succeed.
    pub fn min_accepted_frames(mut self, count: usize) -> Self {
        self.config.min_accepted_frames = count;
        self
    }

    /// Noise floor below which a frame never becomes the background.
    pub fn background_min_brightness(mut self, floor: f32) -> Self {
        self.config.background_min_brightness = floor;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> TrailConfig {
        self.config
    }
}

/// Build a star trail from every capture file beneath `root`.
///
/// Scans for the default extension set, processes the frames in capture
/// order, and finalizes. Unreadable files are skipped with a warning; domain
/// errors are not skipped, so a frame whose dimensions disagree with the
/// first frame aborts the run. Callers that prefer to skip mismatched frames
/// drive [`TrailAccumulator`] directly.
pub fn build_trail(root: &Path, config: TrailConfig) -> anyhow::Result<TrailResult> {
    let source = FrameSource::scan(root, DEFAULT_EXTENSIONS);
    let mut accumulator = TrailAccumulator::new(config);

    for frame in source.frames() {
        let frame = match frame {
            Ok(frame) => frame,
            Err(err) => {
                tracing::warn!("Skipping unreadable frame: {:#}", err);
                continue;
            }
        };
        let path = frame.path.clone();
        let outcome = accumulator.process_frame(frame)?;
        tracing::debug!("{}: {}", path.display(), outcome);
    }

    let result = accumulator.finalize()?;
    tracing::info!("{}", result.stats);
    Ok(result)
}
