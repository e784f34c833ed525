//! Startrail - Star-trail compositing library.
//!
//! Builds a single "star trail" composite from a time-ordered sequence of
//! night-sky stills:
//! - Frame discovery and decoding, ordered by capture time
//! - Per-frame quality filters (overbright and saturated frames are excluded)
//! - Incremental trail compositing with a running background candidate
//! - Final merge of the accumulated trail onto the best background frame
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use startrail::{build_trail, TrailConfig};
//!
//! let result = build_trail("captures".as_ref(), TrailConfig::default())?;
//! println!("{}", result.stats);
//! result.image.save_file("startrail.jpg")?;
//! ```

mod frame_source;
mod sky_image;
pub(crate) mod trails;

#[cfg(test)]
pub mod testing;

// ============================================================================
// Core image types
// ============================================================================

pub use sky_image::{ImageDimensions, SkyImage};

// ============================================================================
// Frame source
// ============================================================================

pub use frame_source::{Frame, FrameSource, DEFAULT_EXTENSIONS};

// ============================================================================
// Trail accumulation
// ============================================================================

pub use trails::{
    // Configuration
    TrailConfig,
    TrailConfigBuilder,
    // Results and errors
    Error,
    FrameOutcome,
    InsufficientDataReason,
    TrailResult,
    TrailStats,
    // Main API
    build_trail,
    TrailAccumulator,
};
