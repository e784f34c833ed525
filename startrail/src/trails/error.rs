//! Error types for trail accumulation.

use std::fmt;

use thiserror::Error;

use crate::ImageDimensions;

/// Errors that can occur while building a star trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// A later frame's dimensions or channel count disagree with the first
    /// processed frame. Fatal to that single call; the caller decides
    /// whether to skip the frame or abort the run.
    #[error("Frame dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: ImageDimensions,
        actual: ImageDimensions,
    },

    /// Raised only at finalization, when not enough evidence accumulated to
    /// produce an output image.
    #[error("Insufficient data to build star trail: {reason}")]
    InsufficientData { reason: InsufficientDataReason },
}

/// Why finalization could not produce an output image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsufficientDataReason {
    /// No frame ever qualified as the background candidate.
    NoBackground,
    /// Fewer frames were accepted than the configured minimum.
    TooFewFrames { accepted: usize, required: usize },
}

impl fmt::Display for InsufficientDataReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsufficientDataReason::NoBackground => {
                write!(f, "no background candidate detected")
            }
            InsufficientDataReason::TooFewFrames { accepted, required } => {
                write!(f, "{} frames accepted, {} required", accepted, required)
            }
        }
    }
}
