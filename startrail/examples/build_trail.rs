//! Example: Build a star-trail composite from a night of captures
//!
//! Reads every capture file beneath STARTRAIL_CAPTURE_DIR (recursively,
//! `.jpg` by default), accumulates the star trail, and writes the composite
//! to test_output/startrail.jpg.
//!
//! # Usage
//!
//! ```bash
//! STARTRAIL_CAPTURE_DIR=/path/to/captures cargo run --release --example build_trail
//! ```

use std::env;
use std::path::PathBuf;
use std::time::Instant;

use startrail::{build_trail, TrailConfig};

fn main() -> anyhow::Result<()> {
    common::log_setup::setup_logging("info");

    let capture_dir = env::var("STARTRAIL_CAPTURE_DIR")
        .map(PathBuf::from)
        .expect("STARTRAIL_CAPTURE_DIR environment variable must be set");

    tracing::info!(path = %capture_dir.display(), "Capture directory");

    let total_start = Instant::now();
    let result = build_trail(&capture_dir, TrailConfig::default())?;

    let output_path = common::test_utils::test_output_path("startrail.jpg");
    result.image.save_file(&output_path)?;

    tracing::info!(path = %output_path.display(), "Wrote star trail composite");
    tracing::info!("Total star trail processing in {:.1?}", total_start.elapsed());

    Ok(())
}
