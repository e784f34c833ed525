//! Ordered discovery and decoding of capture files.
//!
//! The frame source is a collaborator of the trail accumulator: it finds the
//! capture files and hands over decoded frames in capture order. All blocking
//! work (directory walking, decoding) happens here, never in the accumulator.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::Result;

use crate::SkyImage;

/// Extensions scanned when the caller does not configure a set.
pub const DEFAULT_EXTENSIONS: &[&str] = &["jpg"];

/// A decoded capture frame plus its source path.
///
/// The path is carried for logging and diagnostics only; the algorithm never
/// inspects it.
#[derive(Debug, Clone)]
pub struct Frame {
    pub path: PathBuf,
    pub image: SkyImage,
}

/// Time-ordered sequence of capture files beneath a root directory.
///
/// Discovery is eager: paths are collected, filtered, and sorted up front.
/// Decoding is lazy, one frame per iterator step, and the source can be
/// iterated any number of times.
#[derive(Debug, Clone)]
pub struct FrameSource {
    paths: Vec<PathBuf>,
}

impl FrameSource {
    /// Scan `root` recursively for capture files with the given extensions.
    ///
    /// Zero-byte files are discarded, and the remainder is ordered by
    /// ascending modification time, which stands in for capture order.
    pub fn scan(root: &Path, extensions: &[&str]) -> Self {
        let mut dated: Vec<(SystemTime, PathBuf)> =
            common::file_utils::files_with_extensions(root, extensions)
                .into_iter()
                .filter_map(|path| {
                    let meta = fs::metadata(&path).ok()?;
                    if meta.len() == 0 {
                        tracing::debug!("Skipping empty file: {}", path.display());
                        return None;
                    }
                    Some((meta.modified().ok()?, path))
                })
                .collect();
        dated.sort_by(|a, b| a.0.cmp(&b.0));

        tracing::info!("Found {} capture files in {}", dated.len(), root.display());

        Self {
            paths: dated.into_iter().map(|(_, path)| path).collect(),
        }
    }

    /// The discovered paths in capture order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Decode the discovered files one at a time, in capture order.
    ///
    /// Undecodable files are yielded as `Err` so the caller can choose to
    /// skip them or abort.
    pub fn frames(&self) -> impl Iterator<Item = Result<Frame>> + '_ {
        self.paths.iter().map(|path| {
            tracing::debug!("Reading file: {}", path.display());
            Ok(Frame {
                path: path.clone(),
                image: SkyImage::from_file(path)?,
            })
        })
    }
}
