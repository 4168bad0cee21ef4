/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the loader, the verification backend, the report and the UI layer.

use image::ImageFormat;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::Result;
use crate::media::loader::PixelBuffer;

/// Which of the two image positions an image belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    First,
    Second,
}

impl Slot {
    /// 1-based number shown in labels ("Image 1", "Image 2")
    pub fn number(self) -> u8 {
        match self {
            Slot::First => 1,
            Slot::Second => 2,
        }
    }
}

/// A decoded image owned by one slot
///
/// Cloning is cheap: the pixel buffer is shared, and the background worker
/// only ever reads it.
#[derive(Debug, Clone)]
pub struct ImageHandle {
    /// Full path to the source file
    pub path: PathBuf,
    /// Decoded BGR pixels handed to the verifier
    pub pixels: Arc<PixelBuffer>,
    /// Format detected from the file contents
    pub format: ImageFormat,
}

impl ImageHandle {
    /// Filename only (e.g., "照片 1.jpg"), for display
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }

    /// Directory that holds the source file, if the path has one
    pub fn parent_dir(&self) -> Option<&Path> {
        self.path.parent().filter(|p| !p.as_os_str().is_empty())
    }
}

/// Outcome of the external verification model
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct VerificationResult {
    /// Authoritative same/different-person decision
    pub verified: bool,
    /// Embedding distance, lower is more similar
    pub distance: f64,
    /// Model-specific cutoff for `verified`
    pub threshold: f64,
}

/// The two derived similarity percentages, both in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityScores {
    /// Margin relative to the decision threshold
    pub threshold_relative: f64,
    /// Threshold-independent inverse distance
    pub absolute: f64,
}

/// Everything a finished comparison produced
#[derive(Debug, Clone)]
pub struct Comparison {
    pub result: VerificationResult,
    pub scores: SimilarityScores,
    /// Path of the written report, or why it could not be written
    pub report: Result<PathBuf>,
}
