/// The comparison session behind the window
///
/// Holds the two image slots, the single in-flight flag and the status of
/// the last comparison. Only the UI thread mutates it; background work
/// gets clones of the handles and reports back through messages.

use std::path::Path;

use super::data::{Comparison, ImageHandle, Slot};
use crate::error::{Error, Result};
use crate::media::loader::LoadedImage;
use crate::media::thumbnail::Thumbnail;
use crate::report::verdict_text;

/// What the status line currently shows
#[derive(Debug, Clone)]
pub enum Status {
    Idle,
    Comparing,
    Finished(Comparison),
    Failed(Error),
}

/// Color family of the status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Pending,
    Success,
    Failure,
}

#[derive(Debug)]
pub struct Session {
    first: Option<ImageHandle>,
    second: Option<ImageHandle>,
    in_flight: bool,
    status: Status,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            first: None,
            second: None,
            in_flight: false,
            status: Status::Idle,
        }
    }

    pub fn image(&self, slot: Slot) -> Option<&ImageHandle> {
        match slot {
            Slot::First => self.first.as_ref(),
            Slot::Second => self.second.as_ref(),
        }
    }

    /// Replace whatever the slot held
    pub fn assign(&mut self, slot: Slot, handle: ImageHandle) {
        match slot {
            Slot::First => self.first = Some(handle),
            Slot::Second => self.second = Some(handle),
        }
    }

    /// Apply a finished load: success fills the slot and hands back the
    /// preview, failure leaves the slot exactly as it was
    pub fn apply_load(&mut self, slot: Slot, loaded: Result<LoadedImage>) -> Result<Thumbnail> {
        let loaded = loaded?;
        self.assign(slot, loaded.handle);
        Ok(loaded.thumbnail)
    }

    pub fn is_comparing(&self) -> bool {
        self.in_flight
    }

    /// Both slots filled and nothing running
    pub fn can_compare(&self) -> bool {
        self.first.is_some() && self.second.is_some() && !self.in_flight
    }

    /// Mark a comparison as started and hand out the images for the worker
    ///
    /// Returns `None` (and changes nothing) when a comparison is not allowed.
    pub fn begin_comparison(&mut self) -> Option<(ImageHandle, ImageHandle)> {
        if !self.can_compare() {
            return None;
        }
        let pair = (self.first.clone()?, self.second.clone()?);
        self.in_flight = true;
        self.status = Status::Comparing;
        Some(pair)
    }

    /// Apply the worker's outcome, superseding any previous result
    pub fn finish_comparison(&mut self, outcome: Result<Comparison>) {
        self.in_flight = false;
        self.status = match outcome {
            Ok(comparison) => Status::Finished(comparison),
            Err(e) => Status::Failed(e),
        };
    }

    /// Report of the last successful comparison, if it was written
    pub fn last_report(&self) -> Option<&Path> {
        match &self.status {
            Status::Finished(Comparison { report: Ok(path), .. }) => Some(path.as_path()),
            _ => None,
        }
    }

    pub fn status_tone(&self) -> Tone {
        match &self.status {
            Status::Idle => Tone::Neutral,
            Status::Comparing => Tone::Pending,
            Status::Finished(c) if c.result.verified => Tone::Success,
            Status::Finished(_) | Status::Failed(_) => Tone::Failure,
        }
    }

    pub fn status_text(&self) -> String {
        match &self.status {
            Status::Idle => String::new(),
            Status::Comparing => "Comparing, please wait…".to_string(),
            Status::Finished(c) => {
                let report = match &c.report {
                    Ok(path) => format!("Report: {}", path.display()),
                    Err(e) => format!("Report failed: {}", e),
                };
                format!(
                    "{}\nDistance: {:.4} (threshold {:.4})\nSimilarity A: {:.1}% / Similarity B: {:.1}%\n{}",
                    verdict_text(c.result.verified),
                    c.result.distance,
                    c.result.threshold,
                    c.scores.threshold_relative,
                    c.scores.absolute,
                    report
                )
            }
            Status::Failed(e) => format!("Comparison failed: {}", e),
        }
    }
}
