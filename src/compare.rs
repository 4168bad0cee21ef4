/// Comparison pipeline
///
/// verify → convert distance to similarity → write report → open browser.
/// Runs on a background thread; the caller receives the finished
/// `Comparison` (or the verification error) as a value and applies it to
/// visible state itself.

use std::sync::Arc;
use tokio::task;

use crate::error::Result;
use crate::report::{self, Opener, ReportBuilder};
use crate::similarity;
use crate::state::data::{Comparison, ImageHandle};
use crate::verify::{VerificationClient, VerificationError, VerifierConfig};

/// What a comparison needs besides the two images
#[derive(Clone)]
pub struct Pipeline {
    pub client: Arc<dyn VerificationClient>,
    pub config: VerifierConfig,
    /// Open the written report once it is on disk
    pub open_report: bool,
    /// How reports are opened; failures are logged and ignored
    pub opener: Opener,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("open_report", &self.open_report)
            .finish()
    }
}

/// Run one comparison (blocking)
///
/// A verification failure fails the whole comparison. A report failure
/// does not: the verdict is still returned, with the error in `report`.
pub fn run_comparison(
    pipeline: &Pipeline,
    first: &ImageHandle,
    second: &ImageHandle,
) -> Result<Comparison> {
    tracing::info!(
        "🔍 Comparing {} with {} ({} / {})",
        first.file_name(),
        second.file_name(),
        pipeline.config.model_name,
        pipeline.config.detector_backend
    );

    let result = pipeline
        .client
        .verify(&first.pixels, &second.pixels, &pipeline.config)?;
    let scores = similarity::convert(result.distance, result.threshold);

    tracing::info!(
        "✅ verified={} distance={:.4} threshold={:.4} A={:.1}% B={:.1}%",
        result.verified,
        result.distance,
        result.threshold,
        scores.threshold_relative,
        scores.absolute
    );

    let written = ReportBuilder::now().build(first, second, &result, &scores);
    match &written {
        Ok(path) if pipeline.open_report => {
            report::open_in_browser(pipeline.opener, path);
        }
        Ok(_) => {}
        Err(e) => tracing::error!("❌ Report failed: {}", e),
    }

    Ok(Comparison {
        result,
        scores,
        report: written,
    })
}

/// Run one comparison without blocking the UI
pub async fn run_comparison_async(
    pipeline: Pipeline,
    first: ImageHandle,
    second: ImageHandle,
) -> Result<Comparison> {
    task::spawn_blocking(move || run_comparison(&pipeline, &first, &second))
        .await
        .map_err(|e| VerificationError::Backend(format!("comparison task failed: {}", e)))?
}
