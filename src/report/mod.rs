/// HTML comparison report
///
/// Builds a single self-contained HTML file (images inlined as base64,
/// no external assets), writes it next to the first image and opens it
/// in the default browser. Reports are never overwritten.

mod template;

use chrono::{Local, NaiveDateTime};
use std::env;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::media::digest::{base64_file, sha256_file};
use crate::state::data::{ImageHandle, SimilarityScores, VerificationResult};
use template::{CardView, ReportView};

/// Color band of a similarity percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    High,
    Medium,
    Low,
}

impl ScoreBand {
    /// `>= 80` high, `>= 50` medium, anything else low
    pub fn classify(value: f64) -> Self {
        if value >= 80.0 {
            ScoreBand::High
        } else if value >= 50.0 {
            ScoreBand::Medium
        } else {
            ScoreBand::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreBand::High => "high",
            ScoreBand::Medium => "medium",
            ScoreBand::Low => "low",
        }
    }

    /// CSS color used in the report
    pub fn css_color(self) -> &'static str {
        match self {
            ScoreBand::High => "green",
            ScoreBand::Medium => "orange",
            ScoreBand::Low => "red",
        }
    }
}

/// Human-readable verdict for the authoritative boolean
pub fn verdict_text(verified: bool) -> &'static str {
    if verified {
        "✅ same person"
    } else {
        "❌ different person"
    }
}

/// `deepface_report_<YYYYMMDD_HHMMSS>.html`
pub fn report_file_name(generated_at: NaiveDateTime) -> String {
    format!("deepface_report_{}.html", generated_at.format("%Y%m%d_%H%M%S"))
}

/// Numbered variant used when the plain name is already taken
fn numbered_file_name(generated_at: NaiveDateTime, n: u32) -> String {
    if n == 0 {
        return report_file_name(generated_at);
    }
    format!(
        "deepface_report_{}_{}.html",
        generated_at.format("%Y%m%d_%H%M%S"),
        n
    )
}

/// Numbered names tried before giving up on a directory
const MAX_NAME_ATTEMPTS: u32 = 100;

/// Launches a viewer for a written report
pub type Opener = fn(&Path) -> io::Result<()>;

/// The platform's default handler for `.html` files
pub fn system_browser(path: &Path) -> io::Result<()> {
    open::that(path)
}

/// Open a written report (best-effort): a failure is logged, never fatal
pub fn open_in_browser(opener: Opener, path: &Path) -> bool {
    match opener(path) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("⚠️  Could not open {} in a browser: {}", path.display(), e);
            false
        }
    }
}

/// Assembles and writes reports stamped with one generation time
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    generated_at: NaiveDateTime,
}

impl ReportBuilder {
    /// A builder stamped with the given local time
    pub fn at(generated_at: NaiveDateTime) -> Self {
        Self { generated_at }
    }

    /// A builder stamped with the current local time
    pub fn now() -> Self {
        Self::at(Local::now().naive_local())
    }

    /// Render the report and write it next to the first image
    ///
    /// Returns the path of the new file. An existing report is never
    /// replaced; a numbered name is used instead.
    ///
    /// # Errors
    /// * `Error::FileRead` - an image file could not be re-read for hashing
    /// * `Error::Write` - the report file could not be written
    pub fn build(
        &self,
        first: &ImageHandle,
        second: &ImageHandle,
        result: &VerificationResult,
        scores: &SimilarityScores,
    ) -> Result<PathBuf> {
        let html = self.render(first, second, result, scores)?;
        let path = write_new(&output_dir(first), self.generated_at, &html)?;

        tracing::info!("📝 Report written to {} ({} bytes)", path.display(), html.len());
        Ok(path)
    }

    /// Render the HTML document without touching the output directory
    pub fn render(
        &self,
        first: &ImageHandle,
        second: &ImageHandle,
        result: &VerificationResult,
        scores: &SimilarityScores,
    ) -> Result<String> {
        let view = ReportView {
            generated_at: self.generated_at,
            cards: [card(first)?, card(second)?],
            verdict: verdict_text(result.verified),
            result: *result,
            scores: *scores,
            bands: [
                ScoreBand::classify(scores.threshold_relative),
                ScoreBand::classify(scores.absolute),
            ],
        };
        Ok(template::render(&view))
    }
}

fn card(image: &ImageHandle) -> Result<CardView> {
    Ok(CardView {
        file_name: image.file_name(),
        mime: image.format.to_mime_type(),
        base64: base64_file(&image.path)?,
        sha256: sha256_file(&image.path)?,
    })
}

/// Create a report file that did not exist before
fn write_new(dir: &Path, generated_at: NaiveDateTime, html: &str) -> Result<PathBuf> {
    for n in 0..MAX_NAME_ATTEMPTS {
        let path = dir.join(numbered_file_name(generated_at, n));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(html.as_bytes()).map_err(|e| Error::write(&path, e))?;
                return Ok(path);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(Error::write(&path, e)),
        }
    }
    Err(Error::write(
        dir,
        io::Error::new(io::ErrorKind::AlreadyExists, "every report name is taken"),
    ))
}

/// Directory of the first image, or the working directory if it has none
fn output_dir(first: &ImageHandle) -> PathBuf {
    first
        .parent_dir()
        .filter(|dir| dir.is_dir())
        .map(Path::to_path_buf)
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::loader::load_image;
    use std::fs;
    use chrono::NaiveDate;
    use image::{ImageFormat, RgbImage};

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, 29)
            .unwrap()
            .and_hms_opt(15, 24, 20)
            .unwrap()
    }

    fn fixture(dir: &Path, name: &str, format: ImageFormat) -> ImageHandle {
        let path = dir.join(name);
        RgbImage::from_pixel(8, 8, image::Rgb([200, 150, 100]))
            .save_with_format(&path, format)
            .unwrap();
        load_image(path).unwrap().handle
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(ScoreBand::classify(79.9), ScoreBand::Medium);
        assert_eq!(ScoreBand::classify(80.0), ScoreBand::High);
        assert_eq!(ScoreBand::classify(49.9), ScoreBand::Low);
        assert_eq!(ScoreBand::classify(50.0), ScoreBand::Medium);
        assert_eq!(ScoreBand::classify(100.0).css_color(), "green");
        assert_eq!(ScoreBand::classify(0.0).label(), "low");
    }

    #[test]
    fn test_report_file_name() {
        assert_eq!(
            report_file_name(timestamp()),
            "deepface_report_20250729_152420.html"
        );
    }

    #[test]
    fn test_build_writes_next_to_first_image() {
        let first_dir = tempfile::tempdir().unwrap();
        let second_dir = tempfile::tempdir().unwrap();
        let first = fixture(first_dir.path(), "甲 <one>.png", ImageFormat::Png);
        let second = fixture(second_dir.path(), "two.bmp", ImageFormat::Bmp);
        let result = VerificationResult {
            verified: true,
            distance: 0.25,
            threshold: 0.68,
        };
        let scores = crate::similarity::convert(result.distance, result.threshold);

        let builder = ReportBuilder::at(timestamp());
        let path = builder.build(&first, &second, &result, &scores).unwrap();

        assert_eq!(
            path,
            first_dir.path().join("deepface_report_20250729_152420.html")
        );
        let on_disk = fs::read_to_string(&path).unwrap();
        assert_eq!(on_disk, builder.render(&first, &second, &result, &scores).unwrap());

        assert!(on_disk.contains("2025-07-29 15:24:20"));
        assert!(on_disk.contains("甲 &lt;one&gt;.png"));
        assert!(on_disk.contains("data:image/png;base64,"));
        assert!(on_disk.contains("data:image/bmp;base64,"));
        assert!(on_disk.contains(&sha256_file(&first.path).unwrap()));
        assert!(on_disk.contains(&sha256_file(&second.path).unwrap()));
        assert!(on_disk.contains("0.2500"));
        assert!(on_disk.contains("0.6800"));
        assert!(on_disk.contains("63.2%"));
        assert!(on_disk.contains("75.0%"));
        assert!(on_disk.contains("✅ same person"));
        assert!(!on_disk.contains("src=\"http"));
    }

    #[test]
    fn test_same_second_reports_are_kept_apart() {
        let dir = tempfile::tempdir().unwrap();
        let first = fixture(dir.path(), "one.png", ImageFormat::Png);
        let second = fixture(dir.path(), "two.png", ImageFormat::Png);
        let same = VerificationResult {
            verified: true,
            distance: 0.25,
            threshold: 0.68,
        };
        let different = VerificationResult {
            verified: false,
            distance: 0.9,
            threshold: 0.68,
        };
        let builder = ReportBuilder::at(timestamp());

        let earlier = builder
            .build(&first, &second, &same, &crate::similarity::convert(0.25, 0.68))
            .unwrap();
        let before = fs::read_to_string(&earlier).unwrap();
        let later = builder
            .build(&first, &second, &different, &crate::similarity::convert(0.9, 0.68))
            .unwrap();

        assert_eq!(earlier, dir.path().join("deepface_report_20250729_152420.html"));
        assert_eq!(later, dir.path().join("deepface_report_20250729_152420_1.html"));
        assert_eq!(fs::read_to_string(&earlier).unwrap(), before);
        assert!(before.contains("✅ same person"));
        assert!(fs::read_to_string(&later).unwrap().contains("❌ different person"));
    }

    #[test]
    fn test_occupied_name_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        // Even a directory squatting on the plain name is left alone
        fs::create_dir(dir.path().join(report_file_name(timestamp()))).unwrap();

        let path = write_new(dir.path(), timestamp(), "<html></html>").unwrap();
        assert_eq!(path, dir.path().join("deepface_report_20250729_152420_1.html"));
    }

    #[test]
    fn test_unwritable_directory_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");

        let err = write_new(&missing, timestamp(), "<html></html>").unwrap_err();
        match err {
            Error::Write { path, .. } => assert!(path.starts_with(&missing)),
            other => panic!("expected a write error, got {:?}", other),
        }
    }

    #[test]
    fn test_failing_opener_is_not_fatal() {
        fn broken(_: &Path) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::NotFound, "no browser"))
        }
        fn working(_: &Path) -> io::Result<()> {
            Ok(())
        }
        assert!(!open_in_browser(broken, Path::new("/tmp/report.html")));
        assert!(open_in_browser(working, Path::new("/tmp/report.html")));
    }

    #[test]
    fn test_missing_parent_falls_back_to_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = fixture(dir.path(), "one.png", ImageFormat::Png);
        first.path = PathBuf::from("one.png");
        assert_eq!(output_dir(&first), env::current_dir().unwrap());
    }
}
