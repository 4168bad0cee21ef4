/// Start-up configuration
///
/// There are no CLI flags and no config file. Everything comes from the
/// environment, read once when the app starts.

use std::env;
use std::path::{Path, PathBuf};

use crate::verify::VerifierConfig;

const DEFAULT_PROGRAM: &str = "python3";
/// Bundled helper, relative to the executable's directory or the source tree
const HELPER_SCRIPT: &str = "scripts/deepface_verify.py";

/// Settings for one run of the app
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Helper program that wraps the face-verification model
    pub verifier_program: String,
    /// Arguments passed to the helper
    pub verifier_args: Vec<String>,
    /// Model selection handed through to the helper
    pub verifier: VerifierConfig,
    /// Open each report in the default browser once written
    pub open_report: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            verifier_program: DEFAULT_PROGRAM.to_string(),
            verifier_args: vec![helper_script().to_string_lossy().into_owned()],
            verifier: VerifierConfig::default(),
            open_report: true,
        }
    }
}

impl AppConfig {
    /// Read the `FACE_COMPARE_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(program) = non_empty("FACE_COMPARE_VERIFIER") {
            config.verifier_program = program.trim().to_string();
        }
        if let Some(args) = lookup("FACE_COMPARE_VERIFIER_ARGS") {
            config.verifier_args = split_args(&args);
        }
        if let Some(model) = non_empty("FACE_COMPARE_MODEL") {
            config.verifier.model_name = model.trim().to_string();
        }
        if let Some(detector) = non_empty("FACE_COMPARE_DETECTOR") {
            config.verifier.detector_backend = detector.trim().to_string();
        }
        if let Some(flag) = non_empty("FACE_COMPARE_ENFORCE_DETECTION") {
            config.verifier.enforce_detection =
                parse_flag("FACE_COMPARE_ENFORCE_DETECTION", &flag, config.verifier.enforce_detection);
        }
        if let Some(flag) = non_empty("FACE_COMPARE_OPEN_BROWSER") {
            config.open_report = parse_flag("FACE_COMPARE_OPEN_BROWSER", &flag, config.open_report);
        }

        config
    }
}

/// Silence the numerical backend's verbosity and optimization notes
///
/// Must run at process start, before any other thread exists. Helper
/// processes inherit these.
pub fn quiet_numeric_backend() {
    env::set_var("TF_CPP_MIN_LOG_LEVEL", "2");
    env::set_var("TF_ENABLE_ONEDNN_OPTS", "0");
}

/// Absolute path of the bundled helper script
///
/// Installed copies ship the script next to the binary; development builds
/// fall back to the crate's own `scripts/` directory. Never depends on the
/// current working directory.
fn helper_script() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(HELPER_SCRIPT)))
        .filter(|path| path.is_file())
        .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join(HELPER_SCRIPT))
}

fn split_args(args: &str) -> Vec<String> {
    args.split_whitespace().map(str::to_string).collect()
}

fn parse_flag(key: &str, value: &str, fallback: bool) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        other => {
            tracing::warn!("⚠️  Ignoring {}={:?}, expected true or false", key, other);
            fallback
        }
    }
}
