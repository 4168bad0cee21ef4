/// External-process verification backend
///
/// Stages both images as PNG files in a private temporary directory, runs
/// a helper program, sends it one JSON request on stdin and reads one JSON
/// result from the last non-empty line of its stdout. Anything the model
/// library prints before that line (download progress, warnings) is ignored.

use image::ImageFormat;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use super::{validate, VerificationClient, VerificationError, VerifierConfig};
use crate::media::loader::PixelBuffer;
use crate::state::data::VerificationResult;

/// Runs `program args...` once per comparison
#[derive(Debug, Clone)]
pub struct CommandVerifier {
    program: String,
    args: Vec<String>,
}

#[derive(Serialize)]
struct Request<'a> {
    img1_path: &'a Path,
    img2_path: &'a Path,
    #[serde(flatten)]
    config: &'a VerifierConfig,
}

impl CommandVerifier {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn run(&self, request: &[u8]) -> Result<String, VerificationError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| VerificationError::Spawn(format!("{}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(request)
                .map_err(|e| VerificationError::Io(format!("writing request: {}", e)))?;
            // stdin is closed here so the helper sees EOF
        }

        let output = child
            .wait_with_output()
            .map_err(|e| VerificationError::Io(format!("waiting for verifier: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = last_line(&stderr)
                .map(str::to_string)
                .unwrap_or_else(|| format!("verifier exited with {}", output.status));
            return Err(VerificationError::Backend(message));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl VerificationClient for CommandVerifier {
    fn verify(
        &self,
        first: &PixelBuffer,
        second: &PixelBuffer,
        config: &VerifierConfig,
    ) -> Result<VerificationResult, VerificationError> {
        let staging = tempfile::tempdir().map_err(|e| VerificationError::Io(e.to_string()))?;
        let img1_path = staging.path().join("img1.png");
        let img2_path = staging.path().join("img2.png");

        for (buffer, path) in [(first, &img1_path), (second, &img2_path)] {
            let rgb = buffer.to_rgb_image().ok_or_else(|| {
                VerificationError::Io(format!(
                    "{}: pixel data does not match {}x{}",
                    path.display(),
                    buffer.width(),
                    buffer.height()
                ))
            })?;
            rgb.save_with_format(path, ImageFormat::Png)
                .map_err(|e| VerificationError::Io(format!("{}: {}", path.display(), e)))?;
        }

        let request = serde_json::to_vec(&Request {
            img1_path: &img1_path,
            img2_path: &img2_path,
            config,
        })
        .map_err(|e| VerificationError::Io(e.to_string()))?;

        tracing::debug!(program = %self.program, "🔎 Running verifier");
        let stdout = self.run(&request)?;

        let line = last_line(&stdout)
            .ok_or_else(|| VerificationError::Protocol("verifier printed nothing".to_string()))?;
        let result: VerificationResult = serde_json::from_str(line)
            .map_err(|e| VerificationError::Protocol(format!("{} in {:?}", e, line)))?;

        validate(result)
    }
}

fn last_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty()).last()
}
