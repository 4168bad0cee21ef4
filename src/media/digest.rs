/// Content hashes and inline payloads for the report
///
/// Both helpers work on the raw file bytes, not on decoded pixels, and each
/// re-reads the file on its own.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Lowercase hex SHA-256 of a byte slice
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Standard base64 (padded, no line wrapping)
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// SHA-256 of the full file contents
pub fn sha256_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| Error::file_read(path, e))?;
    Ok(sha256_hex(&bytes))
}

/// Base64 of the full file contents
pub fn base64_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| Error::file_read(path, e))?;
    Ok(encode_base64(&bytes))
}
