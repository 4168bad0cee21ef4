/// Image file handling
///
/// This module handles:
/// - Reading and decoding image files into BGR pixel buffers (loader.rs)
/// - Preview thumbnails for the selection slots (thumbnail.rs)
/// - SHA-256 digests and base64 payloads of the raw file bytes (digest.rs)

pub mod loader;
pub mod thumbnail;
pub mod digest;
