/// Error taxonomy for the comparison tool
///
/// Every error ends up in front of the user, either as a blocking dialog
/// (image selection) or as the comparison's status text. Errors travel
/// inside iced messages, so they must be `Clone`; non-cloneable sources
/// are shared behind an `Arc`.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::verify::VerificationError;

#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The path could not be opened or read
    #[error("cannot read {}: {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: Arc<io::Error>,
    },

    /// The bytes are not an image format we can decode
    #[error("unsupported or corrupt image {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: Arc<image::ImageError>,
    },

    /// The verification backend failed (no face, model error, ...)
    #[error("{0}")]
    Verification(#[from] VerificationError),

    /// The report could not be written to disk
    #[error("cannot write report {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: Arc<io::Error>,
    },
}

impl Error {
    pub fn file_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::FileRead {
            path: path.into(),
            source: Arc::new(source),
        }
    }

    pub fn decode(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Error::Decode {
            path: path.into(),
            source: Arc::new(source),
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Write {
            path: path.into(),
            source: Arc::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
