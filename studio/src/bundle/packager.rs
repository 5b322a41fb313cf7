//! Bundle packaging: turn pasted source or an uploaded file into the single
//! artifact sent with a new version.

use std::io::{Cursor, Write};

use sha2::{Digest, Sha256};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::errors::StudioError;
use crate::filesys::file::File;

/// Entrypoint the backend looks for
pub const ENTRYPOINT_NAME: &str = "app.py";

/// Optional dependency manifest
pub const REQUIREMENTS_NAME: &str = "requirements.txt";

/// File name of an archive built from pasted source
pub const ARCHIVE_NAME: &str = "bundle.zip";

/// Requirements offered by default when pasting source
pub const DEFAULT_REQUIREMENTS: &str = "streamlit>=1.32.0";

/// A deployable payload, alive for one upload request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    filename: String,
    bytes: Vec<u8>,
}

impl Bundle {
    /// Name the payload is uploaded under
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Content type for the multipart part
    pub fn mime_type(&self) -> &'static str {
        if self.filename.to_ascii_lowercase().ends_with(".zip") {
            "application/zip"
        } else {
            "application/octet-stream"
        }
    }

    /// SHA-256 of the payload, hex encoded
    pub fn digest(&self) -> String {
        let digest = Sha256::digest(&self.bytes);
        digest.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Read a file from disk and wrap it verbatim
    pub async fn from_path(file: &File) -> Result<Self, StudioError> {
        let filename = file.name().ok_or_else(|| {
            StudioError::ValidationError(format!("{} is not a file", file.path().display()))
        })?;
        let bytes = file.read_bytes().await?;
        Ok(package_from_file(bytes, filename))
    }
}

/// Build a `bundle.zip` holding `app.py` and, when `requirements_text` is not
/// blank, `requirements.txt`
pub fn package_from_source(entrypoint_text: &str, requirements_text: &str) -> Result<Bundle, StudioError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(ENTRYPOINT_NAME, options)?;
    zip.write_all(entrypoint_text.as_bytes())?;

    if !requirements_text.trim().is_empty() {
        zip.start_file(REQUIREMENTS_NAME, options)?;
        zip.write_all(requirements_text.as_bytes())?;
    }

    let bytes = zip.finish()?.into_inner();
    Ok(Bundle {
        filename: ARCHIVE_NAME.to_string(),
        bytes,
    })
}

/// Wrap an uploaded file as-is. Extension and content are not checked; the
/// backend decides what it accepts.
pub fn package_from_file(bytes: Vec<u8>, filename: impl Into<String>) -> Bundle {
    Bundle {
        filename: filename.into(),
        bytes,
    }
}
