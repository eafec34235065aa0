use std::path::Path;

use base64::Engine as _;
use thiserror::Error;

pub const DEFAULT_IMAGE_MIME_TYPE: &str = "image/jpeg";

#[derive(Debug, Error)]
pub enum ImagePayloadError {
    #[error("image payload is empty")]
    Empty,
    #[error("data uri is malformed: {0}")]
    MalformedDataUri(&'static str),
    #[error("data uri does not carry an image: {0}")]
    NotAnImage(String),
    #[error("image data is not valid base64")]
    InvalidBase64,
    #[error("failed to read image file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A still image selected for disease detection.
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    mime_type: String,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePayload")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImagePayload {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Result<Self, ImagePayloadError> {
        if bytes.is_empty() {
            return Err(ImagePayloadError::Empty);
        }

        let mime_type = mime_type.into();
        let mime_type = if mime_type.trim().is_empty() {
            DEFAULT_IMAGE_MIME_TYPE.to_string()
        } else {
            mime_type.trim().to_ascii_lowercase()
        };

        Ok(Self { mime_type, bytes })
    }

    /// Parses `data:<mime>;base64,<data>` as produced by a browser file reader.
    pub fn from_data_uri(uri: &str) -> Result<Self, ImagePayloadError> {
        let rest = uri
            .trim()
            .strip_prefix("data:")
            .ok_or(ImagePayloadError::MalformedDataUri("missing data: scheme"))?;
        let (header, data) = rest
            .split_once(',')
            .ok_or(ImagePayloadError::MalformedDataUri("missing comma separator"))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or(ImagePayloadError::MalformedDataUri("payload is not base64"))?;

        if !mime_type.is_empty() && !mime_type.starts_with("image/") {
            return Err(ImagePayloadError::NotAnImage(mime_type.to_string()));
        }

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(data.trim())
            .map_err(|_| ImagePayloadError::InvalidBase64)?;

        Self::new(mime_type, bytes)
    }

    pub fn from_file(path: &Path) -> Result<Self, ImagePayloadError> {
        let bytes = std::fs::read(path).map_err(|source| ImagePayloadError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::new(mime_type_for_path(path), bytes)
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
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

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }
}

fn mime_type_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        _ => DEFAULT_IMAGE_MIME_TYPE,
    }
}
