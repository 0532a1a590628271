use crate::utils::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Supported raster output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[serde(alias = "jpg")]
    JPEG,
    PNG,
}

// Magic-byte signatures checked against the leading bytes of the upload,
// never against the caller-declared extension or MIME type.
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

impl ImageFormat {
    /// Get file extensions associated with this format
    pub fn extensions(&self) -> &[&str] {
        match self {
            Self::JPEG => &["jpg", "jpeg"],
            Self::PNG => &["png"],
        }
    }

    /// Get the primary extension for this format
    pub fn primary_extension(&self) -> &str {
        self.extensions()[0]
    }

    /// Check if the extension matches this format
    pub fn matches_extension(&self, ext: &str) -> bool {
        let ext = ext.to_lowercase();
        self.extensions().contains(&ext.as_str())
    }

    /// Whether the encoder for this format honors a quality setting.
    ///
    /// PNG is lossless; its size is driven by content and dimensions only.
    pub fn has_quality(&self) -> bool {
        matches!(self, Self::JPEG)
    }

    pub(crate) fn as_image_format(&self) -> image::ImageFormat {
        match self {
            Self::JPEG => image::ImageFormat::Jpeg,
            Self::PNG => image::ImageFormat::Png,
        }
    }
}

impl FromStr for ImageFormat {
    type Err = PipelineError;

    fn from_str(ext: &str) -> Result<Self, Self::Err> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(Self::JPEG),
            "png" => Ok(Self::PNG),
            other => Err(PipelineError::invalid_format(format!(
                "unsupported image format: {other}"
            ))),
        }
    }
}

/// Detect the actual content type from the leading bytes.
///
/// Returns `InvalidFormat` for anything not recognized as a supported raster
/// image, including truncated headers and empty input.
pub fn detect_format(bytes: &[u8]) -> PipelineResult<ImageFormat> {
    if bytes.starts_with(JPEG_MAGIC) {
        return Ok(ImageFormat::JPEG);
    }
    if bytes.starts_with(PNG_MAGIC) {
        return Ok(ImageFormat::PNG);
    }
    let preview: Vec<String> = bytes.iter().take(4).map(|b| format!("{b:02x}")).collect();
    Err(PipelineError::invalid_format(format!(
        "leading bytes [{}] match no supported image signature",
        preview.join(" ")
    )))
}
