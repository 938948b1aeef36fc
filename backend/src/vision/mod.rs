pub mod gemini;

use async_trait::async_trait;
use image::ImageReader;
use std::io::Cursor;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("URL parsing failed: {0}")]
    Url(#[from] url::ParseError),
    #[error("Vision API request failed: {status} - {body}")]
    Api { status: u16, body: String },
    #[error("Vision model returned no text{}", block_suffix(.0))]
    EmptyResponse(Option<String>),
    #[error("Could not read image: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Unrecognized image format")]
    UnknownFormat,
}

fn block_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|r| format!(" (blocked: {})", r))
        .unwrap_or_default()
}

/// An uploaded image after its header has been decoded.
#[derive(Debug, Clone)]
pub struct ImageInput {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
}

impl ImageInput {
    pub async fn open(path: &Path) -> Result<Self, VisionError> {
        let bytes = tokio::fs::read(path).await?;
        Self::from_bytes(bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, VisionError> {
        let reader = ImageReader::new(Cursor::new(bytes.as_slice())).with_guessed_format()?;
        let format = reader.format().ok_or(VisionError::UnknownFormat)?;
        let (width, height) = reader.into_dimensions()?;
        Ok(Self {
            mime_type: format.to_mime_type().to_string(),
            bytes,
            width,
            height,
        })
    }
}

/// Image + text prompt in, text out.
#[async_trait]
pub trait VisionModel: Send + Sync {
    async fn generate(&self, prompt: &str, image: &ImageInput) -> Result<String, VisionError>;
}
