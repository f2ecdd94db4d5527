mod ocr;
mod video;

pub use ocr::{GoogleVisionOcr, OcrEngine, TesseractOcr};
pub use video::{parse_video_url, HttpTranscriptService, TranscriptService, VideoProvider, VideoRef};

use log::{info, warn};
use std::fmt;
use std::sync::Arc;

use crate::error::{ChefError, Result};

/// Raw recipe input as submitted by the user
#[derive(Clone)]
pub enum ExtractInput {
    /// Typed or pasted recipe text
    Text(String),
    /// A photo of a recipe. `origin` is a traceable URL for the image, if any.
    Image {
        bytes: Vec<u8>,
        origin: Option<String>,
    },
    /// A link to a recipe video
    Video(String),
}

impl ExtractInput {
    pub fn text(text: impl Into<String>) -> Self {
        ExtractInput::Text(text.into())
    }

    pub fn image(bytes: Vec<u8>) -> Self {
        ExtractInput::Image {
            bytes,
            origin: None,
        }
    }

    pub fn video(url: impl Into<String>) -> Self {
        ExtractInput::Video(url.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ExtractInput::Text(_) => "text",
            ExtractInput::Image { .. } => "image",
            ExtractInput::Video(_) => "video",
        }
    }
}

// Keeps image bytes out of logs and error reports
impl fmt::Debug for ExtractInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractInput::Text(text) => f.debug_tuple("Text").field(&text.len()).finish(),
            ExtractInput::Image { bytes, origin } => f
                .debug_struct("Image")
                .field("bytes", &bytes.len())
                .field("origin", origin)
                .finish(),
            ExtractInput::Video(url) => f.debug_tuple("Video").field(url).finish(),
        }
    }
}

/// Plain text produced from an input, plus the URL it can be traced back to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub text: String,
    pub source_url: Option<String>,
}

/// Produces plain recipe text from text, image or video input.
///
/// The OCR engine and transcript service are optional so that a text-only
/// setup needs neither; using an unconfigured one is a builder error.
#[derive(Clone, Default)]
pub struct TextExtractor {
    ocr: Option<Arc<dyn OcrEngine>>,
    transcripts: Option<Arc<dyn TranscriptService>>,
}

impl TextExtractor {
    pub fn new(
        ocr: Option<Arc<dyn OcrEngine>>,
        transcripts: Option<Arc<dyn TranscriptService>>,
    ) -> Self {
        Self { ocr, transcripts }
    }

    /// Extract plain text from `input`.
    ///
    /// Image bytes are moved in and dropped before this returns.
    pub async fn extract(&self, input: ExtractInput) -> Result<Extracted> {
        info!("Extracting text from {} input", input.kind());
        match input {
            ExtractInput::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    warn!("Rejected blank text input");
                    return Err(ChefError::EmptyInput);
                }
                Ok(Extracted {
                    text: text.to_string(),
                    source_url: None,
                })
            }
            ExtractInput::Image { bytes, origin } => {
                let ocr = self.ocr.as_ref().ok_or_else(|| {
                    ChefError::Builder("no OCR engine configured".to_string())
                })?;
                let recognized = ocr.recognize(&bytes).await?;
                drop(bytes);

                let text = recognized.trim();
                if text.is_empty() {
                    warn!("{} recognized no text in image", ocr.engine_name());
                    return Err(ChefError::Extraction(
                        "no text recognized in image".to_string(),
                    ));
                }
                Ok(Extracted {
                    text: text.to_string(),
                    source_url: origin.filter(|o| !o.trim().is_empty()),
                })
            }
            ExtractInput::Video(url) => {
                let video = parse_video_url(&url)?;
                let transcripts = self.transcripts.as_ref().ok_or_else(|| {
                    ChefError::Builder("no transcript service configured".to_string())
                })?;

                let transcript = transcripts
                    .transcript(&video)
                    .await?
                    .filter(|t| !t.trim().is_empty())
                    .ok_or_else(|| ChefError::TranscriptUnavailable(video.url.clone()))?;

                Ok(Extracted {
                    text: transcript.trim().to_string(),
                    source_url: Some(video.url),
                })
            }
        }
    }
}
