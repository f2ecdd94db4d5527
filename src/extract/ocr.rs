use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::{ChefError, Result};

/// Reads text out of an image.
///
/// Implementations return whatever text they recognized, possibly empty;
/// deciding that empty text is an error is left to the caller.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    fn engine_name(&self) -> &str;

    async fn recognize(&self, image: &[u8]) -> Result<String>;
}

/// On-device OCR through the `tesseract` command line tool.
///
/// Image bytes are piped over stdin and never touch the filesystem.
pub struct TesseractOcr {
    binary: String,
    language: String,
}

impl TesseractOcr {
    pub fn new(binary: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
        }
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new("tesseract", "eng")
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    fn engine_name(&self) -> &str {
        "tesseract"
    }

    async fn recognize(&self, image: &[u8]) -> Result<String> {
        let mut child = Command::new(&self.binary)
            .args(["stdin", "stdout", "-l", self.language.as_str()])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ChefError::Extraction(format!("failed to start {}: {e}", self.binary)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ChefError::Extraction("tesseract stdin unavailable".to_string()))?;

        let write = async move {
            let result = stdin.write_all(image).await;
            drop(stdin);
            result
        };
        let (written, output) = tokio::join!(write, child.wait_with_output());

        let output =
            output.map_err(|e| ChefError::Extraction(format!("tesseract failed: {e}")))?;
        written.map_err(|e| ChefError::Extraction(format!("failed to send image: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ChefError::Extraction(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("Tesseract recognized {} characters", text.len());
        Ok(text)
    }
}

/// OCR through the Google Cloud Vision `TEXT_DETECTION` feature
pub struct GoogleVisionOcr {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GoogleVisionOcr {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, "https://vision.googleapis.com")
    }

    pub fn with_base_url(
        client: Client,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl OcrEngine for GoogleVisionOcr {
    fn engine_name(&self) -> &str {
        "google_vision"
    }

    async fn recognize(&self, image: &[u8]) -> Result<String> {
        let request_body = json!({
            "requests": [{
                "image": {
                    "content": STANDARD.encode(image)
                },
                "features": [{
                    "type": "TEXT_DETECTION"
                }]
            }]
        });

        debug!("Sending OCR request to Google Vision API");

        let response = self
            .client
            .post(format!("{}/v1/images:annotate", self.base_url))
            .query(&[("key", &self.api_key)])
            .header("Accept-Encoding", "identity")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ChefError::Extraction(format!("Google Vision request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ChefError::Extraction(format!(
                "Google Vision API error ({}): {}",
                status, error_text
            )));
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| ChefError::Extraction(format!("invalid Google Vision response: {e}")))?;

        // An image without text comes back with no annotation at all
        let text = response_body["responses"][0]["fullTextAnnotation"]["text"]
            .as_str()
            .unwrap_or_default()
            .to_string();

        debug!("Extracted text from image: {} characters", text.len());
        Ok(text)
    }
}
