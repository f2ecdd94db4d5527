use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ChefError, Result};

/// Video hosts whose transcripts can be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VideoProvider {
    #[serde(rename = "youtube")]
    YouTube,
}

/// A video link that has been recognized as belonging to a supported provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRef {
    pub provider: VideoProvider,
    pub id: String,
    pub url: String,
}

/// Recognize a supported video URL.
///
/// Accepts `youtube.com/watch?v=`, `/shorts/`, `/embed/`, `/live/` and
/// `youtu.be/` links on any YouTube host.
pub fn parse_video_url(raw: &str) -> Result<VideoRef> {
    let raw = raw.trim();
    let unsupported = || ChefError::UnsupportedSource(raw.to_string());

    let url = Url::parse(raw).map_err(|_| unsupported())?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(unsupported());
    }
    let host = url.host_str().ok_or_else(unsupported)?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);

    let mut segments = url.path_segments().map(|s| s.collect::<Vec<_>>()).unwrap_or_default();
    segments.retain(|s| !s.is_empty());

    let id = match host {
        "youtu.be" => segments.first().map(|s| s.to_string()),
        "youtube.com" | "m.youtube.com" | "music.youtube.com" | "youtube-nocookie.com" => {
            match segments.as_slice() {
                ["watch"] => url
                    .query_pairs()
                    .find(|(k, _)| k == "v")
                    .map(|(_, v)| v.into_owned()),
                ["shorts" | "embed" | "live" | "v", id, ..] => Some(id.to_string()),
                _ => None,
            }
        }
        _ => None,
    };

    match id {
        Some(id) if is_youtube_id(&id) => Ok(VideoRef {
            provider: VideoProvider::YouTube,
            id,
            url: raw.to_string(),
        }),
        _ => Err(unsupported()),
    }
}

fn is_youtube_id(id: &str) -> bool {
    id.len() == 11
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Resolves the spoken text of a video
#[async_trait]
pub trait TranscriptService: Send + Sync {
    /// `Ok(None)` when the provider has no transcript for this video
    async fn transcript(&self, video: &VideoRef) -> Result<Option<String>>;
}

#[derive(Serialize)]
struct TranscriptRequest<'a> {
    url: &'a str,
    video_id: &'a str,
    provider: VideoProvider,
}

#[derive(Deserialize)]
struct TranscriptResponse {
    #[serde(default)]
    transcript: Option<String>,
}

/// Transcript lookups against an HTTP transcript service.
///
/// Sends `POST {endpoint}/api/transcript` with the video URL and id, and
/// expects `{"transcript": "..."}` back. A 404 means no transcript exists.
pub struct HttpTranscriptService {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpTranscriptService {
    pub fn new(client: Client, endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        let endpoint = endpoint.into();
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl TranscriptService for HttpTranscriptService {
    async fn transcript(&self, video: &VideoRef) -> Result<Option<String>> {
        let endpoint = format!("{}/api/transcript", self.endpoint);
        let mut request = self.client.post(&endpoint).json(&TranscriptRequest {
            url: &video.url,
            video_id: &video.id,
            provider: video.provider,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ChefError::fetch(&endpoint, e))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("No transcript for video {}", video.id);
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ChefError::fetch(
                &endpoint,
                format!("transcript service returned {}", response.status()),
            ));
        }

        let body: TranscriptResponse = response
            .json()
            .await
            .map_err(|e| ChefError::fetch(&endpoint, e))?;
        Ok(body.transcript.filter(|t| !t.trim().is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[test]
    fn test_parse_supported_urls() {
        let cases = [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://m.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?si=abc",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "  http://youtube.com/live/dQw4w9WgXcQ  ",
        ];
        for case in cases {
            let video = parse_video_url(case).unwrap();
            assert_eq!(video.id, "dQw4w9WgXcQ", "{case}");
            assert_eq!(video.provider, VideoProvider::YouTube);
        }
    }

    #[test]
    fn test_parse_rejects_other_sources() {
        let cases = [
            "https://vimeo.com/123456",
            "https://www.youtube.com/channel/UC123",
            "https://www.youtube.com/watch?v=short",
            "https://notyoutube.com/watch?v=dQw4w9WgXcQ",
            "ftp://youtube.com/watch?v=dQw4w9WgXcQ",
            "/tmp/video.mp4",
            "",
        ];
        for case in cases {
            assert!(
                matches!(parse_video_url(case), Err(ChefError::UnsupportedSource(_))),
                "{case}"
            );
        }
    }

    fn video() -> VideoRef {
        parse_video_url("https://youtu.be/dQw4w9WgXcQ").unwrap()
    }

    #[tokio::test]
    async fn test_http_transcript_found() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/transcript")
            .match_header("authorization", "Bearer secret")
            .match_body(Matcher::PartialJsonString(
                r#"{"video_id": "dQw4w9WgXcQ", "provider": "youtube"}"#.to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"transcript": "today we make soup"}"#)
            .create_async()
            .await;

        let service =
            HttpTranscriptService::new(Client::new(), server.url(), Some("secret".to_string()));
        let transcript = service.transcript(&video()).await.unwrap();

        assert_eq!(transcript.as_deref(), Some("today we make soup"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_transcript_not_found() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/transcript")
            .with_status(404)
            .create_async()
            .await;

        let service = HttpTranscriptService::new(Client::new(), server.url(), None);
        assert_eq!(service.transcript(&video()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_http_transcript_blank_is_none() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/transcript")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"transcript": "   "}"#)
            .create_async()
            .await;

        let service = HttpTranscriptService::new(Client::new(), server.url(), None);
        assert_eq!(service.transcript(&video()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_http_transcript_server_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/transcript")
            .with_status(500)
            .create_async()
            .await;

        let service = HttpTranscriptService::new(Client::new(), server.url(), None);
        assert!(matches!(
            service.transcript(&video()).await,
            Err(ChefError::Fetch { .. })
        ));
    }
}
