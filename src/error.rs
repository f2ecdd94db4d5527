use thiserror::Error;

/// Errors that can occur while ingesting, storing, searching or discovering recipes
#[derive(Error, Debug)]
pub enum ChefError {
    /// Submitted text was blank after trimming
    #[error("Input is empty")]
    EmptyInput,

    /// OCR produced no usable text, or the OCR engine failed
    #[error("Failed to extract text: {0}")]
    Extraction(String),

    /// Video URL does not belong to a supported provider
    #[error("Unsupported video source: {0}")]
    UnsupportedSource(String),

    /// The video provider has no transcript for this video
    #[error("No transcript available for {0}")]
    TranscriptUnavailable(String),

    /// The language model reply did not follow the expected layout
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    /// A recipe with this title already exists
    #[error("A recipe titled '{0}' already exists")]
    DuplicateTitle(String),

    /// No recipe with this id
    #[error("Recipe {0} not found")]
    NotFound(String),

    /// Web search returned no candidates
    #[error("No search results for '{0}'")]
    NoResults(String),

    /// A page or remote resource could not be retrieved
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The language model request itself failed
    #[error("LLM provider error: {0}")]
    Provider(String),

    /// User-edited fields violate recipe invariants
    #[error("Invalid recipe: {0}")]
    Validation(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Database migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Builder configuration error
    #[error("Builder error: {0}")]
    Builder(String),
}

pub type Result<T> = std::result::Result<T, ChefError>;

impl ChefError {
    pub(crate) fn fetch(url: &str, reason: impl ToString) -> Self {
        ChefError::Fetch {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Stable tag naming the error kind, for callers that branch on it
    pub fn kind(&self) -> &'static str {
        match self {
            ChefError::EmptyInput => "empty_input",
            ChefError::Extraction(_) => "extraction",
            ChefError::UnsupportedSource(_) => "unsupported_source",
            ChefError::TranscriptUnavailable(_) => "transcript_unavailable",
            ChefError::MalformedResponse(_) => "malformed_response",
            ChefError::DuplicateTitle(_) => "duplicate_title",
            ChefError::NotFound(_) => "not_found",
            ChefError::NoResults(_) => "no_results",
            ChefError::Fetch { .. } => "fetch",
            ChefError::Provider(_) => "provider",
            ChefError::Validation(_) => "validation",
            ChefError::Database(_) | ChefError::Migration(_) => "database",
            ChefError::Config(_) => "config",
            ChefError::Json(_) => "json",
            ChefError::Builder(_) => "builder",
        }
    }

    /// A message suitable for showing to the person who submitted the request.
    ///
    /// Infrastructure errors are not echoed verbatim since they can carry
    /// connection strings or provider responses.
    pub fn user_message(&self) -> String {
        match self {
            ChefError::EmptyInput => "Please enter some recipe text.".to_string(),
            ChefError::Extraction(_) => {
                "No text could be read from that image. Try a clearer photo.".to_string()
            }
            ChefError::UnsupportedSource(_) => {
                "Only YouTube video links are supported.".to_string()
            }
            ChefError::TranscriptUnavailable(_) => {
                "That video has no transcript. Try pasting the recipe text instead.".to_string()
            }
            ChefError::MalformedResponse(_) => {
                "The recipe could not be understood. Please try again.".to_string()
            }
            ChefError::DuplicateTitle(title) => {
                format!("You already have a recipe called \"{title}\".")
            }
            ChefError::NotFound(_) => "That recipe no longer exists.".to_string(),
            ChefError::NoResults(query) => format!("Nothing was found for \"{query}\"."),
            ChefError::Fetch { .. } => "The recipe page could not be loaded.".to_string(),
            ChefError::Validation(msg) => msg.clone(),
            ChefError::Provider(_)
            | ChefError::Database(_)
            | ChefError::Migration(_)
            | ChefError::Config(_)
            | ChefError::Json(_)
            | ChefError::Builder(_) => "Something went wrong. Please try again.".to_string(),
        }
    }
}

impl From<reqwest::Error> for ChefError {
    fn from(err: reqwest::Error) -> Self {
        let url = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        ChefError::Fetch {
            url,
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        assert_eq!(ChefError::EmptyInput.kind(), "empty_input");
        assert_eq!(
            ChefError::DuplicateTitle("Lasagna".to_string()).kind(),
            "duplicate_title"
        );
        assert_eq!(ChefError::fetch("http://x", "boom").kind(), "fetch");
    }

    #[test]
    fn test_user_message_hides_infrastructure_details() {
        let err = ChefError::Provider("401 invalid api key sk-123".to_string());
        assert!(!err.user_message().contains("sk-123"));

        let err = ChefError::DuplicateTitle("Lasagna".to_string());
        assert!(err.user_message().contains("Lasagna"));
    }

    #[test]
    fn test_fetch_display() {
        let err = ChefError::fetch("https://example.com/r", "status 500");
        assert_eq!(
            err.to_string(),
            "Failed to fetch https://example.com/r: status 500"
        );
    }
}
