use thiserror::Error;

#[derive(Error, Debug)]
pub enum FloraIdError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("No generation API key configured. Set GOOGLE_API_KEY or run `flora-id config --set-api-key YOUR_KEY`")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Failed to parse API response: {0}")]
    ApiParse(String),

    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] flora_id_common::Error),

    #[error("No species of '{0}' found in the specified area")]
    NoSpeciesFound(String),

    #[error("Failed to write report: {0}")]
    ReportWrite(String),

    #[error("Input prompt failed: {0}")]
    Prompt(String),
}

impl FloraIdError {
    /// Whether a retry could plausibly succeed (transport trouble, 5xx, 429)
    pub fn is_transient(&self) -> bool {
        match self {
            FloraIdError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request() || e.is_body(),
            FloraIdError::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, FloraIdError>;
