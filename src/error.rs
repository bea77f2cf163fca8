//! Error types for relnotes.
//!
//! Component errors ([`TrackerError`], [`ScrapeError`], [`SummarizerError`])
//! are per-item and never abort a generation run on their own; the assembler
//! turns them into placeholders. Only [`RelnotesError::Config`] stops a run.

use thiserror::Error;

/// Main error type for relnotes operations.
#[derive(Error, Debug)]
pub enum RelnotesError {
    // Settings / configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    // Input validation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Storage errors
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Generation already in progress for release {0}")]
    GenerationInProgress(String),

    #[error("Template rendering failed: {0}")]
    TemplateError(#[from] tera::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),

    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] log::SetLoggerError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using RelnotesError
pub type Result<T> = std::result::Result<T, RelnotesError>;

impl RelnotesError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

/// Per-key failure while fetching a ticket from the issue tracker.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    #[error("tracker rejected credentials while fetching {key}")]
    Authentication { key: String },

    #[error("ticket {key} not found")]
    NotFound { key: String },

    #[error("timed out fetching {key}")]
    Timeout { key: String },

    #[error("request for {key} failed: {message}")]
    Network { key: String, message: String },

    #[error("unexpected tracker response for {key}: {message}")]
    UnexpectedResponse { key: String, message: String },
}

impl TrackerError {
    /// Map a transport error for `key` onto a tracker error kind.
    pub fn from_reqwest(key: &str, err: reqwest::Error) -> Self {
        let key = key.to_string();

        if err.is_timeout() {
            return Self::Timeout { key };
        }

        if err.is_decode() {
            return Self::UnexpectedResponse {
                key,
                message: err.to_string(),
            };
        }

        if let Some(status) = err.status() {
            return Self::from_status(&key, status.as_u16())
                .unwrap_or(Self::Network {
                    key,
                    message: err.to_string(),
                });
        }

        Self::Network {
            key,
            message: err.to_string(),
        }
    }

    /// Classify a non-success HTTP status. Returns None for 2xx.
    pub fn from_status(key: &str, status: u16) -> Option<Self> {
        let key = key.to_string();
        match status {
            200..=299 => None,
            401 | 403 => Some(Self::Authentication { key }),
            404 => Some(Self::NotFound { key }),
            408 | 504 => Some(Self::Timeout { key }),
            code => Some(Self::Network {
                key,
                message: format!("tracker responded with status {code}"),
            }),
        }
    }
}

/// Per-URL failure while scraping an upstream bug page.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScrapeError {
    #[error("could not reach {url}: {message}")]
    Unreachable { url: String, message: String },

    #[error("timed out fetching {url}")]
    Timeout { url: String },

    #[error("{url} is missing the expected '{element}' element")]
    MissingElement { url: String, element: String },

    #[error("could not parse {url}: {message}")]
    Parse { url: String, message: String },
}

impl ScrapeError {
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout {
                url: url.to_string(),
            };
        }

        Self::Unreachable {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

/// Per-item failure while asking the LLM for a summary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SummarizerError {
    #[error("nothing to summarize")]
    EmptyInput,

    #[error("LLM request timed out")]
    Timeout,

    #[error("LLM API error: {0}")]
    Api(String),

    #[error("unexpected LLM response: {0}")]
    UnexpectedResponse(String),

    #[error("LLM returned an empty summary")]
    EmptyOutput,
}

impl From<reqwest::Error> for SummarizerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::UnexpectedResponse(err.to_string())
        } else {
            Self::Api(err.to_string())
        }
    }
}
