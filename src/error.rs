//! Error types for Parse operations.

use thiserror::Error;

/// Numeric error codes reported by Parse servers.
///
/// Only the codes this crate produces or interprets are listed.
pub mod codes {
    /// Unknown or unclassified failure.
    pub const OTHER_CAUSE: i32 = -1;
    /// The server could not be reached.
    pub const CONNECTION_FAILED: i32 = 100;
    /// The requested object does not exist.
    pub const OBJECT_NOT_FOUND: i32 = 101;
    /// The class name is not a valid Parse class name.
    pub const INVALID_CLASS_NAME: i32 = 103;
    /// An object id was required but missing.
    pub const MISSING_OBJECT_ID: i32 = 104;
    /// The payload was not valid JSON or did not match the expected shape.
    pub const INVALID_JSON: i32 = 107;
    /// The request timed out.
    pub const TIMEOUT: i32 = 124;
    /// The server is rate limiting this client.
    pub const REQUEST_LIMIT_EXCEEDED: i32 = 155;
}

/// Errors that can occur while fetching Parse objects.
///
/// This is the single error value handed to a [`GetCallback`](crate::GetCallback)
/// when a fetch fails. Use [`ParseError::code`] to branch on the failure kind.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Configuration is missing or incomplete.
    #[error("Parse configuration required: {0}")]
    ConfigMissing(String),

    /// Class name does not follow Parse naming rules.
    #[error("Invalid class name '{0}': must start with a letter and contain only letters, digits and '_'")]
    InvalidClassName(String),

    /// Object id was empty.
    #[error("Object id is required to fetch a {0}")]
    MissingObjectId(String),

    /// Object not found.
    #[error("{class_name} '{object_id}' not found")]
    ObjectNotFound {
        class_name: String,
        object_id: String,
    },

    /// The server could not be reached.
    #[error("Connection failed: {0}")]
    ConnectionFailed(#[source] reqwest::Error),

    /// The request did not complete in time.
    #[error("Request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    /// API request failed.
    #[error("Parse API error {code:?}: {message}")]
    ApiError {
        code: Option<i32>,
        message: String,
        status_code: Option<u16>,
    },

    /// Rate limited.
    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(reqwest::Error),

    /// JSON parsing error.
    #[error("Failed to parse response: {0}")]
    JsonError(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    /// I/O error, e.g. the callback thread could not be spawned.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The fetch was cancelled before it completed.
    #[error("Fetch was cancelled")]
    Cancelled,

    /// No tokio runtime was available to run the fetch on, or the runtime
    /// shut down before the fetch finished.
    #[error("No tokio runtime available to run the fetch")]
    NoRuntime,

    /// The fetch task panicked.
    #[error("Fetch task panicked: {0}")]
    FetchPanicked(String),

    /// A two-slot completion carried both values or neither.
    #[error("Invalid completion: {0}")]
    InvalidCompletion(&'static str),
}

impl ParseError {
    /// The Parse numeric error code for this error.
    pub fn code(&self) -> i32 {
        match self {
            Self::ConnectionFailed(_) => codes::CONNECTION_FAILED,
            Self::ObjectNotFound { .. } => codes::OBJECT_NOT_FOUND,
            Self::InvalidClassName(_) => codes::INVALID_CLASS_NAME,
            Self::MissingObjectId(_) => codes::MISSING_OBJECT_ID,
            Self::JsonError(_) => codes::INVALID_JSON,
            Self::Timeout(_) => codes::TIMEOUT,
            Self::RateLimited { .. } => codes::REQUEST_LIMIT_EXCEEDED,
            Self::ApiError { code, .. } => code.unwrap_or(codes::OTHER_CAUSE),
            _ => codes::OTHER_CAUSE,
        }
    }

    /// Returns true if this error means the object does not exist.
    pub fn is_not_found(&self) -> bool {
        self.code() == codes::OBJECT_NOT_FOUND
    }

    /// Returns true if the server could not be reached or did not answer in time.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::ConnectionFailed(_) | Self::Timeout(_))
    }
}

impl From<reqwest::Error> for ParseError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            Self::ConnectionFailed(err)
        } else if err.is_timeout() {
            Self::Timeout(err)
        } else if err.is_decode() {
            Self::ApiError {
                code: Some(codes::INVALID_JSON),
                message: err.to_string(),
                status_code: err.status().map(|s| s.as_u16()),
            }
        } else {
            Self::HttpError(err)
        }
    }
}

/// Result type alias for Parse operations.
pub type Result<T> = core::result::Result<T, ParseError>;
