//! Parse REST client.
//!
//! Low-level HTTP client that handles authentication, raw requests and the
//! callback context background fetches deliver to. Object fetches are
//! implemented by [`ParseQuery`](crate::ParseQuery).

use std::env;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Response};
use serde::Serialize;
use tokio::runtime::Handle;
use url::Url;

use crate::dispatch::{CallbackExecutor, DispatchQueue};
use crate::error::{ParseError, Result};

const DEFAULT_SERVER_URL: &str = "http://localhost:1337/parse";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("parsekit/", env!("CARGO_PKG_VERSION"));
const CALLBACK_THREAD_NAME: &str = "parse-callbacks";

const APPLICATION_ID_HEADER: &str = "X-Parse-Application-Id";
const REST_API_KEY_HEADER: &str = "X-Parse-REST-API-Key";

/// Low-level Parse API client.
///
/// Handles authentication and HTTP requests, and owns the callback context
/// used by background fetches.
///
/// This struct is cheaply cloneable; clones share the connection pool and
/// the callback context.
///
/// # Example
///
/// ```no_run
/// use parsekit::ParseClient;
///
/// # fn example() -> parsekit::Result<()> {
/// // Create from environment variables
/// let client = ParseClient::from_env()?;
///
/// // Or configure manually
/// let client = ParseClient::new("my-app-id", "https://parse.example.com/parse")?
///     .with_rest_api_key("my-rest-key");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ParseClient {
    http: Client,
    base_url: Arc<Url>,
    application_id: String,
    rest_api_key: Option<String>,
    executor: Arc<dyn CallbackExecutor>,
    runtime: Option<Handle>,
}

impl std::fmt::Debug for ParseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseClient")
            .field("base_url", &self.base_url.as_str())
            .field("application_id", &self.application_id)
            .finish_non_exhaustive()
    }
}

impl ParseClient {
    /// Create a client from environment variables.
    ///
    /// Uses `PARSE_APPLICATION_ID` (required), `PARSE_REST_API_KEY`
    /// (optional) and `PARSE_SERVER_URL` (defaults to
    /// `http://localhost:1337/parse`).
    ///
    /// # Errors
    ///
    /// Returns an error if `PARSE_APPLICATION_ID` is not set.
    pub fn from_env() -> Result<Self> {
        let application_id = env::var("PARSE_APPLICATION_ID").map_err(|_| {
            ParseError::ConfigMissing(
                "PARSE_APPLICATION_ID environment variable not set".to_string(),
            )
        })?;

        let server_url =
            env::var("PARSE_SERVER_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());

        let client = Self::new(&application_id, &server_url)?;
        Ok(match env::var("PARSE_REST_API_KEY") {
            Ok(key) if !key.is_empty() => client.with_rest_api_key(&key),
            _ => client,
        })
    }

    /// Create a new client for an application on the given server.
    ///
    /// Starts a [`DispatchQueue`] named `parse-callbacks` as the callback
    /// context. Replace it with [`with_executor`](Self::with_executor).
    ///
    /// # Errors
    ///
    /// Returns an error if the server URL is invalid or the callback thread
    /// cannot be started.
    pub fn new(application_id: &str, server_url: &str) -> Result<Self> {
        let executor = DispatchQueue::new(CALLBACK_THREAD_NAME)?;
        Self::build(application_id, server_url, DEFAULT_TIMEOUT, Arc::new(executor))
    }

    fn build(
        application_id: &str,
        server_url: &str,
        timeout: Duration,
        executor: Arc<dyn CallbackExecutor>,
    ) -> Result<Self> {
        // Ensure base URL ends with /
        let base_url_str = if server_url.ends_with('/') {
            server_url.to_string()
        } else {
            format!("{server_url}/")
        };

        let base_url = Url::parse(&base_url_str)?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(timeout)
            .build()
            .map_err(ParseError::HttpError)?;

        Ok(Self {
            http,
            base_url: Arc::new(base_url),
            application_id: application_id.to_string(),
            rest_api_key: None,
            executor,
            runtime: None,
        })
    }

    /// Set the REST API key sent with every request.
    #[must_use]
    pub fn with_rest_api_key(mut self, key: &str) -> Self {
        self.rest_api_key = Some(key.to_string());
        self
    }

    /// Set the per-request timeout (default 30 seconds).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be rebuilt.
    pub fn with_timeout(self, timeout: Duration) -> Result<Self> {
        let rebuilt = Self::build(
            &self.application_id,
            self.base_url.as_str(),
            timeout,
            self.executor.clone(),
        )?;
        Ok(Self {
            rest_api_key: self.rest_api_key,
            runtime: self.runtime,
            ..rebuilt
        })
    }

    /// Deliver background fetch callbacks on `executor` instead of the
    /// default dispatch queue.
    #[must_use]
    pub fn with_executor(mut self, executor: impl CallbackExecutor) -> Self {
        self.executor = Arc::new(executor);
        self
    }

    /// Run background fetches on this runtime instead of the ambient one.
    ///
    /// Needed when `get_in_background` is called from threads that are not
    /// inside a tokio runtime, such as a GUI main thread.
    #[must_use]
    pub fn with_runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    pub(crate) fn executor(&self) -> &Arc<dyn CallbackExecutor> {
        &self.executor
    }

    /// The runtime background fetches are spawned on, if any.
    pub(crate) fn runtime(&self) -> Option<Handle> {
        self.runtime.clone().or_else(|| Handle::try_current().ok())
    }

    /// Make a GET request with query parameters.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_with_query<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<Response> {
        let url = self.base_url.join(path)?;

        let response = self
            .authorize(self.http.get(url))
            .query(query)
            .send()
            .await?;

        Self::check_response(response).await
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request.header(APPLICATION_ID_HEADER, &self.application_id);
        match &self.rest_api_key {
            Some(key) => request.header(REST_API_KEY_HEADER, key),
            None => request,
        }
    }

    /// Check response status and convert errors.
    async fn check_response(response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        // Handle rate limiting
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(ParseError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        let (code, message) = Self::extract_error(response, status).await;
        Err(ParseError::ApiError {
            code,
            message,
            status_code: Some(status.as_u16()),
        })
    }

    /// Extract the Parse error code and message from a failed response.
    ///
    /// Parse servers answer with `{"code": 101, "error": "Object not found."}`.
    async fn extract_error(
        response: Response,
        status: reqwest::StatusCode,
    ) -> (Option<i32>, String) {
        let body = match response.text().await {
            Ok(b) => b,
            Err(_) => return (None, format!("HTTP {status}")),
        };

        if let Ok(json) = serde_json::from_str::<serde_json::Value>(&body) {
            let code = json
                .get("code")
                .and_then(|c| c.as_i64())
                .and_then(|c| i32::try_from(c).ok());
            let message = json
                .get("error")
                .or_else(|| json.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string);
            if code.is_some() || message.is_some() {
                return (code, message.unwrap_or_else(|| format!("HTTP {status}")));
            }
        }

        if body.is_empty() {
            (None, format!("HTTP {status}"))
        } else {
            (None, body)
        }
    }
}
