//! Mock Parse server.
//!
//! Provides an axum-based HTTP server that simulates the Parse REST API.

use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::fixtures::Fixtures;
use super::handlers;
use super::state::MockState;

/// A mock Parse server for testing.
///
/// The server runs in the background and can be used to test the Parse
/// client against a realistic API implementation.
pub struct MockServer {
    /// The URL where the server is listening.
    url: String,
    /// Handle to the server task.
    handle: JoinHandle<()>,
    /// Shared state that can be modified during tests.
    state: Arc<RwLock<MockState>>,
}

impl MockServer {
    /// Start a new mock server with default fixtures.
    ///
    /// The server listens on a random available port and returns immediately.
    /// Use `url()` to get the server's base URL.
    pub async fn start() -> Self {
        Self::with_state(Self::default_state()).await
    }

    /// Start a mock server with empty state.
    ///
    /// Useful when you want to control exactly what data is available.
    pub async fn start_empty() -> Self {
        Self::with_state(MockState::new()).await
    }

    /// Start a mock server with custom state.
    pub async fn with_state(state: MockState) -> Self {
        let shared_state = state.shared();
        let app = Self::create_router(shared_state.clone());

        // Bind to a random available port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let addr = listener.local_addr().expect("Failed to get local address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Server error");
        });

        Self {
            url: format!("http://{}", addr),
            handle,
            state: shared_state,
        }
    }

    /// Get the base URL of the mock server.
    ///
    /// Use this URL when creating a `ParseClient` for testing.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get access to the server's shared state.
    ///
    /// This allows modifying the mock data during a test.
    pub fn state(&self) -> Arc<RwLock<MockState>> {
        self.state.clone()
    }

    /// Number of object requests the server has received.
    pub async fn request_count(&self) -> u64 {
        self.state.read().await.request_count
    }

    /// Shutdown the server.
    ///
    /// This aborts the server task. It's safe to call multiple times.
    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }

    /// Create the default state with common test fixtures.
    fn default_state() -> MockState {
        Fixtures::default_scenario()
            .into_iter()
            .fold(MockState::new(), MockState::with_object)
    }

    /// Create the axum router with all routes.
    fn create_router(state: Arc<RwLock<MockState>>) -> Router {
        Router::new()
            .route(
                "/classes/:class_name/:object_id",
                get(handlers::get_object),
            )
            // Health check
            .route("/health", get(health_check))
            .with_state(state)
    }
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParseClient, ParseError, ParseObject, ParseQuery};

    #[tokio::test]
    async fn test_server_starts_and_responds() {
        let server = MockServer::start().await;

        // Server should be accessible
        let client = reqwest::Client::new();
        let response = client
            .get(format!("{}/health", server.url()))
            .send()
            .await
            .expect("Failed to send request");

        assert!(response.status().is_success());
        assert_eq!(response.text().await.unwrap(), "ok");

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_get_object_with_parse_client() {
        let server = MockServer::start().await;
        let client = ParseClient::new("test-app", server.url()).unwrap();

        let object = ParseQuery::get_query("MyClass")
            .get(&client, "abc123")
            .await
            .expect("Failed to get object");

        assert_eq!(object.object_id(), "abc123");
        assert_eq!(object.get_str("playerName"), Some("Sean Plott"));

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_empty_server() {
        let server = MockServer::start_empty().await;
        let client = ParseClient::new("test-app", server.url()).unwrap();

        let result = ParseQuery::get_query("MyClass").get(&client, "abc123").await;

        assert!(matches!(result, Err(ParseError::ObjectNotFound { .. })));

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_required_application_id() {
        let state = MockState::new()
            .with_object(ParseObject::new("MyClass", "abc123"))
            .with_required_application_id("right-app");
        let server = MockServer::with_state(state).await;

        let wrong = ParseClient::new("wrong-app", server.url()).unwrap();
        let err = ParseQuery::get_query("MyClass")
            .get(&wrong, "abc123")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ParseError::ApiError {
                status_code: Some(401),
                ..
            }
        ));

        let right = ParseClient::new("right-app", server.url()).unwrap();
        assert!(ParseQuery::get_query("MyClass")
            .get(&right, "abc123")
            .await
            .is_ok());

        server.shutdown().await;
    }
}
