//! Mock Parse server for E2E testing.
//!
//! This module provides an in-memory mock server that simulates the Parse
//! REST API for integration and end-to-end testing. Unlike wiremock which
//! mocks at the HTTP level per-test, this server maintains state across
//! requests, enabling realistic workflow testing.
//!
//! # Example
//!
//! ```ignore
//! use parsekit::mock_server::MockServer;
//! use parsekit::{ParseClient, ParseQuery};
//!
//! #[tokio::test]
//! async fn test_workflow() {
//!     let server = MockServer::start().await;
//!     let client = ParseClient::new("test-app", server.url()).unwrap();
//!
//!     // Server comes with default fixtures
//!     let object = ParseQuery::get_query("MyClass")
//!         .get(&client, "abc123")
//!         .await
//!         .unwrap();
//!     assert_eq!(object.get_str("playerName"), Some("Sean Plott"));
//!
//!     server.shutdown().await;
//! }
//! ```

mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::Fixtures;
pub use server::MockServer;
pub use state::MockState;
