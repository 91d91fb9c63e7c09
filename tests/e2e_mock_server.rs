//! E2E tests using the mock Parse server.
//!
//! These tests exercise full fetch scenarios against the mock server,
//! going through the background fetch and callback path the way an
//! application would.

#![cfg(feature = "test-server")]

use std::time::Duration;

use parsekit::mock_server::{Fixtures, MockServer, MockState};
use parsekit::{FetchState, ParseClient, ParseError, ParseObject, ParseQuery};
use tokio::sync::mpsc;

const WAIT: Duration = Duration::from_secs(5);

/// Run a background fetch and collect everything the callback receives.
async fn fetch_via_callback(
    client: &ParseClient,
    class_name: &str,
    object_id: &str,
) -> Vec<parsekit::Result<ParseObject>> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = ParseQuery::get_query(class_name).get_in_background(
        client,
        object_id,
        move |result: parsekit::Result<ParseObject>| {
            let _ = tx.send(result);
        },
    );

    let mut deliveries = Vec::new();
    // The channel closes once the callback has run and dropped its sender
    while let Ok(Some(result)) = tokio::time::timeout(WAIT, rx.recv()).await {
        deliveries.push(result);
    }
    assert_eq!(handle.state(), FetchState::Completed);
    deliveries
}

// =============================================================================
// Server Lifecycle Tests
// =============================================================================

#[tokio::test]
async fn test_server_starts_on_random_port() {
    let server1 = MockServer::start().await;
    let server2 = MockServer::start().await;

    // Both servers should have different URLs
    assert_ne!(server1.url(), server2.url());

    server1.shutdown().await;
    server2.shutdown().await;
}

// =============================================================================
// Fetch Scenarios
// =============================================================================

#[tokio::test]
async fn test_fetch_existing_object() {
    let server = MockServer::start().await;
    let client = ParseClient::new("test-app", server.url()).unwrap();

    let deliveries = fetch_via_callback(&client, "MyClass", "abc123").await;

    assert_eq!(deliveries.len(), 1);
    let object = deliveries[0].as_ref().expect("expected the object");
    assert_eq!(object.object_id(), "abc123");
    assert_eq!(object.class_name(), "MyClass");
    assert_eq!(object.get_str("playerName"), Some("Sean Plott"));

    server.shutdown().await;
}

#[tokio::test]
async fn test_fetch_missing_object() {
    let server = MockServer::start().await;
    let client = ParseClient::new("test-app", server.url()).unwrap();

    let deliveries = fetch_via_callback(&client, "MyClass", "missing").await;

    assert_eq!(deliveries.len(), 1);
    let err = deliveries[0].as_ref().expect_err("expected an error");
    assert!(err.is_not_found());
    assert!(err.to_string().contains("not found"));

    server.shutdown().await;
}

#[tokio::test]
async fn test_fetch_during_outage() {
    let server = MockServer::start().await;
    let url = server.url().to_string();
    server.shutdown().await;

    let client = ParseClient::new("test-app", &url).unwrap();
    let deliveries = fetch_via_callback(&client, "MyClass", "abc123").await;

    assert_eq!(deliveries.len(), 1);
    let err = deliveries[0].as_ref().expect_err("expected an error");
    assert!(err.is_connectivity(), "unexpected error: {err:?}");
    assert!(matches!(err, ParseError::ConnectionFailed(_)));
}

#[tokio::test]
async fn test_failed_fetch_is_not_retried() {
    let state = MockState::new().with_required_application_id("other-app");
    let server = MockServer::with_state(state).await;
    let client = ParseClient::new("test-app", server.url()).unwrap();

    let deliveries = fetch_via_callback(&client, "MyClass", "abc123").await;

    assert_eq!(deliveries.len(), 1);
    assert!(deliveries[0].is_err());
    assert_eq!(server.request_count().await, 1);

    server.shutdown().await;
}

#[tokio::test]
async fn test_object_added_after_start_is_visible() {
    let server = MockServer::start_empty().await;
    let client = ParseClient::new("test-app", server.url()).unwrap();
    let query = ParseQuery::get_query("GameScore");

    assert!(query.get(&client, "g9").await.unwrap_err().is_not_found());

    server
        .state()
        .write()
        .await
        .insert(Fixtures::game_score("g9", "Late Player", 7));

    let object = query.get(&client, "g9").await.unwrap();
    assert_eq!(object.get_i64("score"), Some(7));
    assert!(object.created_at().is_some());

    server.shutdown().await;
}

#[tokio::test]
async fn test_object_removed_mid_run_is_not_found() {
    let server = MockServer::start().await;
    let client = ParseClient::new("test-app", server.url()).unwrap();

    let deliveries = fetch_via_callback(&client, "GameScore", "g1").await;
    assert!(deliveries[0].is_ok());

    let removed = server.state().write().await.remove("GameScore", "g1");
    assert!(removed.is_some());

    let deliveries = fetch_via_callback(&client, "GameScore", "g1").await;
    assert_eq!(deliveries.len(), 1);
    assert!(deliveries[0].as_ref().unwrap_err().is_not_found());

    server.shutdown().await;
}

#[tokio::test]
async fn test_include_resolves_pointer() {
    let server = MockServer::start().await;
    let client = ParseClient::new("test-app", server.url()).unwrap();

    let plain = ParseQuery::get_query("MyClass")
        .get(&client, "abc123")
        .await
        .unwrap();
    assert_eq!(plain.get("owner").unwrap()["__type"], "Pointer");

    let included = ParseQuery::get_query("MyClass")
        .include("owner")
        .get(&client, "abc123")
        .await
        .unwrap();
    let owner = included.get("owner").unwrap();
    assert_eq!(owner["__type"], "Object");
    assert_eq!(owner["username"], "sean");

    server.shutdown().await;
}

#[tokio::test]
async fn test_dotted_include_resolves_nested_pointer() {
    let state = MockState::new()
        .with_object(Fixtures::user("u1", "sean"))
        .with_object(
            ParseObject::new("Post", "p1").with("author", Fixtures::pointer("_User", "u1")),
        )
        .with_object(
            ParseObject::new("Comment", "c1").with("post", Fixtures::pointer("Post", "p1")),
        );
    let server = MockServer::with_state(state).await;
    let client = ParseClient::new("test-app", server.url()).unwrap();

    let comment = ParseQuery::get_query("Comment")
        .include("post.author")
        .get(&client, "c1")
        .await
        .unwrap();

    let post = comment.get("post").unwrap();
    assert_eq!(post["__type"], "Object");
    assert_eq!(post["author"]["__type"], "Object");
    assert_eq!(post["author"]["username"], "sean");

    server.shutdown().await;
}

#[tokio::test]
async fn test_select_keys() {
    let server = MockServer::start().await;
    let client = ParseClient::new("test-app", server.url()).unwrap();

    let object = ParseQuery::get_query("GameScore")
        .select_keys(["score"])
        .get(&client, "g2")
        .await
        .unwrap();

    assert_eq!(object.get_i64("score"), Some(42));
    assert!(!object.contains_key("playerName"));

    server.shutdown().await;
}

#[tokio::test]
async fn test_cancel_slow_fetch() {
    let state = MockState::new()
        .with_object(Fixtures::minimal_object("MyClass", "abc123"))
        .with_latency(Duration::from_secs(2));
    let server = MockServer::with_state(state).await;
    let client = ParseClient::new("test-app", server.url()).unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = ParseQuery::get_query("MyClass").get_in_background(
        &client,
        "abc123",
        move |result: parsekit::Result<ParseObject>| {
            let _ = tx.send(result);
        },
    );
    assert!(handle.cancel());

    let outcome = tokio::time::timeout(WAIT, rx.recv()).await;
    assert!(matches!(outcome, Ok(None)), "cancelled fetch must not call back");
    assert_eq!(handle.state(), FetchState::Cancelled);

    server.shutdown().await;
}
