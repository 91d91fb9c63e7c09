//! Parse REST client library.
//!
//! A Rust library for fetching objects from a Parse-style REST object
//! store. Fetches can be awaited directly, or run in the background with a
//! [`GetCallback`] that is invoked exactly once with the outcome on a
//! designated callback context.
//!
//! # Quick Start
//!
//! ```no_run
//! use parsekit::{ParseClient, ParseObject, ParseQuery};
//!
//! #[tokio::main]
//! async fn main() -> parsekit::Result<()> {
//!     // Create client from environment variables
//!     let client = ParseClient::from_env()?;
//!
//!     // Await a fetch
//!     let query = ParseQuery::get_query("MyClass");
//!     let object = query.get(&client, "abc123").await?;
//!     println!("Fetched {}", object.object_id());
//!
//!     // Or fetch in the background and get called back
//!     let handle = query.get_in_background(&client, "abc123", |result: parsekit::Result<ParseObject>| {
//!         match result {
//!             Ok(object) => println!("Fetched {}", object.object_id()),
//!             Err(e) => eprintln!("Fetch failed: {e}"),
//!         }
//!     });
//!     # let _ = handle;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`ParseQuery`] - Fetch one object of a class by id
//! - [`GetCallback`] - Result notifier run once per background fetch
//! - [`CallbackExecutor`] - Where callbacks run; [`DispatchQueue`] by default
//! - [`FetchHandle`] - Observe or cancel a background fetch
//!
//! # Configuration
//!
//! The client reads configuration from environment variables:
//!
//! - `PARSE_APPLICATION_ID` (required) - Your application id
//! - `PARSE_REST_API_KEY` (optional) - REST API key
//! - `PARSE_SERVER_URL` (optional) - Base URL (defaults to `http://localhost:1337/parse`)

pub mod callback;
pub mod cli;
mod client;
pub mod dispatch;
mod error;
mod object;
pub mod output;
mod query;

#[cfg(feature = "test-server")]
pub mod mock_server;

// Re-export core types
pub use callback::GetCallback;
pub use client::ParseClient;
pub use dispatch::{CallbackExecutor, DispatchQueue, FetchHandle, FetchOptions, FetchState, Job};
pub use error::{codes, ParseError, Result};
pub use object::{ParseClass, ParseObject};
pub use query::ParseQuery;
