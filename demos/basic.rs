//! Basic example demonstrating the Parse client.
//!
//! Run with:
//! ```
//! PARSE_APPLICATION_ID=your-app-id cargo run --example basic -- MyClass abc123
//! ```

use parsekit::callback::two_slot;
use parsekit::{ParseClient, ParseError, ParseObject, ParseQuery};
use tokio::sync::oneshot;

#[tokio::main]
async fn main() -> parsekit::Result<()> {
    // Initialize tracing for debugging (optional)
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let class_name = args.next().unwrap_or_else(|| "MyClass".to_string());
    let object_id = args.next().unwrap_or_else(|| "abc123".to_string());

    // Create client from environment variables
    println!("Creating Parse client...");
    let client = ParseClient::from_env()?;
    println!("Connected to: {}", client.base_url());

    let query = ParseQuery::get_query(class_name.as_str());

    // Awaited fetch
    println!("\n--- Awaited fetch ---");
    match query.get(&client, &object_id).await {
        Ok(object) => println!("Fetched {} with {} fields", object.object_id(), object.keys().count()),
        Err(e) => println!("Fetch failed ({}): {e}", e.code()),
    }

    // Background fetch with a two-slot callback
    println!("\n--- Background fetch ---");
    let (tx, rx) = oneshot::channel();
    query.get_in_background(
        &client,
        &object_id,
        two_slot(move |object: Option<ParseObject>, e: Option<ParseError>| {
            if let Some(e) = e {
                println!("Object retrieval failed: {e}");
            } else if let Some(object) = object {
                println!("Object retrieved: {}", object.object_id());
            }
            let _ = tx.send(());
        }),
    );
    let _ = rx.await;

    println!("\nDone!");
    Ok(())
}
