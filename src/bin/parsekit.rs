//! Parse CLI binary.
//!
//! A command-line interface for fetching objects from a Parse server.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use parsekit::cli::{Cli, Command};
use parsekit::output::PrettyPrint;
use parsekit::{ParseClient, ParseError, ParseObject, ParseQuery};
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let client = match build_client(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Hint: Set PARSE_APPLICATION_ID or pass --app-id");
            return ExitCode::FAILURE;
        }
    };

    match run(&client, cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.pretty_print());
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "parsekit=debug" } else { "parsekit=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn build_client(cli: &Cli) -> parsekit::Result<ParseClient> {
    let app_id = cli.app_id.as_deref().ok_or_else(|| {
        ParseError::ConfigMissing("PARSE_APPLICATION_ID environment variable not set".to_string())
    })?;

    let client = ParseClient::new(app_id, &cli.server)?;
    Ok(match cli.rest_key.as_deref() {
        Some(key) => client.with_rest_api_key(key),
        None => client,
    })
}

async fn run(client: &ParseClient, cli: Cli) -> parsekit::Result<()> {
    match cli.command {
        Command::Get {
            class_name,
            object_id,
            include,
            keys,
            timeout,
        } => {
            let client = match timeout {
                Some(secs) => client.clone().with_timeout(Duration::from_secs(secs))?,
                None => client.clone(),
            };
            handle_get(&client, &class_name, &object_id, include, keys, cli.json).await
        }
    }
}

async fn handle_get(
    client: &ParseClient,
    class_name: &str,
    object_id: &str,
    include: Vec<String>,
    keys: Vec<String>,
    json: bool,
) -> parsekit::Result<()> {
    let mut query = ParseQuery::get_query(class_name);
    for key in include {
        query = query.include(key);
    }
    if !keys.is_empty() {
        query = query.select_keys(keys);
    }

    // The callback runs on the client's callback thread; hand the outcome
    // back to main so the process can exit with the right status.
    let (tx, rx) = oneshot::channel();
    query.get_in_background(client, object_id, move |result: parsekit::Result<ParseObject>| {
        let outcome = result.and_then(|object| render(&object, json));
        let _ = tx.send(outcome);
    });

    match rx.await {
        Ok(outcome) => outcome,
        Err(_) => Err(ParseError::Cancelled),
    }
}

fn render(object: &ParseObject, json: bool) -> parsekit::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(object)?);
    } else {
        println!("{}", object.pretty_print());
    }
    Ok(())
}
