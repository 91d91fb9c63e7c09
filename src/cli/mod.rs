//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the parsekit binary.

use clap::{Parser, Subcommand};

/// Parse REST command-line interface.
#[derive(Parser, Debug)]
#[command(name = "parsekit", about = "Parse object store CLI", version)]
pub struct Cli {
    /// Output results as JSON instead of a table.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true, default_value = "false")]
    pub verbose: bool,

    /// Parse server URL.
    #[arg(
        long,
        global = true,
        env = "PARSE_SERVER_URL",
        default_value = "http://localhost:1337/parse"
    )]
    pub server: String,

    /// Application id sent as X-Parse-Application-Id.
    #[arg(long, global = true, env = "PARSE_APPLICATION_ID")]
    pub app_id: Option<String>,

    /// REST API key sent as X-Parse-REST-API-Key.
    #[arg(long, global = true, env = "PARSE_REST_API_KEY", hide_env_values = true)]
    pub rest_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch a single object by class and id.
    Get {
        /// The class to fetch from (e.g., "MyClass").
        class_name: String,

        /// The object id.
        object_id: String,

        /// Pointer field to resolve (repeatable).
        #[arg(long)]
        include: Vec<String>,

        /// Only return these fields (repeatable).
        #[arg(long)]
        keys: Vec<String>,

        /// Give up after this many seconds.
        #[arg(long)]
        timeout: Option<u64>,
    },
}
