//! CLI argument parsing tests.

use clap::Parser;
use parsekit::cli::{Cli, Command};

#[test]
fn test_cli_parses_get_subcommand() {
    let cli = Cli::parse_from(["parsekit", "get", "MyClass", "abc123"]);

    assert!(!cli.json);
    assert!(!cli.verbose);
    match cli.command {
        Command::Get {
            class_name,
            object_id,
            include,
            keys,
            timeout,
        } => {
            assert_eq!(class_name, "MyClass");
            assert_eq!(object_id, "abc123");
            assert!(include.is_empty());
            assert!(keys.is_empty());
            assert!(timeout.is_none());
        }
    }
}

#[test]
fn test_cli_repeatable_include_and_keys() {
    let cli = Cli::parse_from([
        "parsekit",
        "get",
        "Post",
        "p1",
        "--include",
        "author",
        "--include",
        "comments.author",
        "--keys",
        "title",
        "--timeout",
        "10",
    ]);

    let Command::Get {
        include,
        keys,
        timeout,
        ..
    } = cli.command;
    assert_eq!(include, vec!["author", "comments.author"]);
    assert_eq!(keys, vec!["title"]);
    assert_eq!(timeout, Some(10));
}

#[test]
fn test_cli_global_flags_after_subcommand() {
    let cli = Cli::parse_from([
        "parsekit",
        "get",
        "MyClass",
        "abc123",
        "--json",
        "-v",
        "--server",
        "https://parse.example.com/parse",
        "--app-id",
        "my-app",
    ]);

    assert!(cli.json);
    assert!(cli.verbose);
    assert_eq!(cli.server, "https://parse.example.com/parse");
    assert_eq!(cli.app_id.as_deref(), Some("my-app"));
}

#[test]
fn test_cli_requires_object_id() {
    let result = Cli::try_parse_from(["parsekit", "get", "MyClass"]);
    assert!(result.is_err());
}

#[test]
fn test_cli_rejects_unknown_subcommand() {
    let result = Cli::try_parse_from(["parsekit", "list", "MyClass"]);
    assert!(result.is_err());
}
