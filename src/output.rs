//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output
//! as an alternative to JSON serialization.

use tabled::{Table, Tabled};

use crate::{ParseError, ParseObject};

/// Trait for human-readable key-value output.
///
/// Implemented by entity types to provide formatted output
/// suitable for terminal display when `--json` is not specified.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

#[derive(Tabled)]
struct FieldRow {
    field: String,
    value: String,
}

impl PrettyPrint for ParseObject {
    fn pretty_print(&self) -> String {
        let header = format!("{}: {}", self.class_name(), self.object_id());
        let divider = "─".repeat(header.len().max(30));

        let mut lines = vec![header, divider];

        if let Some(created) = self.created_at() {
            lines.push(format!("Created:        {}", created.format("%Y-%m-%d %H:%M:%S UTC")));
        }

        if let Some(updated) = self.updated_at() {
            lines.push(format!("Updated:        {}", updated.format("%Y-%m-%d %H:%M:%S UTC")));
        }

        let rows: Vec<FieldRow> = self
            .fields()
            .map(|(key, value)| FieldRow {
                field: key.to_string(),
                value: match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                },
            })
            .collect();

        if rows.is_empty() {
            lines.push("(no fields)".to_string());
        } else {
            lines.push(Table::new(rows).to_string());
        }

        lines.join("\n")
    }
}

impl PrettyPrint for ParseError {
    fn pretty_print(&self) -> String {
        format!("Error {}: {}", self.code(), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_pretty_print_format() {
        let object: ParseObject = ParseObject::from_json(
            "MyClass",
            serde_json::json!({
                "objectId": "abc123",
                "createdAt": "2024-01-15T10:30:00.000Z",
                "playerName": "Sean Plott",
                "score": 1337
            }),
        )
        .unwrap();

        let output = object.pretty_print();
        assert!(output.starts_with("MyClass: abc123"));
        assert!(output.contains("Created:"));
        assert!(output.contains("Sean Plott"));
        assert!(output.contains("1337"));
    }

    #[test]
    fn test_object_without_fields() {
        let output = ParseObject::new("MyClass", "abc123").pretty_print();
        assert!(output.contains("(no fields)"));
    }

    #[test]
    fn test_error_pretty_print_includes_code() {
        let err = ParseError::ObjectNotFound {
            class_name: "MyClass".into(),
            object_id: "missing".into(),
        };
        assert_eq!(err.pretty_print(), "Error 101: MyClass 'missing' not found");
    }
}
