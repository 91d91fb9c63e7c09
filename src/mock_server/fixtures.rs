//! Test data fixtures for the mock server.
//!
//! Provides factory functions for creating realistic test data.

use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

use crate::ParseObject;

/// Collection of fixture factories for test data.
pub struct Fixtures;

impl Fixtures {
    /// Create an object with no fields.
    pub fn minimal_object(class_name: &str, object_id: &str) -> ParseObject {
        ParseObject::new(class_name, object_id)
    }

    /// Create a game score like the ones in the Parse REST guide.
    pub fn game_score(object_id: &str, player_name: &str, score: i64) -> ParseObject {
        ParseObject::new("GameScore", object_id)
            .with("playerName", player_name)
            .with("score", score)
            .with("cheatMode", false)
            .with_timestamps(
                Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 1, 16, 8, 0, 0).unwrap(),
            )
    }

    /// Create a user.
    pub fn user(object_id: &str, username: &str) -> ParseObject {
        ParseObject::new("_User", object_id).with("username", username)
    }

    /// A pointer value referencing `class_name`/`object_id`.
    pub fn pointer(class_name: &str, object_id: &str) -> Value {
        json!({ "__type": "Pointer", "className": class_name, "objectId": object_id })
    }

    /// Create the default scenario with related objects.
    pub fn default_scenario() -> Vec<ParseObject> {
        let owner = Self::user("u1", "sean");
        let object = ParseObject::new("MyClass", "abc123")
            .with("playerName", "Sean Plott")
            .with("score", 1337)
            .with("owner", Self::pointer("_User", "u1"))
            .with_timestamps(
                Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
            );

        vec![
            owner,
            object,
            Self::game_score("g1", "Sean Plott", 1337),
            Self::game_score("g2", "Jane Doe", 42),
        ]
    }
}
