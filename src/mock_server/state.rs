//! Mock server state management.
//!
//! Provides the in-memory data store for the mock Parse server.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::ParseObject;

/// Shared state for the mock server.
///
/// This struct holds all the mock data that the server will serve.
/// It's wrapped in `Arc<RwLock<_>>` for concurrent access.
#[derive(Debug, Default)]
pub struct MockState {
    /// Objects indexed by class name, then object id.
    pub classes: HashMap<String, HashMap<String, ParseObject>>,

    /// Optional application id. If set, requests must send it in
    /// `X-Parse-Application-Id`.
    pub required_application_id: Option<String>,

    /// Delay applied to every object request.
    pub latency: Option<Duration>,

    /// Number of object requests served so far.
    pub request_count: u64,
}

impl MockState {
    /// Create a new empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    /// Add an object to the state.
    pub fn with_object(mut self, object: ParseObject) -> Self {
        self.insert(object);
        self
    }

    /// Require this application id on every request.
    pub fn with_required_application_id(mut self, application_id: &str) -> Self {
        self.required_application_id = Some(application_id.to_string());
        self
    }

    /// Delay every object response by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Insert or replace an object.
    pub fn insert(&mut self, object: ParseObject) {
        self.classes
            .entry(object.class_name().to_string())
            .or_default()
            .insert(object.object_id().to_string(), object);
    }

    /// Remove an object, returning it if it existed.
    pub fn remove(&mut self, class_name: &str, object_id: &str) -> Option<ParseObject> {
        self.classes
            .get_mut(class_name)
            .and_then(|objects| objects.remove(object_id))
    }

    /// Get an object by class and id.
    pub fn get_object(&self, class_name: &str, object_id: &str) -> Option<&ParseObject> {
        self.classes
            .get(class_name)
            .and_then(|objects| objects.get(object_id))
    }

    /// Render an object the way the REST API returns it.
    ///
    /// Pointer fields named in `include` are replaced by the full target
    /// object when it exists. A dotted path such as `post.author` includes
    /// `post` and then `author` inside it. If `keys` is non-empty only those
    /// fields are kept (bookkeeping fields always are).
    pub fn render(&self, object: &ParseObject, include: &[&str], keys: &[&str]) -> Value {
        let mut fields = Map::new();
        for (key, value) in object.fields() {
            if !keys.is_empty() && !keys.contains(&key) {
                continue;
            }
            let mut included = false;
            let mut nested = Vec::new();
            for path in include {
                if *path == key {
                    included = true;
                } else if let Some(rest) =
                    path.strip_prefix(key).and_then(|p| p.strip_prefix('.'))
                {
                    included = true;
                    nested.push(rest);
                }
            }
            let value = if included {
                self.resolve_pointer(value, &nested).unwrap_or_else(|| value.clone())
            } else {
                value.clone()
            };
            fields.insert(key.to_string(), value);
        }

        fields.insert("objectId".to_string(), Value::from(object.object_id()));
        if let Some(created) = object.created_at() {
            fields.insert("createdAt".to_string(), Value::from(rest_date(created)));
        }
        if let Some(updated) = object.updated_at() {
            fields.insert("updatedAt".to_string(), Value::from(rest_date(updated)));
        }
        Value::Object(fields)
    }

    fn resolve_pointer(&self, value: &Value, include: &[&str]) -> Option<Value> {
        if value.get("__type")?.as_str()? != "Pointer" {
            return None;
        }
        let class_name = value.get("className")?.as_str()?;
        let object_id = value.get("objectId")?.as_str()?;
        let target = self.get_object(class_name, object_id)?;

        let mut rendered = self.render(target, include, &[]);
        if let Value::Object(map) = &mut rendered {
            map.insert("__type".to_string(), Value::from("Object"));
            map.insert("className".to_string(), Value::from(class_name));
        }
        Some(rendered)
    }
}

fn rest_date(date: chrono::DateTime<chrono::Utc>) -> String {
    date.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
