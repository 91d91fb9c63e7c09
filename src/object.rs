//! Parse object model.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// A Parse object as returned by the REST API.
///
/// Parse objects are schemaless: apart from the bookkeeping fields
/// (`objectId`, `createdAt`, `updatedAt`) every key is kept as raw JSON.
/// The class name is not part of the REST payload; it is filled in by the
/// query that fetched the object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseObject {
    /// The class this object belongs to (e.g., "MyClass").
    #[serde(rename = "className", default)]
    pub(crate) class_name: String,

    /// The server-assigned object id.
    #[serde(rename = "objectId")]
    pub(crate) object_id: String,

    /// When the object was created.
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub(crate) created_at: Option<DateTime<Utc>>,

    /// When the object was last updated.
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub(crate) updated_at: Option<DateTime<Utc>>,

    /// All remaining fields.
    #[serde(flatten)]
    pub(crate) fields: Map<String, Value>,
}

impl ParseObject {
    /// Create an object with the given class and id and no fields.
    pub fn new(class_name: impl Into<String>, object_id: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            object_id: object_id.into(),
            created_at: None,
            updated_at: None,
            fields: Map::new(),
        }
    }

    /// Build an object from a REST response body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not a JSON object with an `objectId`.
    pub fn from_json(class_name: &str, body: Value) -> Result<Self> {
        let mut object: ParseObject = serde_json::from_value(body)?;
        object.class_name = class_name.to_string();
        Ok(object)
    }

    /// Set a field, returning the object (builder style).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Set the creation and update timestamps.
    #[must_use]
    pub fn with_timestamps(mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self.updated_at = Some(updated_at);
        self
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn object_id(&self) -> &str {
        &self.object_id
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Get a raw field value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Get a string field.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Get an integer field.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    /// Get a boolean field.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// Returns true if the object has a field with this key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Iterate over the field names, excluding bookkeeping fields.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterate over all fields, excluding bookkeeping fields.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Decode this object into a typed model.
    ///
    /// The typed model sees the same JSON the REST API returned, including
    /// `objectId`, `createdAt` and `updatedAt`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::JsonError`](crate::ParseError::JsonError) if the
    /// fields do not match `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        let value = serde_json::to_value(self)?;
        Ok(serde_json::from_value(value)?)
    }
}

/// A typed Parse class.
///
/// Implement this for your own model types to fetch them with
/// [`ParseQuery::for_class`](crate::ParseQuery::for_class).
///
/// # Example
///
/// ```
/// use parsekit::ParseClass;
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize)]
/// struct GameScore {
///     #[serde(rename = "objectId")]
///     id: String,
///     score: i64,
/// }
///
/// impl ParseClass for GameScore {
///     const CLASS_NAME: &'static str = "GameScore";
/// }
/// ```
pub trait ParseClass: DeserializeOwned + Send + 'static {
    /// The Parse class name this type maps to.
    const CLASS_NAME: &'static str;
}
