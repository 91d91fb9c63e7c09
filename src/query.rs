//! Single-object fetches.
//!
//! [`ParseQuery`] fetches one object of a class by its id, either awaited
//! directly with [`ParseQuery::get`] or in the background with a
//! [`GetCallback`] via [`ParseQuery::get_in_background`].

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinError;

use crate::callback::GetCallback;
use crate::client::ParseClient;
use crate::dispatch::{panic_message, CallbackExecutor, FetchHandle, FetchOptions, FetchShared};
use crate::error::{codes, ParseError, Result};
use crate::object::{ParseClass, ParseObject};

/// Converts a fetched [`ParseObject`] into the query's result type.
type Decoder<T> = fn(ParseObject) -> Result<T>;

/// A query that fetches a single object of one class by id.
///
/// # Example
///
/// ```no_run
/// use parsekit::{ParseClient, ParseObject, ParseQuery};
///
/// # async fn example(client: &ParseClient) -> parsekit::Result<()> {
/// let query = ParseQuery::get_query("MyClass").include("owner");
///
/// // Await the result directly
/// let object = query.get(client, "abc123").await?;
/// println!("score = {:?}", object.get_i64("score"));
///
/// // Or have a callback run when the fetch completes
/// query.get_in_background(client, "abc123", |result: parsekit::Result<ParseObject>| {
///     match result {
///         Ok(object) => println!("fetched {}", object.object_id()),
///         Err(e) => eprintln!("fetch failed: {e}"),
///     }
/// });
/// # Ok(())
/// # }
/// ```
pub struct ParseQuery<T = ParseObject> {
    class_name: String,
    include: Vec<String>,
    keys: Vec<String>,
    decode: Decoder<T>,
}

impl<T> Clone for ParseQuery<T> {
    fn clone(&self) -> Self {
        Self {
            class_name: self.class_name.clone(),
            include: self.include.clone(),
            keys: self.keys.clone(),
            decode: self.decode,
        }
    }
}

impl<T> std::fmt::Debug for ParseQuery<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseQuery")
            .field("class_name", &self.class_name)
            .field("include", &self.include)
            .field("keys", &self.keys)
            .finish()
    }
}

impl ParseQuery<ParseObject> {
    /// Create a query for untyped objects of `class_name`.
    pub fn get_query(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            include: Vec::new(),
            keys: Vec::new(),
            decode: Ok,
        }
    }
}

impl<T: ParseClass> ParseQuery<T> {
    /// Create a query that decodes results into `T`.
    pub fn for_class() -> Self {
        Self {
            class_name: T::CLASS_NAME.to_string(),
            include: Vec::new(),
            keys: Vec::new(),
            decode: |object: ParseObject| object.decode::<T>(),
        }
    }
}

/// REST query string for a single-object fetch.
#[derive(Debug, Default, Serialize)]
struct GetParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    include: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    keys: Option<String>,
}

impl<T: Send + 'static> ParseQuery<T> {
    /// The class this query fetches from.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Resolve the pointer field `key` in the fetched object.
    ///
    /// Dotted paths (`"post.author"`) resolve nested pointers.
    #[must_use]
    pub fn include(mut self, key: impl Into<String>) -> Self {
        self.include.push(key.into());
        self
    }

    /// Only return the given fields (plus the bookkeeping fields).
    #[must_use]
    pub fn select_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Fetch the object with id `object_id`.
    ///
    /// # Errors
    ///
    /// - [`ParseError::InvalidClassName`] / [`ParseError::MissingObjectId`]
    ///   if the request is malformed
    /// - [`ParseError::ObjectNotFound`] if no such object exists
    /// - [`ParseError::ConnectionFailed`] / [`ParseError::Timeout`] if the
    ///   server could not be reached
    /// - any other [`ParseError`] the server or decoding produces
    pub async fn get(&self, client: &ParseClient, object_id: &str) -> Result<T> {
        fetch(
            client.clone(),
            self.class_name.clone(),
            object_id.to_string(),
            self.params(),
            self.decode,
        )
        .await
    }

    /// Fetch the object in the background and run `callback` with the result.
    ///
    /// Returns immediately. The fetch runs on a tokio task; the callback
    /// runs exactly once on the client's callback context, never inside
    /// this call. If the fetch is cancelled through the returned handle the
    /// callback is not run (see [`get_in_background_with`](Self::get_in_background_with)).
    /// If the runtime shuts down first the callback gets
    /// [`ParseError::NoRuntime`]; if the fetch panics it gets
    /// [`ParseError::FetchPanicked`]. Failed fetches are not retried.
    pub fn get_in_background<C>(
        &self,
        client: &ParseClient,
        object_id: &str,
        callback: C,
    ) -> FetchHandle
    where
        C: GetCallback<T>,
    {
        self.get_in_background_with(client, object_id, FetchOptions::default(), callback)
    }

    /// [`get_in_background`](Self::get_in_background) with explicit options.
    pub fn get_in_background_with<C>(
        &self,
        client: &ParseClient,
        object_id: &str,
        options: FetchOptions,
        callback: C,
    ) -> FetchHandle
    where
        C: GetCallback<T>,
    {
        let fetch = fetch(
            client.clone(),
            self.class_name.clone(),
            object_id.to_string(),
            self.params(),
            self.decode,
        );
        spawn_fetch(client, fetch, options, callback)
    }

    fn params(&self) -> GetParams {
        let join = |items: &[String]| (!items.is_empty()).then(|| items.join(","));
        GetParams {
            include: join(&self.include),
            keys: join(&self.keys),
        }
    }
}

/// Run `fetch` on a worker task and deliver its outcome on the client's
/// callback context.
///
/// The fetch runs as its own task so a panic in it (or in decoding) is
/// observed through its join handle instead of unwinding past the callback.
fn spawn_fetch<T, F, C>(
    client: &ParseClient,
    fetch: F,
    options: FetchOptions,
    callback: C,
) -> FetchHandle
where
    T: Send + 'static,
    F: Future<Output = Result<T>> + Send + 'static,
    C: GetCallback<T>,
{
    let shared = FetchShared::new();
    let handle = FetchHandle::new(shared.clone());
    let mut delivery = Delivery {
        callback: Some(callback),
        executor: Arc::clone(client.executor()),
        shared: shared.clone(),
        options,
        _result: PhantomData,
    };

    let Some(runtime) = client.runtime() else {
        tracing::warn!("no tokio runtime available, failing fetch");
        delivery.finish(Some(Err(ParseError::NoRuntime)));
        return handle;
    };

    // If the runtime drops this task before it finishes, `delivery` is
    // dropped with it and reports the failure from its Drop impl.
    runtime.spawn(async move {
        let mut worker = tokio::spawn(fetch);
        let outcome = tokio::select! {
            biased;
            _ = shared.cancelled() => {
                worker.abort();
                None
            }
            joined = &mut worker => Some(joined.unwrap_or_else(|e| Err(join_failure(e)))),
        };
        delivery.finish(outcome);
    });

    handle
}

/// Owns a background fetch's callback until its outcome is delivered.
struct Delivery<T, C>
where
    T: Send + 'static,
    C: GetCallback<T>,
{
    callback: Option<C>,
    executor: Arc<dyn CallbackExecutor>,
    shared: Arc<FetchShared>,
    options: FetchOptions,
    _result: PhantomData<fn(T)>,
}

impl<T, C> Delivery<T, C>
where
    T: Send + 'static,
    C: GetCallback<T>,
{
    /// Hand `outcome` to the callback context. `None` means cancelled.
    fn finish(&mut self, outcome: Option<Result<T>>) {
        let Some(callback) = self.callback.take() else {
            return;
        };

        match outcome {
            Some(result) if self.shared.complete() => {
                self.executor.execute(Box::new(move || callback.done(result)));
            }
            _ if self.options.report_cancellation => {
                tracing::debug!("fetch cancelled, reporting to callback");
                self.executor
                    .execute(Box::new(move || callback.done(Err(ParseError::Cancelled))));
            }
            _ => {
                tracing::debug!("fetch cancelled, dropping callback");
            }
        }
    }
}

impl<T, C> Drop for Delivery<T, C>
where
    T: Send + 'static,
    C: GetCallback<T>,
{
    fn drop(&mut self) {
        if self.callback.is_some() {
            tracing::warn!("fetch task dropped by its runtime before completing");
            self.finish(Some(Err(ParseError::NoRuntime)));
        }
    }
}

fn join_failure(err: JoinError) -> ParseError {
    if err.is_panic() {
        let payload = err.into_panic();
        let message = panic_message(payload.as_ref()).to_string();
        tracing::error!(panic = %message, "fetch task panicked");
        ParseError::FetchPanicked(message)
    } else {
        ParseError::NoRuntime
    }
}

#[tracing::instrument(skip(client, params, decode))]
async fn fetch<T>(
    client: ParseClient,
    class_name: String,
    object_id: String,
    params: GetParams,
    decode: Decoder<T>,
) -> Result<T> {
    validate_class_name(&class_name)?;
    if object_id.is_empty() {
        return Err(ParseError::MissingObjectId(class_name));
    }

    let path = format!(
        "classes/{}/{}",
        urlencoding::encode(&class_name),
        urlencoding::encode(&object_id)
    );

    let response = match client.get_with_query(&path, &params).await {
        Ok(response) => response,
        Err(e) if is_not_found(&e) => {
            tracing::debug!("object not found");
            return Err(ParseError::ObjectNotFound {
                class_name,
                object_id,
            });
        }
        Err(e) => {
            tracing::debug!(error = %e, "fetch failed");
            return Err(e);
        }
    };

    let body: serde_json::Value = response.json().await?;
    let object = ParseObject::from_json(&class_name, body)?;
    decode(object)
}

fn is_not_found(err: &ParseError) -> bool {
    match err {
        ParseError::ApiError {
            code, status_code, ..
        } => {
            *code == Some(codes::OBJECT_NOT_FOUND) || (code.is_none() && *status_code == Some(404))
        }
        _ => false,
    }
}

/// Parse class names start with a letter (or `_` for built-in classes such
/// as `_User`) followed by letters, digits or underscores.
fn validate_class_name(class_name: &str) -> Result<()> {
    let mut chars = class_name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ParseError::InvalidClassName(class_name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_class_name() {
        assert!(validate_class_name("MyClass").is_ok());
        assert!(validate_class_name("_User").is_ok());
        assert!(validate_class_name("Game_Score2").is_ok());

        assert!(validate_class_name("").is_err());
        assert!(validate_class_name("1Class").is_err());
        assert!(validate_class_name("My-Class").is_err());
        assert!(validate_class_name("My Class").is_err());
    }

    #[test]
    fn test_params_serialization() {
        let query = ParseQuery::get_query("Post")
            .include("author")
            .include("comments.author")
            .select_keys(["title", "body"]);
        let params = query.params();

        assert_eq!(params.include.as_deref(), Some("author,comments.author"));
        assert_eq!(params.keys.as_deref(), Some("title,body"));
    }

    #[test]
    fn test_empty_params_are_skipped() {
        let params = ParseQuery::get_query("Post").params();
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn test_is_not_found() {
        assert!(is_not_found(&ParseError::ApiError {
            code: Some(101),
            message: "Object not found.".into(),
            status_code: Some(404),
        }));
        assert!(is_not_found(&ParseError::ApiError {
            code: None,
            message: "HTTP 404".into(),
            status_code: Some(404),
        }));
        assert!(!is_not_found(&ParseError::ApiError {
            code: Some(119),
            message: "denied".into(),
            status_code: Some(404),
        }));
    }

    #[test]
    fn test_debug_lists_class() {
        let query = ParseQuery::get_query("MyClass");
        assert!(format!("{query:?}").contains("MyClass"));
        assert_eq!(query.clone().class_name(), "MyClass");
    }
}
