//! Result notification for background fetches.
//!
//! A [`GetCallback`] is handed to
//! [`ParseQuery::get_in_background`](crate::ParseQuery::get_in_background)
//! and is run once the fetch concludes. The fetch itself happens on a worker
//! task while the callback runs on the client's callback context (see
//! [`dispatch`](crate::dispatch)), so slow I/O never blocks the caller.
//!
//! The easiest way to provide one is a closure:
//!
//! ```no_run
//! use parsekit::{ParseClient, ParseObject, ParseQuery};
//!
//! # fn example(client: &ParseClient) {
//! let query = ParseQuery::get_query("MyClass");
//! query.get_in_background(client, "abc123", |result: parsekit::Result<ParseObject>| match result {
//!     Ok(object) => println!("fetched {:?}", object),
//!     Err(e) => eprintln!("fetch failed: {e}"),
//! });
//! # }
//! ```

use crate::error::{ParseError, Result};

/// Code to run after a single object fetch completes.
///
/// `done` receives either the fetched object or the error that stopped the
/// fetch. It takes `self` by value, so it runs at most once.
///
/// Any `FnOnce(Result<T>) + Send + 'static` closure is a `GetCallback<T>`.
/// Implement the trait directly when the handler carries state.
pub trait GetCallback<T>: Send + 'static {
    /// Called with the outcome of the fetch.
    fn done(self, result: Result<T>);
}

impl<T, F> GetCallback<T> for F
where
    F: FnOnce(Result<T>) + Send + 'static,
{
    fn done(self, result: Result<T>) {
        self(result)
    }
}

/// Adapt a two-slot `(object, error)` handler into a [`GetCallback`].
///
/// Exactly one of the two arguments is `Some` on every call.
///
/// ```
/// use parsekit::callback::two_slot;
/// use parsekit::{GetCallback, ParseError, ParseObject};
///
/// let callback = two_slot(|object: Option<ParseObject>, e: Option<ParseError>| {
///     match (object, e) {
///         (Some(object), None) => println!("got {}", object.object_id()),
///         (None, Some(e)) => eprintln!("failed: {e}"),
///         _ => unreachable!(),
///     }
/// });
/// callback.done(Ok(ParseObject::new("MyClass", "abc123")));
/// ```
pub fn two_slot<T, F>(f: F) -> impl GetCallback<T>
where
    T: 'static,
    F: FnOnce(Option<T>, Option<ParseError>) + Send + 'static,
{
    move |result: Result<T>| match result {
        Ok(object) => f(Some(object), None),
        Err(e) => f(None, Some(e)),
    }
}

/// Collapse a two-slot completion into a `Result`.
///
/// Completions coming from outside this crate (FFI bridges, legacy
/// handlers) may not respect the one-of-two rule. Both slots filled or both
/// empty is reported as [`ParseError::InvalidCompletion`].
pub fn completion<T>(object: Option<T>, error: Option<ParseError>) -> Result<T> {
    match (object, error) {
        (Some(object), None) => Ok(object),
        (None, Some(e)) => Err(e),
        (Some(_), Some(_)) => Err(ParseError::InvalidCompletion(
            "both result and error present",
        )),
        (None, None) => Err(ParseError::InvalidCompletion(
            "neither result nor error present",
        )),
    }
}
