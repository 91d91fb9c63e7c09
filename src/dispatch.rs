//! Callback contexts and background fetch handles.
//!
//! Fetches run on tokio worker tasks. Their outcome is handed to a
//! [`CallbackExecutor`], which decides where the [`GetCallback`](crate::GetCallback)
//! actually runs. GUI hosts implement the trait on top of their main loop;
//! headless hosts use [`DispatchQueue`], a dedicated thread that runs jobs
//! one at a time in submission order.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use tokio::sync::{mpsc, Notify};

use crate::error::Result;

/// A unit of work submitted to a callback context.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Where completed fetches deliver their callbacks.
///
/// `execute` must not run the job inline on the calling thread: it is
/// called from fetch worker tasks, and callbacks are expected on the
/// designated context only.
pub trait CallbackExecutor: Send + Sync + 'static {
    /// Schedule `job` to run on this context.
    fn execute(&self, job: Job);
}

/// A serial callback queue backed by a dedicated thread.
///
/// This is the default callback context for a [`ParseClient`](crate::ParseClient).
/// Jobs run in FIFO order. A panicking job is logged and the queue moves on
/// to the next one. The thread exits once every clone of the queue has been
/// dropped and the backlog is drained.
#[derive(Clone)]
pub struct DispatchQueue {
    inner: Arc<QueueInner>,
}

struct QueueInner {
    tx: mpsc::UnboundedSender<Job>,
    name: String,
    thread_id: ThreadId,
}

impl std::fmt::Debug for DispatchQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchQueue")
            .field("name", &self.inner.name)
            .field("thread_id", &self.inner.thread_id)
            .finish()
    }
}

impl DispatchQueue {
    /// Start a new queue on a thread with the given name.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Io`](crate::ParseError::Io) if the thread cannot
    /// be spawned.
    pub fn new(name: &str) -> Result<Self> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
        let thread_name = name.to_string();

        let handle = thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                while let Some(job) = rx.blocking_recv() {
                    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
                        tracing::error!(
                            queue = %thread_name,
                            panic = panic_message(payload.as_ref()),
                            "callback panicked"
                        );
                    }
                }
                tracing::debug!(queue = %thread_name, "dispatch queue stopped");
            })?;

        Ok(Self {
            inner: Arc::new(QueueInner {
                tx,
                name: name.to_string(),
                thread_id: handle.thread().id(),
            }),
        })
    }

    /// The queue's thread name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns true if called from this queue's thread.
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.inner.thread_id
    }
}

impl CallbackExecutor for DispatchQueue {
    fn execute(&self, job: Job) {
        if self.inner.tx.send(job).is_err() {
            tracing::warn!(queue = %self.inner.name, "dispatch queue is gone, dropping callback");
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic>"
    }
}

/// Options for a single background fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Deliver [`ParseError::Cancelled`](crate::ParseError::Cancelled) to the
    /// callback when the fetch is cancelled. When false (the default) a
    /// cancelled fetch never runs its callback.
    pub report_cancellation: bool,
}

impl FetchOptions {
    #[must_use]
    pub fn report_cancellation(mut self, report: bool) -> Self {
        self.report_cancellation = report;
        self
    }
}

/// Lifecycle of a background fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    /// Still running.
    Pending,
    /// The outcome was determined and handed to the callback context.
    Completed,
    /// Cancelled before an outcome was determined.
    Cancelled,
}

const PENDING: u8 = 0;
const COMPLETED: u8 = 1;
const CANCELLED: u8 = 2;

#[derive(Debug)]
pub(crate) struct FetchShared {
    state: AtomicU8,
    cancel: Notify,
}

impl FetchShared {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            state: AtomicU8::new(PENDING),
            cancel: Notify::new(),
        })
    }

    /// Resolves once `cancel` wins the race.
    pub(crate) async fn cancelled(&self) {
        self.cancel.notified().await
    }

    /// Move `Pending -> Completed`. Returns false if the fetch was cancelled first.
    pub(crate) fn complete(&self) -> bool {
        self.transition(COMPLETED)
    }

    fn transition(&self, to: u8) -> bool {
        self.state
            .compare_exchange(PENDING, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn state(&self) -> FetchState {
        match self.state.load(Ordering::Acquire) {
            PENDING => FetchState::Pending,
            COMPLETED => FetchState::Completed,
            _ => FetchState::Cancelled,
        }
    }
}

/// Handle to a fetch started with
/// [`ParseQuery::get_in_background`](crate::ParseQuery::get_in_background).
///
/// Dropping the handle does not cancel the fetch.
#[derive(Debug, Clone)]
pub struct FetchHandle {
    shared: Arc<FetchShared>,
}

impl FetchHandle {
    pub(crate) fn new(shared: Arc<FetchShared>) -> Self {
        Self { shared }
    }

    /// Cancel the fetch.
    ///
    /// Returns true if the fetch was still pending and is now cancelled.
    /// Returns false if it had already completed (its callback is delivered
    /// normally) or was already cancelled.
    pub fn cancel(&self) -> bool {
        if self.shared.transition(CANCELLED) {
            // notify_one stores a permit if the worker is not waiting yet
            self.shared.cancel.notify_one();
            true
        } else {
            false
        }
    }

    pub fn state(&self) -> FetchState {
        self.shared.state()
    }

    /// Returns true once the fetch has completed or been cancelled.
    pub fn is_finished(&self) -> bool {
        self.state() != FetchState::Pending
    }
}
