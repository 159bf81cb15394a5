//! Serial execution queues for asynchronous delivery.
//!
//! A [`DispatchQueue`] is a cloneable handle to one worker task draining an
//! unbounded [`tokio::sync::mpsc`] channel. Jobs submitted to the same queue
//! run one at a time, in submission order; nothing is ordered across
//! distinct queues. The registry uses queues as the executors behind
//! [`DeliveryPolicy::Async`](crate::DeliveryPolicy::Async).
//!
//! Submission never blocks and is safe from any thread, including threads
//! outside the runtime. Once submitted, a job runs unless the runtime (and
//! with it the worker) is torn down; there is no cancellation.

use std::fmt;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::error::HubError;

/// A unit of work scheduled onto a queue worker.
pub(crate) type Job = Box<dyn FnOnce() + Send>;

/// Labeled serial executor backed by one tokio worker task.
///
/// Cloning yields another handle to the same queue; all clones feed the same
/// worker and share its ordering. The worker exits when every handle (the
/// user's and any held inside registered observers) has been dropped.
///
/// A job that panics kills the worker per tokio's task panic policy; later
/// submissions to that queue are dropped with a warning. The registry never
/// catches handler faults.
#[derive(Clone)]
pub struct DispatchQueue {
    label: Arc<str>,
    jobs: mpsc::UnboundedSender<Job>,
}

impl DispatchQueue {
    /// Creates a queue whose worker runs on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::NoRuntime`] when called outside a runtime
    /// context.
    pub fn new(label: impl Into<Arc<str>>) -> Result<Self, HubError> {
        let handle = Handle::try_current().map_err(|_| HubError::NoRuntime)?;
        Ok(Self::with_handle(label, &handle))
    }

    /// Creates a queue whose worker runs on an explicit runtime handle.
    #[must_use]
    pub fn with_handle(label: impl Into<Arc<str>>, handle: &Handle) -> Self {
        let label = label.into();
        let (jobs, mut rx) = mpsc::unbounded_channel::<Job>();
        let worker_label = Arc::clone(&label);
        handle.spawn(async move {
            while let Some(job) = rx.recv().await {
                job();
            }
            tracing::debug!(queue = %worker_label, "dispatch queue worker stopped");
        });
        Self { label, jobs }
    }

    /// Returns this queue's label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Submits one job for serial execution.
    ///
    /// If the worker is gone the job is dropped with a warning; delivery is
    /// best-effort once the executor itself has died.
    pub(crate) fn submit(&self, job: Job) {
        if self.jobs.send(job).is_err() {
            tracing::warn!(queue = %self.label, "dispatch queue worker gone, dropping delivery");
        }
    }
}

impl fmt::Debug for DispatchQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchQueue")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}
