//! Crate error types.
//!
//! Registry operations are total: adding listeners, removing listeners, and
//! broadcasting never fail, and operations referencing an absent channel or
//! listener are no-ops rather than errors. The only fallible seam in the
//! crate is constructing a [`DispatchQueue`](crate::DispatchQueue) without a
//! tokio runtime to host its worker task.

/// Error enum for the few fallible operations in this crate.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// A [`DispatchQueue`](crate::DispatchQueue) was created outside a tokio
    /// runtime context, so no worker task could be spawned.
    #[error("no tokio runtime available to host a dispatch queue worker")]
    NoRuntime,
}
