//! The value delivered to handlers: sending instance plus payload.

use std::fmt;
use std::sync::Arc;

use crate::domain::broadcasting::Broadcasting;

/// Handler invoked once per matching subscription on each broadcast.
///
/// Runs inline on the broadcasting thread under
/// [`DeliveryPolicy::Sync`](crate::DeliveryPolicy::Sync), or on a queue
/// worker under [`DeliveryPolicy::Async`](crate::DeliveryPolicy::Async).
/// Faults are never caught by the hub; a panicking handler propagates
/// exactly as a direct call would.
pub type SignalHandler<T> = Box<dyn Fn(&Signal<T>) + Send + Sync>;

/// One delivered broadcast: the emitting instance and its payload.
///
/// Cloning is two `Arc` bumps and never requires `T::Payload: Clone`;
/// asynchronous fan-out clones one `Signal` per scheduled delivery.
pub struct Signal<T: Broadcasting> {
    sender: Arc<T>,
    payload: Arc<T::Payload>,
}

impl<T: Broadcasting> Signal<T> {
    pub(crate) fn new(sender: Arc<T>, payload: Arc<T::Payload>) -> Self {
        Self { sender, payload }
    }

    /// Returns the instance that emitted this signal.
    #[must_use]
    pub fn sender(&self) -> &Arc<T> {
        &self.sender
    }

    /// Returns the data carried by this signal.
    #[must_use]
    pub fn payload(&self) -> &T::Payload {
        &self.payload
    }
}

impl<T: Broadcasting> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            sender: Arc::clone(&self.sender),
            payload: Arc::clone(&self.payload),
        }
    }
}

impl<T: Broadcasting> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("sender_type", &std::any::type_name::<T>())
            .finish_non_exhaustive()
    }
}
