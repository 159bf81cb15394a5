//! Subscription records: delivery policy plus optional broadcaster filter.

use std::sync::{Arc, Weak};

use crate::domain::broadcasting::Broadcasting;
use crate::domain::signal::SignalHandler;
use crate::queue::DispatchQueue;

/// How a matching handler executes during dispatch.
#[derive(Clone, Debug, Default)]
pub enum DeliveryPolicy {
    /// The handler runs inline on the broadcasting thread, before the
    /// broadcast call returns.
    #[default]
    Sync,

    /// The handler is submitted to the given queue and may run after the
    /// broadcast call returns. Deliveries submitted to the same queue run
    /// in submission order; nothing is ordered across distinct queues.
    Async(DispatchQueue),
}

/// One subscription held by a listener on one channel: the delivery policy,
/// an optional weakly-held broadcaster filter, and the handler.
pub(crate) struct SignalObserver<T: Broadcasting> {
    pub(crate) policy: DeliveryPolicy,
    /// When set, the observer fires only for this exact instance. An
    /// expired filter never matches.
    broadcaster: Option<Weak<T>>,
    pub(crate) handler: SignalHandler<T>,
}

impl<T: Broadcasting> SignalObserver<T> {
    pub(crate) fn new(
        policy: DeliveryPolicy,
        broadcaster: Option<&Arc<T>>,
        handler: SignalHandler<T>,
    ) -> Self {
        Self {
            policy,
            broadcaster: broadcaster.map(Arc::downgrade),
            handler,
        }
    }

    /// `true` when the filter is absent or reference-identical to `sender`.
    pub(crate) fn matches_sender(&self, sender: &Arc<T>) -> bool {
        match &self.broadcaster {
            None => true,
            Some(weak) => weak.upgrade().is_some_and(|b| Arc::ptr_eq(&b, sender)),
        }
    }

    /// `true` when the captured filter targets exactly `broadcaster`.
    ///
    /// Used by filtered removal. An absent filter never matches here, so
    /// unfiltered entries survive per-broadcaster removal.
    pub(crate) fn filters_on(&self, broadcaster: &Arc<T>) -> bool {
        self.broadcaster
            .as_ref()
            .is_some_and(|weak| std::ptr::eq(weak.as_ptr(), Arc::as_ptr(broadcaster)))
    }
}
