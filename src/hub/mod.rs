//! The broadcast registry: weak listener table plus dispatch engine.
//!
//! [`SignalHub`] maps channel keys to per-channel listener tables and
//! delivers broadcasts to matching subscriptions. One coarse mutex covers
//! the whole store; every operation holds it only for bounded map work.
//!
//! # Locking discipline
//!
//! The lock is never held while user code runs. Dispatch snapshots the
//! matching observers under the lock, releases it, and only then invokes
//! handlers (or submits queue jobs). A handler may therefore reenter the
//! hub — add, remove, broadcast again — without deadlocking; an in-flight
//! dispatch keeps delivering to the snapshot it already took.
//!
//! # Listener ownership
//!
//! The hub holds listeners weakly. Dropping the last external reference to
//! a listener makes its entries unreachable for delivery immediately; the
//! storage itself is reclaimed lazily the next time the affected channel is
//! touched.

mod store;

use std::any::Any;
use std::sync::{Arc, OnceLock, Weak};

use parking_lot::Mutex;

use crate::domain::broadcasting::{BroadcastIdentifier, Broadcasting};
use crate::domain::observer::{DeliveryPolicy, SignalObserver};
use crate::domain::signal::Signal;

use store::{BroadcastTable, ErasedObserver, ListenerKey, RegisteredObserver};

/// In-process broadcast registry.
///
/// Independent hubs are fully isolated; construct one per test with
/// [`SignalHub::new`] or share the process-wide instance via
/// [`SignalHub::global`]. All methods take `&self` and are safe to call
/// from any thread, in any interleaving.
#[derive(Default)]
pub struct SignalHub {
    table: Mutex<BroadcastTable>,
}

impl SignalHub {
    /// Creates an isolated hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide hub, created lazily on first use.
    #[must_use]
    pub fn global() -> &'static SignalHub {
        static GLOBAL: OnceLock<SignalHub> = OnceLock::new();
        GLOBAL.get_or_init(SignalHub::new)
    }

    /// Subscribes `listener` to the channel named by `identifier` with
    /// synchronous delivery and no broadcaster filter.
    ///
    /// Shorthand for [`SignalHub::add_listener_with`]; see there for the
    /// full contract.
    pub fn add_listener<I, L, F>(&self, listener: &Arc<L>, identifier: I, handler: F)
    where
        I: BroadcastIdentifier,
        L: Send + Sync + 'static,
        F: Fn(&Signal<I::Broadcaster>) + Send + Sync + 'static,
    {
        self.add_listener_with(listener, identifier, None, DeliveryPolicy::Sync, handler);
    }

    /// Subscribes `listener` with an explicit broadcaster filter and
    /// delivery policy. Never fails.
    ///
    /// When `broadcaster` is set, the handler fires only for broadcasts
    /// emitted by that exact instance; the filter is held weakly and an
    /// expired filter never fires. Registering the same listener on the
    /// same channel again appends a further entry — every entry fires
    /// independently, in registration order.
    ///
    /// The hub tracks `listener` weakly: subscribing never extends its
    /// lifetime, and entries of a dropped listener stop firing without any
    /// explicit removal call.
    pub fn add_listener_with<I, L, F>(
        &self,
        listener: &Arc<L>,
        identifier: I,
        broadcaster: Option<&Arc<I::Broadcaster>>,
        policy: DeliveryPolicy,
        handler: F,
    ) where
        I: BroadcastIdentifier,
        L: Send + Sync + 'static,
        F: Fn(&Signal<I::Broadcaster>) + Send + Sync + 'static,
    {
        let key = I::Broadcaster::channel_key(&identifier);
        let listener_key = ListenerKey::of(listener);
        let weak = erase_listener(listener);
        let observer: ErasedObserver = Arc::new(SignalObserver::<I::Broadcaster>::new(
            policy,
            broadcaster,
            Box::new(handler),
        ));

        let mut table = self.table.lock();
        let seq = table.next_seq();
        let channel = table.channel_mut(key.clone());
        channel.prune_expired();
        channel.append(listener_key, weak, seq, observer);
        drop(table);

        tracing::debug!(channel = %key, listener = ?listener_key, "listener added");
    }

    /// Unsubscribes `listener` from every channel.
    ///
    /// Atomic with respect to other hub operations. Idempotent: removing a
    /// listener with no entries anywhere is a no-op.
    pub fn remove_listener<L>(&self, listener: &Arc<L>)
    where
        L: Send + Sync + 'static,
    {
        let listener_key = ListenerKey::of(listener);

        let mut table = self.table.lock();
        for channel in table.channels_mut() {
            channel.prune_expired();
            channel.remove_slot(listener_key);
        }
        table.drop_empty_channels();
        drop(table);

        tracing::debug!(listener = ?listener_key, "listener removed from all channels");
    }

    /// Unsubscribes `listener` from the channel named by `identifier` only.
    ///
    /// Entries on other channels survive. Idempotent no-op when the channel
    /// or the listener's slot is absent.
    pub fn remove_listener_for<I, L>(&self, listener: &Arc<L>, identifier: I)
    where
        I: BroadcastIdentifier,
        L: Send + Sync + 'static,
    {
        let key = I::Broadcaster::channel_key(&identifier);
        let listener_key = ListenerKey::of(listener);

        let mut table = self.table.lock();
        if let Some(channel) = table.get_channel_mut(&key) {
            channel.prune_expired();
            channel.remove_slot(listener_key);
        }
        table.drop_empty_channels();
        drop(table);

        tracing::debug!(channel = %key, listener = ?listener_key, "listener removed from channel");
    }

    /// Removes only the `listener` entries whose captured filter is
    /// reference-identical to `broadcaster`.
    ///
    /// With `identifier` set, one channel is affected; with `None`, all
    /// channels are scanned. Unfiltered entries and entries filtered to
    /// other instances survive. Idempotent no-op on absent keys.
    pub fn remove_listener_from<T, L>(
        &self,
        listener: &Arc<L>,
        identifier: Option<T::Identifier>,
        broadcaster: &Arc<T>,
    ) where
        T: Broadcasting,
        L: Send + Sync + 'static,
    {
        let listener_key = ListenerKey::of(listener);
        let keep = |registered: &RegisteredObserver| {
            registered
                .observer
                .downcast_ref::<SignalObserver<T>>()
                .is_none_or(|observer| !observer.filters_on(broadcaster))
        };

        let mut table = self.table.lock();
        match identifier {
            Some(identifier) => {
                let key = T::channel_key(&identifier);
                if let Some(channel) = table.get_channel_mut(&key) {
                    channel.prune_expired();
                    channel.retain_observers(listener_key, keep);
                }
            }
            None => {
                for channel in table.channels_mut() {
                    channel.prune_expired();
                    channel.retain_observers(listener_key, keep);
                }
            }
        }
        table.drop_empty_channels();
    }

    /// Broadcasts `payload` from `broadcaster` on the channel named by
    /// `identifier`.
    ///
    /// Matching entries are snapshotted under the lock in registration
    /// order, then delivered with the lock released: synchronous entries
    /// run inline before this call returns, asynchronous entries are
    /// submitted to their queue and may run afterwards. Mutations made by
    /// handlers (or concurrently) do not affect the snapshot already taken.
    ///
    /// No channel, no listeners, or no matching entries is a no-op. Handler
    /// panics are not caught: a synchronous panic unwinds out of this call
    /// and skips the rest of the snapshot.
    pub fn broadcast<T: Broadcasting>(
        &self,
        broadcaster: &Arc<T>,
        identifier: &T::Identifier,
        payload: T::Payload,
    ) {
        let key = T::channel_key(identifier);

        let mut table = self.table.lock();
        let Some(channel) = table.get_channel_mut(&key) else {
            return;
        };
        channel.prune_expired();
        let mut snapshot: Vec<(u64, Arc<SignalObserver<T>>)> = Vec::new();
        for slot in channel.slots() {
            for registered in slot.observers() {
                let Ok(observer) =
                    Arc::clone(&registered.observer).downcast::<SignalObserver<T>>()
                else {
                    continue;
                };
                if observer.matches_sender(broadcaster) {
                    snapshot.push((registered.seq, observer));
                }
            }
        }
        drop(table);

        // Registration order across all listener slots.
        snapshot.sort_by_key(|(seq, _)| *seq);

        tracing::trace!(channel = %key, matched = snapshot.len(), "dispatching broadcast");
        let signal = Signal::new(Arc::clone(broadcaster), Arc::new(payload));

        for (_, observer) in snapshot {
            match &observer.policy {
                DeliveryPolicy::Sync => (observer.handler)(&signal),
                DeliveryPolicy::Async(queue) => {
                    let job_observer = Arc::clone(&observer);
                    let job_signal = signal.clone();
                    queue.submit(Box::new(move || (job_observer.handler)(&job_signal)));
                }
            }
        }
    }

    /// Returns the number of channels currently holding at least one live
    /// subscription.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        let mut table = self.table.lock();
        for channel in table.channels_mut() {
            channel.prune_expired();
        }
        table.drop_empty_channels();
        table.channel_count()
    }

    /// Returns the number of live listeners subscribed on the channel named
    /// by `identifier`.
    #[must_use]
    pub fn listener_count<I: BroadcastIdentifier>(&self, identifier: &I) -> usize {
        let key = I::Broadcaster::channel_key(identifier);
        let mut table = self.table.lock();
        match table.get_channel_mut(&key) {
            Some(channel) => {
                channel.prune_expired();
                channel.len()
            }
            None => 0,
        }
    }

    /// `true` when no live subscription exists anywhere on this hub.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channel_count() == 0
    }
}

impl std::fmt::Debug for SignalHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalHub")
            .field("channels", &self.table.lock().channel_count())
            .finish_non_exhaustive()
    }
}

/// Downgrades a listener reference into the type-erased weak handle the
/// store keeps. The temporary strong handle dies here; the weak stays
/// valid for as long as the caller's own references do.
fn erase_listener<L: Send + Sync + 'static>(listener: &Arc<L>) -> Weak<dyn Any + Send + Sync> {
    let erased: Arc<dyn Any + Send + Sync> = Arc::<L>::clone(listener);
    Arc::downgrade(&erased)
}
