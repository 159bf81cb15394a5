//! Weak-keyed broadcast table storage.
//!
//! The table maps channel key → (listener → ordered observer list).
//! Listener identity is the address of the listener's `Arc` allocation,
//! held only as a `Weak`, so the table never keeps a listener alive. Slots
//! whose listener has expired are pruned lazily whenever their channel
//! table is touched; there is no background sweep.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// Type-erased strong handle to one `SignalObserver<T>`.
///
/// The dispatch engine downcasts it back to the concrete observer type;
/// the channel key embeds the broadcaster type's identity, so every entry
/// in one channel erases the same `T`.
pub(crate) type ErasedObserver = Arc<dyn Any + Send + Sync>;

/// Identity of a listener: the address of its `Arc` allocation.
///
/// A slot's `Weak` keeps the allocation (not the value) alive, so a key can
/// never alias a different live listener while its slot still exists.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct ListenerKey(usize);

impl ListenerKey {
    pub(crate) fn of<L: ?Sized>(listener: &Arc<L>) -> Self {
        Self(Arc::as_ptr(listener).cast::<()>() as usize)
    }
}

/// One observer plus its hub-wide registration sequence number.
///
/// The sequence number lets dispatch deliver in registration order even
/// across listener slots, whose map iteration order is arbitrary.
pub(crate) struct RegisteredObserver {
    pub(crate) seq: u64,
    pub(crate) observer: ErasedObserver,
}

/// A listener's observers on one channel, in registration order.
pub(crate) struct ListenerSlot {
    listener: Weak<dyn Any + Send + Sync>,
    observers: Vec<RegisteredObserver>,
}

impl ListenerSlot {
    fn new(listener: Weak<dyn Any + Send + Sync>) -> Self {
        Self {
            listener,
            observers: Vec::new(),
        }
    }

    /// `false` once the listener has been dropped everywhere else.
    pub(crate) fn is_live(&self) -> bool {
        self.listener.strong_count() > 0
    }

    pub(crate) fn observers(&self) -> &[RegisteredObserver] {
        &self.observers
    }
}

/// Per-channel listener table.
#[derive(Default)]
pub(crate) struct ChannelTable {
    slots: HashMap<ListenerKey, ListenerSlot>,
}

impl ChannelTable {
    /// Drops slots whose listener has expired. Called on every touch of
    /// this table; purely storage reclamation (see [`ListenerKey`]).
    pub(crate) fn prune_expired(&mut self) {
        self.slots.retain(|_, slot| slot.is_live());
    }

    /// Appends one observer to the listener's slot, creating the slot on
    /// first registration.
    pub(crate) fn append(
        &mut self,
        key: ListenerKey,
        listener: Weak<dyn Any + Send + Sync>,
        seq: u64,
        observer: ErasedObserver,
    ) {
        self.slots
            .entry(key)
            .or_insert_with(|| ListenerSlot::new(listener))
            .observers
            .push(RegisteredObserver { seq, observer });
    }

    pub(crate) fn remove_slot(&mut self, key: ListenerKey) {
        self.slots.remove(&key);
    }

    /// Keeps only the listener's observers for which `keep` returns true;
    /// drops the slot entirely when none remain.
    pub(crate) fn retain_observers(
        &mut self,
        key: ListenerKey,
        keep: impl FnMut(&RegisteredObserver) -> bool,
    ) {
        if let Some(slot) = self.slots.get_mut(&key) {
            slot.observers.retain(keep);
            if slot.observers.is_empty() {
                self.slots.remove(&key);
            }
        }
    }

    pub(crate) fn slots(&self) -> impl Iterator<Item = &ListenerSlot> {
        self.slots.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Whole-store state behind the hub mutex: channel key → channel table,
/// plus the registration sequence counter.
#[derive(Default)]
pub(crate) struct BroadcastTable {
    channels: HashMap<String, ChannelTable>,
    next_seq: u64,
}

impl BroadcastTable {
    /// Hands out the next registration sequence number.
    pub(crate) fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Returns the channel table for `key`, creating it on demand.
    pub(crate) fn channel_mut(&mut self, key: String) -> &mut ChannelTable {
        self.channels.entry(key).or_default()
    }

    pub(crate) fn get_channel_mut(&mut self, key: &str) -> Option<&mut ChannelTable> {
        self.channels.get_mut(key)
    }

    pub(crate) fn channels_mut(&mut self) -> impl Iterator<Item = &mut ChannelTable> {
        self.channels.values_mut()
    }

    /// Drops channel tables that no longer hold any slot.
    pub(crate) fn drop_empty_channels(&mut self) {
        self.channels.retain(|_, table| !table.is_empty());
    }

    pub(crate) fn channel_count(&self) -> usize {
        self.channels.len()
    }
}
