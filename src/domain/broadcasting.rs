//! Broadcaster capability traits and channel-key derivation.
//!
//! A type becomes broadcaster-capable by implementing [`Broadcasting`]: it
//! declares a finite, string-convertible identifier set and a payload shape.
//! The hub treats both opaquely; the only thing it ever derives from them is
//! the channel key, `"<type identity>.<identifier>"`, which names one
//! broadcast category within the process.

use std::sync::Arc;

use crate::hub::SignalHub;

/// String-convertible event discriminator.
///
/// Implemented by the finite identifier set a broadcaster type declares,
/// typically a fieldless enum with one arm per event kind. Each identifier
/// set belongs to exactly one broadcaster type; that back-link is what lets
/// the hub infer the channel from an identifier value alone.
pub trait BroadcastIdentifier: Send + Sync + 'static {
    /// The broadcaster type this identifier set belongs to.
    type Broadcaster: Broadcasting<Identifier = Self>;

    /// Returns the stable string form of this identifier.
    fn as_str(&self) -> &str;
}

/// Capability trait for event-emitting types.
///
/// Implementors declare which events they can emit ([`Self::Identifier`])
/// and what data rides along ([`Self::Payload`]). Listeners subscribe per
/// `(Self, identifier)` channel; see [`SignalHub::add_listener`].
pub trait Broadcasting: Send + Sync + Sized + 'static {
    /// The finite set of events this type can emit.
    type Identifier: BroadcastIdentifier<Broadcaster = Self>;

    /// Data carried by one emitted signal.
    type Payload: Send + Sync + 'static;

    /// Derives the channel key for one identifier.
    ///
    /// Pure and total. Identical `(type, identifier)` pairs always yield
    /// identical keys within one process execution; distinct pairs never
    /// collide. Keys are not stable across builds, so they must never be
    /// persisted or sent over the wire.
    #[must_use]
    fn channel_key(identifier: &Self::Identifier) -> String {
        format!("{}.{}", std::any::type_name::<Self>(), identifier.as_str())
    }
}

/// Broadcast sugar for `Arc`-held broadcaster instances.
///
/// Both methods delegate to [`SignalHub::broadcast`]; the instance itself
/// becomes the signal's sender and the subject of any broadcaster filter.
pub trait BroadcastExt<T: Broadcasting> {
    /// Broadcasts on the process-wide [`SignalHub::global`] hub.
    fn broadcast(&self, identifier: T::Identifier, payload: T::Payload);

    /// Broadcasts on an explicit hub, for isolated instances and tests.
    fn broadcast_within(&self, identifier: T::Identifier, payload: T::Payload, hub: &SignalHub);
}

impl<T: Broadcasting> BroadcastExt<T> for Arc<T> {
    fn broadcast(&self, identifier: T::Identifier, payload: T::Payload) {
        SignalHub::global().broadcast(self, &identifier, payload);
    }

    fn broadcast_within(&self, identifier: T::Identifier, payload: T::Payload, hub: &SignalHub) {
        hub.broadcast(self, &identifier, payload);
    }
}
