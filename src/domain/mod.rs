//! Domain layer: broadcaster traits, delivered signals, and subscription
//! records.
//!
//! These are the types the hub's store and dispatch engine operate on. The
//! registry itself lives in [`crate::hub`].

pub mod broadcasting;
pub mod observer;
pub mod signal;

pub use broadcasting::{BroadcastExt, BroadcastIdentifier, Broadcasting};
pub use observer::DeliveryPolicy;
pub use signal::{Signal, SignalHandler};
