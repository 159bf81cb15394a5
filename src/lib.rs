//! # signal-hub
//!
//! In-process typed publish/subscribe: broadcaster-capable types emit
//! signals on named channels, and listeners subscribe without either side
//! holding a direct reference to the other. The registry tracks listeners
//! weakly — subscribing never keeps a listener alive — and delivers each
//! broadcast synchronously on the emitting thread or serially on a
//! [`DispatchQueue`].
//!
//! ## Architecture
//!
//! ```text
//! Broadcasters (Arc<T: Broadcasting>)
//!     │  broadcast(identifier, payload)
//!     ▼
//! SignalHub (hub/)
//!     ├── channel key derivation (domain/broadcasting)
//!     ├── weak listener table, one mutex (hub/store)
//!     └── dispatch engine: snapshot under lock, deliver outside it
//!           ├── Sync    → handler inline, before broadcast returns
//!           └── Async   → DispatchQueue worker (queue/), submission order
//! ```
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use signal_hub::{BroadcastExt, BroadcastIdentifier, Broadcasting, SignalHub};
//!
//! struct AccountManager;
//!
//! enum AccountEvent {
//!     Login,
//! }
//!
//! impl BroadcastIdentifier for AccountEvent {
//!     type Broadcaster = AccountManager;
//!
//!     fn as_str(&self) -> &str {
//!         match self {
//!             Self::Login => "login",
//!         }
//!     }
//! }
//!
//! struct AccountPayload {
//!     username: String,
//! }
//!
//! impl Broadcasting for AccountManager {
//!     type Identifier = AccountEvent;
//!     type Payload = AccountPayload;
//! }
//!
//! let hub = SignalHub::new();
//! let manager = Arc::new(AccountManager);
//! let controller = Arc::new(()); // any Arc-held value can listen
//!
//! hub.add_listener(&controller, AccountEvent::Login, |signal| {
//!     println!("{} logged in", signal.payload().username);
//! });
//!
//! let payload = AccountPayload {
//!     username: "anderson".to_string(),
//! };
//! manager.broadcast_within(AccountEvent::Login, payload, &hub);
//! ```

pub mod domain;
pub mod error;
pub mod hub;
pub mod queue;

pub use domain::broadcasting::{BroadcastExt, BroadcastIdentifier, Broadcasting};
pub use domain::observer::DeliveryPolicy;
pub use domain::signal::{Signal, SignalHandler};
pub use error::HubError;
pub use hub::SignalHub;
pub use queue::DispatchQueue;
