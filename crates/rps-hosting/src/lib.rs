//! WebSocket game hosting.
//!
//! Routes transport events into gameplay and pushes the resulting state
//! back out. Handlers hold no game state of their own: every event is
//! served from the [`Store`](rps_store::Store), so any worker can take any
//! connection's next message.
//!
//! ## Core Types
//!
//! - [`Event`] — Connect, disconnect, or action from a client
//! - [`Dispatcher`] — Applies events against the store, with retries
//! - [`Notifier`] — Best-effort outbound push to one connection
//! - [`Registry`] — Live WebSocket connections, the production [`Notifier`]
//! - [`ServerMessage`] — Wire format of everything sent to clients
//!
//! ## HTTP
//!
//! - [`run`] — actix-web server; see [`handlers`] for routes
mod dispatcher;
mod error;
mod event;
mod message;
mod notifier;
mod registry;
mod server;
mod socket;
pub mod handlers;

pub use dispatcher::*;
pub use error::*;
pub use event::*;
pub use message::*;
pub use notifier::*;
pub use registry::*;
pub use server::*;

use socket::Socket;
