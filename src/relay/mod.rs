//! Command relay: the state store, signal registry, command log and bot
//! liveness registry, plus the service that composes them.

pub mod action;
pub mod auth;
pub mod command_log;
pub mod engine;
pub mod liveness;
pub mod service;
pub mod signal_registry;
pub mod snapshot;
pub mod state_store;
pub mod sweeper;

pub use action::{Confirmation, ControllerAction, ControllerCommand};
pub use auth::{Credentials, Role};
pub use command_log::CommandLog;
pub use engine::{Deferred, RelayCore};
pub use liveness::LivenessRegistry;
pub use service::RelayService;
pub use signal_registry::SignalRegistry;
pub use snapshot::*;
pub use state_store::{StateStore, StatusUpdate};
pub use sweeper::Sweeper;
