pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod relay;

pub use api::{create_router, AppState};
pub use config::AppConfig;
pub use error::{RelayError, Result};
pub use relay::{RelayService, Sweeper};
