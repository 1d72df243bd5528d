pub mod account;
pub mod bot;
pub mod command;
pub mod signal;
pub mod state;

pub use account::*;
pub use bot::*;
pub use command::*;
pub use signal::*;
pub use state::*;
