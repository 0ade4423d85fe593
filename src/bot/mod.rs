// bot/mod.rs

// Exported functions
pub use self::cooldown::{spawn_sweeper, PRUNE_INTERVAL};
pub use self::dispatcher::{handle_message, run_dispatcher};

// Exported structs and types
pub use self::config::{Config, ConfigError};
pub use self::dispatcher::{BotError, BotState, HandlerResult};

// Declare submodules
pub mod api;
mod config;
pub mod cooldown;
mod dispatcher;
mod handler;
pub mod processor;
mod router;
