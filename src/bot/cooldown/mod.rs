// Exported functions
pub use self::sweeper::{spawn_sweeper, PRUNE_INTERVAL};

// Exported structs and types
pub use self::ledger::{CooldownLedger, CooldownStore};

// Submodules
mod ledger;
mod sweeper;
