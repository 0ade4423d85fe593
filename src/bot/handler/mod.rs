// Exported functions
pub use self::faucet::action_faucet;
pub use self::general::{action_help, invalid_state};
pub use self::price::action_price;

// Submodules
mod constants;
mod faucet;
mod general;
mod price;
mod utils;
