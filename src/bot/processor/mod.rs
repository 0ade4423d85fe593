/* Processor is the overall logic center of the bot.
 * It handles the main logic, communicating with the front-facing handler
 * and the back-facing wallet gateway, price sources and cooldown ledger.
 * It defines and executes the main functions required of the bot,
 * and turns every failure in the back into an outcome the handler can report.
 */

// Exported functions
pub use self::disburse::parse_request;

// Exported structs and types
pub use self::disburse::{
    DisbursementRequest, DisbursementResult, Faucet, FaucetSettings, Requester, UsageError,
};
pub use self::quote::{PriceQuoter, QuoteLine};

// Submodules
mod disburse;
mod quote;
