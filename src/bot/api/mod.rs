/* API contains the logic for calling external services.
 * Links the bot's logic with anything it needs from the internet.
 * Called and used by the Processor only.
 */

// Exported functions
pub use self::price::{extract_exchange_price, extract_reference_price};
pub use self::wallet::validate_wallet_address;

// Exported structs and types
pub use self::price::{
    ExchangePriceSource, PriceError, PriceSource, ReferencePriceSource, TradingPair,
    DEFAULT_REFERENCE_PATTERN,
};
pub use self::wallet::{
    GatewayError, HttpWalletGateway, Passphrase, Receipt, SignedTransaction, TransferFields,
    WalletGateway, WalletSession, BASE_UNIT_SCALE,
};

// Submodules
mod price;
mod wallet;
