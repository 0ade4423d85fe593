// Example shown next to invalid addresses, after the lower-cased symbol
pub const EXAMPLE_ADDRESS_BODY: &str = "34ffa13f574ab888c5966de86eebf5f7871c5dd0";

pub const NO_PAIRS_MESSAGE: &str = "No trading pairs are configured.";
pub const PRICE_HEADER_MESSAGE: &str = "Current prices:";
