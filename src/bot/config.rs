use std::{env, str::FromStr, time::Duration};

use regex::Regex;

use crate::bot::api::{Passphrase, TradingPair, DEFAULT_REFERENCE_PATTERN};

/* Config holds everything the bot needs at startup.
 * Values come from the environment (a `.env` file is loaded first by main).
 * Any missing or malformed value, including an invalid passphrase, stops startup.
 */

const DEFAULT_PREFIX: &str = "!";
const DEFAULT_AMOUNT: u64 = 100;
const DEFAULT_FEE: u64 = 10_000_000;
const DEFAULT_SYMBOL: &str = "LSK";
const DEFAULT_COOLDOWN_DAYS: i64 = 1;
const DEFAULT_FAUCET_CHANNEL: &str = "faucet";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(String),
    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
    #[error("Invalid passphrase")]
    InvalidPassphrase,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub passphrase: Passphrase,
    pub wallet_gateway_url: String,
    pub prefix: String,
    // Whole tokens sent to standard callers
    pub amount: u64,
    // Base units
    pub fee: u64,
    pub symbol: String,
    pub cooldown_days: i64,
    pub cooldown: chrono::Duration,
    pub faucet_channel: String,
    pub admin_ids: Vec<String>,
    pub gateway_timeout: Duration,
    pub price_exchange_url: Option<String>,
    pub price_reference_url: Option<String>,
    pub price_reference_pattern: Regex,
    pub price_pairs: Vec<TradingPair>,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        Config::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        let passphrase = Passphrase::new(&vars.required("FAUCET_PASSPHRASE")?);
        if !passphrase.is_valid() {
            return Err(ConfigError::InvalidPassphrase);
        }

        let amount: u64 = vars.parsed("FAUCET_AMOUNT", DEFAULT_AMOUNT)?;
        if amount == 0 {
            return Err(invalid("FAUCET_AMOUNT", "must be positive"));
        }
        let cooldown_days: i64 = vars.parsed("COOLDOWN_DAYS", DEFAULT_COOLDOWN_DAYS)?;
        if cooldown_days <= 0 {
            return Err(invalid("COOLDOWN_DAYS", "must be positive"));
        }
        let cooldown = chrono::Duration::try_days(cooldown_days)
            .ok_or_else(|| invalid("COOLDOWN_DAYS", "too large"))?;
        let timeout_secs: u64 = vars.parsed("GATEWAY_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(invalid("GATEWAY_TIMEOUT_SECS", "must be positive"));
        }

        let price_pairs = match vars.optional("PRICE_PAIRS") {
            Some(text) => parse_pairs(&text)?,
            None => Vec::new(),
        };
        let price_exchange_url = vars.optional("PRICE_EXCHANGE_URL");
        let price_reference_url = vars.optional("PRICE_REFERENCE_URL");
        if price_pairs.iter().any(|pair| pair.active) {
            if price_exchange_url.is_none() {
                return Err(ConfigError::Missing("PRICE_EXCHANGE_URL".to_string()));
            }
            if price_reference_url.is_none() {
                return Err(ConfigError::Missing("PRICE_REFERENCE_URL".to_string()));
            }
        }

        let pattern = vars
            .optional("PRICE_REFERENCE_PATTERN")
            .unwrap_or_else(|| DEFAULT_REFERENCE_PATTERN.to_string());
        let price_reference_pattern = Regex::new(&pattern)
            .map_err(|err| invalid("PRICE_REFERENCE_PATTERN", &err.to_string()))?;

        Ok(Config {
            bot_token: vars.required("TELOXIDE_TOKEN")?,
            passphrase,
            wallet_gateway_url: vars.required("WALLET_GATEWAY_URL")?,
            prefix: vars
                .optional("COMMAND_PREFIX")
                .unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            amount,
            fee: vars.parsed("FAUCET_FEE", DEFAULT_FEE)?,
            symbol: vars
                .optional("TOKEN_SYMBOL")
                .unwrap_or_else(|| DEFAULT_SYMBOL.to_string()),
            cooldown_days,
            cooldown,
            faucet_channel: vars
                .optional("FAUCET_CHANNEL")
                .unwrap_or_else(|| DEFAULT_FAUCET_CHANNEL.to_string()),
            admin_ids: vars
                .optional("FAUCET_ADMIN_IDS")
                .map(|ids| split_list(&ids).map(|id| id.to_string()).collect())
                .unwrap_or_default(),
            gateway_timeout: Duration::from_secs(timeout_secs),
            price_exchange_url,
            price_reference_url,
            price_reference_pattern,
            price_pairs,
        })
    }
}

struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    // Blank values count as unset
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::Missing(key.to_string()))
    }

    fn parsed<T: FromStr>(&self, key: &str, default: T) -> Result<T, ConfigError> {
        match self.optional(key) {
            Some(value) => value
                .parse::<T>()
                .map_err(|_| invalid(key, &format!("cannot parse {value:?}"))),
            None => Ok(default),
        }
    }
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn split_list(text: &str) -> impl Iterator<Item = &str> {
    text.split(',').map(str::trim).filter(|item| !item.is_empty())
}

/* Parses trading pairs, e.g. `CLSK/LSK, DEX/LSK:inactive`.
 * Pairs are active unless marked `:inactive`.
 */
pub fn parse_pairs(text: &str) -> Result<Vec<TradingPair>, ConfigError> {
    let mut pairs = Vec::new();
    for item in split_list(text) {
        let (symbols, active) = match item.split_once(':') {
            Some((symbols, "active")) => (symbols, true),
            Some((symbols, "inactive")) => (symbols, false),
            Some(_) => return Err(invalid("PRICE_PAIRS", &format!("unknown status in {item:?}"))),
            None => (item, true),
        };

        match symbols.split_once('/') {
            Some((base, quote)) if !base.trim().is_empty() && !quote.trim().is_empty() => {
                pairs.push(TradingPair {
                    base: base.trim().to_uppercase(),
                    quote: quote.trim().to_uppercase(),
                    active,
                });
            }
            _ => return Err(invalid("PRICE_PAIRS", &format!("expected BASE/QUOTE, got {item:?}"))),
        }
    }

    Ok(pairs)
}
