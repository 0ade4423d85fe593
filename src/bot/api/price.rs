use std::fmt;

use async_trait::async_trait;
use regex::Regex;
use reqwest::header;
use serde_json::Value;

/* Price sources used by the price command.
 * Both are external and uncontrolled, so each sits behind the PriceSource trait.
 */

pub const DEFAULT_REFERENCE_PATTERN: &str = r"\$\s*([0-9][0-9,]*(?:\.[0-9]+)?)";

#[derive(thiserror::Error, Debug)]
pub enum PriceError {
    #[error("Request error: {0}")]
    RequestError(reqwest::Error),
    #[error("Price not found for {0}")]
    NotFound(String),
    #[error("Could not read price from {0:?}")]
    ParseError(String),
    #[error("timeout")]
    Timeout,
}

impl From<reqwest::Error> for PriceError {
    fn from(request_error: reqwest::Error) -> PriceError {
        PriceError::RequestError(request_error)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradingPair {
    pub base: String,
    pub quote: String,
    pub active: bool,
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_price(&self, pair: &TradingPair) -> Result<f64, PriceError>;
}

fn json_client() -> Result<reqwest::Client, PriceError> {
    let mut h = header::HeaderMap::new();
    h.insert(
        "Accept",
        header::HeaderValue::from_static("application/json"),
    );

    Ok(reqwest::Client::builder().default_headers(h).build()?)
}

// Reads the `price` field of an exchange response. Accepts numbers and numeric strings.
pub fn extract_exchange_price(response: &Value, pair: &TradingPair) -> Result<f64, PriceError> {
    match response.get("price") {
        Some(Value::Number(number)) => number
            .as_f64()
            .ok_or_else(|| PriceError::ParseError(number.to_string())),
        Some(Value::String(text)) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| PriceError::ParseError(text.to_string())),
        Some(other) => Err(PriceError::ParseError(other.to_string())),
        None => Err(PriceError::NotFound(pair.to_string())),
    }
}

// Finds the first price on a page with the given pattern. Capture group 1 is the price.
pub fn extract_reference_price(
    pattern: &Regex,
    page: &str,
    pair: &TradingPair,
) -> Result<f64, PriceError> {
    let captured = pattern
        .captures(page)
        .and_then(|captures| captures.get(1))
        .ok_or_else(|| PriceError::NotFound(pair.quote.to_string()))?;

    let text = captured.as_str().replace(',', "");
    text.parse::<f64>()
        .map_err(|_| PriceError::ParseError(captured.as_str().to_string()))
}

/* Internal exchange.
 * Returns the most recent trade price of the base asset, in units of the quote asset.
 */
pub struct ExchangePriceSource {
    client: reqwest::Client,
    base_url: String,
}

impl ExchangePriceSource {
    pub fn new(base_url: &str) -> Result<ExchangePriceSource, PriceError> {
        Ok(ExchangePriceSource {
            client: json_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PriceSource for ExchangePriceSource {
    async fn fetch_price(&self, pair: &TradingPair) -> Result<f64, PriceError> {
        let url = format!(
            "{}/prices/{}-{}",
            self.base_url,
            pair.base.to_lowercase(),
            pair.quote.to_lowercase()
        );

        let response: Value = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        extract_exchange_price(&response, pair)
    }
}

/* External reference page.
 * Scrapes the USD price of the quote asset from a public page.
 */
pub struct ReferencePriceSource {
    client: reqwest::Client,
    url_template: String,
    pattern: Regex,
}

impl ReferencePriceSource {
    pub fn new(url_template: &str, pattern: Regex) -> Result<ReferencePriceSource, PriceError> {
        Ok(ReferencePriceSource {
            client: reqwest::Client::builder().build()?,
            url_template: url_template.to_string(),
            pattern,
        })
    }
}

#[async_trait]
impl PriceSource for ReferencePriceSource {
    async fn fetch_price(&self, pair: &TradingPair) -> Result<f64, PriceError> {
        let url = self
            .url_template
            .replace("{symbol}", &pair.quote.to_lowercase());

        let page = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        extract_reference_price(&self.pattern, &page, pair)
    }
}
