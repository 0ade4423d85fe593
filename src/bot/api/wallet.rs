use std::fmt;

use async_trait::async_trait;
use reqwest::header;
use serde::Deserialize;
use serde_json::{json, Value};

/* Wallet Gateway is the bot's link to the token network.
 * It validates addresses, and signs and submits transfers on behalf of the faucet.
 * The signing passphrase always belongs to the faucet itself, never to a requester.
 */

// Number of base units in one whole token
pub const BASE_UNIT_SCALE: u64 = 100_000_000;

const WALLET_ADDRESS_BODY_LENGTH: usize = 40;
const PASSPHRASE_WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];

#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    #[error("Connection failed: {0}")]
    Connect(String),
    #[error("Transaction preparation failed: {0}")]
    Prepare(String),
    #[error("Transaction submission failed: {0}")]
    Submit(String),
    #[error("Session already disconnected")]
    Disconnected,
    #[error("Request error: {0}")]
    RequestError(reqwest::Error),
    #[error("timeout")]
    Timeout,
}

impl From<reqwest::Error> for GatewayError {
    fn from(request_error: reqwest::Error) -> GatewayError {
        GatewayError::RequestError(request_error)
    }
}

/* Signing passphrase of the faucet wallet.
 * Debug output is redacted so it never ends up in logs.
 */
#[derive(Clone, PartialEq)]
pub struct Passphrase(String);

impl Passphrase {
    pub fn new(passphrase: &str) -> Passphrase {
        Passphrase(passphrase.trim().to_string())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    // Mnemonic shape check: a supported word count, lower-case ASCII words only.
    pub fn is_valid(&self) -> bool {
        let words: Vec<&str> = self.0.split_whitespace().collect();
        PASSPHRASE_WORD_COUNTS.contains(&words.len())
            && words
                .iter()
                .all(|word| word.chars().all(|c| c.is_ascii_lowercase()))
    }
}

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Passphrase(<redacted>)")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransferFields {
    pub recipient_address: String,
    pub amount: u64,
    pub fee: u64,
    pub timestamp: i64,
    pub message: String,
}

impl TransferFields {
    // Wire shape of a transfer. Amounts travel as decimal strings.
    pub fn to_json(&self) -> Value {
        json!({
            "type": "transfer",
            "recipientAddress": self.recipient_address,
            "amount": self.amount.to_string(),
            "fee": self.fee.to_string(),
            "timestamp": self.timestamp,
            "message": self.message,
        })
    }
}

// Signed transaction, opaque to the bot
#[derive(Debug, Clone, PartialEq)]
pub struct SignedTransaction(pub Value);

#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub transaction_id: String,
}

// Checks that an address is the lower-cased symbol followed by 40 lower-case hex digits.
pub fn validate_wallet_address(symbol: &str, address: &str) -> bool {
    match address.strip_prefix(&symbol.to_lowercase()) {
        Some(body) => {
            body.len() == WALLET_ADDRESS_BODY_LENGTH
                && body
                    .chars()
                    .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        }
        None => false,
    }
}

#[async_trait]
pub trait WalletGateway: Send + Sync {
    fn validate_address(&self, symbol: &str, address: &str) -> bool {
        validate_wallet_address(symbol, address)
    }

    async fn connect(&self, passphrase: &Passphrase)
        -> Result<Box<dyn WalletSession>, GatewayError>;
}

/* A connected, signing-capable session.
 * Callers must disconnect once done, whatever the outcome of the transfer.
 */
#[async_trait]
pub trait WalletSession: Send {
    async fn prepare_transaction(
        &mut self,
        fields: &TransferFields,
    ) -> Result<SignedTransaction, GatewayError>;

    async fn post_transaction(&mut self, txn: SignedTransaction) -> Result<Receipt, GatewayError>;

    async fn disconnect(&mut self);
}

/* HTTP Wallet Gateway
 * Talks JSON to a wallet bridge that holds the chain client.
 * One bridge session is opened per transfer.
 */
pub struct HttpWalletGateway {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    session_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostResponse {
    transaction_id: String,
}

impl HttpWalletGateway {
    pub fn new(base_url: &str) -> Result<HttpWalletGateway, GatewayError> {
        let mut h = header::HeaderMap::new();
        h.insert(
            "Accept",
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder().default_headers(h).build()?;

        Ok(HttpWalletGateway {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl WalletGateway for HttpWalletGateway {
    async fn connect(
        &self,
        passphrase: &Passphrase,
    ) -> Result<Box<dyn WalletSession>, GatewayError> {
        let response = self
            .client
            .post(format!("{}/sessions", self.base_url))
            .json(&json!({ "passphrase": passphrase.expose() }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GatewayError::Connect(response.text().await?));
        }

        let session: SessionResponse = response.json().await?;
        log::debug!("Wallet Gateway - Opened session {}", session.session_id);

        Ok(Box::new(HttpWalletSession {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            session_id: Some(session.session_id),
        }))
    }
}

pub struct HttpWalletSession {
    client: reqwest::Client,
    base_url: String,
    session_id: Option<String>,
}

impl HttpWalletSession {
    fn session_url(&self) -> Result<String, GatewayError> {
        match &self.session_id {
            Some(id) => Ok(format!("{}/sessions/{}", self.base_url, id)),
            None => Err(GatewayError::Disconnected),
        }
    }
}

#[async_trait]
impl WalletSession for HttpWalletSession {
    async fn prepare_transaction(
        &mut self,
        fields: &TransferFields,
    ) -> Result<SignedTransaction, GatewayError> {
        let url = format!("{}/transactions/prepare", self.session_url()?);
        let response = self.client.post(url).json(&fields.to_json()).send().await?;

        if !response.status().is_success() {
            return Err(GatewayError::Prepare(response.text().await?));
        }

        Ok(SignedTransaction(response.json().await?))
    }

    async fn post_transaction(&mut self, txn: SignedTransaction) -> Result<Receipt, GatewayError> {
        let url = format!("{}/transactions", self.session_url()?);
        let response = self.client.post(url).json(&txn.0).send().await?;

        if !response.status().is_success() {
            return Err(GatewayError::Submit(response.text().await?));
        }

        let posted: PostResponse = response.json().await?;
        Ok(Receipt {
            transaction_id: posted.transaction_id,
        })
    }

    async fn disconnect(&mut self) {
        let url = match self.session_url() {
            Ok(url) => url,
            Err(_) => return,
        };
        self.session_id = None;

        match self.client.delete(&url).send().await {
            Ok(response) if !response.status().is_success() => {
                log::warn!(
                    "Wallet Gateway - Disconnect returned status {}",
                    response.status()
                );
            }
            Ok(_) => {}
            Err(err) => {
                log::warn!("Wallet Gateway - Disconnect failed: {}", err.to_string());
            }
        }
    }
}
