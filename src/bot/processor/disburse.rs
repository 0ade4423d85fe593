use std::{sync::Arc, time::Duration as StdDuration};

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tokio::{sync::Mutex, time::timeout};

use crate::bot::{
    api::{GatewayError, Passphrase, Receipt, TransferFields, WalletGateway, BASE_UNIT_SCALE},
    cooldown::CooldownStore,
};

/* Disbursement is the core of the faucet.
 * Execution flow: check arguments, check address, check cooldown,
 * submit the transfer through the wallet gateway, then commit the cooldown.
 * Every step before submission is local and consumes nothing.
 */

#[derive(Debug, Clone, PartialEq)]
pub struct Requester {
    pub id: String,
    pub name: String,
    pub privileged: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisbursementRequest {
    pub requester: Requester,
    pub address: String,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UsageError {
    MissingAddress,
    TooManyArguments,
    InvalidAmount(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DisbursementResult {
    Sent {
        amount: u64,
        address: String,
        transaction_id: String,
    },
    RejectedUsage(UsageError),
    RejectedInvalidAddress {
        address: String,
    },
    RejectedCooldown {
        remaining: Duration,
    },
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct FaucetSettings {
    pub symbol: String,
    // Amount sent to standard callers, in base units
    pub default_amount: u64,
    pub fee: u64,
    pub cooldown: Duration,
    pub gateway_timeout: StdDuration,
}

/* Parses command arguments into a request.
 * Standard callers: <address>. Privileged callers: <address> [amount in whole tokens].
 */
pub fn parse_request(
    requester: &Requester,
    args: &[&str],
    default_amount: u64,
) -> Result<DisbursementRequest, UsageError> {
    let max_args = if requester.privileged { 2 } else { 1 };

    match args.len() {
        0 => Err(UsageError::MissingAddress),
        n if n > max_args => Err(UsageError::TooManyArguments),
        _ => {
            let amount = match args.get(1) {
                Some(text) => parse_token_amount(text)?,
                None => default_amount,
            };

            Ok(DisbursementRequest {
                requester: requester.clone(),
                address: args[0].to_string(),
                amount,
            })
        }
    }
}

// Converts a whole-token amount into base units.
fn parse_token_amount(text: &str) -> Result<u64, UsageError> {
    let invalid = || UsageError::InvalidAmount(text.to_string());

    match text.parse::<u64>() {
        Ok(0) | Err(_) => Err(invalid()),
        Ok(tokens) => tokens.checked_mul(BASE_UNIT_SCALE).ok_or_else(invalid),
    }
}

pub struct Faucet {
    gateway: Arc<dyn WalletGateway>,
    ledger: Arc<dyn CooldownStore>,
    passphrase: Passphrase,
    settings: FaucetSettings,
    // Per-requester locks, held from the cooldown check until the commit
    in_flight: DashMap<String, Arc<Mutex<()>>>,
}

impl Faucet {
    pub fn new(
        gateway: Arc<dyn WalletGateway>,
        ledger: Arc<dyn CooldownStore>,
        passphrase: Passphrase,
        settings: FaucetSettings,
    ) -> Faucet {
        Faucet {
            gateway,
            ledger,
            passphrase,
            settings,
            in_flight: DashMap::new(),
        }
    }

    pub fn ledger(&self) -> Arc<dyn CooldownStore> {
        self.ledger.clone()
    }

    /* Runs a faucet request to completion.
     * Privileged callers skip the cooldown check and never get a cooldown committed.
     */
    pub async fn disburse(
        &self,
        requester: &Requester,
        args: &[&str],
        now: DateTime<Utc>,
    ) -> DisbursementResult {
        let request = match parse_request(requester, args, self.settings.default_amount) {
            Ok(request) => request,
            Err(err) => return DisbursementResult::RejectedUsage(err),
        };

        if !self
            .gateway
            .validate_address(&self.settings.symbol, &request.address)
        {
            return DisbursementResult::RejectedInvalidAddress {
                address: request.address,
            };
        }

        if requester.privileged {
            return self.submit(&request, now).await;
        }

        let lock = self
            .in_flight
            .entry(requester.id.clone())
            .or_default()
            .clone();
        let result = {
            let _guard = lock.lock().await;
            self.submit_with_cooldown(&request, now).await
        };
        drop(lock);
        self.in_flight
            .remove_if(&requester.id, |_, lock| Arc::strong_count(lock) == 1);

        result
    }

    async fn submit_with_cooldown(
        &self,
        request: &DisbursementRequest,
        now: DateTime<Utc>,
    ) -> DisbursementResult {
        let requester_id = &request.requester.id;
        if let Some(remaining) = self.ledger.time_remaining(requester_id, now) {
            return DisbursementResult::RejectedCooldown { remaining };
        }

        let result = self.submit(request, now).await;
        if let DisbursementResult::Sent { .. } = result {
            self.ledger.commit(requester_id, now, self.settings.cooldown);
        }

        result
    }

    async fn submit(&self, request: &DisbursementRequest, now: DateTime<Utc>) -> DisbursementResult {
        let fields = TransferFields {
            recipient_address: request.address.clone(),
            amount: request.amount,
            fee: self.settings.fee,
            timestamp: now.timestamp_millis(),
            message: format!("Transaction from {} faucet.", request.requester.name),
        };

        match self.transfer(&fields).await {
            Ok(receipt) => {
                log::info!(
                    "Disburse - User {} received {} base units at {} in transaction {}",
                    request.requester.id,
                    fields.amount,
                    fields.recipient_address,
                    receipt.transaction_id
                );
                DisbursementResult::Sent {
                    amount: fields.amount,
                    address: fields.recipient_address,
                    transaction_id: receipt.transaction_id,
                }
            }
            Err(err) => {
                log::error!(
                    "Disburse - User {} failed to receive tokens at {}: {}",
                    request.requester.id,
                    fields.recipient_address,
                    err.to_string()
                );
                DisbursementResult::Failed(err.to_string())
            }
        }
    }

    // Connect, prepare, post. Once connected, the session is always disconnected.
    async fn transfer(&self, fields: &TransferFields) -> Result<Receipt, GatewayError> {
        let limit = self.settings.gateway_timeout;

        let mut session = timeout(limit, self.gateway.connect(&self.passphrase))
            .await
            .map_err(|_| GatewayError::Timeout)??;

        let outcome = timeout(limit, async {
            let signed = session.prepare_transaction(fields).await?;
            session.post_transaction(signed).await
        })
        .await
        .unwrap_or(Err(GatewayError::Timeout));

        if timeout(limit, session.disconnect()).await.is_err() {
            log::warn!("Disburse - Wallet gateway disconnect timed out");
        }

        outcome
    }
}
