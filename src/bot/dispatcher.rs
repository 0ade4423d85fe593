use std::sync::Arc;

use teloxide::{prelude::*, types::User, RequestError};

use super::{
    api::{
        ExchangePriceSource, GatewayError, HttpWalletGateway, PriceError, PriceSource,
        ReferencePriceSource, BASE_UNIT_SCALE,
    },
    config::{Config, ConfigError},
    cooldown::CooldownLedger,
    handler::{action_faucet, action_help, action_price, invalid_state},
    processor::{Faucet, FaucetSettings, PriceQuoter},
    router::{parse_command, Command},
};

/* Dispatcher connects the bot to Telegram.
 * Every incoming message goes through the router, and commands are handed to their handler.
 * All user interaction, including sending and crafting of messages, is done by the handlers.
 * Errors reaching this level are only failures to talk to Telegram.
 */

/* Types */
pub type HandlerResult = Result<(), BotError>;

#[derive(thiserror::Error, Debug)]
pub enum BotError {
    #[error("Request error: {0}")]
    RequestError(RequestError),
    #[error("Config error: {0}")]
    ConfigError(ConfigError),
    #[error("Gateway error: {0}")]
    GatewayError(GatewayError),
    #[error("Price error: {0}")]
    PriceError(PriceError),
}

impl From<RequestError> for BotError {
    fn from(request_error: RequestError) -> BotError {
        BotError::RequestError(request_error)
    }
}

impl From<ConfigError> for BotError {
    fn from(config_error: ConfigError) -> BotError {
        BotError::ConfigError(config_error)
    }
}

impl From<GatewayError> for BotError {
    fn from(gateway_error: GatewayError) -> BotError {
        BotError::GatewayError(gateway_error)
    }
}

impl From<PriceError> for BotError {
    fn from(price_error: PriceError) -> BotError {
        BotError::PriceError(price_error)
    }
}

// Everything shared by the handlers
pub struct BotState {
    pub config: Config,
    // Commands addressed to another bot with `@name` are ignored
    pub bot_username: Option<String>,
    pub faucet: Faucet,
    pub quoter: PriceQuoter,
}

impl BotState {
    pub fn from_config(
        config: Config,
        bot_username: Option<String>,
    ) -> Result<BotState, BotError> {
        let gateway = Arc::new(HttpWalletGateway::new(&config.wallet_gateway_url)?);
        let ledger = Arc::new(CooldownLedger::new());
        let default_amount = config
            .amount
            .checked_mul(BASE_UNIT_SCALE)
            .ok_or_else(|| ConfigError::Invalid {
                key: "FAUCET_AMOUNT".to_string(),
                reason: "too large".to_string(),
            })?;

        let faucet = Faucet::new(
            gateway,
            ledger,
            config.passphrase.clone(),
            FaucetSettings {
                symbol: config.symbol.clone(),
                default_amount,
                fee: config.fee,
                cooldown: config.cooldown,
                gateway_timeout: config.gateway_timeout,
            },
        );

        let exchange: Arc<dyn PriceSource> = Arc::new(ExchangePriceSource::new(
            config.price_exchange_url.as_deref().unwrap_or_default(),
        )?);
        let reference: Arc<dyn PriceSource> = Arc::new(ReferencePriceSource::new(
            config.price_reference_url.as_deref().unwrap_or_default(),
            config.price_reference_pattern.clone(),
        )?);
        let quoter = PriceQuoter::new(
            config.price_pairs.clone(),
            exchange,
            reference,
            config.gateway_timeout,
        );

        Ok(BotState {
            config,
            bot_username,
            faucet,
            quoter,
        })
    }
}

/* Main Dispatch function */
pub async fn run_dispatcher(bot: Bot, state: Arc<BotState>) {
    let message_handler = Update::filter_message().endpoint(handle_message);

    Dispatcher::builder(bot, message_handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

// Text worth routing: only text messages sent by a human user
fn command_text<'a>(sender: Option<&User>, text: Option<&'a str>) -> Option<&'a str> {
    match sender {
        Some(user) if !user.is_bot => text,
        _ => None,
    }
}

/* Endpoint handler function.
 * Ignores service messages, messages from bots and anything that is not a command.
 */
pub async fn handle_message(bot: Bot, msg: Message, state: Arc<BotState>) -> HandlerResult {
    let text = match command_text(msg.from(), msg.text()) {
        Some(text) => text.to_string(),
        None => return Ok(()),
    };

    let command = parse_command(
        &state.config.prefix,
        state.bot_username.as_deref(),
        &text,
    );
    match command {
        Some(Command::Faucet { args }) => action_faucet(bot, msg, state, args).await,
        Some(Command::Price) => action_price(bot, msg, state).await,
        Some(Command::Help) => action_help(bot, msg, state).await,
        None => invalid_state(bot, msg).await,
    }
}
