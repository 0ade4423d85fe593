use std::sync::Arc;

use ldpos_faucet::bot::{run_dispatcher, spawn_sweeper, BotState, Config, PRUNE_INTERVAL};
use teloxide::prelude::*;

#[tokio::main]
pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    pretty_env_logger::init();
    log::info!("Starting faucet bot...");

    let config = Config::from_env()?;
    let bot = Bot::new(&config.bot_token);
    let me = bot.get_me().await?;
    let state = Arc::new(BotState::from_config(config, me.user.username.clone())?);
    let sweeper = spawn_sweeper(state.faucet.ledger(), PRUNE_INTERVAL);

    log::info!(
        "Faucet bot started successfully! Serving {} in #{}",
        state.config.symbol,
        state.config.faucet_channel
    );

    run_dispatcher(bot, state).await;
    sweeper.abort();

    Ok(())
}
