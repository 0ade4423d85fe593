use std::sync::Arc;

use teloxide::prelude::*;

use crate::bot::{
    dispatcher::{BotState, HandlerResult},
    router::{KEYWORD_FAUCET, KEYWORD_HELP, KEYWORD_PRICE},
    Config,
};

/* Invalid state.
 * Invoked for any message that is not a command for this bot.
 * Simply does not respond to anything. Reduces spam.
 */
pub async fn invalid_state(_bot: Bot, _msg: Message) -> HandlerResult {
    Ok(())
}

pub fn help_text(config: &Config) -> String {
    let prefix = &config.prefix;
    format!(
        "{prefix}{KEYWORD_FAUCET} <address> – receive {} {} (in #{}, once every {} day(s)).\n{prefix}{KEYWORD_PRICE} – show current prices.\n{prefix}{KEYWORD_HELP} – show this message.",
        config.amount, config.symbol, config.faucet_channel, config.cooldown_days
    )
}

/* Help command.
 * Displays a list of commands available to the user.
 */
pub async fn action_help(bot: Bot, msg: Message, state: Arc<BotState>) -> HandlerResult {
    bot.send_message(msg.chat.id, help_text(&state.config))
        .await?;
    Ok(())
}
