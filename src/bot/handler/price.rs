use std::sync::Arc;

use teloxide::prelude::*;

use crate::bot::{
    dispatcher::{BotState, HandlerResult},
    processor::QuoteLine,
};

use super::constants::{NO_PAIRS_MESSAGE, PRICE_HEADER_MESSAGE};

fn display_quote_line(line: &QuoteLine) -> String {
    match line {
        QuoteLine::Priced {
            pair,
            exchange_price,
            price,
            ..
        } => format!(
            "1 {} = {:.8} {} ≈ ${:.6}",
            pair.base, exchange_price, pair.quote, price
        ),
        QuoteLine::ComingSoon { pair } => format!("{}: coming soon", pair),
    }
}

pub fn display_quote(lines: &[QuoteLine]) -> String {
    let body: Vec<String> = lines.iter().map(display_quote_line).collect();
    format!("{}\n{}", PRICE_HEADER_MESSAGE, body.join("\n"))
}

/* Price command.
 * Quotes every configured pair. Nothing is shown unless every price could be fetched.
 */
pub async fn action_price(bot: Bot, msg: Message, state: Arc<BotState>) -> HandlerResult {
    if !state.quoter.has_pairs() {
        bot.send_message(msg.chat.id, NO_PAIRS_MESSAGE).await?;
        return Ok(());
    }

    let reply = match state.quoter.quote().await {
        Ok(lines) => {
            log::info!("Price - Quoted {} pairs in chat {}", lines.len(), msg.chat.id);
            display_quote(&lines)
        }
        Err(err) => {
            log::error!(
                "Price - Failed to quote prices in chat {}: {}",
                msg.chat.id,
                err.to_string()
            );
            format!("Error occurred: {}.", err)
        }
    };

    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}
