use std::sync::Arc;

use chrono::Utc;
use teloxide::{
    prelude::*,
    types::{ChatMemberKind, User},
};

use crate::bot::{
    dispatcher::{BotState, HandlerResult},
    processor::{DisbursementResult, Requester as FaucetRequester, UsageError},
    router::KEYWORD_FAUCET,
    Config,
};

use super::{
    constants::EXAMPLE_ADDRESS_BODY,
    utils::{display_amount, format_distance},
};

/* Utilities */

fn usage(config: &Config, privileged: bool) -> String {
    if privileged {
        format!("{}{KEYWORD_FAUCET} <address> [amount]", config.prefix)
    } else {
        format!("{}{KEYWORD_FAUCET} <address>", config.prefix)
    }
}

/* Crafts the reply for the outcome of a faucet request.
 */
pub fn describe_disbursement(
    result: &DisbursementResult,
    config: &Config,
    privileged: bool,
) -> String {
    match result {
        DisbursementResult::Sent {
            amount, address, ..
        } => format!("{} {} sent to {}", display_amount(*amount), config.symbol, address),
        DisbursementResult::RejectedUsage(UsageError::MissingAddress) => format!(
            "Command needs an address. Please use {}.",
            usage(config, privileged)
        ),
        DisbursementResult::RejectedUsage(UsageError::TooManyArguments) => format!(
            "Command only accepts an address. Please use {}.",
            usage(config, privileged)
        ),
        DisbursementResult::RejectedUsage(UsageError::InvalidAmount(amount)) => format!(
            "Invalid amount {}, please provide a positive whole number of {}.",
            amount, config.symbol
        ),
        DisbursementResult::RejectedInvalidAddress { .. } => format!(
            "Invalid wallet address, try again using a valid format, e.g. {}{}.",
            config.symbol.to_lowercase(),
            EXAMPLE_ADDRESS_BODY
        ),
        DisbursementResult::RejectedCooldown { remaining } => format!(
            "You're on a cooldown, try again in {}.",
            format_distance(*remaining)
        ),
        DisbursementResult::Failed(err) => format!("Error occurred: {}.", err),
    }
}

// Display name used in the transaction memo
fn display_name(user: &User) -> String {
    match &user.username {
        Some(username) => format!("@{}", username),
        None => user.full_name(),
    }
}

// Faucet requests are only honoured in the chat named after the faucet channel
fn is_faucet_chat(title: Option<&str>, config: &Config) -> bool {
    title == Some(config.faucet_channel.as_str())
}

fn is_configured_admin(user: &User, config: &Config) -> bool {
    config.admin_ids.contains(&user.id.to_string())
}

// A role that could not be looked up grants nothing
fn holds_privileged_role<E>(role: Result<ChatMemberKind, E>) -> bool {
    role.map(|kind| kind.is_privileged()).unwrap_or(false)
}

/* Checks whether the sender may override amounts and skip cooldowns.
 * Configured admins always may. Otherwise the sender must own or administer the chat.
 */
async fn is_privileged(bot: &Bot, msg: &Message, user: &User, config: &Config) -> bool {
    if is_configured_admin(user, config) {
        return true;
    }

    let role = bot.get_chat_member(msg.chat.id, user.id).await;
    if let Err(err) = &role {
        log::warn!(
            "Faucet - Could not look up role of user {} in chat {}: {}",
            user.id,
            msg.chat.id,
            err.to_string()
        );
    }
    holds_privileged_role(role.map(|member| member.kind))
}

/* Faucet command.
 * Sends tokens to the given address. Only honoured in the faucet channel.
 */
pub async fn action_faucet(
    bot: Bot,
    msg: Message,
    state: Arc<BotState>,
    args: Vec<&str>,
) -> HandlerResult {
    let config = &state.config;
    if !is_faucet_chat(msg.chat.title(), config) {
        log::debug!(
            "Faucet - Ignored command outside the faucet channel in chat {}",
            msg.chat.id
        );
        return Ok(());
    }

    let user = match msg.from() {
        Some(user) => user,
        None => return Ok(()),
    };

    let requester = FaucetRequester {
        id: user.id.to_string(),
        name: display_name(user),
        privileged: is_privileged(&bot, &msg, user, config).await,
    };

    let result = state.faucet.disburse(&requester, &args, Utc::now()).await;
    // Sends and failures are logged by the processor
    match &result {
        DisbursementResult::Sent { .. } | DisbursementResult::Failed(_) => {}
        rejected => {
            log::info!(
                "Faucet - User {} in chat {} was rejected: {:?}",
                requester.id,
                msg.chat.id,
                rejected
            );
        }
    }

    bot.send_message(
        msg.chat.id,
        describe_disbursement(&result, config, requester.privileged),
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::api::{Passphrase, BASE_UNIT_SCALE, DEFAULT_REFERENCE_PATTERN};
    use chrono::Duration;
    use regex::Regex;
    use serde_json::json;
    use teloxide::types::ChatMember;

    fn config() -> Config {
        Config {
            bot_token: "123:abc".to_string(),
            passphrase: Passphrase::new("unused"),
            wallet_gateway_url: "http://localhost".to_string(),
            prefix: "!".to_string(),
            amount: 100,
            fee: 10_000_000,
            symbol: "LSK".to_string(),
            cooldown_days: 1,
            cooldown: Duration::days(1),
            faucet_channel: "faucet".to_string(),
            admin_ids: vec!["7".to_string()],
            gateway_timeout: std::time::Duration::from_secs(30),
            price_exchange_url: None,
            price_reference_url: None,
            price_reference_pattern: Regex::new(DEFAULT_REFERENCE_PATTERN).unwrap(),
            price_pairs: vec![],
        }
    }

    #[test]
    fn test_describe_sent() {
        let result = DisbursementResult::Sent {
            amount: 100 * BASE_UNIT_SCALE,
            address: "lsk34ffa13f574ab888c5966de86eebf5f7871c5dd0".to_string(),
            transaction_id: "txn".to_string(),
        };
        assert_eq!(
            describe_disbursement(&result, &config(), false),
            "100 LSK sent to lsk34ffa13f574ab888c5966de86eebf5f7871c5dd0"
        );
    }

    #[test]
    fn test_describe_usage() {
        let missing = DisbursementResult::RejectedUsage(UsageError::MissingAddress);
        assert_eq!(
            describe_disbursement(&missing, &config(), false),
            "Command needs an address. Please use !faucet <address>."
        );

        let too_many = DisbursementResult::RejectedUsage(UsageError::TooManyArguments);
        assert_eq!(
            describe_disbursement(&too_many, &config(), false),
            "Command only accepts an address. Please use !faucet <address>."
        );
        assert_eq!(
            describe_disbursement(&too_many, &config(), true),
            "Command only accepts an address. Please use !faucet <address> [amount]."
        );

        let amount = DisbursementResult::RejectedUsage(UsageError::InvalidAmount("x".to_string()));
        assert_eq!(
            describe_disbursement(&amount, &config(), true),
            "Invalid amount x, please provide a positive whole number of LSK."
        );
    }

    #[test]
    fn test_describe_rejections() {
        let invalid = DisbursementResult::RejectedInvalidAddress {
            address: "badaddr".to_string(),
        };
        assert_eq!(
            describe_disbursement(&invalid, &config(), false),
            "Invalid wallet address, try again using a valid format, e.g. lsk34ffa13f574ab888c5966de86eebf5f7871c5dd0."
        );

        let cooldown = DisbursementResult::RejectedCooldown {
            remaining: Duration::hours(5),
        };
        assert_eq!(
            describe_disbursement(&cooldown, &config(), false),
            "You're on a cooldown, try again in about 5 hours."
        );

        let failed = DisbursementResult::Failed("timeout".to_string());
        assert_eq!(
            describe_disbursement(&failed, &config(), false),
            "Error occurred: timeout."
        );
    }

    fn user(id: u64) -> User {
        serde_json::from_value(json!({
            "id": id,
            "is_bot": false,
            "first_name": "Ada",
        }))
        .unwrap()
    }

    fn role(status: &str) -> ChatMemberKind {
        let member: ChatMember = serde_json::from_value(json!({
            "user": { "id": 8, "is_bot": false, "first_name": "Ada" },
            "status": status,
            "is_anonymous": false,
        }))
        .unwrap();
        member.kind
    }

    #[test]
    fn test_faucet_chat_only() {
        assert!(is_faucet_chat(Some("faucet"), &config()));
        assert!(!is_faucet_chat(Some("general"), &config()));
        assert!(!is_faucet_chat(Some("Faucet"), &config()));
        // Private chats have no title
        assert!(!is_faucet_chat(None, &config()));
    }

    #[test]
    fn test_configured_admins() {
        assert!(is_configured_admin(&user(7), &config()));
        assert!(!is_configured_admin(&user(8), &config()));
    }

    #[test]
    fn test_privileged_roles() {
        assert!(holds_privileged_role::<String>(Ok(role("creator"))));
        assert!(!holds_privileged_role::<String>(Ok(role("member"))));
        assert!(!holds_privileged_role::<String>(Ok(ChatMemberKind::Left)));
        assert!(!holds_privileged_role(Err("Forbidden: bot is not a member")));
    }
}
