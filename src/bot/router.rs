/* Router recognises bot commands in chat messages.
 * A command is the configured prefix followed by a keyword, e.g. `!faucet <address>`.
 * Commands may carry a `@botname` suffix, as Telegram adds in groups.
 * A suffix naming some other bot means the command is not for us.
 */

pub const KEYWORD_FAUCET: &str = "faucet";
pub const KEYWORD_PRICE: &str = "price";
pub const KEYWORD_HELP: &str = "help";

#[derive(Debug, Clone, PartialEq)]
pub enum Command<'a> {
    Faucet { args: Vec<&'a str> },
    Price,
    Help,
}

pub fn parse_command<'a>(
    prefix: &str,
    bot_username: Option<&str>,
    text: &'a str,
) -> Option<Command<'a>> {
    let mut words = text.split_whitespace();
    let keyword = words.next()?.strip_prefix(prefix)?;
    let keyword = match keyword.split_once('@') {
        Some((keyword, addressee)) => match bot_username {
            Some(name) if !addressee.eq_ignore_ascii_case(name) => return None,
            _ => keyword,
        },
        None => keyword,
    };

    match keyword.to_lowercase().as_str() {
        KEYWORD_FAUCET => Some(Command::Faucet {
            args: words.collect(),
        }),
        KEYWORD_PRICE => Some(Command::Price),
        KEYWORD_HELP => Some(Command::Help),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_faucet() {
        assert_eq!(
            parse_command("!", Some("faucet_bot"), "!faucet lsk3a1b"),
            Some(Command::Faucet {
                args: vec!["lsk3a1b"]
            })
        );
        assert_eq!(
            parse_command("!", Some("faucet_bot"), "!faucet"),
            Some(Command::Faucet { args: vec![] })
        );
        assert_eq!(
            parse_command("!", Some("faucet_bot"), "!faucet   lsk3a1b    lsk4c2d "),
            Some(Command::Faucet {
                args: vec!["lsk3a1b", "lsk4c2d"]
            })
        );
    }

    #[test]
    fn test_parse_other_commands() {
        assert_eq!(parse_command("!", Some("faucet_bot"), "!price"), Some(Command::Price));
        assert_eq!(parse_command("!", Some("faucet_bot"), "!HELP"), Some(Command::Help));
        assert_eq!(parse_command("/", Some("faucet_bot"), "/price@faucet_bot"), Some(Command::Price));
        assert_eq!(
            parse_command("$$", Some("faucet_bot"), "$$faucet x"),
            Some(Command::Faucet { args: vec!["x"] })
        );
    }

    #[test]
    fn test_commands_for_other_bots() {
        assert_eq!(
            parse_command("!", Some("faucet_bot"), "!FAUCET@Faucet_Bot x"),
            Some(Command::Faucet { args: vec!["x"] })
        );
        assert_eq!(parse_command("!", Some("faucet_bot"), "!faucet@other_bot x"), None);
        assert_eq!(parse_command("!", Some("faucet_bot"), "!help@"), None);
        // Without a known username every addressee is accepted
        assert_eq!(parse_command("!", None, "!help@other_bot"), Some(Command::Help));
    }

    #[test]
    fn test_ignore_non_commands() {
        assert_eq!(parse_command("!", Some("faucet_bot"), "faucet lsk3a1b"), None);
        assert_eq!(parse_command("!", Some("faucet_bot"), "/faucet lsk3a1b"), None);
        assert_eq!(parse_command("!", Some("faucet_bot"), "!faucets lsk3a1b"), None);
        assert_eq!(parse_command("!", Some("faucet_bot"), "!unknown"), None);
        assert_eq!(parse_command("!", Some("faucet_bot"), "hello !faucet"), None);
        assert_eq!(parse_command("!", Some("faucet_bot"), ""), None);
        assert_eq!(parse_command("!", Some("faucet_bot"), "!"), None);
    }
}
