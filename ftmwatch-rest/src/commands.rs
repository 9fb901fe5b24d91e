//! Telegram chat command dispatch; subscribe / unsubscribe bookkeeping around the
//! `contract_alert` table plus a reply per command.

use crate::AppState;
use log::error;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum Command {
    Start,
    Sub,
    Unsub,
    Registered,
}

/// Handles one inbound message and replies to the chat; delivery failures are logged
/// only, Telegram already got its 200.
pub fn handle(state: &AppState, chat_id: i64, text: &str) {
    let reply = match parse_command(text) {
        None => "Unrecognized command 😿".to_string(),

        Some((Command::Start, _)) => "hello frens!".to_string(),

        Some((Command::Sub, args)) => match args.first() {
            None => "Please provide a keyword to subscribe to".to_string(),
            Some(keyword) => match state.dbc.rest().add_alert_subscriber(keyword, chat_id) {
                true => format!("Added alert for `{keyword}`"),
                false => format!("Alert already exists for `{keyword}`"),
            },
        },

        Some((Command::Unsub, args)) => match args.first() {
            None => "Please provide a keyword to unsubscribe from".to_string(),
            Some(keyword) => match state.dbc.rest().remove_alert_subscriber(keyword, chat_id) {
                true => format!("Removed alert for `{keyword}`"),
                false => format!("No alert exists for `{keyword}`"),
            },
        },

        Some((Command::Registered, _)) => {
            let keywords: Vec<String> =
                state.dbc.rest().registered_alerts(chat_id).into_iter().map(|x| x.keyword).collect();

            match keywords.is_empty() {
                true => "No alerts registered in this chat".to_string(),
                false => format!("Current alerts: `[{}]`", keywords.join(", ")),
            }
        }
    };

    if let Err(why) = state.tgc.send_message(chat_id, &reply) {
        error!("{why}");
    }
}

/// Returns the command plus its arguments, or `None` for anything that isn't a known
/// command. A `@botname` suffix (used in group chats) is tolerated.
fn parse_command(text: &str) -> Option<(Command, Vec<String>)> {
    let mut tokens = text.split_whitespace();

    let head = tokens.next()?.trim_matches('/');
    let head = head.split('@').next().unwrap();

    let command = match head {
        "start" => Command::Start,
        "sub" => Command::Sub,
        "unsub" => Command::Unsub,
        "registered" => Command::Registered,
        _ => return None,
    };

    Some((command, tokens.map(str::to_string).collect()))
}

#[cfg(test)]
mod tests {
    use crate::commands::parse_command;
    use crate::commands::Command;

    #[test]
    fn parse_known_commands() {
        assert_eq!(parse_command("/start"), Some((Command::Start, vec![])));
        assert_eq!(parse_command("/sub Token"), Some((Command::Sub, vec!["Token".to_string()])));
        assert_eq!(parse_command("/unsub Token"), Some((Command::Unsub, vec!["Token".to_string()])));
        assert_eq!(parse_command("/registered"), Some((Command::Registered, vec![])));
    }

    #[test]
    fn parse_tolerates_bot_suffix_and_whitespace() {
        assert_eq!(
            parse_command("  /sub@ftmwatch_bot   Token  "),
            Some((Command::Sub, vec!["Token".to_string()]))
        );
    }

    #[test]
    fn parse_accepts_commands_without_slash() {
        assert_eq!(parse_command("registered"), Some((Command::Registered, vec![])));
    }

    #[test]
    fn parse_rejects_unknown_or_empty_input() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("   "), None);
        assert_eq!(parse_command("/selfdestruct"), None);
        assert_eq!(parse_command("hello there"), None);
    }
}
