//! Chat command parsing

/// Commands the bot understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Up,
    Down,
    Ping,
    Status,
}

impl Command {
    /// Parse the leading `/command` or `/command@handle` of a message
    ///
    /// Returns `None` for plain text, unknown commands and commands addressed
    /// to a different bot.
    pub fn parse(text: &str, bot_username: &str) -> Option<Command> {
        let token = text.split_whitespace().next()?;
        let body = token.strip_prefix('/')?;

        let name = match body.split_once('@') {
            Some((name, handle)) => {
                if !handle.eq_ignore_ascii_case(bot_username) {
                    return None;
                }
                name
            }
            None => body,
        };

        match name {
            "up" => Some(Command::Up),
            "down" => Some(Command::Down),
            "ping" => Some(Command::Ping),
            "status" => Some(Command::Status),
            _ => None,
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Up => write!(f, "/up"),
            Command::Down => write!(f, "/down"),
            Command::Ping => write!(f, "/ping"),
            Command::Status => write!(f, "/status"),
        }
    }
}
