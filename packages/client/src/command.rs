//! Parsing of interactive input lines into client commands.
//!
//! Anything that does not start with `/` is a chat message. Slash commands
//! cover the remaining UI actions of the chat surface: listing and picking
//! characters, listing and loading sessions, starting a new chat and
//! requesting a summary.

use thiserror::Error;

/// A parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Chat(String),
    ListCharacters,
    SelectCharacter(String),
    ListSessions,
    LoadSession(i64),
    NewChat,
    Summary,
    Help,
    Quit,
}

/// Parse failures are surfaced locally and never reach the socket.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown command '/{0}'; /help lists the available ones")]
    UnknownCommand(String),
    #[error("usage: {0}")]
    MissingArgument(&'static str),
    #[error("'{0}' is not a valid session id")]
    InvalidSessionId(String),
}

/// Parse a trimmed input line.
pub fn parse_command(line: &str) -> Result<Command, ParseError> {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Command::Chat(line.to_string()));
    };

    let mut parts = rest.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or("");
    let arg = parts.next().map(str::trim).filter(|s| !s.is_empty());

    match name {
        "characters" => Ok(Command::ListCharacters),
        "character" | "char" => arg
            .map(|a| Command::SelectCharacter(a.to_string()))
            .ok_or(ParseError::MissingArgument("/character <id>")),
        "sessions" => Ok(Command::ListSessions),
        "session" => {
            let arg = arg.ok_or(ParseError::MissingArgument("/session <id>"))?;
            arg.parse()
                .map(Command::LoadSession)
                .map_err(|_| ParseError::InvalidSessionId(arg.to_string()))
        }
        "new" => Ok(Command::NewChat),
        "summary" => Ok(Command::Summary),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(ParseError::UnknownCommand(other.to_string())),
    }
}
