//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to control the chat session without sending messages
//! to the backend.

/// A parsed chat command.
///
/// These commands control the chat session and are not sent to the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Discard the conversation and start a fresh session.
    New,

    /// Display session statistics (message count, turns, etc.).
    Stats,

    /// Display help information.
    Help,

    /// Log out and clear the saved session.
    Logout,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a valid command,
/// or `None` if it should be treated as a regular message.
///
/// # Examples
///
/// ```
/// # use caremind::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/new").is_some());
/// assert!(parse_command("How was your day?").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input[1..].splitn(2, ' ');
    let command = parts.next()?.to_lowercase();

    let result = match command.as_str() {
        "new" | "reset" => ChatCommand::New,
        "stats" | "status" => ChatCommand::Stats,
        "help" | "?" => ChatCommand::Help,
        "logout" => ChatCommand::Logout,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("unknown command: /{command}")),
    };

    Some(result)
}

/// Returns the help text describing available commands.
pub fn help_text() -> &'static str {
    "Available commands:
  /new, /reset     Discard the conversation and start over
  /stats, /status  Show session statistics
  /logout          Log out and clear the saved session
  /help, /?        Show this help
  /quit, /exit, /q Exit"
}
