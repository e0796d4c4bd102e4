//! Special commands parser for interactive chat mode
//!
//! Commands are prefixed with `/` and are case-insensitive. They inspect or
//! steer the session instead of being sent to the assistant:
//! - List the doctor catalog and pick one to book
//! - View session status and the transcript
//! - Display help information
//! - Exit the session

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Show the bookable doctors with their positions
    ListDoctors,

    /// Book the doctor at a one-based position in the list
    SelectDoctor(usize),

    /// Show conversation state, turn count, and booking status
    ShowStatus,

    /// Reprint the transcript
    ShowHistory,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command; send the input to the assistant
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` for unrecognized `/` commands and
/// the argument variants when `/select` is given no or a bad position.
///
/// # Examples
///
/// ```
/// use shipsmart::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/select 2").unwrap(), SpecialCommand::SelectDoctor(2));
/// assert_eq!(parse_special_command("what does my plan cover").unwrap(), SpecialCommand::None);
/// assert!(parse_special_command("/select zero").is_err());
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    match lower.as_str() {
        "/doctors" => Ok(SpecialCommand::ListDoctors),
        "/select" => Err(CommandError::MissingArgument {
            command: "/select".to_string(),
            usage: "/select <number>".to_string(),
        }),
        input if input.starts_with("/select ") => {
            let arg = input["/select ".len()..].trim();
            match arg.parse::<usize>() {
                Ok(position) if position > 0 => Ok(SpecialCommand::SelectDoctor(position)),
                _ => Err(CommandError::UnsupportedArgument {
                    command: "/select".to_string(),
                    arg: arg.to_string(),
                }),
            }
        }
        "/status" => Ok(SpecialCommand::ShowStatus),
        "/history" => Ok(SpecialCommand::ShowHistory),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/exit" | "/quit" | "exit" | "quit" => Ok(SpecialCommand::Exit),
        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

/// Print the special command reference
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat Mode
===========================================

APPOINTMENTS:
  /doctors        - List the doctors you can book
  /select <n>     - Book the doctor at position <n> (answer yes/no to confirm)

SESSION INFORMATION:
  /status         - Show conversation state, turns, and bookings
  /history        - Reprint the conversation so far
  /help           - Show this help message
  exit, quit      - Exit the session

Anything else is sent to SHIPSmart. Try "what does my plan cover" or
"I'd like to book an appointment".
"#
    );
}
