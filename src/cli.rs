//! Command-line interface definition for SHIPSmart
//!
//! This module defines the CLI structure using clap's derive API,
//! providing the interactive chat plus single-stage pipeline commands.

use clap::{Parser, Subcommand};

/// SHIPSmart - UC SHIP student health insurance assistant
///
/// Answer plan questions and book appointments through a scripted
/// conversation, optionally augmented by a remote completion service.
#[derive(Parser, Debug, Clone)]
#[command(name = "shipsmart")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Never call the remote completion service
    #[arg(long, global = true)]
    pub offline: bool,

    /// Override the completion model from config
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for SHIPSmart
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Name to sign in with
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Send one message through a fresh session and print the transcript
    Ask {
        /// Message text
        text: String,

        /// Print the transcript as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run only the lexical validator
    Validate {
        /// Text to validate
        text: String,
    },

    /// Run only the intent classifier
    Classify {
        /// Text to classify
        text: String,
    },

    /// List the bookable doctors
    Doctors,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            json_logs: false,
            offline: false,
            model: None,
            command: Commands::Doctors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, Some("config/config.yaml".to_string()));
        assert!(!cli.verbose);
        assert!(!cli.offline);
        assert!(matches!(cli.command, Commands::Doctors));
    }

    #[test]
    fn test_cli_parse_chat_command() {
        let cli = Cli::try_parse_from(["shipsmart", "chat", "--offline", "--user", "ana"]).unwrap();
        assert!(cli.offline);
        if let Commands::Chat { user } = cli.command {
            assert_eq!(user.as_deref(), Some("ana"));
        } else {
            panic!("Expected Chat command");
        }
    }

    #[test]
    fn test_cli_parse_ask_json() {
        let cli = Cli::try_parse_from(["shipsmart", "ask", "what does my plan cover", "--json"])
            .unwrap();
        if let Commands::Ask { text, json } = cli.command {
            assert_eq!(text, "what does my plan cover");
            assert!(json);
        } else {
            panic!("Expected Ask command");
        }
    }

    #[test]
    fn test_cli_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "shipsmart",
            "--verbose",
            "--json-logs",
            "classify",
            "hello",
            "--model",
            "llama3.1-8b",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert!(cli.json_logs);
        assert_eq!(cli.model.as_deref(), Some("llama3.1-8b"));
        assert!(matches!(cli.command, Commands::Classify { .. }));
    }

    #[test]
    fn test_cli_requires_command() {
        assert!(Cli::try_parse_from(["shipsmart"]).is_err());
    }
}
