/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `chat`   : Interactive chat session
- `ask`    : One message through a fresh session
- `inspect`: Single pipeline stages (validate, classify) and the doctor list

These handlers are intentionally small and use the library components:
the flow controller, the session store, and the NLP pipeline.
*/

use crate::chat::{Affordance, DoctorCatalog, FlowController, Message, Session};
use crate::config::Config;
use crate::error::{Result, ShipsmartError};
use colored::Colorize;

// Special commands parser for the chat loop
pub mod special_commands;

/// Build the flow controller, falling back to scripted replies without a key
fn build_controller(config: &Config) -> Result<FlowController> {
    match FlowController::from_config(config) {
        Ok(controller) => Ok(controller),
        Err(err) => match err.downcast_ref::<ShipsmartError>() {
            Some(ShipsmartError::MissingCredentials(var)) => {
                tracing::warn!(
                    "{} is not set; continuing with scripted replies only",
                    var
                );
                Ok(FlowController::new(config, None))
            }
            _ => Err(err),
        },
    }
}

/// Print the doctor catalog with one-based positions
fn print_doctors(catalog: &DoctorCatalog) {
    for (index, doctor) in catalog.all().iter().enumerate() {
        println!(
            "  {}. {} - {} ({:.1}★)",
            index + 1,
            doctor.name.bold(),
            doctor.specialty,
            doctor.rating
        );
    }
}

/// Print one assistant message with its affordance hint
fn print_assistant_message(message: &Message, catalog: &DoctorCatalog) {
    if message.is_error() {
        println!("\n{}\n", message.content().red());
        return;
    }

    println!("\n{}", message.content().cyan());
    match message.controls() {
        Some(Affordance::YesNo) => println!("{}", "[yes / no]".dimmed()),
        Some(Affordance::DoctorList) => {
            print_doctors(catalog);
            println!("{}", "Use /select <n> to choose a doctor".dimmed());
        }
        None => {}
    }
    println!();
}

// Chat command handler
pub mod chat {
    //! Interactive chat handler.
    //!
    //! Signs the user in, opens a session, and runs a readline loop that
    //! sends each line through the flow controller.

    use super::special_commands::{parse_special_command, print_help, SpecialCommand};
    use super::*;
    use crate::chat::SessionEvent;
    use crate::identity::{IdentityProvider, LocalIdentityProvider};
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `user` - Name to sign in with; defaults to `$USER`
    pub async fn run_chat(config: Config, user: Option<String>) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let identity = LocalIdentityProvider::new();
        let name = user
            .or_else(|| std::env::var("USER").ok())
            .unwrap_or_else(|| "student".to_string());
        let signed_in = identity.sign_in(&name).await?;

        let controller = build_controller(&config)?;
        let mut session = controller.open_session();
        let mut events = session.subscribe();

        let mut rl = DefaultEditor::new()?;
        print_welcome_banner(&signed_in.display_name, &controller);

        let mut printed = print_new_messages(&session, 0, controller.catalog());

        loop {
            match rl.readline(&format!("{} ", "you>".green().bold())) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(trimmed)?;

                    match parse_special_command(trimmed) {
                        Ok(SpecialCommand::None) => {}
                        Ok(SpecialCommand::Exit) => break,
                        Ok(SpecialCommand::Help) => {
                            print_help();
                            continue;
                        }
                        Ok(SpecialCommand::ListDoctors) => {
                            print_doctors(controller.catalog());
                            continue;
                        }
                        Ok(SpecialCommand::SelectDoctor(position)) => {
                            if let Err(e) = controller.select_doctor(&mut session, position - 1) {
                                eprintln!("{}", e.to_string().red());
                            }
                            printed = print_new_messages(&session, printed, controller.catalog());
                            continue;
                        }
                        Ok(SpecialCommand::ShowStatus) => {
                            print_status(&session, &controller);
                            continue;
                        }
                        Ok(SpecialCommand::ShowHistory) => {
                            print_history(&session, controller.catalog());
                            continue;
                        }
                        Err(e) => {
                            eprintln!("{}", e.to_string().yellow());
                            continue;
                        }
                    }

                    match controller.send(&mut session, trimmed).await {
                        Ok(outcome) => tracing::debug!("Turn routed as {}", outcome.route),
                        Err(e) => eprintln!("Error: {}\n", e),
                    }
                    log_events(&mut events);
                    // The user's own line is already on screen
                    printed = print_new_messages(&session, printed, controller.catalog());
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        identity.sign_out().await?;
        println!("Goodbye!");
        Ok(())
    }

    fn print_welcome_banner(name: &str, controller: &FlowController) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║            SHIPSmart - UC SHIP Insurance Assistant           ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Signed in as {}", name.bold());
        if controller.is_remote() {
            println!("Replies: {}", "scripted + remote completion".green());
        } else {
            println!("Replies: {}", "scripted only (offline)".yellow());
        }
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }

    /// Print assistant messages appended since `printed`; returns the new count
    fn print_new_messages(session: &Session, printed: usize, catalog: &DoctorCatalog) -> usize {
        for message in session.messages().iter().skip(printed) {
            if !message.is_user() {
                print_assistant_message(message, catalog);
            }
        }
        session.len()
    }

    fn print_history(session: &Session, catalog: &DoctorCatalog) {
        for message in session.messages() {
            if message.is_user() {
                println!("{} {}", "you>".green().bold(), message.content());
            } else {
                print_assistant_message(message, catalog);
            }
        }
    }

    fn print_status(session: &Session, controller: &FlowController) {
        println!("\n{}", "Session Status".bold());
        println!("  Session:      {}", session.id());
        println!("  State:        {}", session.state());
        println!("  Turns:        {}", session.turn_count());
        println!("  Messages:     {}", session.len());
        println!(
            "  Pending:      {}",
            session
                .pending_confirmation()
                .map(|p| p.doctor.name.as_str())
                .unwrap_or("none")
        );
        println!("  Appointments: {}", session.appointments().len());
        println!(
            "  Remote:       {}\n",
            if controller.is_remote() { "on" } else { "off" }
        );
    }

    fn log_events(events: &mut tokio::sync::broadcast::Receiver<SessionEvent>) {
        while let Ok(event) = events.try_recv() {
            tracing::trace!("Session event: {:?}", event);
        }
    }
}

// One-shot command handler
pub mod ask {
    //! Run one message through a fresh session and print the transcript.

    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Transcript<'a> {
        session_id: uuid::Uuid,
        route: String,
        state: String,
        remote_failed: bool,
        messages: &'a [Message],
    }

    /// Send `text` through a new session
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration
    /// * `text` - User message
    /// * `json` - Print the transcript as JSON instead of text
    pub async fn run_ask(config: Config, text: String, json: bool) -> Result<()> {
        let controller = build_controller(&config)?;
        let mut session = controller.open_session();
        let outcome = controller.send(&mut session, &text).await?;

        if json {
            let transcript = Transcript {
                session_id: session.id(),
                route: outcome.route.to_string(),
                state: session.state().to_string(),
                remote_failed: outcome.remote_failed,
                messages: session.messages(),
            };
            println!("{}", serde_json::to_string_pretty(&transcript)?);
            return Ok(());
        }

        for message in session.messages() {
            if message.is_user() {
                println!("{} {}", "you>".green().bold(), message.content());
            } else {
                print_assistant_message(message, controller.catalog());
            }
        }
        Ok(())
    }
}

// Pipeline stage inspection
pub mod inspect {
    //! Run a single pipeline stage on a piece of text.

    use super::*;
    use crate::nlp::{IntentClassifier, LexicalValidator, Tagger};

    /// Print whether `text` passes lexical validation, with its tags
    pub fn run_validate(text: &str) -> Result<()> {
        let validation = LexicalValidator::new().validate(text);
        match validation.reason {
            None => println!("{}", "valid".green().bold()),
            Some(reason) => {
                println!("{}: {}", "invalid".red().bold(), reason);
                println!("{}", reason.rephrase_prompt().dimmed());
            }
        }

        let tokens = Tagger::new().tag(text);
        if !tokens.is_empty() {
            let tagged: Vec<String> = tokens
                .iter()
                .map(|t| format!("{}/{}", t.text, t.tag))
                .collect();
            println!("{}", tagged.join(" "));
        }
        Ok(())
    }

    /// Print the intent of `text`
    pub fn run_classify(text: &str) -> Result<()> {
        let intent = IntentClassifier::new().classify(text);
        println!("{}", intent.to_string().bold());
        Ok(())
    }

    /// Print the doctor catalog
    pub fn run_doctors() -> Result<()> {
        print_doctors(&DoctorCatalog::default());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_build_controller_falls_back_without_key() {
        let mut config = Config::default();
        config.completion.api_key_env = "SHIPSMART_TEST_MISSING_KEY".to_string();
        std::env::remove_var("SHIPSMART_TEST_MISSING_KEY");

        let controller = build_controller(&config).unwrap();
        assert!(!controller.is_remote());
    }

    #[test]
    fn test_build_controller_offline() {
        let mut config = Config::default();
        config.completion.enabled = false;
        assert!(!build_controller(&config).unwrap().is_remote());
    }

    #[tokio::test]
    async fn test_run_ask_offline() {
        let mut config = Config::default();
        config.completion.enabled = false;
        assert!(ask::run_ask(config, "hello".to_string(), true).await.is_ok());
    }

    #[test]
    fn test_inspect_commands() {
        assert!(inspect::run_validate("what does my plan cover").is_ok());
        assert!(inspect::run_validate("").is_ok());
        assert!(inspect::run_classify("book a doctor").is_ok());
        assert!(inspect::run_doctors().is_ok());
    }
}
