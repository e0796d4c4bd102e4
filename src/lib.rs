//! SHIPSmart - UC SHIP insurance assistant library
//!
//! This library provides the message pipeline of a student health insurance
//! chat assistant: input validation, intent routing, a scripted conversation
//! flow with interactive affordances, and an optional remote completion
//! client that augments scripted replies.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `nlp`: Lexical validation, part-of-speech tagging, and intent classification
//! - `chat`: Messages, the session store, the doctor catalog, and the flow controller
//! - `providers`: Remote chat-completion abstraction and the Cerebras client
//! - `prompts`: System prompt, policy facts, and scripted replies
//! - `identity`: Signed-in user boundary
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use shipsmart::chat::FlowController;
//! use shipsmart::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let controller = FlowController::from_config(&config)?;
//!     let mut session = controller.open_session();
//!     controller.send(&mut session, "what does my plan cover").await?;
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod identity;
pub mod nlp;
pub mod prompts;
pub mod providers;

// Re-export commonly used types
pub use chat::{FlowController, Session};
pub use config::Config;
pub use error::{Result, ShipsmartError};

#[cfg(test)]
pub mod test_utils;
