//! Provider module for SHIPSmart
//!
//! This module contains the remote completion client abstraction and the
//! Cerebras implementation.

pub mod base;
pub mod cerebras;

pub use base::{
    ChatTurn, Completion, CompletionClient, DeltaSink, FunctionCall, Role, TokenUsage, ToolCall,
    ToolDefinition,
};
pub use cerebras::CerebrasClient;

use crate::config::Config;
use crate::error::Result;
use std::sync::Arc;

/// Create the completion client described by configuration
///
/// Returns `Ok(None)` when remote completion is disabled, so callers fall
/// back to scripted replies.
///
/// # Errors
///
/// Returns `ShipsmartError::MissingCredentials` when completion is enabled
/// but the key variable is unset, or an error if the HTTP client cannot be
/// built
///
/// # Examples
///
/// ```
/// use shipsmart::config::Config;
/// use shipsmart::providers::create_completion_client;
///
/// let mut config = Config::default();
/// config.completion.enabled = false;
/// assert!(create_completion_client(&config).unwrap().is_none());
/// ```
pub fn create_completion_client(config: &Config) -> Result<Option<Arc<dyn CompletionClient>>> {
    if !config.completion.enabled {
        tracing::debug!("Remote completion disabled");
        return Ok(None);
    }
    let client = CerebrasClient::from_env(config.completion.clone())?;
    Ok(Some(Arc::new(client)))
}
