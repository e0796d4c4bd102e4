use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::TempDir;

use shipsmart::error::{Result, ShipsmartError};
use shipsmart::providers::{ChatTurn, Completion, CompletionClient, ToolDefinition};

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Completion client answering from a queue of canned results
#[allow(dead_code)]
#[derive(Default)]
pub struct CannedClient {
    replies: Mutex<VecDeque<std::result::Result<String, ShipsmartError>>>,
    pub calls: Mutex<usize>,
}

#[allow(dead_code)]
impl CannedClient {
    pub fn new(replies: Vec<std::result::Result<String, ShipsmartError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().expect("calls lock")
    }
}

#[async_trait]
impl CompletionClient for CannedClient {
    async fn complete(&self, _turns: &[ChatTurn], _tools: &[ToolDefinition]) -> Result<Completion> {
        *self.calls.lock().expect("calls lock") += 1;
        match self.replies.lock().expect("replies lock").pop_front() {
            Some(Ok(text)) => Ok(Completion::text(text)),
            Some(Err(error)) => Err(error.into()),
            None => Err(ShipsmartError::RemoteNetwork("no canned reply".to_string()).into()),
        }
    }
}
