//! Test utilities for SHIPSmart
//!
//! This module provides a scripted completion client, temporary config
//! files, and assertion helpers shared by unit tests.

use crate::error::{Result, ShipsmartError};
use crate::providers::{ChatTurn, Completion, CompletionClient, DeltaSink, ToolDefinition};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Scripted reply for [`ScriptedCompletionClient`]
pub enum Scripted {
    Reply(Completion),
    Fail(ShipsmartError),
    /// Text delivered in several deltas when streamed
    Chunks(Vec<String>),
    /// Deltas followed by a failure
    ChunksThenFail(Vec<String>, ShipsmartError),
}

/// Completion client that returns queued replies and records requests
///
/// When the queue runs dry it fails with `MalformedResponse`.
#[derive(Clone, Default)]
pub struct ScriptedCompletionClient {
    replies: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<Vec<ChatTurn>>>>,
}

impl ScriptedCompletionClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a text reply
    pub fn reply(self, content: &str) -> Self {
        self.push(Scripted::Reply(Completion::text(content)))
    }

    /// Queue an arbitrary completion
    pub fn completion(self, completion: Completion) -> Self {
        self.push(Scripted::Reply(completion))
    }

    /// Queue a failure
    pub fn fail(self, error: ShipsmartError) -> Self {
        self.push(Scripted::Fail(error))
    }

    /// Queue a reply streamed as `chunks`
    pub fn chunks(self, chunks: &[&str]) -> Self {
        self.push(Scripted::Chunks(to_owned(chunks)))
    }

    /// Queue a stream that fails after delivering `chunks`
    pub fn chunks_then_fail(self, chunks: &[&str], error: ShipsmartError) -> Self {
        self.push(Scripted::ChunksThenFail(to_owned(chunks), error))
    }

    fn push(self, scripted: Scripted) -> Self {
        self.replies
            .lock()
            .expect("scripted replies poisoned")
            .push_back(scripted);
        self
    }

    /// Conversations sent so far, one entry per `complete` call
    pub fn requests(&self) -> Vec<Vec<ChatTurn>> {
        self.requests.lock().expect("requests poisoned").clone()
    }
}

impl ScriptedCompletionClient {
    fn next(&self, turns: &[ChatTurn]) -> Option<Scripted> {
        self.requests
            .lock()
            .expect("requests poisoned")
            .push(turns.to_vec());
        self.replies
            .lock()
            .expect("scripted replies poisoned")
            .pop_front()
    }
}

fn to_owned(chunks: &[&str]) -> Vec<String> {
    chunks.iter().map(|chunk| chunk.to_string()).collect()
}

fn exhausted() -> anyhow::Error {
    ShipsmartError::MalformedResponse("no scripted reply".to_string()).into()
}

#[async_trait]
impl CompletionClient for ScriptedCompletionClient {
    async fn complete(&self, turns: &[ChatTurn], _tools: &[ToolDefinition]) -> Result<Completion> {
        match self.next(turns) {
            Some(Scripted::Reply(completion)) => Ok(completion),
            Some(Scripted::Chunks(chunks)) => Ok(Completion::text(chunks.concat())),
            Some(Scripted::Fail(error)) | Some(Scripted::ChunksThenFail(_, error)) => {
                Err(error.into())
            }
            None => Err(exhausted()),
        }
    }

    async fn complete_streaming(
        &self,
        turns: &[ChatTurn],
        _tools: &[ToolDefinition],
        on_delta: &mut DeltaSink<'_>,
    ) -> Result<Completion> {
        match self.next(turns) {
            Some(Scripted::Reply(completion)) => {
                if completion.tool_calls.is_empty() && !completion.content.is_empty() {
                    on_delta(&completion.content)?;
                }
                Ok(completion)
            }
            Some(Scripted::Chunks(chunks)) => {
                for chunk in &chunks {
                    on_delta(chunk)?;
                }
                Ok(Completion::text(chunks.concat()))
            }
            Some(Scripted::ChunksThenFail(chunks, error)) => {
                for chunk in &chunks {
                    on_delta(chunk)?;
                }
                Err(error.into())
            }
            Some(Scripted::Fail(error)) => Err(error.into()),
            None => Err(exhausted()),
        }
    }

    fn model(&self) -> String {
        "scripted".to_string()
    }
}

/// Write a config file into a fresh temporary directory
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temporary directory");
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, contents).expect("Failed to write config file");
    (dir, path)
}

/// Assert that an error contains the expected message
pub fn assert_error_contains(err: &anyhow::Error, expected: &str) {
    let message = err.to_string();
    assert!(
        message.contains(expected),
        "Error message '{}' does not contain '{}'",
        message,
        expected
    );
}
