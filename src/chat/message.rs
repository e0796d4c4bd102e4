//! Chat message records
//!
//! A [`Message`] is frozen once created, except for the content of an
//! assistant placeholder while it is streaming. Construction and mutation go
//! through [`crate::chat::Session`], which assigns ids and timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, ShipsmartError};

/// Unique message identifier
pub type MessageId = Uuid;

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Assistant,
}

/// Interactive control attached to an assistant message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Affordance {
    /// Yes / no confirmation buttons
    YesNo,
    /// List of bookable doctors
    DoctorList,
}

/// One entry of a chat session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    content: String,
    author: Author,
    timestamp: DateTime<Utc>,
    is_error: bool,
    is_streaming: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    controls: Option<Affordance>,
}

impl Message {
    pub(crate) fn new(author: Author, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            author,
            timestamp,
            is_error: false,
            is_streaming: false,
            controls: None,
        }
    }

    pub(crate) fn error(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            is_error: true,
            ..Self::new(Author::Assistant, content, timestamp)
        }
    }

    pub(crate) fn placeholder(timestamp: DateTime<Utc>) -> Self {
        Self {
            is_streaming: true,
            ..Self::new(Author::Assistant, String::new(), timestamp)
        }
    }

    pub(crate) fn with_controls(mut self, controls: Option<Affordance>) -> Self {
        self.controls = controls;
        self
    }

    /// Append streamed text to a placeholder
    pub(crate) fn push_content(&mut self, chunk: &str) -> Result<()> {
        if !self.is_streaming {
            return Err(ShipsmartError::Session(format!(
                "message {} is not streaming; content is frozen",
                self.id
            ))
            .into());
        }
        self.content.push_str(chunk);
        Ok(())
    }

    pub(crate) fn finish_streaming(&mut self) {
        self.is_streaming = false;
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn author(&self) -> Author {
        self.author
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }

    pub fn is_streaming(&self) -> bool {
        self.is_streaming
    }

    pub fn controls(&self) -> Option<Affordance> {
        self.controls
    }

    pub fn is_user(&self) -> bool {
        self.author == Author::User
    }
}
