//! Completion client trait and wire-neutral request/response types
//!
//! This module defines the [`CompletionClient`] trait that remote
//! chat-completion backends implement, along with the conversation turn,
//! tool and usage types the flow controller exchanges with them.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Speaker of a conversation turn sent to the completion service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
            Self::Tool => write!(f, "tool"),
        }
    }
}

/// One turn of the conversation as the completion service sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Speaker of the turn
    pub role: Role,
    /// Text of the turn
    #[serde(default)]
    pub content: String,
    /// Tool calls requested by the assistant
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Tool call this turn answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatTurn {
    fn with_role(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Creates a system turn
    ///
    /// # Examples
    ///
    /// ```
    /// use shipsmart::providers::{ChatTurn, Role};
    ///
    /// let turn = ChatTurn::system("You are SHIPSmart");
    /// assert_eq!(turn.role, Role::System);
    /// ```
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content)
    }

    /// Creates an assistant turn that only requests tools
    pub fn assistant_with_tools(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::with_role(Role::Assistant, String::new())
        }
    }

    /// Creates a tool result turn
    ///
    /// # Examples
    ///
    /// ```
    /// use shipsmart::providers::ChatTurn;
    ///
    /// let turn = ChatTurn::tool_result("call_1", "Anthem Nurseline: 1-877-351-3457");
    /// assert_eq!(turn.tool_call_id.as_deref(), Some("call_1"));
    /// ```
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::with_role(Role::Tool, content)
        }
    }
}

/// Function call information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Name of the function to call
    pub name: String,
    /// Arguments as a JSON string
    pub arguments: String,
}

/// Tool call requested by the assistant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "default_tool_type")]
    pub kind: String,
    pub function: FunctionCall,
}

fn default_tool_type() -> String {
    "function".to_string()
}

impl ToolCall {
    /// Function tool call
    pub fn function(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: default_tool_type(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

/// Function tool offered to the completion service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// The policy lookup tool answered locally from the plan facts
    pub fn search_policy() -> Self {
        Self {
            name: "search_policy".to_string(),
            description: "Search the UC SHIP policy for coverage, contact and location details"
                .to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "What to look up in the policy"
                    }
                },
                "required": ["query"]
            }),
        }
    }
}

/// Token usage reported by the service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

impl TokenUsage {
    pub fn new(prompt_tokens: usize, completion_tokens: usize) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Reply from the completion service
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Assistant text; may be empty when only tools were requested
    pub content: String,
    /// Tools the assistant asked to run before answering
    pub tool_calls: Vec<ToolCall>,
    pub usage: Option<TokenUsage>,
}

impl Completion {
    /// Completion carrying text only
    ///
    /// # Examples
    ///
    /// ```
    /// use shipsmart::providers::Completion;
    ///
    /// let completion = Completion::text("Your plan covers urgent care.");
    /// assert!(completion.tool_calls.is_empty());
    /// ```
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
            usage: None,
        }
    }

    /// Completion requesting tools
    pub fn tools(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: String::new(),
            tool_calls,
            usage: None,
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }
}

/// Receiver for incremental reply text
///
/// Returning an error aborts the request.
pub type DeltaSink<'a> = dyn FnMut(&str) -> Result<()> + Send + 'a;

/// Remote chat-completion backend
///
/// # Examples
///
/// ```no_run
/// use shipsmart::providers::{ChatTurn, Completion, CompletionClient, ToolDefinition};
/// use shipsmart::error::Result;
/// use async_trait::async_trait;
///
/// struct Echo;
///
/// #[async_trait]
/// impl CompletionClient for Echo {
///     async fn complete(&self, turns: &[ChatTurn], _tools: &[ToolDefinition]) -> Result<Completion> {
///         let last = turns.last().map(|t| t.content.clone()).unwrap_or_default();
///         Ok(Completion::text(last))
///     }
/// }
/// ```
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Complete a conversation
    ///
    /// # Errors
    ///
    /// Returns a remote `ShipsmartError` variant when the call fails or the
    /// reply cannot be understood
    async fn complete(&self, turns: &[ChatTurn], tools: &[ToolDefinition]) -> Result<Completion>;

    /// Complete a conversation, passing reply text to `on_delta` as it arrives
    ///
    /// The returned completion holds the full text. Backends without
    /// incremental delivery hand the whole text over in one delta.
    ///
    /// # Errors
    ///
    /// Same as [`CompletionClient::complete`], plus any error `on_delta`
    /// returns
    async fn complete_streaming(
        &self,
        turns: &[ChatTurn],
        tools: &[ToolDefinition],
        on_delta: &mut DeltaSink<'_>,
    ) -> Result<Completion> {
        let completion = self.complete(turns, tools).await?;
        if completion.tool_calls.is_empty() && !completion.content.is_empty() {
            on_delta(&completion.content)?;
        }
        Ok(completion)
    }

    /// Model identifier used for requests, for display
    fn model(&self) -> String {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_serialization_skips_empty_fields() {
        let json = serde_json::to_value(ChatTurn::user("hi")).unwrap();
        assert_eq!(json["role"], "user");
        assert!(json.get("tool_calls").is_none());
        assert!(json.get("tool_call_id").is_none());
    }

    #[test]
    fn test_tool_result_turn() {
        let turn = ChatTurn::tool_result("call_9", "facts");
        assert_eq!(turn.role, Role::Tool);
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["tool_call_id"], "call_9");
    }

    #[test]
    fn test_search_policy_schema() {
        let tool = ToolDefinition::search_policy();
        assert_eq!(tool.name, "search_policy");
        assert_eq!(tool.parameters["required"][0], "query");
    }

    #[test]
    fn test_token_usage_total() {
        assert_eq!(TokenUsage::new(10, 5).total_tokens, 15);
    }

    struct Fixed(Completion);

    #[async_trait]
    impl CompletionClient for Fixed {
        async fn complete(&self, _turns: &[ChatTurn], _tools: &[ToolDefinition]) -> Result<Completion> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_default_streaming_delivers_whole_text() {
        let client = Fixed(Completion::text("Dental is covered."));
        let mut deltas = Vec::new();
        let completion = client
            .complete_streaming(&[], &[], &mut |delta: &str| -> Result<()> {
                deltas.push(delta.to_string());
                Ok(())
            })
            .await
            .unwrap();
        assert_eq!(deltas, vec!["Dental is covered."]);
        assert_eq!(completion.content, "Dental is covered.");
    }

    #[tokio::test]
    async fn test_default_streaming_skips_tool_requests() {
        let call = ToolCall::function("c", "search_policy", "{}");
        let client = Fixed(Completion::tools(vec![call]));
        let mut calls = 0;
        client
            .complete_streaming(&[], &[], &mut |_: &str| -> Result<()> {
                calls += 1;
                Ok(())
            })
            .await
            .unwrap();
        assert_eq!(calls, 0);
    }
}
