//! Cerebras chat-completion client
//!
//! Speaks the OpenAI-compatible `POST /v1/chat/completions` API, either as
//! a single JSON reply or as a server-sent event stream of deltas. Tool
//! calls are passed through to the caller.

use crate::config::CompletionConfig;
use crate::error::{Result, ShipsmartError};
use crate::providers::{
    ChatTurn, Completion, CompletionClient, DeltaSink, TokenUsage, ToolCall, ToolDefinition,
};

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cerebras API client
///
/// # Examples
///
/// ```no_run
/// use shipsmart::config::CompletionConfig;
/// use shipsmart::providers::{CerebrasClient, ChatTurn, CompletionClient};
///
/// # async fn example() -> shipsmart::error::Result<()> {
/// let client = CerebrasClient::from_env(CompletionConfig::default())?;
/// let completion = client.complete(&[ChatTurn::user("What is UC SHIP?")], &[]).await?;
/// println!("{}", completion.content);
/// # Ok(())
/// # }
/// ```
pub struct CerebrasClient {
    client: Client,
    config: CompletionConfig,
    api_key: String,
}

impl std::fmt::Debug for CerebrasClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CerebrasClient")
            .field("api_base", &self.config.api_base)
            .field("model", &self.config.model)
            .finish_non_exhaustive()
    }
}

/// Request body for /v1/chat/completions
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ApiTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parallel_tool_calls: Option<bool>,
    stream: bool,
    max_completion_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
struct ApiTool<'a> {
    r#type: &'static str,
    function: &'a ToolDefinition,
}

/// Response body for /v1/chat/completions
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: Option<ApiMessage>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    content: Option<String>,
    // Some servers send an explicit null
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
}

/// One `data:` payload of a streamed completion
#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Option<StreamDelta>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCallDelta>>,
}

/// Fragment of a tool call; fragments sharing an index are concatenated
#[derive(Debug, Deserialize)]
struct ToolCallDelta {
    #[serde(default)]
    index: usize,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    function: Option<FunctionDelta>,
}

#[derive(Debug, Deserialize)]
struct FunctionDelta {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}

/// Tool calls a streamed reply may open
const MAX_STREAMED_TOOL_CALLS: usize = 16;

/// Reassembles a completion from streamed events
#[derive(Debug, Default)]
struct StreamAccumulator {
    content: String,
    tool_calls: Vec<ToolCall>,
    usage: Option<TokenUsage>,
    finish_reason: Option<String>,
    done: bool,
}

impl StreamAccumulator {
    /// Apply one event block, returning the reply text it adds
    fn apply_event(&mut self, block: &str) -> Result<Option<String>> {
        if self.done {
            return Ok(None);
        }

        let data: Vec<&str> = block
            .lines()
            .filter_map(|line| line.strip_prefix("data:"))
            .map(str::trim)
            .collect();
        if data.is_empty() {
            return Ok(None);
        }
        let data = data.join("\n");
        if data == "[DONE]" {
            self.done = true;
            return Ok(None);
        }

        let chunk: StreamChunk = serde_json::from_str(&data).map_err(|e| {
            tracing::error!("Failed to parse stream event: {}", e);
            ShipsmartError::RemoteDecoding(e.to_string())
        })?;

        if let Some(usage) = chunk.usage {
            self.usage = Some(TokenUsage::new(usage.prompt_tokens, usage.completion_tokens));
        }

        let Some(choice) = chunk.choices.into_iter().next() else {
            return Ok(None);
        };
        if choice.finish_reason.is_some() {
            self.finish_reason = choice.finish_reason;
        }
        let Some(delta) = choice.delta else {
            return Ok(None);
        };

        for call in delta.tool_calls.unwrap_or_default() {
            self.merge_tool_call(call)?;
        }

        Ok(delta.content.filter(|text| !text.is_empty()).map(|text| {
            self.content.push_str(&text);
            text
        }))
    }

    fn merge_tool_call(&mut self, delta: ToolCallDelta) -> Result<()> {
        if delta.index >= MAX_STREAMED_TOOL_CALLS {
            return Err(ShipsmartError::MalformedResponse(format!(
                "tool call index {} out of range",
                delta.index
            ))
            .into());
        }
        while self.tool_calls.len() <= delta.index {
            self.tool_calls.push(ToolCall::function("", "", ""));
        }

        let call = &mut self.tool_calls[delta.index];
        if let Some(id) = delta.id {
            call.id = id;
        }
        if let Some(function) = delta.function {
            if let Some(name) = function.name {
                call.function.name.push_str(&name);
            }
            if let Some(arguments) = function.arguments {
                call.function.arguments.push_str(&arguments);
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<Completion> {
        tracing::debug!(
            "Cerebras stream: finish_reason={:?}, tool_calls={}",
            self.finish_reason,
            self.tool_calls.len()
        );

        let completion = if !self.tool_calls.is_empty() {
            Completion {
                content: self.content,
                ..Completion::tools(self.tool_calls)
            }
        } else if self.content.is_empty() {
            return Err(ShipsmartError::MalformedResponse(
                "stream ended without content or tool calls".to_string(),
            )
            .into());
        } else {
            Completion::text(self.content)
        };

        Ok(match self.usage {
            Some(usage) => completion.with_usage(usage),
            None => completion,
        })
    }
}

/// Split complete event blocks (terminated by a blank line) off the buffer
fn drain_events(buffer: &mut Vec<u8>) -> Vec<String> {
    let mut events = Vec::new();
    while let Some(end) = buffer.windows(2).position(|pair| pair == b"\n\n") {
        let block: Vec<u8> = buffer.drain(..end + 2).collect();
        events.push(String::from_utf8_lossy(&block[..end]).into_owned());
    }
    events
}

impl CerebrasClient {
    /// Create a client with an explicit API key
    ///
    /// # Errors
    ///
    /// Returns error if the key is blank or the HTTP client cannot be built
    pub fn new(config: CompletionConfig, api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ShipsmartError::MissingCredentials(config.api_key_env.clone()).into());
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .user_agent(concat!("shipsmart/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ShipsmartError::RemoteNetwork(format!("Failed to create HTTP client: {}", e))
            })?;

        tracing::info!(
            "Initialized Cerebras client: api_base={}, model={}",
            config.api_base,
            config.model
        );

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// Create a client reading the key from the variable named by `api_key_env`
    ///
    /// # Errors
    ///
    /// Returns `ShipsmartError::MissingCredentials` if the variable is unset
    pub fn from_env(config: CompletionConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| ShipsmartError::MissingCredentials(config.api_key_env.clone()))?;
        Self::new(config, api_key)
    }

    pub fn api_base(&self) -> &str {
        &self.config.api_base
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.api_base.trim_end_matches('/')
        )
    }

    fn request<'a>(
        &'a self,
        turns: &'a [ChatTurn],
        tools: &'a [ToolDefinition],
        stream: bool,
    ) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.model,
            messages: turns,
            tools: tools
                .iter()
                .map(|function| ApiTool {
                    r#type: "function",
                    function,
                })
                .collect(),
            parallel_tool_calls: (!tools.is_empty()).then_some(false),
            stream,
            max_completion_tokens: self.config.max_completion_tokens,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
        }
    }

    /// POST a request and map non-success statuses to remote errors
    async fn post(&self, request: &ChatRequest<'_>) -> Result<Response> {
        tracing::info!(
            "Sending completion request: {} turns, {} tools, stream={}",
            request.messages.len(),
            request.tools.len(),
            request.stream
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Completion request failed: {}", e);
                ShipsmartError::RemoteNetwork(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Completion service returned {}: {}", status, error_text);
            return Err(status_error(status).into());
        }
        Ok(response)
    }

    async fn read_json(response: Response) -> Result<Completion> {
        let body = response.text().await.map_err(|e| {
            tracing::error!("Failed to read completion body: {}", e);
            ShipsmartError::RemoteNetwork(e.to_string())
        })?;

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse completion response: {}", e);
            ShipsmartError::RemoteDecoding(e.to_string())
        })?;

        into_completion(parsed)
    }
}

/// Map a non-success status to the remote error it stands for
fn status_error(status: StatusCode) -> ShipsmartError {
    match status {
        StatusCode::UNAUTHORIZED => ShipsmartError::RemoteUnauthorized,
        StatusCode::TOO_MANY_REQUESTS => ShipsmartError::RemoteRateLimited,
        other => ShipsmartError::RemoteServerError(other.as_u16()),
    }
}

fn into_completion(response: ChatResponse) -> Result<Completion> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ShipsmartError::MalformedResponse("response has no choices".to_string()))?;

    let message = choice.message.ok_or_else(|| {
        ShipsmartError::MalformedResponse("first choice has no message".to_string())
    })?;

    let tool_calls = message.tool_calls.unwrap_or_default();
    tracing::debug!(
        "Cerebras choice: finish_reason={:?}, tool_calls={}",
        choice.finish_reason,
        tool_calls.len()
    );

    let completion = if tool_calls.is_empty() {
        let content = message.content.ok_or_else(|| {
            ShipsmartError::MalformedResponse("message has neither content nor tool calls".into())
        })?;
        Completion::text(content)
    } else {
        Completion::tools(tool_calls)
    };

    Ok(match response.usage {
        Some(usage) => completion.with_usage(TokenUsage::new(
            usage.prompt_tokens,
            usage.completion_tokens,
        )),
        None => completion,
    })
}

#[async_trait]
impl CompletionClient for CerebrasClient {
    async fn complete(&self, turns: &[ChatTurn], tools: &[ToolDefinition]) -> Result<Completion> {
        let response = self.post(&self.request(turns, tools, false)).await?;
        Self::read_json(response).await
    }

    async fn complete_streaming(
        &self,
        turns: &[ChatTurn],
        tools: &[ToolDefinition],
        on_delta: &mut DeltaSink<'_>,
    ) -> Result<Completion> {
        let response = self.post(&self.request(turns, tools, true)).await?;

        let is_event_stream = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map_or(false, |value| value.contains("text/event-stream"));
        if !is_event_stream {
            tracing::debug!("Streaming request answered with a plain body");
            let completion = Self::read_json(response).await?;
            if completion.tool_calls.is_empty() {
                on_delta(&completion.content)?;
            }
            return Ok(completion);
        }

        let mut byte_stream = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::new();
        let mut accumulator = StreamAccumulator::default();

        while let Some(chunk) = byte_stream.next().await {
            let chunk = chunk.map_err(|e| {
                tracing::error!("Completion stream interrupted: {}", e);
                ShipsmartError::RemoteNetwork(e.to_string())
            })?;
            buffer.extend(chunk.iter().filter(|&&byte| byte != b'\r'));

            for event in drain_events(&mut buffer) {
                if let Some(text) = accumulator.apply_event(&event)? {
                    on_delta(&text)?;
                }
            }
            if accumulator.done {
                break;
            }
        }

        if !buffer.is_empty() {
            let rest = String::from_utf8_lossy(&buffer).into_owned();
            if let Some(text) = accumulator.apply_event(&rest)? {
                on_delta(&text)?;
            }
        }

        accumulator.finish()
    }

    fn model(&self) -> String {
        self.config.model.clone()
    }
}
