//! Conversation flow controller
//!
//! [`FlowController::send`] runs one user message through the pipeline:
//! lexical validation, yes/no handling for the most recent affordance,
//! intent classification, and finally the scripted reply for the current
//! [`ConversationState`]. Generic and insurance follow-up replies are
//! produced by the remote completion service when one is configured.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use super::details::IdentityDetails;
use super::doctors::DoctorCatalog;
use super::message::{Affordance, Author, MessageId};
use super::session::{ConversationState, Session};
use crate::config::Config;
use crate::error::{Result, ShipsmartError};
use crate::nlp::lexicon::{AFFIRMATIVE_REPLIES, NEGATIVE_REPLIES};
use crate::nlp::{Intent, IntentClassifier, LexicalValidator, ValidationError};
use crate::prompts::{build_system_prompt, replies, system_prompt};
use crate::providers::{ChatTurn, CompletionClient, DeltaSink, ToolCall, ToolDefinition};

/// Path a user message took through the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Failed lexical validation
    Rejected(ValidationError),
    /// Affirmed a pending doctor booking
    BookingConfirmed,
    /// Affirmed the echoed identity details
    IdentityConfirmed,
    /// Declined a yes/no prompt
    Declined,
    /// Routed by intent
    Intent(Intent),
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected(reason) => write!(f, "rejected ({})", reason),
            Self::BookingConfirmed => write!(f, "booking confirmed"),
            Self::IdentityConfirmed => write!(f, "identity confirmed"),
            Self::Declined => write!(f, "declined"),
            Self::Intent(intent) => write!(f, "{}", intent),
        }
    }
}

/// Result of one [`FlowController::send`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnOutcome {
    pub route: Route,
    /// Assistant message produced for this turn
    pub reply: MessageId,
    /// True when the remote reply failed and an apology was shown instead
    pub remote_failed: bool,
}

/// Drives a [`Session`] through the scripted conversation
pub struct FlowController {
    validator: LexicalValidator,
    classifier: IntentClassifier,
    catalog: DoctorCatalog,
    client: Option<Arc<dyn CompletionClient>>,
    system_prompt: String,
    history_limit: usize,
    max_tool_rounds: usize,
    stream: bool,
}

impl fmt::Debug for FlowController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowController")
            .field("remote", &self.client.is_some())
            .field("history_limit", &self.history_limit)
            .field("max_tool_rounds", &self.max_tool_rounds)
            .field("stream", &self.stream)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct SearchPolicyArgs {
    query: String,
}

impl FlowController {
    /// Create a controller from configuration and an optional remote client
    pub fn new(config: &Config, client: Option<Arc<dyn CompletionClient>>) -> Self {
        Self {
            validator: LexicalValidator::new(),
            classifier: IntentClassifier::new(),
            catalog: DoctorCatalog::default(),
            client,
            system_prompt: build_system_prompt(config.assistant.system_prompt.as_deref()),
            history_limit: config.assistant.history_limit,
            max_tool_rounds: config.completion.max_tool_rounds,
            stream: config.completion.stream,
        }
    }

    /// Create a controller that only uses scripted replies
    pub fn offline() -> Self {
        Self::new(&Config::default(), None)
    }

    /// Create a controller, building the remote client configuration asks for
    ///
    /// # Errors
    ///
    /// Returns `ShipsmartError::MissingCredentials` when completion is
    /// enabled but no API key is available
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = crate::providers::create_completion_client(config)?;
        Ok(Self::new(config, client))
    }

    /// Replace the doctor catalog
    pub fn with_catalog(mut self, catalog: DoctorCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn catalog(&self) -> &DoctorCatalog {
        &self.catalog
    }

    /// True when replies may be augmented by the completion service
    pub fn is_remote(&self) -> bool {
        self.client.is_some()
    }

    /// Append the welcome message to an empty session
    pub fn greet(&self, session: &mut Session) {
        if session.is_empty() {
            session.push_assistant(replies::WELCOME, None);
        }
    }

    /// Start a new session with the welcome message
    ///
    /// # Examples
    ///
    /// ```
    /// use shipsmart::chat::FlowController;
    ///
    /// let session = FlowController::offline().open_session();
    /// assert_eq!(session.len(), 1);
    /// assert!(!session.messages()[0].is_user());
    /// ```
    pub fn open_session(&self) -> Session {
        let mut session = Session::new();
        self.greet(&mut session);
        tracing::info!("Opened chat session {}", session.id());
        session
    }

    /// Process one user message and append the assistant's reply
    ///
    /// Rejected input is answered with an error message asking the user to
    /// rephrase; empty input leaves no user message behind. Remote failures
    /// are reported through [`TurnOutcome::remote_failed`], not as errors.
    ///
    /// # Errors
    ///
    /// Returns `ShipsmartError::Session` only if the session's streaming
    /// bookkeeping is violated
    pub async fn send(&self, session: &mut Session, text: &str) -> Result<TurnOutcome> {
        if let Some(reason) = self.validator.validate(text).reason {
            return Ok(Self::reject(session, text, reason));
        }

        let text = text.trim();
        // Affordance the user is answering, captured before their message lands
        let answering = session.last_assistant_message().and_then(|m| m.controls());
        session.push_user(text);
        session.record_turn();

        if let Some(outcome) = Self::answer_yes_no(session, text, answering) {
            return Ok(outcome);
        }

        let intent = self.classifier.classify(text);
        tracing::debug!("Session {}: intent {} in {}", session.id(), intent, session.state());

        let (reply, remote_failed) = match intent {
            Intent::Greeting => {
                Self::leave_fresh(session);
                (session.push_assistant(replies::GREETING, None), false)
            }
            Intent::Appointment => {
                Self::leave_fresh(session);
                let id =
                    session.push_assistant(replies::DOCTOR_SELECTION, Some(Affordance::DoctorList));
                (id, false)
            }
            Intent::Insurance => {
                Self::leave_fresh(session);
                if session.has_shown_insurance_info() {
                    self.respond(session, replies::INSURANCE_FOLLOW_UP).await?
                } else {
                    session.mark_insurance_info_shown();
                    let id =
                        session.push_assistant(replies::INSURANCE_SUMMARY, Some(Affordance::YesNo));
                    (id, false)
                }
            }
            Intent::Other => match session.state() {
                ConversationState::Fresh => (Self::collect_identity(session, text), false),
                ConversationState::AwaitingIdentity
                    if !IdentityDetails::extract(text).is_empty() =>
                {
                    (Self::collect_identity(session, text), false)
                }
                state => {
                    // Nothing to collect; the identity request lapses
                    if state == ConversationState::AwaitingIdentity {
                        session.set_state(ConversationState::Idle);
                    }
                    self.respond(session, replies::GENERIC_ACKNOWLEDGMENT).await?
                }
            },
        };

        Ok(TurnOutcome {
            route: Route::Intent(intent),
            reply,
            remote_failed,
        })
    }

    /// Offer a booking with the doctor at `index` in the catalog
    ///
    /// # Errors
    ///
    /// Returns `ShipsmartError::Session` if `index` is out of range
    pub fn select_doctor(&self, session: &mut Session, index: usize) -> Result<MessageId> {
        let doctor = self.catalog.get(index).cloned().ok_or_else(|| {
            ShipsmartError::Session(format!(
                "no doctor at position {} (catalog has {})",
                index,
                self.catalog.len()
            ))
        })?;

        tracing::debug!("Session {}: selected {}", session.id(), doctor.name);
        let id = session.push_assistant(replies::booking_request(&doctor), Some(Affordance::YesNo));
        session.set_pending_confirmation(doctor);
        Ok(id)
    }

    fn reject(session: &mut Session, text: &str, reason: ValidationError) -> TurnOutcome {
        tracing::debug!("Session {}: input rejected: {}", session.id(), reason);
        if reason != ValidationError::EmptyInput {
            session.push_user(text.trim());
        }
        TurnOutcome {
            route: Route::Rejected(reason),
            reply: session.push_error(reason.rephrase_prompt()),
            remote_failed: false,
        }
    }

    fn leave_fresh(session: &mut Session) {
        if session.state() == ConversationState::Fresh {
            session.set_state(ConversationState::Idle);
        }
    }

    fn answer_yes_no(
        session: &mut Session,
        text: &str,
        answering: Option<Affordance>,
    ) -> Option<TurnOutcome> {
        let reply = text
            .trim_end_matches(|c: char| c.is_ascii_punctuation())
            .trim()
            .to_lowercase();
        let outcome = |route, reply| TurnOutcome {
            route,
            reply,
            remote_failed: false,
        };

        if AFFIRMATIVE_REPLIES.contains(&reply.as_str()) {
            if let Some(pending) = session.take_pending_confirmation() {
                let id = session.push_assistant(replies::booking_confirmed(&pending.doctor), None);
                let appointment = session.record_appointment(pending.doctor);
                tracing::info!("Booked appointment with {}", appointment.doctor.name);
                Self::leave_fresh(session);
                return Some(outcome(Route::BookingConfirmed, id));
            }
            if session.state() == ConversationState::ConfirmingIdentity {
                let id = session.push_assistant(replies::IDENTITY_CONFIRMED, None);
                session.set_state(ConversationState::Idle);
                return Some(outcome(Route::IdentityConfirmed, id));
            }
        }

        if NEGATIVE_REPLIES.contains(&reply.as_str()) && answering == Some(Affordance::YesNo) {
            session.take_pending_confirmation();
            match session.state() {
                ConversationState::ConfirmingIdentity => {
                    *session.identity_mut() = IdentityDetails::default();
                    session.set_state(ConversationState::Idle);
                }
                ConversationState::Fresh => session.set_state(ConversationState::Idle),
                _ => {}
            }
            let id = session.push_assistant(replies::CLOSING_COURTESY, None);
            return Some(outcome(Route::Declined, id));
        }

        None
    }

    fn collect_identity(session: &mut Session, text: &str) -> MessageId {
        let found = IdentityDetails::extract(text);
        let found_any = !found.is_empty();
        let first_request = session.state() == ConversationState::Fresh;
        session.identity_mut().merge(found);

        let identity = session.identity().clone();
        if identity.is_complete() {
            let id =
                session.push_assistant(replies::identity_confirmation(&identity), Some(Affordance::YesNo));
            session.set_state(ConversationState::ConfirmingIdentity);
            return id;
        }

        session.set_state(ConversationState::AwaitingIdentity);
        if first_request && identity.is_empty() {
            session.push_assistant(replies::IDENTITY_REQUEST, None)
        } else {
            session.push_assistant(
                replies::identity_missing(&identity.missing(), found_any),
                None,
            )
        }
    }

    /// Produce a reply, asking the completion service when one is configured
    async fn respond(&self, session: &mut Session, scripted: &str) -> Result<(MessageId, bool)> {
        let Some(client) = &self.client else {
            return Ok((session.push_assistant(scripted, None), false));
        };

        let turns = self.history_turns(session);
        let placeholder = session.begin_streaming()?;
        session.set_awaiting_reply(true);

        let result = {
            let mut fill = |delta: &str| -> Result<()> { session.append_stream(placeholder, delta) };
            self.complete_with_tools(client.as_ref(), turns, &mut fill).await
        };
        let settled = match result {
            Ok(()) => session
                .finish_streaming(placeholder)
                .map(|()| (placeholder, false)),
            Err(error) => {
                tracing::warn!("Remote reply failed: {}", error);
                session
                    .fail_streaming(placeholder, replies::remote_failure(&error))
                    .map(|id| (id, true))
            }
        };

        session.set_awaiting_reply(false);
        settled
    }

    /// System prompt plus the most recent committed messages
    fn history_turns(&self, session: &Session) -> Vec<ChatTurn> {
        let committed: Vec<_> = session
            .messages()
            .iter()
            .filter(|m| !m.is_error() && !m.is_streaming())
            .collect();
        let start = committed.len().saturating_sub(self.history_limit);

        std::iter::once(ChatTurn::system(self.system_prompt.as_str()))
            .chain(committed[start..].iter().map(|m| match m.author() {
                Author::User => ChatTurn::user(m.content()),
                Author::Assistant => ChatTurn::assistant(m.content()),
            }))
            .collect()
    }

    /// Run completion rounds until the model answers with text
    ///
    /// Reply text reaches `on_delta` as it streams in, or all at once when
    /// streaming is off.
    async fn complete_with_tools(
        &self,
        client: &dyn CompletionClient,
        mut turns: Vec<ChatTurn>,
        on_delta: &mut DeltaSink<'_>,
    ) -> Result<()> {
        let tools = [ToolDefinition::search_policy()];

        for round in 0..=self.max_tool_rounds {
            let completion = if self.stream {
                client
                    .complete_streaming(&turns, &tools, &mut *on_delta)
                    .await?
            } else {
                client.complete(&turns, &tools).await?
            };
            if let Some(usage) = completion.usage {
                tracing::debug!(
                    "Completion usage: prompt={}, completion={}",
                    usage.prompt_tokens,
                    usage.completion_tokens
                );
            }

            if completion.tool_calls.is_empty() {
                let content = completion.content.trim();
                if content.is_empty() {
                    return Err(
                        ShipsmartError::MalformedResponse("reply has no content".to_string()).into(),
                    );
                }
                if !self.stream {
                    on_delta(content)?;
                }
                return Ok(());
            }

            tracing::debug!(
                "Tool round {}: {} call(s)",
                round + 1,
                completion.tool_calls.len()
            );
            let results: Vec<ChatTurn> = completion
                .tool_calls
                .iter()
                .map(|call| ChatTurn::tool_result(call.id.as_str(), run_tool(call)))
                .collect();
            turns.push(ChatTurn::assistant_with_tools(completion.tool_calls));
            turns.extend(results);
        }

        Err(ShipsmartError::MalformedResponse(format!(
            "no answer after {} tool rounds",
            self.max_tool_rounds
        ))
        .into())
    }
}

fn run_tool(call: &ToolCall) -> String {
    match call.function.name.as_str() {
        "search_policy" => match serde_json::from_str::<SearchPolicyArgs>(&call.function.arguments) {
            Ok(args) => system_prompt::search_policy(&args.query),
            Err(e) => format!("Invalid search_policy arguments: {}", e),
        },
        other => {
            tracing::warn!("Model requested unknown tool: {}", other);
            format!("Unknown tool: {}", other)
        }
    }
}
