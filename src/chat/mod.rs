//! Chat session, messages, and the scripted conversation flow
//!
//! - `message`: message records and interactive affordances
//! - `session`: the append-only session store and its change events
//! - `flow`: the controller that turns user text into assistant replies
//! - `doctors`: the static doctor catalog
//! - `details`: identity fields collected from chat text

pub mod details;
pub mod doctors;
pub mod flow;
pub mod message;
pub mod session;

pub use details::IdentityDetails;
pub use doctors::{Doctor, DoctorCatalog};
pub use flow::{FlowController, Route, TurnOutcome};
pub use message::{Affordance, Author, Message, MessageId};
pub use session::{Appointment, ConversationState, PendingConfirmation, Session, SessionEvent};
