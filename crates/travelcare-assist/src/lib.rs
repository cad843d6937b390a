//! Conversational assistant for TravelCare.
//!
//! Classifies free-text messages into intents, answers from a canned
//! response table, dispatches button actions to effects, and hosts the
//! inline widgets embedded in the chat log.

pub mod dispatch;
pub mod driver;
pub mod error;
pub mod intent;
pub mod response;
pub mod scheduler;
pub mod session;
pub mod types;
pub mod widget;

pub use dispatch::ActionDispatcher;
pub use driver::{SessionDriver, SessionHandle, SessionInput, SessionUpdate};
pub use error::{ChatError, DispatchError, WidgetError};
pub use intent::keywords::{classify, Classification, KeywordClassifier};
pub use response::respond;
pub use scheduler::Scheduler;
pub use session::ChatSession;
pub use types::{
    ActionButton, ActionId, ActionPayload, DispatchResult, Effect, Intent, Message, MessageDraft,
    NavigationState, ResponsePayload, SessionState, WidgetInit, WidgetKind, WidgetRef,
};
pub use widget::{WidgetOutcome, WidgetSession, WidgetSignal, WidgetTimer};
