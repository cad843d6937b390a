//! Core types and value objects for the assistant.
//!
//! Defines intents, action buttons, messages, widget references and the
//! effects produced by dispatching an action.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use travelcare_core::catalog::ProviderKind;
use travelcare_core::routes::Route;
use travelcare_core::types::{MessageId, Sender, Timestamp};

// =============================================================================
// Enums
// =============================================================================

/// Request types recognised from a user's free-text message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Emergency,
    FindCare,
    BookAppointment,
    Telemedicine,
    ViewPolicy,
    CheckCoverage,
    SymptomReport,
    Fallback,
}

impl Intent {
    pub const ALL: [Intent; 8] = [
        Intent::Emergency,
        Intent::FindCare,
        Intent::BookAppointment,
        Intent::Telemedicine,
        Intent::ViewPolicy,
        Intent::CheckCoverage,
        Intent::SymptomReport,
        Intent::Fallback,
    ];
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::Emergency => write!(f, "emergency"),
            Intent::FindCare => write!(f, "find_care"),
            Intent::BookAppointment => write!(f, "book_appointment"),
            Intent::Telemedicine => write!(f, "telemedicine"),
            Intent::ViewPolicy => write!(f, "view_policy"),
            Intent::CheckCoverage => write!(f, "check_coverage"),
            Intent::SymptomReport => write!(f, "symptom_report"),
            Intent::Fallback => write!(f, "fallback"),
        }
    }
}

impl std::str::FromStr for Intent {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Intent::ALL
            .into_iter()
            .find(|i| i.to_string() == s)
            .ok_or_else(|| format!("Unknown intent: {}", s))
    }
}

/// Symbolic identifier attached to a button.
///
/// Ids outside the known vocabulary are kept verbatim in `Unknown` so they
/// can still be acknowledged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionId {
    FindDoctors,
    FindHospital,
    FindGp,
    FindSpecialist,
    ShowAllDoctors,
    Emergency,
    EmergencyChat,
    CallEmergency,
    Call112,
    BookDoctor,
    Telemedicine,
    BookTelemedicine,
    ViewPolicy,
    CheckCoverage,
    CheckSpecific,
    SymptomChecker,
    CloseWidget,
    Unknown(String),
}

impl ActionId {
    const KNOWN: [ActionId; 17] = [
        ActionId::FindDoctors,
        ActionId::FindHospital,
        ActionId::FindGp,
        ActionId::FindSpecialist,
        ActionId::ShowAllDoctors,
        ActionId::Emergency,
        ActionId::EmergencyChat,
        ActionId::CallEmergency,
        ActionId::Call112,
        ActionId::BookDoctor,
        ActionId::Telemedicine,
        ActionId::BookTelemedicine,
        ActionId::ViewPolicy,
        ActionId::CheckCoverage,
        ActionId::CheckSpecific,
        ActionId::SymptomChecker,
        ActionId::CloseWidget,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            ActionId::FindDoctors => "find_doctors",
            ActionId::FindHospital => "find_hospital",
            ActionId::FindGp => "find_gp",
            ActionId::FindSpecialist => "find_specialist",
            ActionId::ShowAllDoctors => "show_all_doctors",
            ActionId::Emergency => "emergency",
            ActionId::EmergencyChat => "emergency_chat",
            ActionId::CallEmergency => "call_emergency",
            ActionId::Call112 => "call_112",
            ActionId::BookDoctor => "book_doctor",
            ActionId::Telemedicine => "telemedicine",
            ActionId::BookTelemedicine => "book_telemedicine",
            ActionId::ViewPolicy => "view_policy",
            ActionId::CheckCoverage => "check_coverage",
            ActionId::CheckSpecific => "check_specific",
            ActionId::SymptomChecker => "symptom_checker",
            ActionId::CloseWidget => "close_widget",
            ActionId::Unknown(id) => id,
        }
    }

    /// Parse an id. Never fails; unrecognised ids become `Unknown`.
    pub fn parse(s: &str) -> Self {
        Self::KNOWN
            .iter()
            .find(|a| a.as_str() == s)
            .cloned()
            .unwrap_or_else(|| ActionId::Unknown(s.to_string()))
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ActionId::Unknown(_))
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActionId {
    type Err = Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ActionId::parse(s))
    }
}

impl From<String> for ActionId {
    fn from(s: String) -> Self {
        ActionId::parse(&s)
    }
}

impl From<ActionId> for String {
    fn from(id: ActionId) -> Self {
        id.as_str().to_string()
    }
}

/// Typed data carried by a button to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionPayload {
    #[default]
    None,
    Doctor { doctor_id: u32 },
    TelemedicineDoctor { doctor_id: u32 },
    Provider { provider_id: u32 },
}

impl fmt::Display for ActionPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionPayload::None => write!(f, "none"),
            ActionPayload::Doctor { doctor_id } => write!(f, "doctor {}", doctor_id),
            ActionPayload::TelemedicineDoctor { doctor_id } => {
                write!(f, "telemedicine doctor {}", doctor_id)
            }
            ActionPayload::Provider { provider_id } => write!(f, "provider {}", provider_id),
        }
    }
}

/// Kinds of interactive panel that can be embedded in a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    Policy,
    Providers,
    Booking,
    Telemedicine,
    Coverage,
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetKind::Policy => write!(f, "policy"),
            WidgetKind::Providers => write!(f, "providers"),
            WidgetKind::Booking => write!(f, "booking"),
            WidgetKind::Telemedicine => write!(f, "telemedicine"),
            WidgetKind::Coverage => write!(f, "coverage"),
        }
    }
}

/// Widget-specific initial data. Opaque to the log and the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WidgetInit {
    #[default]
    Default,
    ProviderKind { provider_kind: ProviderKind },
    Doctor { doctor_id: u32 },
    TelemedicineDoctor { doctor_id: u32 },
    ProviderVisit { provider_id: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetRef {
    pub kind: WidgetKind,
    #[serde(default)]
    pub init: WidgetInit,
}

impl WidgetRef {
    pub fn new(kind: WidgetKind) -> Self {
        Self {
            kind,
            init: WidgetInit::Default,
        }
    }

    pub fn with_init(mut self, init: WidgetInit) -> Self {
        self.init = init;
        self
    }
}

/// Turn state of a chat session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    AwaitingResponse,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::AwaitingResponse => write!(f, "awaiting_response"),
        }
    }
}

// =============================================================================
// Domain Structs
// =============================================================================

/// A quick-action button attached to a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionButton {
    pub label: String,
    pub action: ActionId,
    #[serde(default)]
    pub payload: ActionPayload,
    /// Visual emphasis only.
    #[serde(default)]
    pub primary: bool,
}

impl ActionButton {
    pub fn new(label: impl Into<String>, action: ActionId) -> Self {
        Self {
            label: label.into(),
            action,
            payload: ActionPayload::None,
            primary: false,
        }
    }

    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    pub fn with_payload(mut self, payload: ActionPayload) -> Self {
        self.payload = payload;
        self
    }
}

/// Reply content: text, buttons and an optional embedded widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsePayload {
    pub text: String,
    pub actions: Vec<ActionButton>,
    pub widget: Option<WidgetRef>,
}

impl ResponsePayload {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            actions: Vec::new(),
            widget: None,
        }
    }

    pub fn with_actions(mut self, actions: Vec<ActionButton>) -> Self {
        self.actions = actions;
        self
    }

    pub fn with_widget(mut self, widget: WidgetRef) -> Self {
        self.widget = Some(widget);
        self
    }
}

/// A message that has not been appended to a log yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDraft {
    pub sender: Sender,
    pub body: ResponsePayload,
}

impl MessageDraft {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            body: ResponsePayload::text(text),
        }
    }

    pub fn assistant(body: ResponsePayload) -> Self {
        Self {
            sender: Sender::Assistant,
            body,
        }
    }
}

/// A message in the chat log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub sender: Sender,
    pub timestamp: Timestamp,
    pub actions: Vec<ActionButton>,
    pub widget: Option<WidgetRef>,
}

impl Message {
    pub fn from_draft(id: MessageId, draft: MessageDraft) -> Self {
        Self {
            id,
            text: draft.body.text,
            sender: draft.sender,
            timestamp: Timestamp::now(),
            actions: draft.body.actions,
            widget: draft.body.widget,
        }
    }

    pub fn hosts_widget(&self) -> bool {
        self.widget.is_some()
    }
}

/// Screen state carried along with a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NavigationState {
    Doctor { doctor_id: u32 },
    TelemedicineDoctor { doctor_id: u32 },
    Provider { provider_id: u32 },
}

/// Outcome of dispatching one action.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchResult {
    AppendMessage(MessageDraft),
    /// Append `echo` now and `reply` after the action delay.
    EchoThenReply {
        echo: MessageDraft,
        reply: MessageDraft,
    },
    Navigate {
        route: Route,
        state: Option<NavigationState>,
    },
    OpenExternal(String),
    RemoveLastAndAppend(MessageDraft),
}

/// Effects outside the message log, drained by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Effect {
    Navigate {
        route: Route,
        state: Option<NavigationState>,
    },
    OpenExternal { uri: String },
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Navigate { route, .. } => write!(f, "navigate {}", route),
            Effect::OpenExternal { uri } => write!(f, "open {}", uri),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_id_parse_known() {
        assert_eq!(ActionId::parse("call_112"), ActionId::Call112);
        assert_eq!(ActionId::parse("close_widget"), ActionId::CloseWidget);
        for id in ActionId::KNOWN.iter() {
            assert_eq!(&ActionId::parse(id.as_str()), id);
        }
    }

    #[test]
    fn test_action_id_parse_unknown_keeps_text() {
        let id: ActionId = "xyz123".parse().unwrap();
        assert_eq!(id, ActionId::Unknown("xyz123".to_string()));
        assert_eq!(id.to_string(), "xyz123");
        assert!(!id.is_known());
    }

    #[test]
    fn test_action_id_serde_as_string() {
        let json = serde_json::to_string(&ActionId::BookDoctor).unwrap();
        assert_eq!(json, "\"book_doctor\"");
        let back: ActionId = serde_json::from_str("\"mystery\"").unwrap();
        assert_eq!(back, ActionId::Unknown("mystery".to_string()));
    }

    #[test]
    fn test_intent_display_and_parse() {
        for intent in Intent::ALL {
            assert_eq!(intent.to_string().parse::<Intent>().unwrap(), intent);
        }
        assert!("nonsense".parse::<Intent>().is_err());
    }

    #[test]
    fn test_button_builder() {
        let button = ActionButton::new("Book", ActionId::BookDoctor)
            .with_payload(ActionPayload::Doctor { doctor_id: 2 })
            .primary();
        assert!(button.primary);
        assert_eq!(button.payload, ActionPayload::Doctor { doctor_id: 2 });
    }

    #[test]
    fn test_button_json_shape() {
        let button = ActionButton::new("Book", ActionId::BookDoctor)
            .with_payload(ActionPayload::Doctor { doctor_id: 2 });
        let value = serde_json::to_value(&button).unwrap();
        assert_eq!(value["action"], "book_doctor");
        assert_eq!(value["payload"]["kind"], "doctor");
        assert_eq!(value["payload"]["doctor_id"], 2);
    }

    #[test]
    fn test_message_from_draft() {
        let draft = MessageDraft::assistant(
            ResponsePayload::text("hi").with_widget(WidgetRef::new(WidgetKind::Policy)),
        );
        let message = Message::from_draft(MessageId(4), draft);
        assert_eq!(message.id, MessageId(4));
        assert_eq!(message.sender, Sender::Assistant);
        assert!(message.hosts_widget());
    }

    #[test]
    fn test_effect_display() {
        let effect = Effect::OpenExternal {
            uri: "tel:112".to_string(),
        };
        assert_eq!(effect.to_string(), "open tel:112");
        let nav = Effect::Navigate {
            route: Route::Policy,
            state: None,
        };
        assert_eq!(nav.to_string(), "navigate /policy");
    }
}
